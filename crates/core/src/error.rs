#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("invalid text: {0}")]
    Text(#[from] raktmap_types::TextError),

    #[error("blood request not found: {0}")]
    RequestNotFound(uuid::Uuid),
    #[error("donor already exists: {0}")]
    DuplicateDonor(String),
    #[error("user already exists: {0}")]
    DuplicateUser(String),
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("donor directory lookup failed: {0}")]
    DirectoryLookup(#[source] Box<CoreError>),

    #[error("failed to create storage directory: {0}")]
    StorageDirCreation(std::io::Error),
    #[error("failed to write store file: {0}")]
    FileWrite(std::io::Error),
    #[error("failed to read store file: {0}")]
    FileRead(std::io::Error),
    #[error("failed to serialize record: {0}")]
    Serialization(serde_json::Error),
    #[error("failed to deserialize record: {0}")]
    Deserialization(serde_json::Error),
    #[error("store lock poisoned")]
    StorePoisoned,

    #[error("failed to hash password: {0}")]
    PasswordHash(String),
    #[error("failed to read donor CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to build SMS client: {0}")]
    SmsClient(reqwest::Error),
}

pub type CoreResult<T> = std::result::Result<T, CoreError>;
