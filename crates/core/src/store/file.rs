//! JSON file persistence.
//!
//! Layout under the data directory:
//!
//! ```text
//! <data_dir>/donors.json            all donors, one array
//! <data_dir>/users.json             all accounts, one array
//! <data_dir>/requests/<uuid>.json   one blood request per file
//! ```
//!
//! Writes go to a sibling temporary file which is then renamed over the target, so a crash
//! never leaves a half-written file behind. A single mutex serialises all writers.

use super::{newest_first, DonorDirectory, DonorRegistry, RequestStore, UserStore};
use crate::constants::{DONORS_FILENAME, REQUESTS_DIR_NAME, USERS_FILENAME};
use crate::models::{BloodRequest, Donor, User};
use crate::{CoreError, CoreResult};
use serde::{de::DeserializeOwned, Serialize};
use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::Mutex,
};
use uuid::Uuid;

pub struct FileStore {
    root: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStore {
    /// Opens (creating if needed) a store rooted at `data_dir`.
    pub fn open(data_dir: &Path) -> CoreResult<Self> {
        fs::create_dir_all(data_dir.join(REQUESTS_DIR_NAME))
            .map_err(CoreError::StorageDirCreation)?;

        tracing::debug!("opened file store at {}", data_dir.display());
        Ok(Self {
            root: data_dir.to_path_buf(),
            write_lock: Mutex::new(()),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn donors_path(&self) -> PathBuf {
        self.root.join(DONORS_FILENAME)
    }

    fn users_path(&self) -> PathBuf {
        self.root.join(USERS_FILENAME)
    }

    fn request_path(&self, id: Uuid) -> PathBuf {
        self.root
            .join(REQUESTS_DIR_NAME)
            .join(format!("{}.json", id.simple()))
    }

    fn lock(&self) -> CoreResult<std::sync::MutexGuard<'_, ()>> {
        self.write_lock.lock().map_err(|_| CoreError::StorePoisoned)
    }
}

/// Reads a JSON file, returning `T::default()` if it does not exist yet.
fn read_json_or_default<T: DeserializeOwned + Default>(path: &Path) -> CoreResult<T> {
    match fs::read(path) {
        Ok(bytes) => serde_json::from_slice(&bytes).map_err(CoreError::Deserialization),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(T::default()),
        Err(e) => Err(CoreError::FileRead(e)),
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> CoreResult<T> {
    let bytes = fs::read(path).map_err(CoreError::FileRead)?;
    serde_json::from_slice(&bytes).map_err(CoreError::Deserialization)
}

fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> CoreResult<()> {
    let bytes = serde_json::to_vec_pretty(value).map_err(CoreError::Serialization)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, bytes).map_err(CoreError::FileWrite)?;
    fs::rename(&tmp, path).map_err(CoreError::FileWrite)
}

impl DonorDirectory for FileStore {
    fn list_donors(&self) -> CoreResult<Vec<Donor>> {
        read_json_or_default(&self.donors_path())
    }
}

impl DonorRegistry for FileStore {
    fn insert_donor(&self, donor: Donor) -> CoreResult<()> {
        let _guard = self.lock()?;
        let mut donors: Vec<Donor> = read_json_or_default(&self.donors_path())?;

        if donors.iter().any(|d| d.email.eq_ignore_ascii_case(&donor.email)) {
            return Err(CoreError::DuplicateDonor(donor.email));
        }

        donors.push(donor);
        write_json_atomic(&self.donors_path(), &donors)
    }

    fn replace_donors(&self, donors: Vec<Donor>) -> CoreResult<()> {
        let _guard = self.lock()?;
        write_json_atomic(&self.donors_path(), &donors)
    }
}

impl RequestStore for FileStore {
    fn create_request(&self, request: &BloodRequest) -> CoreResult<()> {
        let _guard = self.lock()?;
        write_json_atomic(&self.request_path(request.id), request)
    }

    fn save_request(&self, request: &BloodRequest) -> CoreResult<()> {
        let _guard = self.lock()?;
        let path = self.request_path(request.id);
        if !path.is_file() {
            return Err(CoreError::RequestNotFound(request.id));
        }
        write_json_atomic(&path, request)
    }

    fn get_request(&self, id: Uuid) -> CoreResult<BloodRequest> {
        let path = self.request_path(id);
        if !path.is_file() {
            return Err(CoreError::RequestNotFound(id));
        }
        read_json(&path)
    }

    fn list_requests(&self, hospital_id: Option<Uuid>) -> CoreResult<Vec<BloodRequest>> {
        let dir = self.root.join(REQUESTS_DIR_NAME);
        let entries = match fs::read_dir(&dir) {
            Ok(it) => it,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(CoreError::FileRead(e)),
        };

        let mut requests = Vec::new();
        for entry in entries {
            let path = entry.map_err(CoreError::FileRead)?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }

            match read_json::<BloodRequest>(&path) {
                Ok(request) => {
                    if hospital_id.map_or(true, |id| request.hospital_id == id) {
                        requests.push(request);
                    }
                }
                Err(e) => {
                    tracing::warn!("skipping unreadable request {}: {}", path.display(), e);
                }
            }
        }

        Ok(newest_first(requests))
    }
}

impl UserStore for FileStore {
    fn insert_user(&self, user: User) -> CoreResult<()> {
        let _guard = self.lock()?;
        let mut users: Vec<User> = read_json_or_default(&self.users_path())?;

        if users.iter().any(|u| u.email == user.email) {
            return Err(CoreError::DuplicateUser(user.email));
        }

        users.push(user);
        write_json_atomic(&self.users_path(), &users)
    }

    fn find_user_by_email(&self, email: &str) -> CoreResult<Option<User>> {
        let users: Vec<User> = read_json_or_default(&self.users_path())?;
        Ok(users.into_iter().find(|u| u.email == email))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DonorRole, RequestStatus, Role, Urgency};
    use chrono::{Duration, Utc};
    use tempfile::TempDir;

    fn donor(email: &str, group: &str) -> Donor {
        Donor {
            id: Uuid::new_v4(),
            name: "Test Donor".into(),
            email: email.into(),
            roll_no: None,
            blood_group: group.into(),
            phone: Some("+911234567890".into()),
            role: DonorRole::Donor,
            password_hash: String::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn request(hospital_id: Uuid, age_minutes: i64) -> BloodRequest {
        BloodRequest {
            id: Uuid::new_v4(),
            hospital_id,
            hospital_name: "City Hospital".into(),
            blood_group: "B+".into(),
            quantity: 1,
            urgency: Urgency::Low,
            required_by: Utc::now(),
            description: None,
            patient_age: None,
            patient_condition: None,
            status: RequestStatus::Pending,
            created_at: Utc::now() - Duration::minutes(age_minutes),
            notified_donors: Vec::new(),
        }
    }

    #[test]
    fn test_open_creates_layout() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("nested");
        let store = FileStore::open(&root).unwrap();

        assert!(root.join("requests").is_dir());
        assert!(store.list_donors().unwrap().is_empty());
        assert!(store.list_requests(None).unwrap().is_empty());
    }

    #[test]
    fn test_donor_insert_rejects_duplicate_email() {
        let temp = TempDir::new().unwrap();
        let store = FileStore::open(temp.path()).unwrap();

        store.insert_donor(donor("a@example.com", "A+")).unwrap();
        let err = store.insert_donor(donor("A@example.com", "O-")).unwrap_err();
        assert!(matches!(err, CoreError::DuplicateDonor(_)));
        assert_eq!(store.list_donors().unwrap().len(), 1);
    }

    #[test]
    fn test_replace_donors_overwrites() {
        let temp = TempDir::new().unwrap();
        let store = FileStore::open(temp.path()).unwrap();

        store.insert_donor(donor("old@example.com", "A+")).unwrap();
        store
            .replace_donors(vec![
                donor("n1@example.com", "B-"),
                donor("n2@example.com", "O+"),
            ])
            .unwrap();

        let emails: Vec<String> = store
            .list_donors()
            .unwrap()
            .into_iter()
            .map(|d| d.email)
            .collect();
        assert_eq!(emails, vec!["n1@example.com", "n2@example.com"]);
        assert!(!temp.path().join("donors.json.tmp").exists());
    }

    #[test]
    fn test_request_round_trip_and_save() {
        let temp = TempDir::new().unwrap();
        let store = FileStore::open(temp.path()).unwrap();

        let mut req = request(Uuid::new_v4(), 0);
        store.create_request(&req).unwrap();

        let notified = Uuid::new_v4();
        req.notified_donors.push(notified);
        store.save_request(&req).unwrap();

        let loaded = store.get_request(req.id).unwrap();
        assert_eq!(loaded.notified_donors, vec![notified]);
    }

    #[test]
    fn test_save_and_get_missing_request() {
        let temp = TempDir::new().unwrap();
        let store = FileStore::open(temp.path()).unwrap();
        let req = request(Uuid::new_v4(), 0);

        assert!(matches!(
            store.save_request(&req),
            Err(CoreError::RequestNotFound(_))
        ));
        assert!(matches!(
            store.get_request(req.id),
            Err(CoreError::RequestNotFound(_))
        ));
    }

    #[test]
    fn test_list_requests_filters_and_orders() {
        let temp = TempDir::new().unwrap();
        let store = FileStore::open(temp.path()).unwrap();
        let hospital = Uuid::new_v4();

        let older = request(hospital, 30);
        let newer = request(hospital, 1);
        let other = request(Uuid::new_v4(), 5);
        for r in [&older, &newer, &other] {
            store.create_request(r).unwrap();
        }
        fs::write(temp.path().join("requests").join("broken.json"), b"{").unwrap();

        let mine = store.list_requests(Some(hospital)).unwrap();
        assert_eq!(
            mine.iter().map(|r| r.id).collect::<Vec<_>>(),
            vec![newer.id, older.id]
        );
        assert_eq!(store.list_requests(None).unwrap().len(), 3);
    }

    #[test]
    fn test_users_unique_by_email() {
        let temp = TempDir::new().unwrap();
        let store = FileStore::open(temp.path()).unwrap();
        let user = User {
            id: Uuid::new_v4(),
            email: "admin@example.com".into(),
            name: "Admin".into(),
            role: Role::Admin,
            password_hash: String::new(),
            created_at: Utc::now(),
        };

        store.insert_user(user.clone()).unwrap();
        assert!(matches!(
            store.insert_user(user.clone()),
            Err(CoreError::DuplicateUser(_))
        ));
        assert_eq!(
            store.find_user_by_email("admin@example.com").unwrap(),
            Some(user)
        );
        assert_eq!(store.find_user_by_email("nobody@example.com").unwrap(), None);
    }
}
