//! Persistence seams for donors, blood requests and accounts.
//!
//! The traits are synchronous; callers on an async runtime use them for small, local reads and
//! writes. Two implementations exist:
//!
//! - [`FileStore`]: JSON files under the configured data directory
//! - [`MemoryStore`]: in-process maps, used by tests

use crate::models::{BloodRequest, Donor, User};
use crate::CoreResult;
use uuid::Uuid;

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Read-only view of the donor directory used during dispatch.
pub trait DonorDirectory: Send + Sync {
    /// Returns every donor; filtering happens in the dispatcher after normalization.
    fn list_donors(&self) -> CoreResult<Vec<Donor>>;
}

/// Write access to the donor directory.
pub trait DonorRegistry: DonorDirectory {
    /// Adds one donor. Fails with `CoreError::DuplicateDonor` if the email is taken.
    fn insert_donor(&self, donor: Donor) -> CoreResult<()>;

    /// Replaces the whole directory, as a bulk import does.
    fn replace_donors(&self, donors: Vec<Donor>) -> CoreResult<()>;
}

pub trait RequestStore: Send + Sync {
    fn create_request(&self, request: &BloodRequest) -> CoreResult<()>;

    /// Overwrites an existing request. Fails with `CoreError::RequestNotFound` if absent.
    fn save_request(&self, request: &BloodRequest) -> CoreResult<()>;

    fn get_request(&self, id: Uuid) -> CoreResult<BloodRequest>;

    /// Lists requests, optionally restricted to one hospital, newest first.
    fn list_requests(&self, hospital_id: Option<Uuid>) -> CoreResult<Vec<BloodRequest>>;
}

pub trait UserStore: Send + Sync {
    /// Adds an account. Fails with `CoreError::DuplicateUser` if the email is taken.
    fn insert_user(&self, user: User) -> CoreResult<()>;

    fn find_user_by_email(&self, email: &str) -> CoreResult<Option<User>>;
}

pub(crate) fn newest_first(mut requests: Vec<BloodRequest>) -> Vec<BloodRequest> {
    requests.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    requests
}
