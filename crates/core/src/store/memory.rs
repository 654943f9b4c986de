use super::{newest_first, DonorDirectory, DonorRegistry, RequestStore, UserStore};
use crate::models::{BloodRequest, Donor, User};
use crate::{CoreError, CoreResult};
use std::collections::HashMap;
use std::sync::RwLock;
use uuid::Uuid;

/// In-process store with the same semantics as [`super::FileStore`].
#[derive(Default)]
pub struct MemoryStore {
    donors: RwLock<Vec<Donor>>,
    requests: RwLock<HashMap<Uuid, BloodRequest>>,
    users: RwLock<Vec<User>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_donors(donors: Vec<Donor>) -> Self {
        Self {
            donors: RwLock::new(donors),
            ..Self::default()
        }
    }
}

impl DonorDirectory for MemoryStore {
    fn list_donors(&self) -> CoreResult<Vec<Donor>> {
        Ok(self
            .donors
            .read()
            .map_err(|_| CoreError::StorePoisoned)?
            .clone())
    }
}

impl DonorRegistry for MemoryStore {
    fn insert_donor(&self, donor: Donor) -> CoreResult<()> {
        let mut donors = self.donors.write().map_err(|_| CoreError::StorePoisoned)?;
        if donors.iter().any(|d| d.email.eq_ignore_ascii_case(&donor.email)) {
            return Err(CoreError::DuplicateDonor(donor.email));
        }
        donors.push(donor);
        Ok(())
    }

    fn replace_donors(&self, donors: Vec<Donor>) -> CoreResult<()> {
        *self.donors.write().map_err(|_| CoreError::StorePoisoned)? = donors;
        Ok(())
    }
}

impl RequestStore for MemoryStore {
    fn create_request(&self, request: &BloodRequest) -> CoreResult<()> {
        self.requests
            .write()
            .map_err(|_| CoreError::StorePoisoned)?
            .insert(request.id, request.clone());
        Ok(())
    }

    fn save_request(&self, request: &BloodRequest) -> CoreResult<()> {
        let mut requests = self.requests.write().map_err(|_| CoreError::StorePoisoned)?;
        match requests.get_mut(&request.id) {
            Some(existing) => {
                *existing = request.clone();
                Ok(())
            }
            None => Err(CoreError::RequestNotFound(request.id)),
        }
    }

    fn get_request(&self, id: Uuid) -> CoreResult<BloodRequest> {
        self.requests
            .read()
            .map_err(|_| CoreError::StorePoisoned)?
            .get(&id)
            .cloned()
            .ok_or(CoreError::RequestNotFound(id))
    }

    fn list_requests(&self, hospital_id: Option<Uuid>) -> CoreResult<Vec<BloodRequest>> {
        let requests = self.requests.read().map_err(|_| CoreError::StorePoisoned)?;
        let matching = requests
            .values()
            .filter(|r| hospital_id.map_or(true, |id| r.hospital_id == id))
            .cloned()
            .collect();
        Ok(newest_first(matching))
    }
}

impl UserStore for MemoryStore {
    fn insert_user(&self, user: User) -> CoreResult<()> {
        let mut users = self.users.write().map_err(|_| CoreError::StorePoisoned)?;
        if users.iter().any(|u| u.email == user.email) {
            return Err(CoreError::DuplicateUser(user.email));
        }
        users.push(user);
        Ok(())
    }

    fn find_user_by_email(&self, email: &str) -> CoreResult<Option<User>> {
        Ok(self
            .users
            .read()
            .map_err(|_| CoreError::StorePoisoned)?
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }
}
