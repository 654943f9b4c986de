//! Hospital and admin accounts.

use crate::models::{Role, User};
use crate::password::{hash_password, verify_password};
use crate::store::UserStore;
use crate::validation::validate_required;
use crate::{CoreError, CoreResult};
use chrono::Utc;
use raktmap_types::{EmailAddress, NonEmptyText};
use std::sync::Arc;
use uuid::Uuid;

/// Registration input. Every field is required.
#[derive(Clone, Debug, Default)]
pub struct NewUser {
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
    pub name: Option<String>,
}

#[derive(Clone)]
pub struct AccountService {
    users: Arc<dyn UserStore>,
}

impl AccountService {
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }

    /// Creates an account with a hashed password. Emails are stored lowercased.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidInput` (or `CoreError::Text`) if a field is missing or
    /// malformed, and `CoreError::DuplicateUser` if the email is already registered.
    pub fn register(&self, new: NewUser) -> CoreResult<User> {
        let (Some(email), Some(password), Some(role), Some(name)) =
            (new.email, new.password.filter(|p| !p.is_empty()), new.role, new.name)
        else {
            return Err(CoreError::InvalidInput("All fields required".into()));
        };

        let email = EmailAddress::new(&email)?;
        let name = NonEmptyText::new(&name)?;
        let role: Role = validate_required("role", Some(role))?.parse()?;

        if self.users.find_user_by_email(email.as_str())?.is_some() {
            return Err(CoreError::DuplicateUser(email.as_str().to_owned()));
        }

        let user = User {
            id: Uuid::new_v4(),
            email: email.as_str().to_owned(),
            name: name.into_inner(),
            role,
            password_hash: hash_password(&password)?,
            created_at: Utc::now(),
        };
        self.users.insert_user(user.clone())?;
        tracing::info!("registered {} account {}", user.role, user.email);

        Ok(user)
    }

    /// Checks credentials and returns the matching account.
    ///
    /// Unknown emails and wrong passwords both yield `CoreError::InvalidCredentials`.
    pub fn authenticate(&self, email: &str, password: &str) -> CoreResult<User> {
        let email = email.trim().to_lowercase();
        let user = self.users.find_user_by_email(&email)?;

        if verify_password(password, user.as_ref().map(|u| u.password_hash.as_str())) {
            user.ok_or(CoreError::InvalidCredentials)
        } else {
            Err(CoreError::InvalidCredentials)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            email: Some(email.into()),
            password: Some("hospital-pass".into()),
            role: Some("hospital".into()),
            name: Some("Sterling Hospital".into()),
        }
    }

    #[test]
    fn test_register_then_authenticate() {
        let svc = AccountService::new(Arc::new(MemoryStore::new()));

        let user = svc.register(new_user("Desk@Sterling.org")).unwrap();
        assert_eq!(user.email, "desk@sterling.org");
        assert_eq!(user.role, Role::Hospital);
        assert_ne!(user.password_hash, "hospital-pass");

        let found = svc
            .authenticate("DESK@sterling.org", "hospital-pass")
            .unwrap();
        assert_eq!(found.id, user.id);

        assert!(matches!(
            svc.authenticate("desk@sterling.org", "wrong-pass"),
            Err(CoreError::InvalidCredentials)
        ));
        assert!(matches!(
            svc.authenticate("ghost@sterling.org", "hospital-pass"),
            Err(CoreError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_register_requires_all_fields() {
        let svc = AccountService::new(Arc::new(MemoryStore::new()));
        let mut new = new_user("a@b.org");
        new.name = None;

        let err = svc.register(new).unwrap_err();
        assert_eq!(err.to_string(), "invalid input: All fields required");
    }

    #[test]
    fn test_register_accepts_short_password_but_not_empty() {
        let svc = AccountService::new(Arc::new(MemoryStore::new()));
        let mut new = new_user("short@b.org");
        new.password = Some("abc".into());
        svc.register(new).unwrap();
        assert!(svc.authenticate("short@b.org", "abc").is_ok());

        let mut new = new_user("empty@b.org");
        new.password = Some(String::new());
        let err = svc.register(new).unwrap_err();
        assert_eq!(err.to_string(), "invalid input: All fields required");
    }

    #[test]
    fn test_register_rejects_unknown_role() {
        let svc = AccountService::new(Arc::new(MemoryStore::new()));
        let mut new = new_user("a@b.org");
        new.role = Some("donor".into());
        assert!(svc.register(new).is_err());
    }

    #[test]
    fn test_register_rejects_duplicate_email() {
        let svc = AccountService::new(Arc::new(MemoryStore::new()));
        svc.register(new_user("dup@b.org")).unwrap();
        assert!(matches!(
            svc.register(new_user("DUP@b.org")),
            Err(CoreError::DuplicateUser(_))
        ));
    }
}
