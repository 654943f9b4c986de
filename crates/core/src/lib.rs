//! # RaktMap Core
//!
//! Core business logic for the RaktMap blood donor notification service.
//!
//! This crate contains:
//! - Blood group normalization and the donor compatibility table
//! - Donor matching and SMS fan-out for blood requests
//! - JSON file persistence for donors, requests and accounts
//! - The Twilio SMS gateway client
//!
//! **No API concerns**: HTTP servers, token handling and wire formats belong in `api-rest` and
//! `api-shared`.

pub mod accounts;
pub mod blood_group;
pub mod config;
pub mod constants;
pub mod dispatch;
pub mod donors;
pub mod error;
pub mod models;
pub mod password;
pub mod requests;
pub mod sms;
pub mod store;
pub mod validation;

pub use accounts::{AccountService, NewUser};
pub use blood_group::{compatible_donor_groups, normalize_blood_group, BloodGroup};
pub use config::{CoreConfig, SmsConfig};
pub use constants::DEFAULT_DATA_DIR;
pub use dispatch::{DispatchSummary, Dispatcher, MatchPolicy, NotificationOutcome};
pub use donors::{DonorService, ImportReport};
pub use error::{CoreError, CoreResult};
pub use models::{
    BloodRequest, Donor, NewBloodRequest, NewDonor, Requester, RequestStatus, Role, Urgency, User,
};
pub use requests::{BloodRequestService, Submission};
pub use sms::{SmsError, SmsGateway, SmsReceipt, TwilioGateway};
pub use store::{DonorDirectory, DonorRegistry, FileStore, MemoryStore, RequestStore, UserStore};
