//! Constants used throughout the RaktMap core crate.
//!
//! This module contains file names, defaults and fixed values so that the store, the
//! configuration loader and the importer agree on them.

/// Default directory for persisted data when no explicit directory is configured.
pub const DEFAULT_DATA_DIR: &str = "raktmap_data";

/// Filename for the donor directory.
pub const DONORS_FILENAME: &str = "donors.json";

/// Filename for user accounts (hospitals and admins).
pub const USERS_FILENAME: &str = "users.json";

/// Directory name for blood request records, one JSON file per request.
pub const REQUESTS_DIR_NAME: &str = "requests";

/// Base URL of the Twilio REST API.
pub const DEFAULT_TWILIO_API_BASE: &str = "https://api.twilio.com";

/// Number of SMS sends allowed in flight at once. One keeps fan-out sequential.
pub const DEFAULT_MAX_CONCURRENT_SENDS: usize = 1;

/// Upper bound on a single SMS gateway call.
pub const DEFAULT_SMS_TIMEOUT_SECS: u64 = 10;

/// Password assigned to donors created by bulk import.
pub const DEFAULT_IMPORT_PASSWORD: &str = "password123";

/// Country prefix added to imported phone numbers that lack one.
pub const DEFAULT_COUNTRY_CODE: &str = "+91";
