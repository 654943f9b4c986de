//! Donor registration, listing and bulk import.

use crate::blood_group::normalize_blood_group;
use crate::constants::{DEFAULT_COUNTRY_CODE, DEFAULT_IMPORT_PASSWORD};
use crate::models::{Donor, NewDonor};
use crate::password::hash_password;
use crate::store::DonorRegistry;
use crate::{CoreError, CoreResult};
use chrono::Utc;
use serde::Deserialize;
use std::collections::HashSet;
use std::io::Read;
use std::sync::Arc;

/// One row of the donor spreadsheet. Columns not listed here are ignored.
#[derive(Debug, Deserialize)]
struct DonorCsvRow {
    #[serde(rename = "Student Name")]
    name: String,
    #[serde(rename = "Blood Group")]
    blood_group: String,
    #[serde(rename = "Mobile No")]
    phone: String,
    #[serde(rename = "Email")]
    email: String,
    #[serde(rename = "Roll No", default)]
    roll_no: Option<String>,
}

/// Outcome of parsing a donor spreadsheet.
#[derive(Debug)]
pub struct ImportReport {
    pub donors: Vec<Donor>,
    pub skipped: usize,
}

/// Prefixes the default country code unless the number already carries one.
fn with_country_code(phone: &str) -> String {
    let phone = phone.trim();
    if phone.starts_with('+') {
        phone.to_string()
    } else {
        format!("{DEFAULT_COUNTRY_CODE}{phone}")
    }
}

/// Parses donor rows from CSV.
///
/// Every imported donor gets the default password; it is hashed once per import. Rows that
/// fail validation or repeat an earlier email are skipped and counted.
pub fn read_donor_csv<R: Read>(reader: R) -> CoreResult<ImportReport> {
    let password_hash = hash_password(DEFAULT_IMPORT_PASSWORD)?;
    let now = Utc::now();

    let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut donors = Vec::new();
    let mut seen_emails = HashSet::new();
    let mut skipped = 0;

    for (index, row) in csv_reader.deserialize::<DonorCsvRow>().enumerate() {
        let line = index + 2;
        let row = match row {
            Ok(row) => row,
            Err(e) => {
                tracing::warn!("skipping donor CSV line {}: {}", line, e);
                skipped += 1;
                continue;
            }
        };

        let new = NewDonor {
            name: row.name,
            email: row.email,
            roll_no: row.roll_no,
            blood_group: normalize_blood_group(&row.blood_group),
            phone: with_country_code(&row.phone),
        };

        match new.into_donor(password_hash.clone(), now) {
            Ok(donor) if seen_emails.insert(donor.email.clone()) => donors.push(donor),
            Ok(donor) => {
                tracing::warn!("skipping donor CSV line {}: duplicate email {}", line, donor.email);
                skipped += 1;
            }
            Err(e) => {
                tracing::warn!("skipping donor CSV line {}: {}", line, e);
                skipped += 1;
            }
        }
    }

    Ok(ImportReport { donors, skipped })
}

#[derive(Clone)]
pub struct DonorService {
    registry: Arc<dyn DonorRegistry>,
}

impl DonorService {
    pub fn new(registry: Arc<dyn DonorRegistry>) -> Self {
        Self { registry }
    }

    /// Registers a single donor with the given plaintext password.
    pub fn register(&self, new: NewDonor, password: &str) -> CoreResult<Donor> {
        if password.is_empty() {
            return Err(CoreError::InvalidInput("password is required".into()));
        }
        let donor = new.into_donor(hash_password(password)?, Utc::now())?;
        self.registry.insert_donor(donor.clone())?;
        tracing::info!("registered donor {} ({})", donor.id, donor.blood_group);
        Ok(donor)
    }

    pub fn list(&self) -> CoreResult<Vec<Donor>> {
        self.registry.list_donors()
    }

    /// Replaces the whole directory with the donors parsed from `reader`.
    ///
    /// The existing directory is left untouched when no row is usable.
    pub fn import_csv<R: Read>(&self, reader: R) -> CoreResult<ImportReport> {
        let report = read_donor_csv(reader)?;
        if report.donors.is_empty() {
            tracing::warn!("no valid donors to import; directory left unchanged");
            return Ok(report);
        }

        self.registry.replace_donors(report.donors.clone())?;
        tracing::info!(
            "imported {} donor(s), skipped {}",
            report.donors.len(),
            report.skipped
        );
        Ok(report)
    }
}
