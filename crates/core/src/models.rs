//! Persisted records: donors, blood requests and user accounts.

use crate::blood_group::normalize_blood_group;
use crate::validation::{validate_optional_text, validate_quantity, validate_required};
use crate::{CoreError, CoreResult};
use chrono::{DateTime, Utc};
use raktmap_types::{EmailAddress, NonEmptyText, PhoneNumber};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How soon the blood is needed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Low,
    Medium,
    High,
}

impl Urgency {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl std::fmt::Display for Urgency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Urgency {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(CoreError::InvalidInput(format!("invalid urgency: {s}"))),
        }
    }
}

/// Lifecycle of a blood request. Dispatch never moves a request out of `Pending`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    #[default]
    Pending,
    Fulfilled,
    Cancelled,
}

impl RequestStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Fulfilled => "fulfilled",
            Self::Cancelled => "cancelled",
        }
    }
}

/// Account roles allowed to sign in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Hospital,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Hospital => "hospital",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "hospital" => Ok(Self::Hospital),
            _ => Err(CoreError::InvalidInput(format!("invalid role: {s}"))),
        }
    }
}

/// Role marker stored on donor records.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DonorRole {
    #[default]
    Donor,
}

/// A potential blood donor.
///
/// `blood_group` is kept as stored (possibly `"A -"` or `"NK"`); use
/// [`Donor::normalized_blood_group`] for comparisons. The aliases accept raw spreadsheet
/// column names that older imports left in place.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Donor {
    pub id: Uuid,
    #[serde(alias = "Student Name")]
    pub name: String,
    pub email: String,
    #[serde(default, alias = "Roll No")]
    pub roll_no: Option<String>,
    #[serde(default, alias = "Blood Group")]
    pub blood_group: String,
    #[serde(default, alias = "Mobile No")]
    pub phone: Option<String>,
    #[serde(default)]
    pub role: DonorRole,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Donor {
    pub fn normalized_blood_group(&self) -> String {
        normalize_blood_group(&self.blood_group)
    }

    /// The phone number to text, if the record has a non-blank one.
    pub fn contact_phone(&self) -> Option<&str> {
        self.phone
            .as_deref()
            .map(str::trim)
            .filter(|phone| !phone.is_empty())
    }
}

/// Input for registering a single donor.
#[derive(Clone, Debug, Default)]
pub struct NewDonor {
    pub name: String,
    pub email: String,
    pub roll_no: Option<String>,
    pub blood_group: String,
    pub phone: String,
}

impl NewDonor {
    /// Validates the input and builds a donor record around an already hashed password.
    ///
    /// The blood group must be one of the eight groups or `NK`; it is stored normalized.
    pub fn into_donor(self, password_hash: String, now: DateTime<Utc>) -> CoreResult<Donor> {
        let name = NonEmptyText::new(&self.name)?;
        let email = EmailAddress::new(&self.email)?;
        let phone = PhoneNumber::new(&self.phone)?;

        let blood_group = normalize_blood_group(&self.blood_group);
        if blood_group != "NK" && crate::BloodGroup::parse(&blood_group).is_none() {
            return Err(CoreError::InvalidInput(format!(
                "unknown blood group: {}",
                self.blood_group
            )));
        }

        Ok(Donor {
            id: Uuid::new_v4(),
            name: name.into_inner(),
            email: email.as_str().to_owned(),
            roll_no: validate_optional_text(self.roll_no),
            blood_group,
            phone: Some(phone.as_str().to_owned()),
            role: DonorRole::Donor,
            password_hash,
            created_at: now,
            updated_at: now,
        })
    }
}

/// The hospital (or admin) submitting a request, as established by authentication.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Requester {
    pub id: Uuid,
    pub name: String,
}

/// A hospital's request for blood.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BloodRequest {
    pub id: Uuid,
    pub hospital_id: Uuid,
    pub hospital_name: String,
    /// The group as submitted; compare through `normalize_blood_group`.
    pub blood_group: String,
    pub quantity: u32,
    pub urgency: Urgency,
    pub required_by: DateTime<Utc>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub patient_age: Option<String>,
    #[serde(default)]
    pub patient_condition: Option<String>,
    #[serde(default)]
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub notified_donors: Vec<Uuid>,
}

/// Unvalidated request body, as received from a caller.
#[derive(Clone, Debug, Default)]
pub struct NewBloodRequest {
    pub blood_group: Option<String>,
    pub quantity: Option<i64>,
    pub urgency: Option<String>,
    pub required_by: Option<DateTime<Utc>>,
    pub description: Option<String>,
    pub patient_age: Option<String>,
    pub patient_condition: Option<String>,
}

impl BloodRequest {
    /// Validates `new` and builds a pending request owned by `requester`.
    ///
    /// An unrecognised blood group is accepted here; it simply matches no donors later.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidInput` if a required field is missing, the quantity is not
    /// a positive integer, or the urgency is not one of `low`, `medium`, `high`.
    pub fn create(
        requester: &Requester,
        new: NewBloodRequest,
        now: DateTime<Utc>,
    ) -> CoreResult<Self> {
        let blood_group = validate_required("bloodGroup", new.blood_group)?;
        let quantity = validate_quantity(new.quantity)?;
        let urgency: Urgency = validate_required("urgency", new.urgency)?.parse()?;
        let required_by = new
            .required_by
            .ok_or_else(|| CoreError::InvalidInput("requiredBy is required".into()))?;

        Ok(Self {
            id: Uuid::new_v4(),
            hospital_id: requester.id,
            hospital_name: requester.name.clone(),
            blood_group,
            quantity,
            urgency,
            required_by,
            description: validate_optional_text(new.description),
            patient_age: validate_optional_text(new.patient_age),
            patient_condition: validate_optional_text(new.patient_condition),
            status: RequestStatus::Pending,
            created_at: now,
            notified_donors: Vec::new(),
        })
    }
}

/// A hospital or admin account.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}
