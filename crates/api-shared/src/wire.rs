//! JSON request and response bodies shared by the RaktMap APIs.
//!
//! Field names are camelCase on the wire. Request bodies make every field optional so that
//! missing fields reach core validation and come back as a 400 with a readable message rather
//! than a deserialisation rejection.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageRes {
    pub message: String,
}

/// Body returned for every failed request.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorRes {
    pub success: bool,
    pub message: String,
}

impl ErrorRes {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct RegisterReq {
    pub email: Option<String>,
    pub password: Option<String>,
    /// `admin` or `hospital`
    pub role: Option<String>,
    pub name: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct LoginReq {
    pub email: String,
    pub password: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginRes {
    pub token: String,
    pub role: String,
    pub name: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct DashboardRes {
    pub message: String,
    pub role: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateBloodRequestReq {
    pub blood_group: Option<String>,
    pub quantity: Option<i64>,
    /// `low`, `medium` or `high`
    pub urgency: Option<String>,
    /// RFC 3339 timestamp, `YYYY-MM-DDTHH:MM` (taken as UTC) or `YYYY-MM-DD`.
    #[serde(deserialize_with = "deserialize_flexible_datetime")]
    #[schema(value_type = Option<String>)]
    pub required_by: Option<DateTime<Utc>>,
    pub description: Option<String>,
    pub patient_age: Option<String>,
    pub patient_condition: Option<String>,
}

/// Delivery summary for one dispatch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SmsStatus {
    pub total_donors: usize,
    pub sms_delivered: usize,
    pub blood_group: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BloodRequestRes {
    pub id: Uuid,
    pub hospital_id: Uuid,
    pub hospital_name: String,
    pub blood_group: String,
    pub quantity: u32,
    pub urgency: String,
    pub required_by: DateTime<Utc>,
    pub description: Option<String>,
    pub patient_age: Option<String>,
    pub patient_condition: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub notified_donors: Vec<Uuid>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBloodRequestRes {
    pub success: bool,
    pub message: String,
    pub sms_status: SmsStatus,
    pub blood_request: BloodRequestRes,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListBloodRequestsRes {
    pub blood_requests: Vec<BloodRequestRes>,
}

/// Donor as exposed over the API. Password hashes are never serialised.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DonorRes {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub roll_no: Option<String>,
    pub blood_group: String,
    pub phone: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ListDonorsRes {
    pub donors: Vec<DonorRes>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateDonorReq {
    pub name: String,
    pub email: String,
    pub roll_no: Option<String>,
    pub blood_group: String,
    pub phone: String,
    pub password: String,
}

fn deserialize_flexible_datetime<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(Some(dt.with_timezone(&Utc)));
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(Some(naive.and_utc()));
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        if let Some(naive) = date.and_hms_opt(0, 0, 0) {
            return Ok(Some(naive.and_utc()));
        }
    }

    Err(serde::de::Error::custom(format!(
        "invalid requiredBy timestamp: {raw}"
    )))
}
