//! Donor matching and SMS fan-out for a blood request.
//!
//! The [`Dispatcher`] filters the donor directory with a [`MatchPolicy`], texts every matching
//! donor that has a phone number, records who was attempted on the request and returns a
//! [`DispatchSummary`]. A failed send is logged and counted as undelivered; it never aborts the
//! remaining sends or fails the dispatch.

use crate::blood_group::{compatible_donor_groups, normalize_blood_group, BloodGroup};
use crate::config::CoreConfig;
use crate::models::{BloodRequest, Donor};
use crate::sms::SmsGateway;
use crate::store::DonorDirectory;
use crate::{CoreError, CoreResult};
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::sync::Arc;
use uuid::Uuid;

/// How a donor's blood group is matched against the requested one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchPolicy {
    /// Normalized donor group equals the normalized requested group.
    #[default]
    #[serde(rename = "exact")]
    ExactGroup,
    /// Donor group is in the compatibility set of the requested group.
    Compatible,
}

impl MatchPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ExactGroup => "exact",
            Self::Compatible => "compatible",
        }
    }

    /// Whether a donor with `donor_group` matches a request for `requested`.
    pub fn matches(self, requested: &str, donor_group: &str) -> bool {
        match self {
            Self::ExactGroup => {
                let donor_group = normalize_blood_group(donor_group);
                !donor_group.is_empty() && donor_group == normalize_blood_group(requested)
            }
            Self::Compatible => BloodGroup::parse(donor_group)
                .is_some_and(|donor| compatible_donor_groups(requested).contains(&donor)),
        }
    }
}

impl std::fmt::Display for MatchPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MatchPolicy {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "exact" | "exact-group" => Ok(Self::ExactGroup),
            "compatible" | "compatibility" => Ok(Self::Compatible),
            _ => Err(CoreError::InvalidInput(format!(
                "unknown match policy: {s} (expected 'exact' or 'compatible')"
            ))),
        }
    }
}

/// Result of one send attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NotificationOutcome {
    pub donor_id: Uuid,
    pub delivered: bool,
}

/// Aggregate returned to the caller after dispatch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchSummary {
    /// Donors whose group matched, including those without a phone number.
    pub total_donors: usize,
    /// Sends the gateway accepted. Never exceeds `total_donors`.
    pub sms_delivered: usize,
    /// The requested group, as submitted.
    pub blood_group: String,
}

/// Formats the alert texted to donors.
pub fn format_alert(request: &BloodRequest) -> String {
    let mut message = format!(
        "URGENT: {} blood needed at {}.\n",
        request.blood_group, request.hospital_name
    );
    message.push_str(&format!("Units needed: {}\n", request.quantity));
    message.push_str(&format!("Urgency: {}\n", request.urgency));
    if let Some(description) = request.description.as_deref().filter(|d| !d.trim().is_empty()) {
        message.push_str(&format!("Details: {}\n", description));
    }
    message.push_str("Please respond if you can help.");
    message
}

pub struct Dispatcher {
    gateway: Arc<dyn SmsGateway>,
    policy: MatchPolicy,
    max_concurrent_sends: NonZeroUsize,
}

impl Dispatcher {
    pub fn new(
        gateway: Arc<dyn SmsGateway>,
        policy: MatchPolicy,
        max_concurrent_sends: NonZeroUsize,
    ) -> Self {
        Self {
            gateway,
            policy,
            max_concurrent_sends,
        }
    }

    pub fn from_config(cfg: &CoreConfig, gateway: Arc<dyn SmsGateway>) -> Self {
        Self::new(gateway, cfg.match_policy(), cfg.max_concurrent_sends())
    }

    pub fn policy(&self) -> MatchPolicy {
        self.policy
    }

    /// Donors whose group matches `requested` under this dispatcher's policy.
    ///
    /// Records with no blood group at all are skipped with a warning.
    pub fn matching_donors<'a>(&self, requested: &str, donors: &'a [Donor]) -> Vec<&'a Donor> {
        donors
            .iter()
            .filter(|donor| {
                if donor.blood_group.trim().is_empty() {
                    tracing::warn!("donor {} has no blood group", donor.id);
                    return false;
                }
                self.policy.matches(requested, &donor.blood_group)
            })
            .collect()
    }

    /// Looks up the directory and dispatches to it.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::DirectoryLookup` if the directory cannot be read. In that case no
    /// donor has been contacted and `request` is unchanged.
    pub async fn dispatch(
        &self,
        request: &mut BloodRequest,
        directory: &dyn DonorDirectory,
    ) -> CoreResult<DispatchSummary> {
        let donors = directory
            .list_donors()
            .map_err(|e| CoreError::DirectoryLookup(Box::new(e)))?;

        Ok(self.dispatch_to(request, &donors).await)
    }

    /// Texts every matching donor in `donors` that has a phone number.
    ///
    /// Attempted donors are appended to `request.notified_donors` in directory order,
    /// whatever the outcome of their send. At most `max_concurrent_sends` sends are in flight.
    pub async fn dispatch_to(&self, request: &mut BloodRequest, donors: &[Donor]) -> DispatchSummary {
        let matches = self.matching_donors(&request.blood_group, donors);
        tracing::info!(
            "found {} matching donors for blood group {} (policy: {})",
            matches.len(),
            normalize_blood_group(&request.blood_group),
            self.policy
        );

        let message = format_alert(request);
        let gateway = self.gateway.as_ref();

        let attempts: Vec<(&Donor, &str)> = matches
            .iter()
            .filter_map(|donor| match donor.contact_phone() {
                Some(phone) => Some((*donor, phone)),
                None => {
                    tracing::debug!("donor {} has no phone number, not contacted", donor.id);
                    None
                }
            })
            .collect();

        let outcomes: Vec<NotificationOutcome> = stream::iter(attempts)
            .map(|(donor, phone)| {
                let message = message.as_str();
                async move {
                    let delivered = match gateway.send(phone, message).await {
                        Ok(receipt) => {
                            tracing::info!("SMS sent to donor {} ({})", donor.id, receipt.sid);
                            true
                        }
                        Err(e) => {
                            tracing::warn!("failed to send SMS to donor {}: {}", donor.id, e);
                            false
                        }
                    };
                    NotificationOutcome {
                        donor_id: donor.id,
                        delivered,
                    }
                }
            })
            .buffered(self.max_concurrent_sends.get())
            .boxed()
            .collect()
            .await;

        request
            .notified_donors
            .extend(outcomes.iter().map(|outcome| outcome.donor_id));

        DispatchSummary {
            total_donors: matches.len(),
            sms_delivered: outcomes.iter().filter(|outcome| outcome.delivered).count(),
            blood_group: request.blood_group.clone(),
        }
    }
}
