//! Blood request submission and lookup.

use crate::dispatch::{DispatchSummary, Dispatcher};
use crate::models::{BloodRequest, NewBloodRequest, Requester};
use crate::store::{DonorDirectory, RequestStore};
use crate::CoreResult;
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

/// A stored request together with the outcome of notifying donors about it.
#[derive(Debug)]
pub struct Submission {
    pub request: BloodRequest,
    pub summary: DispatchSummary,
}

/// Pure blood request operations - no API concerns
#[derive(Clone)]
pub struct BloodRequestService {
    donors: Arc<dyn DonorDirectory>,
    requests: Arc<dyn RequestStore>,
    dispatcher: Arc<Dispatcher>,
}

impl BloodRequestService {
    pub fn new(
        donors: Arc<dyn DonorDirectory>,
        requests: Arc<dyn RequestStore>,
        dispatcher: Arc<Dispatcher>,
    ) -> Self {
        Self {
            donors,
            requests,
            dispatcher,
        }
    }

    /// Validates and stores a new request, then notifies matching donors.
    ///
    /// The request is persisted before dispatch and saved again afterwards with the
    /// notified-donor list filled in.
    ///
    /// # Errors
    ///
    /// Returns a `CoreError` if:
    /// - the input fails validation (nothing is stored, nobody is contacted),
    /// - the request cannot be persisted,
    /// - the donor directory cannot be read (the request stays stored with no notified donors).
    pub async fn submit(
        &self,
        requester: &Requester,
        new: NewBloodRequest,
    ) -> CoreResult<Submission> {
        let mut request = BloodRequest::create(requester, new, Utc::now())?;
        self.requests.create_request(&request)?;
        tracing::info!(
            "blood request {} created by {} for {} unit(s) of {}",
            request.id,
            requester.name,
            request.quantity,
            request.blood_group
        );

        let summary = self
            .dispatcher
            .dispatch(&mut request, self.donors.as_ref())
            .await?;

        if let Err(e) = self.requests.save_request(&request) {
            tracing::error!(
                "notified {} donor(s) for request {} but could not record them: {}",
                request.notified_donors.len(),
                request.id,
                e
            );
            return Err(e);
        }

        Ok(Submission { request, summary })
    }

    pub fn get(&self, id: Uuid) -> CoreResult<BloodRequest> {
        self.requests.get_request(id)
    }

    /// Lists requests newest first; `hospital_id` restricts to one hospital's requests.
    pub fn list(&self, hospital_id: Option<Uuid>) -> CoreResult<Vec<BloodRequest>> {
        self.requests.list_requests(hospital_id)
    }
}
