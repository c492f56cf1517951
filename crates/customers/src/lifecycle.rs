//! `SubmitForReview` lifecycle decision.
//!
//! The only legal transition is `DRAFT -> SUBMITTED`. The decision is pure:
//! it returns the change set to write and never mutates the record. Reading
//! and writing through a transaction is the caller's job.

use core::str::FromStr;

use serde::{Deserialize, Serialize};

use onboarding_core::{DomainError, DomainResult, RecordId};

use crate::record::{OnboardingFields, OnboardingRecord, OnboardingStatus};

pub const RECORD_NOT_FOUND: &str = "Customer onboarding request not found";
pub const ALREADY_SUBMITTED: &str = "Request already submitted";

/// Rejection for an id that matches no stored record.
pub fn record_not_found() -> DomainError {
    DomainError::not_found(RECORD_NOT_FOUND)
}

/// Named actions that can be invoked against a single record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    SubmitForReview,
}

impl Action {
    pub fn name(self) -> &'static str {
        match self {
            Action::SubmitForReview => "SubmitForReview",
        }
    }
}

impl core::fmt::Display for Action {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Action {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SubmitForReview" => Ok(Action::SubmitForReview),
            other => Err(DomainError::not_found(format!("unknown action: {other}"))),
        }
    }
}

/// Result of a successful `SubmitForReview`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmittedReview {
    pub id: RecordId,
    pub status: OnboardingStatus,
}

impl SubmittedReview {
    pub fn new(id: RecordId) -> Self {
        Self {
            id,
            status: OnboardingStatus::Submitted,
        }
    }
}

impl OnboardingRecord {
    /// Decide the `SubmitForReview` transition for this record.
    ///
    /// Any status other than `SUBMITTED` may be submitted; a repeat is a
    /// conflict rather than a silent success.
    pub fn submit_for_review(&self) -> DomainResult<OnboardingFields> {
        if self.status().is_submitted() {
            return Err(DomainError::conflict(ALREADY_SUBMITTED));
        }

        Ok(OnboardingFields::status_only(OnboardingStatus::Submitted))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn draft_record() -> OnboardingRecord {
        OnboardingRecord::new(
            RecordId::new(),
            OnboardingFields {
                country: Some(Some("DE".to_string())),
                email: Some(Some("a@b.com".to_string())),
                status: None,
            },
            Utc::now(),
        )
    }

    #[test]
    fn draft_record_decides_submitted_change_set() {
        let record = draft_record();
        let changes = record.submit_for_review().unwrap();

        assert_eq!(changes, OnboardingFields::status_only(OnboardingStatus::Submitted));
        assert_eq!(changes.country, None);
        assert_eq!(changes.email, None);
    }

    #[test]
    fn submitted_record_is_rejected_as_conflict() {
        let mut record = draft_record();
        let changes = record.submit_for_review().unwrap();
        record.apply(&changes, Utc::now());

        let err = record.submit_for_review().unwrap_err();
        assert_eq!(err, DomainError::Conflict(ALREADY_SUBMITTED.to_string()));
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.message(), "Request already submitted");
    }

    #[test]
    fn deciding_does_not_mutate_the_record() {
        let record = draft_record();
        let before = record.clone();

        let first = record.submit_for_review().unwrap();
        let second = record.submit_for_review().unwrap();

        assert_eq!(record, before);
        assert_eq!(first, second);
    }

    #[test]
    fn not_found_carries_the_client_message() {
        let err = record_not_found();
        assert_eq!(err.status_code(), 404);
        assert_eq!(err.message(), "Customer onboarding request not found");
    }

    #[test]
    fn actions_resolve_by_name() {
        assert_eq!("SubmitForReview".parse::<Action>().unwrap(), Action::SubmitForReview);
        assert_eq!(Action::SubmitForReview.to_string(), "SubmitForReview");

        let err = "Approve".parse::<Action>().unwrap_err();
        assert_eq!(err, DomainError::NotFound("unknown action: Approve".to_string()));
    }

    #[test]
    fn submitted_review_serializes_id_and_status() {
        let id = RecordId::new();
        let json = serde_json::to_value(SubmittedReview::new(id)).unwrap();
        assert_eq!(json, serde_json::json!({ "id": id.to_string(), "status": "SUBMITTED" }));
    }
}
