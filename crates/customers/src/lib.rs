//! Customer onboarding domain module.
//!
//! This crate contains the business rules for onboarding requests: the record
//! model, the pre-write Validator and the `SubmitForReview` lifecycle decision.
//! Everything here is deterministic domain logic (no IO, no HTTP, no storage).

pub mod lifecycle;
pub mod record;
pub mod validation;

pub use lifecycle::{ALREADY_SUBMITTED, Action, RECORD_NOT_FOUND, SubmittedReview, record_not_found};
pub use record::{OnboardingFields, OnboardingRecord, OnboardingStatus, deserialize_present};
pub use validation::{EMAIL_MANDATORY_IN_GERMANY, validate};
