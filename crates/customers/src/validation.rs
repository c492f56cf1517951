//! Pre-write validation for onboarding records.
//!
//! Runs identically for creates and updates, before the write reaches the
//! record store. The rules only look at the fields carried by the current
//! write: a partial update that omits `country` is not checked against the
//! stored country.

use onboarding_core::{DomainError, DomainResult};

use crate::record::OnboardingFields;

pub const EMAIL_MANDATORY_IN_GERMANY: &str = "Email is mandatory for customers in Germany";

const GERMANY: &str = "DE";

/// Reject writes that violate onboarding rules.
///
/// A German customer (`country == "DE"`, exact match) needs a non-empty email.
/// An email sent as `null` counts as missing.
pub fn validate(fields: &OnboardingFields) -> DomainResult<()> {
    let in_germany = fields.country_value() == Some(GERMANY);
    let has_email = fields.email_value().is_some_and(|email| !email.is_empty());

    if in_germany && !has_email {
        return Err(DomainError::validation(EMAIL_MANDATORY_IN_GERMANY));
    }

    Ok(())
}
