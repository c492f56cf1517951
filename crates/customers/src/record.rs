use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use onboarding_core::{DomainError, Entity, RecordId};

/// Onboarding request lifecycle.
///
/// `Draft` is the implicit initial state. `Submitted` is terminal for the
/// `SubmitForReview` action.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OnboardingStatus {
    #[default]
    Draft,
    Submitted,
}

impl OnboardingStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            OnboardingStatus::Draft => "DRAFT",
            OnboardingStatus::Submitted => "SUBMITTED",
        }
    }

    pub fn is_submitted(self) -> bool {
        self == OnboardingStatus::Submitted
    }
}

impl core::fmt::Display for OnboardingStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OnboardingStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DRAFT" => Ok(OnboardingStatus::Draft),
            "SUBMITTED" => Ok(OnboardingStatus::Submitted),
            other => Err(DomainError::validation(format!(
                "unknown onboarding status: {other}"
            ))),
        }
    }
}

/// Proposed field set of a create or (partial) update write.
///
/// The nullable columns are tri-state: an absent key (`None`) is not part of
/// the write, an explicit JSON `null` (`Some(None)`) clears the column and a
/// value (`Some(Some(_))`) sets it. On create, absent and `null` are the same.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnboardingFields {
    #[serde(
        default,
        deserialize_with = "deserialize_present",
        skip_serializing_if = "Option::is_none"
    )]
    pub country: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "deserialize_present",
        skip_serializing_if = "Option::is_none"
    )]
    pub email: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<OnboardingStatus>,
}

impl OnboardingFields {
    /// Change set that only moves the status.
    pub fn status_only(status: OnboardingStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    /// Country carried by this write, if it sets one.
    pub fn country_value(&self) -> Option<&str> {
        self.country.as_ref()?.as_deref()
    }

    /// Email carried by this write, if it sets one.
    pub fn email_value(&self) -> Option<&str> {
        self.email.as_ref()?.as_deref()
    }
}

/// Deserialize a key that is present in the payload, `null` included.
///
/// Paired with `#[serde(default)]`, so a missing key stays `None` while
/// `null` becomes `Some(None)`.
pub fn deserialize_present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// One customer's onboarding request, as persisted by the record store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnboardingRecord {
    id: RecordId,
    country: Option<String>,
    email: Option<String>,
    status: OnboardingStatus,
    created_at: DateTime<Utc>,
    modified_at: DateTime<Utc>,
}

impl OnboardingRecord {
    /// Build a freshly created record. Status defaults to `Draft` unless the
    /// payload sets one.
    pub fn new(id: RecordId, fields: OnboardingFields, now: DateTime<Utc>) -> Self {
        Self {
            id,
            country: fields.country.flatten(),
            email: fields.email.flatten(),
            status: fields.status.unwrap_or_default(),
            created_at: now,
            modified_at: now,
        }
    }

    /// Rehydrate a record from stored columns.
    pub fn restore(
        id: RecordId,
        country: Option<String>,
        email: Option<String>,
        status: OnboardingStatus,
        created_at: DateTime<Utc>,
        modified_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            country,
            email,
            status,
            created_at,
            modified_at,
        }
    }

    pub fn record_id(&self) -> RecordId {
        self.id
    }

    pub fn country(&self) -> Option<&str> {
        self.country.as_deref()
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    pub fn status(&self) -> OnboardingStatus {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn modified_at(&self) -> DateTime<Utc> {
        self.modified_at
    }

    /// Overwrite the fields present in `changes` (clearing those sent as
    /// `null`) and bump `modified_at`.
    ///
    /// No rule checking happens here; writes are validated before they reach
    /// the store.
    pub fn apply(&mut self, changes: &OnboardingFields, now: DateTime<Utc>) {
        if let Some(country) = &changes.country {
            self.country = country.clone();
        }
        if let Some(email) = &changes.email {
            self.email = email.clone();
        }
        if let Some(status) = changes.status {
            self.status = status;
        }
        self.modified_at = now;
    }
}

impl Entity for OnboardingRecord {
    type Id = RecordId;

    const ENTITY_TYPE: &'static str = "CustomerOnboardings";

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
