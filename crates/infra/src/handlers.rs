//! Operation handlers.
//!
//! Each handler receives the request's open transaction explicitly and never
//! commits it; committing or rolling back is the dispatcher's job. Writes go
//! through the Validator before they reach the store.

use onboarding_core::{Entity, RecordId};
use onboarding_customers::{
    OnboardingFields, OnboardingRecord, SubmittedReview, record_not_found, validate,
};

use crate::dispatcher::DispatchError;
use crate::record_store::{RecordFilter, RecordTransaction};

/// Validate and insert a new record (status defaults to `DRAFT`).
pub async fn create(
    tx: &mut dyn RecordTransaction,
    fields: OnboardingFields,
) -> Result<OnboardingRecord, DispatchError> {
    if let Err(e) = validate(&fields) {
        tracing::warn!(
            entity = OnboardingRecord::ENTITY_TYPE,
            operation = "create",
            reason = e.message(),
            "write rejected"
        );
        return Err(e.into());
    }

    let record = tx.insert(fields).await?;
    tracing::info!(
        entity = OnboardingRecord::ENTITY_TYPE,
        record_id = %record.record_id(),
        status = %record.status(),
        "onboarding request created"
    );
    Ok(record)
}

/// Validate a partial update and apply it to one record.
///
/// Only the payload is validated, not the record that results from merging it
/// into the stored one.
pub async fn update(
    tx: &mut dyn RecordTransaction,
    id: RecordId,
    fields: OnboardingFields,
) -> Result<OnboardingRecord, DispatchError> {
    if let Err(e) = validate(&fields) {
        tracing::warn!(
            entity = OnboardingRecord::ENTITY_TYPE,
            operation = "update",
            record_id = %id,
            reason = e.message(),
            "write rejected"
        );
        return Err(e.into());
    }

    let touched = tx.update(RecordFilter::by_id(id), &fields).await?;
    if touched == 0 {
        return Err(record_not_found().into());
    }

    let record = find(tx, id).await?;
    tracing::info!(
        entity = OnboardingRecord::ENTITY_TYPE,
        record_id = %id,
        "onboarding request updated"
    );
    Ok(record)
}

/// Read one record by id.
pub async fn read(
    tx: &mut dyn RecordTransaction,
    id: RecordId,
) -> Result<OnboardingRecord, DispatchError> {
    find(tx, id).await
}

/// All records, oldest first.
pub async fn list(tx: &mut dyn RecordTransaction) -> Result<Vec<OnboardingRecord>, DispatchError> {
    Ok(tx.read(RecordFilter::all()).await?)
}

/// `SubmitForReview`: move a record from `DRAFT` to `SUBMITTED`.
///
/// The read, the legality check and the write all happen inside `tx`.
pub async fn submit_for_review(
    tx: &mut dyn RecordTransaction,
    id: RecordId,
) -> Result<SubmittedReview, DispatchError> {
    let record = find(tx, id).await?;

    let changes = match record.submit_for_review() {
        Ok(changes) => changes,
        Err(e) => {
            tracing::warn!(record_id = %id, reason = e.message(), "submit for review rejected");
            return Err(e.into());
        }
    };

    tx.update(RecordFilter::by_id(id), &changes).await?;
    tracing::info!(record_id = %id, "onboarding request submitted for review");

    Ok(SubmittedReview::new(id))
}

async fn find(
    tx: &mut dyn RecordTransaction,
    id: RecordId,
) -> Result<OnboardingRecord, DispatchError> {
    let mut matches = tx.read(RecordFilter::by_id(id)).await?;
    matches.pop().ok_or_else(|| record_not_found().into())
}
