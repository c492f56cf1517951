use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use onboarding_core::RecordId;
use onboarding_customers::{OnboardingFields, OnboardingRecord};

use crate::context::RequestContext;

/// Record store operation error.
///
/// These are **infrastructure errors**. The guard never recovers from them;
/// they travel to the caller unmodified.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store connection failed: {0}")]
    Connection(String),

    #[error("store query failed: {0}")]
    Query(String),

    #[error("stored row could not be decoded: {0}")]
    Decode(String),
}

/// Row filter for reads and updates.
///
/// An empty filter matches every record; an id filter matches zero or one.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct RecordFilter {
    id: Option<RecordId>,
}

impl RecordFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn by_id(id: RecordId) -> Self {
        Self { id: Some(id) }
    }

    pub fn id(&self) -> Option<RecordId> {
        self.id
    }

    pub fn matches(&self, record: &OnboardingRecord) -> bool {
        self.id.is_none_or(|id| id == record.record_id())
    }
}

/// Transactional store for onboarding records.
///
/// `begin` hands out one transaction per request. Everything the request reads
/// and writes goes through that handle, so a read-check-write sequence is as
/// atomic as the backend's isolation makes it.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn begin(&self, ctx: &RequestContext) -> Result<Box<dyn RecordTransaction>, StoreError>;
}

#[async_trait]
impl<S> RecordStore for Arc<S>
where
    S: RecordStore + ?Sized,
{
    async fn begin(&self, ctx: &RequestContext) -> Result<Box<dyn RecordTransaction>, StoreError> {
        (**self).begin(ctx).await
    }
}

/// An open transaction against the record store.
///
/// Dropping a transaction without calling `commit` discards its writes.
#[async_trait]
pub trait RecordTransaction: Send {
    /// Records matching `filter`, ordered by creation time.
    async fn read(&mut self, filter: RecordFilter) -> Result<Vec<OnboardingRecord>, StoreError>;

    /// Persist a new record. The store assigns the id and timestamps.
    async fn insert(&mut self, fields: OnboardingFields) -> Result<OnboardingRecord, StoreError>;

    /// Set the fields present in `changes` on every matching record.
    ///
    /// Returns the number of records touched.
    async fn update(
        &mut self,
        filter: RecordFilter,
        changes: &OnboardingFields,
    ) -> Result<u64, StoreError>;

    async fn commit(self: Box<Self>) -> Result<(), StoreError>;

    async fn rollback(self: Box<Self>) -> Result<(), StoreError>;
}
