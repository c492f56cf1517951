use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::instrument;

use onboarding_core::RecordId;
use onboarding_customers::{OnboardingFields, OnboardingRecord};

use crate::context::RequestContext;

use super::r#trait::{RecordFilter, RecordStore, RecordTransaction, StoreError};

type Records = BTreeMap<RecordId, OnboardingRecord>;

/// In-memory record store.
///
/// Intended for tests/dev. A transaction owns the store lock until it commits
/// or is dropped, so transactions are fully serialised.
#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    records: Arc<Mutex<Records>>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Committed records, ordered by creation time. Waits for any open
    /// transaction to finish.
    pub async fn snapshot(&self) -> Vec<OnboardingRecord> {
        let records = self.records.lock().await;
        ordered(records.values().cloned().collect())
    }

    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn begin(&self, ctx: &RequestContext) -> Result<Box<dyn RecordTransaction>, StoreError> {
        let guard = self.records.clone().lock_owned().await;
        let staged = guard.clone();
        tracing::trace!(request_id = %ctx.request_id(), "in-memory transaction opened");

        Ok(Box::new(InMemoryTransaction { guard, staged }))
    }
}

struct InMemoryTransaction {
    guard: OwnedMutexGuard<Records>,
    staged: Records,
}

#[async_trait]
impl RecordTransaction for InMemoryTransaction {
    async fn read(&mut self, filter: RecordFilter) -> Result<Vec<OnboardingRecord>, StoreError> {
        if let Some(id) = filter.id() {
            return Ok(self.staged.get(&id).cloned().into_iter().collect());
        }

        Ok(ordered(
            self.staged
                .values()
                .filter(|r| filter.matches(r))
                .cloned()
                .collect(),
        ))
    }

    #[instrument(skip(self, fields), fields(record_id = tracing::field::Empty))]
    async fn insert(&mut self, fields: OnboardingFields) -> Result<OnboardingRecord, StoreError> {
        let mut id = RecordId::new();
        while self.staged.contains_key(&id) {
            id = RecordId::new();
        }

        tracing::Span::current().record("record_id", tracing::field::display(id));

        let record = OnboardingRecord::new(id, fields, Utc::now());
        self.staged.insert(id, record.clone());
        Ok(record)
    }

    #[instrument(skip(self, filter, changes), fields(record_id = ?filter.id()))]
    async fn update(
        &mut self,
        filter: RecordFilter,
        changes: &OnboardingFields,
    ) -> Result<u64, StoreError> {
        let now = Utc::now();
        let mut touched = 0u64;
        for record in self.staged.values_mut().filter(|r| filter.matches(r)) {
            record.apply(changes, now);
            touched += 1;
        }
        Ok(touched)
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let InMemoryTransaction { mut guard, staged } = *self;
        *guard = staged;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        // Staged writes are dropped together with the lock guard.
        Ok(())
    }
}

fn ordered(mut records: Vec<OnboardingRecord>) -> Vec<OnboardingRecord> {
    records.sort_by_key(|r| (r.created_at(), r.record_id()));
    records
}
