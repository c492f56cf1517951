//! Postgres-backed record store.
//!
//! One table, `customer_onboardings`, holds the records. Every request runs in
//! its own `sqlx` transaction. Id-scoped reads take a row lock
//! (`SELECT ... FOR UPDATE`), so two concurrent `SubmitForReview` calls on the
//! same record are serialised: the second one waits for the first to commit
//! and then observes `SUBMITTED`.
//!
//! ## Error Mapping
//!
//! | SQLx Error | StoreError |
//! |------------|------------|
//! | `PoolClosed`, `PoolTimedOut`, `Io`, `Tls` | `Connection` |
//! | `ColumnDecode`, `Decode`, unknown status text | `Decode` |
//! | anything else | `Query` |

use async_trait::async_trait;
use chrono::{DateTime, SubsecRound, Utc};
use sqlx::{FromRow, PgPool, Postgres, Row, Transaction};
use tracing::instrument;
use uuid::Uuid;

use onboarding_core::RecordId;
use onboarding_customers::{OnboardingFields, OnboardingRecord, OnboardingStatus};

use crate::context::RequestContext;

use super::r#trait::{RecordFilter, RecordStore, RecordTransaction, StoreError};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS customer_onboardings (
    id          UUID PRIMARY KEY,
    country     TEXT NULL,
    email       TEXT NULL,
    status      TEXT NOT NULL DEFAULT 'DRAFT',
    created_at  TIMESTAMPTZ NOT NULL,
    modified_at TIMESTAMPTZ NOT NULL
)
"#;

const SELECT_BY_ID: &str = r#"
SELECT id, country, email, status, created_at, modified_at
FROM customer_onboardings
WHERE id = $1
FOR UPDATE
"#;

const SELECT_ALL: &str = r#"
SELECT id, country, email, status, created_at, modified_at
FROM customer_onboardings
ORDER BY created_at, id
"#;

/// Postgres-backed record store.
#[derive(Debug, Clone)]
pub struct PostgresRecordStore {
    pool: PgPool,
}

impl PostgresRecordStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect a pool to `database_url`.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPool::connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool))
    }

    /// Create the backing table if it does not exist yet.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(SCHEMA)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("ensure_schema", e))?;
        Ok(())
    }
}

#[async_trait]
impl RecordStore for PostgresRecordStore {
    #[instrument(skip(self, ctx), fields(request_id = %ctx.request_id()), err)]
    async fn begin(&self, ctx: &RequestContext) -> Result<Box<dyn RecordTransaction>, StoreError> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin", e))?;
        Ok(Box::new(PostgresTransaction { tx }))
    }
}

struct PostgresTransaction {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl RecordTransaction for PostgresTransaction {
    #[instrument(skip(self), err)]
    async fn read(&mut self, filter: RecordFilter) -> Result<Vec<OnboardingRecord>, StoreError> {
        let rows = match filter.id() {
            Some(id) => {
                sqlx::query(SELECT_BY_ID)
                    .bind(id.as_uuid())
                    .fetch_all(&mut *self.tx)
                    .await
            }
            None => {
                sqlx::query(SELECT_ALL)
                    .fetch_all(&mut *self.tx)
                    .await
            }
        }
        .map_err(|e| map_sqlx_error("read", e))?;

        rows.iter()
            .map(|row| {
                OnboardingRow::from_row(row)
                    .map_err(|e| map_sqlx_error("read", e))
                    .and_then(OnboardingRecord::try_from)
            })
            .collect()
    }

    #[instrument(skip(self, fields), fields(record_id = tracing::field::Empty), err)]
    async fn insert(&mut self, fields: OnboardingFields) -> Result<OnboardingRecord, StoreError> {
        let record = new_record(fields);
        tracing::Span::current().record("record_id", tracing::field::display(record.record_id()));

        sqlx::query(
            r#"
            INSERT INTO customer_onboardings (id, country, email, status, created_at, modified_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(record.record_id().as_uuid())
        .bind(record.country())
        .bind(record.email())
        .bind(record.status().as_str())
        .bind(record.created_at())
        .bind(record.modified_at())
        .execute(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("insert", e))?;

        Ok(record)
    }

    #[instrument(skip(self, filter, changes), fields(record_id = ?filter.id()), err)]
    async fn update(
        &mut self,
        filter: RecordFilter,
        changes: &OnboardingFields,
    ) -> Result<u64, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE customer_onboardings
            SET country = CASE WHEN $2 THEN $3 ELSE country END,
                email = CASE WHEN $4 THEN $5 ELSE email END,
                status = COALESCE($6, status),
                modified_at = $7
            WHERE ($1::uuid IS NULL OR id = $1)
            "#,
        )
        .bind(filter.id().map(Uuid::from))
        .bind(changes.country.is_some())
        .bind(changes.country_value())
        .bind(changes.email.is_some())
        .bind(changes.email_value())
        .bind(changes.status.map(OnboardingStatus::as_str))
        .bind(column_now())
        .execute(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("update", e))?;

        Ok(result.rows_affected())
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        self.tx
            .commit()
            .await
            .map_err(|e| map_sqlx_error("commit", e))
    }

    async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        self.tx
            .rollback()
            .await
            .map_err(|e| map_sqlx_error("rollback", e))
    }
}

/// Current time at `TIMESTAMPTZ` precision (microseconds), so the values a
/// write returns are the values a later read sees.
fn column_now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// The record an insert writes and returns.
fn new_record(fields: OnboardingFields) -> OnboardingRecord {
    OnboardingRecord::new(RecordId::new(), fields, column_now())
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::PoolClosed | sqlx::Error::PoolTimedOut => {
            StoreError::Connection(format!("connection pool unavailable in {operation}"))
        }
        sqlx::Error::Io(e) => StoreError::Connection(format!("io error in {operation}: {e}")),
        sqlx::Error::Tls(e) => StoreError::Connection(format!("tls error in {operation}: {e}")),
        sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
            StoreError::Decode(format!("decode error in {operation}: {err}"))
        }
        sqlx::Error::Database(db_err) => {
            StoreError::Query(format!("database error in {operation}: {}", db_err.message()))
        }
        _ => StoreError::Query(format!("sqlx error in {operation}: {err}")),
    }
}

// SQLx row types

#[derive(Debug)]
struct OnboardingRow {
    id: Uuid,
    country: Option<String>,
    email: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
    modified_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, sqlx::postgres::PgRow> for OnboardingRow {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        Ok(OnboardingRow {
            id: row.try_get("id")?,
            country: row.try_get("country")?,
            email: row.try_get("email")?,
            status: row.try_get("status")?,
            created_at: row.try_get("created_at")?,
            modified_at: row.try_get("modified_at")?,
        })
    }
}

impl TryFrom<OnboardingRow> for OnboardingRecord {
    type Error = StoreError;

    fn try_from(row: OnboardingRow) -> Result<Self, Self::Error> {
        let status = row
            .status
            .parse::<OnboardingStatus>()
            .map_err(|e| StoreError::Decode(format!("row {}: {}", row.id, e.message())))?;

        Ok(OnboardingRecord::restore(
            RecordId::from_uuid(row.id),
            row.country,
            row.email,
            status,
            row.created_at,
            row.modified_at,
        ))
    }
}
