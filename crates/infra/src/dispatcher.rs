//! Request dispatch (application-level orchestration).
//!
//! ```text
//! OnboardingRequest
//!   ↓
//! 1. Open one transaction for the request (store.begin)
//!   ↓
//! 2. Route by operation name to a handler (validator / transition handler)
//!   ↓
//! 3. Commit on success, roll back on any error
//! ```
//!
//! Handlers are plain functions. The dispatcher holds nothing but the store,
//! so requests share no mutable state beyond what the store itself guards.

use core::str::FromStr;

use serde::Serialize;
use thiserror::Error;

use onboarding_core::{DomainError, DomainResult, RecordId};
use onboarding_customers::{Action, OnboardingFields, OnboardingRecord, SubmittedReview};

use crate::context::RequestContext;
use crate::handlers;
use crate::record_store::{RecordStore, RecordTransaction, StoreError};

#[derive(Debug, Error)]
pub enum DispatchError {
    /// Expected, user-facing rejection (validation, not found, conflict).
    #[error(transparent)]
    Domain(#[from] DomainError),
    /// Lower-level store failure, passed through unmodified.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A request against the onboarding records, one variant per operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OnboardingRequest {
    Create(OnboardingFields),
    Update { id: RecordId, fields: OnboardingFields },
    Read { id: RecordId },
    List,
    SubmitForReview { id: RecordId },
}

impl OnboardingRequest {
    /// Build a request from an operation name.
    ///
    /// Operation names are `create`, `update`, `read`, `list` and the named
    /// actions (`SubmitForReview`).
    pub fn from_operation(
        operation: &str,
        id: Option<RecordId>,
        fields: OnboardingFields,
    ) -> DomainResult<Self> {
        let require_id = || {
            id.ok_or_else(|| {
                DomainError::invalid_id(format!("operation `{operation}` requires an id"))
            })
        };

        match operation {
            "create" => Ok(Self::Create(fields)),
            "update" => Ok(Self::Update {
                id: require_id()?,
                fields,
            }),
            "read" => Ok(Self::Read { id: require_id()? }),
            "list" => Ok(Self::List),
            other => match Action::from_str(other)? {
                Action::SubmitForReview => Ok(Self::SubmitForReview { id: require_id()? }),
            },
        }
    }

    /// Build the request for a named action against a record.
    pub fn action(action: Action, id: RecordId) -> Self {
        match action {
            Action::SubmitForReview => Self::SubmitForReview { id },
        }
    }

    pub fn operation(&self) -> &'static str {
        match self {
            Self::Create(_) => "create",
            Self::Update { .. } => "update",
            Self::Read { .. } => "read",
            Self::List => "list",
            Self::SubmitForReview { .. } => Action::SubmitForReview.name(),
        }
    }

    pub fn record_id(&self) -> Option<RecordId> {
        match self {
            Self::Update { id, .. } | Self::Read { id } | Self::SubmitForReview { id } => Some(*id),
            Self::Create(_) | Self::List => None,
        }
    }
}

/// Typed result of a dispatched request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum OnboardingResponse {
    Record(OnboardingRecord),
    Records(Vec<OnboardingRecord>),
    Submitted(SubmittedReview),
}

/// Routes requests to handlers, one transaction per request.
#[derive(Debug)]
pub struct RequestDispatcher<S> {
    store: S,
}

impl<S> RequestDispatcher<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }
}

impl<S> RequestDispatcher<S>
where
    S: RecordStore,
{
    /// Run `request` to completion inside a single store transaction.
    ///
    /// The transaction is committed only when the handler succeeds. Domain
    /// rejections and store failures roll it back and are returned as-is.
    pub async fn dispatch(
        &self,
        ctx: &RequestContext,
        request: OnboardingRequest,
    ) -> Result<OnboardingResponse, DispatchError> {
        let operation = request.operation();
        tracing::debug!(
            request_id = %ctx.request_id(),
            operation,
            record_id = ?request.record_id(),
            "dispatching onboarding request"
        );

        let mut tx = self.store.begin(ctx).await?;
        let outcome = route(tx.as_mut(), request).await;

        match outcome {
            Ok(response) => {
                tx.commit().await?;
                Ok(response)
            }
            Err(err) => {
                if let Err(rollback_err) = tx.rollback().await {
                    tracing::warn!(
                        request_id = %ctx.request_id(),
                        operation,
                        error = %rollback_err,
                        "rollback failed"
                    );
                }
                Err(err)
            }
        }
    }
}

async fn route(
    tx: &mut dyn RecordTransaction,
    request: OnboardingRequest,
) -> Result<OnboardingResponse, DispatchError> {
    match request {
        OnboardingRequest::Create(fields) => handlers::create(tx, fields)
            .await
            .map(OnboardingResponse::Record),
        OnboardingRequest::Update { id, fields } => handlers::update(tx, id, fields)
            .await
            .map(OnboardingResponse::Record),
        OnboardingRequest::Read { id } => {
            handlers::read(tx, id).await.map(OnboardingResponse::Record)
        }
        OnboardingRequest::List => handlers::list(tx).await.map(OnboardingResponse::Records),
        OnboardingRequest::SubmitForReview { id } => handlers::submit_for_review(tx, id)
            .await
            .map(OnboardingResponse::Submitted),
    }
}
