//! Infrastructure layer: record store adapters, request dispatch, config.

pub mod config;
pub mod context;
pub mod dispatcher;
pub mod handlers;
pub mod record_store;

#[cfg(test)]
mod integration_tests;

pub use context::RequestContext;
pub use dispatcher::{DispatchError, OnboardingRequest, OnboardingResponse, RequestDispatcher};
pub use record_store::{
    InMemoryRecordStore, PostgresRecordStore, RecordFilter, RecordStore, RecordTransaction,
    StoreError,
};
