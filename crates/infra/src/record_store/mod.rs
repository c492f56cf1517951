//! Record store boundary.
//!
//! The guard only needs transactional read-by-filter and update-by-filter on
//! onboarding records; this module defines that contract and two adapters
//! (in-memory for tests/dev, Postgres for persistent deployments).

pub mod in_memory;
pub mod postgres;
pub mod r#trait;

pub use in_memory::InMemoryRecordStore;
pub use postgres::PostgresRecordStore;
pub use r#trait::{RecordFilter, RecordStore, RecordTransaction, StoreError};
