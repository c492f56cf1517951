//! Tracing/logging setup shared by every binary in the workspace.

/// Tracing subscriber configuration (filters, output format).
pub mod tracing;

pub use tracing::LogFormat;

/// Initialize process-wide logging from `RUST_LOG` and `LOG_FORMAT`.
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init(LogFormat::from_env());
}
