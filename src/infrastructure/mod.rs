//! Infrastructure layer - External service integrations
//!
//! This layer contains:
//! - the certificate contract ABI and Alloy-backed source
//! - the loader that turns contract reads into certificates
//! - Tokio runtime bridge for async loading

pub mod ethereum;
pub mod runtime;

pub use ethereum::{Connection, FailedToken, LoaderError, ProviderConfig};
pub use runtime::{RuntimeBridge, RuntimeCommand, RuntimeEvent, WorkerConfig};
