//! Runtime infrastructure - Tokio runtime bridge for async loading

mod bridge;
mod worker;

pub use bridge::{RuntimeBridge, RuntimeCommand, RuntimeEvent, WorkerConfig};
pub use worker::run_async_worker;
