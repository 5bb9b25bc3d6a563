#![deny(clippy::wildcard_imports)]
#![cfg_attr(test, allow(clippy::wildcard_imports))]

pub mod adapters;
pub mod config;
pub mod domain;
pub mod errors;
pub mod infra;
pub mod repos;
pub mod services;
pub mod telemetry;

// Re-exports for public API
pub use adapters::memory::InMemoryWalkStore;
pub use config::{ConfigError, RotationConfig};
pub use errors::{DomainError, ErrorCode};
pub use infra::clock::{Clock, ManualClock, SystemClock};
pub use repos::{StoreError, Versioned, WalkStore};
pub use services::{
    ParticipantService, RotationCoordinator, RotationOutcome, RoundScheduler, ServiceContext,
    WalkLifecycleGuard,
};

// Auto-initialize logging for unit tests
#[cfg(test)]
#[ctor::ctor]
fn init_test_logging() {
    walks_test_support::logging::init();
}
