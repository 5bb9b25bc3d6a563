//! Service layer: loads walk state from the store, runs the pure domain
//! planners and commits the result in a single compare-and-swap write.

pub mod lifecycle;
pub mod participants;
pub mod rotation;
pub mod rounds;
mod snapshot;

use std::sync::Arc;

use time::OffsetDateTime;

pub use lifecycle::{LifecycleOutcome, WalkLifecycleGuard};
pub use participants::ParticipantService;
pub use rotation::RotationCoordinator;
pub use rounds::{CloseOutcome, RoundChange, RoundScheduler, RotationOutcome};

use crate::config::RotationConfig;
use crate::domain::walk_clock::ClockWindow;
use crate::infra::clock::{Clock, SystemClock};
use crate::repos::WalkStore;

/// Everything a service needs: where walks live, what time it is, and how
/// rotation is tuned.
#[derive(Clone)]
pub struct ServiceContext {
    pub store: Arc<dyn WalkStore>,
    pub clock: Arc<dyn Clock>,
    pub config: Arc<RotationConfig>,
}

impl ServiceContext {
    pub fn new(store: Arc<dyn WalkStore>, clock: Arc<dyn Clock>, config: RotationConfig) -> Self {
        Self {
            store,
            clock,
            config: Arc::new(config),
        }
    }

    pub fn with_system_clock(store: Arc<dyn WalkStore>, config: RotationConfig) -> Self {
        Self::new(store, Arc::new(SystemClock), config)
    }

    pub fn now(&self) -> OffsetDateTime {
        self.clock.now()
    }

    pub fn window(&self) -> ClockWindow {
        ClockWindow::from_config(&self.config)
    }
}
