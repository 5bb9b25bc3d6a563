//! Explicit context for background location writers.
//!
//! A writer is handed a [`LocationContext`] when a participant's walk starts
//! and keeps it for its lifetime. It never looks up the current user or
//! walk anywhere else.

use time::OffsetDateTime;

use crate::domain::lifecycle::WalkPhase;
use crate::domain::walk::{Uid, Walk};
use crate::domain::walk_clock::{walk_end, ClockWindow};
use crate::errors::domain::{DomainError, TransitionKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationContext {
    walk_id: i64,
    user_uid: Uid,
    end_time: OffsetDateTime,
}

impl LocationContext {
    /// Context for `user_uid` on a started walk. Writes are accepted until
    /// one leeway after the walk's end.
    pub fn for_walk(walk: &Walk, user_uid: Uid, window: &ClockWindow) -> Result<Self, DomainError> {
        match walk.phase() {
            WalkPhase::Started => Ok(Self {
                walk_id: walk.id,
                user_uid,
                end_time: walk_end(walk, window) + window.leeway,
            }),
            WalkPhase::Scheduled => Err(DomainError::transition(
                TransitionKind::NotStarted,
                format!("walk {} has not started", walk.id),
            )),
            WalkPhase::Ended => Err(DomainError::transition(
                TransitionKind::AlreadyEnded,
                format!("walk {} has ended", walk.id),
            )),
        }
    }

    pub fn walk_id(&self) -> i64 {
        self.walk_id
    }

    pub fn user_uid(&self) -> &Uid {
        &self.user_uid
    }

    pub fn end_time(&self) -> OffsetDateTime {
        self.end_time
    }

    pub fn accepts(&self, now: OffsetDateTime) -> bool {
        now <= self.end_time
    }
}
