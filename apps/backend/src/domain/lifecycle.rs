//! Walk lifecycle rules: `Scheduled -> Started -> Ended`.
//!
//! Only the owner moves a walk along this line. Participants never touch
//! walk-level fields; their own status lives on `Participant`.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::domain::round::Round;
use crate::domain::schedule::{plan_close, RoundClose};
use crate::domain::walk::{Uid, Walk};
use crate::domain::walk_clock::{walk_status, ClockWindow, WalkStatus};
use crate::errors::domain::{DomainError, TransitionKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WalkPhase {
    Scheduled,
    Started,
    Ended,
}

pub fn ensure_owner(walk: &Walk, actor: &Uid) -> Result<(), DomainError> {
    if walk.is_owner(actor) {
        Ok(())
    } else {
        Err(DomainError::not_owner(format!(
            "{actor} does not own walk {}",
            walk.id
        )))
    }
}

pub fn check_start(walk: &Walk, actor: &Uid) -> Result<(), DomainError> {
    ensure_owner(walk, actor)?;
    match walk.phase() {
        WalkPhase::Scheduled => Ok(()),
        WalkPhase::Started => Err(DomainError::transition(
            TransitionKind::AlreadyStarted,
            format!("walk {} has already started", walk.id),
        )),
        WalkPhase::Ended => Err(DomainError::transition(
            TransitionKind::AlreadyEnded,
            format!("walk {} has ended and cannot be restarted", walk.id),
        )),
    }
}

pub fn check_end(walk: &Walk, actor: &Uid) -> Result<(), DomainError> {
    ensure_owner(walk, actor)?;
    match walk.phase() {
        WalkPhase::Started => Ok(()),
        WalkPhase::Scheduled => Err(DomainError::transition(
            TransitionKind::NotStarted,
            format!("walk {} was never started", walk.id),
        )),
        WalkPhase::Ended => Err(DomainError::transition(
            TransitionKind::AlreadyEnded,
            format!("walk {} has already ended", walk.id),
        )),
    }
}

/// Rotation needs the owner and a walk that is either started or inside
/// its active window.
pub fn check_rotate(
    walk: &Walk,
    actor: &Uid,
    now: OffsetDateTime,
    window: &ClockWindow,
) -> Result<(), DomainError> {
    ensure_owner(walk, actor)?;
    match walk.phase() {
        WalkPhase::Ended => Err(DomainError::transition(
            TransitionKind::AlreadyEnded,
            format!("walk {} has ended", walk.id),
        )),
        WalkPhase::Started => Ok(()),
        WalkPhase::Scheduled => {
            if walk_status(walk, now, window) == WalkStatus::Active {
                Ok(())
            } else {
                Err(DomainError::transition(
                    TransitionKind::WalkNotActive,
                    format!("walk {} is neither started nor active", walk.id),
                ))
            }
        }
    }
}

/// Timestamps written when the walk ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndPlan {
    pub ended_at: OffsetDateTime,
    pub close: Option<RoundClose>,
}

/// The end is never earlier than the start, and any active round closes
/// with the walk.
pub fn plan_end(walk: &Walk, rounds: &[Round], now: OffsetDateTime) -> EndPlan {
    let ended_at = walk.started_at.map_or(now, |start| now.max(start));
    EndPlan {
        ended_at,
        close: plan_close(rounds, ended_at),
    }
}
