//! Write payloads crossing the storage boundary.

use std::collections::VecDeque;

use time::OffsetDateTime;

use crate::domain::participant::{Participant, ParticipantStatus, SourceType};
use crate::domain::round::{Round, RoundRef, UpcomingRound};
use crate::domain::schedule::RoundClose;
use crate::domain::walk::Uid;
use crate::domain::walk_clock::WalkStatus;

/// Close, open and queue shift applied as one unit.
#[derive(Debug, Clone, PartialEq)]
pub struct RotationCommit {
    pub walk_id: i64,
    pub expected_version: i64,
    pub close: Option<RoundClose>,
    pub open: Option<Round>,
    /// Replacement queue; `None` leaves it untouched.
    pub upcoming: Option<VecDeque<UpcomingRound>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleChange {
    Start { at: OffsetDateTime },
    End { at: OffsetDateTime },
    ForceStatus(Option<WalkStatus>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct LifecycleCommit {
    pub walk_id: i64,
    pub expected_version: i64,
    pub change: LifecycleChange,
    /// Round closed together with the change (ending a walk).
    pub close: Option<RoundClose>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RoundPromptCommit {
    pub walk_id: i64,
    pub expected_version: i64,
    pub round: RoundRef,
    pub prompt: Option<String>,
}

/// Status and progress fields of one participant record.
///
/// `last_location` is not part of it: only the location writer sets that.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticipantPatch {
    pub source_type: SourceType,
    pub accepted_at: Option<OffsetDateTime>,
    pub denied_at: Option<OffsetDateTime>,
    pub cancelled_at: Option<OffsetDateTime>,
    pub on_the_way_at: Option<OffsetDateTime>,
    pub arrived_at: Option<OffsetDateTime>,
}

impl ParticipantPatch {
    pub fn apply_to(&self, participant: &mut Participant) {
        participant.source_type = self.source_type;
        participant.accepted_at = self.accepted_at;
        participant.denied_at = self.denied_at;
        participant.cancelled_at = self.cancelled_at;
        participant.on_the_way_at = self.on_the_way_at;
        participant.arrived_at = self.arrived_at;
    }
}

impl From<&Participant> for ParticipantPatch {
    fn from(p: &Participant) -> Self {
        Self {
            source_type: p.source_type,
            accepted_at: p.accepted_at,
            denied_at: p.denied_at,
            cancelled_at: p.cancelled_at,
            on_the_way_at: p.on_the_way_at,
            arrived_at: p.arrived_at,
        }
    }
}

/// Field-scoped participant write, guarded by the status the caller read.
#[derive(Debug, Clone, PartialEq)]
pub struct ParticipantCommit {
    pub walk_id: i64,
    pub uid: Uid,
    /// `None` when the record must not exist yet.
    pub expected: Option<ParticipantStatus>,
    pub patch: ParticipantPatch,
}

impl ParticipantCommit {
    /// Create `participant`; fails if a record already exists.
    pub fn insert(walk_id: i64, participant: &Participant) -> Self {
        Self {
            walk_id,
            uid: participant.user_uid.clone(),
            expected: None,
            patch: participant.into(),
        }
    }

    /// Replace the fields of a record that was read as `before`.
    pub fn update(walk_id: i64, before: &Participant, after: &Participant) -> Self {
        Self {
            walk_id,
            uid: after.user_uid.clone(),
            expected: Some(before.status()),
            patch: after.into(),
        }
    }
}
