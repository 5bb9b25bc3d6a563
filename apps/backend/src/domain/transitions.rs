use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::domain::lifecycle::WalkPhase;
use crate::domain::round::{Pair, Round};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkLifecycleView {
    pub version: i64,
    pub phase: WalkPhase,
    pub active_round: Option<u32>,
}

/// Payload handed to the notification layer when a round opens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundActivated {
    pub walk_id: i64,
    pub round_number: u32,
    pub pairs: Vec<Pair>,
    pub question_prompt: Option<String>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub planned_end_time: Option<OffsetDateTime>,
}

impl From<&Round> for RoundActivated {
    fn from(round: &Round) -> Self {
        Self {
            walk_id: round.walk_id,
            round_number: round.round_number,
            pairs: round.pairs.clone(),
            question_prompt: round.question_prompt.clone(),
            planned_end_time: round.planned_end_time,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WalkTransition {
    /// Edge-triggered: Scheduled -> Started
    WalkStarted,

    /// Edge-triggered: the active round was closed
    RoundClosed { round_number: u32 },

    /// Edge-triggered: Started -> Ended
    WalkEnded,

    /// Explicit: a round was opened, with everything needed to announce it
    RoundActivated(RoundActivated),
}

/// Derive edge transitions from before/after lifecycle state.
///
/// `RoundActivated` carries the pairs, so it is added explicitly by the
/// caller that opened the round.
pub fn derive_walk_transitions(
    before: &WalkLifecycleView,
    after: &WalkLifecycleView,
) -> Vec<WalkTransition> {
    let mut transitions = Vec::new();

    if before.phase == WalkPhase::Scheduled && after.phase != WalkPhase::Scheduled {
        transitions.push(WalkTransition::WalkStarted);
    }

    if let Some(round_number) = before.active_round {
        if after.active_round != Some(round_number) {
            transitions.push(WalkTransition::RoundClosed { round_number });
        }
    }

    if before.phase != WalkPhase::Ended && after.phase == WalkPhase::Ended {
        transitions.push(WalkTransition::WalkEnded);
    }

    transitions
}
