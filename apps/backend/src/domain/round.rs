//! Rounds and the pairs assigned within them.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::domain::walk::Uid;

/// Participants assigned together for one round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pair {
    pub user_uids: BTreeSet<Uid>,
    /// Display only.
    pub color: String,
    /// Display only.
    pub emoji: String,
}

impl Pair {
    pub fn contains(&self, uid: &Uid) -> bool {
        self.user_uids.contains(uid)
    }

    pub fn len(&self) -> usize {
        self.user_uids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.user_uids.is_empty()
    }
}

/// A pre-generated, unstarted round waiting in a meetup's queue.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpcomingRound {
    pub question_prompt: Option<String>,
    pub pairs: Vec<Pair>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundState {
    Upcoming,
    Active,
    Completed,
}

/// One timed pairing generation of a meetup walk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Round {
    pub walk_id: i64,
    /// Starts at 1, strictly increasing per walk.
    pub round_number: u32,
    #[serde(with = "time::serde::rfc3339::option")]
    pub start_time: Option<OffsetDateTime>,
    /// Start plus the suggested duration; written once when the round opens.
    #[serde(with = "time::serde::rfc3339::option")]
    pub planned_end_time: Option<OffsetDateTime>,
    /// Actual close. `None` while the round is running.
    #[serde(with = "time::serde::rfc3339::option")]
    pub end_time: Option<OffsetDateTime>,
    pub question_prompt: Option<String>,
    pub pairs: Vec<Pair>,
}

impl Round {
    pub fn state(&self) -> RoundState {
        match (self.start_time, self.end_time) {
            (None, _) => RoundState::Upcoming,
            (Some(_), None) => RoundState::Active,
            (Some(_), Some(_)) => RoundState::Completed,
        }
    }

    pub fn is_active(&self) -> bool {
        self.state() == RoundState::Active
    }

    /// The pair a participant belongs to this round, if any.
    pub fn pair_of(&self, uid: &Uid) -> Option<&Pair> {
        self.pairs.iter().find(|p| p.contains(uid))
    }
}

/// Addresses a round for prompt edits: a persisted round by number, or a
/// queued one by position in the upcoming queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundRef {
    Numbered(u32),
    Upcoming(usize),
}

/// Union of all members across the given pairs.
pub fn coverage(pairs: &[Pair]) -> BTreeSet<Uid> {
    pairs
        .iter()
        .flat_map(|p| p.user_uids.iter().cloned())
        .collect()
}
