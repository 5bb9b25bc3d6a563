//! Walk aggregate: identity, schedule, lifecycle timestamps and walk kind.

use std::collections::VecDeque;
use std::fmt;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::config::RotationConfig;
use crate::domain::lifecycle::WalkPhase;
use crate::domain::round::UpcomingRound;
use crate::domain::walk_clock::WalkStatus;
use crate::errors::domain::{DomainError, ValidationKind};

/// Opaque user identifier as issued by the auth provider.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Uid(String);

impl Uid {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Uid {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}

impl From<String> for Uid {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

/// Flat walk type, for callers that only need the tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WalkType {
    Friends,
    Neighborhood,
    Meetup,
    Virtual,
}

/// Per-meetup rotation settings and the pre-generated round queue.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeetupSettings {
    /// Target group size; `None` means the configured default (pairs).
    pub group_size: Option<u8>,
    /// Lower bound for a round's suggested duration, in minutes.
    pub minimum_minutes_with_each_partner: Option<u32>,
    /// Unstarted rounds, consumed front-first by rotation.
    pub upcoming_rounds: VecDeque<UpcomingRound>,
}

/// Walk kind. Only `Meetup` carries rotation state, so the rounds
/// subsystem can only be reached through [`Walk::as_meetup`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WalkKind {
    Friends,
    Neighborhood,
    Meetup(MeetupSettings),
    Virtual,
}

impl WalkKind {
    pub fn walk_type(&self) -> WalkType {
        match self {
            WalkKind::Friends => WalkType::Friends,
            WalkKind::Neighborhood => WalkType::Neighborhood,
            WalkKind::Meetup(_) => WalkType::Meetup,
            WalkKind::Virtual => WalkType::Virtual,
        }
    }
}

/// A scheduled or in-progress group walk.
#[derive(Debug, Clone, PartialEq)]
pub struct Walk {
    pub id: i64,
    /// Scheduled start.
    pub date: OffsetDateTime,
    pub duration_minutes: u32,
    pub started_at: Option<OffsetDateTime>,
    pub ended_at: Option<OffsetDateTime>,
    /// Explicit end; overrides the computed one when present.
    pub estimated_end_time: Option<OffsetDateTime>,
    pub created_by_uid: Uid,
    pub kind: WalkKind,
    /// Manual status override. Takes precedence over the computed window.
    pub forced_status: Option<WalkStatus>,
    /// Base seed for all pairing randomness of this walk.
    pub rng_seed: i64,
}

impl Walk {
    pub fn is_owner(&self, uid: &Uid) -> bool {
        &self.created_by_uid == uid
    }

    pub fn walk_type(&self) -> WalkType {
        self.kind.walk_type()
    }

    pub fn phase(&self) -> WalkPhase {
        match (self.started_at, self.ended_at) {
            (_, Some(_)) => WalkPhase::Ended,
            (Some(_), None) => WalkPhase::Started,
            (None, None) => WalkPhase::Scheduled,
        }
    }

    /// Narrow to the meetup variant, the only one with rounds.
    pub fn as_meetup(&self) -> Result<MeetupWalk<'_>, DomainError> {
        match &self.kind {
            WalkKind::Meetup(settings) => Ok(MeetupWalk {
                walk: self,
                settings,
            }),
            other => Err(DomainError::validation(
                ValidationKind::NotMeetupWalk,
                format!(
                    "walk {} is a {:?} walk; rounds only exist for meetups",
                    self.id,
                    other.walk_type()
                ),
            )),
        }
    }

    /// Mutable access to meetup settings, same narrowing as [`Walk::as_meetup`].
    pub fn meetup_settings_mut(&mut self) -> Result<&mut MeetupSettings, DomainError> {
        let id = self.id;
        match &mut self.kind {
            WalkKind::Meetup(settings) => Ok(settings),
            other => Err(DomainError::validation(
                ValidationKind::NotMeetupWalk,
                format!(
                    "walk {id} is a {:?} walk; rounds only exist for meetups",
                    other.walk_type()
                ),
            )),
        }
    }

    /// Check the timestamp invariants.
    pub fn validate(&self) -> Result<(), DomainError> {
        match (self.started_at, self.ended_at) {
            (None, Some(_)) => Err(DomainError::validation(
                ValidationKind::InvalidTimestamps,
                format!("walk {} has ended_at without started_at", self.id),
            )),
            (Some(start), Some(end)) if end < start => Err(DomainError::validation(
                ValidationKind::InvalidTimestamps,
                format!("walk {} ended before it started", self.id),
            )),
            _ => Ok(()),
        }
    }
}

/// Borrowed view of a walk known to be a meetup.
#[derive(Debug, Clone, Copy)]
pub struct MeetupWalk<'a> {
    pub walk: &'a Walk,
    pub settings: &'a MeetupSettings,
}

impl MeetupWalk<'_> {
    /// Group size for allocation: explicit setting, else the configured default.
    pub fn target_group_size(&self, config: &RotationConfig) -> Result<usize, DomainError> {
        let size = self.settings.group_size.unwrap_or(config.default_group_size);
        if size < 2 {
            return Err(DomainError::validation(
                ValidationKind::InvalidGroupSize,
                format!("walk {} has group size {size}; minimum is 2", self.walk.id),
            ));
        }
        Ok(size as usize)
    }

    /// Shortest round the scheduler will suggest, in minutes.
    pub fn round_floor_minutes(&self, config: &RotationConfig) -> i64 {
        self.settings
            .minimum_minutes_with_each_partner
            .map(i64::from)
            .unwrap_or(config.min_round_minutes)
    }
}

/// Input for creating a walk. Id and seed are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewWalk {
    pub date: OffsetDateTime,
    pub duration_minutes: u32,
    pub estimated_end_time: Option<OffsetDateTime>,
    pub created_by_uid: Uid,
    pub kind: WalkKind,
    /// Fixed seed for reproducible pairings; drawn from entropy when `None`.
    pub rng_seed: Option<i64>,
}

impl NewWalk {
    pub fn meetup(created_by: impl Into<Uid>, date: OffsetDateTime, duration_minutes: u32) -> Self {
        Self {
            date,
            duration_minutes,
            estimated_end_time: None,
            created_by_uid: created_by.into(),
            kind: WalkKind::Meetup(MeetupSettings::default()),
            rng_seed: None,
        }
    }

    pub fn with_kind(mut self, kind: WalkKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_estimated_end(mut self, end: OffsetDateTime) -> Self {
        self.estimated_end_time = Some(end);
        self
    }

    pub fn with_seed(mut self, seed: i64) -> Self {
        self.rng_seed = Some(seed);
        self
    }

    pub fn into_walk(self, id: i64) -> Walk {
        Walk {
            id,
            date: self.date,
            duration_minutes: self.duration_minutes,
            started_at: None,
            ended_at: None,
            estimated_end_time: self.estimated_end_time,
            created_by_uid: self.created_by_uid,
            kind: self.kind,
            forced_status: None,
            rng_seed: self.rng_seed.unwrap_or_else(rand::random::<i64>),
        }
    }
}
