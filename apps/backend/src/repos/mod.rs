//! Storage boundary for walks, rounds and participants.
//!
//! Walk-scoped commits carry the version the caller read. A store applies
//! the whole commit and bumps the version, or applies nothing and reports
//! [`StoreError::VersionConflict`].

pub mod dto;

use async_trait::async_trait;
use thiserror::Error;

pub use dto::{
    LifecycleChange, LifecycleCommit, ParticipantCommit, ParticipantPatch, RotationCommit,
    RoundPromptCommit,
};

use crate::domain::participant::{Location, Participant, ParticipantStatus};
use crate::domain::round::Round;
use crate::domain::walk::{MeetupSettings, NewWalk, Uid, Walk};

/// A value together with the walk version it was read at.
#[derive(Debug, Clone, PartialEq)]
pub struct Versioned<T> {
    pub value: T,
    pub version: i64,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("walk {walk_id} not found")]
    WalkNotFound { walk_id: i64 },

    #[error("round {round_number} of walk {walk_id} not found")]
    RoundNotFound { walk_id: i64, round_number: u32 },

    #[error("participant {uid} not found on walk {walk_id}")]
    ParticipantNotFound { walk_id: i64, uid: Uid },

    #[error("version conflict on walk {walk_id}: expected {expected}, actual {actual}")]
    VersionConflict {
        walk_id: i64,
        expected: i64,
        actual: i64,
    },

    #[error("participant {uid} on walk {walk_id} changed: expected {expected:?}, found {actual:?}")]
    ParticipantConflict {
        walk_id: i64,
        uid: Uid,
        expected: Option<ParticipantStatus>,
        actual: Option<ParticipantStatus>,
    },

    #[error("commit rejected on walk {walk_id}: {detail}")]
    Integrity { walk_id: i64, detail: String },

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait WalkStore: Send + Sync {
    async fn insert_walk(&self, new_walk: NewWalk) -> Result<Versioned<Walk>, StoreError>;

    async fn read_walk(&self, walk_id: i64) -> Result<Versioned<Walk>, StoreError>;

    /// Started and completed rounds, ordered by round number.
    async fn read_rounds(&self, walk_id: i64) -> Result<Vec<Round>, StoreError>;

    async fn read_participants(&self, walk_id: i64) -> Result<Vec<Participant>, StoreError>;

    /// Returns the new walk version.
    async fn commit_rotation(&self, commit: RotationCommit) -> Result<i64, StoreError>;

    async fn commit_lifecycle(&self, commit: LifecycleCommit) -> Result<i64, StoreError>;

    async fn commit_walk_settings(
        &self,
        walk_id: i64,
        expected_version: i64,
        settings: MeetupSettings,
    ) -> Result<i64, StoreError>;

    async fn commit_round_prompt(&self, commit: RoundPromptCommit) -> Result<i64, StoreError>;

    /// Writes status and progress fields only, and only if the record's
    /// status still matches `commit.expected`. Returns the stored record.
    async fn commit_participant(
        &self,
        commit: ParticipantCommit,
    ) -> Result<Participant, StoreError>;

    /// Writes only `last_location`.
    async fn commit_location(
        &self,
        walk_id: i64,
        uid: &Uid,
        location: Location,
    ) -> Result<(), StoreError>;
}
