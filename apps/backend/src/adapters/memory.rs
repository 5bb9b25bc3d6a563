//! In-memory implementation of [`WalkStore`].
//!
//! Every commit runs under one write lock: the version check, the changes
//! and the integrity check either all apply or none do.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::debug;

use crate::domain::participant::{Location, Participant};
use crate::domain::round::{Round, RoundRef};
use crate::domain::schedule::RoundClose;
use crate::domain::walk::{MeetupSettings, NewWalk, Uid, Walk};
use crate::repos::{
    LifecycleChange, LifecycleCommit, ParticipantCommit, RotationCommit, RoundPromptCommit,
    StoreError, Versioned, WalkStore,
};

#[derive(Debug, Clone)]
struct WalkRecord {
    walk: Walk,
    version: i64,
    rounds: Vec<Round>,
    participants: Vec<Participant>,
}

impl WalkRecord {
    fn check_version(&self, expected: i64) -> Result<(), StoreError> {
        if self.version == expected {
            Ok(())
        } else {
            Err(StoreError::VersionConflict {
                walk_id: self.walk.id,
                expected,
                actual: self.version,
            })
        }
    }

    fn integrity(&self, detail: impl Into<String>) -> StoreError {
        StoreError::Integrity {
            walk_id: self.walk.id,
            detail: detail.into(),
        }
    }

    /// Invariants every committed state must satisfy.
    fn verify(&self) -> Result<(), StoreError> {
        self.walk
            .validate()
            .map_err(|e| self.integrity(e.to_string()))?;

        let active = self.rounds.iter().filter(|r| r.is_active()).count();
        if active > 1 {
            return Err(self.integrity(format!("{active} rounds would be active")));
        }
        if self.walk.ended_at.is_some() && active > 0 {
            return Err(self.integrity("ended walk would keep an active round"));
        }
        Ok(())
    }

    fn apply_close(&mut self, close: RoundClose) -> Result<(), StoreError> {
        let walk_id = self.walk.id;
        let round = self
            .rounds
            .iter_mut()
            .find(|r| r.round_number == close.round_number)
            .ok_or(StoreError::RoundNotFound {
                walk_id,
                round_number: close.round_number,
            })?;
        if !round.is_active() {
            return Err(StoreError::Integrity {
                walk_id,
                detail: format!("round {} is not active", close.round_number),
            });
        }
        round.end_time = Some(close.end_time);
        Ok(())
    }

    fn settings_mut(&mut self) -> Result<&mut MeetupSettings, StoreError> {
        let walk_id = self.walk.id;
        self.walk
            .meetup_settings_mut()
            .map_err(|e| StoreError::Integrity {
                walk_id,
                detail: e.to_string(),
            })
    }
}

#[derive(Debug, Default)]
struct Inner {
    next_id: i64,
    walks: HashMap<i64, WalkRecord>,
}

#[derive(Debug, Default)]
pub struct InMemoryWalkStore {
    inner: RwLock<Inner>,
}

impl InMemoryWalkStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read<T>(
        &self,
        walk_id: i64,
        f: impl FnOnce(&WalkRecord) -> T,
    ) -> Result<T, StoreError> {
        let inner = self.inner.read();
        inner
            .walks
            .get(&walk_id)
            .map(f)
            .ok_or(StoreError::WalkNotFound { walk_id })
    }

    /// Apply `f` to a copy of the record and swap it in only if the result
    /// passes [`WalkRecord::verify`]. Returns the new version.
    fn commit(
        &self,
        walk_id: i64,
        expected_version: i64,
        f: impl FnOnce(&mut WalkRecord) -> Result<(), StoreError>,
    ) -> Result<i64, StoreError> {
        let mut inner = self.inner.write();
        let current = inner
            .walks
            .get_mut(&walk_id)
            .ok_or(StoreError::WalkNotFound { walk_id })?;
        current.check_version(expected_version)?;

        let mut next = current.clone();
        f(&mut next)?;
        next.verify()?;
        next.version += 1;

        let version = next.version;
        *current = next;
        debug!(walk_id, version, "Walk committed");
        Ok(version)
    }
}

#[async_trait]
impl WalkStore for InMemoryWalkStore {
    async fn insert_walk(&self, new_walk: NewWalk) -> Result<Versioned<Walk>, StoreError> {
        let mut inner = self.inner.write();
        inner.next_id += 1;
        let walk = new_walk.into_walk(inner.next_id);
        let record = WalkRecord {
            walk: walk.clone(),
            version: 1,
            rounds: Vec::new(),
            participants: Vec::new(),
        };
        inner.walks.insert(walk.id, record);
        Ok(Versioned {
            value: walk,
            version: 1,
        })
    }

    async fn read_walk(&self, walk_id: i64) -> Result<Versioned<Walk>, StoreError> {
        self.read(walk_id, |r| Versioned {
            value: r.walk.clone(),
            version: r.version,
        })
    }

    async fn read_rounds(&self, walk_id: i64) -> Result<Vec<Round>, StoreError> {
        self.read(walk_id, |r| {
            let mut rounds = r.rounds.clone();
            rounds.sort_by_key(|round| round.round_number);
            rounds
        })
    }

    async fn read_participants(&self, walk_id: i64) -> Result<Vec<Participant>, StoreError> {
        self.read(walk_id, |r| r.participants.clone())
    }

    async fn commit_rotation(&self, commit: RotationCommit) -> Result<i64, StoreError> {
        let RotationCommit {
            walk_id,
            expected_version,
            close,
            open,
            upcoming,
        } = commit;

        self.commit(walk_id, expected_version, |record| {
            if let Some(close) = close {
                record.apply_close(close)?;
            }
            if let Some(round) = open {
                if round.walk_id != walk_id {
                    return Err(record.integrity("round belongs to another walk"));
                }
                if record
                    .rounds
                    .iter()
                    .any(|r| r.round_number == round.round_number)
                {
                    return Err(
                        record.integrity(format!("round {} already exists", round.round_number))
                    );
                }
                record.rounds.push(round);
            }
            if let Some(queue) = upcoming {
                record.settings_mut()?.upcoming_rounds = queue;
            }
            Ok(())
        })
    }

    async fn commit_lifecycle(&self, commit: LifecycleCommit) -> Result<i64, StoreError> {
        self.commit(commit.walk_id, commit.expected_version, |record| {
            match commit.change {
                LifecycleChange::Start { at } => record.walk.started_at = Some(at),
                LifecycleChange::End { at } => record.walk.ended_at = Some(at),
                LifecycleChange::ForceStatus(status) => record.walk.forced_status = status,
            }
            if let Some(close) = commit.close {
                record.apply_close(close)?;
            }
            Ok(())
        })
    }

    async fn commit_walk_settings(
        &self,
        walk_id: i64,
        expected_version: i64,
        settings: MeetupSettings,
    ) -> Result<i64, StoreError> {
        self.commit(walk_id, expected_version, |record| {
            *record.settings_mut()? = settings;
            Ok(())
        })
    }

    async fn commit_round_prompt(&self, commit: RoundPromptCommit) -> Result<i64, StoreError> {
        let RoundPromptCommit {
            walk_id,
            expected_version,
            round,
            prompt,
        } = commit;

        self.commit(walk_id, expected_version, |record| match round {
            RoundRef::Numbered(round_number) => {
                let round = record
                    .rounds
                    .iter_mut()
                    .find(|r| r.round_number == round_number)
                    .ok_or(StoreError::RoundNotFound {
                        walk_id,
                        round_number,
                    })?;
                round.question_prompt = prompt;
                Ok(())
            }
            RoundRef::Upcoming(index) => {
                let entry = record
                    .settings_mut()?
                    .upcoming_rounds
                    .get_mut(index)
                    .ok_or(StoreError::Integrity {
                        walk_id,
                        detail: format!("no upcoming round at position {index}"),
                    })?;
                entry.question_prompt = prompt;
                Ok(())
            }
        })
    }

    async fn commit_participant(
        &self,
        commit: ParticipantCommit,
    ) -> Result<Participant, StoreError> {
        let ParticipantCommit {
            walk_id,
            uid,
            expected,
            patch,
        } = commit;

        let mut inner = self.inner.write();
        let record = inner
            .walks
            .get_mut(&walk_id)
            .ok_or(StoreError::WalkNotFound { walk_id })?;
        let existing = record.participants.iter_mut().find(|p| p.user_uid == uid);

        let actual = existing.as_ref().map(|p| p.status());
        if actual != expected {
            return Err(StoreError::ParticipantConflict {
                walk_id,
                uid,
                expected,
                actual,
            });
        }

        let stored = match existing {
            Some(participant) => {
                patch.apply_to(participant);
                participant.clone()
            }
            None => {
                let mut participant = Participant::new(uid, patch.source_type);
                patch.apply_to(&mut participant);
                record.participants.push(participant.clone());
                participant
            }
        };
        debug!(walk_id, uid = %stored.user_uid, status = ?stored.status(), "Participant committed");
        Ok(stored)
    }

    async fn commit_location(
        &self,
        walk_id: i64,
        uid: &Uid,
        location: Location,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.write();
        let record = inner
            .walks
            .get_mut(&walk_id)
            .ok_or(StoreError::WalkNotFound { walk_id })?;
        let participant = record
            .participants
            .iter_mut()
            .find(|p| &p.user_uid == uid)
            .ok_or_else(|| StoreError::ParticipantNotFound {
                walk_id,
                uid: uid.clone(),
            })?;
        participant.last_location = Some(location);
        Ok(())
    }
}
