// Store wrappers that inject delays, rendezvous points and failures in
// front of the in-memory store.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::Barrier;
use walks_backend::domain::{Location, MeetupSettings, NewWalk, Participant, Round, Uid, Walk};
use walks_backend::repos::{
    LifecycleCommit, ParticipantCommit, RotationCommit, RoundPromptCommit, StoreError, Versioned,
    WalkStore,
};
use walks_backend::InMemoryWalkStore;

#[derive(Default)]
pub struct ScriptedStore {
    pub inner: InMemoryWalkStore,
    /// Sleep before every `read_walk`.
    pub read_delay: Option<StdDuration>,
    /// Wait here in `read_participants` until every party has arrived,
    /// while armed.
    pub rendezvous: Option<Arc<Barrier>>,
    pub rendezvous_armed: AtomicBool,
    /// Fail `commit_rotation` without writing.
    pub fail_rotation: AtomicBool,
    /// Write applied straight after the next `read_participants`, landing
    /// between a service's read and its own write.
    pub after_participants_read: Mutex<Option<Interleaved>>,
}

/// A concurrent writer's change.
pub enum Interleaved {
    Location(Uid, Location),
    Participant(ParticipantCommit),
}

impl ScriptedStore {
    pub fn slow_reads(delay: StdDuration) -> Self {
        Self {
            read_delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn rendezvous(parties: usize) -> Self {
        Self {
            rendezvous: Some(Arc::new(Barrier::new(parties))),
            ..Self::default()
        }
    }

    pub fn arm_rendezvous(&self, armed: bool) {
        self.rendezvous_armed.store(armed, Ordering::SeqCst);
    }

    pub fn fail_rotations(&self, fail: bool) {
        self.fail_rotation.store(fail, Ordering::SeqCst);
    }

    pub fn interleave_after_next_read(&self, write: Interleaved) {
        *self.after_participants_read.lock() = Some(write);
    }
}

#[async_trait]
impl WalkStore for ScriptedStore {
    async fn insert_walk(&self, new_walk: NewWalk) -> Result<Versioned<Walk>, StoreError> {
        self.inner.insert_walk(new_walk).await
    }

    async fn read_walk(&self, walk_id: i64) -> Result<Versioned<Walk>, StoreError> {
        if let Some(delay) = self.read_delay {
            tokio::time::sleep(delay).await;
        }
        self.inner.read_walk(walk_id).await
    }

    async fn read_rounds(&self, walk_id: i64) -> Result<Vec<Round>, StoreError> {
        self.inner.read_rounds(walk_id).await
    }

    async fn read_participants(&self, walk_id: i64) -> Result<Vec<Participant>, StoreError> {
        if let Some(barrier) = &self.rendezvous {
            if self.rendezvous_armed.load(Ordering::SeqCst) {
                barrier.wait().await;
            }
        }
        let participants = self.inner.read_participants(walk_id).await?;
        let pending = self.after_participants_read.lock().take();
        match pending {
            Some(Interleaved::Location(uid, location)) => {
                self.inner.commit_location(walk_id, &uid, location).await?;
            }
            Some(Interleaved::Participant(commit)) => {
                self.inner.commit_participant(commit).await?;
            }
            None => {}
        }
        Ok(participants)
    }

    async fn commit_rotation(&self, commit: RotationCommit) -> Result<i64, StoreError> {
        if self.fail_rotation.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("injected failure".into()));
        }
        self.inner.commit_rotation(commit).await
    }

    async fn commit_lifecycle(&self, commit: LifecycleCommit) -> Result<i64, StoreError> {
        self.inner.commit_lifecycle(commit).await
    }

    async fn commit_walk_settings(
        &self,
        walk_id: i64,
        expected_version: i64,
        settings: MeetupSettings,
    ) -> Result<i64, StoreError> {
        self.inner
            .commit_walk_settings(walk_id, expected_version, settings)
            .await
    }

    async fn commit_round_prompt(&self, commit: RoundPromptCommit) -> Result<i64, StoreError> {
        self.inner.commit_round_prompt(commit).await
    }

    async fn commit_participant(
        &self,
        commit: ParticipantCommit,
    ) -> Result<Participant, StoreError> {
        self.inner.commit_participant(commit).await
    }

    async fn commit_location(
        &self,
        walk_id: i64,
        uid: &Uid,
        location: Location,
    ) -> Result<(), StoreError> {
        self.inner.commit_location(walk_id, uid, location).await
    }
}
