#![allow(dead_code)]

// tests/common/mod.rs
pub mod proptest_prelude;
pub mod stores;

use std::sync::Arc;

use time::macros::datetime;
use time::{Duration, OffsetDateTime};
use walks_backend::domain::{NewWalk, Participant, Round, Uid, WalkKind};
use walks_backend::repos::ParticipantCommit;
use walks_backend::services::{
    ParticipantService, RotationCoordinator, RoundScheduler, ServiceContext, WalkLifecycleGuard,
};
use walks_backend::{InMemoryWalkStore, ManualClock, RotationConfig, WalkStore};

// Logging is auto-installed for every test binary
#[ctor::ctor]
fn init_logging() {
    walks_test_support::logging::init();
}

/// Scheduled start of every fixture walk.
pub const T0: OffsetDateTime = datetime!(2026-05-01 18:00 UTC);

pub fn owner() -> Uid {
    Uid::from("owner")
}

pub fn uid(name: &str) -> Uid {
    Uid::from(name)
}

/// Services wired to one store and a manual clock set to `T0`.
pub struct Harness {
    pub store: Arc<dyn WalkStore>,
    pub clock: Arc<ManualClock>,
    pub ctx: ServiceContext,
    pub scheduler: RoundScheduler,
    pub rotation: RotationCoordinator,
    pub lifecycle: WalkLifecycleGuard,
    pub participants: ParticipantService,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_store(Arc::new(InMemoryWalkStore::new()))
    }

    pub fn with_store(store: Arc<dyn WalkStore>) -> Self {
        let clock = Arc::new(ManualClock::new(T0));
        let ctx = ServiceContext::new(store.clone(), clock.clone(), RotationConfig::default());
        Self {
            store,
            clock,
            scheduler: RoundScheduler::new(ctx.clone()),
            rotation: RotationCoordinator::new(ctx.clone()),
            lifecycle: WalkLifecycleGuard::new(ctx.clone()),
            participants: ParticipantService::new(ctx.clone()),
            ctx,
        }
    }

    pub fn advance(&self, minutes: i64) {
        self.clock.advance(Duration::minutes(minutes));
    }

    pub async fn create_walk(&self, new_walk: NewWalk) -> i64 {
        self.store.insert_walk(new_walk).await.unwrap().value.id
    }

    /// A 60 minute meetup owned by `owner()` with a fixed seed.
    pub async fn meetup(&self) -> i64 {
        self.create_walk(NewWalk::meetup(owner(), T0, 60).with_seed(2026))
            .await
    }

    pub async fn walk_of_kind(&self, kind: WalkKind) -> i64 {
        self.create_walk(
            NewWalk::meetup(owner(), T0, 60)
                .with_kind(kind)
                .with_seed(7),
        )
        .await
    }

    /// Seed participants who have already accepted.
    pub async fn accept_all(&self, walk_id: i64, names: &[&str]) {
        for name in names {
            let accepted = Participant::accepted(*name, T0 - Duration::hours(2));
            self.store
                .commit_participant(ParticipantCommit::insert(walk_id, &accepted))
                .await
                .unwrap();
        }
    }

    /// A started meetup with the given accepted participants.
    pub async fn started_meetup(&self, names: &[&str]) -> i64 {
        let walk_id = self.meetup().await;
        self.accept_all(walk_id, names).await;
        self.lifecycle.start_walk(walk_id, &owner()).await.unwrap();
        walk_id
    }

    pub async fn rounds(&self, walk_id: i64) -> Vec<Round> {
        self.store.read_rounds(walk_id).await.unwrap()
    }

    pub async fn version(&self, walk_id: i64) -> i64 {
        self.store.read_walk(walk_id).await.unwrap().version
    }

    pub async fn active_rounds(&self, walk_id: i64) -> Vec<Round> {
        self.rounds(walk_id)
            .await
            .into_iter()
            .filter(|r| r.is_active())
            .collect()
    }
}
