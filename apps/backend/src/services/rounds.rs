//! RoundScheduler: start, close and edit rounds, and manage the queue of
//! pre-generated rounds.

use time::Duration;
use tracing::{debug, info};

use crate::domain::lifecycle::{check_rotate, ensure_owner, WalkPhase};
use crate::domain::round::RoundRef;
use crate::domain::schedule::{
    plan_close, plan_start, plan_upcoming, scheduler_state, suggested_duration, RoundClose,
    SchedulerState, StartDecision, StartPlan,
};
use crate::domain::transitions::{
    derive_walk_transitions, RoundActivated, WalkLifecycleView, WalkTransition,
};
use crate::domain::walk::Uid;
use crate::errors::domain::{DomainError, TransitionKind, ValidationKind};
use crate::infra::store_errors::{map_rotation_err, map_store_err};
use crate::repos::{RotationCommit, RoundPromptCommit};
use crate::services::snapshot::WalkSnapshot;
use crate::services::ServiceContext;

/// A round was opened, possibly closing the previous one.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundChange {
    pub closed_round: Option<u32>,
    pub activated: RoundActivated,
    pub reused_queue_pairs: bool,
    pub old_version: i64,
    pub version: i64,
    pub transitions: Vec<WalkTransition>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RotationOutcome {
    Rotated(RoundChange),
    /// Fewer than two eligible participants. Nothing was written and any
    /// active round is still running.
    WaitingForParticipants,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseOutcome {
    Closed {
        round_number: u32,
        version: i64,
        transitions: Vec<WalkTransition>,
    },
    /// No round was active.
    NothingToClose,
}

/// Commit a planned start, closing `close` in the same write.
pub(crate) async fn commit_start(
    ctx: &ServiceContext,
    snapshot: &WalkSnapshot,
    plan: StartPlan,
    close: Option<RoundClose>,
) -> Result<RoundChange, DomainError> {
    let walk_id = snapshot.walk.id;
    let before = snapshot.lifecycle_view();
    let activated = RoundActivated::from(&plan.round);
    let round_number = plan.round.round_number;

    let version = ctx
        .store
        .commit_rotation(RotationCommit {
            walk_id,
            expected_version: snapshot.version,
            close,
            open: Some(plan.round),
            upcoming: plan.upcoming,
        })
        .await
        .map_err(map_rotation_err)?;

    let after = WalkLifecycleView {
        version,
        phase: before.phase,
        active_round: Some(round_number),
    };
    let mut transitions = derive_walk_transitions(&before, &after);
    transitions.push(WalkTransition::RoundActivated(activated.clone()));

    Ok(RoundChange {
        closed_round: close.map(|c| c.round_number),
        activated,
        reused_queue_pairs: plan.reused_queue_pairs,
        old_version: snapshot.version,
        version,
        transitions,
    })
}

#[derive(Clone)]
pub struct RoundScheduler {
    ctx: ServiceContext,
}

impl RoundScheduler {
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    pub async fn state(&self, walk_id: i64) -> Result<SchedulerState, DomainError> {
        let snapshot = WalkSnapshot::load(&self.ctx, walk_id).await?;
        let meetup = snapshot.walk.as_meetup()?;
        Ok(scheduler_state(&meetup, &snapshot.rounds))
    }

    /// Start the next round. Fails while a round is active.
    pub async fn start_next_round(
        &self,
        walk_id: i64,
        actor: &Uid,
    ) -> Result<RotationOutcome, DomainError> {
        let snapshot = WalkSnapshot::load(&self.ctx, walk_id).await?;
        check_rotate(&snapshot.walk, actor, self.ctx.now(), &self.ctx.window())?;
        let inputs = snapshot.round_inputs(&self.ctx)?;

        match plan_start(inputs, &self.ctx.config, false)? {
            StartDecision::NoEligibleParticipants => {
                info!(walk_id, "Round not started: waiting for participants");
                Ok(RotationOutcome::WaitingForParticipants)
            }
            StartDecision::Start(plan) => {
                let change = commit_start(&self.ctx, &snapshot, plan, None).await?;
                info!(
                    walk_id,
                    round_number = change.activated.round_number,
                    version = change.version,
                    "Round started"
                );
                Ok(RotationOutcome::Rotated(change))
            }
        }
    }

    /// Close the active round. Closing when nothing is active is a no-op.
    pub async fn close_active_round(
        &self,
        walk_id: i64,
        actor: &Uid,
    ) -> Result<CloseOutcome, DomainError> {
        let snapshot = WalkSnapshot::load(&self.ctx, walk_id).await?;
        ensure_owner(&snapshot.walk, actor)?;
        snapshot.walk.as_meetup()?;

        let Some(close) = plan_close(&snapshot.rounds, self.ctx.now()) else {
            debug!(walk_id, "No active round to close");
            return Ok(CloseOutcome::NothingToClose);
        };

        let before = snapshot.lifecycle_view();
        let version = self
            .ctx
            .store
            .commit_rotation(RotationCommit {
                walk_id,
                expected_version: snapshot.version,
                close: Some(close),
                open: None,
                upcoming: None,
            })
            .await
            .map_err(map_rotation_err)?;

        let after = WalkLifecycleView {
            version,
            phase: before.phase,
            active_round: None,
        };
        info!(walk_id, round_number = close.round_number, version, "Round closed");

        Ok(CloseOutcome::Closed {
            round_number: close.round_number,
            version,
            transitions: derive_walk_transitions(&before, &after),
        })
    }

    /// Length the next round would get if started now.
    pub async fn suggested_duration(&self, walk_id: i64) -> Result<Duration, DomainError> {
        let walk = self
            .ctx
            .store
            .read_walk(walk_id)
            .await
            .map_err(map_store_err)?
            .value;
        let meetup = walk.as_meetup()?;
        Ok(suggested_duration(&meetup, self.ctx.now(), &self.ctx.config))
    }

    /// Change a round's question prompt. Allowed in any state; timing
    /// fields are never touched. Returns the new walk version.
    pub async fn edit_question_prompt(
        &self,
        walk_id: i64,
        actor: &Uid,
        round: RoundRef,
        prompt: Option<String>,
    ) -> Result<i64, DomainError> {
        let snapshot = WalkSnapshot::load(&self.ctx, walk_id).await?;
        ensure_owner(&snapshot.walk, actor)?;
        let meetup = snapshot.walk.as_meetup()?;

        let known = match round {
            RoundRef::Numbered(n) => snapshot.rounds.iter().any(|r| r.round_number == n),
            RoundRef::Upcoming(i) => i < meetup.settings.upcoming_rounds.len(),
        };
        if !known {
            return Err(DomainError::validation(
                ValidationKind::UnknownRound,
                format!("walk {walk_id} has no round {round:?}"),
            ));
        }

        let version = self
            .ctx
            .store
            .commit_round_prompt(RoundPromptCommit {
                walk_id,
                expected_version: snapshot.version,
                round,
                prompt,
            })
            .await
            .map_err(map_store_err)?;
        debug!(walk_id, ?round, version, "Question prompt edited");
        Ok(version)
    }

    /// Append `count` pre-generated rounds to the queue. Returns the new
    /// queue length.
    pub async fn pregenerate_upcoming_rounds(
        &self,
        walk_id: i64,
        actor: &Uid,
        count: usize,
        prompts: Vec<String>,
    ) -> Result<usize, DomainError> {
        let snapshot = WalkSnapshot::load(&self.ctx, walk_id).await?;
        ensure_owner(&snapshot.walk, actor)?;
        if snapshot.walk.phase() == WalkPhase::Ended {
            return Err(DomainError::transition(
                TransitionKind::AlreadyEnded,
                format!("walk {walk_id} has ended"),
            ));
        }

        let inputs = snapshot.round_inputs(&self.ctx)?;
        let queue = plan_upcoming(inputs, &self.ctx.config, count, &prompts)?;
        let queued = queue.len();

        let mut settings = inputs.meetup.settings.clone();
        settings.upcoming_rounds = queue;
        let version = self
            .ctx
            .store
            .commit_walk_settings(walk_id, snapshot.version, settings)
            .await
            .map_err(map_store_err)?;

        info!(walk_id, added = count, queued, version, "Upcoming rounds generated");
        Ok(queued)
    }
}
