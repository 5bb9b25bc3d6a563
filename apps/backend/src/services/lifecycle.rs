//! WalkLifecycleGuard: start and end walks, and override the computed
//! status.

use tracing::info;

use crate::domain::lifecycle::{check_end, check_start, ensure_owner, plan_end, WalkPhase};
use crate::domain::transitions::{derive_walk_transitions, WalkLifecycleView, WalkTransition};
use crate::domain::walk::Uid;
use crate::domain::walk_clock::{walk_status, WalkStatus};
use crate::errors::domain::DomainError;
use crate::infra::store_errors::map_store_err;
use crate::repos::{LifecycleChange, LifecycleCommit};
use crate::services::snapshot::WalkSnapshot;
use crate::services::ServiceContext;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecycleOutcome {
    pub old_version: i64,
    pub version: i64,
    pub transitions: Vec<WalkTransition>,
}

#[derive(Clone)]
pub struct WalkLifecycleGuard {
    ctx: ServiceContext,
}

impl WalkLifecycleGuard {
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    /// Current temporal status of the walk.
    pub async fn status(&self, walk_id: i64) -> Result<WalkStatus, DomainError> {
        let walk = self
            .ctx
            .store
            .read_walk(walk_id)
            .await
            .map_err(map_store_err)?
            .value;
        Ok(walk_status(&walk, self.ctx.now(), &self.ctx.window()))
    }

    /// Mark the walk started. Does not start a round.
    pub async fn start_walk(&self, walk_id: i64, actor: &Uid) -> Result<LifecycleOutcome, DomainError> {
        let snapshot = WalkSnapshot::load(&self.ctx, walk_id).await?;
        check_start(&snapshot.walk, actor)?;

        let at = self.ctx.now();
        let before = snapshot.lifecycle_view();
        let version = self
            .ctx
            .store
            .commit_lifecycle(LifecycleCommit {
                walk_id,
                expected_version: snapshot.version,
                change: LifecycleChange::Start { at },
                close: None,
            })
            .await
            .map_err(map_store_err)?;

        info!(walk_id, actor = %actor, version, "Walk started");
        let after = WalkLifecycleView {
            version,
            phase: WalkPhase::Started,
            active_round: before.active_round,
        };
        Ok(LifecycleOutcome {
            old_version: snapshot.version,
            version,
            transitions: derive_walk_transitions(&before, &after),
        })
    }

    /// Mark the walk ended, closing any active round in the same commit.
    pub async fn end_walk(&self, walk_id: i64, actor: &Uid) -> Result<LifecycleOutcome, DomainError> {
        let snapshot = WalkSnapshot::load(&self.ctx, walk_id).await?;
        check_end(&snapshot.walk, actor)?;

        let plan = plan_end(&snapshot.walk, &snapshot.rounds, self.ctx.now());
        let before = snapshot.lifecycle_view();
        let version = self
            .ctx
            .store
            .commit_lifecycle(LifecycleCommit {
                walk_id,
                expected_version: snapshot.version,
                change: LifecycleChange::End { at: plan.ended_at },
                close: plan.close,
            })
            .await
            .map_err(map_store_err)?;

        info!(
            walk_id,
            actor = %actor,
            closed_round = ?plan.close.map(|c| c.round_number),
            version,
            "Walk ended"
        );
        let after = WalkLifecycleView {
            version,
            phase: WalkPhase::Ended,
            active_round: None,
        };
        Ok(LifecycleOutcome {
            old_version: snapshot.version,
            version,
            transitions: derive_walk_transitions(&before, &after),
        })
    }

    /// Pin the walk's status, or clear the pin with `None`.
    pub async fn set_forced_status(
        &self,
        walk_id: i64,
        actor: &Uid,
        status: Option<WalkStatus>,
    ) -> Result<LifecycleOutcome, DomainError> {
        let snapshot = WalkSnapshot::load(&self.ctx, walk_id).await?;
        ensure_owner(&snapshot.walk, actor)?;

        let version = self
            .ctx
            .store
            .commit_lifecycle(LifecycleCommit {
                walk_id,
                expected_version: snapshot.version,
                change: LifecycleChange::ForceStatus(status),
                close: None,
            })
            .await
            .map_err(map_store_err)?;

        info!(walk_id, ?status, version, "Walk status override set");
        Ok(LifecycleOutcome {
            old_version: snapshot.version,
            version,
            transitions: Vec::new(),
        })
    }
}
