//! RotationCoordinator: close the active round and open the next one as a
//! single commit.
//!
//! Two layers keep rotations from overlapping. Within this process a
//! `DashMap` of walk ids turns a second concurrent call into an immediate
//! `AlreadyRotating`. Across processes the store's version check does the
//! same at commit time.

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::{debug, info, warn};

use crate::domain::lifecycle::check_rotate;
use crate::domain::schedule::{plan_close, plan_start, StartDecision};
use crate::domain::walk::Uid;
use crate::errors::domain::DomainError;
use crate::services::rounds::{commit_start, RotationOutcome};
use crate::services::snapshot::WalkSnapshot;
use crate::services::ServiceContext;

#[derive(Clone)]
pub struct RotationCoordinator {
    ctx: ServiceContext,
    in_flight: Arc<DashMap<i64, ()>>,
}

/// Removes the walk from the in-flight set when dropped.
struct InFlight<'a> {
    map: &'a DashMap<i64, ()>,
    walk_id: i64,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.map.remove(&self.walk_id);
    }
}

impl RotationCoordinator {
    pub fn new(ctx: ServiceContext) -> Self {
        Self {
            ctx,
            in_flight: Arc::new(DashMap::new()),
        }
    }

    fn acquire(&self, walk_id: i64) -> Result<InFlight<'_>, DomainError> {
        match self.in_flight.entry(walk_id) {
            Entry::Occupied(_) => {
                warn!(walk_id, "Rotation already in flight");
                Err(DomainError::already_rotating(format!(
                    "walk {walk_id} is already rotating"
                )))
            }
            Entry::Vacant(slot) => {
                slot.insert(());
                Ok(InFlight {
                    map: &self.in_flight,
                    walk_id,
                })
            }
        }
    }

    /// Rotate to the next round.
    ///
    /// With nobody to pair the result is `WaitingForParticipants` and the
    /// active round keeps running. Otherwise the active round (if any) is
    /// closed and the next one opened together, or neither happens.
    pub async fn rotate(&self, walk_id: i64, actor: &Uid) -> Result<RotationOutcome, DomainError> {
        let _guard = self.acquire(walk_id)?;

        let snapshot = WalkSnapshot::load(&self.ctx, walk_id).await?;
        let now = self.ctx.now();
        check_rotate(&snapshot.walk, actor, now, &self.ctx.window())?;
        let inputs = snapshot.round_inputs(&self.ctx)?;

        let plan = match plan_start(inputs, &self.ctx.config, true)? {
            StartDecision::Start(plan) => plan,
            StartDecision::NoEligibleParticipants => {
                info!(walk_id, actor = %actor, "Rotation deferred: waiting for participants");
                return Ok(RotationOutcome::WaitingForParticipants);
            }
        };

        let close = plan_close(&snapshot.rounds, now);
        debug!(
            walk_id,
            expected_version = snapshot.version,
            closing = ?close.map(|c| c.round_number),
            opening = plan.round.round_number,
            "Committing rotation"
        );

        let change = commit_start(&self.ctx, &snapshot, plan, close).await?;
        info!(
            walk_id,
            actor = %actor,
            closed_round = ?change.closed_round,
            round_number = change.activated.round_number,
            pairs = change.activated.pairs.len(),
            version = change.version,
            "Rotated to next round"
        );
        Ok(RotationOutcome::Rotated(change))
    }
}
