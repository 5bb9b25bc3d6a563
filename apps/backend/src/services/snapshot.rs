use crate::domain::participant::Participant;
use crate::domain::round::Round;
use crate::domain::schedule::{active_round, RoundInputs};
use crate::domain::transitions::WalkLifecycleView;
use crate::domain::walk::Walk;
use crate::errors::domain::DomainError;
use crate::infra::store_errors::map_store_err;
use crate::services::ServiceContext;

/// Point-in-time view of one walk.
///
/// The walk (and its version) is read before rounds and participants, so a
/// concurrent commit can only make the snapshot look older than it is. The
/// next compare-and-swap then fails instead of committing stale plans.
#[derive(Debug, Clone)]
pub(crate) struct WalkSnapshot {
    pub walk: Walk,
    pub version: i64,
    pub rounds: Vec<Round>,
    pub participants: Vec<Participant>,
}

impl WalkSnapshot {
    pub async fn load(ctx: &ServiceContext, walk_id: i64) -> Result<Self, DomainError> {
        let walk = ctx.store.read_walk(walk_id).await.map_err(map_store_err)?;
        let (rounds, participants) = futures::try_join!(
            ctx.store.read_rounds(walk_id),
            ctx.store.read_participants(walk_id)
        )
        .map_err(map_store_err)?;

        Ok(Self {
            walk: walk.value,
            version: walk.version,
            rounds,
            participants,
        })
    }

    pub fn lifecycle_view(&self) -> WalkLifecycleView {
        WalkLifecycleView {
            version: self.version,
            phase: self.walk.phase(),
            active_round: active_round(&self.rounds).map(|r| r.round_number),
        }
    }

    pub fn round_inputs(&self, ctx: &ServiceContext) -> Result<RoundInputs<'_>, DomainError> {
        Ok(RoundInputs {
            meetup: self.walk.as_meetup()?,
            rounds: &self.rounds,
            participants: &self.participants,
            now: ctx.now(),
        })
    }
}
