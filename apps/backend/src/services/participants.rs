//! Participant self-service: joining, responding, progress and location.
//!
//! These writes touch only participant records, never walk lifecycle or
//! round fields, so they do not bump the walk version. Each write is guarded
//! by the status that was read and never carries `last_location`.

use tracing::{debug, info};

use crate::domain::lifecycle::{ensure_owner, WalkPhase};
use crate::domain::location::LocationContext;
use crate::domain::participant::{
    Location, Participant, ParticipantStatus, Progress, Response, SourceType,
};
use crate::domain::walk::{Uid, Walk};
use crate::errors::domain::{
    ConflictKind, DomainError, ForbiddenKind, NotFoundKind, TransitionKind,
};
use crate::infra::store_errors::map_store_err;
use crate::repos::ParticipantCommit;
use crate::services::ServiceContext;

#[derive(Clone)]
pub struct ParticipantService {
    ctx: ServiceContext,
}

fn ensure_self(actor: &Uid, subject: &Uid) -> Result<(), DomainError> {
    if actor == subject {
        Ok(())
    } else {
        Err(DomainError::forbidden(
            ForbiddenKind::NotSelf,
            format!("{actor} cannot change the participation of {subject}"),
        ))
    }
}

fn ensure_open(walk: &Walk) -> Result<(), DomainError> {
    if walk.phase() == WalkPhase::Ended {
        return Err(DomainError::transition(
            TransitionKind::AlreadyEnded,
            format!("walk {} has ended", walk.id),
        ));
    }
    Ok(())
}

impl ParticipantService {
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    async fn load_walk(&self, walk_id: i64) -> Result<Walk, DomainError> {
        Ok(self
            .ctx
            .store
            .read_walk(walk_id)
            .await
            .map_err(map_store_err)?
            .value)
    }

    async fn find(&self, walk_id: i64, uid: &Uid) -> Result<Option<Participant>, DomainError> {
        let participants = self
            .ctx
            .store
            .read_participants(walk_id)
            .await
            .map_err(map_store_err)?;
        Ok(participants.into_iter().find(|p| &p.user_uid == uid))
    }

    async fn require(&self, walk_id: i64, uid: &Uid) -> Result<Participant, DomainError> {
        self.find(walk_id, uid).await?.ok_or_else(|| {
            DomainError::not_found(
                NotFoundKind::Participant,
                format!("{uid} is not a participant of walk {walk_id}"),
            )
        })
    }

    /// Create a pending record, or reopen one that was denied or cancelled.
    async fn add(&self, walk_id: i64, uid: Uid, source: SourceType) -> Result<Participant, DomainError> {
        let existing = self.find(walk_id, &uid).await?;
        if let Some(existing) = &existing {
            if matches!(
                existing.status(),
                ParticipantStatus::Pending | ParticipantStatus::Accepted
            ) {
                return Err(DomainError::conflict(
                    ConflictKind::AlreadyParticipating,
                    format!("{uid} already participates in walk {walk_id}"),
                ));
            }
        }

        let fresh = Participant::new(uid, source);
        let commit = match &existing {
            Some(previous) => ParticipantCommit::update(walk_id, previous, &fresh),
            None => ParticipantCommit::insert(walk_id, &fresh),
        };
        self.ctx
            .store
            .commit_participant(commit)
            .await
            .map_err(map_store_err)
    }

    /// Ask to join a walk. The organizer's invitation is not needed.
    pub async fn request_to_join(&self, walk_id: i64, actor: &Uid) -> Result<Participant, DomainError> {
        let walk = self.load_walk(walk_id).await?;
        ensure_open(&walk)?;
        let participant = self.add(walk_id, actor.clone(), SourceType::Requested).await?;
        info!(walk_id, uid = %actor, "Join requested");
        Ok(participant)
    }

    /// Invite someone. Organizer only.
    pub async fn invite(&self, walk_id: i64, actor: &Uid, invitee: Uid) -> Result<Participant, DomainError> {
        let walk = self.load_walk(walk_id).await?;
        ensure_owner(&walk, actor)?;
        ensure_open(&walk)?;
        let participant = self.add(walk_id, invitee, SourceType::Invited).await?;
        info!(walk_id, uid = %participant.user_uid, "Participant invited");
        Ok(participant)
    }

    /// Accept, deny or cancel. Only the participant may answer for themself.
    pub async fn respond(
        &self,
        walk_id: i64,
        actor: &Uid,
        subject: &Uid,
        response: Response,
    ) -> Result<ParticipantStatus, DomainError> {
        ensure_self(actor, subject)?;
        let walk = self.load_walk(walk_id).await?;
        ensure_open(&walk)?;

        let before = self.require(walk_id, subject).await?;
        let mut participant = before.clone();
        if !participant.respond(response, self.ctx.now())? {
            debug!(walk_id, uid = %subject, ?response, "Response already in effect");
            return Ok(participant.status());
        }

        let stored = self
            .ctx
            .store
            .commit_participant(ParticipantCommit::update(walk_id, &before, &participant))
            .await
            .map_err(map_store_err)?;
        info!(walk_id, uid = %subject, ?response, "Participant responded");
        Ok(stored.status())
    }

    pub async fn mark_progress(
        &self,
        walk_id: i64,
        actor: &Uid,
        subject: &Uid,
        progress: Progress,
    ) -> Result<Participant, DomainError> {
        ensure_self(actor, subject)?;
        let walk = self.load_walk(walk_id).await?;
        ensure_open(&walk)?;

        let before = self.require(walk_id, subject).await?;
        let mut participant = before.clone();
        participant.mark_progress(progress, self.ctx.now())?;
        let stored = self
            .ctx
            .store
            .commit_participant(ParticipantCommit::update(walk_id, &before, &participant))
            .await
            .map_err(map_store_err)?;
        debug!(walk_id, uid = %subject, ?progress, "Progress recorded");
        Ok(stored)
    }

    /// Context for a background location writer. Requires an accepted
    /// participant on a started walk.
    pub async fn location_context(&self, walk_id: i64, actor: &Uid) -> Result<LocationContext, DomainError> {
        let walk = self.load_walk(walk_id).await?;
        let participant = self.require(walk_id, actor).await?;
        if !participant.is_eligible() {
            return Err(DomainError::transition(
                TransitionKind::ParticipantNotAccepted,
                format!("{actor} has not accepted walk {walk_id}"),
            ));
        }
        LocationContext::for_walk(&walk, actor.clone(), &self.ctx.window())
    }

    /// Record a position reported by a background writer.
    pub async fn record_location(
        &self,
        context: &LocationContext,
        location: Location,
    ) -> Result<(), DomainError> {
        let now = self.ctx.now();
        if !context.accepts(now) {
            return Err(DomainError::transition(
                TransitionKind::LocationWindowClosed,
                format!(
                    "location updates for walk {} closed at {}",
                    context.walk_id(),
                    context.end_time()
                ),
            ));
        }
        self.ctx
            .store
            .commit_location(context.walk_id(), context.user_uid(), location)
            .await
            .map_err(map_store_err)
    }
}
