//! Participant membership records and the eligibility filter used by pairing.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::domain::walk::Uid;
use crate::errors::domain::{DomainError, TransitionKind};

/// How the participant came to be on the walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    Invited,
    Requested,
}

/// Last reported position, written only by the background location task.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(with = "time::serde::rfc3339")]
    pub recorded_at: OffsetDateTime,
}

/// Derived response state; at most one terminal timestamp is ever set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticipantStatus {
    Pending,
    Accepted,
    Denied,
    Cancelled,
}

/// A participant's answer to an invitation or join request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Response {
    Accept,
    Deny,
    Cancel,
}

/// Arrival progress of an accepted participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    OnTheWay,
    Arrived,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Participant {
    pub user_uid: Uid,
    pub source_type: SourceType,
    pub accepted_at: Option<OffsetDateTime>,
    pub denied_at: Option<OffsetDateTime>,
    pub cancelled_at: Option<OffsetDateTime>,
    pub on_the_way_at: Option<OffsetDateTime>,
    pub arrived_at: Option<OffsetDateTime>,
    pub last_location: Option<Location>,
}

impl Participant {
    pub fn new(user_uid: Uid, source_type: SourceType) -> Self {
        Self {
            user_uid,
            source_type,
            accepted_at: None,
            denied_at: None,
            cancelled_at: None,
            on_the_way_at: None,
            arrived_at: None,
            last_location: None,
        }
    }

    /// Shortcut for tests and fixtures: an invited participant who accepted.
    pub fn accepted(user_uid: impl Into<Uid>, at: OffsetDateTime) -> Self {
        let mut p = Self::new(user_uid.into(), SourceType::Invited);
        p.accepted_at = Some(at);
        p
    }

    pub fn status(&self) -> ParticipantStatus {
        if self.cancelled_at.is_some() {
            ParticipantStatus::Cancelled
        } else if self.denied_at.is_some() {
            ParticipantStatus::Denied
        } else if self.accepted_at.is_some() {
            ParticipantStatus::Accepted
        } else {
            ParticipantStatus::Pending
        }
    }

    /// Eligible for pairing: accepted and not cancelled.
    pub fn is_eligible(&self) -> bool {
        self.accepted_at.is_some() && self.cancelled_at.is_none()
    }

    /// Apply a response. Returns `false` when it was already in effect.
    pub fn respond(&mut self, response: Response, now: OffsetDateTime) -> Result<bool, DomainError> {
        let status = self.status();
        match (response, status) {
            (Response::Accept, ParticipantStatus::Accepted)
            | (Response::Deny, ParticipantStatus::Denied)
            | (Response::Cancel, ParticipantStatus::Cancelled) => Ok(false),

            (Response::Accept, _) => {
                self.clear_terminal();
                self.accepted_at = Some(now);
                Ok(true)
            }
            (Response::Deny, ParticipantStatus::Pending | ParticipantStatus::Cancelled) => {
                self.clear_terminal();
                self.denied_at = Some(now);
                Ok(true)
            }
            (Response::Cancel, ParticipantStatus::Pending | ParticipantStatus::Accepted) => {
                self.clear_terminal();
                self.cancelled_at = Some(now);
                Ok(true)
            }
            (response, status) => Err(DomainError::transition(
                TransitionKind::ParticipantNotAccepted,
                format!(
                    "{} cannot {response:?} while {status:?}",
                    self.user_uid
                ),
            )),
        }
    }

    /// Record arrival progress; only accepted participants have any.
    pub fn mark_progress(&mut self, progress: Progress, now: OffsetDateTime) -> Result<(), DomainError> {
        if !self.is_eligible() {
            return Err(DomainError::transition(
                TransitionKind::ParticipantNotAccepted,
                format!("{} has not accepted the walk", self.user_uid),
            ));
        }
        match progress {
            Progress::OnTheWay => {
                self.on_the_way_at.get_or_insert(now);
            }
            Progress::Arrived => {
                self.on_the_way_at.get_or_insert(now);
                self.arrived_at.get_or_insert(now);
            }
        }
        Ok(())
    }

    fn clear_terminal(&mut self) {
        self.accepted_at = None;
        self.denied_at = None;
        self.cancelled_at = None;
        self.on_the_way_at = None;
        self.arrived_at = None;
    }
}

/// Uids of everyone currently eligible for pairing.
pub fn eligible_uids(participants: &[Participant]) -> BTreeSet<Uid> {
    participants
        .iter()
        .filter(|p| p.is_eligible())
        .map(|p| p.user_uid.clone())
        .collect()
}
