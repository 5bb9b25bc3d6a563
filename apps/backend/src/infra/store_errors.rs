//! StoreError -> DomainError translation.
//!
//! Services call [`map_store_err`] on every store result. Rotation uses
//! [`map_rotation_err`] so that a lost compare-and-swap surfaces as
//! `AlreadyRotating`.

use tracing::{error, warn};

use crate::errors::domain::{ConflictKind, DomainError, InfraErrorKind, NotFoundKind};
use crate::repos::StoreError;

pub fn map_store_err(e: StoreError) -> DomainError {
    match e {
        StoreError::WalkNotFound { walk_id } => {
            DomainError::not_found(NotFoundKind::Walk, format!("Walk {walk_id} not found"))
        }
        StoreError::RoundNotFound {
            walk_id,
            round_number,
        } => DomainError::not_found(
            NotFoundKind::Round,
            format!("Round {round_number} of walk {walk_id} not found"),
        ),
        StoreError::ParticipantNotFound { walk_id, uid } => DomainError::not_found(
            NotFoundKind::Participant,
            format!("{uid} is not a participant of walk {walk_id}"),
        ),
        StoreError::VersionConflict {
            walk_id,
            expected,
            actual,
        } => {
            warn!(walk_id, expected, actual, "Optimistic lock conflict detected");
            DomainError::conflict(
                ConflictKind::OptimisticLock,
                format!(
                    "Walk {walk_id} was modified concurrently (expected version {expected}, actual version {actual}). Please refresh and retry."
                ),
            )
        }
        StoreError::ParticipantConflict {
            walk_id,
            uid,
            expected,
            actual,
        } => {
            warn!(walk_id, uid = %uid, ?expected, ?actual, "Participant changed concurrently");
            DomainError::conflict(
                ConflictKind::OptimisticLock,
                format!(
                    "Participation of {uid} in walk {walk_id} changed concurrently (expected {expected:?}, found {actual:?}). Please refresh and retry."
                ),
            )
        }
        StoreError::Integrity { walk_id, detail } => {
            error!(walk_id, detail = %detail, "Store rejected commit as inconsistent");
            DomainError::infra(InfraErrorKind::DataCorruption, detail)
        }
        StoreError::Unavailable(detail) => {
            warn!(detail = %detail, "Walk store unavailable");
            DomainError::infra(InfraErrorKind::StoreUnavailable, detail)
        }
    }
}

/// Like [`map_store_err`], but a version conflict means another rotation
/// got there first.
pub fn map_rotation_err(e: StoreError) -> DomainError {
    match e {
        StoreError::VersionConflict {
            walk_id,
            expected,
            actual,
        } => {
            warn!(walk_id, expected, actual, "Concurrent rotation detected");
            DomainError::already_rotating(format!(
                "Walk {walk_id} changed while rotating (expected version {expected}, actual version {actual}). Re-read before retrying."
            ))
        }
        other => map_store_err(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::participant::ParticipantStatus;
    use crate::domain::walk::Uid;
    use crate::errors::ErrorCode;

    #[test]
    fn conflicts_map_to_retryable_errors() {
        let conflict = StoreError::VersionConflict {
            walk_id: 1,
            expected: 2,
            actual: 3,
        };
        let plain = map_store_err(conflict.clone());
        assert_eq!(plain.code(), ErrorCode::OptimisticLock);
        assert!(plain.is_retryable());

        let rotation = map_rotation_err(conflict);
        assert_eq!(rotation.code(), ErrorCode::AlreadyRotating);
        assert!(rotation.is_retryable());
    }

    #[test]
    fn participant_conflict_is_optimistic_lock() {
        let err = map_store_err(StoreError::ParticipantConflict {
            walk_id: 1,
            uid: Uid::from("ana"),
            expected: Some(ParticipantStatus::Pending),
            actual: Some(ParticipantStatus::Accepted),
        });
        assert_eq!(err.code(), ErrorCode::OptimisticLock);
        assert!(err.is_retryable());
    }

    #[test]
    fn missing_records_map_to_not_found() {
        assert_eq!(
            map_store_err(StoreError::WalkNotFound { walk_id: 4 }).code(),
            ErrorCode::WalkNotFound
        );
        assert_eq!(
            map_rotation_err(StoreError::RoundNotFound {
                walk_id: 4,
                round_number: 2
            })
            .code(),
            ErrorCode::RoundNotFound
        );
    }

    #[test]
    fn unavailable_is_infra() {
        let err = map_store_err(StoreError::Unavailable("timeout".into()));
        assert_eq!(err.code(), ErrorCode::StoreUnavailable);
        assert!(!err.is_retryable());
    }
}
