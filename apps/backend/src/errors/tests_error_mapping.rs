// Unit tests for error code mapping - pure domain logic, no storage.
use crate::errors::domain::{
    ConflictKind, DomainError, ForbiddenKind, InfraErrorKind, NotFoundKind, TransitionKind,
    ValidationKind,
};
use crate::ErrorCode;

#[test]
fn maps_forbidden_kinds() {
    let owner = DomainError::not_owner("only the organizer can rotate");
    assert_eq!(owner.code(), ErrorCode::NotOwner);

    let other = DomainError::forbidden(ForbiddenKind::NotSelf, "not your record");
    assert_eq!(other.code().as_str(), "NOT_SELF");
}

#[test]
fn maps_all_transitions_to_one_code() {
    for kind in [
        TransitionKind::AlreadyStarted,
        TransitionKind::NotStarted,
        TransitionKind::AlreadyEnded,
        TransitionKind::RoundAlreadyActive,
    ] {
        let err = DomainError::transition(kind, "nope");
        assert_eq!(err.code(), ErrorCode::InvalidStateTransition);
        assert!(!err.is_retryable());
    }
}

#[test]
fn maps_conflicts() {
    let rotating = DomainError::already_rotating("lost the race");
    assert_eq!(rotating.code(), ErrorCode::AlreadyRotating);
    assert!(rotating.is_retryable());

    let lock = DomainError::conflict(ConflictKind::OptimisticLock, "stale");
    assert_eq!(lock.code(), ErrorCode::OptimisticLock);
    assert!(lock.is_retryable());

    let other = DomainError::conflict(ConflictKind::Other("x".into()), "generic");
    assert_eq!(other.code(), ErrorCode::Conflict);
    assert!(!other.is_retryable());
}

#[test]
fn maps_not_found_and_infra() {
    assert_eq!(
        DomainError::not_found(NotFoundKind::Walk, "walk 7").code(),
        ErrorCode::WalkNotFound
    );
    assert_eq!(
        DomainError::not_found(NotFoundKind::Other("Thing".into()), "?").code(),
        ErrorCode::NotFound
    );
    assert_eq!(
        DomainError::infra(InfraErrorKind::StoreUnavailable, "down").code(),
        ErrorCode::StoreUnavailable
    );
    assert_eq!(
        DomainError::infra(InfraErrorKind::Other("x".into()), "?").code(),
        ErrorCode::Internal
    );
}

#[test]
fn maps_validation_and_degenerate() {
    assert_eq!(
        DomainError::validation(ValidationKind::NotMeetupWalk, "friends walk").code(),
        ErrorCode::NotMeetupWalk
    );
    assert_eq!(
        DomainError::validation(ValidationKind::InvalidDuration, "0").code(),
        ErrorCode::ValidationError
    );
    assert_eq!(
        DomainError::degenerate("uid seen twice").code(),
        ErrorCode::AllocationDegenerate
    );
}

#[test]
fn display_includes_detail() {
    let err = DomainError::transition(TransitionKind::NotStarted, "walk 3 has not started");
    let text = err.to_string();
    assert!(text.contains("NotStarted"));
    assert!(text.contains("walk 3 has not started"));
}
