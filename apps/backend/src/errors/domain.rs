//! Domain-level error type used across services and adapters.
//!
//! This error type is storage-agnostic. Store adapters translate their own
//! failures into `DomainError` in `crate::infra::store_errors`, and every
//! public operation of the crate returns `Result<T, DomainError>`.

use std::error::Error;
use std::fmt::{Display, Formatter, Result as FmtResult};

use crate::errors::error_code::ErrorCode;

/// Infra error kinds to distinguish operational failures
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum InfraErrorKind {
    StoreUnavailable,
    DataCorruption,
    Other(String),
}

/// Domain-level not found entities
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum NotFoundKind {
    Walk,
    Round,
    Participant,
    Other(String),
}

/// Domain-level conflict kinds
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConflictKind {
    /// Another rotation (or round start/close) committed first.
    AlreadyRotating,
    /// Walk document changed between read and write.
    OptimisticLock,
    /// Participant record already exists.
    AlreadyParticipating,
    Other(String),
}

/// Who is not allowed to do what
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ForbiddenKind {
    /// Walk-level mutation attempted by someone other than the organizer.
    NotOwner,
    /// Participant record mutation attempted by someone other than its user.
    NotSelf,
}

/// Illegal lifecycle or round transitions
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TransitionKind {
    AlreadyStarted,
    NotStarted,
    AlreadyEnded,
    /// Walk is neither started nor inside its active window.
    WalkNotActive,
    RoundAlreadyActive,
    /// No further rounds may start for this walk.
    RoundsExhausted,
    /// Completed rounds only accept prompt edits.
    RoundCompleted,
    ParticipantNotAccepted,
    LocationWindowClosed,
}

/// Input validation kinds
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ValidationKind {
    NotMeetupWalk,
    InvalidGroupSize,
    InvalidDuration,
    InvalidTimestamps,
    UnknownRound,
    PromptCountMismatch,
    Other(String),
}

/// Central domain error type
#[derive(Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Input/user validation or business rule violation
    Validation(ValidationKind, String),
    /// Actor lacks permission for the mutation
    Forbidden(ForbiddenKind, String),
    /// Requested transition is not legal in the current state
    InvalidTransition(TransitionKind, String),
    /// Semantic or concurrency conflict
    Conflict(ConflictKind, String),
    /// Missing resource in domain terms
    NotFound(NotFoundKind, String),
    /// Pairing could not cover the eligible set disjointly
    AllocationDegenerate(String),
    /// Infrastructure/operational failures
    Infra(InfraErrorKind, String),
}

impl Display for DomainError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            DomainError::Validation(kind, d) => write!(f, "validation error {kind:?}: {d}"),
            DomainError::Forbidden(kind, d) => write!(f, "forbidden {kind:?}: {d}"),
            DomainError::InvalidTransition(kind, d) => {
                write!(f, "invalid state transition {kind:?}: {d}")
            }
            DomainError::Conflict(kind, d) => write!(f, "conflict {kind:?}: {d}"),
            DomainError::NotFound(kind, d) => write!(f, "not found {kind:?}: {d}"),
            DomainError::AllocationDegenerate(d) => write!(f, "allocation degenerate: {d}"),
            DomainError::Infra(kind, d) => write!(f, "infra {kind:?}: {d}"),
        }
    }
}

impl Error for DomainError {}

impl DomainError {
    pub fn validation(kind: ValidationKind, detail: impl Into<String>) -> Self {
        Self::Validation(kind, detail.into())
    }
    pub fn forbidden(kind: ForbiddenKind, detail: impl Into<String>) -> Self {
        Self::Forbidden(kind, detail.into())
    }
    pub fn not_owner(detail: impl Into<String>) -> Self {
        Self::Forbidden(ForbiddenKind::NotOwner, detail.into())
    }
    pub fn transition(kind: TransitionKind, detail: impl Into<String>) -> Self {
        Self::InvalidTransition(kind, detail.into())
    }
    pub fn conflict(kind: ConflictKind, detail: impl Into<String>) -> Self {
        Self::Conflict(kind, detail.into())
    }
    pub fn already_rotating(detail: impl Into<String>) -> Self {
        Self::Conflict(ConflictKind::AlreadyRotating, detail.into())
    }
    pub fn not_found(kind: NotFoundKind, detail: impl Into<String>) -> Self {
        Self::NotFound(kind, detail.into())
    }
    pub fn degenerate(detail: impl Into<String>) -> Self {
        Self::AllocationDegenerate(detail.into())
    }
    pub fn infra(kind: InfraErrorKind, detail: impl Into<String>) -> Self {
        Self::Infra(kind, detail.into())
    }

    /// Stable machine-readable code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            DomainError::Validation(ValidationKind::NotMeetupWalk, _) => ErrorCode::NotMeetupWalk,
            DomainError::Validation(ValidationKind::InvalidGroupSize, _) => {
                ErrorCode::InvalidGroupSize
            }
            DomainError::Validation(ValidationKind::UnknownRound, _) => ErrorCode::UnknownRound,
            DomainError::Validation(_, _) => ErrorCode::ValidationError,
            DomainError::Forbidden(ForbiddenKind::NotOwner, _) => ErrorCode::NotOwner,
            DomainError::Forbidden(ForbiddenKind::NotSelf, _) => ErrorCode::NotSelf,
            DomainError::InvalidTransition(_, _) => ErrorCode::InvalidStateTransition,
            DomainError::Conflict(ConflictKind::AlreadyRotating, _) => ErrorCode::AlreadyRotating,
            DomainError::Conflict(ConflictKind::OptimisticLock, _) => ErrorCode::OptimisticLock,
            DomainError::Conflict(ConflictKind::AlreadyParticipating, _) => {
                ErrorCode::AlreadyParticipating
            }
            DomainError::Conflict(_, _) => ErrorCode::Conflict,
            DomainError::NotFound(NotFoundKind::Walk, _) => ErrorCode::WalkNotFound,
            DomainError::NotFound(NotFoundKind::Round, _) => ErrorCode::RoundNotFound,
            DomainError::NotFound(NotFoundKind::Participant, _) => ErrorCode::ParticipantNotFound,
            DomainError::NotFound(_, _) => ErrorCode::NotFound,
            DomainError::AllocationDegenerate(_) => ErrorCode::AllocationDegenerate,
            DomainError::Infra(InfraErrorKind::StoreUnavailable, _) => ErrorCode::StoreUnavailable,
            DomainError::Infra(InfraErrorKind::DataCorruption, _) => ErrorCode::DataCorruption,
            DomainError::Infra(_, _) => ErrorCode::Internal,
        }
    }

    /// Whether the caller may re-read state and retry once.
    ///
    /// Only concurrency conflicts qualify; callers must not loop on them.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            DomainError::Conflict(ConflictKind::AlreadyRotating, _)
                | DomainError::Conflict(ConflictKind::OptimisticLock, _)
        )
    }
}
