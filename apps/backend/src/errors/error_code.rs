//! Error codes for the walks backend.
//!
//! Every `DomainError` maps to exactly one code here. Add new codes here;
//! never pass ad-hoc strings as error codes.
//!
//! All error codes are SCREAMING_SNAKE_CASE so the surrounding application
//! can forward them to clients verbatim.

use core::fmt;

/// Centralized error codes for the walks backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Authorization
    /// Walk-level mutation by someone other than the organizer
    NotOwner,
    /// Participant mutation by someone other than that participant
    NotSelf,

    // Request Validation
    /// Rounds and pairing only exist for meetup walks
    NotMeetupWalk,
    /// Group size below two
    InvalidGroupSize,
    /// Referenced round does not exist
    UnknownRound,
    /// General validation error
    ValidationError,

    // Lifecycle
    /// Transition not legal in the current state
    InvalidStateTransition,

    // Resource Not Found
    /// Walk not found
    WalkNotFound,
    /// Round not found
    RoundNotFound,
    /// Participant not found
    ParticipantNotFound,
    /// General not found error
    NotFound,

    // Concurrency & Conflicts
    /// Concurrent rotation won the compare-and-swap
    AlreadyRotating,
    /// Optimistic lock conflict on the walk document
    OptimisticLock,
    /// Participant record already exists
    AlreadyParticipating,
    /// Generic conflict (fallback for unmatched conflicts)
    Conflict,

    // Pairing
    /// Allocation failed to cover the eligible set disjointly
    AllocationDegenerate,

    // System Errors
    /// Storage backend unavailable
    StoreUnavailable,
    /// Data corruption detected
    DataCorruption,
    /// Internal error
    Internal,
    /// Configuration error
    ConfigError,
}

impl ErrorCode {
    /// Returns the canonical SCREAMING_SNAKE_CASE string for this error code.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NotOwner => "NOT_OWNER",
            Self::NotSelf => "NOT_SELF",

            Self::NotMeetupWalk => "NOT_MEETUP_WALK",
            Self::InvalidGroupSize => "INVALID_GROUP_SIZE",
            Self::UnknownRound => "UNKNOWN_ROUND",
            Self::ValidationError => "VALIDATION_ERROR",

            Self::InvalidStateTransition => "INVALID_STATE_TRANSITION",

            Self::WalkNotFound => "WALK_NOT_FOUND",
            Self::RoundNotFound => "ROUND_NOT_FOUND",
            Self::ParticipantNotFound => "PARTICIPANT_NOT_FOUND",
            Self::NotFound => "NOT_FOUND",

            Self::AlreadyRotating => "ALREADY_ROTATING",
            Self::OptimisticLock => "OPTIMISTIC_LOCK",
            Self::AlreadyParticipating => "ALREADY_PARTICIPATING",
            Self::Conflict => "CONFLICT",

            Self::AllocationDegenerate => "ALLOCATION_DEGENERATE",

            Self::StoreUnavailable => "STORE_UNAVAILABLE",
            Self::DataCorruption => "DATA_CORRUPTION",
            Self::Internal => "INTERNAL",
            Self::ConfigError => "CONFIG_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
