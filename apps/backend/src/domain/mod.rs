//! Domain layer: pure walk, round and pairing logic.

pub mod decor;
pub mod lifecycle;
pub mod location;
pub mod pairing;
pub mod participant;
pub mod round;
pub mod schedule;
pub mod seed_derivation;
pub mod transitions;
pub mod walk;
pub mod walk_clock;

#[cfg(test)]
mod test_gens;
#[cfg(test)]
mod test_prelude;
#[cfg(test)]
mod tests_props_pairing;
#[cfg(test)]
mod tests_props_schedule;

// Re-exports for ergonomics
pub use lifecycle::WalkPhase;
pub use location::LocationContext;
pub use pairing::{PairingAllocator, PairingHistory};
pub use participant::{Location, Participant, ParticipantStatus, Progress, Response, SourceType};
pub use round::{Pair, Round, RoundRef, RoundState, UpcomingRound};
pub use schedule::{RoundClose, SchedulerState};
pub use transitions::{RoundActivated, WalkTransition};
pub use walk::{MeetupSettings, MeetupWalk, NewWalk, Uid, Walk, WalkKind, WalkType};
pub use walk_clock::{walk_status, ClockWindow, WalkStatus};
