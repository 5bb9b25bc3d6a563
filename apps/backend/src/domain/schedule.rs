//! Round scheduling: which round is active, what the next one looks like,
//! and how long it should run.
//!
//! Everything here is pure planning over a snapshot of walk, rounds and
//! participants. Services turn the plans into store commits.

use std::collections::VecDeque;

use time::{Duration, OffsetDateTime};
use tracing::debug;

use crate::config::RotationConfig;
use crate::domain::lifecycle::WalkPhase;
use crate::domain::pairing::{verify_coverage, PairingAllocator, PairingHistory};
use crate::domain::participant::{eligible_uids, Participant};
use crate::domain::round::{coverage, Round, UpcomingRound};
use crate::domain::seed_derivation::derive_pairing_seed;
use crate::domain::walk::MeetupWalk;
use crate::errors::domain::{DomainError, TransitionKind, ValidationKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    NoActiveRound,
    RoundActive { round_number: u32 },
    /// The walk has ended; no further rounds start.
    AllRoundsExhausted,
}

pub fn scheduler_state(meetup: &MeetupWalk<'_>, rounds: &[Round]) -> SchedulerState {
    if meetup.walk.phase() == WalkPhase::Ended {
        return SchedulerState::AllRoundsExhausted;
    }
    match active_round(rounds) {
        Some(round) => SchedulerState::RoundActive {
            round_number: round.round_number,
        },
        None => SchedulerState::NoActiveRound,
    }
}

pub fn active_round(rounds: &[Round]) -> Option<&Round> {
    rounds.iter().find(|r| r.is_active())
}

pub fn next_round_number(rounds: &[Round]) -> u32 {
    rounds
        .iter()
        .map(|r| r.round_number)
        .max()
        .map_or(1, |n| n + 1)
}

/// Suggested length of the next round.
///
/// Remaining time until the estimated end is split over the queued rounds.
/// Falls back to the configured default when there is no estimated end, it
/// has passed, or nothing is queued. Never below the walk's floor.
pub fn suggested_duration(
    meetup: &MeetupWalk<'_>,
    now: OffsetDateTime,
    config: &RotationConfig,
) -> Duration {
    let floor = meetup.round_floor_minutes(config);
    let remaining_rounds = meetup.settings.upcoming_rounds.len() as i64;

    let minutes = match meetup.walk.estimated_end_time {
        Some(end) if end > now && remaining_rounds > 0 => {
            (end - now).whole_minutes() / remaining_rounds
        }
        _ => config.default_round_minutes,
    };
    Duration::minutes(minutes.max(floor))
}

/// Close of the active round, if there is one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundClose {
    pub round_number: u32,
    pub end_time: OffsetDateTime,
}

/// `None` when no round is active, which makes closing idempotent.
pub fn plan_close(rounds: &[Round], now: OffsetDateTime) -> Option<RoundClose> {
    active_round(rounds).map(|round| RoundClose {
        round_number: round.round_number,
        end_time: round.start_time.map_or(now, |start| now.max(start)),
    })
}

/// A round ready to be opened.
#[derive(Debug, Clone, PartialEq)]
pub struct StartPlan {
    pub round: Round,
    /// The shifted queue; `None` when the queue was already empty.
    pub upcoming: Option<VecDeque<UpcomingRound>>,
    pub reused_queue_pairs: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StartDecision {
    Start(StartPlan),
    /// Nobody (or only one person) to pair. Nothing should be written.
    NoEligibleParticipants,
}

/// Snapshot the planner works on.
#[derive(Debug, Clone, Copy)]
pub struct RoundInputs<'a> {
    pub meetup: MeetupWalk<'a>,
    pub rounds: &'a [Round],
    pub participants: &'a [Participant],
    pub now: OffsetDateTime,
}

/// Plan the next round.
///
/// With `replacing_active` unset an active round is an error. Rotation sets
/// it because it closes the active round in the same commit.
pub fn plan_start(
    inputs: RoundInputs<'_>,
    config: &RotationConfig,
    replacing_active: bool,
) -> Result<StartDecision, DomainError> {
    let RoundInputs {
        meetup,
        rounds,
        participants,
        now,
    } = inputs;
    let walk_id = meetup.walk.id;

    match scheduler_state(&meetup, rounds) {
        SchedulerState::AllRoundsExhausted => {
            return Err(DomainError::transition(
                TransitionKind::RoundsExhausted,
                format!("walk {walk_id} has ended; no more rounds"),
            ));
        }
        SchedulerState::RoundActive { round_number } if !replacing_active => {
            return Err(DomainError::transition(
                TransitionKind::RoundAlreadyActive,
                format!("round {round_number} of walk {walk_id} is still active"),
            ));
        }
        _ => {}
    }

    let eligible = eligible_uids(participants);
    let round_number = next_round_number(rounds);
    // Counted before the pop: the round being started is one of them.
    let duration = suggested_duration(&meetup, now, config);

    let mut upcoming = meetup.settings.upcoming_rounds.clone();
    let popped = upcoming.pop_front();
    let question_prompt = popped.as_ref().and_then(|e| e.question_prompt.clone());

    let reusable = popped.as_ref().map(|e| e.pairs.clone()).filter(|pairs| {
        !pairs.is_empty() && coverage(pairs) == eligible && verify_coverage(&eligible, pairs).is_ok()
    });

    let (pairs, reused_queue_pairs) = match reusable {
        Some(pairs) => (pairs, true),
        None => {
            let allocator = PairingAllocator::for_meetup(&meetup, config)?;
            let history = PairingHistory::from_rounds(rounds);
            let seed = derive_pairing_seed(meetup.walk.rng_seed, round_number);
            (allocator.allocate(&eligible, &history, seed)?, false)
        }
    };

    if pairs.is_empty() {
        debug!(
            walk_id,
            eligible = eligible.len(),
            "No eligible participants for next round"
        );
        return Ok(StartDecision::NoEligibleParticipants);
    }

    debug!(
        walk_id,
        round_number,
        pairs = pairs.len(),
        reused_queue_pairs,
        minutes = duration.whole_minutes(),
        "Planned next round"
    );

    Ok(StartDecision::Start(StartPlan {
        round: Round {
            walk_id,
            round_number,
            start_time: Some(now),
            planned_end_time: Some(now + duration),
            end_time: None,
            question_prompt,
            pairs,
        },
        upcoming: popped.map(|_| upcoming),
        reused_queue_pairs,
    }))
}

/// Pre-generate `count` more queued rounds.
///
/// Pairs avoid everything already played and everything already queued.
/// `prompts` are assigned in order to the new entries; entries past the end
/// of `prompts` get none. More prompts than entries is rejected.
///
/// With fewer than two eligible participants the entries are queued without
/// pairs and get allocated when their round starts.
pub fn plan_upcoming(
    inputs: RoundInputs<'_>,
    config: &RotationConfig,
    count: usize,
    prompts: &[String],
) -> Result<VecDeque<UpcomingRound>, DomainError> {
    let meetup = inputs.meetup;
    if prompts.len() > count {
        return Err(DomainError::validation(
            ValidationKind::PromptCountMismatch,
            format!(
                "{} prompts given for {count} upcoming rounds",
                prompts.len()
            ),
        ));
    }

    let allocator = PairingAllocator::for_meetup(&meetup, config)?;
    let eligible = eligible_uids(inputs.participants);

    let mut history = PairingHistory::from_rounds(inputs.rounds);
    let mut queue = meetup.settings.upcoming_rounds.clone();
    for entry in &queue {
        history.record(&entry.pairs);
    }

    let first_number = next_round_number(inputs.rounds);
    for i in 0..count {
        let round_number = first_number + queue.len() as u32;
        let seed = derive_pairing_seed(meetup.walk.rng_seed, round_number);
        let pairs = allocator.allocate(&eligible, &history, seed)?;
        if pairs.is_empty() {
            debug!(
                walk_id = meetup.walk.id,
                round_number,
                eligible = eligible.len(),
                "Queued round without pairs"
            );
        }
        history.record(&pairs);
        queue.push_back(UpcomingRound {
            question_prompt: prompts.get(i).cloned(),
            pairs,
        });
    }
    Ok(queue)
}
