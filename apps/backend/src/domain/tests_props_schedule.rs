//! Property tests for round scheduling over random operation sequences.
//!
//! Properties tested:
//! - At most one round is active after any sequence of start/close/rotate
//! - Closing twice in a row changes nothing the second time
//! - Round numbers are strictly increasing from 1

use proptest::prelude::*;
use time::macros::datetime;
use time::{Duration, OffsetDateTime};

use crate::config::RotationConfig;
use crate::domain::participant::Participant;
use crate::domain::round::Round;
use crate::domain::schedule::{plan_close, plan_start, RoundInputs, StartDecision};
use crate::domain::test_prelude;
use crate::domain::walk::{NewWalk, Walk};

#[derive(Debug, Clone, Copy)]
enum Op {
    Start,
    Close,
    Rotate,
    Advance(i64),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        Just(Op::Start),
        Just(Op::Close),
        Just(Op::Rotate),
        (1i64..20).prop_map(Op::Advance),
    ]
}

struct Sim {
    walk: Walk,
    rounds: Vec<Round>,
    participants: Vec<Participant>,
    now: OffsetDateTime,
    config: RotationConfig,
}

impl Sim {
    fn new(people: usize, seed: i64) -> Self {
        let start = datetime!(2026-05-01 18:00 UTC);
        let mut walk = NewWalk::meetup("owner", start, 90).with_seed(seed).into_walk(1);
        walk.started_at = Some(start);
        Self {
            walk,
            rounds: Vec::new(),
            participants: (0..people)
                .map(|i| Participant::accepted(format!("p{i}"), start))
                .collect(),
            now: start,
            config: RotationConfig::default(),
        }
    }

    fn close(&mut self) {
        if let Some(close) = plan_close(&self.rounds, self.now) {
            if let Some(r) = self
                .rounds
                .iter_mut()
                .find(|r| r.round_number == close.round_number)
            {
                r.end_time = Some(close.end_time);
            }
        }
    }

    fn start(&mut self, replacing_active: bool) {
        let decision = {
            let inputs = RoundInputs {
                meetup: self.walk.as_meetup().unwrap(),
                rounds: &self.rounds,
                participants: &self.participants,
                now: self.now,
            };
            plan_start(inputs, &self.config, replacing_active)
        };
        if let Ok(StartDecision::Start(plan)) = decision {
            if replacing_active {
                self.close();
            }
            self.rounds.push(plan.round);
        }
    }

    fn apply(&mut self, op: Op) {
        match op {
            Op::Start => self.start(false),
            Op::Close => self.close(),
            Op::Rotate => self.start(true),
            Op::Advance(mins) => self.now += Duration::minutes(mins),
        }
    }
}

proptest! {
    #![proptest_config(test_prelude::proptest_config())]

    /// Property: at most one active round
    #[test]
    fn prop_at_most_one_active_round(
        people in 0usize..7,
        seed in any::<i64>(),
        ops in prop::collection::vec(op(), 0..40),
    ) {
        let mut sim = Sim::new(people, seed);
        for op in ops {
            sim.apply(op);
            let active = sim.rounds.iter().filter(|r| r.is_active()).count();
            prop_assert!(active <= 1, "{} active rounds after {:?}", active, op);
        }
    }

    /// Property: idempotent close
    #[test]
    fn prop_close_twice_is_noop(
        seed in any::<i64>(),
        ops in prop::collection::vec(op(), 0..20),
    ) {
        let mut sim = Sim::new(4, seed);
        for op in ops {
            sim.apply(op);
        }
        sim.close();
        let snapshot = sim.rounds.clone();
        sim.close();
        prop_assert_eq!(sim.rounds, snapshot);
    }

    /// Property: round numbers increase by one
    #[test]
    fn prop_round_numbers_sequential(
        seed in any::<i64>(),
        ops in prop::collection::vec(op(), 0..40),
    ) {
        let mut sim = Sim::new(5, seed);
        for op in ops {
            sim.apply(op);
        }
        for (i, round) in sim.rounds.iter().enumerate() {
            prop_assert_eq!(round.round_number as usize, i + 1);
            if let (Some(start), Some(end)) = (round.start_time, round.end_time) {
                prop_assert!(end >= start);
            }
        }
    }
}
