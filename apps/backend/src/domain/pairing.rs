//! Pair allocation for meetup rounds.
//!
//! Partitions the eligible participants into groups of the target size,
//! preferring groups whose members have not met before. Candidates come from
//! seeded shuffles; the cheapest one is then polished by member swaps
//! between groups. Everything is driven by a single seeded RNG so a given
//! `(eligible, history, seed)` always produces the same pairs.
//!
//! Group sizing never leaves anyone alone: with an odd count and target 2
//! one group of three is formed, and a lone eligible participant yields no
//! pairs at all (the round is deferred).

use std::collections::{BTreeSet, HashMap, HashSet};

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, error};

use crate::config::RotationConfig;
use crate::domain::decor;
use crate::domain::round::{Pair, Round};
use crate::domain::walk::{MeetupWalk, Uid};
use crate::errors::domain::{DomainError, ValidationKind};

/// Cost added when a group exactly repeats an earlier group.
const EXACT_REPEAT_PENALTY: u64 = 1_000;

/// Upper bound on swap-improvement sweeps.
const MAX_SWAP_PASSES: usize = 8;

/// Who has already been grouped with whom during this walk.
#[derive(Debug, Clone, Default)]
pub struct PairingHistory {
    groups: HashSet<BTreeSet<Uid>>,
    met: HashMap<(Uid, Uid), u32>,
}

impl PairingHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// History from started rounds (active or completed).
    pub fn from_rounds<'a>(rounds: impl IntoIterator<Item = &'a Round>) -> Self {
        let mut history = Self::new();
        for round in rounds {
            if round.start_time.is_some() {
                history.record(&round.pairs);
            }
        }
        history
    }

    pub fn record(&mut self, pairs: &[Pair]) {
        for pair in pairs {
            self.record_group(&pair.user_uids);
        }
    }

    pub fn record_group(&mut self, group: &BTreeSet<Uid>) {
        let members: Vec<&Uid> = group.iter().collect();
        for (i, a) in members.iter().enumerate() {
            for b in &members[i + 1..] {
                *self.met.entry(Self::key(a, b)).or_insert(0) += 1;
            }
        }
        self.groups.insert(group.clone());
    }

    pub fn times_met(&self, a: &Uid, b: &Uid) -> u32 {
        self.met.get(&Self::key(a, b)).copied().unwrap_or(0)
    }

    pub fn is_exact_repeat(&self, group: &BTreeSet<Uid>) -> bool {
        self.groups.contains(group)
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    fn key(a: &Uid, b: &Uid) -> (Uid, Uid) {
        if a <= b {
            (a.clone(), b.clone())
        } else {
            (b.clone(), a.clone())
        }
    }

    /// Squared repeat counts, so meeting someone a third time costs more
    /// than two people each meeting a second partner again.
    fn group_cost(&self, group: &[Uid]) -> u64 {
        let mut cost = 0u64;
        for (i, a) in group.iter().enumerate() {
            for b in &group[i + 1..] {
                let met = u64::from(self.times_met(a, b));
                cost += met * met;
            }
        }
        if !self.groups.is_empty() {
            let set: BTreeSet<Uid> = group.iter().cloned().collect();
            if self.groups.contains(&set) {
                cost += EXACT_REPEAT_PENALTY;
            }
        }
        cost
    }

    fn total_cost(&self, groups: &[Vec<Uid>]) -> u64 {
        groups.iter().map(|g| self.group_cost(g)).sum()
    }
}

/// Sizes of the groups `n` participants are split into.
///
/// Every group has at least two members and sizes differ by at most one.
/// Returns an empty list when `n < 2`.
pub fn group_sizes(n: usize, target: usize) -> Vec<usize> {
    if n < 2 {
        return Vec::new();
    }
    let target = target.max(2);
    let rounded = (n + target / 2) / target;
    let count = rounded.clamp(1, n / 2);

    let base = n / count;
    let extra = n % count;
    (0..count)
        .map(|i| if i < extra { base + 1 } else { base })
        .collect()
}

/// Check that `pairs` cover `eligible` exactly once each and contain no
/// singleton groups.
pub fn verify_coverage(eligible: &BTreeSet<Uid>, pairs: &[Pair]) -> Result<(), DomainError> {
    let mut seen: BTreeSet<&Uid> = BTreeSet::new();
    for pair in pairs {
        if pair.user_uids.len() < 2 {
            return Err(DomainError::degenerate(format!(
                "group of {} produced for {} eligible participants",
                pair.user_uids.len(),
                eligible.len()
            )));
        }
        for uid in &pair.user_uids {
            if !seen.insert(uid) {
                return Err(DomainError::degenerate(format!("{uid} assigned twice")));
            }
            if !eligible.contains(uid) {
                return Err(DomainError::degenerate(format!("{uid} is not eligible")));
            }
        }
    }
    if seen.len() != eligible.len() {
        return Err(DomainError::degenerate(format!(
            "covered {} of {} eligible participants",
            seen.len(),
            eligible.len()
        )));
    }
    Ok(())
}

/// Allocates participants into pairs (or larger groups) for one round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairingAllocator {
    group_size: usize,
    max_attempts: u32,
}

impl PairingAllocator {
    pub fn new(group_size: usize, max_attempts: u32) -> Result<Self, DomainError> {
        if group_size < 2 {
            return Err(DomainError::validation(
                ValidationKind::InvalidGroupSize,
                format!("group size {group_size} is below 2"),
            ));
        }
        Ok(Self {
            group_size,
            max_attempts: max_attempts.max(1),
        })
    }

    /// Allocator configured for a specific meetup.
    pub fn for_meetup(meetup: &MeetupWalk<'_>, config: &RotationConfig) -> Result<Self, DomainError> {
        Self::new(meetup.target_group_size(config)?, config.max_pairing_attempts)
    }

    pub fn group_size(&self) -> usize {
        self.group_size
    }

    /// Allocate pairs for `eligible`.
    ///
    /// Fewer than two eligible participants is not an error: the result is
    /// empty and the caller treats it as "no round to start".
    pub fn allocate(
        &self,
        eligible: &BTreeSet<Uid>,
        history: &PairingHistory,
        seed: u64,
    ) -> Result<Vec<Pair>, DomainError> {
        let sizes = group_sizes(eligible.len(), self.group_size);
        if sizes.is_empty() {
            debug!(eligible = eligible.len(), "Not enough participants to pair");
            return Ok(Vec::new());
        }

        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let members: Vec<Uid> = eligible.iter().cloned().collect();

        let mut best: Option<(u64, Vec<Vec<Uid>>)> = None;
        for _ in 0..self.max_attempts {
            let mut order = members.clone();
            order.shuffle(&mut rng);
            let groups = split(order, &sizes);
            let cost = history.total_cost(&groups);
            if best.as_ref().map_or(true, |(c, _)| cost < *c) {
                best = Some((cost, groups));
            }
            if cost == 0 {
                break;
            }
        }

        let (mut cost, mut groups) = best
            .ok_or_else(|| DomainError::degenerate("no candidate allocation produced"))?;
        if cost > 0 {
            cost = improve_by_swaps(history, &mut groups, cost);
        }

        debug!(
            eligible = eligible.len(),
            groups = groups.len(),
            repeat_cost = cost,
            "Pairs allocated"
        );

        let groups: Vec<BTreeSet<Uid>> = groups
            .into_iter()
            .map(|g| g.into_iter().collect())
            .collect();
        let pairs = decor::decorate(groups, &mut rng);

        if let Err(e) = verify_coverage(eligible, &pairs) {
            error!(error = %e, "Pair allocation failed coverage check");
            return Err(e);
        }
        Ok(pairs)
    }
}

fn split(order: Vec<Uid>, sizes: &[usize]) -> Vec<Vec<Uid>> {
    let mut rest = order.into_iter();
    sizes
        .iter()
        .map(|&size| rest.by_ref().take(size).collect())
        .collect()
}

/// Hill-climb by swapping members between groups while that lowers cost.
fn improve_by_swaps(history: &PairingHistory, groups: &mut [Vec<Uid>], mut cost: u64) -> u64 {
    for _ in 0..MAX_SWAP_PASSES {
        let mut improved = false;
        for gi in 0..groups.len() {
            for gj in gi + 1..groups.len() {
                for a in 0..groups[gi].len() {
                    for b in 0..groups[gj].len() {
                        let before =
                            history.group_cost(&groups[gi]) + history.group_cost(&groups[gj]);
                        swap_members(groups, (gi, a), (gj, b));
                        let after =
                            history.group_cost(&groups[gi]) + history.group_cost(&groups[gj]);
                        if after < before {
                            cost = cost - before + after;
                            improved = true;
                        } else {
                            swap_members(groups, (gi, a), (gj, b));
                        }
                    }
                }
            }
        }
        if !improved || cost == 0 {
            break;
        }
    }
    cost
}

fn swap_members(groups: &mut [Vec<Uid>], (gi, a): (usize, usize), (gj, b): (usize, usize)) {
    debug_assert!(gi < gj);
    let (left, right) = groups.split_at_mut(gj);
    std::mem::swap(&mut left[gi][a], &mut right[0][b]);
}
