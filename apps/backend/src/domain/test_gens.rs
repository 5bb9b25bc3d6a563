// Proptest generators for domain types.

use std::collections::BTreeSet;

use proptest::prelude::*;

use crate::domain::round::Pair;
use crate::domain::walk::Uid;

/// A set of distinct participant uids, `min..=max` of them.
pub fn uid_set(min: usize, max: usize) -> impl Strategy<Value = BTreeSet<Uid>> {
    prop::collection::btree_set("[a-z]{3,8}", min..=max)
        .prop_map(|names| names.into_iter().map(Uid::from).collect())
}

/// Target group size as a walk would configure it.
pub fn group_size() -> impl Strategy<Value = usize> {
    prop_oneof![Just(2usize), Just(2usize), Just(3usize), Just(4usize)]
}

/// Earlier pairings among `uids`: each round is a random grouping.
pub fn history_for(uids: BTreeSet<Uid>) -> impl Strategy<Value = Vec<Vec<Pair>>> {
    let members: Vec<Uid> = uids.into_iter().collect();
    let n = members.len();
    prop::collection::vec(
        Just(members).prop_shuffle().prop_map(|shuffled| {
            shuffled
                .chunks(2)
                .filter(|c| c.len() == 2)
                .map(|c| Pair {
                    user_uids: c.iter().cloned().collect(),
                    color: String::new(),
                    emoji: String::new(),
                })
                .collect::<Vec<_>>()
        }),
        0..=n.min(4),
    )
}

/// Seed for an allocation.
pub fn seed() -> impl Strategy<Value = u64> {
    any::<u64>()
}
