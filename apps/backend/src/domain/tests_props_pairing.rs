//! Property tests for pair allocation (pure domain, no store).
//!
//! Properties tested:
//! - Pairs cover the eligible set exactly once each
//! - No group of one when at least two are eligible
//! - Group sizes never differ by more than one
//! - Same inputs and seed give the same pairs
//! - Colours and emoji are not reused within a round (small rounds)

use std::collections::{BTreeSet, HashSet};

use proptest::prelude::*;

use crate::domain::pairing::{PairingAllocator, PairingHistory};
use crate::domain::round::coverage;
use crate::domain::test_gens::{group_size, history_for, seed, uid_set};
use crate::domain::test_prelude;
use crate::domain::walk::Uid;

fn eligible_with_history() -> impl Strategy<Value = (BTreeSet<Uid>, PairingHistory)> {
    uid_set(0, 24).prop_flat_map(|eligible| {
        let rounds = history_for(eligible.clone());
        (Just(eligible), rounds).prop_map(|(eligible, rounds)| {
            let mut history = PairingHistory::new();
            for pairs in &rounds {
                history.record(pairs);
            }
            (eligible, history)
        })
    })
}

proptest! {
    #![proptest_config(test_prelude::proptest_config())]

    /// Property: disjoint, exhaustive coverage
    #[test]
    fn prop_pairs_cover_eligible_exactly(
        (eligible, history) in eligible_with_history(),
        size in group_size(),
        seed in seed(),
    ) {
        let allocator = PairingAllocator::new(size, 16).unwrap();
        let pairs = allocator.allocate(&eligible, &history, seed).unwrap();

        let total: usize = pairs.iter().map(|p| p.len()).sum();
        if eligible.len() >= 2 {
            prop_assert_eq!(coverage(&pairs), eligible.clone());
            prop_assert_eq!(total, eligible.len(), "a uid appeared twice");
        } else {
            prop_assert!(pairs.is_empty());
        }
    }

    /// Property: no singletons and balanced sizes
    #[test]
    fn prop_no_singletons_and_balanced(
        eligible in uid_set(2, 30),
        size in group_size(),
        seed in seed(),
    ) {
        let allocator = PairingAllocator::new(size, 8).unwrap();
        let pairs = allocator.allocate(&eligible, &PairingHistory::new(), seed).unwrap();

        prop_assert!(!pairs.is_empty());
        let min = pairs.iter().map(|p| p.len()).min().unwrap_or(0);
        let max = pairs.iter().map(|p| p.len()).max().unwrap_or(0);
        prop_assert!(min >= 2, "group of {} produced", min);
        prop_assert!(max - min <= 1, "sizes {}..{} are unbalanced", min, max);
    }

    /// Property: determinism for a fixed seed
    #[test]
    fn prop_same_seed_same_pairs(
        (eligible, history) in eligible_with_history(),
        seed in seed(),
    ) {
        let allocator = PairingAllocator::new(2, 16).unwrap();
        let a = allocator.allocate(&eligible, &history, seed).unwrap();
        let b = allocator.allocate(&eligible, &history, seed).unwrap();
        prop_assert_eq!(a, b);
    }

    /// Property: decoration is distinct within a round
    #[test]
    fn prop_colours_distinct_in_small_rounds(
        eligible in uid_set(2, 24),
        seed in seed(),
    ) {
        let allocator = PairingAllocator::new(2, 4).unwrap();
        let pairs = allocator.allocate(&eligible, &PairingHistory::new(), seed).unwrap();

        let colours: HashSet<&str> = pairs.iter().map(|p| p.color.as_str()).collect();
        let emoji: HashSet<&str> = pairs.iter().map(|p| p.emoji.as_str()).collect();
        prop_assert_eq!(colours.len(), pairs.len());
        prop_assert_eq!(emoji.len(), pairs.len());
    }
}
