//! Display decoration for pairs: a colour and an emoji per group.
//!
//! Purely visual. Within one round the first `PAIR_COLORS.len()` groups get
//! distinct colours and distinct emoji; beyond that the (colour, emoji)
//! combination stays unique up to `PAIR_COLORS.len() * PAIR_EMOJI.len()`.

use std::collections::BTreeSet;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::domain::round::Pair;
use crate::domain::walk::Uid;

pub const PAIR_COLORS: [&str; 12] = [
    "#E4572E", "#29335C", "#F3A712", "#669BBC", "#A8C686", "#8E5572", "#2EC4B6", "#FF9F1C",
    "#5F0F40", "#0B6E4F", "#C1666B", "#4059AD",
];

pub const PAIR_EMOJI: [&str; 12] = [
    "🦊", "🐢", "🦉", "🐝", "🐬", "🦜", "🐙", "🦔", "🐳", "🦋", "🐧", "🦒",
];

/// Attach decoration to groups. The palette order is shuffled with `rng`.
pub fn decorate<R: Rng + ?Sized>(groups: Vec<BTreeSet<Uid>>, rng: &mut R) -> Vec<Pair> {
    let mut colors: Vec<&str> = PAIR_COLORS.to_vec();
    let mut emoji: Vec<&str> = PAIR_EMOJI.to_vec();
    colors.shuffle(rng);
    emoji.shuffle(rng);

    groups
        .into_iter()
        .enumerate()
        .map(|(i, user_uids)| {
            let lap = i / colors.len();
            Pair {
                user_uids,
                color: colors[i % colors.len()].to_string(),
                emoji: emoji[(i + lap) % emoji.len()].to_string(),
            }
        })
        .collect()
}
