//! Hi-Lo running count and true count.
//!
//! Derived entirely from a snapshot: the running count is the Hi-Lo tag sum
//! over every card already dealt, so it never drifts from the composition.

use crate::shoe::{RankTable, ShoeSnapshot};
use crate::types::{CountSignal, CountView, Rank};

/// Decks-remaining floor used for the true-count divisor.
pub const MIN_DECKS_REMAINING: f64 = 0.5;

/// True count at or above which the shoe is favorable.
pub const FAVORABLE_TRUE_COUNT: f64 = 2.0;

/// True count at or below which the shoe is unfavorable.
pub const UNFAVORABLE_TRUE_COUNT: f64 = -2.0;

pub fn running_count(snapshot: &ShoeSnapshot) -> i32 {
    Rank::ALL
        .iter()
        .map(|r| RankTable::hi_lo(*r) * snapshot.removed(*r) as i32)
        .sum()
}

pub fn true_count(snapshot: &ShoeSnapshot) -> f64 {
    let decks = snapshot.decks_remaining().max(MIN_DECKS_REMAINING);
    running_count(snapshot) as f64 / decks
}

pub fn signal(true_count: f64) -> CountSignal {
    if true_count >= FAVORABLE_TRUE_COUNT {
        CountSignal::Favorable
    } else if true_count <= UNFAVORABLE_TRUE_COUNT {
        CountSignal::Unfavorable
    } else {
        CountSignal::Neutral
    }
}

pub fn view(snapshot: &ShoeSnapshot) -> CountView {
    let tc = true_count(snapshot);
    let signal = signal(tc);
    CountView {
        running_count: running_count(snapshot),
        true_count: tc,
        signal,
        recommendation: signal.recommendation().to_string(),
    }
}
