//! Dealer bust probability, adjusted for shoe composition.
//!
//! Weighted-average model: neutral-deck S17 bust rates per upcard, weighted
//! by how likely each upcard is given the remaining cards, then nudged by
//! how rich the shoe is in tens and poor in small cards. Not a dealer-hand
//! simulation.

use tracing::debug;

use crate::shoe::{RankTable, ShoeSnapshot};
use crate::types::{BustProbabilityView, Rank, ValueClass};

/// Neutral-deck dealer bust probability (S17) per upcard, indexed by
/// `ValueClass::index()`.
const BASE_BUST: [f64; 10] = [
    0.3530, // 2
    0.3756, // 3
    0.4028, // 4
    0.4289, // 5
    0.4208, // 6
    0.2599, // 7
    0.2386, // 8
    0.2334, // 9
    0.2143, // 10
    0.1165, // A
];

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct BustConfig {
    /// Sensitivity to ten-richness (k1).
    pub high_sensitivity: f64,
    /// Sensitivity to small-card richness (k2).
    pub low_sensitivity: f64,
}

impl Default for BustConfig {
    fn default() -> Self {
        Self {
            high_sensitivity: 0.80,
            low_sensitivity: 0.60,
        }
    }
}

// ---------------------------------------------------------------------------
// Estimator
// ---------------------------------------------------------------------------

pub struct BustProbabilityEstimator {
    config: BustConfig,
}

/// Per-value-class card counts plus their total.
struct Counts {
    by_class: [f64; 10],
    total: f64,
}

impl Counts {
    fn remaining(snapshot: &ShoeSnapshot) -> Self {
        let mut by_class = [0.0; 10];
        for rank in Rank::ALL {
            by_class[rank.value_class().index()] += snapshot.remaining(rank) as f64;
        }
        Self {
            by_class,
            total: snapshot.cards_remaining() as f64,
        }
    }

    /// Composition of a fresh shoe with the same deck count.
    fn neutral(deck_count: u32) -> Self {
        let mut by_class = [0.0; 10];
        for rank in Rank::ALL {
            by_class[rank.value_class().index()] +=
                RankTable::initial_count(rank, deck_count) as f64;
        }
        Self {
            by_class,
            total: by_class.iter().sum(),
        }
    }

    fn high_richness(&self) -> f64 {
        self.by_class[ValueClass::Ten.index()] / self.total
    }

    fn low_richness(&self) -> f64 {
        let low: f64 = [
            ValueClass::Two,
            ValueClass::Three,
            ValueClass::Four,
            ValueClass::Five,
            ValueClass::Six,
        ]
        .iter()
        .map(|c| self.by_class[c.index()])
        .sum();
        low / self.total
    }

    fn weighted_base(&self) -> f64 {
        ValueClass::ALL
            .iter()
            .map(|c| (self.by_class[c.index()] / self.total) * BASE_BUST[c.index()])
            .sum()
    }
}

impl BustProbabilityEstimator {
    pub fn new(config: BustConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BustConfig {
        &self.config
    }

    /// Neutral bust rate for a single upcard.
    pub fn base_bust(upcard: ValueClass) -> f64 {
        BASE_BUST[upcard.index()]
    }

    /// Composition-adjusted dealer bust probability, clamped to [0,1].
    ///
    /// An exhausted shoe has no composition to weight by; it falls back to
    /// the neutral weighting with no richness adjustment.
    pub fn compute_bust_probability(&self, snapshot: &ShoeSnapshot) -> f64 {
        let neutral = Counts::neutral(snapshot.deck_count);
        if snapshot.cards_remaining() == 0 {
            return neutral.weighted_base().clamp(0.0, 1.0);
        }
        let current = Counts::remaining(snapshot);

        let high_delta = current.high_richness() - neutral.high_richness();
        let low_delta = current.low_richness() - neutral.low_richness();
        let adjustment = self.config.high_sensitivity * high_delta
            - self.config.low_sensitivity * low_delta;

        let weighted = current.weighted_base();
        let probability = (weighted + adjustment).clamp(0.0, 1.0);

        debug!(
            weighted = format!("{:.4}", weighted),
            adjustment = format!("{:+.4}", adjustment),
            probability = format!("{:.2}%", probability * 100.0),
            "Bust probability computed"
        );
        probability
    }

    pub fn view(&self, snapshot: &ShoeSnapshot) -> BustProbabilityView {
        BustProbabilityView {
            percentage: self.compute_bust_probability(snapshot) * 100.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shoe::CompositionTracker;

    fn estimator() -> BustProbabilityEstimator {
        BustProbabilityEstimator::new(BustConfig::default())
    }

    fn neutral_average() -> f64 {
        // 4/52 for each non-ten class, 16/52 for tens
        ValueClass::ALL
            .iter()
            .map(|c| {
                let weight = if *c == ValueClass::Ten { 16.0 } else { 4.0 } / 52.0;
                weight * BASE_BUST[c.index()]
            })
            .sum()
    }

    #[test]
    fn test_fresh_shoe_has_no_adjustment() {
        let t = CompositionTracker::new(6).unwrap();
        let p = estimator().compute_bust_probability(&t.snapshot());
        assert!((p - neutral_average()).abs() < 1e-12);
    }

    #[test]
    fn test_fresh_shoe_independent_of_deck_count() {
        let one = CompositionTracker::new(1).unwrap();
        let eight = CompositionTracker::new(8).unwrap();
        let a = estimator().compute_bust_probability(&one.snapshot());
        let b = estimator().compute_bust_probability(&eight.snapshot());
        assert!((a - b).abs() < 1e-12);
    }

    #[test]
    fn test_ten_rich_shoe_raises_bust() {
        let fresh = CompositionTracker::new(1).unwrap();
        let mut t = fresh.clone();
        for rank in [Rank::Two, Rank::Three, Rank::Four, Rank::Five, Rank::Six] {
            t.apply(rank).unwrap();
            t.apply(rank).unwrap();
        }
        let before = estimator().compute_bust_probability(&fresh.snapshot());
        let after = estimator().compute_bust_probability(&t.snapshot());
        assert!(after > before, "after {after} should exceed {before}");
    }

    #[test]
    fn test_ten_poor_shoe_lowers_bust() {
        let fresh = CompositionTracker::new(1).unwrap();
        let mut t = fresh.clone();
        for rank in [Rank::Ten, Rank::Jack, Rank::Queen, Rank::King] {
            t.apply(rank).unwrap();
            t.apply(rank).unwrap();
        }
        let before = estimator().compute_bust_probability(&fresh.snapshot());
        let after = estimator().compute_bust_probability(&t.snapshot());
        assert!(after < before);
    }

    #[test]
    fn test_result_is_clamped() {
        let wild = BustProbabilityEstimator::new(BustConfig {
            high_sensitivity: 100.0,
            low_sensitivity: 100.0,
        });
        let mut t = CompositionTracker::new(1).unwrap();
        for rank in [Rank::Two, Rank::Three, Rank::Four, Rank::Five, Rank::Six] {
            for _ in 0..4 {
                t.apply(rank).unwrap();
            }
        }
        let p = wild.compute_bust_probability(&t.snapshot());
        assert_eq!(p, 1.0);

        let mut t = CompositionTracker::new(1).unwrap();
        for rank in [Rank::Ten, Rank::Jack, Rank::Queen, Rank::King] {
            for _ in 0..4 {
                t.apply(rank).unwrap();
            }
        }
        let p = wild.compute_bust_probability(&t.snapshot());
        assert_eq!(p, 0.0);
    }

    #[test]
    fn test_empty_shoe_falls_back_to_neutral() {
        let mut t = CompositionTracker::new(1).unwrap();
        for rank in Rank::ALL {
            for _ in 0..4 {
                t.apply(rank).unwrap();
            }
        }
        let p = estimator().compute_bust_probability(&t.snapshot());
        assert!((p - neutral_average()).abs() < 1e-12);
    }

    #[test]
    fn test_view_is_percentage() {
        let t = CompositionTracker::new(8).unwrap();
        let v = estimator().view(&t.snapshot());
        assert!((v.percentage - neutral_average() * 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_base_bust_ordering() {
        assert!(BustProbabilityEstimator::base_bust(ValueClass::Five) > BustProbabilityEstimator::base_bust(ValueClass::Ten));
        assert!(BustProbabilityEstimator::base_bust(ValueClass::Ace) < BustProbabilityEstimator::base_bust(ValueClass::Seven));
    }
}
