//! Player advantage from shoe composition.
//!
//! Linear Effect-of-Removal model: each rank shifts the neutral-shoe house
//! edge by its EOR weight scaled by the fraction of that rank already dealt.

use tracing::debug;

use crate::shoe::{RankTable, ShoeSnapshot};
use crate::types::{AdvantageView, Rank};

// ---------------------------------------------------------------------------
// Configuration (overridden by config.toml at runtime)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct AdvantageConfig {
    /// Player advantage (percent) of an untouched shoe. Negative = house edge.
    pub base_house_edge: f64,
}

impl Default for AdvantageConfig {
    fn default() -> Self {
        Self {
            base_house_edge: RankTable::base_house_edge(),
        }
    }
}

// ---------------------------------------------------------------------------
// Calculator
// ---------------------------------------------------------------------------

pub struct AdvantageCalculator {
    config: AdvantageConfig,
}

impl AdvantageCalculator {
    pub fn new(config: AdvantageConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AdvantageConfig {
        &self.config
    }

    /// Player advantage in percent:
    /// `base + sum_r EOR[r] * removed_fraction(r)`.
    ///
    /// A fresh shoe returns `base_house_edge` exactly.
    pub fn compute_advantage(&self, snapshot: &ShoeSnapshot) -> f64 {
        let shift: f64 = Rank::ALL
            .iter()
            .map(|r| RankTable::eor(*r) * snapshot.removed_fraction(*r))
            .sum();
        let advantage = self.config.base_house_edge + shift;

        debug!(
            cards_dealt = snapshot.cards_dealt,
            shift = format!("{shift:+.4}%"),
            advantage = format!("{advantage:+.4}%"),
            "Advantage computed"
        );
        advantage
    }

    pub fn view(&self, snapshot: &ShoeSnapshot) -> AdvantageView {
        AdvantageView {
            percentage: self.compute_advantage(snapshot),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
