//! Kelly criterion bet sizing.
//!
//! Computes a recommended bet in betting units using fractional Kelly on
//! the current player advantage, with a table minimum, a bankroll cap and
//! rounding to a configured chip granularity.

use rust_decimal::prelude::*;
use rust_decimal_macros::dec;
use tracing::debug;

use crate::types::{BetRecommendation, ShoeError};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Kelly sizing configuration.
#[derive(Debug, Clone)]
pub struct KellyConfig {
    /// Fractional Kelly multiplier (0.25 = quarter-Kelly). Lower = more conservative.
    pub kelly_fraction: f64,
    /// Blackjack outcome variance for the rule set (fixed, not derived from composition).
    pub variance: f64,
    /// Minimum bet in units; also the bet whenever there is no edge.
    pub minimum_units: Decimal,
    /// Maximum bet as a fraction of bankroll.
    pub max_bet_pct: Decimal,
    /// Bets are rounded half-up to a multiple of this many units.
    pub granularity: Decimal,
}

impl Default for KellyConfig {
    fn default() -> Self {
        Self {
            kelly_fraction: 0.25, // Quarter-Kelly
            variance: 1.33,
            minimum_units: dec!(1),
            max_bet_pct: dec!(0.10), // Max 10% of bankroll per hand
            granularity: dec!(0.5),
        }
    }
}

// ---------------------------------------------------------------------------
// Kelly sizer
// ---------------------------------------------------------------------------

pub struct KellyBetSizer {
    config: KellyConfig,
}

impl KellyBetSizer {
    pub fn new(config: KellyConfig) -> Self {
        Self { config }
    }

    /// Access the Kelly configuration.
    pub fn config(&self) -> &KellyConfig {
        &self.config
    }

    /// Size a bet for the given advantage (percent) and bankroll (units).
    ///
    /// Kelly for an even-money game with variance `v`: f* = edge / v.
    /// No edge returns exactly the minimum. Otherwise the fractional Kelly
    /// stake is clamped to `[minimum, max_bet_pct * bankroll]` and rounded
    /// half-up to the granularity without rounding past the cap.
    pub fn compute_bet(
        &self,
        advantage: f64,
        bankroll_units: Decimal,
    ) -> Result<BetRecommendation, ShoeError> {
        if bankroll_units <= Decimal::ZERO {
            return Err(ShoeError::InvalidBankroll {
                bankroll: bankroll_units,
            });
        }

        let minimum = self.config.minimum_units;
        if advantage <= 0.0 || !advantage.is_finite() {
            debug!(advantage, "No edge, minimum bet");
            return Ok(BetRecommendation { units: minimum });
        }

        let cap = bankroll_units * self.config.max_bet_pct;
        let kelly = (advantage / 100.0) / self.config.variance * self.config.kelly_fraction;
        let raw = Decimal::from_f64(kelly).unwrap_or(Decimal::ZERO) * bankroll_units;

        let clamped = raw.min(cap).max(minimum);
        let mut units = self.round_half_up(clamped);
        if units > cap {
            units = self.round_down(cap);
        }
        let units = units.max(minimum);

        debug!(
            advantage = format!("{advantage:+.3}%"),
            raw_kelly = format!("{:.4}%", kelly * 100.0),
            raw_units = %raw.round_dp(4),
            cap = %cap,
            units = %units,
            "Bet sized"
        );

        Ok(BetRecommendation { units })
    }

    fn round_half_up(&self, value: Decimal) -> Decimal {
        let g = self.config.granularity;
        if g <= Decimal::ZERO {
            return value;
        }
        (value / g).round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero) * g
    }

    fn round_down(&self, value: Decimal) -> Decimal {
        let g = self.config.granularity;
        if g <= Decimal::ZERO {
            return value;
        }
        (value / g).floor() * g
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
