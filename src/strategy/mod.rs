//! Strategy engine: advantage, bust probability, bet sizing and play advice.

pub mod advisor;
pub mod basic;
pub mod bust;
pub mod count;
pub mod deviations;
pub mod edge;
pub mod hand;
pub mod kelly;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{info, warn};

use crate::shoe::ShoeSnapshot;
use crate::types::{
    AdvantageView, BetRecommendation, BetView, BustProbabilityView, CompositionView, CountView,
    Decision,
};
use advisor::StrategyAdvisor;
use bust::BustProbabilityEstimator;
use edge::AdvantageCalculator;
use hand::HandSpec;
use kelly::KellyBetSizer;

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// Every derived metric for one snapshot. Recomputed after each mutation;
/// readers hold it as a consistent unit.
#[derive(Debug, Clone, Serialize)]
pub struct ShoeReport {
    pub snapshot: ShoeSnapshot,
    /// Player advantage in percent.
    pub advantage: f64,
    /// Dealer bust probability in [0,1].
    pub bust_probability: f64,
    /// `None` only when the configured bankroll is unusable.
    pub bet: Option<BetRecommendation>,
    pub count: CountView,
    pub computed_at: DateTime<Utc>,
}

impl ShoeReport {
    pub fn composition_view(&self) -> CompositionView {
        CompositionView::from(&self.snapshot)
    }

    pub fn advantage_view(&self) -> AdvantageView {
        AdvantageView {
            percentage: self.advantage,
        }
    }

    pub fn bust_view(&self) -> BustProbabilityView {
        BustProbabilityView {
            percentage: self.bust_probability * 100.0,
        }
    }

    pub fn bet_view(&self) -> Option<BetView> {
        self.bet.map(BetView::from)
    }
}

// ---------------------------------------------------------------------------
// Analyzer
// ---------------------------------------------------------------------------

/// Pipelines snapshot → advantage → bust probability → bet size, and
/// answers strategy queries against a report's advantage.
///
/// Holds no shoe state of its own; safe to share between readers.
pub struct ShoeAnalyzer {
    advantage: AdvantageCalculator,
    bust: BustProbabilityEstimator,
    kelly: KellyBetSizer,
    advisor: StrategyAdvisor,
    bankroll_units: Decimal,
}

impl ShoeAnalyzer {
    pub fn new(
        advantage: AdvantageCalculator,
        bust: BustProbabilityEstimator,
        kelly: KellyBetSizer,
        advisor: StrategyAdvisor,
        bankroll_units: Decimal,
    ) -> Self {
        Self {
            advantage,
            bust,
            kelly,
            advisor,
            bankroll_units,
        }
    }

    pub fn bankroll_units(&self) -> Decimal {
        self.bankroll_units
    }

    pub fn advisor(&self) -> &StrategyAdvisor {
        &self.advisor
    }

    /// Recompute every metric from one snapshot.
    pub fn evaluate(&self, snapshot: ShoeSnapshot) -> ShoeReport {
        let advantage = self.advantage.compute_advantage(&snapshot);
        let bust_probability = self.bust.compute_bust_probability(&snapshot);
        let bet = match self.kelly.compute_bet(advantage, self.bankroll_units) {
            Ok(bet) => Some(bet),
            Err(e) => {
                warn!(error = %e, "Bet sizing skipped");
                None
            }
        };
        let count = count::view(&snapshot);

        ShoeReport {
            snapshot,
            advantage,
            bust_probability,
            bet,
            count,
            computed_at: Utc::now(),
        }
    }

    /// Advise on a hand using the advantage recorded in `report`.
    pub fn advise(&self, hand: &HandSpec, report: &ShoeReport) -> Decision {
        let decision = self.advisor.decide(hand, report.advantage);
        info!(
            %hand,
            action = %decision.action,
            deviation = decision.is_deviation,
            advantage = format!("{:+.2}%", report.advantage),
            "Strategy query"
        );
        decision
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
