//! Play recommendation: basic-strategy lookup, then deviation rules.

use tracing::debug;

use super::basic;
use super::deviations::{self, DeviationRule, DEVIATIONS};
use super::hand::HandSpec;
use crate::types::Decision;

/// Stateless advisor; every call depends only on its inputs.
pub struct StrategyAdvisor {
    rules: Vec<DeviationRule>,
}

impl Default for StrategyAdvisor {
    fn default() -> Self {
        Self::new(DEVIATIONS.to_vec())
    }
}

impl StrategyAdvisor {
    /// Advisor with a custom, already ordered, deviation list.
    pub fn new(rules: Vec<DeviationRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[DeviationRule] {
        &self.rules
    }

    /// Recommended action for `hand` given the current advantage (percent).
    pub fn decide(&self, hand: &HandSpec, advantage: f64) -> Decision {
        let class = hand.classify();

        if let Some(rule) = deviations::first_firing(&self.rules, hand, advantage) {
            debug!(%hand, %class, action = %rule.action, advantage, "Deviation fired");
            return Decision {
                action: rule.action,
                is_deviation: true,
                rationale: rule.rationale(advantage),
            };
        }

        let action = basic::baseline(hand);
        debug!(%hand, %class, %action, advantage, "Basic strategy");
        Decision {
            action,
            is_deviation: false,
            rationale: format!("Basic strategy: {class} vs {}.", hand.upcard_class()),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
