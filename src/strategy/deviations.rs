//! Count-dependent deviations from basic strategy.
//!
//! An ordered rule list: the first rule whose hand/upcard pattern matches
//! and whose advantage trigger fires overrides the table action. Rules are
//! authored most-specific first; order is significant.

use super::hand::{HandClass, HandSpec};
use crate::types::{Action, ValueClass};

/// Advantage condition under which a rule fires (advantage in percent).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Trigger {
    /// `advantage >= threshold`
    AtLeast(f64),
    /// `advantage < threshold`
    Below(f64),
}

impl Trigger {
    pub fn fires(self, advantage: f64) -> bool {
        match self {
            Trigger::AtLeast(threshold) => advantage >= threshold,
            Trigger::Below(threshold) => advantage < threshold,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeviationRule {
    pub hand: HandClass,
    pub upcard: ValueClass,
    pub trigger: Trigger,
    pub action: Action,
}

impl DeviationRule {
    const fn new(hand: HandClass, upcard: ValueClass, trigger: Trigger, action: Action) -> Self {
        Self {
            hand,
            upcard,
            trigger,
            action,
        }
    }

    /// Pattern match only; ignores the advantage.
    pub fn matches(&self, hand: &HandSpec) -> bool {
        if self.action.first_action_only() && !hand.is_first_action() {
            return false;
        }
        self.hand == hand.classify() && self.upcard == hand.upcard_class()
    }

    pub fn fires(&self, hand: &HandSpec, advantage: f64) -> bool {
        self.matches(hand) && self.trigger.fires(advantage)
    }

    pub fn rationale(&self, advantage: f64) -> String {
        let level = match self.trigger {
            Trigger::AtLeast(_) => "High",
            Trigger::Below(_) => "Low",
        };
        format!(
            "{level} count ({advantage:+.2}%) favors {}.",
            self.action.gerund()
        )
    }
}

use Action::{Double, Hit, Split, Stand, Surrender};
use HandClass::{Hard, Pair, Soft};
use Trigger::{AtLeast, Below};
use ValueClass as V;

/// Default deviation list, in priority order.
#[rustfmt::skip]
pub const DEVIATIONS: &[DeviationRule] = &[
    // splitting tens
    DeviationRule::new(Pair(V::Ten), V::Five,  AtLeast(2.0),  Split),
    DeviationRule::new(Pair(V::Ten), V::Six,   AtLeast(1.75), Split),
    DeviationRule::new(Pair(V::Ten), V::Four,  AtLeast(2.5),  Split),
    // surrender
    DeviationRule::new(Hard(14), V::Ten,   AtLeast(1.0),  Surrender),
    DeviationRule::new(Hard(15), V::Nine,  AtLeast(0.5),  Surrender),
    DeviationRule::new(Hard(15), V::Ace,   AtLeast(0.0),  Surrender),
    // standing stiff hands
    DeviationRule::new(Hard(16), V::Ten,   AtLeast(0.5),  Stand),
    DeviationRule::new(Hard(16), V::Nine,  AtLeast(2.0),  Stand),
    DeviationRule::new(Hard(15), V::Ten,   AtLeast(1.5),  Stand),
    DeviationRule::new(Hard(12), V::Three, AtLeast(0.5),  Stand),
    DeviationRule::new(Hard(12), V::Two,   AtLeast(1.0),  Stand),
    // hitting stiff hands in a small-card-rich shoe
    DeviationRule::new(Hard(12), V::Four,  Below(-0.5),   Hit),
    DeviationRule::new(Hard(12), V::Five,  Below(-1.25),  Hit),
    DeviationRule::new(Hard(12), V::Six,   Below(-1.0),   Hit),
    DeviationRule::new(Hard(13), V::Two,   Below(-0.75),  Hit),
    DeviationRule::new(Hard(13), V::Three, Below(-1.5),   Hit),
    // doubling
    DeviationRule::new(Hard(11), V::Ace,   AtLeast(0.0),  Double),
    DeviationRule::new(Hard(10), V::Ten,   AtLeast(1.5),  Double),
    DeviationRule::new(Hard(10), V::Ace,   AtLeast(1.5),  Double),
    DeviationRule::new(Hard(9),  V::Two,   AtLeast(0.0),  Double),
    DeviationRule::new(Hard(9),  V::Seven, AtLeast(1.0),  Double),
    DeviationRule::new(Soft(19), V::Six,   AtLeast(0.0),  Double),
    DeviationRule::new(Soft(19), V::Five,  AtLeast(0.5),  Double),
    DeviationRule::new(Soft(19), V::Four,  AtLeast(1.5),  Double),
    DeviationRule::new(Soft(17), V::Two,   AtLeast(0.0),  Double),
];

/// First rule in `rules` that fires for this hand at this advantage.
pub fn first_firing<'a>(
    rules: &'a [DeviationRule],
    hand: &HandSpec,
    advantage: f64,
) -> Option<&'a DeviationRule> {
    rules.iter().find(|rule| rule.fires(hand, advantage))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
