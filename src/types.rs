//! Shared types for the SHOECOUNT core.
//!
//! These types form the data model used across all modules: card ranks,
//! playing actions, decisions, the outbound display views and the error
//! taxonomy. They are kept free of behaviour beyond parsing and display so
//! that the shoe, strategy and engine modules can depend on them without
//! circular references.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Ranks
// ---------------------------------------------------------------------------

/// One of the 13 countable card ranks, as reported by the recognizer.
///
/// J/Q/K collapse into the ten value-class for play, but each is tracked as
/// its own rank because detection reports the literal symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Rank {
    #[serde(rename = "2")]
    Two,
    #[serde(rename = "3")]
    Three,
    #[serde(rename = "4")]
    Four,
    #[serde(rename = "5")]
    Five,
    #[serde(rename = "6")]
    Six,
    #[serde(rename = "7")]
    Seven,
    #[serde(rename = "8")]
    Eight,
    #[serde(rename = "9")]
    Nine,
    #[serde(rename = "10")]
    Ten,
    #[serde(rename = "J")]
    Jack,
    #[serde(rename = "Q")]
    Queen,
    #[serde(rename = "K")]
    King,
    #[serde(rename = "A")]
    Ace,
}

impl Rank {
    /// All ranks in table order (useful for iteration).
    pub const ALL: [Rank; 13] = [
        Rank::Two,
        Rank::Three,
        Rank::Four,
        Rank::Five,
        Rank::Six,
        Rank::Seven,
        Rank::Eight,
        Rank::Nine,
        Rank::Ten,
        Rank::Jack,
        Rank::Queen,
        Rank::King,
        Rank::Ace,
    ];

    /// Position of this rank in `Rank::ALL` and in every per-rank array.
    pub fn index(self) -> usize {
        self as usize
    }

    /// The printed symbol, e.g. `"10"` or `"Q"`.
    pub fn symbol(self) -> &'static str {
        match self {
            Rank::Two => "2",
            Rank::Three => "3",
            Rank::Four => "4",
            Rank::Five => "5",
            Rank::Six => "6",
            Rank::Seven => "7",
            Rank::Eight => "8",
            Rank::Nine => "9",
            Rank::Ten => "10",
            Rank::Jack => "J",
            Rank::Queen => "Q",
            Rank::King => "K",
            Rank::Ace => "A",
        }
    }

    pub fn value_class(self) -> ValueClass {
        match self {
            Rank::Two => ValueClass::Two,
            Rank::Three => ValueClass::Three,
            Rank::Four => ValueClass::Four,
            Rank::Five => ValueClass::Five,
            Rank::Six => ValueClass::Six,
            Rank::Seven => ValueClass::Seven,
            Rank::Eight => ValueClass::Eight,
            Rank::Nine => ValueClass::Nine,
            Rank::Ten | Rank::Jack | Rank::Queen | Rank::King => ValueClass::Ten,
            Rank::Ace => ValueClass::Ace,
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Parse a rank symbol (case-insensitive, surrounding whitespace ignored).
impl std::str::FromStr for Rank {
    type Err = ShoeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "2" => Ok(Rank::Two),
            "3" => Ok(Rank::Three),
            "4" => Ok(Rank::Four),
            "5" => Ok(Rank::Five),
            "6" => Ok(Rank::Six),
            "7" => Ok(Rank::Seven),
            "8" => Ok(Rank::Eight),
            "9" => Ok(Rank::Nine),
            "10" => Ok(Rank::Ten),
            "J" => Ok(Rank::Jack),
            "Q" => Ok(Rank::Queen),
            "K" => Ok(Rank::King),
            "A" => Ok(Rank::Ace),
            _ => Err(ShoeError::Parse(format!("unrecognized rank token: {s:?}"))),
        }
    }
}

/// Value-class of a card for play purposes: 2..9, ten (10/J/Q/K) and ace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ValueClass {
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Ten,
    Ace,
}

impl ValueClass {
    pub const ALL: [ValueClass; 10] = [
        ValueClass::Two,
        ValueClass::Three,
        ValueClass::Four,
        ValueClass::Five,
        ValueClass::Six,
        ValueClass::Seven,
        ValueClass::Eight,
        ValueClass::Nine,
        ValueClass::Ten,
        ValueClass::Ace,
    ];

    /// Column index in the strategy tables (2 → 0, ten → 8, ace → 9).
    pub fn index(self) -> usize {
        self as usize
    }

    /// Hard point value (ace counts 1).
    pub fn points(self) -> u8 {
        match self {
            ValueClass::Ace => 1,
            ValueClass::Ten => 10,
            other => other as u8 + 2,
        }
    }
}

impl fmt::Display for ValueClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueClass::Ace => write!(f, "A"),
            other => write!(f, "{}", other.points()),
        }
    }
}

// ---------------------------------------------------------------------------
// Decisions
// ---------------------------------------------------------------------------

/// A playing action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    Hit,
    Stand,
    Double,
    Split,
    Surrender,
}

impl Action {
    /// Verb form used in rationale text ("favors standing").
    pub fn gerund(self) -> &'static str {
        match self {
            Action::Hit => "hitting",
            Action::Stand => "standing",
            Action::Double => "doubling",
            Action::Split => "splitting",
            Action::Surrender => "surrendering",
        }
    }

    /// Whether the action is only legal as the first action on a two-card hand.
    pub fn first_action_only(self) -> bool {
        matches!(self, Action::Double | Action::Split | Action::Surrender)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Hit => write!(f, "HIT"),
            Action::Stand => write!(f, "STAND"),
            Action::Double => write!(f, "DOUBLE"),
            Action::Split => write!(f, "SPLIT"),
            Action::Surrender => write!(f, "SURRENDER"),
        }
    }
}

/// A recommended play for one hand/upcard pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub action: Action,
    /// True when a count-dependent rule overrode basic strategy.
    pub is_deviation: bool,
    pub rationale: String,
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = if self.is_deviation { " (deviation)" } else { "" };
        write!(f, "{}{} | {}", self.action, tag, self.rationale)
    }
}

/// Recommended bet size in betting units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BetRecommendation {
    pub units: Decimal,
}

impl fmt::Display for BetRecommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} units", self.units.normalize())
    }
}

/// Coarse betting signal derived from the Hi-Lo true count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CountSignal {
    Favorable,
    Neutral,
    Unfavorable,
}

impl CountSignal {
    pub fn recommendation(self) -> &'static str {
        match self {
            CountSignal::Favorable => "FAVORABLE - Increase bet",
            CountSignal::Neutral => "NEUTRAL - Standard bet",
            CountSignal::Unfavorable => "UNFAVORABLE - Minimum bet",
        }
    }
}

impl fmt::Display for CountSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.recommendation())
    }
}

// ---------------------------------------------------------------------------
// Outbound views
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvantageView {
    /// Player edge in percent (-0.50 means -0.50%).
    pub percentage: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BustProbabilityView {
    /// Dealer bust probability in percent.
    pub percentage: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BetView {
    pub units: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankCount {
    pub rank: Rank,
    pub remaining: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompositionView {
    pub deck_count: u32,
    pub remaining_per_rank: Vec<RankCount>,
    pub cards_remaining: u32,
    pub cards_dealt: u32,
    pub penetration: f64,
    pub decks_remaining: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountView {
    pub running_count: i32,
    pub true_count: f64,
    pub signal: CountSignal,
    pub recommendation: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionView {
    pub action: Action,
    pub is_deviation: bool,
    pub rationale: String,
}

impl From<Decision> for DecisionView {
    fn from(d: Decision) -> Self {
        Self {
            action: d.action,
            is_deviation: d.is_deviation,
            rationale: d.rationale,
        }
    }
}

impl From<BetRecommendation> for BetView {
    fn from(b: BetRecommendation) -> Self {
        Self { units: b.units }
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Domain-specific error types for SHOECOUNT.
///
/// None of these are fatal: each rejects exactly one operation and leaves
/// the shoe state as it was.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ShoeError {
    #[error("No {rank} cards remain in the shoe (likely misdetection)")]
    ExhaustedRank { rank: Rank },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid bankroll: {bankroll} units (must be positive)")]
    InvalidBankroll { bankroll: Decimal },

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Invalid hand: {0}")]
    InvalidHand(String),

    #[error("Shoe session is no longer running")]
    SessionClosed,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
