//! Player hand classification and strategy-query parsing.

use std::fmt;

use crate::types::{Rank, ShoeError, ValueClass};

/// How a hand is looked up in the strategy tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandClass {
    Hard(u8),
    Soft(u8),
    Pair(ValueClass),
}

impl fmt::Display for HandClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandClass::Hard(total) => write!(f, "hard {total}"),
            HandClass::Soft(total) => write!(f, "soft {total}"),
            HandClass::Pair(class) => write!(f, "pair of {class}s"),
        }
    }
}

/// Two or more player cards plus the dealer upcard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandSpec {
    cards: Vec<Rank>,
    upcard: Rank,
}

impl HandSpec {
    pub fn new(cards: Vec<Rank>, upcard: Rank) -> Result<Self, ShoeError> {
        if cards.len() < 2 {
            return Err(ShoeError::InvalidHand(format!(
                "need at least two player cards, got {}",
                cards.len()
            )));
        }
        // wide sum: free-text hands can hold arbitrarily many cards
        let total: u32 = cards
            .iter()
            .map(|r| u32::from(r.value_class().points()))
            .sum();
        if total > 21 {
            return Err(ShoeError::InvalidHand(format!(
                "hand is already bust (hard {total})"
            )));
        }
        Ok(Self { cards, upcard })
    }

    /// Parse free-text tokens such as `"10,6"` and `"A"`. Tokens may be
    /// separated by commas and/or whitespace.
    pub fn parse(hand: &str, upcard: &str) -> Result<Self, ShoeError> {
        let cards = parse_tokens(hand)?;
        let upcards = parse_tokens(upcard)?;
        let upcard = match upcards.as_slice() {
            [single] => *single,
            _ => {
                return Err(ShoeError::Parse(format!(
                    "expected exactly one upcard, got {upcard:?}"
                )))
            }
        };
        Self::new(cards, upcard)
    }

    /// Parse a combined query of the form `"<hand> vs <upcard>"`.
    pub fn parse_query(query: &str) -> Result<Self, ShoeError> {
        let words: Vec<&str> = query.split_whitespace().collect();
        let pos = words
            .iter()
            .position(|w| w.eq_ignore_ascii_case("vs"))
            .ok_or_else(|| ShoeError::Parse(format!("expected '<hand> vs <upcard>', got {query:?}")))?;
        Self::parse(&words[..pos].join(" "), &words[pos + 1..].join(" "))
    }

    pub fn cards(&self) -> &[Rank] {
        &self.cards
    }

    pub fn upcard(&self) -> Rank {
        self.upcard
    }

    pub fn upcard_class(&self) -> ValueClass {
        self.upcard.value_class()
    }

    /// Total counting every ace as 1. At most 21 for any constructed hand.
    pub fn hard_total(&self) -> u8 {
        self.cards.iter().map(|r| r.value_class().points()).sum()
    }

    /// Total with one ace counted as 11, present only if that doesn't bust.
    pub fn soft_total(&self) -> Option<u8> {
        let has_ace = self.cards.iter().any(|r| *r == Rank::Ace);
        let hard = self.hard_total();
        (has_ace && hard + 10 <= 21).then_some(hard + 10)
    }

    /// Exactly two cards of the same value-class (so K,Q is a pair of tens).
    pub fn is_pair(&self) -> bool {
        matches!(self.cards.as_slice(), [a, b] if a.value_class() == b.value_class())
    }

    /// Two-card hand: doubling, splitting and surrender are available.
    pub fn is_first_action(&self) -> bool {
        self.cards.len() == 2
    }

    pub fn classify(&self) -> HandClass {
        if self.is_pair() {
            return HandClass::Pair(self.cards[0].value_class());
        }
        match self.soft_total() {
            Some(soft) => HandClass::Soft(soft),
            None => HandClass::Hard(self.hard_total()),
        }
    }
}

impl fmt::Display for HandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cards: Vec<&str> = self.cards.iter().map(|r| r.symbol()).collect();
        write!(f, "{} vs {}", cards.join(","), self.upcard)
    }
}

fn parse_tokens(input: &str) -> Result<Vec<Rank>, ShoeError> {
    input
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
        .map(str::parse)
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
