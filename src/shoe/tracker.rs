//! Composition tracker: the single mutable model of the active shoe.
//!
//! Owns the remaining-card counts, applies observed-card events and hands
//! out immutable snapshots. All downstream calculators read snapshots only.

use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::ranks::{RankTable, CARDS_PER_DECK, MAX_DECKS};
use crate::types::{CompositionView, Rank, RankCount, ShoeError, ValueClass};

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// Immutable copy of the shoe state at one instant.
///
/// Internally consistent by construction: it is copied whole from the
/// tracker between mutations, so it can never observe a partial `apply`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShoeSnapshot {
    /// Identifies the shoe this snapshot was taken from.
    pub shoe_id: Uuid,
    pub deck_count: u32,
    remaining: [u32; 13],
    pub cards_dealt: u32,
}

impl ShoeSnapshot {
    pub fn remaining(&self, rank: Rank) -> u32 {
        self.remaining[rank.index()]
    }

    pub fn initial(&self, rank: Rank) -> u32 {
        RankTable::initial_count(rank, self.deck_count)
    }

    pub fn removed(&self, rank: Rank) -> u32 {
        self.initial(rank) - self.remaining(rank)
    }

    /// Fraction of this rank already dealt, in [0,1].
    pub fn removed_fraction(&self, rank: Rank) -> f64 {
        let initial = self.initial(rank);
        if initial == 0 {
            return 0.0;
        }
        self.removed(rank) as f64 / initial as f64
    }

    pub fn total_initial(&self) -> u32 {
        self.deck_count * CARDS_PER_DECK
    }

    pub fn cards_remaining(&self) -> u32 {
        self.remaining.iter().sum()
    }

    /// Remaining cards whose value-class is `class` (four ranks for tens).
    pub fn remaining_of_class(&self, class: ValueClass) -> u32 {
        Rank::ALL
            .iter()
            .filter(|r| r.value_class() == class)
            .map(|r| self.remaining(*r))
            .sum()
    }

    /// `cards_dealt / total_initial`, always in [0,1].
    pub fn penetration(&self) -> f64 {
        let total = self.total_initial();
        if total == 0 {
            return 0.0;
        }
        self.cards_dealt as f64 / total as f64
    }

    pub fn decks_remaining(&self) -> f64 {
        self.cards_remaining() as f64 / CARDS_PER_DECK as f64
    }

    /// True when nothing has been dealt yet.
    pub fn is_fresh(&self) -> bool {
        self.cards_dealt == 0
    }
}

impl From<&ShoeSnapshot> for CompositionView {
    fn from(s: &ShoeSnapshot) -> Self {
        Self {
            deck_count: s.deck_count,
            remaining_per_rank: Rank::ALL
                .iter()
                .map(|r| RankCount {
                    rank: *r,
                    remaining: s.remaining(*r),
                })
                .collect(),
            cards_remaining: s.cards_remaining(),
            cards_dealt: s.cards_dealt,
            penetration: s.penetration(),
            decks_remaining: s.decks_remaining(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tracker
// ---------------------------------------------------------------------------

/// Mutable remaining-card model for the active shoe.
///
/// Invariants after every call: `remaining[r] <= initial[r]` and
/// `sum(remaining) + cards_dealt == deck_count * 52`.
#[derive(Debug, Clone)]
pub struct CompositionTracker {
    shoe_id: Uuid,
    deck_count: u32,
    remaining: [u32; 13],
    cards_dealt: u32,
}

impl CompositionTracker {
    /// A full shoe of `deck_count` decks.
    pub fn new(deck_count: u32) -> Result<Self, ShoeError> {
        if deck_count == 0 || deck_count > MAX_DECKS {
            return Err(ShoeError::InvalidConfiguration(format!(
                "deck count must be between 1 and {MAX_DECKS}, got {deck_count}"
            )));
        }
        let mut remaining = [0u32; 13];
        for rank in Rank::ALL {
            remaining[rank.index()] = RankTable::initial_count(rank, deck_count);
        }
        Ok(Self {
            shoe_id: Uuid::new_v4(),
            deck_count,
            remaining,
            cards_dealt: 0,
        })
    }

    /// Replace the whole state with a fresh shoe. On error the current shoe
    /// is kept untouched.
    pub fn new_shoe(&mut self, deck_count: u32) -> Result<(), ShoeError> {
        let fresh = Self::new(deck_count)?;
        info!(
            previous_shoe = %self.shoe_id,
            shoe_id = %fresh.shoe_id,
            deck_count,
            "New shoe"
        );
        *self = fresh;
        Ok(())
    }

    /// Record one dealt card. Fails without touching state when no card of
    /// that rank is left.
    pub fn apply(&mut self, rank: Rank) -> Result<(), ShoeError> {
        let slot = &mut self.remaining[rank.index()];
        if *slot == 0 {
            warn!(
                shoe_id = %self.shoe_id,
                %rank,
                cards_dealt = self.cards_dealt,
                "Rank exhausted, rejecting observed card"
            );
            return Err(ShoeError::ExhaustedRank { rank });
        }
        *slot -= 1;
        self.cards_dealt += 1;

        debug_assert_eq!(
            self.remaining.iter().sum::<u32>() + self.cards_dealt,
            self.deck_count * CARDS_PER_DECK
        );
        debug!(
            %rank,
            remaining = self.remaining[rank.index()],
            cards_dealt = self.cards_dealt,
            "Card applied"
        );
        Ok(())
    }

    pub fn snapshot(&self) -> ShoeSnapshot {
        ShoeSnapshot {
            shoe_id: self.shoe_id,
            deck_count: self.deck_count,
            remaining: self.remaining,
            cards_dealt: self.cards_dealt,
        }
    }

    pub fn deck_count(&self) -> u32 {
        self.deck_count
    }

    pub fn cards_dealt(&self) -> u32 {
        self.cards_dealt
    }

    pub fn remaining(&self, rank: Rank) -> u32 {
        self.remaining[rank.index()]
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
