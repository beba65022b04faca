//! Static per-rank constants.
//!
//! Card multiplicity, Effect-of-Removal weights and Hi-Lo tags for the 13
//! countable ranks, plus the neutral-deck house edge they are measured
//! against.

use crate::types::Rank;

/// Cards of each rank in a single 52-card deck.
pub const CARDS_PER_RANK_PER_DECK: u32 = 4;

/// Cards in a single deck.
pub const CARDS_PER_DECK: u32 = 52;

/// Largest shoe the tracker accepts.
pub const MAX_DECKS: u32 = 8;

/// House edge (player advantage, in percent) of an untouched shoe under
/// S17 / DAS / late surrender.
pub const BASE_HOUSE_EDGE_PCT: f64 = -0.50;

/// Effect of Removal per rank, in percent of player advantage. Indexed by
/// `Rank::index()`. Face cards carry the ten weight each.
const EOR_PCT: [f64; 13] = [
    0.38,  // 2
    0.44,  // 3
    0.55,  // 4
    0.69,  // 5
    0.46,  // 6
    0.28,  // 7
    0.00,  // 8
    -0.18, // 9
    -0.51, // 10
    -0.51, // J
    -0.51, // Q
    -0.51, // K
    -0.61, // A
];

/// Hi-Lo tags, indexed by `Rank::index()`.
const HI_LO: [i32; 13] = [1, 1, 1, 1, 1, 0, 0, 0, -1, -1, -1, -1, -1];

/// Read-only accessor over the rank constants.
pub struct RankTable;

impl RankTable {
    pub fn cards_per_deck(_rank: Rank) -> u32 {
        CARDS_PER_RANK_PER_DECK
    }

    /// Advantage shift (percent) attributed to depleting this rank.
    pub fn eor(rank: Rank) -> f64 {
        EOR_PCT[rank.index()]
    }

    pub fn hi_lo(rank: Rank) -> i32 {
        HI_LO[rank.index()]
    }

    pub fn base_house_edge() -> f64 {
        BASE_HOUSE_EDGE_PCT
    }

    /// Cards of `rank` in a full shoe of `deck_count` decks.
    pub fn initial_count(rank: Rank, deck_count: u32) -> u32 {
        Self::cards_per_deck(rank) * deck_count
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
