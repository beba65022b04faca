//! Static basic-strategy tables.
//!
//! Rule set: 4-8 decks, dealer stands on soft 17, double after split,
//! late surrender. Rows are player totals (or pair ranks), columns are the
//! dealer upcard 2..9, ten, ace.

use super::hand::{HandClass, HandSpec};
use crate::types::{Action, ValueClass};

/// One table entry. Compound cells name the fallback used once the hand
/// has more than two cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Hit,
    Stand,
    /// Double, otherwise hit.
    DoubleOrHit,
    /// Double, otherwise stand.
    DoubleOrStand,
    Split,
    /// Surrender, otherwise hit.
    SurrenderOrHit,
}

impl Cell {
    pub fn resolve(self, first_action: bool) -> Action {
        match (self, first_action) {
            (Cell::Hit, _) => Action::Hit,
            (Cell::Stand, _) => Action::Stand,
            (Cell::DoubleOrHit, true) => Action::Double,
            (Cell::DoubleOrHit, false) => Action::Hit,
            (Cell::DoubleOrStand, true) => Action::Double,
            (Cell::DoubleOrStand, false) => Action::Stand,
            (Cell::Split, _) => Action::Split,
            (Cell::SurrenderOrHit, true) => Action::Surrender,
            (Cell::SurrenderOrHit, false) => Action::Hit,
        }
    }
}

const H: Cell = Cell::Hit;
const S: Cell = Cell::Stand;
const D: Cell = Cell::DoubleOrHit;
const DS: Cell = Cell::DoubleOrStand;
const P: Cell = Cell::Split;
const R: Cell = Cell::SurrenderOrHit;

pub const HARD_MIN: u8 = 5;
pub const SOFT_MIN: u8 = 12;

/// Hard totals 5..=21.
#[rustfmt::skip]
const HARD: [[Cell; 10]; 17] = [
    //  2  3  4  5  6  7  8  9  T  A
    [H, H, H, H, H, H, H, H, H, H], // 5
    [H, H, H, H, H, H, H, H, H, H], // 6
    [H, H, H, H, H, H, H, H, H, H], // 7
    [H, H, H, H, H, H, H, H, H, H], // 8
    [H, D, D, D, D, H, H, H, H, H], // 9
    [D, D, D, D, D, D, D, D, H, H], // 10
    [D, D, D, D, D, D, D, D, D, H], // 11
    [H, H, S, S, S, H, H, H, H, H], // 12
    [S, S, S, S, S, H, H, H, H, H], // 13
    [S, S, S, S, S, H, H, H, H, H], // 14
    [S, S, S, S, S, H, H, H, R, H], // 15
    [S, S, S, S, S, H, H, R, R, R], // 16
    [S, S, S, S, S, S, S, S, S, S], // 17
    [S, S, S, S, S, S, S, S, S, S], // 18
    [S, S, S, S, S, S, S, S, S, S], // 19
    [S, S, S, S, S, S, S, S, S, S], // 20
    [S, S, S, S, S, S, S, S, S, S], // 21
];

/// Soft totals 12..=21.
#[rustfmt::skip]
const SOFT: [[Cell; 10]; 10] = [
    //  2   3   4   5   6   7  8  9  T  A
    [H,  H,  H,  H,  H,  H, H, H, H, H], // 12
    [H,  H,  H,  D,  D,  H, H, H, H, H], // 13
    [H,  H,  H,  D,  D,  H, H, H, H, H], // 14
    [H,  H,  D,  D,  D,  H, H, H, H, H], // 15
    [H,  H,  D,  D,  D,  H, H, H, H, H], // 16
    [H,  D,  D,  D,  D,  H, H, H, H, H], // 17
    [S,  DS, DS, DS, DS, S, S, H, H, H], // 18
    [S,  S,  S,  S,  S,  S, S, S, S, S], // 19
    [S,  S,  S,  S,  S,  S, S, S, S, S], // 20
    [S,  S,  S,  S,  S,  S, S, S, S, S], // 21
];

/// Pairs, indexed by `ValueClass::index()` (2,2 .. A,A).
#[rustfmt::skip]
const PAIRS: [[Cell; 10]; 10] = [
    //  2  3  4  5  6  7  8  9  T  A
    [P, P, P, P, P, P, H, H, H, H], // 2,2
    [P, P, P, P, P, P, H, H, H, H], // 3,3
    [H, H, H, P, P, H, H, H, H, H], // 4,4
    [D, D, D, D, D, D, D, D, H, H], // 5,5
    [P, P, P, P, P, H, H, H, H, H], // 6,6
    [P, P, P, P, P, P, H, H, H, H], // 7,7
    [P, P, P, P, P, P, P, P, P, P], // 8,8
    [P, P, P, P, P, S, P, P, S, S], // 9,9
    [S, S, S, S, S, S, S, S, S, S], // T,T
    [P, P, P, P, P, P, P, P, P, P], // A,A
];

/// Table entry for a classified hand against an upcard.
pub fn lookup(class: HandClass, upcard: ValueClass) -> Cell {
    let col = upcard.index();
    match class {
        HandClass::Hard(total) => {
            let row = total.clamp(HARD_MIN, 21) - HARD_MIN;
            HARD[row as usize][col]
        }
        HandClass::Soft(total) => {
            let row = total.clamp(SOFT_MIN, 21) - SOFT_MIN;
            SOFT[row as usize][col]
        }
        HandClass::Pair(rank) => PAIRS[rank.index()][col],
    }
}

/// Basic-strategy action for a hand, ignoring the count.
pub fn baseline(hand: &HandSpec) -> Action {
    lookup(hand.classify(), hand.upcard_class()).resolve(hand.is_first_action())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
