//! Shoe composition: static rank data and the mutable remaining-card model.

pub mod ranks;
pub mod tracker;

pub use ranks::RankTable;
pub use tracker::{CompositionTracker, ShoeSnapshot};
