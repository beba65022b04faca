//! SHOECOUNT: live blackjack shoe composition tracker and advisor.
//!
//! Library crate exposing all modules for use by integration tests
//! and the binary entry point.

pub mod config;
pub mod types;
pub mod shoe;
pub mod strategy;
pub mod engine;
pub mod dashboard;
