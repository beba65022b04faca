//! Mock card feed for integration testing.
//!
//! Provides a deterministic `CardFeed` that replays a scripted event list,
//! plus helpers to build dealing orders without any randomness.

use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::VecDeque;

use shoecount::engine::{spawn_session, CardFeed, FeedEvent, ShoeHandle};
use shoecount::shoe::CompositionTracker;
use shoecount::strategy::advisor::StrategyAdvisor;
use shoecount::strategy::bust::{BustConfig, BustProbabilityEstimator};
use shoecount::strategy::edge::{AdvantageCalculator, AdvantageConfig};
use shoecount::strategy::kelly::{KellyBetSizer, KellyConfig};
use shoecount::strategy::ShoeAnalyzer;
use shoecount::types::{Rank, ShoeError};

/// Replays scripted events, then reports end of stream.
pub struct MockFeed {
    name: String,
    events: VecDeque<Result<FeedEvent, ShoeError>>,
}

impl MockFeed {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            events: VecDeque::new(),
        }
    }

    pub fn cards(name: &str, cards: &[Rank]) -> Self {
        let mut feed = Self::new(name);
        for rank in cards {
            feed.push(FeedEvent::Card(*rank));
        }
        feed
    }

    pub fn push(&mut self, event: FeedEvent) -> &mut Self {
        self.events.push_back(Ok(event));
        self
    }

    pub fn push_error(&mut self, error: ShoeError) -> &mut Self {
        self.events.push_back(Err(error));
        self
    }

    pub fn remaining(&self) -> usize {
        self.events.len()
    }
}

#[async_trait]
impl CardFeed for MockFeed {
    async fn next_event(&mut self) -> Option<Result<FeedEvent, ShoeError>> {
        self.events.pop_front()
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Every card of a `decks`-deck shoe in a fixed scrambled order.
///
/// Walks the sorted shoe with a stride coprime to its length, so each card
/// appears exactly once.
pub fn scrambled_shoe(decks: u32, stride: usize) -> Vec<Rank> {
    let sorted: Vec<Rank> = Rank::ALL
        .iter()
        .flat_map(|r| std::iter::repeat(*r).take(4 * decks as usize))
        .collect();
    let n = sorted.len();
    assert_eq!(gcd(stride, n), 1, "stride {stride} must be coprime to {n}");
    (0..n).map(|i| sorted[(i * stride) % n]).collect()
}

fn gcd(a: usize, b: usize) -> usize {
    if b == 0 {
        a
    } else {
        gcd(b, a % b)
    }
}

pub fn make_analyzer(bankroll: Decimal) -> ShoeAnalyzer {
    ShoeAnalyzer::new(
        AdvantageCalculator::new(AdvantageConfig::default()),
        BustProbabilityEstimator::new(BustConfig::default()),
        KellyBetSizer::new(KellyConfig::default()),
        StrategyAdvisor::default(),
        bankroll,
    )
}

pub fn start_session(decks: u32, bankroll: Decimal) -> ShoeHandle {
    let tracker = CompositionTracker::new(decks).expect("valid deck count");
    spawn_session(tracker, make_analyzer(bankroll)).0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scrambled_shoe_is_a_permutation() {
        let cards = scrambled_shoe(8, 97);
        assert_eq!(cards.len(), 416);
        for rank in Rank::ALL {
            assert_eq!(cards.iter().filter(|c| **c == rank).count(), 32);
        }
        assert_ne!(cards[0], cards[1]);
    }

    #[tokio::test]
    async fn test_mock_feed_replays_in_order() {
        let mut feed = MockFeed::cards("mock", &[Rank::Two, Rank::Ace]);
        assert_eq!(feed.remaining(), 2);
        assert_eq!(feed.next_event().await.unwrap().unwrap(), FeedEvent::Card(Rank::Two));
        assert_eq!(feed.next_event().await.unwrap().unwrap(), FeedEvent::Card(Rank::Ace));
        assert!(feed.next_event().await.is_none());
    }
}
