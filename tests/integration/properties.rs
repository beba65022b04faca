//! Invariants of the shoe model and calculators, checked end to end.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use shoecount::shoe::{CompositionTracker, RankTable};
use shoecount::strategy::edge::{AdvantageCalculator, AdvantageConfig};
use shoecount::strategy::hand::HandSpec;
use shoecount::strategy::kelly::{KellyBetSizer, KellyConfig};
use shoecount::types::{Action, Rank, ShoeError};

use crate::mock_feed::{scrambled_shoe, start_session};

fn calculator() -> AdvantageCalculator {
    AdvantageCalculator::new(AdvantageConfig::default())
}

#[test]
fn conservation_holds_through_a_whole_shoe() {
    for decks in [1, 2, 6, 8] {
        let mut t = CompositionTracker::new(decks).unwrap();
        for rank in scrambled_shoe(decks, 97) {
            t.apply(rank).unwrap();
            let snap = t.snapshot();
            assert_eq!(snap.cards_remaining() + snap.cards_dealt, decks * 52);
        }
        assert_eq!(t.snapshot().cards_remaining(), 0);
        assert_eq!(t.snapshot().penetration(), 1.0);
    }
}

#[test]
fn exhausted_rank_leaves_state_unchanged() {
    let mut t = CompositionTracker::new(2).unwrap();
    for _ in 0..8 {
        t.apply(Rank::Queen).unwrap();
    }
    t.apply(Rank::Three).unwrap();

    let before = t.snapshot();
    let err = t.apply(Rank::Queen).unwrap_err();
    assert_eq!(err, ShoeError::ExhaustedRank { rank: Rank::Queen });
    assert_eq!(t.snapshot(), before);
    assert_eq!(t.remaining(Rank::Queen), 0);
}

#[test]
fn full_shoe_advantage_is_the_base_edge() {
    let mut t = CompositionTracker::new(8).unwrap();
    for rank in scrambled_shoe(8, 97).into_iter().take(50) {
        t.apply(rank).unwrap();
    }
    t.new_shoe(8).unwrap();
    let adv = calculator().compute_advantage(&t.snapshot());
    assert_eq!(adv, RankTable::base_house_edge());
}

#[test]
fn removing_a_five_beats_removing_a_ten() {
    let mut base = CompositionTracker::new(6).unwrap();
    for rank in [Rank::Two, Rank::King, Rank::Eight] {
        base.apply(rank).unwrap();
    }

    let mut five = base.clone();
    five.apply(Rank::Five).unwrap();
    let mut ten = base.clone();
    ten.apply(Rank::Ten).unwrap();

    let calc = calculator();
    let start = calc.compute_advantage(&base.snapshot());
    let after_five = calc.compute_advantage(&five.snapshot());
    let after_ten = calc.compute_advantage(&ten.snapshot());
    assert!(after_five > start);
    assert!(after_ten < start);
    assert!(after_five > after_ten);
}

#[test]
fn bet_is_minimum_without_edge_and_monotone_up_to_the_cap() {
    let sizer = KellyBetSizer::new(KellyConfig::default());
    let bankroll = dec!(500);
    let cap = bankroll * dec!(0.10);

    for adv in [-3.0, -0.5, -0.01, 0.0] {
        assert_eq!(sizer.compute_bet(adv, bankroll).unwrap().units, dec!(1));
    }

    let mut last = Decimal::ZERO;
    let mut reached_cap = false;
    for step in 1..=1200 {
        let adv = step as f64 * 0.05;
        let units = sizer.compute_bet(adv, bankroll).unwrap().units;
        assert!(units >= last, "bet fell at advantage {adv}");
        assert!(units <= cap, "bet {units} above cap at advantage {adv}");
        reached_cap |= units == cap;
        last = units;
    }
    assert!(reached_cap);
}

#[test]
fn deviation_takes_precedence_over_basic_strategy() {
    let hand = HandSpec::parse("10,6", "10").unwrap();
    let advisor = shoecount::strategy::advisor::StrategyAdvisor::default();

    let high = advisor.decide(&hand, 0.6);
    assert_eq!(high.action, Action::Stand);
    assert!(high.is_deviation);

    let low = advisor.decide(&hand, 0.2);
    assert!(matches!(low.action, Action::Hit | Action::Surrender));
    assert!(!low.is_deviation);
}

#[test]
fn reset_always_yields_a_full_eight_deck_shoe() {
    let mut t = CompositionTracker::new(3).unwrap();
    for round in 0..3 {
        for rank in scrambled_shoe(3, 5).into_iter().take(40 * round) {
            t.apply(rank).unwrap();
        }
        t.new_shoe(8).unwrap();
        let snap = t.snapshot();
        for rank in Rank::ALL {
            assert_eq!(snap.remaining(rank), 32);
        }
        assert_eq!(snap.cards_dealt, 0);
        assert_eq!(snap.penetration(), 0.0);
    }
}

#[test]
fn half_shoe_is_exactly_half_penetration() {
    for stride in [97, 3, 101] {
        let mut t = CompositionTracker::new(8).unwrap();
        for rank in scrambled_shoe(8, stride).into_iter().take(208) {
            t.apply(rank).unwrap();
        }
        assert_eq!(t.snapshot().penetration(), 0.5);
    }
}

#[tokio::test]
async fn session_preserves_invariants_under_concurrent_writers() {
    let handle = start_session(8, dec!(1000));
    let cards = scrambled_shoe(8, 97);

    let mut tasks = Vec::new();
    for chunk in cards.chunks(104) {
        let h = handle.clone();
        let chunk = chunk.to_vec();
        tasks.push(tokio::spawn(async move {
            for rank in chunk {
                h.observe(rank).await.unwrap();
                let snap = h.current().snapshot.clone();
                assert_eq!(snap.cards_remaining() + snap.cards_dealt, 416);
            }
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    let report = handle.current();
    assert_eq!(report.snapshot.cards_dealt, 416);
    let err = handle.observe(Rank::Ace).await.unwrap_err();
    assert_eq!(err, ShoeError::ExhaustedRank { rank: Rank::Ace });
    assert_eq!(handle.current().snapshot, report.snapshot);
}
