//! Capture feed → session → dashboard, wired the way the binary wires them.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use rust_decimal_macros::dec;
use std::sync::Arc;
use tower::ServiceExt;

use shoecount::dashboard::build_router;
use shoecount::dashboard::routes::DashboardState;
use shoecount::engine::{pump, FeedEvent};
use shoecount::strategy::hand::HandSpec;
use shoecount::types::{CountSignal, Rank, ShoeError};

use crate::mock_feed::{start_session, MockFeed};

#[tokio::test]
async fn pump_applies_feed_and_reports_errors() {
    let handle = start_session(1, dec!(1000));
    let mut feed = MockFeed::cards("mock", &[Rank::Two, Rank::Three, Rank::Four]);
    feed.push_error(ShoeError::Parse("garbled".into()))
        .push(FeedEvent::Frame(vec![Rank::Five, Rank::Six]))
        .push(FeedEvent::Frame(vec![Rank::Five, Rank::Six, Rank::Six]))
        .push(FeedEvent::Query(HandSpec::parse("10,6", "10").unwrap()));

    let mut out = Vec::new();
    let stats = pump(&mut feed, &handle, &mut out).await.unwrap();

    assert_eq!(stats.cards_applied, 6);
    assert_eq!(stats.parse_errors, 1);
    assert_eq!(stats.queries_answered, 1);
    assert_eq!(feed.remaining(), 0);

    let report = handle.current();
    assert_eq!(report.snapshot.cards_dealt, 6);
    assert_eq!(report.snapshot.remaining(Rank::Six), 2);
    assert_eq!(report.count.running_count, 6);
    assert!(report.advantage > -0.50);

    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("garbled"));
    assert!(text.contains("10,6 vs 10: "));
}

#[tokio::test]
async fn small_cards_turn_the_count_favorable() {
    let handle = start_session(1, dec!(1000));
    let mut cards = Vec::new();
    for rank in [Rank::Two, Rank::Three, Rank::Four, Rank::Five, Rank::Six] {
        cards.extend(std::iter::repeat(rank).take(4));
    }
    let mut feed = MockFeed::cards("mock", &cards);
    pump(&mut feed, &handle, &mut Vec::new()).await.unwrap();

    let report = handle.current();
    assert_eq!(report.count.running_count, 20);
    assert_eq!(report.count.signal, CountSignal::Favorable);
    assert!(report.advantage > 1.0);
    assert!(report.bet.unwrap().units > dec!(1));
}

#[tokio::test]
async fn new_shoe_event_resets_mid_stream() {
    let handle = start_session(2, dec!(1000));
    let mut feed = MockFeed::cards("mock", &[Rank::Ace; 8]);
    feed.push(FeedEvent::Card(Rank::Ace))
        .push(FeedEvent::NewShoe(6))
        .push(FeedEvent::Card(Rank::Ace))
        .push(FeedEvent::NewShoe(0));

    let mut out = Vec::new();
    let stats = pump(&mut feed, &handle, &mut out).await.unwrap();
    assert_eq!(stats.cards_rejected, 1);
    assert_eq!(stats.shoes_started, 1);

    let snap = handle.current().snapshot.clone();
    assert_eq!(snap.deck_count, 6);
    assert_eq!(snap.remaining(Rank::Ace), 23);
    assert!(String::from_utf8(out).unwrap().contains("Invalid configuration"));
}

#[tokio::test]
async fn dashboard_sees_cards_from_the_feed() {
    let handle = start_session(6, dec!(1000));
    let state = Arc::new(DashboardState::new(handle.clone()));

    let mut feed = MockFeed::cards("mock", &[Rank::King, Rank::Queen, Rank::Ace]);
    pump(&mut feed, &handle, &mut Vec::new()).await.unwrap();

    let resp = build_router(state)
        .oneshot(Request::builder().uri("/api/count").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = axum::body::to_bytes(resp.into_body(), 10_000).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["running_count"], -3);
    assert_eq!(json["signal"], "NEUTRAL");
}
