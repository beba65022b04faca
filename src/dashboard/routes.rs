//! Dashboard API route handlers.
//!
//! All endpoints return JSON. Reads come from the session's latest report;
//! writes go through the same `ShoeHandle` the capture pump uses.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::warn;

use crate::engine::session::ShoeHandle;
use crate::strategy::hand::HandSpec;
use crate::types::{
    AdvantageView, BetView, BustProbabilityView, CompositionView, CountSignal, CountView,
    DecisionView, Rank, ShoeError,
};

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

/// Shared state accessible by all route handlers.
pub struct DashboardState {
    pub shoe: ShoeHandle,
    pub started_at: DateTime<Utc>,
}

impl DashboardState {
    pub fn new(shoe: ShoeHandle) -> Self {
        Self {
            shoe,
            started_at: Utc::now(),
        }
    }
}

pub type AppState = Arc<DashboardState>;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// `ShoeError` rendered as an HTTP response.
#[derive(Debug)]
pub struct ApiError {
    pub error: ShoeError,
    /// Cards of a batch that stayed applied before `error` stopped it.
    pub applied: Option<usize>,
}

impl From<ShoeError> for ApiError {
    fn from(error: ShoeError) -> Self {
        Self {
            error,
            applied: None,
        }
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self.error {
            ShoeError::ExhaustedRank { .. } => StatusCode::CONFLICT,
            ShoeError::Parse(_)
            | ShoeError::InvalidHand(_)
            | ShoeError::InvalidBankroll { .. }
            | ShoeError::InvalidConfiguration(_) => StatusCode::BAD_REQUEST,
            ShoeError::SessionClosed => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        warn!(
            status = status.as_u16(),
            error = %self.error,
            applied = ?self.applied,
            "Request rejected"
        );
        let body = match self.applied {
            Some(applied) => json!({ "error": self.error.to_string(), "applied": applied }),
            None => json!({ "error": self.error.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct StatusResponse {
    pub shoe_id: String,
    pub deck_count: u32,
    pub cards_dealt: u32,
    pub cards_remaining: u32,
    pub penetration: f64,
    pub advantage_pct: f64,
    pub bust_pct: f64,
    pub bet_units: Option<Decimal>,
    pub bankroll_units: Decimal,
    pub running_count: i32,
    pub true_count: f64,
    pub signal: CountSignal,
    pub recommendation: String,
    pub computed_at: String,
    pub uptime_secs: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CardsRequest {
    /// Rank symbols in dealing order.
    pub cards: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CardsResponse {
    pub applied: usize,
    pub composition: CompositionView,
    pub advantage: AdvantageView,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewShoeRequest {
    pub decks: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StrategyRequest {
    /// Player cards, e.g. `"10,6"`.
    pub hand: String,
    /// Dealer upcard, e.g. `"10"`.
    pub upcard: String,
}

// ---------------------------------------------------------------------------
// Route handlers
// ---------------------------------------------------------------------------

/// GET /api/status
pub async fn get_status(State(state): State<AppState>) -> Json<StatusResponse> {
    let report = state.shoe.current();
    let snap = &report.snapshot;

    Json(StatusResponse {
        shoe_id: snap.shoe_id.to_string(),
        deck_count: snap.deck_count,
        cards_dealt: snap.cards_dealt,
        cards_remaining: snap.cards_remaining(),
        penetration: snap.penetration(),
        advantage_pct: report.advantage,
        bust_pct: report.bust_probability * 100.0,
        bet_units: report.bet.map(|b| b.units),
        bankroll_units: state.shoe.analyzer().bankroll_units(),
        running_count: report.count.running_count,
        true_count: report.count.true_count,
        signal: report.count.signal,
        recommendation: report.count.recommendation.clone(),
        computed_at: report.computed_at.to_rfc3339(),
        uptime_secs: (Utc::now() - state.started_at).num_seconds(),
    })
}

/// GET /api/composition
pub async fn get_composition(State(state): State<AppState>) -> Json<CompositionView> {
    Json(state.shoe.current().composition_view())
}

/// GET /api/advantage
pub async fn get_advantage(State(state): State<AppState>) -> Json<AdvantageView> {
    Json(state.shoe.current().advantage_view())
}

/// GET /api/bust
pub async fn get_bust(State(state): State<AppState>) -> Json<BustProbabilityView> {
    Json(state.shoe.current().bust_view())
}

/// GET /api/bet
pub async fn get_bet(State(state): State<AppState>) -> Result<Json<BetView>, ApiError> {
    state
        .shoe
        .current()
        .bet_view()
        .map(Json)
        .ok_or_else(|| {
            ApiError::from(ShoeError::InvalidBankroll {
                bankroll: state.shoe.analyzer().bankroll_units(),
            })
        })
}

/// GET /api/count
pub async fn get_count(State(state): State<AppState>) -> Json<CountView> {
    Json(state.shoe.current().count.clone())
}

/// POST /api/cards
///
/// Every token is parsed before any card is applied. Cards are then applied
/// in order; the first rejected card stops the batch, earlier ones stay and
/// are counted in the error body's `applied`.
pub async fn post_cards(
    State(state): State<AppState>,
    Json(req): Json<CardsRequest>,
) -> Result<Json<CardsResponse>, ApiError> {
    let ranks = req
        .cards
        .iter()
        .map(|c| c.parse::<Rank>())
        .collect::<Result<Vec<_>, _>>()?;

    let mut report = state.shoe.current();
    for (applied, rank) in ranks.iter().enumerate() {
        report = state.shoe.observe(*rank).await.map_err(|error| ApiError {
            error,
            applied: Some(applied),
        })?;
    }

    Ok(Json(CardsResponse {
        applied: ranks.len(),
        composition: report.composition_view(),
        advantage: report.advantage_view(),
    }))
}

/// POST /api/shoe
pub async fn post_shoe(
    State(state): State<AppState>,
    Json(req): Json<NewShoeRequest>,
) -> Result<Json<CompositionView>, ApiError> {
    let report = state.shoe.new_shoe(req.decks).await?;
    Ok(Json(report.composition_view()))
}

/// POST /api/strategy
pub async fn post_strategy(
    State(state): State<AppState>,
    Json(req): Json<StrategyRequest>,
) -> Result<Json<DecisionView>, ApiError> {
    let hand = HandSpec::parse(&req.hand, &req.upcard)?;
    Ok(Json(DecisionView::from(state.shoe.advise(&hand))))
}

/// GET /health
pub async fn health() -> StatusCode {
    StatusCode::OK
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
