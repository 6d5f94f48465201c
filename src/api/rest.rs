// =============================================================================
// REST API Endpoints — Axum 0.7
// =============================================================================
//
//   POST /predict   { "ticker": "AAPL", "lookback_days"?: n, "rsi_period"?: n }
//   GET  /health
//
// `/predict` always answers 200. Failures travel in-band as
// `{ "error": "..." }`, including request bodies that do not parse, so
// existing clients only ever inspect the JSON.
//
// CORS is permissive: the browser front end calls this endpoint from a
// different origin.
// =============================================================================

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Json, State},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

use crate::chart::ChartRenderer;
use crate::market_data::PriceProvider;
use crate::prediction::{PredictionOutcome, PredictionRequest, PredictionService};

// =============================================================================
// Router construction
// =============================================================================

/// Build the API router around a shared, immutable prediction service.
pub fn router<P, R>(service: Arc<PredictionService<P, R>>) -> Router
where
    P: PriceProvider + 'static,
    R: ChartRenderer + 'static,
{
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/predict", post(predict::<P, R>))
        .layer(cors)
        .with_state(service)
}

// =============================================================================
// Health
// =============================================================================

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    server_time: i64,
}

async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        server_time: chrono::Utc::now().timestamp_millis(),
    })
}

// =============================================================================
// Predict
// =============================================================================

async fn predict<P, R>(
    State(service): State<Arc<PredictionService<P, R>>>,
    body: Result<Json<PredictionRequest>, JsonRejection>,
) -> Json<PredictionOutcome>
where
    P: PriceProvider + 'static,
    R: ChartRenderer + 'static,
{
    let request = match body {
        Ok(Json(request)) => request,
        Err(rejection) => {
            warn!(error = %rejection.body_text(), "rejected predict request body");
            return Json(PredictionOutcome::failure(format!(
                "Invalid request: {}",
                rejection.body_text()
            )));
        }
    };

    info!(ticker = %request.ticker, "predict request");
    Json(service.predict(&request).await)
}
