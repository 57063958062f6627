// Rewards HTTP API (axum)
//
//   GET  /api/health
//   POST /api/rewards/calculate             - summarize an inline batch
//   GET  /api/rewards                       - every customer with activity
//   GET  /api/rewards/:customer_id/rewards  - one customer, full history
//   GET  /api/rewards/:customer_id/calculate?startDate=&endDate=
//                                           - one customer, default last three months

use crate::db::SqliteStore;
use crate::error::RewardsError;
use crate::models::{RewardsSummary, Transaction};
use crate::service::{resolve_window, RewardsService};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    service: Arc<RewardsService<SqliteStore>>,
    /// Pinned "today" for deterministic windows; None = local date
    fixed_today: Option<NaiveDate>,
}

impl AppState {
    pub fn new(service: RewardsService<SqliteStore>) -> Self {
        AppState {
            service: Arc::new(service),
            fixed_today: None,
        }
    }

    pub fn with_fixed_today(mut self, today: NaiveDate) -> Self {
        self.fixed_today = Some(today);
        self
    }

    fn today(&self) -> NaiveDate {
        self.fixed_today
            .unwrap_or_else(|| Local::now().date_naive())
    }
}

/// API Response wrapper
#[derive(Serialize)]
pub struct ApiResponse<T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

impl ApiResponse<()> {
    fn err(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
        }
    }
}

/// Maps library errors onto HTTP status codes
pub struct ApiError(RewardsError);

impl From<RewardsError> for ApiError {
    fn from(err: RewardsError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            RewardsError::CustomerNotFound(_) => StatusCode::NOT_FOUND,
            err if err.is_client_error() => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            error!("Request failed: {}", self.0);
        } else {
            warn!("Request rejected: {}", self.0);
        }

        (status, Json(ApiResponse::err(self.0.to_string()))).into_response()
    }
}

type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

/// Optional window bounds, e.g. `?startDate=2024-01-01&endDate=2024-03-31`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowQuery {
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// POST /api/rewards/calculate - Summarize posted transactions per customer
async fn calculate_rewards(
    State(state): State<AppState>,
    Json(transactions): Json<Vec<Transaction>>,
) -> ApiResult<Vec<RewardsSummary>> {
    info!("POST /api/rewards/calculate - {} transactions", transactions.len());

    let summaries = state.service.summarize_transactions(&transactions)?;
    Ok(Json(ApiResponse::ok(summaries)))
}

/// GET /api/rewards - Summaries for every customer with activity
///
/// Without query bounds the whole history is used; with either bound the
/// missing one falls back to the default three-month window.
async fn list_rewards(
    State(state): State<AppState>,
    Query(query): Query<WindowQuery>,
) -> ApiResult<Vec<RewardsSummary>> {
    info!("GET /api/rewards - query: {:?}", query);

    let range = match (query.start_date, query.end_date) {
        (None, None) => None,
        (start, end) => Some(resolve_window(start, end, state.today())?),
    };

    let summaries = state.service.rewards_for_all_customers(range)?;
    Ok(Json(ApiResponse::ok(summaries)))
}

/// GET /api/rewards/:customer_id/rewards - Full history for one customer
async fn get_customer_rewards(
    State(state): State<AppState>,
    Path(customer_id): Path<i64>,
) -> ApiResult<RewardsSummary> {
    info!("GET /api/rewards/{}/rewards", customer_id);

    let summary = state.service.rewards_for_customer(customer_id)?;
    Ok(Json(ApiResponse::ok(summary)))
}

/// GET /api/rewards/:customer_id/calculate - One customer over a window
async fn calculate_customer_rewards(
    State(state): State<AppState>,
    Path(customer_id): Path<i64>,
    Query(query): Query<WindowQuery>,
) -> ApiResult<RewardsSummary> {
    info!("GET /api/rewards/{}/calculate - query: {:?}", customer_id, query);

    let summary = state.service.rewards_for_customer_in_window(
        customer_id,
        query.start_date,
        query.end_date,
        state.today(),
    )?;
    Ok(Json(ApiResponse::ok(summary)))
}

// ============================================================================
// Router
// ============================================================================

pub fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/rewards", get(list_rewards))
        .route("/rewards/calculate", post(calculate_rewards))
        .route("/rewards/:customer_id/rewards", get(get_customer_rewards))
        .route("/rewards/:customer_id/calculate", get(calculate_customer_rewards))
        .with_state(state);

    Router::new()
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
