use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use flightdata_core::{FlightDraft, FlightPatch, PageRequest, TimeRange, UnifiedFlightView};
use flightdata_search::{FlightSearchQuery, FlightSearchResult};
use serde::Deserialize;
use tracing::info;

use crate::error::AppError;
use crate::state::AppState;

pub type FlightResponse = UnifiedFlightView;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/v1/flights", get(search_flights).post(create_flight))
        .route(
            "/api/v1/flights/{id}",
            get(get_flight).put(update_flight).delete(delete_flight),
        )
}

// ============================================================================
// Request Types
// ============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    pub origin: Option<String>,
    pub destination: Option<String>,
    pub airline: Option<String>,
    pub departure_from: Option<DateTime<Utc>>,
    pub departure_to: Option<DateTime<Utc>>,
    pub arrival_from: Option<DateTime<Utc>>,
    pub arrival_to: Option<DateTime<Utc>>,
    pub page: Option<u32>,
    pub size: Option<u32>,
}

fn bad_request(rejection: impl std::fmt::Display) -> AppError {
    AppError::ValidationError(rejection.to_string())
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/v1/flights
pub async fn create_flight(
    State(state): State<AppState>,
    payload: Result<Json<FlightDraft>, JsonRejection>,
) -> Result<(StatusCode, Json<FlightResponse>), AppError> {
    let Json(draft) = payload.map_err(bad_request)?;
    let flight = state.flights.create_flight(draft).await?;
    Ok((StatusCode::CREATED, Json(FlightResponse::from(&flight))))
}

/// GET /api/v1/flights/{id}
pub async fn get_flight(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<FlightResponse>, AppError> {
    let Path(id) = id.map_err(bad_request)?;
    let flight = state.flights.get_flight(id).await?;
    Ok(Json(FlightResponse::from(&flight)))
}

/// PUT /api/v1/flights/{id}
/// Absent fields keep their stored values.
pub async fn update_flight(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<FlightPatch>, JsonRejection>,
) -> Result<Json<FlightResponse>, AppError> {
    let Path(id) = id.map_err(bad_request)?;
    let Json(patch) = payload.map_err(bad_request)?;
    let flight = state.flights.update_flight(id, patch).await?;
    Ok(Json(FlightResponse::from(&flight)))
}

/// DELETE /api/v1/flights/{id}
pub async fn delete_flight(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, AppError> {
    let Path(id) = id.map_err(bad_request)?;
    state.flights.delete_flight(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/flights
pub async fn search_flights(
    State(state): State<AppState>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> Result<Json<FlightSearchResult>, AppError> {
    let Query(params) = params.map_err(bad_request)?;
    info!(
        origin = ?params.origin,
        destination = ?params.destination,
        airline = ?params.airline,
        "Flight search requested"
    );

    let query = FlightSearchQuery {
        origin: params.origin,
        destination: params.destination,
        airline: params.airline,
        time_range: TimeRange {
            departure_from: params.departure_from,
            departure_to: params.departure_to,
            arrival_from: params.arrival_from,
            arrival_to: params.arrival_to,
        },
        page: PageRequest::new(params.page.unwrap_or(0), state.page_size(params.size)),
    };

    let result = state.search.search_flights(query).await?;
    Ok(Json(result))
}
