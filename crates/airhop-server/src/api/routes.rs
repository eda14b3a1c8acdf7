//! REST API routes.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::api::error::{ApiError, ErrorCode};
use crate::api::request_id;
use crate::state::AppState;
use airhop_core::{Airport, AirportId, AirportWithDistance, CountryComparison, RouteResponse};

/// Create the API router.
pub fn create_router() -> Router<Arc<AppState>> {
    let airport_routes = Router::new()
        .route("/airports/radius", get(get_airports_by_radius))
        .route("/airports/distance", get(get_distance))
        .route("/airports/countries", get(get_country_comparison))
        .route("/airports/route", get(get_route))
        .route("/airports/:id", get(get_airport));

    let ops_routes = Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics));

    airport_routes
        .merge(ops_routes)
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(request_id::ensure_request_id))
}

// === Query types ===

#[derive(Debug, Deserialize)]
pub struct RadiusQuery {
    pub lat: Option<String>,
    pub lon: Option<String>,
    pub radius: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DistanceQuery {
    pub id1: Option<String>,
    pub id2: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CountryComparisonQuery {
    pub country1: Option<String>,
    pub country2: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteQuery {
    pub from_id: Option<String>,
    pub to_id: Option<String>,
}

// === Validation ===

fn required<'a>(name: &str, raw: &'a Option<String>) -> Result<&'a str, ApiError> {
    raw.as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| ApiError::validation(format!("{} is required", name)))
}

fn parse_id(name: &str, raw: &Option<String>) -> Result<AirportId, ApiError> {
    required(name, raw)?
        .parse::<AirportId>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| ApiError::validation(format!("{} must be a positive integer", name)))
}

fn parse_bounded(name: &str, raw: &Option<String>, min: f64, max: f64) -> Result<f64, ApiError> {
    required(name, raw)?
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite() && *value >= min && *value <= max)
        .ok_or_else(|| {
            ApiError::validation(format!("{} must be a number between {} and {}", name, min, max))
        })
}

// === Airport handlers ===

async fn get_airport(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Airport>, ApiError> {
    let id = parse_id("id", &Some(id))?;
    state
        .airports()
        .find_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::airport_not_found(id))
}

async fn get_airports_by_radius(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RadiusQuery>,
) -> Result<Json<Vec<AirportWithDistance>>, ApiError> {
    let lat = parse_bounded("lat", &query.lat, -90.0, 90.0)?;
    let lon = parse_bounded("lon", &query.lon, -180.0, 180.0)?;
    let radius = required("radius", &query.radius)?
        .parse::<f64>()
        .ok()
        .filter(|r| r.is_finite() && *r >= 0.0)
        .ok_or_else(|| ApiError::validation("radius must be a non-negative number"))?;

    let airports = state.airports().find_by_radius(lat, lon, radius).await?;
    Ok(Json(airports))
}

async fn get_distance(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DistanceQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let id1 = parse_id("id1", &query.id1)?;
    let id2 = parse_id("id2", &query.id2)?;

    let (first, second) = tokio::try_join!(
        state.airports().find_by_id(id1),
        state.airports().find_by_id(id2)
    )?;
    if first.is_none() {
        return Err(ApiError::airport_not_found(id1));
    }
    if second.is_none() {
        return Err(ApiError::airport_not_found(id2));
    }

    let distance = state
        .airports()
        .find_distance(id1, id2)
        .await?
        .ok_or_else(|| {
            tracing::error!("Distance between known airports {} and {} unresolved", id1, id2);
            ApiError::internal()
        })?;
    Ok(Json(json!({ "distance": distance })))
}

async fn get_country_comparison(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CountryComparisonQuery>,
) -> Result<Json<CountryComparison>, ApiError> {
    let country1 = required("country1", &query.country1)?;
    let country2 = required("country2", &query.country2)?;

    state
        .airports()
        .find_country_comparison(country1, country2)
        .await?
        .map(Json)
        .ok_or_else(|| {
            ApiError::new(
                StatusCode::NOT_FOUND,
                ErrorCode::AirportNotFound,
                format!(
                    "No airports found for comparison between {} and {}",
                    country1, country2
                ),
            )
        })
}

async fn get_route(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RouteQuery>,
) -> Result<Json<RouteResponse>, ApiError> {
    let from = parse_id("fromId", &query.from_id)?;
    let to = parse_id("toId", &query.to_id)?;

    let route = state.routes().find_route(from, to).await?;
    tracing::info!(
        "Route {} -> {}: {} legs, {:.1} km",
        from,
        to,
        route.legs.len(),
        route.total_distance
    );
    Ok(Json(route))
}

// === Operational handlers ===

async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.store().ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "healthy",
                "timestamp": Utc::now().to_rfc3339(),
                "database": "connected",
                "cache": "in-memory",
            })),
        ),
        Err(err) => {
            tracing::warn!("Health check failed: {}", err);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "unhealthy",
                    "error": "Database connection failed",
                })),
            )
        }
    }
}

async fn metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let uptime = (Utc::now() - state.started_at()).num_seconds().max(0);
    Json(json!({
        "cache": state.metrics().snapshot(),
        "cacheEntries": state.cache().len(),
        "uptimeSeconds": uptime,
    }))
}
