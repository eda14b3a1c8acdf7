//! API error responses.

use airhop_core::RouteError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::spatial_store::StoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    AirportNotFound,
    RouteNotFound,
    ValidationError,
    RouteTimeout,
    InternalServerError,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::AirportNotFound => "AIRPORT_NOT_FOUND",
            ErrorCode::RouteNotFound => "ROUTE_NOT_FOUND",
            ErrorCode::ValidationError => "VALIDATION_ERROR",
            ErrorCode::RouteTimeout => "ROUTE_TIMEOUT",
            ErrorCode::InternalServerError => "INTERNAL_SERVER_ERROR",
        }
    }
}

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: ErrorCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, ErrorCode::ValidationError, message)
    }

    pub fn airport_not_found(id: impl std::fmt::Display) -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            ErrorCode::AirportNotFound,
            format!("Airport with id {} not found", id),
        )
    }

    pub fn internal() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorCode::InternalServerError,
            "Internal server error",
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(json!({
                "message": self.message,
                "code": self.code.as_str(),
            })),
        )
            .into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        tracing::error!("Spatial store failure: {}", err);
        ApiError::internal()
    }
}

impl From<RouteError> for ApiError {
    fn from(err: RouteError) -> Self {
        match err {
            RouteError::UnknownNode(id) => ApiError::airport_not_found(id),
            RouteError::NoPath { from, to } => ApiError::new(
                StatusCode::NOT_FOUND,
                ErrorCode::RouteNotFound,
                format!("No route found between airports {} and {}", from, to),
            ),
            RouteError::Timeout(ms) => ApiError::new(
                StatusCode::GATEWAY_TIMEOUT,
                ErrorCode::RouteTimeout,
                format!("Route search exceeded {} ms", ms),
            ),
            RouteError::Inconsistency { .. } | RouteError::Store(_) => {
                tracing::error!("Route assembly failed: {}", err);
                ApiError::internal()
            }
        }
    }
}
