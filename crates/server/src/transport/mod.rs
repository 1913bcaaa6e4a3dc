// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! API contract types and server implementation for the HTTP and WebSocket
//! transports.

pub mod auth;
pub mod http;
pub mod state;
pub mod ws;

pub use state::AppState;

use std::sync::Arc;

use axum::http::StatusCode;
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::error::ErrorCode;

/// Top-level error response envelope shared across HTTP and WebSocket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

/// Error body containing a machine-readable code and human-readable message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

impl ErrorCode {
    /// Convert this error code into a transport [`ErrorBody`].
    pub fn to_error_body(&self, message: impl Into<String>) -> ErrorBody {
        ErrorBody { code: self.as_str().to_owned(), message: message.into() }
    }

    /// Convert this error code into an axum JSON error response.
    pub fn to_http_response(
        &self,
        message: impl Into<String>,
    ) -> (StatusCode, Json<ErrorResponse>) {
        let status =
            StatusCode::from_u16(self.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = ErrorResponse { error: self.to_error_body(message) };
        (status, Json(body))
    }
}

/// Build the axum `Router` with all HTTP and WebSocket routes.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/v1/health", get(http::health))
        .route("/api/v1/users/register", post(http::users::register))
        .route("/api/v1/users/login", post(http::users::login))
        .route("/api/v1/users/me", get(http::users::me))
        .route("/api/v1/users/username", put(http::users::update_username))
        .route("/api/v1/users/password", put(http::users::update_password))
        .route("/api/v1/users/by-name/{username}", get(http::users::get_by_username))
        .route("/api/v1/users/{id}", get(http::users::get_by_id))
        .route("/api/v1/users", delete(http::users::delete))
        .route("/api/v1/ships", post(http::ships::create).get(http::ships::list_my))
        .route("/api/v1/ships/by-imai/{imai}", get(http::ships::get_by_imai))
        .route(
            "/api/v1/ships/{id}",
            get(http::ships::get).put(http::ships::update).delete(http::ships::delete),
        )
        .route("/api/v1/ships/{id}/course", put(http::ships::set_course))
        .route("/api/v1/ships/{id}/telemetry", get(http::ships::list_telemetry))
        .route("/api/v1/telemetry", post(http::telemetry::ingest).get(http::telemetry::list_my))
        .route("/api/v1/telemetry/{id}", get(http::telemetry::get))
        .route("/ws/course", get(ws::course_handler))
        .route("/ws/telemetry", get(ws::telemetry_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
