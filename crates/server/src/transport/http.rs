// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP handlers for the pelorus REST API, one module per resource.

pub mod ships;
pub mod telemetry;
pub mod users;

use std::sync::atomic::Ordering;
use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::transport::state::AppState;

/// Response for `GET /api/v1/health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_secs: i64,
    pub ws_clients: i32,
}

/// `GET /api/v1/health`
pub async fn health(State(s): State<Arc<AppState>>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "running".to_owned(),
        uptime_secs: s.config.started_at.elapsed().as_secs() as i64,
        ws_clients: s.lifecycle.ws_client_count.load(Ordering::Relaxed),
    })
}

#[cfg(test)]
#[path = "http_tests.rs"]
mod tests;
