// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Telemetry HTTP handlers: the ingest write path that feeds the telemetry
//! fan-out registry, plus owner-scoped reads.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::Json;
use tracing::debug;

use crate::error::ErrorCode;
use crate::model::{AddTelemetry, Telemetry};
use crate::transport::auth::authenticate;
use crate::transport::state::AppState;

/// `POST /api/v1/telemetry`
///
/// Persists the reading first, then broadcasts it to the ship's live
/// subscribers. Producers never block on (or fail because of) subscribers.
pub async fn ingest(
    State(s): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<AddTelemetry>,
) -> impl IntoResponse {
    let user = match authenticate(&s, &headers).await {
        Ok(user) => user,
        Err(code) => return code.to_http_response("the token is invalid").into_response(),
    };

    if let Err(code) = s.store.ships.find_owned(body.ship_id, user.id).await {
        return code.to_http_response("ship not found").into_response();
    }

    let record = s.store.telemetry.create(&body).await;
    let reading = Telemetry::from(&record);
    debug!(ship = reading.ship_id, reading = reading.id, "telemetry ingested");
    s.registry.telemetry.publish(reading.ship_id, &reading).await;
    Json(reading).into_response()
}

/// `GET /api/v1/telemetry` — every reading across the account's fleet.
pub async fn list_my(State(s): State<Arc<AppState>>, headers: HeaderMap) -> impl IntoResponse {
    let user = match authenticate(&s, &headers).await {
        Ok(user) => user,
        Err(code) => return code.to_http_response("the token is invalid").into_response(),
    };

    let mut rows: Vec<Telemetry> = Vec::new();
    for ship in s.store.ships.list_by_owner(user.id).await {
        rows.extend(s.store.telemetry.list_by_ship(ship.id).await.iter().map(Telemetry::from));
    }
    rows.sort_by_key(|r| r.id);
    Json(rows).into_response()
}

/// `GET /api/v1/telemetry/{id}`
pub async fn get(
    State(s): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    let user = match authenticate(&s, &headers).await {
        Ok(user) => user,
        Err(code) => return code.to_http_response("the token is invalid").into_response(),
    };

    let record = match s.store.telemetry.find(id).await {
        Some(record) => record,
        None => {
            return ErrorCode::NotFound.to_http_response("telemetry not found").into_response()
        }
    };

    // Readings are visible to the owner of the ship they belong to.
    match s.store.ships.find_owned(record.ship_id, user.id).await {
        Ok(_) => Json(Telemetry::from(&record)).into_response(),
        Err(code) => code.to_http_response("telemetry not found").into_response(),
    }
}
