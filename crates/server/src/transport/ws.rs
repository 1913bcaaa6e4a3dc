// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! WebSocket subscription sessions for the course and telemetry streams.
//!
//! Admission order is fixed: token verification happens before the upgrade
//! (an invalid credential is refused with HTTP 401), the ownership check runs
//! before any registry mutation (failure closes the socket with a
//! policy-violation frame), and only then is the subscription installed. On
//! every exit path — peer close, socket error, failed send — the session
//! deregisters before the connection is released, so a dead connection never
//! leaves a registry entry behind.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use axum::extract::ws::{close_code, CloseFrame, Message, Utf8Bytes, WebSocket};
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::auth;
use crate::error::ErrorCode;
use crate::model::ShipId;
use crate::transport::state::AppState;

/// Query parameters for both stream upgrades: `?ship_id=...&token=...`.
#[derive(Debug, Clone, Deserialize)]
pub struct StreamQuery {
    pub ship_id: ShipId,
    pub token: String,
}

type WsTx = SplitSink<WebSocket, Message>;
type WsRx = SplitStream<WebSocket>;

/// `GET /ws/course` — course stream upgrade handler.
pub async fn course_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<StreamQuery>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    let user = match auth::verify_session(&state.store, &state.config.secret, &query.token).await {
        Ok(user) => user,
        Err(_) => return unauthorized_response(),
    };

    ws.on_upgrade(move |socket| async move {
        state.lifecycle.ws_client_count.fetch_add(1, Ordering::Relaxed);
        course_session(&state, socket, query.ship_id, user.id).await;
        state.lifecycle.ws_client_count.fetch_sub(1, Ordering::Relaxed);
    })
    .into_response()
}

/// `GET /ws/telemetry` — telemetry stream upgrade handler.
pub async fn telemetry_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<StreamQuery>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    let user = match auth::verify_session(&state.store, &state.config.secret, &query.token).await {
        Ok(user) => user,
        Err(_) => return unauthorized_response(),
    };

    ws.on_upgrade(move |socket| async move {
        state.lifecycle.ws_client_count.fetch_add(1, Ordering::Relaxed);
        telemetry_session(&state, socket, query.ship_id, user.id).await;
        state.lifecycle.ws_client_count.fetch_sub(1, Ordering::Relaxed);
    })
    .into_response()
}

/// Course subscriber session: exclusive claim, then forward until disconnect.
async fn course_session(state: &AppState, socket: WebSocket, ship: ShipId, account: i64) {
    let (mut ws_tx, mut ws_rx) = socket.split();

    // Existence and ownership precede any registry mutation.
    if let Err(code) = state.store.ships.find_owned(ship, account).await {
        debug!(ship, account, code = code.as_str(), "course stream refused");
        let _ = close_policy(&mut ws_tx, code).await;
        return;
    }

    let mut sub = match state.registry.course.subscribe(ship).await {
        Ok(sub) => sub,
        Err(code) => {
            debug!(ship, account, code = code.as_str(), "course stream refused");
            let _ = close_policy(&mut ws_tx, code).await;
            return;
        }
    };

    info!(ship, account, "course stream admitted");
    loop {
        tokio::select! {
            update = sub.recv() => {
                let Some(update) = update else { break };
                if send_json(&mut ws_tx, &update).await.is_err() {
                    break;
                }
            }
            msg = ws_rx.next() => {
                if peer_gone(msg) {
                    break;
                }
            }
        }
    }

    // Runs on every exit path, including failed sends.
    state.registry.course.unsubscribe(&sub).await;
    info!(ship, account, "course stream closed");
}

/// Telemetry subscriber session: joins the broadcast set for the ship.
async fn telemetry_session(state: &AppState, socket: WebSocket, ship: ShipId, account: i64) {
    let (mut ws_tx, mut ws_rx) = socket.split();

    if let Err(code) = state.store.ships.find_owned(ship, account).await {
        debug!(ship, account, code = code.as_str(), "telemetry stream refused");
        let _ = close_policy(&mut ws_tx, code).await;
        return;
    }

    let mut sub = state.registry.telemetry.subscribe(ship).await;

    info!(ship, account, "telemetry stream admitted");
    loop {
        tokio::select! {
            reading = sub.recv() => {
                let Some(reading) = reading else { break };
                if send_json(&mut ws_tx, &reading).await.is_err() {
                    break;
                }
            }
            msg = ws_rx.next() => {
                if peer_gone(msg) {
                    break;
                }
            }
        }
    }

    state.registry.telemetry.unsubscribe(&sub).await;
    info!(ship, account, "telemetry stream closed");
}

/// True when the inbound side of the socket has terminated. Other inbound
/// frames are ignored; the streams are outbound-only.
fn peer_gone(msg: Option<Result<Message, axum::Error>>) -> bool {
    matches!(msg, Some(Ok(Message::Close(_))) | Some(Err(_)) | None)
}

/// Refuse an admitted socket with a policy-violation close frame (1008).
async fn close_policy(tx: &mut WsTx, code: ErrorCode) -> Result<(), ()> {
    let frame = CloseFrame { code: close_code::POLICY, reason: Utf8Bytes::from_static(code.as_str()) };
    tx.send(Message::Close(Some(frame))).await.map_err(|_| ())
}

/// Send a JSON-serialized value over the WebSocket.
async fn send_json<T: Serialize>(tx: &mut WsTx, value: &T) -> Result<(), ()> {
    let text = match serde_json::to_string(value) {
        Ok(t) => t,
        Err(_) => return Err(()),
    };
    tx.send(Message::Text(text.into())).await.map_err(|_| ())
}

/// Pre-upgrade refusal for an unverifiable credential.
fn unauthorized_response() -> axum::response::Response {
    axum::http::Response::builder()
        .status(401)
        .body(axum::body::Body::from("unauthorized"))
        .unwrap_or_default()
        .into_response()
}

#[cfg(test)]
#[path = "ws_tests.rs"]
mod tests;
