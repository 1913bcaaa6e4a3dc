// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Ship HTTP handlers, including the course write path that feeds the
//! course fan-out registry.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::Json;
use tracing::info;

use crate::error::ErrorCode;
use crate::model::{AddShip, SetCourse, Ship, ShipId, Telemetry, User};
use crate::transport::auth::authenticate;
use crate::transport::state::AppState;

/// `POST /api/v1/ships`
pub async fn create(
    State(s): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<AddShip>,
) -> impl IntoResponse {
    let user = match authenticate(&s, &headers).await {
        Ok(user) => user,
        Err(code) => return code.to_http_response("the token is invalid").into_response(),
    };
    if let Err(msg) = body.validate() {
        return ErrorCode::BadRequest.to_http_response(msg).into_response();
    }

    match s.store.ships.create(user.id, body.imai, &body.name, &body.color).await {
        Ok(ship) => {
            info!(ship = ship.id, imai = ship.imai, owner = user.id, "ship registered");
            Json(Ship::from_record(&ship, User::from(&user))).into_response()
        }
        Err(code) => code.to_http_response("ship with this imai already exists").into_response(),
    }
}

/// `GET /api/v1/ships` — the authenticated account's fleet.
pub async fn list_my(State(s): State<Arc<AppState>>, headers: HeaderMap) -> impl IntoResponse {
    let user = match authenticate(&s, &headers).await {
        Ok(user) => user,
        Err(code) => return code.to_http_response("the token is invalid").into_response(),
    };

    let owner = User::from(&user);
    let ships: Vec<Ship> = s
        .store
        .ships
        .list_by_owner(user.id)
        .await
        .iter()
        .map(|record| Ship::from_record(record, owner.clone()))
        .collect();
    Json(ships).into_response()
}

/// `GET /api/v1/ships/{id}`
pub async fn get(
    State(s): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<ShipId>,
) -> impl IntoResponse {
    let user = match authenticate(&s, &headers).await {
        Ok(user) => user,
        Err(code) => return code.to_http_response("the token is invalid").into_response(),
    };

    match s.store.ships.find_owned(id, user.id).await {
        Ok(ship) => Json(Ship::from_record(&ship, User::from(&user))).into_response(),
        Err(code) => code.to_http_response("ship not found").into_response(),
    }
}

/// `GET /api/v1/ships/by-imai/{imai}`
pub async fn get_by_imai(
    State(s): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(imai): Path<i64>,
) -> impl IntoResponse {
    let user = match authenticate(&s, &headers).await {
        Ok(user) => user,
        Err(code) => return code.to_http_response("the token is invalid").into_response(),
    };

    match s.store.ships.find_owned_by_imai(imai, user.id).await {
        Ok(ship) => Json(Ship::from_record(&ship, User::from(&user))).into_response(),
        Err(code) => code.to_http_response("ship not found").into_response(),
    }
}

/// `PUT /api/v1/ships/{id}`
pub async fn update(
    State(s): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<ShipId>,
    Json(body): Json<AddShip>,
) -> impl IntoResponse {
    let user = match authenticate(&s, &headers).await {
        Ok(user) => user,
        Err(code) => return code.to_http_response("the token is invalid").into_response(),
    };
    if let Err(msg) = body.validate() {
        return ErrorCode::BadRequest.to_http_response(msg).into_response();
    }

    match s.store.ships.update(id, user.id, body.imai, &body.name, &body.color).await {
        Ok(ship) => Json(Ship::from_record(&ship, User::from(&user))).into_response(),
        Err(code @ ErrorCode::Conflict) => {
            code.to_http_response("ship with this imai already exists").into_response()
        }
        Err(code) => code.to_http_response("ship not found").into_response(),
    }
}

/// `PUT /api/v1/ships/{id}/course`
///
/// Replaces (or clears) the route, wipes the ship's telemetry history, and
/// only then pushes the update to a live course subscriber, so a subscriber
/// never observes a course the store does not hold.
pub async fn set_course(
    State(s): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<ShipId>,
    Json(body): Json<SetCourse>,
) -> impl IntoResponse {
    let user = match authenticate(&s, &headers).await {
        Ok(user) => user,
        Err(code) => return code.to_http_response("the token is invalid").into_response(),
    };

    match s.store.ships.set_course(id, user.id, body.course.clone()).await {
        Ok(ship) => {
            let wiped = s.store.telemetry.delete_by_ship(id).await;
            info!(ship = id, waypoints = ship.course.as_ref().map_or(0, |c| c.len()), wiped, "course updated");
            s.registry.course.publish(id, body.course).await;
            Json(Ship::from_record(&ship, User::from(&user))).into_response()
        }
        Err(code) => code.to_http_response("ship not found").into_response(),
    }
}

/// `DELETE /api/v1/ships/{id}`
pub async fn delete(
    State(s): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<ShipId>,
) -> impl IntoResponse {
    let user = match authenticate(&s, &headers).await {
        Ok(user) => user,
        Err(code) => return code.to_http_response("the token is invalid").into_response(),
    };

    match s.store.delete_ship(id, user.id).await {
        Ok(ship) => {
            info!(ship = ship.id, "ship deleted");
            Json(Ship::from_record(&ship, User::from(&user))).into_response()
        }
        Err(code) => code.to_http_response("ship not found").into_response(),
    }
}

/// `GET /api/v1/ships/{id}/telemetry`
pub async fn list_telemetry(
    State(s): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<ShipId>,
) -> impl IntoResponse {
    let user = match authenticate(&s, &headers).await {
        Ok(user) => user,
        Err(code) => return code.to_http_response("the token is invalid").into_response(),
    };

    if let Err(code) = s.store.ships.find_owned(id, user.id).await {
        return code.to_http_response("ship not found").into_response();
    }

    let rows: Vec<Telemetry> =
        s.store.telemetry.list_by_ship(id).await.iter().map(Telemetry::from).collect();
    Json(rows).into_response()
}
