// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! User account HTTP handlers.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use tracing::info;

use crate::auth;
use crate::error::ErrorCode;
use crate::model::{self, Credentials, UpdatePassword, UpdateUsername, User};
use crate::transport::auth::authenticate;
use crate::transport::state::AppState;

/// `POST /api/v1/users/register`
pub async fn register(
    State(s): State<Arc<AppState>>,
    Json(body): Json<Credentials>,
) -> impl IntoResponse {
    if let Err(msg) = body.validate() {
        return ErrorCode::BadRequest.to_http_response(msg).into_response();
    }

    let salt = auth::generate_salt();
    let hash = auth::hash_password(&body.password, &salt);
    match s.store.users.create(&body.username, &hash, &salt, Utc::now()).await {
        Ok(user) => {
            info!(user = user.id, username = body.username.as_str(), "account registered");
            Json(auth::issue(&user, &s.config.secret)).into_response()
        }
        Err(code) => code.to_http_response("username already exists").into_response(),
    }
}

/// `POST /api/v1/users/login`
pub async fn login(
    State(s): State<Arc<AppState>>,
    Json(body): Json<Credentials>,
) -> impl IntoResponse {
    let user = match s.store.users.find_by_username(&body.username).await {
        Some(user) => user,
        None => {
            return ErrorCode::Unauthorized
                .to_http_response("the username or password is incorrect")
                .into_response()
        }
    };

    if !auth::verify_password(&body.password, &user.salt, &user.password_hash) {
        return ErrorCode::Unauthorized
            .to_http_response("the username or password is incorrect")
            .into_response();
    }

    Json(auth::issue(&user, &s.config.secret)).into_response()
}

/// `GET /api/v1/users/me`
pub async fn me(State(s): State<Arc<AppState>>, headers: HeaderMap) -> impl IntoResponse {
    match authenticate(&s, &headers).await {
        Ok(user) => Json(User::from(&user)).into_response(),
        Err(code) => code.to_http_response("the token is invalid").into_response(),
    }
}

/// `GET /api/v1/users/{id}` — public lookup.
pub async fn get_by_id(State(s): State<Arc<AppState>>, Path(id): Path<i64>) -> impl IntoResponse {
    match s.store.users.find(id).await {
        Some(user) => Json(User::from(&user)).into_response(),
        None => ErrorCode::NotFound.to_http_response("user not found").into_response(),
    }
}

/// `GET /api/v1/users/by-name/{username}` — public lookup.
pub async fn get_by_username(
    State(s): State<Arc<AppState>>,
    Path(username): Path<String>,
) -> impl IntoResponse {
    match s.store.users.find_by_username(&username).await {
        Some(user) => Json(User::from(&user)).into_response(),
        None => ErrorCode::NotFound.to_http_response("user not found").into_response(),
    }
}

/// `PUT /api/v1/users/username`
pub async fn update_username(
    State(s): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<UpdateUsername>,
) -> impl IntoResponse {
    let user = match authenticate(&s, &headers).await {
        Ok(user) => user,
        Err(code) => return code.to_http_response("the token is invalid").into_response(),
    };
    if let Err(msg) = model::validate_username(&body.username) {
        return ErrorCode::BadRequest.to_http_response(msg).into_response();
    }

    match s.store.users.update_username(user.id, &body.username).await {
        Ok(updated) => Json(User::from(&updated)).into_response(),
        Err(code) => code.to_http_response("username already exists").into_response(),
    }
}

/// `PUT /api/v1/users/password`
///
/// Advances the freshness marker, so every token issued before this call is
/// refused from here on. The response carries a fresh token.
pub async fn update_password(
    State(s): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<UpdatePassword>,
) -> impl IntoResponse {
    let user = match authenticate(&s, &headers).await {
        Ok(user) => user,
        Err(code) => return code.to_http_response("the token is invalid").into_response(),
    };
    if let Err(msg) = model::validate_password(&body.password) {
        return ErrorCode::BadRequest.to_http_response(msg).into_response();
    }

    let salt = auth::generate_salt();
    let hash = auth::hash_password(&body.password, &salt);
    match s.store.users.update_password(user.id, &hash, &salt, Utc::now()).await {
        Ok(updated) => {
            info!(user = updated.id, "password updated, outstanding tokens invalidated");
            Json(auth::issue(&updated, &s.config.secret)).into_response()
        }
        Err(code) => code.to_http_response("user not found").into_response(),
    }
}

/// `DELETE /api/v1/users`
pub async fn delete(State(s): State<Arc<AppState>>, headers: HeaderMap) -> impl IntoResponse {
    let user = match authenticate(&s, &headers).await {
        Ok(user) => user,
        Err(code) => return code.to_http_response("the token is invalid").into_response(),
    };

    match s.store.delete_user(user.id).await {
        Some(deleted) => {
            info!(user = deleted.id, "account deleted");
            Json(User::from(&deleted)).into_response()
        }
        None => ErrorCode::NotFound.to_http_response("user not found").into_response(),
    }
}
