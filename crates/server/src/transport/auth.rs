// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use axum::http::HeaderMap;

use crate::auth;
use crate::error::ErrorCode;
use crate::store::users::UserRecord;
use crate::transport::state::AppState;

/// Extract the token from an `Authorization: Bearer ...` header.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, ErrorCode> {
    let header = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .ok_or(ErrorCode::Unauthorized)?;

    header.strip_prefix("Bearer ").ok_or(ErrorCode::Unauthorized)
}

/// Resolve the request's bearer token to an account.
///
/// Called at the top of every handler that needs identity; each call performs
/// the full signature + freshness verification against the store.
pub async fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<UserRecord, ErrorCode> {
    let token = bearer_token(headers)?;
    auth::verify_session(&state.store, &state.config.secret, token).await
}

#[cfg(test)]
#[path = "auth_tests.rs"]
mod tests;
