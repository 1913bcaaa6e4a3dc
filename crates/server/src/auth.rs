// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session tokens and password hashing.
//!
//! A token is `base64url(payload) "." base64url(hmac_sha256(secret, payload))`
//! where the payload is `"<user_id>.<issued_at_micros>"`. The issued-at value
//! is the account's `password_updated_at` at mint time, so changing the
//! password invalidates every outstanding token: verification compares the
//! embedded marker against the account's current one and refuses on mismatch.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use ring::hmac;
use sha2::{Digest, Sha512};

use crate::error::ErrorCode;
use crate::model::Token;
use crate::store::users::UserRecord;
use crate::store::Store;

/// Identity and freshness marker embedded in a verified token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Claims {
    pub user_id: i64,
    pub issued_at_micros: i64,
}

/// Sign a token for `user_id` with the given freshness marker.
pub fn mint_token(user_id: i64, issued_at: DateTime<Utc>, secret: &str) -> String {
    let payload = format!("{user_id}.{}", issued_at.timestamp_micros());
    let key = hmac::Key::new(hmac::HMAC_SHA256, secret.as_bytes());
    let sig = hmac::sign(&key, payload.as_bytes());
    format!("{}.{}", URL_SAFE_NO_PAD.encode(payload), URL_SAFE_NO_PAD.encode(sig.as_ref()))
}

/// Check the signature and parse the claims. `ring`'s verify is
/// constant-time, so malformed and forged tokens are indistinguishable to a
/// timing observer.
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, ErrorCode> {
    let (payload_b64, sig_b64) = token.split_once('.').ok_or(ErrorCode::Unauthorized)?;
    let payload = URL_SAFE_NO_PAD.decode(payload_b64).map_err(|_| ErrorCode::Unauthorized)?;
    let sig = URL_SAFE_NO_PAD.decode(sig_b64).map_err(|_| ErrorCode::Unauthorized)?;

    let key = hmac::Key::new(hmac::HMAC_SHA256, secret.as_bytes());
    hmac::verify(&key, &payload, &sig).map_err(|_| ErrorCode::Unauthorized)?;

    let payload = String::from_utf8(payload).map_err(|_| ErrorCode::Unauthorized)?;
    let (user_id, issued_at) = payload.split_once('.').ok_or(ErrorCode::Unauthorized)?;
    Ok(Claims {
        user_id: user_id.parse().map_err(|_| ErrorCode::Unauthorized)?,
        issued_at_micros: issued_at.parse().map_err(|_| ErrorCode::Unauthorized)?,
    })
}

/// Resolve a bearer token to the account it names.
///
/// Exactly one store lookup per call, no caching: a token minted before the
/// account's most recent password change no longer matches the freshness
/// marker and is refused.
pub async fn verify_session(store: &Store, secret: &str, token: &str) -> Result<UserRecord, ErrorCode> {
    let claims = verify_token(token, secret)?;
    let user = store.users.find(claims.user_id).await.ok_or(ErrorCode::Unauthorized)?;
    if user.password_updated_at.timestamp_micros() != claims.issued_at_micros {
        return Err(ErrorCode::Unauthorized);
    }
    Ok(user)
}

/// Mint the API-facing token envelope for an account.
pub fn issue(user: &UserRecord, secret: &str) -> Token {
    Token {
        id: user.id,
        issued_at: user.password_updated_at,
        token: mint_token(user.id, user.password_updated_at, secret),
    }
}

/// Hex SHA-512 over password + salt.
pub fn hash_password(password: &str, salt: &str) -> String {
    let mut hasher = Sha512::new();
    hasher.update(password.as_bytes());
    hasher.update(salt.as_bytes());
    hex(&hasher.finalize())
}

/// Compare a candidate password against a stored hash in constant time.
pub fn verify_password(password: &str, salt: &str, expected_hash: &str) -> bool {
    constant_time_eq(&hash_password(password, salt), expected_hash)
}

/// Fresh random salt, 16 hex characters.
pub fn generate_salt() -> String {
    let bytes: [u8; 8] = rand::random();
    hex(&bytes)
}

/// Constant-time string comparison to prevent timing side-channel attacks.
fn constant_time_eq(a: &str, b: &str) -> bool {
    let a = a.as_bytes();
    let b = b.as_bytes();
    if a.len() != b.len() {
        return false;
    }
    let mut acc = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        acc |= x ^ y;
    }
    acc == 0
}

fn hex(bytes: &[u8]) -> String {
    use std::fmt::Write;
    bytes.iter().fold(String::with_capacity(bytes.len() * 2), |mut out, b| {
        let _ = write!(out, "{b:02x}");
        out
    })
}

#[cfg(test)]
#[path = "auth_tests.rs"]
mod tests;
