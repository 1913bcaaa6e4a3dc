// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test infrastructure: builders, seed helpers, and an in-process
//! HTTP server.

use std::sync::atomic::AtomicI32;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tokio_util::sync::CancellationToken;

use crate::auth;
use crate::store::ships::ShipRecord;
use crate::store::users::UserRecord;
use crate::store::Store;
use crate::transport::state::{AppState, LifecycleState, RegistryState, ServerSettings};

/// Signing secret used across the test suites.
pub const TEST_SECRET: &str = "test-secret-0123456789abcdef!!";

/// Builder for constructing `AppState` in tests with sensible defaults.
pub struct AppStateBuilder {
    secret: String,
}

impl Default for AppStateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AppStateBuilder {
    pub fn new() -> Self {
        Self { secret: TEST_SECRET.to_owned() }
    }

    pub fn secret(mut self, secret: impl Into<String>) -> Self {
        self.secret = secret.into();
        self
    }

    pub fn build(self) -> Arc<AppState> {
        Arc::new(AppState {
            store: Store::new(),
            registry: RegistryState::default(),
            config: ServerSettings { started_at: Instant::now(), secret: self.secret },
            lifecycle: LifecycleState {
                shutdown: CancellationToken::new(),
                ws_client_count: AtomicI32::new(0),
            },
        })
    }
}

/// Create an account directly in the store and mint a valid token for it.
pub async fn seed_user(
    state: &AppState,
    username: &str,
    password: &str,
) -> anyhow::Result<(UserRecord, String)> {
    let salt = auth::generate_salt();
    let hash = auth::hash_password(password, &salt);
    let user = state
        .store
        .users
        .create(username, &hash, &salt, Utc::now())
        .await
        .map_err(|e| anyhow::anyhow!("seed user: {e}"))?;
    let token = auth::issue(&user, &state.config.secret).token;
    Ok((user, token))
}

/// Register a ship directly in the store.
pub async fn seed_ship(state: &AppState, owner: i64, imai: i64) -> anyhow::Result<ShipRecord> {
    state
        .store
        .ships
        .create(owner, imai, "Test Ship", "#abc")
        .await
        .map_err(|e| anyhow::anyhow!("seed ship: {e}"))
}

/// Spawn an HTTP server on a random port for integration testing.
///
/// Returns the bound address and a join handle for the server task.
pub async fn spawn_http_server(
    state: Arc<AppState>,
) -> anyhow::Result<(std::net::SocketAddr, tokio::task::JoinHandle<()>)> {
    let router = crate::transport::build_router(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let handle = tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    Ok((addr, handle))
}

/// Extension trait to convert any `Display` error into `anyhow::Error`.
/// Replaces `.map_err(|e| anyhow::anyhow!("{e}"))` with `.anyhow()`.
pub trait AnyhowExt<T> {
    fn anyhow(self) -> anyhow::Result<T>;
}

impl<T, E: std::fmt::Display> AnyhowExt<T> for Result<T, E> {
    fn anyhow(self) -> anyhow::Result<T> {
        self.map_err(|e| anyhow::anyhow!("{e}"))
    }
}
