// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::atomic::AtomicI32;
use std::time::Instant;

use tokio_util::sync::CancellationToken;

use crate::registry::{CourseRegistry, TelemetryRegistry};
use crate::store::Store;

/// Shared application state passed to all handlers via axum `State` extractor.
///
/// Organized into focused sub-structs by concern:
/// - `store`: the storage collaborator (users, ships, telemetry)
/// - `registry`: the live fan-out registries
/// - `config`: static settings (immutable after construction)
/// - `lifecycle`: runtime lifecycle primitives
pub struct AppState {
    pub store: Store,
    pub registry: RegistryState,
    pub config: ServerSettings,
    pub lifecycle: LifecycleState,
}

/// The two fan-out registries, constructed once at process start and shared
/// by every admission and publish call site.
#[derive(Default)]
pub struct RegistryState {
    pub course: CourseRegistry,
    pub telemetry: TelemetryRegistry,
}

/// Static server configuration.
pub struct ServerSettings {
    pub started_at: Instant,
    /// Token signing secret.
    pub secret: String,
}

/// Runtime lifecycle primitives.
pub struct LifecycleState {
    pub shutdown: CancellationToken,
    pub ws_client_count: AtomicI32,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("secret", &"<redacted>")
            .field("started_at", &self.config.started_at)
            .finish()
    }
}
