// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Test harness for end-to-end binary smoke tests.
//!
//! Spawns the real `pelorus` binary as a subprocess and exercises it over
//! HTTP and WebSocket.

use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::time::Duration;

/// Signing secret handed to the spawned process.
pub const SPEC_SECRET: &str = "spec-secret-0123456789abcdef!!";

/// Resolve the path to the compiled `pelorus` binary.
pub fn pelorus_binary() -> PathBuf {
    let manifest = Path::new(env!("CARGO_MANIFEST_DIR"));
    // tests/specs → tests → workspace root
    let workspace = manifest.parent().and_then(|p| p.parent()).unwrap_or(manifest);
    workspace.join("target").join("debug").join("pelorus")
}

/// Find a free TCP port by binding to :0 then releasing.
pub fn free_port() -> anyhow::Result<u16> {
    let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
    Ok(listener.local_addr()?.port())
}

/// A running `pelorus` process that is killed on drop.
pub struct PelorusProcess {
    child: Child,
    port: u16,
}

impl PelorusProcess {
    /// Spawn the server on a free port with test-friendly logging.
    pub fn start() -> anyhow::Result<Self> {
        let binary = pelorus_binary();
        anyhow::ensure!(binary.exists(), "pelorus binary not found at {}", binary.display());

        let port = free_port()?;
        let child = Command::new(&binary)
            .args([
                "--host",
                "127.0.0.1",
                "--port",
                &port.to_string(),
                "--secret",
                SPEC_SECRET,
                "--log-format",
                "text",
                "--log-level",
                "warn",
            ])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;

        Ok(Self { child, port })
    }

    /// The HTTP port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Base URL for HTTP requests.
    pub fn base_url(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }

    /// WebSocket URL for a stream endpoint, e.g. `ws_url("course")`.
    pub fn ws_url(&self, stream: &str) -> String {
        format!("ws://127.0.0.1:{}/ws/{stream}", self.port)
    }

    /// Poll health until responsive.
    pub async fn wait_healthy(&self, timeout: Duration) -> anyhow::Result<()> {
        let deadline = tokio::time::Instant::now() + timeout;
        let client = reqwest::Client::new();
        let url = format!("{}/api/v1/health", self.base_url());
        loop {
            if tokio::time::Instant::now() > deadline {
                anyhow::bail!("pelorus did not become healthy within {timeout:?}");
            }
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status().is_success() {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
    }

    /// Register an account and return its token.
    pub async fn register(&self, username: &str, password: &str) -> anyhow::Result<String> {
        let client = reqwest::Client::new();
        let resp = client
            .post(format!("{}/api/v1/users/register", self.base_url()))
            .json(&serde_json::json!({"username": username, "password": password}))
            .send()
            .await?;
        anyhow::ensure!(resp.status().is_success(), "register failed: {}", resp.status());
        let body: serde_json::Value = resp.json().await?;
        body["token"]
            .as_str()
            .map(str::to_owned)
            .ok_or_else(|| anyhow::anyhow!("register response carried no token"))
    }
}

impl Drop for PelorusProcess {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}
