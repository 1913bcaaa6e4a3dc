// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! End-to-end smoke tests that spawn the real `pelorus` binary and exercise
//! the HTTP API and WebSocket streams.

use std::time::Duration;

use futures_util::StreamExt;
use tokio_tungstenite::tungstenite::Message;

use pelorus_specs::PelorusProcess;

const TIMEOUT: Duration = Duration::from_secs(10);

#[tokio::test]
async fn http_health() -> anyhow::Result<()> {
    let server = PelorusProcess::start()?;
    server.wait_healthy(TIMEOUT).await?;

    let resp: serde_json::Value =
        reqwest::get(format!("{}/api/v1/health", server.base_url())).await?.json().await?;

    assert_eq!(resp["status"], "running");
    assert!(resp["uptime_secs"].is_number());
    assert_eq!(resp["ws_clients"], 0);
    Ok(())
}

#[tokio::test]
async fn register_login_and_fleet_roundtrip() -> anyhow::Result<()> {
    let server = PelorusProcess::start()?;
    server.wait_healthy(TIMEOUT).await?;
    let token = server.register("ada", "correct horse").await?;

    let client = reqwest::Client::new();

    // The token authenticates.
    let me: serde_json::Value = client
        .get(format!("{}/api/v1/users/me", server.base_url()))
        .header("authorization", format!("Bearer {token}"))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(me["username"], "ada");

    // Login mints an equally valid token.
    let login: serde_json::Value = client
        .post(format!("{}/api/v1/users/login", server.base_url()))
        .json(&serde_json::json!({"username": "ada", "password": "correct horse"}))
        .send()
        .await?
        .json()
        .await?;
    assert!(login["token"].is_string());

    // Register a ship and read it back.
    let ship: serde_json::Value = client
        .post(format!("{}/api/v1/ships", server.base_url()))
        .header("authorization", format!("Bearer {token}"))
        .json(&serde_json::json!({"imai": 12345678, "name": "Beagle", "color": "#00ff00"}))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(ship["owner"]["username"], "ada");

    let fleet: serde_json::Value = client
        .get(format!("{}/api/v1/ships", server.base_url()))
        .header("authorization", format!("Bearer {token}"))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(fleet.as_array().map(Vec::len), Some(1));
    Ok(())
}

#[tokio::test]
async fn course_stream_end_to_end() -> anyhow::Result<()> {
    let server = PelorusProcess::start()?;
    server.wait_healthy(TIMEOUT).await?;
    let token = server.register("ada", "correct horse").await?;

    let client = reqwest::Client::new();
    let ship: serde_json::Value = client
        .post(format!("{}/api/v1/ships", server.base_url()))
        .header("authorization", format!("Bearer {token}"))
        .json(&serde_json::json!({"imai": 12345678, "name": "Beagle", "color": "#00ff00"}))
        .send()
        .await?
        .json()
        .await?;
    let ship_id = ship["id"].as_i64().unwrap_or_default();

    let url = format!("{}?ship_id={ship_id}&token={token}", server.ws_url("course"));
    let (mut stream, _) = tokio_tungstenite::connect_async(&url).await?;

    // Give the session a moment to claim the slot, then publish.
    tokio::time::sleep(Duration::from_millis(100)).await;
    let resp = client
        .put(format!("{}/api/v1/ships/{ship_id}/course", server.base_url()))
        .header("authorization", format!("Bearer {token}"))
        .json(&serde_json::json!({"course": [[9.0, 45.0]]}))
        .send()
        .await?;
    anyhow::ensure!(resp.status().is_success());

    let msg = tokio::time::timeout(TIMEOUT, stream.next())
        .await
        .map_err(|_| anyhow::anyhow!("course frame timeout"))?
        .ok_or_else(|| anyhow::anyhow!("stream closed"))?
        .map_err(|e| anyhow::anyhow!("ws recv: {e}"))?;
    match msg {
        Message::Text(text) => {
            let course: serde_json::Value = serde_json::from_str(&text)?;
            assert_eq!(course, serde_json::json!([[9.0, 45.0]]));
        }
        other => anyhow::bail!("expected Text frame, got {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn telemetry_stream_end_to_end() -> anyhow::Result<()> {
    let server = PelorusProcess::start()?;
    server.wait_healthy(TIMEOUT).await?;
    let token = server.register("ada", "correct horse").await?;

    let client = reqwest::Client::new();
    let ship: serde_json::Value = client
        .post(format!("{}/api/v1/ships", server.base_url()))
        .header("authorization", format!("Bearer {token}"))
        .json(&serde_json::json!({"imai": 12345678, "name": "Beagle", "color": "#00ff00"}))
        .send()
        .await?
        .json()
        .await?;
    let ship_id = ship["id"].as_i64().unwrap_or_default();

    let url = format!("{}?ship_id={ship_id}&token={token}", server.ws_url("telemetry"));
    let (mut stream, _) = tokio_tungstenite::connect_async(&url).await?;
    tokio::time::sleep(Duration::from_millis(100)).await;

    let resp = client
        .post(format!("{}/api/v1/telemetry", server.base_url()))
        .header("authorization", format!("Bearer {token}"))
        .json(&serde_json::json!({
            "ship_id": ship_id,
            "timestamp": "2026-08-01T10:00:00Z",
            "longitude": 9.18,
            "latitude": 45.46,
            "heading": 270.0,
            "temperature": 18.5,
            "voltage": 12.1,
            "velocity": 4.2,
        }))
        .send()
        .await?;
    anyhow::ensure!(resp.status().is_success());

    let msg = tokio::time::timeout(TIMEOUT, stream.next())
        .await
        .map_err(|_| anyhow::anyhow!("telemetry frame timeout"))?
        .ok_or_else(|| anyhow::anyhow!("stream closed"))?
        .map_err(|e| anyhow::anyhow!("ws recv: {e}"))?;
    match msg {
        Message::Text(text) => {
            let frame: serde_json::Value = serde_json::from_str(&text)?;
            assert_eq!(frame["ship_id"], serde_json::json!(ship_id));
            assert_eq!(frame["heading"], 270.0);
        }
        other => anyhow::bail!("expected Text frame, got {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn invalid_token_is_refused() -> anyhow::Result<()> {
    let server = PelorusProcess::start()?;
    server.wait_healthy(TIMEOUT).await?;

    let url = format!("{}?ship_id=1&token=bogus", server.ws_url("course"));
    assert!(tokio_tungstenite::connect_async(&url).await.is_err());

    let resp = reqwest::Client::new()
        .get(format!("{}/api/v1/users/me", server.base_url()))
        .header("authorization", "Bearer bogus")
        .send()
        .await?;
    assert_eq!(resp.status().as_u16(), 401);
    Ok(())
}
