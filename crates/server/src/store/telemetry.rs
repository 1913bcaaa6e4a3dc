// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Telemetry table. Rows are immutable once created.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::model::{AddTelemetry, ShipId};

/// One stored sensor snapshot.
#[derive(Debug, Clone)]
pub struct TelemetryRecord {
    pub id: i64,
    pub ship_id: ShipId,
    pub timestamp: DateTime<Utc>,
    pub longitude: f64,
    pub latitude: f64,
    pub heading: f64,
    pub temperature: f64,
    pub voltage: f64,
    pub velocity: f64,
}

/// Telemetry table, append-only apart from per-ship wipes.
#[derive(Debug)]
pub struct TelemetryStore {
    readings: RwLock<HashMap<i64, TelemetryRecord>>,
    next_id: AtomicI64,
}

impl Default for TelemetryStore {
    fn default() -> Self {
        Self { readings: RwLock::new(HashMap::new()), next_id: AtomicI64::new(1) }
    }
}

impl TelemetryStore {
    /// Append a reading, assigning its id.
    pub async fn create(&self, reading: &AddTelemetry) -> TelemetryRecord {
        let mut readings = self.readings.write().await;
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let record = TelemetryRecord {
            id,
            ship_id: reading.ship_id,
            timestamp: reading.timestamp,
            longitude: reading.longitude,
            latitude: reading.latitude,
            heading: reading.heading,
            temperature: reading.temperature,
            voltage: reading.voltage,
            velocity: reading.velocity,
        };
        readings.insert(id, record.clone());
        record
    }

    pub async fn find(&self, id: i64) -> Option<TelemetryRecord> {
        self.readings.read().await.get(&id).cloned()
    }

    /// A ship's readings in insertion (id) order.
    pub async fn list_by_ship(&self, ship_id: ShipId) -> Vec<TelemetryRecord> {
        let readings = self.readings.read().await;
        let mut rows: Vec<TelemetryRecord> =
            readings.values().filter(|r| r.ship_id == ship_id).cloned().collect();
        rows.sort_by_key(|r| r.id);
        rows
    }

    /// Wipe a ship's history. Returns the number of rows removed.
    pub async fn delete_by_ship(&self, ship_id: ShipId) -> usize {
        let mut readings = self.readings.write().await;
        let ids: Vec<i64> =
            readings.values().filter(|r| r.ship_id == ship_id).map(|r| r.id).collect();
        let count = ids.len();
        for id in ids {
            readings.remove(&id);
        }
        count
    }
}
