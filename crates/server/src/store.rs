// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-process storage collaborator.
//!
//! Process-lifetime tables behind `RwLock`s with sequential ids. This module
//! is the stable seam the rest of the system talks to; a relational backend
//! would slot in behind the same operations. Cross-table cascades (user →
//! ships → telemetry) live on [`Store`] so the per-table stores stay
//! single-concern.

pub mod ships;
pub mod telemetry;
pub mod users;

use crate::error::ErrorCode;
use crate::model::ShipId;

use ships::{ShipRecord, ShipStore};
use telemetry::TelemetryStore;
use users::{UserRecord, UserStore};

/// All persistent-shaped state, one instance per process.
#[derive(Debug, Default)]
pub struct Store {
    pub users: UserStore,
    pub ships: ShipStore,
    pub telemetry: TelemetryStore,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delete an account and everything hanging off it.
    pub async fn delete_user(&self, id: i64) -> Option<UserRecord> {
        let user = self.users.delete(id).await?;
        let ships = self.ships.delete_by_owner(id).await;
        for ship in &ships {
            self.telemetry.delete_by_ship(ship.id).await;
        }
        Some(user)
    }

    /// Delete an owned ship and its telemetry history.
    pub async fn delete_ship(&self, id: ShipId, owner: i64) -> Result<ShipRecord, ErrorCode> {
        let ship = self.ships.find_owned(id, owner).await?;
        self.ships.delete(id).await;
        self.telemetry.delete_by_ship(id).await;
        Ok(ship)
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
