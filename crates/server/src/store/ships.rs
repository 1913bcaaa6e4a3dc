// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Ship table.
//!
//! Owner-scoped lookups report `NotFound` and `NotOwner` separately so the
//! transport layer can refuse the two cases with distinct codes.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};

use tokio::sync::RwLock;

use crate::error::ErrorCode;
use crate::model::{Course, ShipId};

/// A registered ship.
#[derive(Debug, Clone)]
pub struct ShipRecord {
    pub id: ShipId,
    pub owner_id: i64,
    pub imai: i64,
    pub name: String,
    pub color: String,
    pub course: Option<Course>,
}

/// Ship table. Device identifiers (imai) are unique across the fleet.
#[derive(Debug)]
pub struct ShipStore {
    ships: RwLock<HashMap<ShipId, ShipRecord>>,
    next_id: AtomicI64,
}

impl Default for ShipStore {
    fn default() -> Self {
        Self { ships: RwLock::new(HashMap::new()), next_id: AtomicI64::new(1) }
    }
}

impl ShipStore {
    /// Register a ship. `Conflict` when the imai is already registered.
    pub async fn create(
        &self,
        owner_id: i64,
        imai: i64,
        name: &str,
        color: &str,
    ) -> Result<ShipRecord, ErrorCode> {
        let mut ships = self.ships.write().await;
        if ships.values().any(|s| s.imai == imai) {
            return Err(ErrorCode::Conflict);
        }
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let record = ShipRecord {
            id,
            owner_id,
            imai,
            name: name.to_owned(),
            color: color.to_owned(),
            course: None,
        };
        ships.insert(id, record.clone());
        Ok(record)
    }

    pub async fn find(&self, id: ShipId) -> Option<ShipRecord> {
        self.ships.read().await.get(&id).cloned()
    }

    /// Fetch a ship enforcing ownership.
    pub async fn find_owned(&self, id: ShipId, owner_id: i64) -> Result<ShipRecord, ErrorCode> {
        let ships = self.ships.read().await;
        let ship = ships.get(&id).ok_or(ErrorCode::NotFound)?;
        if ship.owner_id != owner_id {
            return Err(ErrorCode::NotOwner);
        }
        Ok(ship.clone())
    }

    /// Fetch a ship by device identifier, enforcing ownership.
    pub async fn find_owned_by_imai(&self, imai: i64, owner_id: i64) -> Result<ShipRecord, ErrorCode> {
        let ships = self.ships.read().await;
        let ship = ships.values().find(|s| s.imai == imai).ok_or(ErrorCode::NotFound)?;
        if ship.owner_id != owner_id {
            return Err(ErrorCode::NotOwner);
        }
        Ok(ship.clone())
    }

    /// All ships belonging to an account, in id order.
    pub async fn list_by_owner(&self, owner_id: i64) -> Vec<ShipRecord> {
        let ships = self.ships.read().await;
        let mut owned: Vec<ShipRecord> =
            ships.values().filter(|s| s.owner_id == owner_id).cloned().collect();
        owned.sort_by_key(|s| s.id);
        owned
    }

    /// Update imai/name/color. Imai uniqueness is re-checked against every
    /// other ship (keeping the current imai is fine).
    pub async fn update(
        &self,
        id: ShipId,
        owner_id: i64,
        imai: i64,
        name: &str,
        color: &str,
    ) -> Result<ShipRecord, ErrorCode> {
        let mut ships = self.ships.write().await;
        match ships.get(&id) {
            None => return Err(ErrorCode::NotFound),
            Some(ship) if ship.owner_id != owner_id => return Err(ErrorCode::NotOwner),
            Some(_) => {}
        }
        if ships.values().any(|s| s.imai == imai && s.id != id) {
            return Err(ErrorCode::Conflict);
        }
        let ship = ships.get_mut(&id).ok_or(ErrorCode::NotFound)?;
        ship.imai = imai;
        ship.name = name.to_owned();
        ship.color = color.to_owned();
        Ok(ship.clone())
    }

    /// Replace the course wholesale (`None` clears it).
    pub async fn set_course(
        &self,
        id: ShipId,
        owner_id: i64,
        course: Option<Course>,
    ) -> Result<ShipRecord, ErrorCode> {
        let mut ships = self.ships.write().await;
        let ship = ships.get_mut(&id).ok_or(ErrorCode::NotFound)?;
        if ship.owner_id != owner_id {
            return Err(ErrorCode::NotOwner);
        }
        ship.course = course;
        Ok(ship.clone())
    }

    pub async fn delete(&self, id: ShipId) -> Option<ShipRecord> {
        self.ships.write().await.remove(&id)
    }

    /// Remove every ship belonging to an account, returning the removed rows
    /// so the caller can cascade their telemetry.
    pub async fn delete_by_owner(&self, owner_id: i64) -> Vec<ShipRecord> {
        let mut ships = self.ships.write().await;
        let ids: Vec<ShipId> =
            ships.values().filter(|s| s.owner_id == owner_id).map(|s| s.id).collect();
        ids.iter().filter_map(|id| ships.remove(id)).collect()
    }
}
