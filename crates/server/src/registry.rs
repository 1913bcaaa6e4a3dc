// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory fan-out registries: the live-push core.
//!
//! Two process-lifetime maps route values to subscribers keyed by ship id.
//! The course registry holds at most one subscriber per ship, the telemetry
//! registry any number. Channels are unbounded mpsc: send never blocks (a
//! publisher must never be slowed by an absent or lagging subscriber), and
//! the blocking receive happens outside the registry lock, so membership
//! changes are never held up by an idle stream.
//!
//! Every subscription carries an id from a process-wide counter. Teardown
//! removes an entry only when the id still matches, so a stale unsubscribe
//! racing a fresh subscribe for the same ship can never evict the successor.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::mpsc;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::ErrorCode;
use crate::model::{CourseUpdate, ShipId, Telemetry};

/// Subscription identity within a registry.
type SubId = u64;

// ---------------------------------------------------------------------------
// Course registry — one subscriber per ship
// ---------------------------------------------------------------------------

struct CourseSlot {
    sub_id: SubId,
    tx: mpsc::UnboundedSender<CourseUpdate>,
}

/// A live claim on a ship's course stream.
pub struct CourseSubscription {
    ship: ShipId,
    id: SubId,
    rx: mpsc::UnboundedReceiver<CourseUpdate>,
}

impl CourseSubscription {
    pub fn ship(&self) -> ShipId {
        self.ship
    }

    /// Wait for the next published update. `None` once deregistered.
    pub async fn recv(&mut self) -> Option<CourseUpdate> {
        self.rx.recv().await
    }

    /// Drain one pending update without waiting (test hook).
    pub fn try_recv(&mut self) -> Option<CourseUpdate> {
        self.rx.try_recv().ok()
    }
}

/// Ship id → single course subscriber.
#[derive(Default)]
pub struct CourseRegistry {
    slots: RwLock<HashMap<ShipId, CourseSlot>>,
    next_id: AtomicU64,
}

impl CourseRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the course stream for a ship. At most one claim may exist at a
    /// time; the check and the install happen under one write lock, so two
    /// racing subscribers can never both succeed.
    pub async fn subscribe(&self, ship: ShipId) -> Result<CourseSubscription, ErrorCode> {
        let mut slots = self.slots.write().await;
        if slots.contains_key(&ship) {
            return Err(ErrorCode::AlreadySubscribed);
        }
        let (tx, rx) = mpsc::unbounded_channel();
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        slots.insert(ship, CourseSlot { sub_id: id, tx });
        debug!(ship, sub = id, "course subscriber registered");
        Ok(CourseSubscription { ship, id, rx })
    }

    /// Push a course (or the cleared marker) to the ship's subscriber.
    /// Silent no-op when nobody is listening; never blocks, never fails.
    pub async fn publish(&self, ship: ShipId, update: CourseUpdate) {
        let slots = self.slots.read().await;
        if let Some(slot) = slots.get(&ship) {
            // Send only fails when the receiver is gone, i.e. the subscriber
            // is mid-teardown. Its unsubscribe will drop the slot.
            let _ = slot.tx.send(update);
        }
    }

    /// Release a claim. Idempotent; removes the entry only while it still
    /// belongs to this subscription.
    pub async fn unsubscribe(&self, sub: &CourseSubscription) {
        let mut slots = self.slots.write().await;
        if slots.get(&sub.ship).is_some_and(|slot| slot.sub_id == sub.id) {
            slots.remove(&sub.ship);
            debug!(ship = sub.ship, sub = sub.id, "course subscriber removed");
        }
    }

    pub async fn is_subscribed(&self, ship: ShipId) -> bool {
        self.slots.read().await.contains_key(&ship)
    }
}

// ---------------------------------------------------------------------------
// Telemetry registry — broadcast per ship
// ---------------------------------------------------------------------------

/// A live claim on a ship's telemetry stream.
pub struct TelemetrySubscription {
    ship: ShipId,
    id: SubId,
    rx: mpsc::UnboundedReceiver<Telemetry>,
}

impl TelemetrySubscription {
    pub fn ship(&self) -> ShipId {
        self.ship
    }

    /// Wait for the next published reading. `None` once deregistered.
    pub async fn recv(&mut self) -> Option<Telemetry> {
        self.rx.recv().await
    }

    /// Drain one pending reading without waiting (test hook).
    pub fn try_recv(&mut self) -> Option<Telemetry> {
        self.rx.try_recv().ok()
    }
}

/// Ship id → set of telemetry subscribers.
#[derive(Default)]
pub struct TelemetryRegistry {
    subs: RwLock<HashMap<ShipId, HashMap<SubId, mpsc::UnboundedSender<Telemetry>>>>,
    next_id: AtomicU64,
}

impl TelemetryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Join the broadcast set for a ship, creating it on first join.
    /// No limit on concurrent subscribers.
    pub async fn subscribe(&self, ship: ShipId) -> TelemetrySubscription {
        let mut subs = self.subs.write().await;
        let (tx, rx) = mpsc::unbounded_channel();
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        subs.entry(ship).or_default().insert(id, tx);
        debug!(ship, sub = id, "telemetry subscriber registered");
        TelemetrySubscription { ship, id, rx }
    }

    /// Deliver a reading to every current subscriber of the ship, in publish
    /// order per subscriber. No-op when the set is absent or empty.
    pub async fn publish(&self, ship: ShipId, reading: &Telemetry) {
        let subs = self.subs.read().await;
        if let Some(set) = subs.get(&ship) {
            for tx in set.values() {
                let _ = tx.send(reading.clone());
            }
        }
    }

    /// Leave the broadcast set; the ship key is dropped with the last member
    /// so later publishes are plain no-ops. Idempotent.
    pub async fn unsubscribe(&self, sub: &TelemetrySubscription) {
        let mut subs = self.subs.write().await;
        if let Some(set) = subs.get_mut(&sub.ship) {
            if set.remove(&sub.id).is_some() {
                debug!(ship = sub.ship, sub = sub.id, "telemetry subscriber removed");
            }
            if set.is_empty() {
                subs.remove(&sub.ship);
            }
        }
    }

    /// Number of live subscribers for a ship.
    pub async fn subscriber_count(&self, ship: ShipId) -> usize {
        self.subs.read().await.get(&ship).map_or(0, HashMap::len)
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
