// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! API data types and request validation.
//!
//! These are the wire-facing shapes; storage records live in [`crate::store`].
//! Validation returns a human-readable message which the transport layer
//! wraps in a `BAD_REQUEST` envelope.

use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::store::ships::ShipRecord;
use crate::store::telemetry::TelemetryRecord;
use crate::store::users::UserRecord;

/// Primary key of a ship record; registry key in both fan-out tables.
pub type ShipId = i64;

/// One course waypoint: `(longitude, latitude)`.
pub type Waypoint = (f64, f64);

/// An ordered sequence of waypoints.
pub type Course = Vec<Waypoint>;

/// Payload of the course stream: a new course, or `None` for "cleared".
pub type CourseUpdate = Option<Course>;

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// Public view of a user account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
}

impl From<&UserRecord> for User {
    fn from(record: &UserRecord) -> Self {
        Self { id: record.id, username: record.username.clone() }
    }
}

/// Request body for `POST /api/v1/users/register` and `/login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn validate(&self) -> Result<(), String> {
        validate_username(&self.username)?;
        validate_password(&self.password)
    }
}

/// Request body for `PUT /api/v1/users/username`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateUsername {
    pub username: String,
}

/// Request body for `PUT /api/v1/users/password`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdatePassword {
    pub password: String,
}

/// A freshly minted session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub id: i64,
    pub issued_at: DateTime<Utc>,
    pub token: String,
}

// ---------------------------------------------------------------------------
// Ships
// ---------------------------------------------------------------------------

/// Public view of a ship, including its owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ship {
    pub id: ShipId,
    pub imai: i64,
    pub course: Option<Course>,
    pub name: String,
    pub color: String,
    pub owner: User,
}

impl Ship {
    pub fn from_record(record: &ShipRecord, owner: User) -> Self {
        Self {
            id: record.id,
            imai: record.imai,
            course: record.course.clone(),
            name: record.name.clone(),
            color: record.color.clone(),
            owner,
        }
    }
}

/// Request body for ship registration and updates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddShip {
    pub imai: i64,
    pub name: String,
    pub color: String,
}

impl AddShip {
    pub fn validate(&self) -> Result<(), String> {
        validate_imai(self.imai)?;
        validate_color(&self.color)
    }
}

/// Request body for `PUT /api/v1/ships/{id}/course`. A missing or `null`
/// course clears the ship's route.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SetCourse {
    #[serde(default)]
    pub course: Option<Course>,
}

// ---------------------------------------------------------------------------
// Telemetry
// ---------------------------------------------------------------------------

/// One timestamped sensor snapshot for a ship.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Telemetry {
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

impl From<&TelemetryRecord> for Telemetry {
    fn from(record: &TelemetryRecord) -> Self {
        Self {
            id: record.id,
            ship_id: record.ship_id,
            timestamp: record.timestamp,
            longitude: record.longitude,
            latitude: record.latitude,
            heading: record.heading,
            temperature: record.temperature,
            voltage: record.voltage,
            velocity: record.velocity,
        }
    }
}

/// Request body for `POST /api/v1/telemetry`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddTelemetry {
    pub ship_id: ShipId,
    pub timestamp: DateTime<Utc>,
    pub longitude: f64,
    pub latitude: f64,
    pub heading: f64,
    pub temperature: f64,
    pub voltage: f64,
    pub velocity: f64,
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Ship colors are CSS-style hex: `#abc` or `#a1b2c3`, case-insensitive.
const COLOR_PATTERN: &str = r"^#(?i:[a-f0-9]{3}|[a-f0-9]{6})$";

fn color_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(COLOR_PATTERN).ok()).as_ref()
}

pub fn validate_username(username: &str) -> Result<(), String> {
    if username.chars().count() < 3 {
        return Err("username must be at least 3 characters".to_owned());
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), String> {
    if password.chars().count() < 8 {
        return Err("password must be at least 8 characters".to_owned());
    }
    Ok(())
}

/// The imai device identifier is exactly 8 decimal digits.
pub fn validate_imai(imai: i64) -> Result<(), String> {
    if !(10_000_000..=99_999_999).contains(&imai) {
        return Err("imai must be 8 digits".to_owned());
    }
    Ok(())
}

pub fn validate_color(color: &str) -> Result<(), String> {
    let ok = matches!(color_regex(), Some(re) if re.is_match(color));
    if ok {
        Ok(())
    } else {
        Err("color must be a hex value like #1a2b3c".to_owned())
    }
}

#[cfg(test)]
#[path = "model_tests.rs"]
mod tests;
