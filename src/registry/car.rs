// This software is provided for non-commercial use only.
// Commercial use is strictly prohibited.
// If you use, modify, or redistribute this software, you must provide proper attribution to the original author.
// (c) 2026 Onur Tuna. All rights reserved.

//! Car records as stored and as sent over the wire.

use std::fmt;

use rusqlite::Row;
use serde::{Deserialize, Serialize};

use crate::error::{FleetError, Result};

/// Column list matching [`Car::from_row`].
pub(crate) const CAR_COLUMNS: &str = "id, model, registration, mileage, available";

/// A car in the fleet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Car {
    /// Store-assigned surrogate key.
    pub id: i64,
    pub model: String,
    /// Business key, unique across the fleet.
    pub registration: String,
    pub mileage: u32,
    /// `true` while the car can be rented.
    pub available: bool,
}

impl Car {
    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            model: row.get(1)?,
            registration: row.get(2)?,
            mileage: row.get(3)?,
            available: row.get(4)?,
        })
    }

    pub fn state(&self) -> CarState {
        CarState::from_available(self.available)
    }
}

/// Payload for registering a new car. New cars always start available,
/// so any `available` sent by a client is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct NewCar {
    pub model: String,
    pub registration: String,
    pub mileage: u32,
}

impl NewCar {
    /// Reject input that can never form a valid record.
    pub fn validate(&self) -> Result<()> {
        if self.registration.trim().is_empty() {
            return Err(FleetError::BadRequest("registration must not be empty".into()));
        }
        Ok(())
    }
}

/// Availability state of a single car.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CarState {
    Available,
    Rented,
}

impl CarState {
    pub fn from_available(available: bool) -> Self {
        if available { CarState::Available } else { CarState::Rented }
    }

    pub fn is_available(self) -> bool {
        self == CarState::Available
    }
}

impl fmt::Display for CarState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CarState::Available => f.write_str("available"),
            CarState::Rented => f.write_str("rented"),
        }
    }
}
