// This software is provided for non-commercial use only.
// Commercial use is strictly prohibited.
// If you use, modify, or redistribute this software, you must provide proper attribution to the original author.
// (c) 2026 Onur Tuna. All rights reserved.

//! SQLite-backed fleet registry.
//!
//! Every operation is a round trip to the store; nothing is cached in
//! process. The mutex only makes the single connection shareable between
//! request workers. Invariants live in the database:
//!
//! - registration uniqueness is the unique index, checked at insert time
//! - rent/return are conditional updates on the current `available` value,
//!   so of two concurrent rents of one car exactly one changes a row

use std::path::{Path, PathBuf};
use std::time::Duration;

use parking_lot::Mutex;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, TransactionBehavior};
use tracing::{debug, info};

use crate::config::DatabaseConfig;
use crate::error::{FleetError, Result};
use crate::registry::car::{Car, CarState, NewCar, CAR_COLUMNS};
use crate::registry::schema;

/// Handle to the car store. Cheap to share behind an `Arc`.
pub struct FleetRegistry {
    conn: Mutex<Connection>,
    path: PathBuf,
}

impl FleetRegistry {
    /// Open (creating if absent) the database described by `config` and
    /// bootstrap its schema.
    pub fn open(config: &DatabaseConfig) -> Result<Self> {
        config.check_busy_timeout()?;
        if let Some(parent) = config.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(&config.path)?;
        conn.busy_timeout(Duration::from_millis(config.busy_timeout_ms))?;
        schema::bootstrap(&conn)?;
        info!(path = ?config.path, "Fleet store ready");
        Ok(Self { conn: Mutex::new(conn), path: config.path.clone() })
    }

    /// Open a private in-memory store.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        schema::bootstrap(&conn)?;
        Ok(Self { conn: Mutex::new(conn), path: PathBuf::from(":memory:") })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All cars currently available, in store order.
    pub fn list_available(&self) -> Result<Vec<Car>> {
        let conn = self.conn.lock();
        let mut stmt =
            conn.prepare(&format!("SELECT {CAR_COLUMNS} FROM cars WHERE available = 1"))?;
        let cars = stmt
            .query_map([], Car::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        debug!(count = cars.len(), "Listed available cars");
        Ok(cars)
    }

    /// Register a new car. It always starts available.
    ///
    /// A registration already in the store is reported by the unique index
    /// and surfaces as [`FleetError::DuplicateRegistration`].
    pub fn add_car(&self, new_car: &NewCar) -> Result<Car> {
        new_car.validate()?;
        let conn = self.conn.lock();
        conn.query_row(
            &format!(
                "INSERT INTO cars (model, registration, mileage, available) \
                 VALUES (?1, ?2, ?3, 1) RETURNING {CAR_COLUMNS}"
            ),
            params![new_car.model, new_car.registration, new_car.mileage],
            Car::from_row,
        )
        .map_err(|e| {
            if is_unique_violation(&e) {
                FleetError::DuplicateRegistration { registration: new_car.registration.clone() }
            } else {
                FleetError::Store(e)
            }
        })
    }

    /// Move an available car to rented.
    pub fn rent_car(&self, registration: &str) -> Result<Car> {
        self.transition(registration, CarState::Rented)
    }

    /// Move a rented car back to available.
    pub fn return_car(&self, registration: &str) -> Result<Car> {
        self.transition(registration, CarState::Available)
    }

    /// Total number of car records, whatever their state.
    pub fn count(&self) -> Result<usize> {
        let conn = self.conn.lock();
        let n: i64 = conn.query_row("SELECT COUNT(*) FROM cars", [], |r| r.get(0))?;
        Ok(usize::try_from(n).unwrap_or_default())
    }

    /// Flip `registration` into `target`, only from the opposite state.
    ///
    /// When nothing changed, the follow-up lookup runs in the same
    /// transaction so the reported cause matches the row that was seen.
    fn transition(&self, registration: &str, target: CarState) -> Result<Car> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let updated = tx
            .query_row(
                &format!(
                    "UPDATE cars SET available = ?1 \
                     WHERE registration = ?2 AND available = ?3 RETURNING {CAR_COLUMNS}"
                ),
                params![target.is_available(), registration, !target.is_available()],
                Car::from_row,
            )
            .optional()?;

        if let Some(car) = updated {
            tx.commit()?;
            return Ok(car);
        }

        let current: Option<bool> = tx
            .query_row(
                "SELECT available FROM cars WHERE registration = ?1",
                [registration],
                |r| r.get(0),
            )
            .optional()?;

        match current {
            None => Err(FleetError::CarNotFound { registration: registration.to_string() }),
            Some(available) => Err(FleetError::InvalidTransition {
                registration: registration.to_string(),
                state: CarState::from_available(available),
            }),
        }
    }
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == ErrorCode::ConstraintViolation
                && e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}
