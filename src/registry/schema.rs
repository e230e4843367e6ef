//! Car table DDL. Safe to run on every start.

use rusqlite::Connection;

use crate::error::Result;

/// The unique index on `registration` also covers tables created before the
/// constraint existed; it fails if such a table already holds duplicates.
pub const CAR_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS cars (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    model        TEXT    NOT NULL,
    registration TEXT    NOT NULL,
    mileage      INTEGER NOT NULL CHECK (mileage >= 0),
    available    INTEGER NOT NULL DEFAULT 1 CHECK (available IN (0, 1))
);

CREATE UNIQUE INDEX IF NOT EXISTS idx_cars_registration
    ON cars(registration);
"#;

/// Ensure the car table exists.
pub fn bootstrap(conn: &Connection) -> Result<()> {
    conn.execute_batch(CAR_SCHEMA)?;
    Ok(())
}
