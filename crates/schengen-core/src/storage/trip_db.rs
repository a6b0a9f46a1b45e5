//! SQLite-based storage for travel intervals.

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

use super::data_dir;
use crate::error::DatabaseError;
use crate::trip::TravelInterval;

const DATE_FMT: &str = "%Y-%m-%d";

/// Parse a stored `YYYY-MM-DD` column value.
fn parse_date(column: &str, value: &str) -> Result<NaiveDate, DatabaseError> {
    NaiveDate::parse_from_str(value, DATE_FMT).map_err(|e| DatabaseError::Corrupt {
        column: column.to_string(),
        message: e.to_string(),
    })
}

/// Parse an RFC3339 timestamp with fallback to the current time.
fn parse_datetime_fallback(value: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

fn row_to_interval(row: &rusqlite::Row) -> Result<TravelInterval, rusqlite::Error> {
    let start_str: String = row.get(2)?;
    let end_str: Option<String> = row.get(3)?;
    let created_str: String = row.get(4)?;
    let updated_str: String = row.get(5)?;

    let as_sql_err = |e: DatabaseError| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
    };

    Ok(TravelInterval {
        id: row.get(0)?,
        zone_code: row.get(1)?,
        start_date: parse_date("start_date", &start_str).map_err(as_sql_err)?,
        end_date: end_str
            .map(|s| parse_date("end_date", &s).map_err(as_sql_err))
            .transpose()?,
        created_at: parse_datetime_fallback(&created_str),
        updated_at: parse_datetime_fallback(&updated_str),
    })
}

/// Trip storage over SQLite.
pub struct TripDb {
    conn: Connection,
}

impl TripDb {
    /// Open (and migrate) the database in the data directory.
    pub fn open() -> Result<Self, DatabaseError> {
        let path = data_dir()
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?
            .join("trips.db");
        Self::open_at(&path)
    }

    /// Open a database at a specific path (for testing).
    pub fn open_at(path: &Path) -> Result<Self, DatabaseError> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.init_schema()?;
        Ok(db)
    }

    fn init_schema(&self) -> Result<(), DatabaseError> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS trips (
                id         TEXT PRIMARY KEY,
                zone_code  TEXT NOT NULL,
                start_date TEXT NOT NULL,
                end_date   TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_trips_start_date ON trips(start_date);",
        )?;
        Ok(())
    }

    /// Insert a new trip.
    pub fn insert(&self, trip: &TravelInterval) -> Result<(), DatabaseError> {
        self.conn.execute(
            "INSERT INTO trips (id, zone_code, start_date, end_date, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                trip.id,
                trip.zone_code,
                trip.start_date.format(DATE_FMT).to_string(),
                trip.end_date.map(|d| d.format(DATE_FMT).to_string()),
                trip.created_at.to_rfc3339(),
                trip.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Update an existing trip's zone and dates, bumping `updated_at`.
    pub fn update(&self, trip: &TravelInterval) -> Result<(), DatabaseError> {
        let changed = self.conn.execute(
            "UPDATE trips SET zone_code = ?2, start_date = ?3, end_date = ?4, updated_at = ?5
             WHERE id = ?1",
            params![
                trip.id,
                trip.zone_code,
                trip.start_date.format(DATE_FMT).to_string(),
                trip.end_date.map(|d| d.format(DATE_FMT).to_string()),
                Utc::now().to_rfc3339(),
            ],
        )?;
        if changed == 0 {
            return Err(DatabaseError::TripNotFound(trip.id.clone()));
        }
        Ok(())
    }

    /// Delete a trip by id.
    pub fn delete(&self, id: &str) -> Result<(), DatabaseError> {
        let changed = self
            .conn
            .execute("DELETE FROM trips WHERE id = ?1", params![id])?;
        if changed == 0 {
            return Err(DatabaseError::TripNotFound(id.to_string()));
        }
        Ok(())
    }

    /// Fetch a trip by id.
    pub fn get(&self, id: &str) -> Result<Option<TravelInterval>, DatabaseError> {
        let trip = self
            .conn
            .query_row(
                "SELECT id, zone_code, start_date, end_date, created_at, updated_at
                 FROM trips WHERE id = ?1",
                params![id],
                row_to_interval,
            )
            .optional()?;
        Ok(trip)
    }

    /// All trips ordered by start date.
    pub fn list(&self) -> Result<Vec<TravelInterval>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, zone_code, start_date, end_date, created_at, updated_at
             FROM trips ORDER BY start_date ASC",
        )?;
        let rows = stmt.query_map([], row_to_interval)?;
        let mut trips = Vec::new();
        for row in rows {
            trips.push(row?);
        }
        Ok(trips)
    }
}
