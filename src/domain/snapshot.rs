//! Snapshot timestamps for versioned rows
//!
//! Every run stamps the rows it extracts with one [`SnapshotDate`]. Together
//! with the record `id` it forms the primary key of both entity tables, so a
//! new run appends a new version of each record instead of overwriting it.

use chrono::{DateTime, NaiveDateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Name of the snapshot column in every persisted table
pub const SNAPSHOT_COLUMN: &str = "snapshot_date";

const SQL_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Extraction timestamp, UTC, truncated to microseconds
///
/// DuckDB `TIMESTAMP` values have microsecond precision, so the value is
/// truncated on construction. A snapshot written and read back compares equal.
///
/// # Examples
///
/// ```
/// use orderflow::domain::SnapshotDate;
/// use std::str::FromStr;
///
/// let snapshot = SnapshotDate::from_str("2024-05-01 12:30:00.250000").unwrap();
/// assert_eq!(snapshot.to_sql_string(), "2024-05-01 12:30:00.250000");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SnapshotDate(DateTime<Utc>);

impl SnapshotDate {
    /// Snapshot for the current instant
    pub fn now() -> Self {
        Self::from_datetime(Utc::now())
    }

    /// Snapshot for a given instant
    pub fn from_datetime(datetime: DateTime<Utc>) -> Self {
        let micros = datetime.nanosecond() / 1_000 * 1_000;
        Self(datetime.with_nanosecond(micros).unwrap_or(datetime))
    }

    /// The underlying UTC timestamp
    pub fn as_datetime(&self) -> DateTime<Utc> {
        self.0
    }

    /// Literal accepted by DuckDB when cast to `TIMESTAMP`
    pub fn to_sql_string(&self) -> String {
        self.0.format(SQL_FORMAT).to_string()
    }
}

impl fmt::Display for SnapshotDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_sql_string())
    }
}

impl FromStr for SnapshotDate {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Ok(Self::from_datetime(dt.with_timezone(&Utc)));
        }
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f")
            .map(|naive| Self::from_datetime(naive.and_utc()))
            .map_err(|e| format!("Invalid snapshot timestamp '{s}': {e}"))
    }
}
