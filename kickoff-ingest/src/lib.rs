//! kickoff-ingest: loading trip/user snapshots exported by the trips API.

pub mod parsers;
pub mod types;

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

pub use parsers::csv_export::{parse_csv_snapshot, parse_trips_csv, parse_users_csv};
pub use parsers::json_snapshot::{parse_snapshot_json, render_snapshot_json};
pub use parsers::{normalize_user, parse_interest_list};
pub use types::{DriverField, RawTrip, Snapshot};

/// Read a JSON snapshot from disk.
pub fn load_snapshot(path: impl AsRef<Path>) -> Result<Snapshot> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    parse_snapshot_json(&text).with_context(|| format!("parse {}", path.display()))
}

/// Read a users CSV and a trips CSV from disk.
pub fn load_csv_snapshot(users: impl AsRef<Path>, trips: impl AsRef<Path>) -> Result<Snapshot> {
    let (users, trips) = (users.as_ref(), trips.as_ref());
    let users_file = fs::File::open(users).with_context(|| format!("open {}", users.display()))?;
    let trips_file = fs::File::open(trips).with_context(|| format!("open {}", trips.display()))?;
    parse_csv_snapshot(users_file, trips_file)
        .with_context(|| format!("parse {} + {}", users.display(), trips.display()))
}

/// Write a snapshot as pretty JSON.
pub fn write_snapshot(path: impl AsRef<Path>, snapshot: &Snapshot) -> Result<()> {
    let path = path.as_ref();
    let text = render_snapshot_json(snapshot)?;
    fs::write(path, text).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}
