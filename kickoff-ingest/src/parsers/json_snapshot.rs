//! JSON snapshot parser.
//!
//! Expected shape, as exported from the trips API:
//!
//! ```json
//! { "users": [ { "_id": "u1", "favouriteTeam": "Arsenal", ... } ],
//!   "trips": [ { "_id": "t1", "driver": "u1", "match": "m1", ... },
//!              { "_id": "t2", "driver": { "_id": "u2", ... }, ... } ] }
//! ```
//!
//! A trip's `driver` is either an id into `users` or an embedded user.

use std::collections::BTreeMap;

use anyhow::{bail, Context, Result};
use kickoff_core::{TripRef, User, UserId};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::normalize_user;
use crate::types::{DriverField, RawTrip, Snapshot};

#[derive(Debug, Deserialize)]
struct RawSnapshot {
    #[serde(default)]
    users: Vec<User>,
    #[serde(default)]
    trips: Vec<RawTrip>,
}

/// On-disk form written back by [`render_snapshot_json`].
#[derive(Debug, Serialize)]
struct SnapshotFile<'a> {
    users: Vec<&'a User>,
    trips: &'a [TripRef],
}

pub fn parse_snapshot_json(text: &str) -> Result<Snapshot> {
    let raw: RawSnapshot = serde_json::from_str(text).context("parse snapshot JSON")?;

    let mut users: BTreeMap<UserId, User> = BTreeMap::new();
    for user in raw.users {
        insert_user(&mut users, normalize_user(user))?;
    }

    let mut trips = Vec::with_capacity(raw.trips.len());
    for trip in raw.trips {
        let driver_id = trip.driver.id().clone();
        if let DriverField::Populated(user) = &trip.driver {
            insert_user(&mut users, normalize_user(user.clone()))
                .with_context(|| format!("embedded driver of trip {}", trip.id))?;
        }
        let mut trip = trip.with_driver_slot(driver_id);
        trip.departure_location = trip.departure_location.trim().to_string();
        trips.push(trip);
    }

    debug!(users = users.len(), trips = trips.len(), "parsed JSON snapshot");
    Ok(Snapshot { users, trips })
}

pub fn render_snapshot_json(snapshot: &Snapshot) -> Result<String> {
    let file = SnapshotFile {
        users: snapshot.users.values().collect(),
        trips: &snapshot.trips,
    };
    serde_json::to_string_pretty(&file).context("serialize snapshot")
}

fn insert_user(users: &mut BTreeMap<UserId, User>, user: User) -> Result<()> {
    match users.get(&user.id) {
        Some(existing) if existing != &user => {
            bail!("conflicting records for user {}", user.id)
        }
        Some(_) => Ok(()),
        None => {
            users.insert(user.id.clone(), user);
            Ok(())
        }
    }
}
