//! CSV exports of users and trips.
//!
//! Users:
//!   id,full_name,favourite_team,supporter_group,region,city,entry_center,interests
//!   u1,Ann Lee,Arsenal,Ashburton Army,London,Islington,Clock End,"music; beer"
//!
//! Trips (the last four columns may be omitted; list cells split like interests):
//!   id,driver,match,departure_location,departure_time,available_seats,status,is_grouped,created_at,passengers,grouped_with
//!   t1,u1,m1,Highbury,2026-03-14T12:00:00Z,3,pending,false,2026-03-01T09:00:00Z,u4;u7,

use std::collections::BTreeMap;
use std::io::Read;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use kickoff_core::{MatchId, TripId, TripRef, TripStatus, User, UserId};
use serde::Deserialize;
use tracing::debug;

use super::{normalize_user, InterestSplitter};
use crate::types::Snapshot;

#[derive(Debug, Deserialize)]
struct UserRow {
    id: String,
    #[serde(default)]
    full_name: Option<String>,
    #[serde(default)]
    favourite_team: Option<String>,
    #[serde(default)]
    supporter_group: Option<String>,
    #[serde(default)]
    region: Option<String>,
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    entry_center: Option<String>,
    #[serde(default)]
    interests: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TripRow {
    id: String,
    driver: String,
    #[serde(rename = "match")]
    match_id: String,
    departure_location: String,
    departure_time: DateTime<Utc>,
    available_seats: u32,
    status: TripStatus,
    #[serde(default)]
    is_grouped: Option<bool>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    passengers: Option<String>,
    #[serde(default)]
    grouped_with: Option<String>,
}

pub fn parse_users_csv<R: Read>(reader: R) -> Result<Vec<User>> {
    let splitter = InterestSplitter::new()?;
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

    let mut out = Vec::new();
    for (line, row) in rdr.deserialize::<UserRow>().enumerate() {
        let row = row.with_context(|| format!("users row {}", line + 1))?;
        let user = User {
            id: UserId::new(row.id),
            full_name: row.full_name,
            favourite_team: row.favourite_team,
            supporter_group: row.supporter_group,
            region: row.region,
            city: row.city,
            entry_center: row.entry_center,
            interests: row.interests.map(|s| splitter.split(&s)).unwrap_or_default(),
        };
        out.push(normalize_user(user));
    }
    Ok(out)
}

pub fn parse_trips_csv<R: Read>(reader: R) -> Result<Vec<TripRef>> {
    let splitter = InterestSplitter::new()?;
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

    let mut out = Vec::new();
    for (line, row) in rdr.deserialize::<TripRow>().enumerate() {
        let row = row.with_context(|| format!("trips row {}", line + 1))?;
        out.push(TripRef {
            id: TripId::new(row.id),
            driver: UserId::new(row.driver),
            match_id: MatchId::new(row.match_id),
            departure_location: row.departure_location,
            departure_time: row.departure_time,
            available_seats: row.available_seats,
            passengers: split_cell(&splitter, row.passengers.as_deref())
                .into_iter()
                .map(UserId::new)
                .collect(),
            status: row.status,
            is_grouped: row.is_grouped.unwrap_or(false),
            grouped_with: split_cell(&splitter, row.grouped_with.as_deref())
                .into_iter()
                .map(TripId::new)
                .collect(),
            created_at: row.created_at,
        });
    }
    Ok(out)
}

fn split_cell(splitter: &InterestSplitter, cell: Option<&str>) -> Vec<String> {
    cell.map(|c| splitter.split(c)).unwrap_or_default()
}

/// Combine a users export and a trips export into one snapshot.
pub fn parse_csv_snapshot<U: Read, T: Read>(users: U, trips: T) -> Result<Snapshot> {
    let mut table = BTreeMap::new();
    for user in parse_users_csv(users)? {
        if table.contains_key(&user.id) {
            bail!("duplicate user id {} in users export", user.id);
        }
        table.insert(user.id.clone(), user);
    }
    let trips = parse_trips_csv(trips)?;

    debug!(users = table.len(), trips = trips.len(), "parsed CSV snapshot");
    Ok(Snapshot { users: table, trips })
}

#[cfg(test)]
mod tests {
    use super::*;

    const USERS: &str = "\
id,full_name,favourite_team,supporter_group,region,city,entry_center,interests
u1,Ann Lee,Arsenal,Ashburton Army,London,Islington,Clock End,\"music; beer,darts\"
u2,Bo Chen,Arsenal,,London,,,
";

    const TRIPS: &str = "\
id,driver,match,departure_location,departure_time,available_seats,status,is_grouped,created_at
t1,u1,m1,Highbury,2026-03-14T12:00:00Z,3,pending,false,2026-03-01T09:00:00Z
t2,u2,m1, highbury ,2026-03-14T12:20:00Z,0,confirmed,,
";

    #[test]
    fn test_parse_users_csv() {
        let users = parse_users_csv(USERS.as_bytes()).unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users[0].interests, vec!["music", "beer", "darts"]);
        assert_eq!(users[1].supporter_group, None);
        assert!(users[1].interests.is_empty());
    }

    #[test]
    fn test_parse_trips_csv() {
        let trips = parse_trips_csv(TRIPS.as_bytes()).unwrap();
        assert_eq!(trips.len(), 2);
        assert_eq!(trips[1].departure_location, "highbury");
        assert_eq!(trips[1].status, TripStatus::Confirmed);
        assert_eq!(trips[1].available_seats, 0);
        assert!(!trips[1].is_grouped);
        assert_eq!(trips[1].created_at, None);
        assert!(trips[0].created_at.is_some());
    }

    /// Regression test: riders listed in the export are not offered their own trip again.
    #[test]
    fn test_passengers_column_feeds_joinable_filter() {
        let text = "\
id,driver,match,departure_location,departure_time,available_seats,status,is_grouped,created_at,passengers,grouped_with
t1,u1,m1,Highbury,2026-03-14T12:00:00Z,3,pending,true,,u2; u9,t3
t3,u1,m1,Highbury,2026-03-14T12:10:00Z,2,pending,true,,,t1
t4,u9,m1,Holloway,2026-03-14T12:30:00Z,1,pending,,,,
";
        let trips = parse_trips_csv(text.as_bytes()).unwrap();
        assert_eq!(trips[0].passengers, vec![UserId::new("u2"), UserId::new("u9")]);
        assert_eq!(trips[0].grouped_with, vec![TripId::new("t3")]);
        assert!(trips[2].passengers.is_empty());

        let users = parse_users_csv(USERS.as_bytes()).unwrap();
        let now = "2026-03-01T00:00:00Z".parse().unwrap();
        let joinable = kickoff_core::joinable_trips(&users[1], &trips, Some(&MatchId::new("m1")), now);
        let ids: Vec<&str> = joinable.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["t3", "t4"]);
    }

    #[test]
    fn test_bad_status_reports_row() {
        let text = "\
id,driver,match,departure_location,departure_time,available_seats,status
t1,u1,m1,Highbury,2026-03-14T12:00:00Z,3,postponed
";
        let err = parse_trips_csv(text.as_bytes()).unwrap_err();
        assert!(format!("{err:#}").contains("trips row 1"));
    }

    #[test]
    fn test_csv_snapshot_populates() {
        let snapshot = parse_csv_snapshot(USERS.as_bytes(), TRIPS.as_bytes()).unwrap();
        let trips = snapshot.populated().unwrap();
        assert_eq!(trips[0].driver.full_name.as_deref(), Some("Ann Lee"));
    }
}
