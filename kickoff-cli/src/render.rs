//! Text and JSON output for recommendation results.

use anyhow::Result;
use chrono_tz::Tz;
use kickoff_core::{GroupingUpdate, Recommendation, TripGroup, TripWithDriver};
use serde::Serialize;

use crate::time::format_local;

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn trip_line(trip: &TripWithDriver, tz: Tz) -> String {
    let driver = trip.driver.full_name.as_deref().unwrap_or(trip.driver.id.as_str());
    format!(
        "{} | {} | {} | driver {} | seats {}",
        trip.id,
        trip.departure_location,
        format_local(trip.departure_time, tz),
        driver,
        trip.available_seats
    )
}

pub fn recommendation_lines(recs: &[Recommendation<'_>], tz: Tz) -> Vec<String> {
    let mut out = Vec::new();
    for (i, rec) in recs.iter().enumerate() {
        out.push(format!("{:>2}. [{:>3}] {}", i + 1, rec.score, trip_line(rec.trip, tz)));
        if !rec.matched_criteria.is_empty() {
            out.push(format!("           {}", rec.matched_criteria.join(", ")));
        }
    }
    out
}

pub fn group_lines(groups: &[TripGroup]) -> Vec<String> {
    groups
        .iter()
        .enumerate()
        .map(|(i, g)| {
            let ids: Vec<&str> = g.ids().iter().map(|id| id.as_str()).collect();
            let seed = g.seed().map(|id| id.as_str()).unwrap_or("-");
            format!("Group {} (seed {}): {}", i + 1, seed, ids.join(", "))
        })
        .collect()
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoGroupReport<'a> {
    pub groups: &'a [TripGroup],
    pub updates: &'a [GroupingUpdate],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub written_to: Option<String>,
}
