//! Candidate pools for the recommendation workflows.
//!
//! The engine assumes its inputs were already narrowed down; these helpers
//! are that narrowing, applied by callers to a freshly loaded trip set.

use chrono::{DateTime, Utc};

use crate::model::{DriverSlot, MatchId, Trip, TripStatus, User};

/// Other live trips for the same match as `target`.
pub fn grouping_candidates<'a, D, E>(target: &Trip<D>, trips: &'a [Trip<E>]) -> Vec<&'a Trip<E>> {
    trips
        .iter()
        .filter(|t| t.id != target.id)
        .filter(|t| t.status != TripStatus::Cancelled)
        .filter(|t| t.match_id == target.match_id)
        .collect()
}

/// Trips `user` could still join.
///
/// With `match_id` only that match's trips are kept; without it only trips
/// departing at or after `now`.
pub fn joinable_trips<'a, D: DriverSlot>(
    user: &User,
    trips: &'a [Trip<D>],
    match_id: Option<&MatchId>,
    now: DateTime<Utc>,
) -> Vec<&'a Trip<D>> {
    trips
        .iter()
        .filter(|t| t.driver_id() != &user.id)
        .filter(|t| !t.has_passenger(&user.id))
        .filter(|t| t.available_seats > 0)
        .filter(|t| t.status.is_open())
        .filter(|t| match match_id {
            Some(m) => &t.match_id == m,
            None => t.departure_time >= now,
        })
        .collect()
}

/// Ungrouped, live trips of one match, as fed to auto-grouping.
pub fn autogroup_pool<'a, D>(trips: &'a [Trip<D>], match_id: &MatchId) -> Vec<&'a Trip<D>> {
    trips
        .iter()
        .filter(|t| &t.match_id == match_id)
        .filter(|t| t.status != TripStatus::Cancelled)
        .filter(|t| !t.is_grouped)
        .collect()
}
