//! Grouping write-back plan.
//!
//! Auto-grouping only returns trip ids. Persisting the decision means marking
//! every member as grouped and pointing it at the other members; this module
//! turns groups into those per-trip updates and applies them to in-memory
//! trips.

use std::collections::HashSet;

use serde::Serialize;

use crate::clustering::TripGroup;
use crate::error::EngineError;
use crate::model::{Trip, TripId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupingUpdate {
    pub trip_id: TripId,
    /// Every other member of the group, in group order.
    pub grouped_with: Vec<TripId>,
}

impl GroupingUpdate {
    pub fn apply<D>(&self, trip: &mut Trip<D>) {
        trip.is_grouped = true;
        trip.grouped_with = self.grouped_with.clone();
    }
}

/// One update per member of every group.
pub fn plan_write_back(groups: &[TripGroup]) -> Result<Vec<GroupingUpdate>, EngineError> {
    let mut seen: HashSet<&TripId> = HashSet::new();
    let mut updates = Vec::new();

    for group in groups {
        if group.len() < 2 {
            return Err(EngineError::GroupTooSmall { size: group.len() });
        }
        for id in group.ids() {
            if !seen.insert(id) {
                return Err(EngineError::DuplicateTrip(id.clone()));
            }
            updates.push(GroupingUpdate {
                trip_id: id.clone(),
                grouped_with: group.ids().iter().filter(|other| *other != id).cloned().collect(),
            });
        }
    }

    Ok(updates)
}

/// Apply updates in place. Nothing is modified if any update is unknown.
pub fn apply_write_back<D>(trips: &mut [Trip<D>], updates: &[GroupingUpdate]) -> Result<(), EngineError> {
    let mut targets = Vec::with_capacity(updates.len());
    for update in updates {
        let Some(index) = trips.iter().position(|t| t.id == update.trip_id) else {
            return Err(EngineError::UnknownTrip(update.trip_id.clone()));
        };
        targets.push(index);
    }

    for (update, index) in updates.iter().zip(targets) {
        update.apply(&mut trips[index]);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TripRef;
    use chrono::{TimeZone, Utc};

    fn group(ids: &[&str]) -> TripGroup {
        TripGroup(ids.iter().map(|id| TripId::new(*id)).collect())
    }

    fn trip(id: &str) -> TripRef {
        TripRef::new(id, "d", "m", "Derby", Utc.with_ymd_and_hms(2026, 9, 1, 18, 0, 0).unwrap())
    }

    #[test]
    fn test_plan_points_members_at_each_other() {
        let updates = plan_write_back(&[group(&["a", "b", "c"])]).unwrap();
        assert_eq!(updates.len(), 3);
        assert_eq!(updates[1].trip_id, TripId::new("b"));
        assert_eq!(updates[1].grouped_with, vec![TripId::new("a"), TripId::new("c")]);
    }

    #[test]
    fn test_plan_rejects_small_and_overlapping_groups() {
        assert_eq!(
            plan_write_back(&[group(&["a"])]),
            Err(EngineError::GroupTooSmall { size: 1 })
        );
        assert_eq!(
            plan_write_back(&[group(&["a", "b"]), group(&["c", "a"])]),
            Err(EngineError::DuplicateTrip(TripId::new("a")))
        );
    }

    #[test]
    fn test_apply_write_back() {
        let mut trips = vec![trip("a"), trip("b"), trip("c")];
        let updates = plan_write_back(&[group(&["c", "a"])]).unwrap();
        apply_write_back(&mut trips, &updates).unwrap();

        assert!(trips[0].is_grouped);
        assert_eq!(trips[0].grouped_with, vec![TripId::new("c")]);
        assert!(!trips[1].is_grouped);
        assert_eq!(trips[2].grouped_with, vec![TripId::new("a")]);
    }

    /// Regression test: an unknown id leaves every trip untouched.
    #[test]
    fn test_apply_unknown_trip_is_atomic() {
        let mut trips = vec![trip("a"), trip("b")];
        let updates = plan_write_back(&[group(&["a", "zz"])]).unwrap();
        assert_eq!(
            apply_write_back(&mut trips, &updates),
            Err(EngineError::UnknownTrip(TripId::new("zz")))
        );
        assert!(trips.iter().all(|t| !t.is_grouped));
    }
}
