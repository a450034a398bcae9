//! Trip-to-trip compatibility scoring and the grouping decision.
//!
//! Additive model: every criterion that matches contributes a fixed weight,
//! interests contribute linearly up to a cap, and the sum is clamped to
//! `max_score`.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::model::{Trip, TripWithDriver, User};
use crate::text::{same_optional, same_text, shared_interest_count};

/// Score at or above which two trips are suggested together.
pub const DEFAULT_GROUPING_THRESHOLD: u32 = 70;

pub const SAME_DEPARTURE_LOCATION: &str = "Same departure location";
pub const SIMILAR_DEPARTURE_TIME: &str = "Similar departure time";
pub const SAME_FAVOURITE_TEAM: &str = "Same favourite team";
pub const SAME_SUPPORTER_GROUP: &str = "Same supporter group";
pub const SAME_REGION: &str = "Same region";
pub const SAME_CITY: &str = "Same city";
pub const SAME_ENTRY_CENTER: &str = "Same entry center";

/// `"<N> shared interest(s)"`; callers only emit it for `n > 0`.
pub fn shared_interests_label(n: usize) -> String {
    format!("{n} shared interest(s)")
}

/// Weights of the trip-to-trip model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompatibilityWeights {
    pub same_departure_location: u32,
    pub similar_departure_time: u32,
    /// Departure times at most this far apart count as similar (inclusive).
    pub departure_window_minutes: i64,
    pub same_match: u32,
    pub same_favourite_team: u32,
    /// Points per shared interest.
    pub per_shared_interest: u32,
    /// Cap on the interest contribution.
    pub max_interest_score: u32,
    pub same_supporter_group: u32,
    pub same_region: u32,
    pub max_score: u32,
}

impl Default for CompatibilityWeights {
    fn default() -> Self {
        Self {
            same_departure_location: 20,
            similar_departure_time: 15,
            departure_window_minutes: 30,
            same_match: 25,
            same_favourite_team: 10,
            per_shared_interest: 2,
            max_interest_score: 10,
            same_supporter_group: 10,
            same_region: 10,
            max_score: 100,
        }
    }
}

/// `score >= threshold`.
pub fn should_group(score: u32, threshold: u32) -> bool {
    score >= threshold
}

/// Scores two trips (and their drivers) for likely compatibility.
#[derive(Debug, Clone, Default)]
pub struct CompatibilityScorer {
    weights: CompatibilityWeights,
}

impl CompatibilityScorer {
    pub fn new(weights: CompatibilityWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &CompatibilityWeights {
        &self.weights
    }

    /// Score two trips with loaded drivers, in `[0, max_score]`.
    pub fn score(&self, a: &TripWithDriver, b: &TripWithDriver) -> u32 {
        self.score_parts(a, b, &a.driver, &b.driver)
    }

    /// Score two trips against explicitly supplied drivers.
    pub fn score_parts<D, E>(&self, trip_a: &Trip<D>, trip_b: &Trip<E>, driver_a: &User, driver_b: &User) -> u32 {
        let w = &self.weights;
        let mut score = 0u32;

        if same_text(&trip_a.departure_location, &trip_b.departure_location) {
            score = score.saturating_add(w.same_departure_location);
        }
        if self.departs_close(trip_a.departure_time, trip_b.departure_time) {
            score = score.saturating_add(w.similar_departure_time);
        }
        if trip_a.match_id == trip_b.match_id {
            score = score.saturating_add(w.same_match);
        }
        if same_optional(driver_a.favourite_team.as_deref(), driver_b.favourite_team.as_deref()) {
            score = score.saturating_add(w.same_favourite_team);
        }

        let shared = shared_interest_count(&driver_a.interests, &driver_b.interests);
        score = score.saturating_add(interest_score(shared, w.per_shared_interest, w.max_interest_score));

        if same_optional(driver_a.supporter_group.as_deref(), driver_b.supporter_group.as_deref()) {
            score = score.saturating_add(w.same_supporter_group);
        }
        if same_optional(driver_a.region.as_deref(), driver_b.region.as_deref()) {
            score = score.saturating_add(w.same_region);
        }

        let score = score.min(w.max_score);
        trace!(trip_a = %trip_a.id, trip_b = %trip_b.id, score, "scored trip pair");
        score
    }

    /// Human-readable list of the criteria that matched.
    ///
    /// Re-checks each criterion rather than deriving from the score. Same match
    /// is not listed since candidates are normally drawn from one match.
    pub fn matched_criteria(&self, a: &TripWithDriver, b: &TripWithDriver) -> Vec<String> {
        let (da, db) = (&a.driver, &b.driver);
        let mut out = Vec::new();

        if same_text(&a.departure_location, &b.departure_location) {
            out.push(SAME_DEPARTURE_LOCATION.to_string());
        }
        if self.departs_close(a.departure_time, b.departure_time) {
            out.push(SIMILAR_DEPARTURE_TIME.to_string());
        }
        if same_optional(da.favourite_team.as_deref(), db.favourite_team.as_deref()) {
            out.push(SAME_FAVOURITE_TEAM.to_string());
        }
        if same_optional(da.supporter_group.as_deref(), db.supporter_group.as_deref()) {
            out.push(SAME_SUPPORTER_GROUP.to_string());
        }
        if same_optional(da.region.as_deref(), db.region.as_deref()) {
            out.push(SAME_REGION.to_string());
        }
        let shared = shared_interest_count(&da.interests, &db.interests);
        if shared > 0 {
            out.push(shared_interests_label(shared));
        }

        out
    }

    fn departs_close(&self, a: DateTime<Utc>, b: DateTime<Utc>) -> bool {
        (a - b).abs() <= Duration::minutes(self.weights.departure_window_minutes)
    }
}

/// `min(shared * per_interest, cap)`, saturating.
pub(crate) fn interest_score(shared: usize, per_interest: u32, cap: u32) -> u32 {
    let shared = u32::try_from(shared).unwrap_or(u32::MAX);
    shared.saturating_mul(per_interest).min(cap)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TripRef;
    use chrono::TimeZone;

    fn kickoff() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, 12, 0, 0).unwrap()
    }

    fn trip(id: &str, location: &str, offset_min: i64, driver: User) -> TripWithDriver {
        TripRef::new(id, driver.id.as_str(), "m1", location, kickoff() + Duration::minutes(offset_min))
            .with_driver_slot(driver)
    }

    #[test]
    fn test_full_match_scores_one_hundred() {
        let d = |id: &str| {
            User::new(id)
                .with_team("Celtic")
                .with_supporter_group("Green Brigade")
                .with_region("Glasgow")
                .with_interests(["a", "b", "c", "d", "e"])
        };
        let a = trip("t1", "Parkhead", 0, d("u1"));
        let b = trip("t2", "parkhead", 5, d("u2"));
        assert_eq!(CompatibilityScorer::default().score(&a, &b), 100);
    }

    /// Regression test: the clamp holds even if weights are retuned upward.
    #[test]
    fn test_score_is_clamped_to_max() {
        let weights = CompatibilityWeights {
            same_match: 90,
            same_departure_location: 90,
            ..CompatibilityWeights::default()
        };
        let scorer = CompatibilityScorer::new(weights);
        let a = trip("t1", "York", 0, User::new("u1"));
        let b = trip("t2", "York", 0, User::new("u2"));
        assert_eq!(scorer.score(&a, &b), 100);
    }

    #[test]
    fn test_departure_window_is_inclusive() {
        let scorer = CompatibilityScorer::default();
        let a = trip("t1", "Bristol", 0, User::new("u1"));
        let edge = trip("t2", "Bath", 30, User::new("u2"));
        let past = trip("t3", "Bath", 31, User::new("u3"));
        // same match + time window
        assert_eq!(scorer.score(&a, &edge), 40);
        assert_eq!(scorer.score(&a, &past), 25);
    }

    /// Regression test: sub-second offsets past the window do not count as close.
    #[test]
    fn test_departure_window_counts_milliseconds() {
        let scorer = CompatibilityScorer::default();
        let a = trip("t1", "Bristol", 0, User::new("u1"));
        let mut late = trip("t2", "Bath", 30, User::new("u2"));
        late.match_id = "m2".into();
        late.departure_time += Duration::milliseconds(1);
        assert_eq!(scorer.score(&a, &late), 0);
        assert!(scorer.matched_criteria(&a, &late).is_empty());

        late.departure_time -= Duration::milliseconds(1);
        assert_eq!(scorer.score(&a, &late), 15);
    }

    /// Regression test: huge configured weights saturate instead of overflowing.
    #[test]
    fn test_oversized_weights_saturate_before_clamp() {
        let weights = CompatibilityWeights {
            same_match: u32::MAX,
            same_departure_location: u32::MAX,
            similar_departure_time: 1,
            ..CompatibilityWeights::default()
        };
        let scorer = CompatibilityScorer::new(weights);
        let a = trip("t1", "York", 0, User::new("u1"));
        let b = trip("t2", "York", 0, User::new("u2"));
        assert_eq!(scorer.score(&a, &b), 100);
    }

    #[test]
    fn test_interest_contribution_is_capped() {
        assert_eq!(interest_score(0, 2, 10), 0);
        assert_eq!(interest_score(3, 2, 10), 6);
        assert_eq!(interest_score(7, 2, 10), 10);
        assert_eq!(interest_score(usize::MAX, 2, 10), 10);
    }

    #[test]
    fn test_missing_driver_fields_score_zero() {
        let scorer = CompatibilityScorer::default();
        let a = trip("t1", "Leeds", 0, User::new("u1"));
        let b = trip("t2", "Hull", 120, User::new("u2"));
        assert_eq!(scorer.score(&a, &b), 25);
        assert!(scorer.matched_criteria(&a, &b).is_empty());
    }

    #[test]
    fn test_should_group_boundary() {
        assert!(should_group(70, DEFAULT_GROUPING_THRESHOLD));
        assert!(!should_group(69, DEFAULT_GROUPING_THRESHOLD));
        assert!(should_group(0, 0));
    }
}
