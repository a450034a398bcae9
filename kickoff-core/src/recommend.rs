//! Recommendation workflows over pre-fetched candidate trips.
//!
//! Candidate selection is the caller's job (see [`crate::eligibility`]); the
//! engine scores whatever it is handed and never filters by match, status or
//! driver identity itself.

use std::cmp::Ordering;

use serde::Serialize;
use tracing::debug;

use crate::affinity::{AffinityScorer, AffinityWeights};
use crate::clustering::{self, ClusterOrder, TripGroup};
use crate::model::{MatchId, TripWithDriver, User};
use crate::scoring::{
    should_group, CompatibilityScorer, CompatibilityWeights, DEFAULT_GROUPING_THRESHOLD,
};

/// One ranked suggestion.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation<'a> {
    pub trip: &'a TripWithDriver,
    pub score: u32,
    pub matched_criteria: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct RecommendationEngine {
    compatibility: CompatibilityScorer,
    affinity: AffinityScorer,
    threshold: u32,
}

impl Default for RecommendationEngine {
    fn default() -> Self {
        Self::new(CompatibilityWeights::default(), AffinityWeights::default())
    }
}

impl RecommendationEngine {
    pub fn new(compatibility: CompatibilityWeights, affinity: AffinityWeights) -> Self {
        Self {
            compatibility: CompatibilityScorer::new(compatibility),
            affinity: AffinityScorer::new(affinity),
            threshold: DEFAULT_GROUPING_THRESHOLD,
        }
    }

    /// Threshold used by [`Self::recommend_groupings_for_trip`].
    pub fn with_threshold(mut self, threshold: u32) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    pub fn compatibility(&self) -> &CompatibilityScorer {
        &self.compatibility
    }

    pub fn affinity(&self) -> &AffinityScorer {
        &self.affinity
    }

    /// Trips worth grouping with `target`, best first.
    ///
    /// Only candidates scoring at or above the threshold are returned.
    pub fn recommend_groupings_for_trip<'a>(
        &self,
        target: &TripWithDriver,
        candidates: &'a [TripWithDriver],
    ) -> Vec<Recommendation<'a>> {
        let mut out: Vec<Recommendation<'a>> = candidates
            .iter()
            .filter_map(|candidate| {
                let score = self.compatibility.score(target, candidate);
                should_group(score, self.threshold).then(|| Recommendation {
                    trip: candidate,
                    score,
                    matched_criteria: self.compatibility.matched_criteria(target, candidate),
                })
            })
            .collect();
        rank(&mut out);

        debug!(
            trip = %target.id,
            candidates = candidates.len(),
            recommended = out.len(),
            threshold = self.threshold,
            "grouping recommendations"
        );
        out
    }

    /// Every candidate trip ranked by how well `user` fits its driver.
    ///
    /// No threshold applies. A trip driven by `user` is scored like any other;
    /// excluding it is the caller's responsibility.
    pub fn recommend_trips_for_user<'a>(
        &self,
        user: &User,
        candidates: &'a [TripWithDriver],
        match_id: Option<&MatchId>,
    ) -> Vec<Recommendation<'a>> {
        let mut out: Vec<Recommendation<'a>> = candidates
            .iter()
            .map(|trip| {
                let (score, matched_criteria) = self.affinity.evaluate(user, &trip.driver);
                Recommendation {
                    trip,
                    score,
                    matched_criteria,
                }
            })
            .collect();
        rank(&mut out);

        debug!(
            user = %user.id,
            match_id = match_id.map(|m| m.as_str()).unwrap_or("upcoming"),
            candidates = candidates.len(),
            "trip recommendations for user"
        );
        out
    }

    /// Greedy star clustering; see [`clustering::auto_group_trips`].
    pub fn auto_group_trips(
        &self,
        candidates: &[TripWithDriver],
        threshold: u32,
        order: ClusterOrder,
    ) -> Vec<TripGroup> {
        clustering::auto_group_trips(&self.compatibility, candidates, threshold, order)
    }
}

/// Descending score; equal scores by ascending trip id.
fn rank(recommendations: &mut [Recommendation<'_>]) {
    recommendations.sort_by(|a, b| match b.score.cmp(&a.score) {
        Ordering::Equal => a.trip.id.cmp(&b.trip.id),
        other => other,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TripRef;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn kickoff() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 4, 4, 15, 0, 0).unwrap()
    }

    fn trip(id: &str, location: &str, offset_min: i64, driver: User) -> TripWithDriver {
        TripRef::new(id, driver.id.as_str(), "derby", location, kickoff() + Duration::minutes(offset_min))
            .with_driver_slot(driver)
    }

    fn gooner(id: &str) -> User {
        User::new(id).with_team("Arsenal")
    }

    #[test]
    fn test_groupings_filter_and_rank() {
        let target = trip("t0", "Highbury", 0, gooner("u0").with_region("North London"));
        let candidates = vec![
            // 20 + 15 + 25 + 10 = 70
            trip("t3", "highbury", 10, gooner("u3")),
            // 20 + 15 + 25 + 10 + 10 = 80
            trip("t1", "Highbury", -20, gooner("u1").with_region("north london")),
            // 25 + 10 = 35
            trip("t2", "Croydon", 90, gooner("u2")),
            // ties with t3
            trip("t0b", "HIGHBURY", 30, gooner("u4")),
        ];

        let engine = RecommendationEngine::default();
        let recs = engine.recommend_groupings_for_trip(&target, &candidates);
        let ids: Vec<&str> = recs.iter().map(|r| r.trip.id.as_str()).collect();
        assert_eq!(ids, vec!["t1", "t0b", "t3"]);
        assert_eq!(recs[0].score, 80);
        assert_eq!(
            recs[0].matched_criteria,
            vec!["Same departure location", "Similar departure time", "Same favourite team", "Same region"]
        );
    }

    #[test]
    fn test_custom_threshold() {
        let target = trip("t0", "Anfield", 0, User::new("u0"));
        let candidates = vec![trip("t1", "Goodison", 120, User::new("u1"))];
        let engine = RecommendationEngine::default().with_threshold(25);
        assert_eq!(engine.recommend_groupings_for_trip(&target, &candidates).len(), 1);
        assert!(RecommendationEngine::default()
            .recommend_groupings_for_trip(&target, &candidates)
            .is_empty());
    }

    #[test]
    fn test_trips_for_user_returns_everything_ranked() {
        let user = gooner("me").with_city("Islington").with_interests(["beer"]);
        let candidates = vec![
            trip("t1", "A", 0, User::new("d1")),
            trip("t2", "B", 0, gooner("d2").with_city("islington")),
            trip("t3", "C", 0, User::new("d3").with_interests(["Beer"])),
            trip("t0", "D", 0, User::new("d4")),
        ];

        let recs = RecommendationEngine::default().recommend_trips_for_user(&user, &candidates, None);
        let ranked: Vec<(&str, u32)> = recs.iter().map(|r| (r.trip.id.as_str(), r.score)).collect();
        assert_eq!(ranked, vec![("t2", 40), ("t3", 5), ("t0", 0), ("t1", 0)]);
        assert!(recs[2].matched_criteria.is_empty());
    }

    /// Regression test: the engine does not drop the user's own trip.
    #[test]
    fn test_trips_for_user_does_not_self_exclude() {
        let user = gooner("me");
        let candidates = vec![trip("own", "Home", 0, user.clone())];
        let recs = RecommendationEngine::default().recommend_trips_for_user(&user, &candidates, None);
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].score, 25);
    }
}
