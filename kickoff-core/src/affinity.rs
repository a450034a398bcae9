//! User-to-driver affinity, used when a supporter looks for a ride to join.
//!
//! Deliberately a separate table from [`crate::scoring::CompatibilityWeights`]:
//! the two models weight similar criteria differently.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::model::User;
use crate::scoring::{
    interest_score, shared_interests_label, SAME_CITY, SAME_ENTRY_CENTER, SAME_FAVOURITE_TEAM,
    SAME_REGION, SAME_SUPPORTER_GROUP,
};
use crate::text::{same_optional, shared_interest_count};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AffinityWeights {
    pub same_favourite_team: u32,
    pub same_supporter_group: u32,
    pub same_region: u32,
    pub same_city: u32,
    pub per_shared_interest: u32,
    pub max_interest_score: u32,
    pub same_entry_center: u32,
    pub max_score: u32,
}

impl Default for AffinityWeights {
    fn default() -> Self {
        Self {
            same_favourite_team: 25,
            same_supporter_group: 20,
            same_region: 15,
            same_city: 15,
            per_shared_interest: 5,
            max_interest_score: 15,
            same_entry_center: 10,
            max_score: 100,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AffinityScorer {
    weights: AffinityWeights,
}

impl AffinityScorer {
    pub fn new(weights: AffinityWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &AffinityWeights {
        &self.weights
    }

    /// Score how well `user` would fit in `driver`'s car.
    pub fn score(&self, user: &User, driver: &User) -> u32 {
        self.evaluate(user, driver).0
    }

    /// Labels of the criteria that matched, in table order.
    pub fn matched_criteria(&self, user: &User, driver: &User) -> Vec<String> {
        self.evaluate(user, driver).1
    }

    /// Score and labels in one pass.
    pub fn evaluate(&self, user: &User, driver: &User) -> (u32, Vec<String>) {
        let w = &self.weights;
        let mut score = 0u32;
        let mut criteria = Vec::new();

        let fields = [
            (user.favourite_team.as_deref(), driver.favourite_team.as_deref(), w.same_favourite_team, SAME_FAVOURITE_TEAM),
            (user.supporter_group.as_deref(), driver.supporter_group.as_deref(), w.same_supporter_group, SAME_SUPPORTER_GROUP),
            (user.region.as_deref(), driver.region.as_deref(), w.same_region, SAME_REGION),
            (user.city.as_deref(), driver.city.as_deref(), w.same_city, SAME_CITY),
        ];
        for (mine, theirs, weight, label) in fields {
            if same_optional(mine, theirs) {
                score = score.saturating_add(weight);
                criteria.push(label.to_string());
            }
        }

        let shared = shared_interest_count(&user.interests, &driver.interests);
        if shared > 0 {
            score = score.saturating_add(interest_score(shared, w.per_shared_interest, w.max_interest_score));
            criteria.push(shared_interests_label(shared));
        }

        if same_optional(user.entry_center.as_deref(), driver.entry_center.as_deref()) {
            score = score.saturating_add(w.same_entry_center);
            criteria.push(SAME_ENTRY_CENTER.to_string());
        }

        let score = score.min(w.max_score);
        trace!(user = %user.id, driver = %driver.id, score, "scored user affinity");
        (score, criteria)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn supporter(id: &str) -> User {
        User::new(id)
            .with_team("Hibernian")
            .with_supporter_group("Hibees Bus")
            .with_region("Lothian")
            .with_city("Edinburgh")
            .with_entry_center("East Stand")
    }

    #[test]
    fn test_identical_profiles_score_full() {
        let user = supporter("u1").with_interests(["folk", "whisky", "hiking"]);
        let driver = supporter("u2").with_interests(["Folk", "Whisky", "Hiking", "golf"]);
        let scorer = AffinityScorer::default();
        assert_eq!(scorer.score(&user, &driver), 100);
        assert_eq!(
            scorer.matched_criteria(&user, &driver),
            vec![
                "Same favourite team",
                "Same supporter group",
                "Same region",
                "Same city",
                "3 shared interest(s)",
                "Same entry center",
            ]
        );
    }

    #[test]
    fn test_city_and_entry_center_only() {
        let user = User::new("u1").with_city("Leith").with_entry_center("Gate 4");
        let driver = User::new("u2").with_city("leith").with_entry_center("GATE 4");
        let (score, criteria) = AffinityScorer::default().evaluate(&user, &driver);
        assert_eq!(score, 25);
        assert_eq!(criteria, vec!["Same city", "Same entry center"]);
    }

    #[test]
    fn test_one_shared_interest_scores_five() {
        let user = User::new("u1").with_interests(["darts"]);
        let driver = User::new("u2").with_interests(["DARTS", "snooker"]);
        let (score, criteria) = AffinityScorer::default().evaluate(&user, &driver);
        assert_eq!(score, 5);
        assert_eq!(criteria, vec!["1 shared interest(s)"]);
    }

    /// Regression test: huge configured weights saturate instead of overflowing.
    #[test]
    fn test_oversized_weights_saturate_before_clamp() {
        let weights = AffinityWeights {
            same_favourite_team: u32::MAX,
            same_city: u32::MAX,
            same_entry_center: u32::MAX,
            ..AffinityWeights::default()
        };
        let user = supporter("u1");
        let driver = supporter("u2");
        assert_eq!(AffinityScorer::new(weights).score(&user, &driver), 100);
    }
}
