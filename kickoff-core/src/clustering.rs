//! Batch auto-grouping of one match's trips.
//!
//! Greedy, single pass, order dependent: each unplaced trip in turn seeds a
//! group and pulls in every other unplaced trip that scores at or above the
//! threshold *against the seed*. Members are never compared with each other,
//! so a group is a star around its seed rather than a clique. Groups of one
//! are dropped and their seed stays available.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::model::{TripId, TripStatus, TripWithDriver};
use crate::scoring::CompatibilityScorer;

/// Iteration order for seeding. Results depend on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClusterOrder {
    /// Use the slice order untouched.
    AsGiven,
    /// Oldest trip first; trips without a creation time come first.
    #[default]
    CreatedAt,
    /// Earliest departure first.
    DepartureTime,
}

/// Ids of trips grouped together; the first id is the seed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TripGroup(pub Vec<TripId>);

impl TripGroup {
    pub fn seed(&self) -> Option<&TripId> {
        self.0.first()
    }

    pub fn ids(&self) -> &[TripId] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, id: &TripId) -> bool {
        self.0.contains(id)
    }
}

/// Pairwise trip score used to decide group membership.
pub trait PairScorer {
    fn pair_score(&self, seed: &TripWithDriver, other: &TripWithDriver) -> u32;
}

impl PairScorer for CompatibilityScorer {
    fn pair_score(&self, seed: &TripWithDriver, other: &TripWithDriver) -> u32 {
        self.score(seed, other)
    }
}

/// Partition `candidates` into star-shaped groups of two or more trips.
///
/// Trips already grouped or cancelled are skipped entirely.
pub fn auto_group_trips<S: PairScorer>(
    scorer: &S,
    candidates: &[TripWithDriver],
    threshold: u32,
    order: ClusterOrder,
) -> Vec<TripGroup> {
    let pool = ordered_pool(candidates, order);
    let mut placed: HashSet<&TripId> = HashSet::new();
    let mut groups = Vec::new();

    for &seed in &pool {
        if placed.contains(&seed.id) {
            continue;
        }

        let mut members = vec![seed.id.clone()];
        for &other in &pool {
            if other.id == seed.id || placed.contains(&other.id) {
                continue;
            }
            if scorer.pair_score(seed, other) >= threshold {
                members.push(other.id.clone());
            }
        }

        if members.len() < 2 {
            continue;
        }
        for &trip in &pool {
            if members.contains(&trip.id) {
                placed.insert(&trip.id);
            }
        }
        info!(seed = %seed.id, size = members.len(), "formed trip group");
        groups.push(TripGroup(members));
    }

    debug!(
        candidates = candidates.len(),
        pool = pool.len(),
        groups = groups.len(),
        threshold,
        "auto-grouped trips"
    );
    groups
}

fn ordered_pool(candidates: &[TripWithDriver], order: ClusterOrder) -> Vec<&TripWithDriver> {
    let mut pool: Vec<&TripWithDriver> = candidates
        .iter()
        .filter(|t| !t.is_grouped && t.status != TripStatus::Cancelled)
        .collect();

    match order {
        ClusterOrder::AsGiven => {}
        ClusterOrder::CreatedAt => pool.sort_by(|a, b| (a.created_at, &a.id).cmp(&(b.created_at, &b.id))),
        ClusterOrder::DepartureTime => {
            pool.sort_by(|a, b| (a.departure_time, &a.id).cmp(&(b.departure_time, &b.id)))
        }
    }
    pool
}
