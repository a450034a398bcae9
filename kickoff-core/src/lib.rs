//! kickoff-core: compatibility scoring and ride-grouping recommendations
//! for supporters travelling to matches.
//!
//! Everything here is pure computation over already-loaded trips and users.

pub mod affinity;
pub mod clustering;
pub mod eligibility;
pub mod error;
pub mod model;
pub mod recommend;
pub mod scoring;
pub mod text;
pub mod writeback;

pub use affinity::{AffinityScorer, AffinityWeights};
pub use clustering::{auto_group_trips, ClusterOrder, PairScorer, TripGroup};
pub use eligibility::{autogroup_pool, grouping_candidates, joinable_trips};
pub use error::EngineError;
pub use model::{
    populate_all, DriverSlot, MatchId, Trip, TripId, TripRef, TripStatus, TripWithDriver, User, UserId,
};
pub use recommend::{Recommendation, RecommendationEngine};
pub use scoring::{should_group, CompatibilityScorer, CompatibilityWeights, DEFAULT_GROUPING_THRESHOLD};
pub use writeback::{apply_write_back, plan_write_back, GroupingUpdate};
