//! Engine errors.
//!
//! Scoring itself never fails; these surface caller contract violations
//! (unresolved drivers) and malformed grouping write-backs.

use crate::model::{TripId, UserId};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// A trip references a driver that is not in the user table.
    #[error("trip {trip_id} references driver {driver_id}, which was not loaded")]
    MissingDriver { trip_id: TripId, driver_id: UserId },

    /// A group handed to the write-back plan has fewer than two trips.
    #[error("at least 2 trips required for grouping (got {size})")]
    GroupTooSmall { size: usize },

    /// A trip id appears in more than one group (or twice in one group).
    #[error("trip {0} appears in more than one group")]
    DuplicateTrip(TripId),

    /// A write-back update names a trip that is not in the trip set.
    #[error("trip {0} not found")]
    UnknownTrip(TripId),
}
