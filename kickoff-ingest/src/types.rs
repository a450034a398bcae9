use std::collections::BTreeMap;

use kickoff_core::{populate_all, EngineError, Trip, TripId, TripRef, TripWithDriver, User, UserId};
use serde::Deserialize;

/// Normalized output of snapshot parsers: a user table plus trips whose
/// drivers are ids into that table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub users: BTreeMap<UserId, User>,
    pub trips: Vec<TripRef>,
}

impl Snapshot {
    pub fn user(&self, id: &UserId) -> Option<&User> {
        self.users.get(id)
    }

    pub fn trip(&self, id: &TripId) -> Option<&TripRef> {
        self.trips.iter().find(|t| &t.id == id)
    }

    /// Every trip with its driver resolved.
    pub fn populated(&self) -> Result<Vec<TripWithDriver>, EngineError> {
        populate_all(self.trips.iter().cloned(), &self.users)
    }

    /// Resolve a subset of trips.
    pub fn populate<'a>(
        &self,
        trips: impl IntoIterator<Item = &'a TripRef>,
    ) -> Result<Vec<TripWithDriver>, EngineError> {
        populate_all(trips.into_iter().cloned(), &self.users)
    }
}

/// Either a bare user id or the embedded user, as a trip's `driver` field is
/// exported depending on whether the API populated it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum DriverField {
    Id(UserId),
    Populated(User),
}

impl DriverField {
    pub fn id(&self) -> &UserId {
        match self {
            DriverField::Id(id) => id,
            DriverField::Populated(user) => &user.id,
        }
    }
}

/// A trip as exported, before its driver is split out.
pub type RawTrip = Trip<DriverField>;
