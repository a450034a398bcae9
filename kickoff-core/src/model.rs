//! Trip and user views read by the engine.
//!
//! Storage owns the full records; these carry only the fields the scorers and
//! the clustering routine look at. A trip's driver slot is a type parameter so
//! that "driver loaded" is checked at compile time: [`TripRef`] holds the
//! driver's id, [`TripWithDriver`] the full [`User`].

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }
    };
}

string_id!(
    /// Opaque trip identifier.
    TripId
);
string_id!(
    /// Opaque user identifier.
    UserId
);
string_id!(
    /// Identifier of the match (sporting event) a trip travels to.
    MatchId
);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TripStatus {
    #[default]
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

impl TripStatus {
    /// Statuses a passenger may still join.
    pub fn is_open(self) -> bool {
        matches!(self, TripStatus::Pending | TripStatus::Confirmed)
    }
}

/// Supporter profile fields used for matching.
///
/// Every text field is optional; an absent or blank value never matches
/// anything, including another absent value.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(alias = "_id")]
    pub id: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default)]
    pub favourite_team: Option<String>,
    #[serde(default)]
    pub supporter_group: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub entry_center: Option<String>,
    #[serde(default)]
    pub interests: Vec<String>,
}

impl User {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: UserId::new(id),
            ..Self::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.full_name = Some(name.into());
        self
    }

    pub fn with_team(mut self, team: impl Into<String>) -> Self {
        self.favourite_team = Some(team.into());
        self
    }

    pub fn with_supporter_group(mut self, group: impl Into<String>) -> Self {
        self.supporter_group = Some(group.into());
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self
    }

    pub fn with_entry_center(mut self, entry_center: impl Into<String>) -> Self {
        self.entry_center = Some(entry_center.into());
        self
    }

    pub fn with_interests<I, S>(mut self, interests: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.interests = interests.into_iter().map(Into::into).collect();
        self
    }
}

/// Anything that can sit in a trip's driver slot.
pub trait DriverSlot {
    fn driver_id(&self) -> &UserId;
}

impl DriverSlot for UserId {
    fn driver_id(&self) -> &UserId {
        self
    }
}

impl DriverSlot for User {
    fn driver_id(&self) -> &UserId {
        &self.id
    }
}

/// A ride to a match, generic over how much of the driver is loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trip<D> {
    #[serde(alias = "_id")]
    pub id: TripId,
    pub driver: D,
    #[serde(alias = "match")]
    pub match_id: MatchId,
    pub departure_location: String,
    pub departure_time: DateTime<Utc>,
    pub available_seats: u32,
    #[serde(default)]
    pub passengers: Vec<UserId>,
    #[serde(default)]
    pub status: TripStatus,
    #[serde(default)]
    pub is_grouped: bool,
    #[serde(default)]
    pub grouped_with: Vec<TripId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Trip whose driver is only an id, as stored.
pub type TripRef = Trip<UserId>;

/// Trip whose driver has been resolved to a full user record.
pub type TripWithDriver = Trip<User>;

impl<D: DriverSlot> Trip<D> {
    pub fn driver_id(&self) -> &UserId {
        self.driver.driver_id()
    }

    pub fn has_passenger(&self, user_id: &UserId) -> bool {
        self.passengers.iter().any(|p| p == user_id)
    }
}

impl TripRef {
    pub fn new(
        id: impl Into<String>,
        driver: impl Into<String>,
        match_id: impl Into<String>,
        departure_location: impl Into<String>,
        departure_time: DateTime<Utc>,
    ) -> Self {
        Self {
            id: TripId::new(id),
            driver: UserId::new(driver),
            match_id: MatchId::new(match_id),
            departure_location: departure_location.into(),
            departure_time,
            available_seats: 3,
            passengers: Vec::new(),
            status: TripStatus::Pending,
            is_grouped: false,
            grouped_with: Vec::new(),
            created_at: None,
        }
    }

    /// Resolve the driver id against a user table.
    pub fn populate(self, users: &BTreeMap<UserId, User>) -> Result<TripWithDriver, EngineError> {
        let Some(driver) = users.get(&self.driver).cloned() else {
            return Err(EngineError::MissingDriver {
                trip_id: self.id,
                driver_id: self.driver,
            });
        };
        Ok(self.with_driver_slot(driver))
    }
}

impl TripWithDriver {
    /// Drop the loaded driver back down to its id.
    pub fn to_ref(&self) -> TripRef {
        self.clone().with_driver_slot(self.driver.id.clone())
    }
}

impl<D> Trip<D> {
    /// Same trip with a different driver slot.
    pub fn with_driver_slot<E>(self, driver: E) -> Trip<E> {
        Trip {
            id: self.id,
            driver,
            match_id: self.match_id,
            departure_location: self.departure_location,
            departure_time: self.departure_time,
            available_seats: self.available_seats,
            passengers: self.passengers,
            status: self.status,
            is_grouped: self.is_grouped,
            grouped_with: self.grouped_with,
            created_at: self.created_at,
        }
    }

    pub fn with_seats(mut self, seats: u32) -> Self {
        self.available_seats = seats;
        self
    }

    pub fn with_status(mut self, status: TripStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_passengers<I, S>(mut self, passengers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.passengers = passengers.into_iter().map(|p| UserId::new(p)).collect();
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    pub fn grouped(mut self, with: Vec<TripId>) -> Self {
        self.is_grouped = true;
        self.grouped_with = with;
        self
    }
}

/// Populate every trip, failing on the first unresolved driver.
pub fn populate_all(
    trips: impl IntoIterator<Item = TripRef>,
    users: &BTreeMap<UserId, User>,
) -> Result<Vec<TripWithDriver>, EngineError> {
    trips.into_iter().map(|t| t.populate(users)).collect()
}
