use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Donor name used when a listing is posted without an active session.
pub const ANONYMOUS_DONOR: &str = "Anonymous Donor";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingStatus {
    Available,
    Requested,
}

impl ListingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Requested => "requested",
        }
    }

    /// Badge label shown on a card.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Available => "Available",
            Self::Requested => "Requested",
        }
    }

    /// Status only ever moves forward: available -> requested.
    pub fn can_transition_to(&self, next: ListingStatus) -> bool {
        matches!(
            (self, next),
            (Self::Available, Self::Requested)
                | (Self::Available, Self::Available)
                | (Self::Requested, Self::Requested)
        )
    }
}

/// A single food donation. Field names follow the persisted camelCase layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodListing {
    pub id: i64,
    pub food_name: String,
    pub quantity: String,
    pub location: String,
    /// Pickup deadline, stored as submitted.
    pub expiry_time: String,
    #[serde(default)]
    pub food_type: String,
    #[serde(default)]
    pub additional_info: String,
    pub status: ListingStatus,
    pub posted_date: DateTime<Utc>,
    pub donor: String,
}

/// Everything needed to create a listing; the store assigns the id and status.
#[derive(Debug, Clone, PartialEq)]
pub struct NewListing {
    pub food_name: String,
    pub quantity: String,
    pub location: String,
    pub expiry_time: String,
    pub food_type: String,
    pub additional_info: String,
    pub donor: String,
    /// Overrides the creation time. Only sample seeding backdates listings.
    pub posted_date: Option<DateTime<Utc>>,
}

impl NewListing {
    pub fn into_listing(self, id: i64, now: DateTime<Utc>) -> FoodListing {
        FoodListing {
            id,
            food_name: self.food_name,
            quantity: self.quantity,
            location: self.location,
            expiry_time: self.expiry_time,
            food_type: self.food_type,
            additional_info: self.additional_info,
            status: ListingStatus::Available,
            posted_date: self.posted_date.unwrap_or(now),
            donor: self.donor,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    Donor,
    Receiver,
}

impl UserType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Donor => "donor",
            Self::Receiver => "receiver",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "donor" => Some(Self::Donor),
            "receiver" => Some(Self::Receiver),
            _ => None,
        }
    }
}

/// A registered account. Never updated or deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub username: String,
    /// Argon2 PHC string.
    pub password: String,
    pub user_type: UserType,
}

/// The single active identity for the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub username: String,
    pub user_type: UserType,
    pub logged_in: bool,
    pub login_time: DateTime<Utc>,
}

impl Session {
    pub fn new(username: impl Into<String>, user_type: UserType) -> Self {
        Self {
            username: username.into(),
            user_type,
            logged_in: true,
            login_time: Utc::now(),
        }
    }
}

/// Authentication state derived from the stored session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    Anonymous,
    Authenticated(UserType),
}

impl AuthState {
    pub fn from_session(session: Option<&Session>) -> Self {
        match session {
            Some(s) if s.logged_in => Self::Authenticated(s.user_type),
            _ => Self::Anonymous,
        }
    }
}
