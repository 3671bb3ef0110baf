use surplus_types::models::ListingStatus;

use crate::render::Card;

/// Receiver dashboard filter. Works on already-rendered cards only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Filter {
    #[default]
    All,
    Available,
    Requested,
    /// Placeholder: there is no location data, so this behaves like `Available`.
    Nearby,
}

impl Filter {
    pub const ALL: [Filter; 4] = [Filter::All, Filter::Available, Filter::Requested, Filter::Nearby];

    /// Unknown tokens fall back to `All`.
    pub fn from_token(token: &str) -> Self {
        match token {
            "available" => Self::Available,
            "requested" => Self::Requested,
            "nearby" => Self::Nearby,
            _ => Self::All,
        }
    }

    pub fn token(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Available => "available",
            Self::Requested => "requested",
            Self::Nearby => "nearby",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::All => "All",
            Self::Available => "Available",
            Self::Requested => "Requested",
            Self::Nearby => "Nearby",
        }
    }

    pub fn matches(&self, status: ListingStatus) -> bool {
        match self {
            Self::All => true,
            Self::Available | Self::Nearby => status == ListingStatus::Available,
            Self::Requested => status == ListingStatus::Requested,
        }
    }

    /// Toggles card visibility and returns the toast to show, if any.
    pub fn apply(&self, cards: &mut [Card]) -> Option<&'static str> {
        for card in cards.iter_mut() {
            card.visible = self.matches(card.status);
        }
        match self {
            Self::Nearby => Some("Showing food donations within 5 miles"),
            _ => None,
        }
    }
}
