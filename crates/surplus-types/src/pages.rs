use serde::{Deserialize, Serialize};

use crate::models::UserType;

/// Pages are identified by filename-like tokens compared literally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Page {
    #[serde(rename = "index.html")]
    Index,
    #[serde(rename = "login.html")]
    Login,
    #[serde(rename = "donor.html")]
    Donor,
    #[serde(rename = "receiver.html")]
    Receiver,
}

impl Page {
    pub fn token(&self) -> &'static str {
        match self {
            Self::Index => "index.html",
            Self::Login => "login.html",
            Self::Donor => "donor.html",
            Self::Receiver => "receiver.html",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "index.html" => Some(Self::Index),
            "login.html" => Some(Self::Login),
            "donor.html" => Some(Self::Donor),
            "receiver.html" => Some(Self::Receiver),
            _ => None,
        }
    }

    /// Protected pages need a session; anonymous visitors are sent to login.
    pub fn is_protected(&self) -> bool {
        matches!(self, Self::Donor | Self::Receiver)
    }

    /// Where a fresh login lands when no page was remembered.
    pub fn default_for(user_type: UserType) -> Self {
        match user_type {
            UserType::Donor => Self::Donor,
            UserType::Receiver => Self::Receiver,
        }
    }

    /// Path used in redirects.
    pub fn path(&self) -> String {
        format!("/{}", self.token())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_dashboards_are_protected() {
        assert!(Page::Donor.is_protected());
        assert!(Page::Receiver.is_protected());
        assert!(!Page::Login.is_protected());
        assert!(!Page::Index.is_protected());
    }

    #[test]
    fn tokens_are_compared_literally() {
        assert_eq!(Page::from_token("donor.html"), Some(Page::Donor));
        assert_eq!(Page::from_token("/donor.html"), None);
        assert_eq!(Page::from_token("Donor.html"), None);
    }
}
