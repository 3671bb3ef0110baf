use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Storage key holding the listing collection.
pub const LISTINGS_KEY: &str = "surplusFoods";
/// Storage key holding the identity registry.
pub const USERS_KEY: &str = "registeredUsers";
/// Storage key holding the active session.
pub const SESSION_KEY: &str = "currentUser";
/// Storage key holding the deferred redirect target.
pub const INTENDED_PAGE_KEY: &str = "intendedPage";

/// Store change notifications broadcast to every open dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum SyncEvent {
    /// The value under `key` was rewritten. `origin` is the tab that caused
    /// the write, if it identified itself.
    StorageChanged { key: String, origin: Option<Uuid> },
}

impl SyncEvent {
    pub fn listings_changed(origin: Option<Uuid>) -> Self {
        Self::StorageChanged {
            key: LISTINGS_KEY.to_string(),
            origin,
        }
    }

    pub fn key(&self) -> &str {
        match self {
            Self::StorageChanged { key, .. } => key,
        }
    }

    pub fn origin(&self) -> Option<Uuid> {
        match self {
            Self::StorageChanged { origin, .. } => *origin,
        }
    }
}

/// Frames pushed to a dashboard over the sync socket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum FeedFrame {
    /// Replacement content for the dashboard container, plus an optional toast.
    Render { html: String, toast: Option<String> },
}

/// Which dashboard a sync connection renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DashboardKind {
    Donor,
    Receiver,
}

impl DashboardKind {
    /// Toast shown when another tab changed the listings.
    pub fn change_toast(&self) -> &'static str {
        match self {
            Self::Donor => "Your food status updated!",
            Self::Receiver => "Food donations updated!",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_changed_wire_shape() {
        let event = SyncEvent::listings_changed(None);
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "StorageChanged");
        assert_eq!(json["data"]["key"], LISTINGS_KEY);
    }
}
