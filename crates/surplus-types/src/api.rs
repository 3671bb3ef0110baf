use serde::{Deserialize, Serialize};

use crate::models::{FoodListing, ListingStatus};

// -- Auth --

/// Login and registration share the same three fields.
/// Missing fields deserialize as empty so validation can name the omission.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CredentialsForm {
    pub username: String,
    pub password: String,
    pub user_type: String,
}

// -- Listings --

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PostListingRequest {
    pub food_name: String,
    pub quantity: String,
    pub quantity_unit: String,
    pub location: String,
    pub expiry_time: String,
    pub food_type: String,
    pub additional_info: String,
    /// Whether the submitting page carries the success modal.
    pub modal: bool,
}

#[derive(Debug, Serialize)]
pub struct PostListingResponse {
    pub listing: FoodListing,
    pub dialog: Dialog,
    /// Re-rendered donor "posted items" fragment.
    pub posted_items_html: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RequestListingRequest {
    /// Whether the requesting page carries the confirmation modal.
    pub modal: bool,
}

/// Everything the page applies after a request, delivered in one response.
#[derive(Debug, Serialize)]
pub struct RequestOutcome {
    pub id: i64,
    pub status: ListingStatus,
    pub card_html: String,
    pub dialog: Dialog,
    pub toast: String,
}

/// Blocking confirmation shown to the user. Pages without the modal element
/// fall back to an alert with equivalent text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "text", rename_all = "lowercase")]
pub enum Dialog {
    Modal(String),
    Alert(String),
}

// -- Contact --

/// Home page contact message. Phone is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ContactRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ContactResponse {
    pub toast: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub alert: String,
}
