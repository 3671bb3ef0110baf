use axum::Json;
use tracing::info;

use surplus_types::api::{ContactRequest, ContactResponse};

use crate::error::{AppError, FILL_REQUIRED_FIELDS};

const SENT: &str = "Thank you! Your message has been sent successfully.";

/// Home page contact form. Messages are only logged; nothing is stored.
pub async fn submit_contact(Json(req): Json<ContactRequest>) -> Result<Json<ContactResponse>, AppError> {
    if req.name.trim().is_empty() || req.email.trim().is_empty() || req.message.trim().is_empty() {
        return Err(AppError::MissingFields(FILL_REQUIRED_FIELDS));
    }
    if !valid_email(req.email.trim()) {
        return Err(AppError::InvalidField("Please enter a valid email address"));
    }
    if !req.phone.trim().is_empty() && !valid_phone(&req.phone) {
        return Err(AppError::InvalidField("Please enter a valid phone number"));
    }

    info!(
        sender = %req.name,
        email = %req.email,
        phone = %req.phone,
        "Contact message received: {}",
        req.message
    );

    Ok(Json(ContactResponse {
        toast: SENT.to_string(),
    }))
}

/// `local@domain.tld`: no whitespace, one `@`, and a dot inside the domain.
pub fn valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}

/// Up to 16 digits with an optional leading `+`, first digit not zero.
/// Spaces, dashes and parentheses are ignored.
pub fn valid_phone(phone: &str) -> bool {
    let compact: String = phone
        .chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, '-' | '(' | ')'))
        .collect();
    let digits = compact.strip_prefix('+').unwrap_or(&compact);

    let mut chars = digits.chars();
    matches!(chars.next(), Some('1'..='9'))
        && chars.all(|c| c.is_ascii_digit())
        && digits.len() <= 16
}
