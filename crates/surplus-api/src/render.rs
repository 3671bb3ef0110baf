//! Dashboard rendering. Every function here is a pure function of the
//! listing snapshot and session it is given, and the resulting markup fully
//! replaces whatever the dashboard showed before.

use chrono::{DateTime, Local, NaiveDateTime, Utc};

use surplus_types::models::{FoodListing, ListingStatus, Session};

const NO_LISTINGS: &str = "No food donations available at the moment.";
const NO_POSTED_ITEMS: &str = "You haven't posted any food yet.";

/// What a receiver card offers in its action slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiverAction {
    /// Enabled "Request Food" button bound to the listing id.
    Request,
    /// Disabled indicator on a card rendered from a requested listing.
    AlreadyRequested,
    /// Disabled control on the card the user just requested.
    JustRequested,
}

/// One rendered listing. `status` mirrors the card's `data-status`
/// attribute, which is all the filter component looks at.
#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    pub id: i64,
    pub status: ListingStatus,
    pub visible: bool,
    body: String,
}

impl Card {
    pub fn to_html(&self) -> String {
        let hidden = if self.visible { "" } else { r#" style="display: none""# };
        format!(
            r#"<div class="food-card" data-id="{}" data-status="{}"{}>{}</div>"#,
            self.id,
            self.status.as_str(),
            hidden,
            self.body
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard {
    pub cards: Vec<Card>,
    empty_message: Option<&'static str>,
}

impl Dashboard {
    pub fn to_html(&self) -> String {
        if self.cards.is_empty() {
            return self
                .empty_message
                .map(|msg| format!("<p>{}</p>", msg))
                .unwrap_or_default();
        }
        self.cards.iter().map(Card::to_html).collect()
    }

    pub fn visible_count(&self) -> usize {
        self.cards.iter().filter(|c| c.visible).count()
    }
}

/// Every listing regardless of owner, in store order.
pub fn receiver_view(listings: &[FoodListing]) -> Dashboard {
    let cards = listings
        .iter()
        .map(|l| {
            let action = match l.status {
                ListingStatus::Available => ReceiverAction::Request,
                ListingStatus::Requested => ReceiverAction::AlreadyRequested,
            };
            receiver_card(l, action)
        })
        .collect();

    Dashboard {
        cards,
        empty_message: Some(NO_LISTINGS),
    }
}

/// Only the active identity's listings. Without a session nothing is rendered.
pub fn donor_view(listings: &[FoodListing], session: Option<&Session>) -> Dashboard {
    let Some(session) = session else {
        return Dashboard {
                cards: Vec::new(),
            empty_message: None,
        };
    };

    let cards = listings
        .iter()
        .filter(|l| l.donor == session.username)
        .map(posted_card)
        .collect();

    Dashboard {
        cards,
        empty_message: Some(NO_POSTED_ITEMS),
    }
}

pub fn receiver_card(listing: &FoodListing, action: ReceiverAction) -> Card {
    let status = match action {
        ReceiverAction::Request => listing.status,
        ReceiverAction::AlreadyRequested | ReceiverAction::JustRequested => ListingStatus::Requested,
    };

    let notes = if listing.additional_info.is_empty() {
        String::new()
    } else {
        format!(
            r#"<p><i class="fas fa-info-circle"></i> <strong>Notes:</strong> {}</p>"#,
            escape(&listing.additional_info)
        )
    };

    let button = match action {
        ReceiverAction::Request => format!(
            r#"<button class="btn btn-request" data-food-id="{}"><i class="fas fa-hand-paper"></i> Request Food</button>"#,
            listing.id
        ),
        ReceiverAction::AlreadyRequested => {
            r#"<button class="btn btn-requested" disabled><i class="fas fa-check"></i> Already Requested</button>"#
                .to_string()
        }
        ReceiverAction::JustRequested => {
            r#"<button class="btn btn-requested" disabled><i class="fas fa-check"></i> Requested</button>"#
                .to_string()
        }
    };

    let body = format!(
        r#"{header}<div class="food-card-details">{details}{notes}</div><div class="food-card-actions">{button}</div>"#,
        header = card_header(&listing.food_name, status),
        details = card_details(listing),
    );

    Card {
        id: listing.id,
        status,
        visible: true,
        body,
    }
}

fn posted_card(listing: &FoodListing) -> Card {
    let body = format!(
        r#"{header}<div class="food-card-details">{details}</div><div class="food-card-footer"><p><i class="fas fa-calendar"></i> Posted: {posted}</p></div>"#,
        header = card_header(&listing.food_name, listing.status),
        details = card_details(listing),
        posted = format_posted(&listing.posted_date),
    );

    Card {
        id: listing.id,
        status: listing.status,
        visible: true,
        body,
    }
}

fn card_header(name: &str, status: ListingStatus) -> String {
    format!(
        r#"<div class="food-card-header"><h4>{}</h4><span class="badge {}">{}</span></div>"#,
        escape(name),
        status.as_str(),
        status.label()
    )
}

fn card_details(listing: &FoodListing) -> String {
    format!(
        concat!(
            r#"<p><i class="fas fa-weight"></i> <strong>Quantity:</strong> {}</p>"#,
            r#"<p><i class="fas fa-map-marker-alt"></i> <strong>Location:</strong> {}</p>"#,
            r#"<p><i class="fas fa-clock"></i> <strong>Pickup By:</strong> {}</p>"#,
            r#"<p><i class="fas fa-tag"></i> <strong>Type:</strong> {}</p>"#,
        ),
        escape(&listing.quantity),
        escape(&listing.location),
        format_pickup(&listing.expiry_time),
        escape(&listing.food_type),
    )
}

/// Formats a pickup deadline as `M/D/YYYY, HH:MM AM`.
///
/// Zoned timestamps are shown in local time; `datetime-local` values carry no
/// zone and are shown as entered.
pub fn format_pickup(raw: &str) -> String {
    const FORMAT: &str = "%-m/%-d/%Y, %I:%M %p";

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.with_timezone(&Local).format(FORMAT).to_string();
    }
    for pattern in ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, pattern) {
            return naive.format(FORMAT).to_string();
        }
    }
    "Invalid Date".to_string()
}

pub fn format_posted(posted: &DateTime<Utc>) -> String {
    posted.with_timezone(&Local).format("%-m/%-d/%Y").to_string()
}

pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
