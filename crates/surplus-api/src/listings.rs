use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::info;

use surplus_types::api::{
    Dialog, PostListingRequest, PostListingResponse, RequestListingRequest, RequestOutcome,
};
use surplus_types::events::SyncEvent;
use surplus_types::models::{ANONYMOUS_DONOR, FoodListing, ListingStatus, NewListing};

use crate::error::{AppError, FILL_REQUIRED_FIELDS};
use crate::middleware::TabId;
use crate::render::{self, ReceiverAction};
use crate::state::AppState;

const POSTED: &str = "Food posted successfully!";

/// Raw snapshot of the listing collection.
pub async fn list_listings(State(state): State<AppState>) -> Result<Json<Vec<FoodListing>>, AppError> {
    let listings = state.blocking(|s| Ok(s.listings.list()?)).await?;
    Ok(Json(listings))
}

/// Donor submission: validates, stores, and returns the refreshed posted items.
pub async fn post_listing(
    State(state): State<AppState>,
    TabId(tab): TabId,
    Json(req): Json<PostListingRequest>,
) -> Result<impl IntoResponse, AppError> {
    if req.food_name.is_empty()
        || req.quantity.is_empty()
        || req.location.is_empty()
        || req.expiry_time.is_empty()
    {
        return Err(AppError::MissingFields(FILL_REQUIRED_FIELDS));
    }

    let modal = req.modal;
    let (listing, posted_items_html) = state
        .blocking(move |store| {
            let session = store.sessions.current()?;
            let donor = session
                .as_ref()
                .map(|s| s.username.clone())
                .unwrap_or_else(|| ANONYMOUS_DONOR.to_string());

            let listing = store.listings.append(NewListing {
                food_name: req.food_name,
                quantity: format!("{} {}", req.quantity, req.quantity_unit)
                    .trim_end()
                    .to_string(),
                location: req.location,
                expiry_time: req.expiry_time,
                food_type: req.food_type,
                additional_info: req.additional_info,
                donor,
                posted_date: None,
            })?;

            let listings = store.listings.list()?;
            let html = render::donor_view(&listings, session.as_ref()).to_html();
            Ok((listing, html))
        })
        .await?;

    info!("Listing {} posted by {}", listing.id, listing.donor);
    state.dispatcher.broadcast(SyncEvent::listings_changed(tab));

    let dialog = if modal {
        Dialog::Modal(POSTED.to_string())
    } else {
        Dialog::Alert(POSTED.to_string())
    };

    Ok((
        StatusCode::CREATED,
        Json(PostListingResponse {
            listing,
            dialog,
            posted_items_html,
        }),
    ))
}

/// The one transition a listing makes after creation: available -> requested.
/// Who requested it is not recorded.
pub async fn request_listing(
    State(state): State<AppState>,
    TabId(tab): TabId,
    Path(id): Path<i64>,
    Json(req): Json<RequestListingRequest>,
) -> Result<Json<RequestOutcome>, AppError> {
    let listing = state
        .blocking(move |store| {
            let before = store.listings.mark_requested(id)?.ok_or(AppError::NotFound)?;
            if before.status == ListingStatus::Requested {
                return Err(AppError::AlreadyRequested(before.food_name));
            }
            Ok(before)
        })
        .await?;

    info!("Listing {} ({}) requested", listing.id, listing.food_name);
    state.dispatcher.broadcast(SyncEvent::listings_changed(tab));

    let card = render::receiver_card(&listing, ReceiverAction::JustRequested);
    Ok(Json(RequestOutcome {
        id,
        status: card.status,
        card_html: card.to_html(),
        dialog: request_dialog(&listing.food_name, req.modal),
        toast: format!("Request sent for {}", listing.food_name),
    }))
}

/// Confirmation naming the item: the page's modal when it has one, else an alert.
pub fn request_dialog(food_name: &str, modal: bool) -> Dialog {
    if modal {
        Dialog::Modal(format!("You have requested: {}", food_name))
    } else {
        Dialog::Alert(format!(
            "You have requested: {}. The donor will contact you to coordinate pickup.",
            food_name
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_modal_falls_back_to_alert() {
        assert_eq!(
            request_dialog("Bread", true),
            Dialog::Modal("You have requested: Bread".into())
        );
        assert_eq!(
            request_dialog("Bread", false),
            Dialog::Alert(
                "You have requested: Bread. The donor will contact you to coordinate pickup."
                    .into()
            )
        );
    }
}
