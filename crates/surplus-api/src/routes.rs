use axum::{
    Json, Router,
    extract::State,
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::middleware::require_session;
use crate::state::AppState;
use crate::{auth, contact, listings, pages, sync};

pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/", get(pages::index))
        .route("/index.html", get(pages::index))
        .route("/login.html", get(pages::login_page))
        .route("/auth/login", post(auth::login))
        .route("/auth/register", post(auth::register))
        .route("/auth/logout", post(auth::logout))
        .route("/api/listings", get(listings::list_listings))
        .route("/listings", post(listings::post_listing))
        .route("/listings/{id}/request", post(listings::request_listing))
        .route("/contact", post(contact::submit_contact))
        .route("/sync", get(sync::ws_upgrade))
        .route("/health", get(health));

    let protected_pages = Router::new()
        .route("/donor.html", get(pages::donor_page))
        .route("/receiver.html", get(pages::receiver_page))
        .layer(middleware::from_fn_with_state(state.clone(), require_session));

    Router::new()
        .merge(public_routes)
        .merge(protected_pages)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "open_tabs": state.dispatcher.open_tab_count().await,
    }))
}
