use axum::{
    extract::{Query, State, WebSocketUpgrade},
    response::IntoResponse,
};
use serde::Deserialize;
use uuid::Uuid;

use surplus_gateway::connection;
use surplus_gateway::feed::DashboardFeed;
use surplus_types::events::DashboardKind;

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SyncQuery {
    pub page: DashboardKind,
    /// Tab id the page also sends on its writes. Generated when absent.
    pub tab: Option<Uuid>,
    /// Receiver filter the page was loaded with; frames keep it applied.
    pub filter: Option<String>,
}

/// Opens a live feed for one dashboard tab.
pub async fn ws_upgrade(
    State(state): State<AppState>,
    Query(query): Query<SyncQuery>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    let tab = query.tab.unwrap_or_else(Uuid::new_v4);
    let feed = open_feed(&state, query.page, query.filter, tab);
    let dispatcher = state.dispatcher.clone();
    ws.on_upgrade(move |socket| connection::handle_connection(socket, dispatcher, feed))
}

pub fn open_feed(
    state: &AppState,
    kind: DashboardKind,
    filter: Option<String>,
    tab: Uuid,
) -> DashboardFeed {
    DashboardFeed::new(
        &state.dispatcher,
        state.clone(),
        kind,
        filter,
        tab,
        state.settings.poll_interval,
    )
}
