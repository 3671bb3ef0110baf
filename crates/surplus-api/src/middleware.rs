use std::convert::Infallible;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use uuid::Uuid;

use surplus_types::pages::Page;

use crate::auth::{self, GateDecision};
use crate::error::AppError;
use crate::state::AppState;

/// Page-load guard for the dashboards.
pub async fn require_session(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = req.uri().path().trim_start_matches('/');
    let Some(page) = Page::from_token(token) else {
        return Ok(next.run(req).await);
    };

    let decision = state
        .blocking(move |s| Ok(auth::guard(s.sessions.as_ref(), page)?))
        .await?;
    match decision {
        GateDecision::Proceed => Ok(next.run(req).await),
        GateDecision::RedirectToLogin => Ok(Redirect::to(&Page::Login.path()).into_response()),
    }
}

/// Header a page sends to identify its tab, so its own writes are not echoed back.
pub const TAB_ID_HEADER: &str = "x-tab-id";

/// The acting tab, when the client identified itself.
#[derive(Debug, Clone, Copy)]
pub struct TabId(pub Option<Uuid>);

impl<S: Send + Sync> FromRequestParts<S> for TabId {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let tab = parts
            .headers
            .get(TAB_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok());
        Ok(TabId(tab))
    }
}
