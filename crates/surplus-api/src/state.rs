use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;

use surplus_db::{Database, IdentityRepository, ListingRepository, SessionRepository};
use surplus_gateway::dispatcher::Dispatcher;
use surplus_gateway::feed::{DEFAULT_POLL_INTERVAL, DashboardSource};
use surplus_types::events::DashboardKind;

use crate::error::{AppError, join_error};
use crate::filter::Filter;
use crate::render;

pub type AppState = Arc<AppStateInner>;

/// Runtime switches that change request handling.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Fallback re-render period for open dashboards.
    pub poll_interval: Duration,
    /// Check submitted passwords against the registry on login.
    pub strict_login: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            strict_login: false,
        }
    }
}

pub struct AppStateInner {
    pub listings: Arc<dyn ListingRepository>,
    pub sessions: Arc<dyn SessionRepository>,
    pub identities: Arc<dyn IdentityRepository>,
    pub dispatcher: Dispatcher,
    pub settings: Settings,
}

impl AppStateInner {
    /// Wires every repository to the same store.
    pub fn new(db: Arc<Database>, dispatcher: Dispatcher, settings: Settings) -> AppState {
        Arc::new(Self {
            listings: db.clone(),
            sessions: db.clone(),
            identities: db,
            dispatcher,
            settings,
        })
    }

    /// Runs store work on the blocking pool so request handlers never hold
    /// the store lock on an async worker.
    pub async fn blocking<T, F>(self: &Arc<Self>, f: F) -> Result<T, AppError>
    where
        F: FnOnce(&AppStateInner) -> Result<T, AppError> + Send + 'static,
        T: Send + 'static,
    {
        let state = Arc::clone(self);
        tokio::task::spawn_blocking(move || f(&state))
            .await
            .map_err(join_error)?
    }
}

impl DashboardSource for AppStateInner {
    fn render(&self, kind: DashboardKind, filter: Option<&str>) -> Result<String> {
        let listings = self.listings.list()?;
        let dashboard = match kind {
            DashboardKind::Receiver => {
                let mut dashboard = render::receiver_view(&listings);
                filter
                    .map(Filter::from_token)
                    .unwrap_or_default()
                    .apply(&mut dashboard.cards);
                dashboard
            }
            DashboardKind::Donor => {
                let session = self.sessions.current()?;
                render::donor_view(&listings, session.as_ref())
            }
        };
        Ok(dashboard.to_html())
    }
}
