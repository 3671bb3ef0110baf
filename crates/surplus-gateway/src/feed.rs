use std::sync::Arc;
use std::time::Duration;

use anyhow::{Result, anyhow};
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tracing::{debug, warn};
use uuid::Uuid;

use surplus_types::events::{DashboardKind, FeedFrame, LISTINGS_KEY, SyncEvent};

use crate::dispatcher::Dispatcher;

/// Default fallback poll period for open dashboards.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Produces the current dashboard markup from the store. `filter` is the
/// view token the page was loaded with, if any.
pub trait DashboardSource: Send + Sync + 'static {
    fn render(&self, kind: DashboardKind, filter: Option<&str>) -> Result<String>;
}

/// Keeps one open dashboard current.
///
/// A frame is produced when another tab changes the listings (re-render plus a
/// toast) or when the poll timer fires (re-render only). The poll runs whether
/// or not anything changed.
pub struct DashboardFeed {
    kind: DashboardKind,
    filter: Option<String>,
    tab_id: Uuid,
    source: Arc<dyn DashboardSource>,
    events: broadcast::Receiver<SyncEvent>,
    poll: Interval,
}

impl DashboardFeed {
    pub fn new(
        dispatcher: &Dispatcher,
        source: Arc<dyn DashboardSource>,
        kind: DashboardKind,
        filter: Option<String>,
        tab_id: Uuid,
        poll_interval: Duration,
    ) -> Self {
        let mut poll = tokio::time::interval_at(Instant::now() + poll_interval, poll_interval);
        poll.set_missed_tick_behavior(MissedTickBehavior::Delay);

        Self {
            kind,
            filter,
            tab_id,
            source,
            events: dispatcher.subscribe(),
            poll,
        }
    }

    pub fn kind(&self) -> DashboardKind {
        self.kind
    }

    pub fn tab_id(&self) -> Uuid {
        self.tab_id
    }

    /// Renders the dashboard without waiting for a trigger.
    pub async fn snapshot(&self) -> Result<FeedFrame> {
        self.render(None).await
    }

    /// Waits for the next reason to re-render. Returns `None` once the
    /// dispatcher is gone.
    pub async fn next_frame(&mut self) -> Option<Result<FeedFrame>> {
        loop {
            tokio::select! {
                result = self.events.recv() => {
                    match result {
                        Ok(event) => {
                            if event.key() != LISTINGS_KEY || event.origin() == Some(self.tab_id) {
                                continue;
                            }
                            debug!("Tab {} re-rendering after change from {:?}", self.tab_id, event.origin());
                            let toast = self.kind.change_toast().to_string();
                            return Some(self.render(Some(toast)).await);
                        }
                        Err(RecvError::Lagged(n)) => {
                            warn!("Tab {} lagged by {} store events, re-rendering", self.tab_id, n);
                            return Some(self.render(None).await);
                        }
                        Err(RecvError::Closed) => return None,
                    }
                }
                _ = self.poll.tick() => {
                    return Some(self.render(None).await);
                }
            }
        }
    }

    async fn render(&self, toast: Option<String>) -> Result<FeedFrame> {
        let source = Arc::clone(&self.source);
        let kind = self.kind;
        let filter = self.filter.clone();
        let html = tokio::task::spawn_blocking(move || source.render(kind, filter.as_deref()))
            .await
            .map_err(|e| anyhow!("render task failed: {}", e))??;
        Ok(FeedFrame::Render { html, toast })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSource(AtomicUsize);

    impl DashboardSource for CountingSource {
        fn render(&self, kind: DashboardKind, filter: Option<&str>) -> Result<String> {
            let n = self.0.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(format!("{:?} {} render #{}", kind, filter.unwrap_or("all"), n))
        }
    }

    fn feed(dispatcher: &Dispatcher, tab: Uuid, poll: Duration) -> DashboardFeed {
        let source = Arc::new(CountingSource(AtomicUsize::new(0)));
        DashboardFeed::new(dispatcher, source, DashboardKind::Receiver, None, tab, poll)
    }

    #[tokio::test]
    async fn change_from_other_tab_renders_with_toast() {
        let dispatcher = Dispatcher::new();
        let mut feed = feed(&dispatcher, Uuid::new_v4(), Duration::from_secs(60));

        dispatcher.broadcast(SyncEvent::listings_changed(Some(Uuid::new_v4())));

        let frame = feed.next_frame().await.unwrap().unwrap();
        assert_eq!(
            frame,
            FeedFrame::Render {
                html: "Receiver all render #1".into(),
                toast: Some("Food donations updated!".into()),
            }
        );
    }

    #[tokio::test]
    async fn own_writes_fall_through_to_poll() {
        let dispatcher = Dispatcher::new();
        let tab = Uuid::new_v4();
        let mut feed = feed(&dispatcher, tab, Duration::from_millis(50));

        dispatcher.broadcast(SyncEvent::listings_changed(Some(tab)));
        dispatcher.broadcast(SyncEvent::StorageChanged {
            key: "currentUser".into(),
            origin: None,
        });

        let frame = feed.next_frame().await.unwrap().unwrap();
        let FeedFrame::Render { toast, .. } = frame;
        assert_eq!(toast, None);
    }

    #[tokio::test]
    async fn poll_renders_even_without_changes() {
        let dispatcher = Dispatcher::new();
        let mut feed = feed(&dispatcher, Uuid::new_v4(), Duration::from_millis(20));

        for expected in 1..=2 {
            let FeedFrame::Render { html, toast } = feed.next_frame().await.unwrap().unwrap();
            assert_eq!(html, format!("Receiver all render #{}", expected));
            assert!(toast.is_none());
        }
    }

    #[tokio::test]
    async fn frames_keep_the_page_filter() {
        let dispatcher = Dispatcher::new();
        let source = Arc::new(CountingSource(AtomicUsize::new(0)));
        let feed = DashboardFeed::new(
            &dispatcher,
            source,
            DashboardKind::Receiver,
            Some("requested".into()),
            Uuid::new_v4(),
            Duration::from_secs(60),
        );

        let FeedFrame::Render { html, .. } = feed.snapshot().await.unwrap();
        assert_eq!(html, "Receiver requested render #1");
    }
}
