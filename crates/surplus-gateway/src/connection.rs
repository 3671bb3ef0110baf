use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tracing::{info, warn};

use surplus_types::events::FeedFrame;

use crate::dispatcher::Dispatcher;
use crate::feed::DashboardFeed;

/// Heartbeat interval: server sends a Ping every 15 seconds.
/// If 2 consecutive Pongs are missed (~30s), the connection is dropped.
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(15);

/// Streams dashboard frames to one open tab until it disconnects.
pub async fn handle_connection(socket: WebSocket, dispatcher: Dispatcher, mut feed: DashboardFeed) {
    let (mut sender, mut receiver) = socket.split();
    let tab_id = feed.tab_id();
    let kind = feed.kind();

    info!("Tab {} connected ({:?} dashboard)", tab_id, kind);
    dispatcher.tab_opened(tab_id, kind).await;

    // Initial frame so the tab starts from the current snapshot
    match feed.snapshot().await {
        Ok(frame) => {
            if send_frame(&mut sender, &frame).await.is_err() {
                dispatcher.tab_closed(tab_id).await;
                return;
            }
        }
        Err(e) => warn!("Tab {} initial render failed: {}", tab_id, e),
    }

    let pong_received = Arc::new(AtomicBool::new(true));
    let pong_flag_send = pong_received.clone();
    let pong_flag_recv = pong_received.clone();

    // Forward feed frames -> client, with heartbeat
    let mut send_task = tokio::spawn(async move {
        let mut heartbeat = tokio::time::interval(HEARTBEAT_INTERVAL);
        heartbeat.tick().await;
        let mut missed_heartbeats: u8 = 0;

        loop {
            tokio::select! {
                frame = feed.next_frame() => {
                    let frame = match frame {
                        Some(Ok(frame)) => frame,
                        Some(Err(e)) => {
                            warn!("Tab {} render failed: {}", tab_id, e);
                            continue;
                        }
                        None => break,
                    };
                    if send_frame(&mut sender, &frame).await.is_err() {
                        break;
                    }
                }
                _ = heartbeat.tick() => {
                    if pong_flag_send.swap(false, Ordering::Acquire) {
                        missed_heartbeats = 0;
                    } else {
                        missed_heartbeats += 1;
                        if missed_heartbeats >= 2 {
                            warn!("Tab {} heartbeat timeout, dropping connection", tab_id);
                            break;
                        }
                    }
                    if sender.send(Message::Ping(vec![].into())).await.is_err() {
                        break;
                    }
                }
            }
        }
    });

    // The client only answers pings and eventually closes
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            match msg {
                Message::Pong(_) => pong_flag_recv.store(true, Ordering::Release),
                Message::Close(_) => break,
                _ => {}
            }
        }
    });

    // Wait for either task to finish
    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    dispatcher.tab_closed(tab_id).await;
    info!("Tab {} disconnected", tab_id);
}

async fn send_frame<S>(sender: &mut S, frame: &FeedFrame) -> Result<(), ()>
where
    S: SinkExt<Message> + Unpin,
{
    let text = serde_json::to_string(frame).map_err(|e| warn!("Frame encode failed: {}", e))?;
    sender.send(Message::Text(text.into())).await.map_err(|_| ())
}
