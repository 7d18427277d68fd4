// WebSocket-backed push channel with an internal reconnect loop.

use crate::domain::{PushChannel, PushEvent, Subscription};
use crate::interface_adapters::protocol::decode_event;

use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::{Notify, broadcast, watch};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, info, warn};
use url::Url;

#[derive(Debug, Clone)]
pub struct WsChannelSettings {
    /// Full endpoint including the `staffId` query parameter.
    pub url: Url,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    /// Broadcast buffer shared by every subscription.
    pub event_capacity: usize,
}

/// Builds the per-staff WebSocket endpoint from the base URL.
pub fn staff_endpoint(base: &Url, staff_id: &str) -> Url {
    let mut url = base.clone();
    url.query_pairs_mut().append_pair("staffId", staff_id);
    url
}

enum StreamEnd {
    Disconnected,
    Shutdown,
}

/// Owns the connection task. Dropping the channel stops the task.
pub struct WsPushChannel {
    events_tx: broadcast::Sender<PushEvent>,
    connected_tx: watch::Sender<bool>,
    shutdown: Arc<Notify>,
}

impl WsPushChannel {
    /// Spawns the connection loop on the current runtime.
    pub fn spawn(settings: WsChannelSettings) -> Self {
        let (events_tx, _) = broadcast::channel(settings.event_capacity);
        let (connected_tx, _) = watch::channel(false);
        let shutdown = Arc::new(Notify::new());

        tokio::spawn(connection_loop(
            settings,
            events_tx.clone(),
            connected_tx.clone(),
            shutdown.clone(),
        ));

        Self {
            events_tx,
            connected_tx,
            shutdown,
        }
    }

    pub fn close(&self) {
        // notify_one stores a permit, so the loop sees it even between awaits.
        self.shutdown.notify_one();
    }
}

impl Drop for WsPushChannel {
    fn drop(&mut self) {
        self.close();
    }
}

impl PushChannel for WsPushChannel {
    fn subscribe_events(&self) -> Subscription<PushEvent> {
        Subscription::new(self.events_tx.subscribe())
    }

    fn connection_state(&self) -> watch::Receiver<bool> {
        self.connected_tx.subscribe()
    }
}

async fn connection_loop(
    settings: WsChannelSettings,
    events_tx: broadcast::Sender<PushEvent>,
    connected_tx: watch::Sender<bool>,
    shutdown: Arc<Notify>,
) {
    let mut backoff = settings.initial_backoff;

    loop {
        let attempt = tokio::select! {
            _ = shutdown.notified() => return,
            attempt = connect_async(settings.url.as_str()) => attempt,
        };

        match attempt {
            Ok((stream, _response)) => {
                info!(url = %settings.url, "push channel connected");
                backoff = settings.initial_backoff;
                connected_tx.send_replace(true);

                let end = read_events(stream, &events_tx, &shutdown).await;
                connected_tx.send_replace(false);
                if matches!(end, StreamEnd::Shutdown) {
                    return;
                }
                warn!("push channel disconnected");
            }
            Err(error) => {
                warn!(
                    url = %settings.url,
                    %error,
                    backoff_ms = backoff.as_millis(),
                    "push channel connect failed"
                );
            }
        }

        tokio::select! {
            _ = shutdown.notified() => return,
            _ = tokio::time::sleep(backoff) => {}
        }
        backoff = next_backoff(backoff, settings.max_backoff);
    }
}

async fn read_events(
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
    events_tx: &broadcast::Sender<PushEvent>,
    shutdown: &Notify,
) -> StreamEnd {
    let (mut write, mut read) = stream.split();

    loop {
        let incoming = tokio::select! {
            _ = shutdown.notified() => {
                let _ = write.send(Message::Close(None)).await;
                return StreamEnd::Shutdown;
            }
            incoming = read.next() => incoming,
        };

        match incoming {
            Some(Ok(Message::Text(text))) => forward_event(text.as_str(), events_tx),
            Some(Ok(Message::Close(frame))) => {
                debug!(?frame, "server closed push channel");
                return StreamEnd::Disconnected;
            }
            // Pings are answered by tungstenite; binary frames are not part of the protocol.
            Some(Ok(_)) => {}
            Some(Err(error)) => {
                warn!(%error, "push channel read error");
                return StreamEnd::Disconnected;
            }
            None => return StreamEnd::Disconnected,
        }
    }
}

fn next_backoff(current: Duration, max: Duration) -> Duration {
    current.saturating_mul(2).min(max)
}

fn forward_event(text: &str, events_tx: &broadcast::Sender<PushEvent>) {
    match decode_event(text) {
        Ok(event) => {
            debug!(assignment_id = %event.assignment_id(), "push event received");
            // A send error only means nobody is subscribed yet; the event is dropped.
            let _ = events_tx.send(event);
        }
        Err(error) => {
            warn!(%error, bytes = text.len(), "dropping push event");
        }
    }
}
