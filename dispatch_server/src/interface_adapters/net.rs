// Staff WebSocket: one socket per staff member, fed from a dispatcher outbox.

use crate::interface_adapters::protocol::{ErrorResponse, ServerEvent};
use crate::interface_adapters::state::AppState;
use crate::use_cases::OutboundEvent;

use axum::{
    Json,
    extract::{
        Query, State,
        ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade, close_code},
    },
    http::StatusCode,
    response::IntoResponse,
};
use futures::{SinkExt, StreamExt, stream::SplitSink};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{Instrument, debug, error, info, info_span, warn};

#[derive(Debug)]
enum NetError {
    #[allow(dead_code)]
    Ws(axum::Error),
    #[allow(dead_code)]
    Serialization(serde_json::Error),
}

impl From<axum::Error> for NetError {
    fn from(e: axum::Error) -> Self {
        NetError::Ws(e)
    }
}

// Distinguishes a replacing socket from the one it replaced.
static NEXT_CONNECTION_TOKEN: AtomicU64 = AtomicU64::new(1);

fn connection_token() -> u64 {
    NEXT_CONNECTION_TOKEN.fetch_add(1, Ordering::Relaxed)
}

#[derive(Debug, serde::Deserialize)]
pub struct StaffQuery {
    #[serde(rename = "staffId", default)]
    staff_id: Option<String>,
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Query(query): Query<StaffQuery>,
) -> impl IntoResponse {
    let Some(staff_id) = query
        .staff_id
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
    else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                message: "staffId is required".to_string(),
            }),
        )
            .into_response();
    };

    ws.on_upgrade(move |socket| {
        let token = connection_token();
        let span = info_span!("conn", token, %staff_id);
        handle_socket(socket, state, staff_id, token).instrument(span)
    })
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, staff_id: String, token: u64) {
    let (outbox_tx, outbox_rx) = mpsc::channel(state.outbox_capacity);

    // Registering also queues every offer still open for this staff member.
    let repushed = state.dispatcher.lock().await.register_connection(
        &staff_id,
        token,
        outbox_tx,
        Instant::now(),
    );
    info!(repushed, "staff connected");

    if let Err(e) = run_connection(socket, outbox_rx).await {
        warn!(error = ?e, "connection loop exited with error");
    }

    let owned = state
        .dispatcher
        .lock()
        .await
        .unregister_connection(&staff_id, token);
    info!(owned, "staff disconnected");
}

async fn run_connection(
    socket: WebSocket,
    mut outbox_rx: mpsc::Receiver<OutboundEvent>,
) -> Result<(), NetError> {
    let (mut sender, mut receiver) = socket.split();

    loop {
        tokio::select! {
            event = outbox_rx.recv() => {
                let Some(event) = event else {
                    // The dispatcher dropped our outbox: a newer socket took over.
                    info!("connection superseded; closing");
                    let _ = sender
                        .send(Message::Close(Some(CloseFrame {
                            code: close_code::NORMAL,
                            reason: "replaced by newer connection".into(),
                        })))
                        .await;
                    return Ok(());
                };
                send_event(&mut sender, event).await?;
            }
            incoming = receiver.next() => {
                match incoming {
                    None | Some(Ok(Message::Close(_))) => {
                        debug!("client closed connection");
                        return Ok(());
                    }
                    Some(Ok(_)) => {
                        // Decisions travel over HTTP; inbound frames carry nothing.
                    }
                    Some(Err(e)) => return Err(NetError::Ws(e)),
                }
            }
        }
    }
}

async fn send_event(
    sender: &mut SplitSink<WebSocket, Message>,
    event: OutboundEvent,
) -> Result<(), NetError> {
    let txt = serde_json::to_string(&ServerEvent::from(event)).map_err(|e| {
        error!(error = ?e, "failed to serialize server event");
        NetError::Serialization(e)
    })?;
    sender.send(Message::Text(txt.into())).await?;
    Ok(())
}
