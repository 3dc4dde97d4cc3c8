//! WebSocket session lifecycle — handles a single subscriber from upgrade
//! through disconnect.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, StreamExt};
use newswire_core::{HistoryBuffer, ServerMessage};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

use super::broadcast::BroadcastHub;
use super::handler::handle_client_message;
use super::subscriber::Subscriber;

/// Items replayed to a subscriber right after connect.
const HISTORY_REPLAY_COUNT: usize = 10;

/// Outbound channel depth per subscriber.
const SEND_QUEUE_DEPTH: usize = 1024;

/// Run a WebSocket session for a connected subscriber.
///
/// 1. Registers the subscriber with the broadcast hub
/// 2. Replays recent history (if any), then sends the `connected` ack
/// 3. Forwards queued outbound messages and sends periodic Ping frames;
///    a peer silent past the heartbeat timeout gets a Close frame and the
///    whole session is torn down
/// 4. Dispatches incoming text frames as protocol messages
/// 5. Removes the subscriber on every exit path, including server shutdown
#[instrument(skip_all, fields(client_id = %client_id))]
pub async fn run_ws_session(
    ws: WebSocket,
    client_id: String,
    history: Arc<HistoryBuffer>,
    hub: Arc<BroadcastHub>,
    shutdown: CancellationToken,
    heartbeat_interval: Duration,
    heartbeat_timeout: Duration,
) {
    let (mut ws_tx, mut ws_rx) = ws.split();

    // Cancelled by server shutdown (parent) or by the outbound task when the
    // socket dies or the peer misses the heartbeat deadline.
    let session_token = shutdown.child_token();

    let (send_tx, mut send_rx) = mpsc::channel::<Arc<String>>(SEND_QUEUE_DEPTH);
    let subscriber = Arc::new(Subscriber::new(client_id.clone(), send_tx));

    info!(client_id, "subscriber connected");
    hub.add(subscriber.clone()).await;

    // Replay recent history before anything else, then the connect ack.
    let recent = history.recent(HISTORY_REPLAY_COUNT);
    if !recent.is_empty() {
        let replay = ServerMessage::History { data: recent }.to_json();
        let _ = ws_tx.send(Message::Text(replay.into())).await;
    }
    let ack = ServerMessage::Connected {
        message: "Connected to news server".into(),
        client_id: client_id.clone(),
    }
    .to_json();
    let _ = ws_tx.send(Message::Text(ack.into())).await;

    // Spawn the outbound forwarder with periodic Ping frames. Whatever ends
    // this task also ends the session: it cancels the session token on exit.
    let outbound_sub = subscriber.clone();
    let outbound_token = session_token.clone();
    let outbound = tokio::spawn(async move {
        let mut ping_interval = tokio::time::interval(heartbeat_interval);
        // Skip the immediate first tick
        let _ = ping_interval.tick().await;

        loop {
            tokio::select! {
                () = outbound_token.cancelled() => break,
                msg = send_rx.recv() => {
                    match msg {
                        Some(text) => {
                            if ws_tx.send(Message::Text(text.as_str().into())).await.is_err() {
                                break;
                            }
                        }
                        None => break,
                    }
                }
                _ = ping_interval.tick() => {
                    if !outbound_sub.check_alive()
                        && outbound_sub.last_pong_elapsed() > heartbeat_timeout
                    {
                        warn!("subscriber unresponsive for {heartbeat_timeout:?}, disconnecting");
                        let _ = ws_tx.send(Message::Close(None)).await;
                        break;
                    }
                    if ws_tx.send(Message::Ping(vec![].into())).await.is_err() {
                        break;
                    }
                }
            }
        }
        outbound_token.cancel();
    });

    // Process incoming frames until close, error, heartbeat death, or
    // server shutdown.
    loop {
        let msg = tokio::select! {
            () = session_token.cancelled() => {
                info!(client_id, "session cancelled");
                break;
            }
            msg = ws_rx.next() => msg,
        };

        let Some(Ok(msg)) = msg else { break };

        let text = match msg {
            Message::Text(ref t) => Some(t.to_string()),
            Message::Binary(ref data) => {
                if let Ok(s) = std::str::from_utf8(data) {
                    Some(s.to_string())
                } else {
                    info!(client_id, len = data.len(), "received non-UTF8 binary frame");
                    None
                }
            }
            Message::Close(_) => {
                info!(client_id, "subscriber sent close frame");
                break;
            }
            Message::Ping(_) | Message::Pong(_) => {
                subscriber.mark_alive();
                None
            }
        };

        let Some(text) = text else { continue };

        subscriber.mark_alive();
        let reply = handle_client_message(&text, &history, history.capacity());
        if !subscriber.send_message(&reply) {
            info!(client_id, "failed to enqueue reply (channel full or closed)");
        }
    }

    // Teardown runs on every exit path; removal is idempotent.
    info!(client_id, "subscriber disconnected");
    outbound.abort();
    hub.remove(&client_id).await;
}
