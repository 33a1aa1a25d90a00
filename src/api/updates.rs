//! Responsible for the live update WebSocket

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::Response;
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use tokio::sync::broadcast::error::RecvError;
use tracing::{error, info};

use crate::api::AppState;
use crate::notify::DataUpdate;

pub async fn updates(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| client_connection(socket, state))
}

async fn client_connection(socket: WebSocket, state: AppState) {
    let (mut sender, mut receiver) = socket.split();
    let mut updates = state.updates.subscribe();

    // Snapshot first so a fresh client doesn't wait for the next write.
    let data = state.store.snapshot().await;
    let initial = DataUpdate {
        orders: data.orders,
        customers: data.customers,
    };
    if send_update(&mut sender, &initial).await.is_err() {
        return;
    }

    loop {
        tokio::select! {
            update = updates.recv() => match update {
                Ok(update) => {
                    if send_update(&mut sender, &update).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    // Every update is a full snapshot, the next one
                    // catches the client up.
                    info!("client lagged {skipped} updates");
                }
                Err(RecvError::Closed) => break,
            },
            message = receiver.next() => match message {
                Some(Ok(_)) => {} // clients only listen
                _ => break,
            },
        }
    }
}

async fn send_update(
    sender: &mut SplitSink<WebSocket, Message>,
    update: &DataUpdate,
) -> Result<(), axum::Error> {
    let text = match serde_json::to_string(update) {
        Ok(text) => text,
        Err(e) => {
            error!("error serializing update: {e}");
            return Ok(());
        }
    };

    sender.send(Message::Text(text.into())).await
}
