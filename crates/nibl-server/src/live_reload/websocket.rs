//! WebSocket endpoint for live reload clients.
//!
//! The write half of each connection joins the hub; the read half is only
//! drained to notice when the browser goes away.

use std::sync::Arc;

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};

use super::hub::{Hub, ReloadSink};

/// Write half of a live reload websocket.
pub type WsSink = SplitSink<WebSocket, Message>;

/// Hub of websocket clients.
pub type ReloadHub = Hub<WsSink>;

impl ReloadSink for WsSink {
    type Error = axum::Error;

    async fn deliver(&mut self, payload: &str) -> Result<(), Self::Error> {
        SinkExt::send(self, Message::Text(payload.to_owned().into())).await
    }

    async fn close(&mut self) {
        let _ = SinkExt::close(self).await;
    }
}

/// Handle WebSocket upgrade for live reload.
pub(crate) async fn ws_handler(
    ws: WebSocketUpgrade,
    State(hub): State<Arc<ReloadHub>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, hub))
}

/// Register the connection and wait for it to end.
async fn handle_socket(socket: WebSocket, hub: Arc<ReloadHub>) {
    let (sink, mut stream) = socket.split();
    let id = hub.register(sink).await;

    while let Some(message) = stream.next().await {
        match message {
            Ok(Message::Close(_)) | Err(_) => break,
            Ok(_) => {}
        }
    }

    hub.unregister(id).await;
}
