use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use banterbus_core::events::Frame;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::dispatcher;
use crate::handlers;
use crate::state::AppState;
use crate::transport::EmitTarget;

pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let sid = Uuid::new_v4().to_string();
    let (ws_sender, mut ws_receiver) = socket.split();

    let (tx, rx) = mpsc::unbounded_channel::<String>();
    state.transport.register(&sid, tx).await;
    spawn_writer(ws_sender, rx);

    tracing::info!(%sid, "client connected");

    while let Some(Ok(msg)) = ws_receiver.next().await {
        let text = match msg {
            Message::Text(text) => text,
            Message::Close(_) => break,
            _ => continue,
        };

        match serde_json::from_str::<Frame>(text.as_str()) {
            Ok(frame) => dispatcher::dispatch(&state, &sid, frame).await,
            Err(e) => {
                tracing::warn!(%sid, error = %e, "unparseable frame");
                let error = serde_json::json!({
                    "code": "server_error",
                    "message": "An unexpected error occurred on the server",
                });
                state
                    .transport
                    .emit(&EmitTarget::Sid(sid.clone()), "ERROR", error)
                    .await;
            }
        }
    }

    // Socket gone: stamp the disconnect, hand off host, pause if playing.
    handlers::room::player_disconnected(&state, &sid).await;
    state.transport.unregister(&sid).await;
    tracing::info!(%sid, "client disconnected");
}

fn spawn_writer(
    mut ws_sender: futures::stream::SplitSink<WebSocket, Message>,
    mut rx: mpsc::UnboundedReceiver<String>,
) {
    tokio::spawn(async move {
        while let Some(text) = rx.recv().await {
            if ws_sender.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    });
}
