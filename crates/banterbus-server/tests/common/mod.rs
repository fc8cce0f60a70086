use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use banterbus_management::testing::StaticCatalog;
use banterbus_server::config::Settings;
use banterbus_server::store::MemoryStore;
use banterbus_server::transport::WsTransport;
use banterbus_server::{AppState, build_app};

pub type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

pub struct TestServer {
    pub addr: SocketAddr,
    _handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    /// Start a test server against the in-memory store and the canned
    /// catalog.
    pub async fn new() -> Self {
        Self::with(Settings::default(), StaticCatalog::default()).await
    }

    pub async fn with(settings: Settings, catalog: StaticCatalog) -> Self {
        let store = Arc::new(MemoryStore::new());
        let catalog = Arc::new(catalog);
        let transport = Arc::new(WsTransport::new());
        let state = AppState::new(
            settings,
            Arc::clone(&store) as _,
            Arc::clone(&store) as _,
            store as _,
            Arc::clone(&catalog) as _,
            catalog as _,
            transport as _,
        );
        let app = build_app(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Give the server a moment to start accepting.
        tokio::time::sleep(Duration::from_millis(20)).await;

        Self {
            addr,
            _handle: handle,
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn ws_url(&self) -> String {
        format!("ws://{}/ws", self.addr)
    }
}

pub async fn ws_connect(server: &TestServer) -> WsStream {
    let (stream, _) = tokio_tungstenite::connect_async(server.ws_url()).await.unwrap();
    stream
}

/// Send one `{event, data}` frame.
pub async fn send_event(stream: &mut WsStream, event: &str, data: Value) {
    let frame = serde_json::json!({ "event": event, "data": data });
    stream
        .send(Message::Text(frame.to_string().into()))
        .await
        .unwrap();
}

/// Read the next frame as `(event, data)` (5s timeout).
pub async fn read_event(stream: &mut WsStream) -> (String, Value) {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            match stream.next().await {
                Some(Ok(Message::Text(text))) => {
                    let frame: Value = serde_json::from_str(text.as_str()).unwrap();
                    return (
                        frame["event"].as_str().unwrap().to_string(),
                        frame["data"].clone(),
                    );
                }
                Some(Ok(Message::Close(_))) => panic!("WebSocket closed unexpectedly"),
                Some(Err(e)) => panic!("WebSocket error: {e}"),
                None => panic!("WebSocket stream ended"),
                _ => continue,
            }
        }
    })
    .await
    .expect("Timed out waiting for WebSocket frame")
}

/// Read the next frame and require its event name.
pub async fn expect_event(stream: &mut WsStream, event: &str) -> Value {
    let (name, data) = read_event(stream).await;
    assert_eq!(name, event, "unexpected event, payload: {data}");
    data
}

/// Try to read a frame, returning `None` on timeout.
pub async fn try_read_event(stream: &mut WsStream, timeout_ms: u64) -> Option<(String, Value)> {
    tokio::time::timeout(Duration::from_millis(timeout_ms), read_event(stream))
        .await
        .ok()
}

/// CREATE_ROOM on this socket, returning the room code.
pub async fn create_room(stream: &mut WsStream) -> String {
    send_event(stream, "CREATE_ROOM", Value::Null).await;
    let data = expect_event(stream, "ROOM_CREATED").await;
    data["room_code"].as_str().unwrap().to_string()
}

/// JOIN_ROOM with a nickname, returning the allocated player id.
pub async fn join_room(stream: &mut WsStream, room_code: &str, nickname: &str) -> String {
    send_event(
        stream,
        "JOIN_ROOM",
        serde_json::json!({
            "nickname": nickname,
            "avatar": "aGVsbG8=",
            "room_code": room_code,
        }),
    )
    .await;
    let data = expect_event(stream, "NEW_ROOM_JOINED").await;
    let player_id = data["player_id"].as_str().unwrap().to_string();
    expect_event(stream, "ROOM_JOINED").await;
    player_id
}
