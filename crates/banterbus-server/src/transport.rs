//! Transport adapter: carries typed frames between handlers and the
//! connected sockets.
//!
//! Handlers only see [`Transport`]; the WebSocket layer registers each
//! connection's outbound channel here. Emits to a dropped connection are
//! no-ops, so a client vanishing mid-handler never fails the handler.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use banterbus_core::events::Frame;
use tokio::sync::{Mutex, RwLock, mpsc};

/// Session id assigned to each connection.
pub type Sid = String;

/// Recipient of an outbound emit: one socket or a whole room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmitTarget {
    Sid(Sid),
    Room(String),
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn emit(&self, target: &EmitTarget, event: &str, payload: serde_json::Value);

    /// Subscribe a session to a room channel.
    async fn join(&self, sid: &str, room_id: &str);

    /// Detach a session from a room channel.
    async fn leave(&self, sid: &str, room_id: &str);

    /// Attach a connection's outbound channel.
    async fn register(&self, sid: &str, sender: mpsc::UnboundedSender<String>);

    /// Drop a connection and its room memberships.
    async fn unregister(&self, sid: &str);
}

/// WebSocket-backed transport: per-sid outbound senders and per-room
/// membership sets.
#[derive(Default)]
pub struct WsTransport {
    senders: RwLock<HashMap<Sid, mpsc::UnboundedSender<String>>>,
    rooms: RwLock<HashMap<String, HashSet<Sid>>>,
}

impl WsTransport {
    pub fn new() -> Self {
        Self::default()
    }

    async fn send_to(&self, sid: &str, text: &str) {
        let senders = self.senders.read().await;
        if let Some(sender) = senders.get(sid) {
            // A closed channel means the socket is gone; the disconnect
            // path cleans the registry up.
            let _ = sender.send(text.to_string());
        }
    }
}

fn encode(event: &str, payload: serde_json::Value) -> String {
    let frame = Frame {
        event: event.to_string(),
        data: payload,
    };
    serde_json::to_string(&frame).expect("outbound frame serialization must succeed")
}

#[async_trait]
impl Transport for WsTransport {
    async fn emit(&self, target: &EmitTarget, event: &str, payload: serde_json::Value) {
        let text = encode(event, payload);
        match target {
            EmitTarget::Sid(sid) => self.send_to(sid, &text).await,
            EmitTarget::Room(room_id) => {
                let members: Vec<Sid> = {
                    let rooms = self.rooms.read().await;
                    rooms
                        .get(room_id)
                        .map(|sids| sids.iter().cloned().collect())
                        .unwrap_or_default()
                };
                for sid in members {
                    self.send_to(&sid, &text).await;
                }
            }
        }
    }

    async fn join(&self, sid: &str, room_id: &str) {
        let mut rooms = self.rooms.write().await;
        rooms
            .entry(room_id.to_string())
            .or_default()
            .insert(sid.to_string());
    }

    async fn leave(&self, sid: &str, room_id: &str) {
        let mut rooms = self.rooms.write().await;
        if let Some(members) = rooms.get_mut(room_id) {
            members.remove(sid);
            if members.is_empty() {
                rooms.remove(room_id);
            }
        }
    }

    async fn register(&self, sid: &str, sender: mpsc::UnboundedSender<String>) {
        self.senders.write().await.insert(sid.to_string(), sender);
    }

    async fn unregister(&self, sid: &str) {
        self.senders.write().await.remove(sid);
        let mut rooms = self.rooms.write().await;
        rooms.retain(|_, members| {
            members.remove(sid);
            !members.is_empty()
        });
    }
}

/// One emit captured by [`RecordingTransport`].
#[derive(Debug, Clone)]
pub struct RecordedEmit {
    pub target: EmitTarget,
    pub event: String,
    pub payload: serde_json::Value,
}

/// Records emits and room membership instead of delivering anything.
/// Backs the handler tests.
#[derive(Default)]
pub struct RecordingTransport {
    pub emits: Mutex<Vec<RecordedEmit>>,
    pub rooms: Mutex<HashMap<String, HashSet<Sid>>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn take_emits(&self) -> Vec<RecordedEmit> {
        std::mem::take(&mut *self.emits.lock().await)
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn emit(&self, target: &EmitTarget, event: &str, payload: serde_json::Value) {
        self.emits.lock().await.push(RecordedEmit {
            target: target.clone(),
            event: event.to_string(),
            payload,
        });
    }

    async fn join(&self, sid: &str, room_id: &str) {
        self.rooms
            .lock()
            .await
            .entry(room_id.to_string())
            .or_default()
            .insert(sid.to_string());
    }

    async fn leave(&self, sid: &str, room_id: &str) {
        if let Some(members) = self.rooms.lock().await.get_mut(room_id) {
            members.remove(sid);
        }
    }

    async fn register(&self, _sid: &str, _sender: mpsc::UnboundedSender<String>) {}

    async fn unregister(&self, _sid: &str) {}
}
