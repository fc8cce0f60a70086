//! Inbound event dispatch: decode, lock the room, run the handler, emit.
//!
//! Every state-mutating handler for a given room runs under that room's
//! lock, held from before the first read until after the last emit. Known
//! failures become a single `ERROR` frame to the originating sid; anything
//! unmapped is logged and reported as `server_error`.

use std::collections::HashMap;
use std::sync::Arc;

use banterbus_core::events::inbound::{
    CreateRoom, GetAnswersFibbingIt, GetNextQuestion, JoinRoom, KickPlayer, PauseGame,
    PermanentlyDisconnectPlayer, RejoinRoom, StartGame, SubmitAnswerFibbingIt, UnpauseGame,
};
use banterbus_core::events::outbound::ErrorEvent;
use banterbus_core::events::{Frame, InboundEvent, OutboundEvent};
use serde_json::Value;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::error::Result;
use crate::handlers;
use crate::state::AppState;
use crate::transport::EmitTarget;

/// Per-room mutual exclusion. Handlers for the same room serialize on the
/// room's mutex; cross-room traffic never contends.
#[derive(Default)]
pub struct RoomLocks {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl RoomLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, room_id: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            Arc::clone(locks.entry(room_id.to_string()).or_default())
        };
        lock.lock_owned().await
    }
}

/// One outbound frame a handler wants sent.
#[derive(Debug)]
pub struct Emit {
    pub target: EmitTarget,
    pub event: &'static str,
    pub payload: Value,
}

impl Emit {
    pub fn to_sid<E: OutboundEvent>(sid: &str, event: &E) -> Self {
        Self {
            target: EmitTarget::Sid(sid.to_string()),
            event: E::NAME,
            payload: encode(event),
        }
    }

    pub fn to_room<E: OutboundEvent>(room_id: &str, event: &E) -> Self {
        Self {
            target: EmitTarget::Room(room_id.to_string()),
            event: E::NAME,
            payload: encode(event),
        }
    }

    pub fn error(sid: &str, code: &str, message: impl Into<String>) -> Self {
        Self::to_sid(sid, &ErrorEvent::new(code, message.into()))
    }
}

fn encode<E: OutboundEvent>(event: &E) -> Value {
    serde_json::to_value(event).expect("outbound payload serialization must succeed")
}

/// Route one decoded frame to its handler.
pub async fn dispatch(state: &AppState, sid: &str, frame: Frame) {
    let Frame { event, data } = frame;
    match event.as_str() {
        name if name == CreateRoom::NAME => {
            run(state, sid, data, handlers::room::create_room).await
        }
        name if name == JoinRoom::NAME => run(state, sid, data, handlers::lobby::join_room).await,
        name if name == RejoinRoom::NAME => {
            run(state, sid, data, handlers::lobby::rejoin_room).await
        }
        name if name == KickPlayer::NAME => {
            run(state, sid, data, handlers::lobby::kick_player).await
        }
        name if name == StartGame::NAME => {
            run(state, sid, data, handlers::lobby::start_game).await
        }
        name if name == GetNextQuestion::NAME => {
            run(state, sid, data, handlers::game::get_next_question).await
        }
        name if name == PauseGame::NAME => {
            run(state, sid, data, handlers::room::pause_game).await
        }
        name if name == UnpauseGame::NAME => {
            run(state, sid, data, handlers::room::unpause_game).await
        }
        name if name == PermanentlyDisconnectPlayer::NAME => {
            run(
                state,
                sid,
                data,
                handlers::room::permanently_disconnect_player,
            )
            .await
        }
        name if name == SubmitAnswerFibbingIt::NAME => {
            run(state, sid, data, handlers::game::submit_answer_fibbing_it).await
        }
        name if name == GetAnswersFibbingIt::NAME => {
            run(state, sid, data, handlers::game::get_answers_fibbing_it).await
        }
        _ => tracing::debug!(%event, %sid, "ignoring unknown event"),
    }
}

/// Decode → lock → handle → emit for one inbound event.
async fn run<In, F, Fut>(state: &AppState, sid: &str, data: Value, handler: F)
where
    In: InboundEvent,
    F: FnOnce(AppState, String, In) -> Fut,
    Fut: Future<Output = Result<Vec<Emit>>>,
{
    // Events without a payload arrive with `data` absent.
    let data = if data.is_null() {
        Value::Object(serde_json::Map::new())
    } else {
        data
    };

    let event: In = match serde_json::from_value(data) {
        Ok(event) => event,
        Err(e) => {
            tracing::warn!(event = In::NAME, %sid, error = %e, "malformed event payload");
            let error = Emit::error(
                sid,
                "server_error",
                "An unexpected error occurred on the server",
            );
            emit_all(state, vec![error]).await;
            return;
        }
    };

    tracing::debug!(event = In::NAME, %sid, "handling event");

    // Held until after the emits below, so room observers see effects in
    // lock-acquisition order.
    let _guard = match event.room_scope() {
        Some(room_id) => Some(state.locks.acquire(room_id).await),
        None => None,
    };

    match handler(state.clone(), sid.to_string(), event).await {
        Ok(emits) => emit_all(state, emits).await,
        Err(e) => {
            tracing::error!(event = In::NAME, %sid, error = %e, "handler failed");
            emit_all(state, vec![Emit::error(sid, e.code(), e.user_message())]).await;
        }
    }
}

/// Send a batch of emits, logging each with the configured field exclusions
/// applied.
pub(crate) async fn emit_all(state: &AppState, emits: Vec<Emit>) {
    for emit in emits {
        if tracing::enabled!(tracing::Level::DEBUG) {
            let scrubbed =
                scrub_payload(&emit.payload, &state.settings.log_response_exclude_attr);
            tracing::debug!(event = emit.event, payload = %scrubbed, "emitting");
        }
        state
            .transport
            .emit(&emit.target, emit.event, emit.payload)
            .await;
    }
}

/// Drop configured nested keys from a response payload before it reaches
/// the logs. The wire payload is untouched.
fn scrub_payload(payload: &Value, exclude: &HashMap<String, Vec<String>>) -> Value {
    let mut scrubbed = payload.clone();
    let Some(object) = scrubbed.as_object_mut() else {
        return scrubbed;
    };

    for (field, keys) in exclude {
        match object.get_mut(field) {
            Some(Value::Array(items)) => {
                for item in items {
                    if let Some(item) = item.as_object_mut() {
                        for key in keys {
                            item.remove(key);
                        }
                    }
                }
            }
            Some(Value::Object(nested)) => {
                for key in keys {
                    nested.remove(key);
                }
            }
            _ => {}
        }
    }
    scrubbed
}
