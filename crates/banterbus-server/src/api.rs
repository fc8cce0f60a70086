use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use serde::Serialize;

use crate::state::AppState;
use crate::ws;

/// Assemble the full router: the WebSocket transport, the health probe and
/// the administrative sweep.
pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/ws", axum::routing::get(ws::ws_handler))
        .route("/health", axum::routing::get(health_check))
        .route(
            "/api/v1/player:disconnect",
            axum::routing::put(disconnect_players),
        )
        .with_state(state)
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Debug, Serialize)]
pub struct DisconnectPlayers {
    pub disconnected_players: Vec<String>,
}

/// Sweep every player with a disconnect stamp, removing those whose grace
/// period has elapsed and fixing up their room's player count.
async fn disconnect_players(
    State(state): State<AppState>,
) -> Result<Json<DisconnectPlayers>, ApiError> {
    let grace = state.settings.disconnect_timer_in_seconds;
    let candidates = state
        .players
        .get_disconnected()
        .await
        .map_err(ApiError::internal)?;

    let mut disconnected_players = Vec::new();
    for candidate in candidates {
        let Some(room_id) = candidate.room_id.clone() else {
            continue;
        };

        let _guard = state.locks.acquire(&room_id).await;
        let (player, removed) = state
            .players
            .disconnect_player(&candidate.nickname, &room_id, grace)
            .await
            .map_err(ApiError::internal)?;
        if !removed {
            continue;
        }

        match state.rooms.get(&room_id).await {
            Ok(room) => {
                state
                    .rooms
                    .update_player_count(&room, false)
                    .await
                    .map_err(ApiError::internal)?;
            }
            Err(e) => {
                tracing::warn!(room_id, error = %e, "swept player from an unknown room");
            }
        }

        state.transport.leave(&player.latest_sid, &room_id).await;
        disconnected_players.push(player.player_id);
    }

    tracing::info!(count = disconnected_players.len(), "player sweep completed");
    Ok(Json(DisconnectPlayers {
        disconnected_players,
    }))
}

#[derive(Debug)]
pub enum ApiError {
    Internal(String),
}

impl ApiError {
    fn internal(e: crate::error::Error) -> Self {
        tracing::error!(error = %e, "admin request failed");
        Self::Internal("failed to complete operation".to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let Self::Internal(message) = self;
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "error": message })),
        )
            .into_response()
    }
}
