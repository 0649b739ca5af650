use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::{state::AppState, utils::websocket};

/// Viewer-less lobby summary. Carries nothing role-shaped, so it is safe to
/// hand to anyone holding the code.
#[derive(Debug, Serialize, Deserialize)]
pub struct RoomSummary {
    pub room_code: String,
    pub players: usize,
    pub game_started: bool,
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        // Lobby peek before joining
        // curl http://localhost:8080/api/room/{code}
        .route("/:code", get(room_summary))
        // All gameplay travels over this socket
        // websocat ws://localhost:8080/api/room/ws
        .route("/ws", get(websocket::handler))
        .with_state(state)
}

async fn room_summary(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> impl IntoResponse {
    let rooms = state.rooms.lock().await;
    match rooms.get(&code) {
        Some(room) => (
            StatusCode::OK,
            Json(serde_json::json!(RoomSummary {
                room_code: room.code.clone(),
                players: room.players.len(),
                game_started: room.started(),
            })),
        ),
        None => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({ "message": "Room not found" })),
        ),
    }
}
