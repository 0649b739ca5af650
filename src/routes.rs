use axum::{extract::State, routing::get, Json, Router};
use serde_json::json;

use crate::state::AppState;

mod room;

pub fn create_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health).with_state(state.clone()))
        .nest("/api/room", room::routes(state))
}

async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    let rooms = state.rooms.lock().await;
    Json(json!({
        "status": "Server is running",
        "rooms": rooms.len(),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
