use axum::Router;

use crate::models::config::GameConfig;
use crate::routes;
use crate::state::AppState;

pub fn create_app(config: GameConfig) -> Router {
    let state = AppState::new(config);
    routes::create_routes(state)
}
