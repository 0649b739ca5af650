use std::time::Duration;

use tokio::time::{interval, MissedTickBehavior};
use tracing::debug;

use crate::services::game_service;
use crate::state::AppState;

/// Spawn the 1 Hz countdown task for a room, replacing (and aborting) any
/// previous one so a single room can never be driven by two timers. The
/// task holds only the room code; when the room disappears from the
/// registry the next tick simply finds nothing and the task winds down.
pub async fn start_timer(state: AppState, room_code: String) {
    let mut timers = state.timers.lock().await;
    if let Some(old) = timers.remove(&room_code) {
        old.abort();
        debug!(%room_code, "replaced existing timer");
    }

    let task_state = state.clone();
    let code = room_code.clone();
    let handle = tokio::spawn(async move {
        let mut ticker = interval(Duration::from_secs(1));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // Consume the immediate first tick so the countdown starts one
        // full second after the phase begins.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            match game_service::tick(&task_state, &code).await {
                Some(outbound) => task_state.deliver(outbound).await,
                None => break,
            }
        }
        debug!(room_code = %code, "timer stopped");
    });

    timers.insert(room_code, handle);
}
