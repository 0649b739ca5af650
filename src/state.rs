use std::{collections::HashMap, sync::Arc};

use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::models::config::GameConfig;
use crate::models::message::ServerMessage;
use crate::models::room::Room;

/// A batch of targeted outbound messages, collected while the room lock is
/// held and delivered after it is released.
pub type Outbound = Vec<(String, ServerMessage)>;

pub type PlayerSender = mpsc::UnboundedSender<ServerMessage>;

#[derive(Clone)]
pub struct AppState {
    /// The room registry. Every mutation to a room happens under this lock,
    /// so one room never sees interleaved updates.
    pub rooms: Arc<Mutex<HashMap<String, Room>>>,
    /// Per-player outbound channels, keyed by player id. A room-wide
    /// broadcast channel would leak per-viewer projections, so fan-out is
    /// always per player.
    pub connections: Arc<Mutex<HashMap<String, PlayerSender>>>,
    /// One countdown task per room, keyed by room code. Starting a new one
    /// always aborts the old handle first.
    pub timers: Arc<Mutex<HashMap<String, JoinHandle<()>>>>,
    pub config: Arc<GameConfig>,
}

impl AppState {
    pub fn new(config: GameConfig) -> Self {
        AppState {
            rooms: Arc::new(Mutex::new(HashMap::new())),
            connections: Arc::new(Mutex::new(HashMap::new())),
            timers: Arc::new(Mutex::new(HashMap::new())),
            config: Arc::new(config),
        }
    }

    pub async fn register_connection(&self, player_id: &str, sender: PlayerSender) {
        self.connections
            .lock()
            .await
            .insert(player_id.to_string(), sender);
    }

    pub async fn drop_connection(&self, player_id: &str) {
        self.connections.lock().await.remove(player_id);
    }

    /// Deliver a batch of targeted messages. Senders for players who are no
    /// longer connected are skipped; their game state survives regardless.
    pub async fn deliver(&self, outbound: Outbound) {
        let connections = self.connections.lock().await;
        for (player_id, message) in outbound {
            match connections.get(&player_id) {
                Some(sender) => {
                    if sender.send(message).is_err() {
                        debug!(%player_id, "dropping message for closed connection");
                    }
                }
                None => debug!(%player_id, "no connection registered"),
            }
        }
    }

    /// Idempotent timer cancellation; called from room teardown.
    pub async fn cancel_timer(&self, room_code: &str) {
        if let Some(handle) = self.timers.lock().await.remove(room_code) {
            handle.abort();
            debug!(room_code, "timer cancelled");
        }
    }
}
