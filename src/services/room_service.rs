use rand::Rng;
use tracing::info;

use crate::models::error::GameError;
use crate::models::message::ServerMessage;
use crate::models::room::Room;
use crate::services::game_service;
use crate::state::{AppState, Outbound};

const CODE_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const CODE_LEN: usize = 6;

fn generate_room_code<R: Rng>(rng: &mut R) -> String {
    (0..CODE_LEN)
        .map(|_| CODE_CHARSET[rng.gen_range(0..CODE_CHARSET.len())] as char)
        .collect()
}

/// Fresh per-player update for everyone still seated in the room.
pub fn room_updates(room: &Room) -> Outbound {
    room.players
        .iter()
        .map(|p| {
            (
                p.id.clone(),
                ServerMessage::RoomUpdate {
                    state: room.view_for(&p.id),
                },
            )
        })
        .collect()
}

pub async fn create_room(
    state: &AppState,
    player_name: String,
    location: Option<serde_json::Value>,
) -> (String, String, Outbound) {
    let mut rooms = state.rooms.lock().await;

    // Retry on the off chance a short code collides with a live room.
    let mut rng = rand::thread_rng();
    let code = loop {
        let candidate = generate_room_code(&mut rng);
        if !rooms.contains_key(&candidate) {
            break candidate;
        }
    };

    let player_id = uuid::Uuid::new_v4().to_string();
    let mut room = Room::new(code.clone());
    room.add_player(player_id.clone(), player_name.clone(), location);

    let mut outbound = vec![(
        player_id.clone(),
        ServerMessage::RoomCreated {
            room_code: code.clone(),
            player_id: player_id.clone(),
            state: room.view_for(&player_id),
        },
    )];
    outbound.extend(room_updates(&room));

    rooms.insert(code.clone(), room);
    info!(room_code = %code, host = %player_name, "room created");
    (code, player_id, outbound)
}

pub async fn join_room(
    state: &AppState,
    room_code: &str,
    player_name: String,
    location: Option<serde_json::Value>,
) -> Result<(String, Outbound), GameError> {
    let mut rooms = state.rooms.lock().await;
    let room = rooms.get_mut(room_code).ok_or(GameError::RoomNotFound)?;

    if room.started() {
        return Err(GameError::GameAlreadyStarted);
    }
    if room.players.len() >= state.config.max_players {
        return Err(GameError::RoomFull);
    }
    if room.players.iter().any(|p| p.name == player_name) {
        return Err(GameError::NameTaken);
    }

    let player_id = uuid::Uuid::new_v4().to_string();
    room.add_player(player_id.clone(), player_name.clone(), location);

    let mut outbound = vec![(
        player_id.clone(),
        ServerMessage::RoomJoined {
            room_code: room_code.to_string(),
            player_id: player_id.clone(),
            state: room.view_for(&player_id),
        },
    )];
    outbound.extend(room_updates(room));

    info!(room_code, player = %player_name, "player joined");
    Ok((player_id, outbound))
}

/// Connection-gone path. Before the game starts the seat is simply freed;
/// mid-game the player is kept (role and vote integrity) and only flagged
/// disconnected. The room is torn down, timer included, once nobody is left.
pub async fn handle_disconnect(state: &AppState, room_code: &str, player_id: &str) -> Outbound {
    let (outbound, destroy) = {
        let mut rooms = state.rooms.lock().await;
        let Some(room) = rooms.get_mut(room_code) else {
            return Vec::new();
        };

        if !room.started() {
            room.remove_player(player_id);
            if room.players.is_empty() {
                rooms.remove(room_code);
                (Vec::new(), true)
            } else {
                (room_updates(room), false)
            }
        } else {
            room.mark_disconnected(player_id);

            // A hunter who leaves while owing a shot forfeits it, otherwise
            // the room would wait on the win check forever.
            let mut outbound = if room.forfeit_revenge(player_id) {
                game_service::resume_after_revenge(room, &state.config)
            } else {
                game_service::game_updates(room)
            };

            if room.connected_count() == 0 {
                rooms.remove(room_code);
                outbound.clear();
                (outbound, true)
            } else {
                (outbound, false)
            }
        }
    };

    if destroy {
        state.cancel_timer(room_code).await;
        info!(room_code, "room destroyed");
    }
    outbound
}
