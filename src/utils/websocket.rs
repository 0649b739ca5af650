use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::IntoResponse,
};
use futures::{sink::SinkExt, stream::StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::models::error::GameError;
use crate::models::message::{ClientMessage, ServerMessage};
use crate::services::game_service::{self, ActionResult};
use crate::services::room_service;
use crate::state::AppState;

/// The (room code, player id) pair a connection acquires on its first
/// successful create/join and keeps until it closes.
struct Session {
    room_code: String,
    player_id: String,
}

pub async fn handler(State(state): State<AppState>, ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

pub async fn handle_socket(ws: WebSocket, state: AppState) {
    info!("new WebSocket connection");
    let (mut sink, mut stream) = ws.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();

    // Outbound pump: everything addressed to this player funnels through
    // one channel so every client observes updates in mutation order.
    let send_task = tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            let text = match serde_json::to_string(&message) {
                Ok(text) => text,
                Err(e) => {
                    warn!("failed to encode server message: {}", e);
                    continue;
                }
            };
            if sink.send(Message::Text(text)).await.is_err() {
                break;
            }
        }
    });

    let mut session: Option<Session> = None;

    while let Some(Ok(msg)) = stream.next().await {
        match msg {
            Message::Text(text) => match serde_json::from_str::<ClientMessage>(&text) {
                Ok(message) => dispatch(&state, &tx, &mut session, message).await,
                Err(e) => debug!("ignoring malformed client message: {}", e),
            },
            Message::Close(_) => break,
            _ => {}
        }
    }

    if let Some(session) = session {
        info!(room_code = %session.room_code, player_id = %session.player_id, "connection closed");
        state.drop_connection(&session.player_id).await;
        let outbound =
            room_service::handle_disconnect(&state, &session.room_code, &session.player_id).await;
        state.deliver(outbound).await;
    }
    send_task.abort();
}

async fn dispatch(
    state: &AppState,
    tx: &mpsc::UnboundedSender<ServerMessage>,
    session: &mut Option<Session>,
    message: ClientMessage,
) {
    // Until the first create/join succeeds the connection belongs to no
    // room; afterwards it is pinned to one for its whole lifetime.
    let (code, pid) = match session.as_ref() {
        Some(s) => (s.room_code.clone(), s.player_id.clone()),
        None => {
            match message {
                ClientMessage::CreateRoom { player_name, location } => {
                    let (room_code, player_id, outbound) =
                        room_service::create_room(state, player_name, location).await;
                    state.register_connection(&player_id, tx.clone()).await;
                    *session = Some(Session { room_code, player_id });
                    state.deliver(outbound).await;
                }
                ClientMessage::JoinRoom { room_code, player_name, location } => {
                    match room_service::join_room(state, &room_code, player_name, location).await {
                        Ok((player_id, outbound)) => {
                            state.register_connection(&player_id, tx.clone()).await;
                            *session = Some(Session { room_code, player_id });
                            state.deliver(outbound).await;
                        }
                        Err(e) => send_error(tx, &e),
                    }
                }
                _ => send_error(tx, &GameError::NotInRoom),
            }
            return;
        }
    };

    match message {
        ClientMessage::CreateRoom { .. } | ClientMessage::JoinRoom { .. } => {
            debug!("create/join on a connection already in a room ignored");
        }
        ClientMessage::StartGame => match game_service::start_game(state, &code, &pid).await {
            Ok(outbound) => state.deliver(outbound).await,
            Err(e) => send_error(tx, &e),
        },
        ClientMessage::NightAction(action) => {
            apply(state, game_service::night_action(state, &code, &pid, action).await).await;
        }
        ClientMessage::SendMessage { message } => {
            apply(state, game_service::send_chat(state, &code, &pid, message).await).await;
        }
        ClientMessage::AccusePlayer { target_id } => {
            apply(state, game_service::accuse(state, &code, &pid, &target_id).await).await;
        }
        ClientMessage::SecondAccusation { target_id } => {
            apply(
                state,
                game_service::second_accusation(state, &code, &pid, &target_id).await,
            )
            .await;
        }
        ClientMessage::CastVote { vote } => {
            apply(state, game_service::cast_vote(state, &code, &pid, vote).await).await;
        }
        ClientMessage::PrayerPause { paused } => {
            match game_service::set_pause(state, &code, paused).await {
                Ok(outbound) => state.deliver(outbound).await,
                Err(e) => send_error(tx, &e),
            }
        }
        ClientMessage::HunterRevenge { target_id } => {
            apply(
                state,
                game_service::hunter_revenge(state, &code, &pid, &target_id).await,
            )
            .await;
        }
    }
}

/// Applied actions fan out; ignored ones die here with a trace line and no
/// reply, so a probing client learns nothing about roles or phase state.
async fn apply(state: &AppState, result: ActionResult) {
    match result {
        ActionResult::Applied(outbound) => state.deliver(outbound).await,
        ActionResult::Ignored(reason) => debug!(?reason, "action ignored"),
    }
}

fn send_error(tx: &mpsc::UnboundedSender<ServerMessage>, err: &GameError) {
    let _ = tx.send(ServerMessage::error(err));
}
