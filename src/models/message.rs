use serde::{Deserialize, Serialize};

use super::error::{ErrorKind, GameError};
use super::night::NightOutcome;
use super::projection::RoomView;
use super::role::Role;

/// Inbound player intents, one JSON object per WebSocket text frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    CreateRoom {
        player_name: String,
        #[serde(default)]
        location: Option<serde_json::Value>,
    },
    JoinRoom {
        room_code: String,
        player_name: String,
        #[serde(default)]
        location: Option<serde_json::Value>,
    },
    StartGame,
    NightAction(NightActionKind),
    SendMessage {
        message: String,
    },
    AccusePlayer {
        target_id: String,
    },
    SecondAccusation {
        target_id: String,
    },
    CastVote {
        vote: bool,
    },
    PrayerPause {
        paused: bool,
    },
    HunterRevenge {
        target_id: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum NightActionKind {
    WerewolfKill { target_id: String },
    DoctorHeal { target_id: String },
    SeerCheck { target_id: String },
    WitchSave { target_id: String },
    WitchKill { target_id: String },
    WitchNothing,
    DetectiveCheck { first_id: String, second_id: String },
}

/// Outbound events. Targeted variants (role, seer/detective results, the
/// hunter prompt) only ever travel down that one player's channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    RoomCreated {
        room_code: String,
        player_id: String,
        state: RoomView,
    },
    RoomJoined {
        room_code: String,
        player_id: String,
        state: RoomView,
    },
    RoomUpdate {
        state: RoomView,
    },
    GameUpdate {
        state: RoomView,
    },
    RoleAssigned {
        role: Role,
        state: RoomView,
    },
    SeerResult {
        target_id: String,
        target_name: String,
        is_werewolf: bool,
    },
    DetectiveResult {
        same_team: bool,
    },
    NightResult {
        outcome: NightOutcome,
        state: RoomView,
    },
    PauseUpdate {
        paused: bool,
    },
    HunterRevengePrompt,
    Error {
        kind: ErrorKind,
        message: String,
    },
}

impl ServerMessage {
    pub fn error(err: &GameError) -> Self {
        ServerMessage::Error {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_messages_parse_from_tagged_json() {
        let msg: ClientMessage = serde_json::from_str(
            r#"{"type":"night_action","action":"werewolf_kill","target_id":"abc"}"#,
        )
        .unwrap();
        assert!(matches!(
            msg,
            ClientMessage::NightAction(NightActionKind::WerewolfKill { ref target_id })
                if target_id == "abc"
        ));

        let msg: ClientMessage =
            serde_json::from_str(r#"{"type":"create_room","player_name":"Amira"}"#).unwrap();
        assert!(matches!(msg, ClientMessage::CreateRoom { ref player_name, .. }
            if player_name == "Amira"));
    }

    #[test]
    fn errors_carry_a_machine_readable_kind() {
        let msg = ServerMessage::error(&GameError::RoomNotFound);
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "error");
        assert_eq!(json["kind"], "room_not_found");
    }
}
