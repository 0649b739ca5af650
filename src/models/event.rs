use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::role::Role;

/// Append-only game log shown to every player. Roles only ever appear in
/// entries for players who are already dead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameEvent {
    pub kind: EventKind,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub victim: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    GameStart,
    PhaseChange,
    Elimination,
    VotingStarted,
    VoteFailed,
    Accusation,
    Chat,
    System,
    GameOver,
}

impl GameEvent {
    pub fn new(kind: EventKind, message: impl Into<String>) -> Self {
        GameEvent {
            kind,
            message: message.into(),
            timestamp: Utc::now(),
            player: None,
            victim: None,
            role: None,
        }
    }

    pub fn chat(player_name: &str, message: impl Into<String>) -> Self {
        GameEvent {
            player: Some(player_name.to_string()),
            ..Self::new(EventKind::Chat, message)
        }
    }

    pub fn elimination(victim_name: &str, role: Option<Role>, message: impl Into<String>) -> Self {
        GameEvent {
            victim: Some(victim_name.to_string()),
            role,
            ..Self::new(EventKind::Elimination, message)
        }
    }
}
