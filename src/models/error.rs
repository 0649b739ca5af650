use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that are surfaced to the acting client. Everything role- or
/// phase-shaped is deliberately *not* here: those are dropped without a
/// response so an error message can never reveal who holds which role.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Room not found")]
    RoomNotFound,
    #[error("Game already started")]
    GameAlreadyStarted,
    #[error("Need at least {0} players")]
    InsufficientPlayers(usize),
    #[error("Only the host can start the game")]
    NotHost,
    #[error("Room is full")]
    RoomFull,
    #[error("That name is already taken")]
    NameTaken,
    #[error("You are not in a room")]
    NotInRoom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    RoomNotFound,
    GameAlreadyStarted,
    InsufficientPlayers,
    NotHost,
    RoomFull,
    NameTaken,
    NotInRoom,
}

impl GameError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GameError::RoomNotFound => ErrorKind::RoomNotFound,
            GameError::GameAlreadyStarted => ErrorKind::GameAlreadyStarted,
            GameError::InsufficientPlayers(_) => ErrorKind::InsufficientPlayers,
            GameError::NotHost => ErrorKind::NotHost,
            GameError::RoomFull => ErrorKind::RoomFull,
            GameError::NameTaken => ErrorKind::NameTaken,
            GameError::NotInRoom => ErrorKind::NotInRoom,
        }
    }
}

/// Why a gameplay action was dropped on the floor. Never serialized, never
/// sent to a client; only traced server-side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoredReason {
    WrongPhase,
    NotAlive,
    WrongRole,
    AbilityAlreadyUsed,
    AlreadyVoted,
    UnknownTarget,
    NoSuchRoom,
    NotPendingHunter,
    SelfSecond,
}
