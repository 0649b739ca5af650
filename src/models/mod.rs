pub mod config;
pub mod day;
pub mod error;
pub mod event;
pub mod message;
pub mod night;
pub mod phase;
pub mod player;
pub mod projection;
pub mod role;
pub mod room;
