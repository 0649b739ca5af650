use serde::{Deserialize, Serialize};

use super::config::GameConfig;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    Waiting,
    Night,
    Day,
    Voting,
    GameOver,
}

impl Phase {
    /// Countdown seconds for a timed phase. Waiting and GameOver are not
    /// driven by the scheduler.
    pub fn duration(&self, config: &GameConfig) -> u64 {
        match self {
            Phase::Night => config.night_seconds,
            Phase::Day => config.day_seconds,
            Phase::Voting => config.voting_seconds,
            Phase::Waiting | Phase::GameOver => 0,
        }
    }
}
