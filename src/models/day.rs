use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Day-phase scratch state. Built fresh on every day start.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DayActions {
    pub accusations: Vec<Accusation>,
    /// Voter id -> guilty flag. One entry per living voter at most.
    pub votes: HashMap<String, bool>,
    pub voting_target: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Accusation {
    pub accuser: String,
    pub accuser_id: String,
    pub target: String,
    pub target_id: String,
    pub timestamp: DateTime<Utc>,
}

impl DayActions {
    pub fn guilty_votes(&self) -> usize {
        self.votes.values().filter(|v| **v).count()
    }
}
