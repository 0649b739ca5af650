use serde::{Deserialize, Serialize};

/// Night-phase scratch state. Built fresh on every night start and read
/// exactly once at dawn; never reused across rounds.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NightActions {
    /// Shared pack target, last werewolf submission wins.
    pub werewolf_target: Option<String>,
    pub doctor_target: Option<String>,
    pub seer_target: Option<String>,
    pub seer_result: Option<SeerResult>,
    pub witch_save: Option<String>,
    pub witch_kill: Option<String>,
    pub detective_check: Option<DetectiveCheck>,
    pub detective_result: Option<bool>,
    /// Player id of a Hunter eliminated tonight whose revenge shot is still
    /// owed. While set, the win check and the dawn transition are deferred.
    pub pending_hunter: Option<String>,
    /// Dawn outcome parked while a hunter revenge interrupts the transition,
    /// broadcast once the shot lands or is forfeited.
    pub deferred_outcome: Option<NightOutcome>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeerResult {
    pub target: String,
    pub is_werewolf: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectiveCheck {
    pub first: String,
    pub second: String,
}

/// Public outcome of a dawn resolution, broadcast to the whole room.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NightOutcome {
    pub victim: Option<String>,
    pub saved: bool,
    pub poisoned: Option<String>,
}
