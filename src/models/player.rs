use serde::{Deserialize, Serialize};

use super::role::Role;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Player {
    pub id: String,
    pub name: String,
    /// None until roles are dealt at game start.
    pub role: Option<Role>,
    pub is_alive: bool,
    pub is_host: bool,
    pub is_connected: bool,
    /// Opaque client-supplied location metadata, passed through untouched
    /// for the prayer-time lookup on the client side.
    pub location: Option<serde_json::Value>,
    pub used_life_potion: bool,
    pub used_death_potion: bool,
    pub used_investigation: bool,
}

impl Player {
    pub fn new(id: String, name: String, location: Option<serde_json::Value>) -> Self {
        Player {
            id,
            name,
            role: None,
            is_alive: true,
            is_host: false,
            is_connected: true,
            location,
            used_life_potion: false,
            used_death_potion: false,
            used_investigation: false,
        }
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.role == Some(role)
    }

    pub fn reset_abilities(&mut self) {
        self.used_life_potion = false;
        self.used_death_potion = false;
        self.used_investigation = false;
    }
}
