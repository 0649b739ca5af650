use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::day::Accusation;
use super::event::GameEvent;
use super::night::SeerResult;
use super::phase::Phase;
use super::role::Role;
use super::room::Room;

/// What one player is allowed to see. This is the only state that ever
/// leaves the server, so everything secret is stripped here and nowhere
/// else. Pure: same room and viewer always produce the same view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomView {
    pub room_code: String,
    pub game_started: bool,
    pub phase: Phase,
    pub round_number: u32,
    pub timer: u64,
    pub paused: bool,
    pub players: Vec<PlayerView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub my_role: Option<Role>,
    pub eliminated: Vec<String>,
    pub game_log: Vec<GameEvent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub night_info: Option<NightInfo>,
    pub day_actions: DayView,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerView {
    pub id: String,
    pub name: String,
    pub is_alive: bool,
    pub is_host: bool,
    pub is_connected: bool,
    pub is_me: bool,
    /// Populated only for the viewer themselves or for dead players.
    pub role: Option<Role>,
}

/// Role-specific night intel, only ever attached for the matching living
/// role-holder and only while the night is still running.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NightInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub werewolf_team: Option<Vec<Teammate>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub werewolf_target: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seer_result: Option<SeerResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub witch: Option<WitchInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detective_result: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Teammate {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WitchInfo {
    /// Tonight's pack victim, shown so the witch can decide on the save.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub victim: Option<String>,
    pub life_potion_available: bool,
    pub death_potion_available: bool,
}

/// Vote tally is public only while the vote is actually running; outside
/// the voting phase only the accusation history goes out.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DayView {
    pub accusations: Vec<Accusation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub votes: Option<HashMap<String, bool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voting_target: Option<String>,
}

impl Room {
    pub fn view_for(&self, viewer_id: &str) -> RoomView {
        let viewer = self.player(viewer_id);

        let players = self
            .players
            .iter()
            .map(|p| PlayerView {
                id: p.id.clone(),
                name: p.name.clone(),
                is_alive: p.is_alive,
                is_host: p.is_host,
                is_connected: p.is_connected,
                is_me: p.id == viewer_id,
                role: if p.id == viewer_id || !p.is_alive {
                    p.role
                } else {
                    None
                },
            })
            .collect();

        let day_actions = if self.phase == Phase::Voting {
            DayView {
                accusations: self.day.accusations.clone(),
                votes: Some(self.day.votes.clone()),
                voting_target: self.day.voting_target.clone(),
            }
        } else {
            DayView {
                accusations: self.day.accusations.clone(),
                votes: None,
                voting_target: None,
            }
        };

        RoomView {
            room_code: self.code.clone(),
            game_started: self.started(),
            phase: self.phase,
            round_number: self.round,
            timer: self.timer,
            paused: self.paused,
            players,
            my_role: viewer.and_then(|p| p.role),
            eliminated: self.eliminated.clone(),
            game_log: self.log.clone(),
            night_info: self.night_info_for(viewer_id),
            day_actions,
        }
    }

    fn night_info_for(&self, viewer_id: &str) -> Option<NightInfo> {
        let viewer = self.player(viewer_id)?;
        if self.phase != Phase::Night || !viewer.is_alive {
            return None;
        }

        let mut info = NightInfo::default();
        match viewer.role? {
            Role::Werewolf => {
                info.werewolf_team = Some(
                    self.players
                        .iter()
                        .filter(|p| p.has_role(Role::Werewolf) && p.id != viewer_id && p.is_alive)
                        .map(|p| Teammate {
                            id: p.id.clone(),
                            name: p.name.clone(),
                        })
                        .collect(),
                );
                info.werewolf_target = self
                    .night
                    .werewolf_target
                    .as_deref()
                    .and_then(|id| self.player(id))
                    .map(|p| p.name.clone());
            }
            Role::Seer => {
                info.seer_result = self.night.seer_result.clone();
            }
            Role::Witch => {
                info.witch = Some(WitchInfo {
                    victim: self
                        .night
                        .werewolf_target
                        .as_deref()
                        .and_then(|id| self.player(id))
                        .map(|p| p.name.clone()),
                    life_potion_available: !viewer.used_life_potion,
                    death_potion_available: !viewer.used_death_potion,
                });
            }
            Role::Detective => {
                info.detective_result = self.night.detective_result;
            }
            _ => return None,
        }
        Some(info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::config::GameConfig;

    fn night_room() -> Room {
        let mut room = Room::new("ABC123".into());
        let roles = [
            Role::Werewolf,
            Role::Werewolf,
            Role::Seer,
            Role::Doctor,
            Role::Witch,
            Role::Villager,
        ];
        for (i, role) in roles.iter().enumerate() {
            room.add_player(format!("p{}", i), format!("Player{}", i), None);
            room.players[i].role = Some(*role);
        }
        room.start_night(&GameConfig::default());
        room
    }

    #[test]
    fn living_players_roles_are_hidden_from_others() {
        let room = night_room();
        let view = room.view_for("p5");

        for p in &view.players {
            if p.is_me {
                assert_eq!(p.role, Some(Role::Villager));
            } else {
                assert_eq!(p.role, None, "{} leaked a role", p.name);
            }
        }
        assert_eq!(view.my_role, Some(Role::Villager));
    }

    #[test]
    fn dead_players_roles_become_public() {
        let mut room = night_room();
        room.player_mut("p2").unwrap().is_alive = false;

        let view = room.view_for("p5");
        let dead = view.players.iter().find(|p| p.id == "p2").unwrap();
        assert_eq!(dead.role, Some(Role::Seer));
    }

    #[test]
    fn projection_is_pure() {
        let room = night_room();
        let a = serde_json::to_value(room.view_for("p0")).unwrap();
        let b = serde_json::to_value(room.view_for("p0")).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn werewolves_see_pack_and_target_but_nobody_else_does() {
        let mut room = night_room();
        room.night.werewolf_target = Some("p3".into());

        let wolf = room.view_for("p0").night_info.unwrap();
        let team = wolf.werewolf_team.unwrap();
        assert_eq!(team.len(), 1);
        assert_eq!(team[0].id, "p1");
        assert_eq!(wolf.werewolf_target.as_deref(), Some("Player3"));

        let villager = room.view_for("p5").night_info;
        assert!(villager.is_none());
        let seer = room.view_for("p2").night_info.unwrap();
        assert!(seer.werewolf_team.is_none());
        assert!(seer.werewolf_target.is_none());
    }

    #[test]
    fn witch_sees_victim_and_potion_flags() {
        let mut room = night_room();
        room.night.werewolf_target = Some("p5".into());
        room.player_mut("p4").unwrap().used_life_potion = true;

        let info = room.view_for("p4").night_info.unwrap().witch.unwrap();
        assert_eq!(info.victim.as_deref(), Some("Player5"));
        assert!(!info.life_potion_available);
        assert!(info.death_potion_available);
    }

    #[test]
    fn night_intel_disappears_outside_night_phase() {
        let mut room = night_room();
        room.night.werewolf_target = Some("p3".into());
        room.start_day(&GameConfig::default());
        assert!(room.view_for("p0").night_info.is_none());
    }

    #[test]
    fn dead_werewolf_gets_no_pack_intel() {
        let mut room = night_room();
        room.player_mut("p0").unwrap().is_alive = false;
        assert!(room.view_for("p0").night_info.is_none());
    }

    #[test]
    fn votes_are_visible_only_during_voting() {
        let mut room = night_room();
        let config = GameConfig::default();
        room.start_day(&config);
        room.accuse("p5", "p0").unwrap();

        let day_view = room.view_for("p5").day_actions;
        assert_eq!(day_view.accusations.len(), 1);
        assert!(day_view.votes.is_none());

        room.start_voting(&config, "p0");
        room.day.votes.insert("p5".into(), true);
        let voting_view = room.view_for("p5").day_actions;
        assert_eq!(voting_view.votes.unwrap().len(), 1);
        assert_eq!(voting_view.voting_target.as_deref(), Some("p0"));
    }
}
