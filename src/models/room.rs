use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::config::GameConfig;
use super::day::{Accusation, DayActions};
use super::error::{GameError, IgnoredReason};
use super::event::{EventKind, GameEvent};
use super::night::{DetectiveCheck, NightActions, NightOutcome, SeerResult};
use super::phase::Phase;
use super::player::Player;
use super::role::{self, Role, Team};

/// One isolated game, identified by its short code. All mutation runs under
/// the registry lock; nothing in here is aware of connections or timers.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Room {
    pub code: String,
    /// Join order. The first entry seeds the initial host.
    pub players: Vec<Player>,
    pub phase: Phase,
    pub round: u32,
    /// Seconds left in the current phase, decremented by the scheduler.
    pub timer: u64,
    pub paused: bool,
    pub eliminated: Vec<String>,
    pub log: Vec<GameEvent>,
    pub night: NightActions,
    pub day: DayActions,
}

impl Room {
    pub fn new(code: String) -> Self {
        Room {
            code,
            players: Vec::new(),
            phase: Phase::Waiting,
            round: 1,
            timer: 0,
            paused: false,
            eliminated: Vec::new(),
            log: Vec::new(),
            night: NightActions::default(),
            day: DayActions::default(),
        }
    }

    pub fn player(&self, id: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn player_mut(&mut self, id: &str) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == id)
    }

    pub fn host(&self) -> Option<&Player> {
        self.players.iter().find(|p| p.is_host)
    }

    pub fn started(&self) -> bool {
        self.phase != Phase::Waiting
    }

    pub fn alive_count(&self) -> usize {
        self.players.iter().filter(|p| p.is_alive).count()
    }

    pub fn connected_count(&self) -> usize {
        self.players.iter().filter(|p| p.is_connected).count()
    }

    pub fn add_player(
        &mut self,
        id: String,
        name: String,
        location: Option<serde_json::Value>,
    ) -> &Player {
        let mut player = Player::new(id, name, location);
        player.is_host = self.players.is_empty();
        self.players.push(player);
        &self.players[self.players.len() - 1]
    }

    /// Pre-start removal. Mid-game disconnects go through
    /// [`Room::mark_disconnected`] instead so vote and role state survives.
    pub fn remove_player(&mut self, id: &str) {
        self.players.retain(|p| p.id != id);
        self.ensure_host();
    }

    pub fn mark_disconnected(&mut self, id: &str) {
        let name = match self.player_mut(id) {
            Some(player) => {
                player.is_connected = false;
                player.name.clone()
            }
            None => return,
        };
        self.log
            .push(GameEvent::new(EventKind::System, format!("{} disconnected", name)));
        self.ensure_host();
    }

    /// Exactly one host whenever the room is non-empty; prefers a connected
    /// player when the old host is gone.
    fn ensure_host(&mut self) {
        let has_host = self.players.iter().any(|p| p.is_host && p.is_connected);
        if has_host || self.players.is_empty() {
            return;
        }
        for p in &mut self.players {
            p.is_host = false;
        }
        let next = self
            .players
            .iter()
            .position(|p| p.is_connected)
            .unwrap_or(0);
        self.players[next].is_host = true;
    }

    /// Deal roles for the current lobby. Pure apart from the injected rng,
    /// which keeps the shuffle testable.
    pub fn assign_roles<R: Rng>(&mut self, min_players: usize, rng: &mut R) -> Result<(), GameError> {
        if self.players.len() < min_players {
            return Err(GameError::InsufficientPlayers(min_players));
        }

        let mut roles = role::roles_for(self.players.len());
        roles.shuffle(rng);

        for (player, role) in self.players.iter_mut().zip(roles) {
            player.role = Some(role);
            player.reset_abilities();
        }

        self.log.push(GameEvent::new(
            EventKind::GameStart,
            "Game has started! Night falls...",
        ));
        Ok(())
    }

    pub fn start_night(&mut self, config: &GameConfig) {
        self.phase = Phase::Night;
        self.timer = Phase::Night.duration(config);
        self.night = NightActions::default();
        self.log.push(GameEvent::new(
            EventKind::PhaseChange,
            format!("Night {} begins...", self.round),
        ));
    }

    pub fn start_day(&mut self, config: &GameConfig) {
        self.phase = Phase::Day;
        self.timer = Phase::Day.duration(config);
        self.day = DayActions::default();
        self.log.push(GameEvent::new(
            EventKind::PhaseChange,
            format!("Day {} begins...", self.round),
        ));
    }

    pub fn start_voting(&mut self, config: &GameConfig, target_id: &str) {
        self.phase = Phase::Voting;
        self.timer = Phase::Voting.duration(config);
        self.day.voting_target = Some(target_id.to_string());
        self.day.votes.clear();

        let target_name = self
            .player(target_id)
            .map(|p| p.name.clone())
            .unwrap_or_default();
        self.log.push(GameEvent::new(
            EventKind::VotingStarted,
            format!("Voting to eliminate {}...", target_name),
        ));
    }

    pub fn accuse(&mut self, accuser_id: &str, target_id: &str) -> Result<(), IgnoredReason> {
        let (accuser_name, target_name) = match (self.player(accuser_id), self.player(target_id)) {
            (Some(a), Some(t)) if a.is_alive && t.is_alive => (a.name.clone(), t.name.clone()),
            (Some(_), Some(_)) => return Err(IgnoredReason::NotAlive),
            _ => return Err(IgnoredReason::UnknownTarget),
        };

        self.day.accusations.push(Accusation {
            accuser: accuser_name.clone(),
            accuser_id: accuser_id.to_string(),
            target: target_name.clone(),
            target_id: target_id.to_string(),
            timestamp: chrono::Utc::now(),
        });
        self.log.push(GameEvent::new(
            EventKind::Accusation,
            format!("{} accused {}", accuser_name, target_name),
        ));
        Ok(())
    }

    /// Marks a player dead and records the elimination. A Hunter going down
    /// arms the revenge shot, which holds back the win check until resolved.
    fn eliminate(&mut self, target_id: &str, message: String) {
        let (name, role) = match self.player_mut(target_id) {
            Some(p) if p.is_alive => {
                p.is_alive = false;
                (p.name.clone(), p.role)
            }
            _ => return,
        };
        self.eliminated.push(name.clone());
        self.log.push(GameEvent::elimination(&name, role, message));
        if role == Some(Role::Hunter) {
            self.night.pending_hunter = Some(target_id.to_string());
        }
    }

    /// Dawn resolution. Witch save beats doctor heal beats the pack; poison
    /// lands independently, so one night can take zero, one, or two players.
    pub fn resolve_night(&mut self) -> NightOutcome {
        let mut outcome = NightOutcome {
            victim: None,
            saved: false,
            poisoned: None,
        };

        if let Some(target_id) = self.night.werewolf_target.clone() {
            if self.night.witch_save.as_deref() == Some(target_id.as_str())
                || self.night.doctor_target.as_deref() == Some(target_id.as_str())
            {
                outcome.saved = true;
            } else if let Some(victim) = self.player(&target_id) {
                let name = victim.name.clone();
                self.eliminate(
                    &target_id,
                    format!("{} was eliminated during the night", name),
                );
                outcome.victim = Some(name);
            }
        }

        if let Some(poison_id) = self.night.witch_kill.clone() {
            let poisoned = self
                .player(&poison_id)
                .filter(|p| p.is_alive)
                .map(|p| p.name.clone());
            if let Some(name) = poisoned {
                self.eliminate(&poison_id, format!("{} died of poison in the night", name));
                outcome.poisoned = Some(name);
            }
        }

        // Recomputed each dawn so the stored result can never go stale.
        if let Some(seer_target) = self.night.seer_target.clone() {
            self.night.seer_result = self.seer_result_for(&seer_target);
        }
        if let Some(check) = self.night.detective_check.clone() {
            self.night.detective_result = self.detective_result_for(&check);
        }

        outcome
    }

    pub fn seer_result_for(&self, target_id: &str) -> Option<SeerResult> {
        self.player(target_id).map(|target| SeerResult {
            target: target.name.clone(),
            is_werewolf: target.has_role(Role::Werewolf),
        })
    }

    pub fn detective_result_for(&self, check: &DetectiveCheck) -> Option<bool> {
        let first = self.player(&check.first)?.role?;
        let second = self.player(&check.second)?.role?;
        Some(first.team() == second.team())
    }

    /// Majority vote at the end of the voting phase: strictly more guilty
    /// votes than half the living players, or the target walks.
    pub fn resolve_voting(&mut self) {
        let guilty = self.day.guilty_votes();
        let alive = self.alive_count();

        if let Some(target_id) = self.day.voting_target.clone() {
            if guilty * 2 > alive {
                if let Some(target) = self.player(&target_id) {
                    let name = target.name.clone();
                    let role_name = target
                        .role
                        .map(|r| r.to_string())
                        .unwrap_or_else(|| "unknown".into());
                    self.eliminate(
                        &target_id,
                        format!("{} ({}) was voted out by the village", name, role_name),
                    );
                }
            } else {
                self.log.push(GameEvent::new(
                    EventKind::VoteFailed,
                    "The village could not reach a decision",
                ));
            }
        }

        self.round += 1;
    }

    /// Evaluated after every elimination batch; deferred while a Hunter
    /// revenge shot is owed, since the shot may still change the count.
    pub fn check_win(&mut self) -> Option<Team> {
        if self.night.pending_hunter.is_some() {
            return None;
        }

        let alive_werewolves = self
            .players
            .iter()
            .filter(|p| p.is_alive && p.has_role(Role::Werewolf))
            .count();
        let alive_villagers = self
            .players
            .iter()
            .filter(|p| p.is_alive && !p.has_role(Role::Werewolf))
            .count();

        let winner = if alive_werewolves == 0 {
            Some((Team::Villagers, "Villagers win! All werewolves have been eliminated!"))
        } else if alive_werewolves >= alive_villagers {
            Some((Team::Werewolves, "Werewolves win! They now control the village!"))
        } else {
            None
        };

        winner.map(|(team, message)| {
            self.phase = Phase::GameOver;
            self.log.push(GameEvent::new(EventKind::GameOver, message));
            team
        })
    }

    pub fn hunter_revenge(&mut self, hunter_id: &str, target_id: &str) -> Result<(), IgnoredReason> {
        if self.night.pending_hunter.as_deref() != Some(hunter_id) {
            return Err(IgnoredReason::NotPendingHunter);
        }
        let (target_name, hunter_name) = match (self.player(target_id), self.player(hunter_id)) {
            (Some(t), Some(h)) if t.is_alive => (t.name.clone(), h.name.clone()),
            (Some(_), Some(_)) => return Err(IgnoredReason::NotAlive),
            _ => return Err(IgnoredReason::UnknownTarget),
        };

        self.night.pending_hunter = None;
        self.eliminate(
            target_id,
            format!("{} was shot by {} the hunter", target_name, hunter_name),
        );
        Ok(())
    }

    /// Disconnect of the hunter who still owes a shot forfeits it, so the
    /// room can never wedge on a revenge that will never arrive.
    pub fn forfeit_revenge(&mut self, hunter_id: &str) -> bool {
        if self.night.pending_hunter.as_deref() != Some(hunter_id) {
            return false;
        }
        self.night.pending_hunter = None;
        let name = self
            .player(hunter_id)
            .map(|p| p.name.clone())
            .unwrap_or_default();
        self.log.push(GameEvent::new(
            EventKind::System,
            format!("{} left without taking revenge", name),
        ));
        true
    }
}
