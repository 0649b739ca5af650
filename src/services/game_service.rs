use rand::thread_rng;
use tracing::{debug, info};

use crate::models::config::GameConfig;
use crate::models::error::{GameError, IgnoredReason};
use crate::models::event::GameEvent;
use crate::models::message::{NightActionKind, ServerMessage};
use crate::models::night::DetectiveCheck;
use crate::models::phase::Phase;
use crate::models::role::Role;
use crate::models::room::Room;
use crate::services::scheduler;
use crate::state::{AppState, Outbound};

/// Every gameplay intent lands here: either it was applied and produced
/// messages, or it was dropped without a trace a client could observe.
/// Silence on mismatch is deliberate, an error reply would betray who holds
/// which role.
#[derive(Debug)]
pub enum ActionResult {
    Applied(Outbound),
    Ignored(IgnoredReason),
}

use ActionResult::{Applied, Ignored};

/// Fresh projection for every seat in the room.
pub fn game_updates(room: &Room) -> Outbound {
    room.players
        .iter()
        .map(|p| {
            (
                p.id.clone(),
                ServerMessage::GameUpdate {
                    state: room.view_for(&p.id),
                },
            )
        })
        .collect()
}

pub async fn start_game(
    state: &AppState,
    room_code: &str,
    caller_id: &str,
) -> Result<Outbound, GameError> {
    let outbound = {
        let mut rooms = state.rooms.lock().await;
        let room = rooms.get_mut(room_code).ok_or(GameError::RoomNotFound)?;

        if room.started() {
            return Err(GameError::GameAlreadyStarted);
        }
        if room.host().map(|h| h.id.as_str()) != Some(caller_id) {
            return Err(GameError::NotHost);
        }

        room.assign_roles(state.config.min_players, &mut thread_rng())?;
        room.start_night(&state.config);

        room.players
            .iter()
            .filter_map(|p| {
                let role = p.role?;
                Some((
                    p.id.clone(),
                    ServerMessage::RoleAssigned {
                        role,
                        state: room.view_for(&p.id),
                    },
                ))
            })
            .collect()
    };

    scheduler::start_timer(state.clone(), room_code.to_string()).await;
    info!(room_code, "game started");
    Ok(outbound)
}

pub async fn night_action(
    state: &AppState,
    room_code: &str,
    caller_id: &str,
    action: NightActionKind,
) -> ActionResult {
    let mut rooms = state.rooms.lock().await;
    let Some(room) = rooms.get_mut(room_code) else {
        return Ignored(IgnoredReason::NoSuchRoom);
    };
    if room.phase != Phase::Night {
        return Ignored(IgnoredReason::WrongPhase);
    }
    let Some(caller) = room.player(caller_id) else {
        return Ignored(IgnoredReason::NoSuchRoom);
    };
    if !caller.is_alive {
        return Ignored(IgnoredReason::NotAlive);
    }
    let caller_role = caller.role;

    let require = |role: Role| -> Result<(), IgnoredReason> {
        if caller_role == Some(role) {
            Ok(())
        } else {
            Err(IgnoredReason::WrongRole)
        }
    };

    let mut extra: Outbound = Vec::new();
    let applied = (|| -> Result<(), IgnoredReason> {
        match action {
            NightActionKind::WerewolfKill { target_id } => {
                require(Role::Werewolf)?;
                room.player(&target_id).ok_or(IgnoredReason::UnknownTarget)?;
                // Shared pack target, last submission wins.
                room.night.werewolf_target = Some(target_id);
            }
            NightActionKind::DoctorHeal { target_id } => {
                require(Role::Doctor)?;
                room.player(&target_id).ok_or(IgnoredReason::UnknownTarget)?;
                room.night.doctor_target = Some(target_id);
            }
            NightActionKind::SeerCheck { target_id } => {
                require(Role::Seer)?;
                let result = room
                    .seer_result_for(&target_id)
                    .ok_or(IgnoredReason::UnknownTarget)?;
                room.night.seer_target = Some(target_id.clone());
                room.night.seer_result = Some(result.clone());
                // The vision goes back right away, not at dawn.
                extra.push((
                    caller_id.to_string(),
                    ServerMessage::SeerResult {
                        target_id,
                        target_name: result.target,
                        is_werewolf: result.is_werewolf,
                    },
                ));
            }
            NightActionKind::WitchSave { target_id } => {
                require(Role::Witch)?;
                if room.player(caller_id).is_some_and(|p| p.used_life_potion) {
                    return Err(IgnoredReason::AbilityAlreadyUsed);
                }
                room.player(&target_id).ok_or(IgnoredReason::UnknownTarget)?;
                room.night.witch_save = Some(target_id);
                if let Some(witch) = room.player_mut(caller_id) {
                    witch.used_life_potion = true;
                }
            }
            NightActionKind::WitchKill { target_id } => {
                require(Role::Witch)?;
                if room.player(caller_id).is_some_and(|p| p.used_death_potion) {
                    return Err(IgnoredReason::AbilityAlreadyUsed);
                }
                room.player(&target_id).ok_or(IgnoredReason::UnknownTarget)?;
                room.night.witch_kill = Some(target_id);
                if let Some(witch) = room.player_mut(caller_id) {
                    witch.used_death_potion = true;
                }
            }
            NightActionKind::WitchNothing => {
                require(Role::Witch)?;
            }
            NightActionKind::DetectiveCheck { first_id, second_id } => {
                require(Role::Detective)?;
                if room.player(caller_id).is_some_and(|p| p.used_investigation) {
                    return Err(IgnoredReason::AbilityAlreadyUsed);
                }
                let check = DetectiveCheck {
                    first: first_id,
                    second: second_id,
                };
                let same_team = room
                    .detective_result_for(&check)
                    .ok_or(IgnoredReason::UnknownTarget)?;
                room.night.detective_check = Some(check);
                room.night.detective_result = Some(same_team);
                if let Some(detective) = room.player_mut(caller_id) {
                    detective.used_investigation = true;
                }
                extra.push((
                    caller_id.to_string(),
                    ServerMessage::DetectiveResult { same_team },
                ));
            }
        }
        Ok(())
    })();

    match applied {
        Ok(()) => {
            let mut outbound = game_updates(room);
            outbound.extend(extra);
            Applied(outbound)
        }
        Err(reason) => Ignored(reason),
    }
}

pub async fn send_chat(
    state: &AppState,
    room_code: &str,
    caller_id: &str,
    message: String,
) -> ActionResult {
    let mut rooms = state.rooms.lock().await;
    let Some(room) = rooms.get_mut(room_code) else {
        return Ignored(IgnoredReason::NoSuchRoom);
    };
    if room.phase != Phase::Day {
        return Ignored(IgnoredReason::WrongPhase);
    }
    let Some(caller) = room.player(caller_id) else {
        return Ignored(IgnoredReason::NoSuchRoom);
    };
    if !caller.is_alive {
        return Ignored(IgnoredReason::NotAlive);
    }

    let name = caller.name.clone();
    room.log.push(GameEvent::chat(&name, message));
    Applied(game_updates(room))
}

pub async fn accuse(
    state: &AppState,
    room_code: &str,
    caller_id: &str,
    target_id: &str,
) -> ActionResult {
    let mut rooms = state.rooms.lock().await;
    let Some(room) = rooms.get_mut(room_code) else {
        return Ignored(IgnoredReason::NoSuchRoom);
    };
    if room.phase != Phase::Day {
        return Ignored(IgnoredReason::WrongPhase);
    }
    match room.accuse(caller_id, target_id) {
        Ok(()) => Applied(game_updates(room)),
        Err(reason) => Ignored(reason),
    }
}

/// A second voice against an already-accused target cuts the day short and
/// opens the vote immediately. This is the only transition not driven by
/// the countdown, so the day timer is cancelled and a fresh voting timer
/// takes its place.
pub async fn second_accusation(
    state: &AppState,
    room_code: &str,
    caller_id: &str,
    target_id: &str,
) -> ActionResult {
    let outbound = {
        let mut rooms = state.rooms.lock().await;
        let Some(room) = rooms.get_mut(room_code) else {
            return Ignored(IgnoredReason::NoSuchRoom);
        };
        if room.phase != Phase::Day {
            return Ignored(IgnoredReason::WrongPhase);
        }
        if !room.player(caller_id).is_some_and(|p| p.is_alive) {
            return Ignored(IgnoredReason::NotAlive);
        }
        let seconded = room
            .day
            .accusations
            .iter()
            .any(|a| a.target_id == target_id && a.accuser_id != caller_id);
        if !seconded {
            return Ignored(IgnoredReason::SelfSecond);
        }

        room.start_voting(&state.config, target_id);
        game_updates(room)
    };

    scheduler::start_timer(state.clone(), room_code.to_string()).await;
    Applied(outbound)
}

pub async fn cast_vote(
    state: &AppState,
    room_code: &str,
    caller_id: &str,
    vote: bool,
) -> ActionResult {
    let mut rooms = state.rooms.lock().await;
    let Some(room) = rooms.get_mut(room_code) else {
        return Ignored(IgnoredReason::NoSuchRoom);
    };
    if room.phase != Phase::Voting {
        return Ignored(IgnoredReason::WrongPhase);
    }
    if !room.player(caller_id).is_some_and(|p| p.is_alive) {
        return Ignored(IgnoredReason::NotAlive);
    }
    if room.day.votes.contains_key(caller_id) {
        return Ignored(IgnoredReason::AlreadyVoted);
    }

    room.day.votes.insert(caller_id.to_string(), vote);
    Applied(game_updates(room))
}

pub async fn set_pause(
    state: &AppState,
    room_code: &str,
    paused: bool,
) -> Result<Outbound, GameError> {
    let mut rooms = state.rooms.lock().await;
    let room = rooms.get_mut(room_code).ok_or(GameError::RoomNotFound)?;

    room.paused = paused;
    let mut outbound: Outbound = room
        .players
        .iter()
        .map(|p| (p.id.clone(), ServerMessage::PauseUpdate { paused }))
        .collect();
    outbound.extend(game_updates(room));
    Ok(outbound)
}

pub async fn hunter_revenge(
    state: &AppState,
    room_code: &str,
    caller_id: &str,
    target_id: &str,
) -> ActionResult {
    let mut rooms = state.rooms.lock().await;
    let Some(room) = rooms.get_mut(room_code) else {
        return Ignored(IgnoredReason::NoSuchRoom);
    };
    match room.hunter_revenge(caller_id, target_id) {
        Ok(()) => Applied(resume_after_revenge(room, &state.config)),
        Err(reason) => Ignored(reason),
    }
}

/// Runs the deferred win check once a revenge shot has landed or been
/// forfeited, then picks the interrupted transition back up: a night kill
/// resumes into day, a vote kill resumes into the next night.
pub fn resume_after_revenge(room: &mut Room, config: &GameConfig) -> Outbound {
    // The shot may itself have taken down another hunter.
    if let Some(next_hunter) = room.night.pending_hunter.clone() {
        let mut outbound = game_updates(room);
        outbound.push((next_hunter, ServerMessage::HunterRevengePrompt));
        return outbound;
    }

    if room.check_win().is_some() {
        return game_updates(room);
    }

    match room.phase {
        Phase::Night => {
            let outcome = room.night.deferred_outcome.take();
            room.start_day(config);
            match outcome {
                Some(outcome) => night_results(room, outcome),
                None => game_updates(room),
            }
        }
        Phase::Voting => {
            room.start_night(config);
            game_updates(room)
        }
        _ => game_updates(room),
    }
}

fn night_results(room: &Room, outcome: crate::models::night::NightOutcome) -> Outbound {
    room.players
        .iter()
        .map(|p| {
            (
                p.id.clone(),
                ServerMessage::NightResult {
                    outcome: outcome.clone(),
                    state: room.view_for(&p.id),
                },
            )
        })
        .collect()
}

/// One scheduler tick. `None` tells the timer task to stop: the room is
/// gone or no longer in a timed phase. Pausing freezes the countdown but
/// keeps pushing projections so clients can render the paused state.
pub async fn tick(state: &AppState, room_code: &str) -> Option<Outbound> {
    let mut rooms = state.rooms.lock().await;
    let room = rooms.get_mut(room_code)?;

    match room.phase {
        Phase::Waiting | Phase::GameOver => return None,
        Phase::Night | Phase::Day | Phase::Voting => {}
    }
    if room.paused {
        return Some(game_updates(room));
    }
    if room.night.pending_hunter.is_some() {
        return Some(Vec::new());
    }

    room.timer = room.timer.saturating_sub(1);
    if room.timer == 0 {
        Some(phase_end(room, &state.config))
    } else {
        Some(game_updates(room))
    }
}

/// Countdown expiry handler: dawn resolution, dusk, or the vote count.
pub fn phase_end(room: &mut Room, config: &GameConfig) -> Outbound {
    match room.phase {
        Phase::Night => {
            let outcome = room.resolve_night();

            if let Some(hunter_id) = room.night.pending_hunter.clone() {
                room.night.deferred_outcome = Some(outcome);
                let mut outbound = game_updates(room);
                outbound.push((hunter_id, ServerMessage::HunterRevengePrompt));
                return outbound;
            }

            if room.check_win().is_none() {
                room.start_day(config);
            }
            night_results(room, outcome)
        }
        Phase::Day => {
            room.start_night(config);
            game_updates(room)
        }
        Phase::Voting => {
            room.resolve_voting();

            if let Some(hunter_id) = room.night.pending_hunter.clone() {
                let mut outbound = game_updates(room);
                outbound.push((hunter_id, ServerMessage::HunterRevengePrompt));
                return outbound;
            }

            if room.check_win().is_none() {
                room.start_night(config);
            }
            game_updates(room)
        }
        Phase::Waiting | Phase::GameOver => {
            debug!(room_code = %room.code, "phase end on untimed phase ignored");
            Vec::new()
        }
    }
}
