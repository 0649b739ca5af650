use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Villager,
    Werewolf,
    Seer,
    Doctor,
    Witch,
    Hunter,
    Detective,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Team {
    Villagers,
    Werewolves,
}

impl Role {
    pub fn team(&self) -> Team {
        match self {
            Role::Werewolf => Team::Werewolves,
            _ => Team::Villagers,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::Villager => "villager",
            Role::Werewolf => "werewolf",
            Role::Seer => "seer",
            Role::Doctor => "doctor",
            Role::Witch => "witch",
            Role::Hunter => "hunter",
            Role::Detective => "detective",
        };
        write!(f, "{}", name)
    }
}

/// Deterministic-by-count role table. Werewolves scale with the lobby,
/// the special villagers unlock one by one as the lobby grows.
pub fn roles_for(num_players: usize) -> Vec<Role> {
    let num_werewolves = num_players / 4 + 1;

    let mut roles = vec![Role::Seer, Role::Doctor];
    for _ in 0..num_werewolves {
        roles.push(Role::Werewolf);
    }
    if num_players >= 6 {
        roles.push(Role::Witch);
    }
    if num_players >= 7 {
        roles.push(Role::Hunter);
    }
    if num_players >= 8 {
        roles.push(Role::Detective);
    }
    while roles.len() < num_players {
        roles.push(Role::Villager);
    }
    roles.truncate(num_players);
    roles
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_counts_scale_with_player_count() {
        for n in 5..=12 {
            let roles = roles_for(n);
            assert_eq!(roles.len(), n, "total roles for {} players", n);

            let count = |r: Role| roles.iter().filter(|x| **x == r).count();
            assert_eq!(count(Role::Werewolf), n / 4 + 1, "werewolves for {}", n);
            assert_eq!(count(Role::Seer), 1);
            assert_eq!(count(Role::Doctor), 1);
            assert_eq!(count(Role::Witch), usize::from(n >= 6), "witch for {}", n);
            assert_eq!(count(Role::Hunter), usize::from(n >= 7), "hunter for {}", n);
            assert_eq!(
                count(Role::Detective),
                usize::from(n >= 8),
                "detective for {}",
                n
            );
        }
    }

    #[test]
    fn only_werewolves_are_on_the_werewolf_team() {
        assert_eq!(Role::Werewolf.team(), Team::Werewolves);
        for role in [
            Role::Villager,
            Role::Seer,
            Role::Doctor,
            Role::Witch,
            Role::Hunter,
            Role::Detective,
        ] {
            assert_eq!(role.team(), Team::Villagers);
        }
    }

    #[test]
    fn roles_serialize_as_snake_case_strings() {
        assert_eq!(serde_json::to_string(&Role::Werewolf).unwrap(), "\"werewolf\"");
        assert_eq!(Role::Detective.to_string(), "detective");
    }
}
