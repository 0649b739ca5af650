use std::env;

#[derive(Debug, Clone)]
pub struct GameConfig {
    pub night_seconds: u64,
    pub day_seconds: u64,
    pub voting_seconds: u64,
    pub min_players: usize,
    pub max_players: usize,
    pub port: u16,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            night_seconds: 60,
            day_seconds: 300,
            voting_seconds: 60,
            min_players: 5,
            max_players: 16,
            port: 8080,
        }
    }
}

impl GameConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> T {
            env::var(name)
                .ok()
                .and_then(|v| v.parse::<T>().ok())
                .unwrap_or(default)
        }

        Self {
            night_seconds: parse_var("NIGHT_SECONDS", defaults.night_seconds),
            day_seconds: parse_var("DAY_SECONDS", defaults.day_seconds),
            voting_seconds: parse_var("VOTING_SECONDS", defaults.voting_seconds),
            min_players: parse_var("MIN_PLAYERS", defaults.min_players),
            max_players: parse_var("MAX_PLAYERS", defaults.max_players),
            port: parse_var("PORT", defaults.port),
        }
    }
}
