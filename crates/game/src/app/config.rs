const START_MAP_ENV_VAR: &str = "RPG_START_MAP";
const START_SPAWN_ENV_VAR: &str = "RPG_START_SPAWN";
const DEFAULT_START_MAP: &str = "spawn.json";

/// Where a new game begins. Map ids are relative to `assets/maps`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct GameConfig {
    pub(crate) start_map: String,
    pub(crate) start_spawn: String,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            start_map: DEFAULT_START_MAP.to_string(),
            start_spawn: super::gameplay::DEFAULT_SPAWN_NAME.to_string(),
        }
    }
}

impl GameConfig {
    pub(crate) fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            start_map: non_empty(lookup(START_MAP_ENV_VAR)).unwrap_or(defaults.start_map),
            start_spawn: non_empty(lookup(START_SPAWN_ENV_VAR)).unwrap_or(defaults.start_spawn),
        }
    }
}

fn non_empty(raw: Option<String>) -> Option<String> {
    raw.map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
