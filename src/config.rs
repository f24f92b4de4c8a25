//! Application-level configuration loading: game rules and storage backend selection.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "TRIVIA_NIGHT_CONFIG_PATH";

const DEFAULT_PINNED_CATEGORY: &str = "Kids e Disney";
const DEFAULT_UNASSIGNED_TEAM: &str = "Sem time";
const DEFAULT_MAX_ROUND: u8 = 4;
const DEFAULT_SCORE_STEP: i32 = 10;
const DEFAULT_TRANSITION_TIMEOUT_MS: u64 = 5_000;

/// Which store the server talks to.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "backend", rename_all = "snake_case")]
pub enum StoreConfig {
    /// Hosted REST facade, credentials read from the environment.
    Postgrest,
    /// In-process tables seeded from a JSON fixture.
    Memory { seed_path: PathBuf },
}

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    /// Theme kept last in the category list and out of the raffle.
    pub pinned_category: String,
    /// Name given to the group of players without a team.
    pub unassigned_team: String,
    /// Last round number.
    pub max_round: u8,
    /// Points added by the scoreboard button when no delta is given.
    pub score_step: i32,
    /// Upper bound on a single store-backed action.
    pub transition_timeout: Duration,
    pub store: StoreConfig,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to built-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let app_config: Self = raw.into();
                    info!(
                        path = %path.display(),
                        pinned = %app_config.pinned_category,
                        max_round = app_config.max_round,
                        "loaded game configuration"
                    );
                    app_config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        RawConfig::default().into()
    }
}

#[derive(Debug, Default, Deserialize)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    #[serde(default)]
    pinned_category: Option<String>,
    #[serde(default)]
    unassigned_team: Option<String>,
    #[serde(default)]
    max_round: Option<u8>,
    #[serde(default)]
    score_step: Option<i32>,
    #[serde(default)]
    transition_timeout_ms: Option<u64>,
    #[serde(default)]
    store: Option<StoreConfig>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        Self {
            pinned_category: value
                .pinned_category
                .unwrap_or_else(|| DEFAULT_PINNED_CATEGORY.to_string()),
            unassigned_team: value
                .unassigned_team
                .unwrap_or_else(|| DEFAULT_UNASSIGNED_TEAM.to_string()),
            max_round: value.max_round.unwrap_or(DEFAULT_MAX_ROUND).max(1),
            score_step: value.score_step.unwrap_or(DEFAULT_SCORE_STEP),
            transition_timeout: Duration::from_millis(
                value
                    .transition_timeout_ms
                    .unwrap_or(DEFAULT_TRANSITION_TIMEOUT_MS),
            ),
            store: value.store.unwrap_or(StoreConfig::Postgrest),
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}
