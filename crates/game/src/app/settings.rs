use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};
use walker_engine::nav::NavConfig;

pub(crate) const SETTINGS_FILE_NAME: &str = "settings.json";
pub(crate) const STEP_MS_ENV_VAR: &str = "WALKER_STEP_MS";
pub(crate) const KEY_COOLDOWN_MS_ENV_VAR: &str = "WALKER_KEY_COOLDOWN_MS";
pub(crate) const START_WORLD_ENV_VAR: &str = "WALKER_START_WORLD";

/// Optional overrides read from `assets/settings.json`.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct SettingsFile {
    path_step_ms: Option<u64>,
    key_cooldown_ms: Option<u64>,
    start_world: Option<String>,
    open_panel_on_arrival: Option<bool>,
    show_stats: Option<bool>,
    max_render_fps: Option<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct GameSettings {
    pub(crate) nav: NavConfig,
    pub(crate) start_world: Option<String>,
    pub(crate) show_stats: bool,
    pub(crate) max_render_fps: Option<u32>,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            nav: NavConfig::default(),
            start_world: None,
            show_stats: false,
            max_render_fps: Some(60),
        }
    }
}

#[derive(Debug, Error)]
pub(crate) enum SettingsError {
    #[error("failed to read settings file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse settings file {path} at {json_path}: {source}")]
    Parse {
        path: PathBuf,
        json_path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Defaults, then the settings file when present, then environment overrides.
pub(crate) fn load_settings(assets_dir: &Path) -> Result<GameSettings, SettingsError> {
    let path = assets_dir.join(SETTINGS_FILE_NAME);
    let file = match fs::read(&path) {
        Ok(bytes) => parse_settings_file(&path, &bytes)?,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "settings_file_absent");
            SettingsFile::default()
        }
        Err(source) => return Err(SettingsError::Read { path, source }),
    };

    let mut settings = GameSettings::default();
    settings.apply_file(file);
    settings.apply_env(|name| env::var(name));
    Ok(settings)
}

fn parse_settings_file(path: &Path, bytes: &[u8]) -> Result<SettingsFile, SettingsError> {
    let mut deserializer = serde_json::Deserializer::from_slice(bytes);
    serde_path_to_error::deserialize(&mut deserializer).map_err(|err| {
        let json_path = err.path().to_string();
        SettingsError::Parse {
            path: path.to_path_buf(),
            json_path,
            source: err.into_inner(),
        }
    })
}

impl GameSettings {
    fn apply_file(&mut self, file: SettingsFile) {
        if let Some(ms) = file.path_step_ms {
            self.set_step_ms("path_step_ms", ms);
        }
        if let Some(ms) = file.key_cooldown_ms {
            self.set_key_cooldown_ms("key_cooldown_ms", ms);
        }
        if let Some(world) = file.start_world {
            self.start_world = Some(world);
        }
        if let Some(open) = file.open_panel_on_arrival {
            self.nav.open_panel_on_arrival = open;
        }
        if let Some(show) = file.show_stats {
            self.show_stats = show;
        }
        if let Some(fps) = file.max_render_fps {
            // 0 turns the render cap off.
            self.max_render_fps = (fps > 0).then_some(fps);
        }
    }

    fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Result<String, env::VarError>,
    {
        if let Some(ms) = read_ms_env(&lookup, STEP_MS_ENV_VAR) {
            self.set_step_ms(STEP_MS_ENV_VAR, ms);
        }
        if let Some(ms) = read_ms_env(&lookup, KEY_COOLDOWN_MS_ENV_VAR) {
            self.set_key_cooldown_ms(KEY_COOLDOWN_MS_ENV_VAR, ms);
        }
        match lookup(START_WORLD_ENV_VAR) {
            Ok(value) => {
                let trimmed = value.trim();
                if !trimmed.is_empty() {
                    self.start_world = Some(trimmed.to_string());
                }
            }
            Err(env::VarError::NotPresent) => {}
            Err(err) => warn!(
                env_var = START_WORLD_ENV_VAR,
                error = %err,
                "unable to read env var; keeping configured value"
            ),
        }
    }

    fn set_step_ms(&mut self, source: &str, ms: u64) {
        if ms == 0 {
            warn!(source, "path step interval must be positive; keeping previous value");
            return;
        }
        self.nav.movement.path_step_interval = Duration::from_millis(ms);
    }

    fn set_key_cooldown_ms(&mut self, source: &str, ms: u64) {
        if ms == 0 {
            warn!(source, "key cooldown must be positive; keeping previous value");
            return;
        }
        self.nav.movement.key_cooldown = Duration::from_millis(ms);
    }
}

fn read_ms_env<F>(lookup: &F, name: &str) -> Option<u64>
where
    F: Fn(&str) -> Result<String, env::VarError>,
{
    match lookup(name) {
        Ok(value) => match value.trim().parse::<u64>() {
            Ok(ms) => Some(ms),
            Err(_) => {
                warn!(
                    env_var = name,
                    value = value.as_str(),
                    "invalid millisecond env var value; keeping configured value"
                );
                None
            }
        },
        Err(env::VarError::NotPresent) => None,
        Err(err) => {
            warn!(
                env_var = name,
                error = %err,
                "unable to read env var; keeping configured value"
            );
            None
        }
    }
}
