use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{error, warn};

use crate::alarm::model::AppState;

pub const STATE_FILE_NAME: &str = "zeno_data.json";

/// Default state-file location: the platform local-data directory, falling
/// back to the working directory when the platform offers none.
pub fn default_state_path() -> PathBuf {
    match dirs::data_local_dir() {
        Some(dir) => dir.join("zeno").join(STATE_FILE_NAME),
        None => PathBuf::from(STATE_FILE_NAME),
    }
}

/// Best-effort JSON persistence for the alarm list and command history.
/// Writes are serialized by the single-threaded event loop, so no locking.
#[derive(Debug, Clone)]
pub struct Store {
    path: PathBuf,
}

impl Store {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Lenient load for the interactive path: a missing file is created with
    /// empty defaults, and any read or parse failure is logged and falls back
    /// to in-memory defaults.
    pub fn load(&self) -> AppState {
        if !self.path.exists() {
            let defaults = AppState::default();
            self.save(&defaults);
            return defaults;
        }
        match self.load_strict() {
            Ok(state) => state,
            Err(err) => {
                error!("failed to load {}: {err:#}; starting empty", self.path.display());
                AppState::default()
            }
        }
    }

    /// Strict load for `--check`: propagates I/O and parse errors.
    pub fn load_strict(&self) -> Result<AppState> {
        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("unable to read state file {}", self.path.display()))?;
        serde_json::from_str(&content).map_err(|err| {
            anyhow::anyhow!(
                "invalid JSON in {} at line {}, column {}: {err}",
                self.path.display(),
                err.line(),
                err.column()
            )
        })
    }

    /// Best-effort save: failures are logged and swallowed. A lost write
    /// costs at most the latest increment of state.
    pub fn save(&self, state: &AppState) {
        if let Err(err) = self.try_save(state) {
            warn!("failed to save {}: {err:#}", self.path.display());
        }
    }

    fn try_save(&self, state: &AppState) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .with_context(|| format!("unable to create {}", parent.display()))?;
        }
        let text = serde_json::to_string_pretty(state)?;
        fs::write(&self.path, format!("{text}\n"))
            .with_context(|| format!("unable to write state file {}", self.path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Local;
    use tempfile::tempdir;

    use super::*;
    use crate::alarm::model::Alarm;

    fn sample_state() -> AppState {
        AppState {
            alarms: vec![Alarm {
                id: "1-1".to_string(),
                message: "farm".to_string(),
                time: Local::now() + chrono::Duration::minutes(10),
                is_active: true,
                duration: Some(600_000),
                elapsed_time: None,
                keep: false,
            }],
            command_history: vec!["farm in 10m".to_string()],
        }
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempdir().expect("tempdir");
        let store = Store::new(dir.path().join("zeno_data.json"));
        let state = sample_state();
        store.save(&state);

        let loaded = store.load();
        assert_eq!(loaded.alarms.len(), 1);
        assert_eq!(loaded.alarms[0].message, "farm");
        assert_eq!(loaded.command_history, state.command_history);
    }

    #[test]
    fn missing_file_loads_defaults_and_creates_the_file() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("zeno_data.json");
        let store = Store::new(&path);

        let state = store.load();
        assert!(state.alarms.is_empty());
        assert!(state.command_history.is_empty());
        assert!(path.exists(), "first access creates the file");
    }

    #[test]
    fn malformed_json_falls_back_to_defaults_on_lenient_load() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("zeno_data.json");
        fs::write(&path, "{ not-valid-json ").expect("write");

        let state = Store::new(&path).load();
        assert!(state.alarms.is_empty());
    }

    #[test]
    fn strict_load_reports_parse_errors() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("zeno_data.json");
        fs::write(&path, "{ not-valid-json ").expect("write");

        let err = Store::new(&path).load_strict().expect_err("must fail");
        assert!(err.to_string().contains("invalid JSON"));
    }

    #[test]
    fn strict_load_reports_missing_file() {
        let dir = tempdir().expect("tempdir");
        let store = Store::new(dir.path().join("absent.json"));
        let err = store.load_strict().expect_err("must fail");
        assert!(err.to_string().contains("unable to read"));
    }
}
