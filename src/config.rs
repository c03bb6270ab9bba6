use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Result, SprintError};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub questions_total: u32,
    pub time_per_question_ms: u64,
    pub feedback_ms: u64,
    pub total_game_time_ms: u64,
    pub min_number: u32,
    pub max_number: u32,
    /// Final stretch of the countdown in which unanswered options are flagged.
    pub urgency_ms: u64,
    /// Base URL of the hosted auth project, e.g. `https://xyz.supabase.co`.
    pub auth_project_url: Option<String>,
    /// Page the player signs in from; the game page is expected next to it.
    pub auth_site_url: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            questions_total: 30,
            time_per_question_ms: 2000,
            feedback_ms: 500,
            total_game_time_ms: 60_000,
            min_number: 0,
            max_number: 9,
            urgency_ms: 500,
            auth_project_url: None,
            auth_site_url: None,
        }
    }
}

/// Smallest `max_number` whose sums span at least four values
pub const MIN_MAX_NUMBER: u32 = 2;
/// Largest operand for which every sum still fits in a `u32`
pub const MAX_OPERAND: u32 = u32::MAX / 2;

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.questions_total == 0 {
            return Err(SprintError::InvalidConfig(
                "at least one question is required".into(),
            ));
        }
        if self.min_number > self.max_number {
            return Err(SprintError::InvalidConfig(format!(
                "operand range is empty: min {} > max {}",
                self.min_number, self.max_number
            )));
        }
        if self.max_number < MIN_MAX_NUMBER {
            return Err(SprintError::InvalidConfig(format!(
                "max operand must be at least {MIN_MAX_NUMBER} to offer four distinct choices"
            )));
        }
        if self.max_number > MAX_OPERAND {
            return Err(SprintError::InvalidConfig(format!(
                "max operand {} is above the limit of {MAX_OPERAND}",
                self.max_number
            )));
        }
        for (name, ms) in [
            ("time per question", self.time_per_question_ms),
            ("feedback pause", self.feedback_ms),
            ("total game time", self.total_game_time_ms),
        ] {
            if ms == 0 {
                return Err(SprintError::InvalidConfig(format!("{name} must be positive")));
            }
        }
        Ok(())
    }

    pub fn time_per_question(&self) -> Duration {
        Duration::from_millis(self.time_per_question_ms)
    }

    pub fn feedback_pause(&self) -> Duration {
        Duration::from_millis(self.feedback_ms)
    }

    pub fn total_game_time(&self) -> Duration {
        Duration::from_millis(self.total_game_time_ms)
    }

    pub fn urgency_window(&self) -> Duration {
        Duration::from_millis(self.urgency_ms)
    }

    /// Largest possible sum; decoys are clamped into `[0, max_answer]`.
    pub fn max_answer(&self) -> u32 {
        self.max_number.saturating_mul(2)
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "mathsprint") {
            pd.config_dir().join("config.json")
        } else {
            PathBuf::from("mathsprint_config.json")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        match fs::read(&self.path) {
            Ok(bytes) => match serde_json::from_slice::<Config>(&bytes) {
                Ok(cfg) => cfg,
                Err(e) => {
                    log::warn!("ignoring malformed config {}: {}", self.path.display(), e);
                    Config::default()
                }
            },
            Err(_) => Config::default(),
        }
    }

    fn save(&self, cfg: &Config) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use tempfile::tempdir;

    #[test]
    fn missing_file_loads_defaults_and_save_is_readable() {
        let dir = tempdir().unwrap();
        let store = FileConfigStore::with_path(dir.path().join("mathsprint.json"));
        assert_eq!(store.load(), Config::default());

        store.save(&Config::default()).unwrap();
        let raw = fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains("\"questions_total\": 30"));
        assert!(raw.contains("\"auth_project_url\": null"));
    }

    #[test]
    fn save_creates_parent_dirs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("deeper").join("config.json");
        let store = FileConfigStore::with_path(&path);
        let cfg = Config {
            questions_total: 10,
            time_per_question_ms: 3500,
            min_number: 2,
            max_number: 12,
            auth_project_url: Some("https://example.supabase.co".into()),
            ..Config::default()
        };
        store.save(&cfg).unwrap();
        assert_eq!(store.load(), cfg);
    }

    #[test]
    fn malformed_file_falls_back_to_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, b"{ not json").unwrap();
        let store = FileConfigStore::with_path(&path);
        assert_eq!(store.load(), Config::default());
    }

    #[test]
    fn partial_file_fills_missing_fields() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, br#"{"questions_total": 5}"#).unwrap();
        let loaded = FileConfigStore::with_path(&path).load();
        assert_eq!(loaded.questions_total, 5);
        assert_eq!(loaded.time_per_question_ms, 2000);
    }

    #[test]
    fn defaults_are_valid() {
        assert!(Config::default().validate().is_ok());
        assert_eq!(Config::default().max_answer(), 18);
    }

    #[test]
    fn validate_rejects_bad_values() {
        let empty = Config {
            questions_total: 0,
            ..Config::default()
        };
        assert_matches!(empty.validate(), Err(SprintError::InvalidConfig(_)));

        let inverted = Config {
            min_number: 7,
            max_number: 3,
            ..Config::default()
        };
        assert_matches!(inverted.validate(), Err(SprintError::InvalidConfig(_)));

        let instant = Config {
            feedback_ms: 0,
            ..Config::default()
        };
        assert_matches!(instant.validate(), Err(SprintError::InvalidConfig(m)) if m.contains("feedback"));
    }

    #[test]
    fn validate_rejects_ranges_without_four_distinct_sums() {
        for max_number in [0, 1] {
            let narrow = Config {
                min_number: 0,
                max_number,
                ..Config::default()
            };
            assert_matches!(narrow.validate(), Err(SprintError::InvalidConfig(m)) if m.contains("four distinct"));
        }
        let smallest = Config {
            min_number: 2,
            max_number: MIN_MAX_NUMBER,
            ..Config::default()
        };
        assert!(smallest.validate().is_ok());
    }

    #[test]
    fn validate_rejects_operands_whose_sum_overflows() {
        let huge = Config {
            min_number: 3_000_000_000,
            max_number: 3_000_000_000,
            ..Config::default()
        };
        assert_matches!(huge.validate(), Err(SprintError::InvalidConfig(m)) if m.contains("limit"));

        let largest = Config {
            min_number: MAX_OPERAND,
            max_number: MAX_OPERAND,
            ..Config::default()
        };
        assert!(largest.validate().is_ok());
        assert!(largest.max_number.checked_add(largest.max_number).is_some());
    }
}
