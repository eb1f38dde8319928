use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use crate::models::history::DEFAULT_CAPACITY;
use crate::models::CommandError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HistoryConfig {
    /// Maximum number of records kept before the oldest is evicted.
    pub capacity: usize,
    /// Whether a failed (not cancelled) undo still steps the cursor back.
    pub advance_on_failed_undo: bool,
    /// Where reversible deletes park items. `None` uses the system temp dir.
    pub staging_dir: Option<PathBuf>,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            advance_on_failed_undo: true,
            staging_dir: None,
        }
    }
}

impl HistoryConfig {
    pub fn staging_root(&self) -> PathBuf {
        self.staging_dir
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join(format!("files_history_staging_{}", std::process::id())))
    }
}

pub struct ConfigManager(pub Mutex<HistoryConfig>);

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigManager {
    pub fn new() -> Self {
        Self(Mutex::new(HistoryConfig::default()))
    }

    pub fn get(&self) -> HistoryConfig {
        self.0.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn save(&self, config_path: &Path) -> Result<(), CommandError> {
        let config = self.0.lock().map_err(|_| CommandError::ConfigError("Failed to lock config".to_string()))?;
        Self::save_config(config_path, &config)
    }

    pub fn save_config(config_path: &Path, config: &HistoryConfig) -> Result<(), CommandError> {
        if let Some(config_dir) = config_path.parent() {
            if !config_dir.as_os_str().is_empty() && !config_dir.exists() {
                fs::create_dir_all(config_dir)?;
            }
        }

        let json = serde_json::to_string_pretty(config)?;
        fs::write(config_path, json)?;
        Ok(())
    }

    pub fn load(&self, config_path: &Path) -> Result<(), CommandError> {
        if config_path.exists() {
            let content = fs::read_to_string(config_path)?;
            let loaded_config: HistoryConfig = serde_json::from_str(&content)?;

            let mut config = self.0.lock().map_err(|_| CommandError::ConfigError("Failed to lock config".to_string()))?;
            *config = loaded_config;
        }
        Ok(())
    }
}
