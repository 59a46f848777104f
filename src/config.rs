use crate::analysis::AnalysisConfig;
use crate::app_dirs::AppDirs;
use crate::session::DEFAULT_BORROW_SAMPLE_SIZE;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_GAME_URL: &str = "https://arithmetic.zetamac.com/";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub game_url: String,
    pub min_total_results: usize,
    pub operator_min_occurrences: u32,
    pub number_min_occurrences: u32,
    pub pattern_min_occurrences: u32,
    pub borrow_sample_size: usize,
    pub recent_problems: usize,
    pub top_numbers: usize,
}

impl Default for Config {
    fn default() -> Self {
        let analysis = AnalysisConfig::default();
        Self {
            game_url: DEFAULT_GAME_URL.to_string(),
            min_total_results: analysis.min_total_results,
            operator_min_occurrences: analysis.operator_min_occurrences,
            number_min_occurrences: analysis.number_min_occurrences,
            pattern_min_occurrences: analysis.pattern_min_occurrences,
            borrow_sample_size: DEFAULT_BORROW_SAMPLE_SIZE,
            recent_problems: 20,
            top_numbers: 10,
        }
    }
}

impl From<&Config> for AnalysisConfig {
    fn from(cfg: &Config) -> Self {
        Self {
            min_total_results: cfg.min_total_results,
            operator_min_occurrences: cfg.operator_min_occurrences,
            number_min_occurrences: cfg.number_min_occurrences,
            pattern_min_occurrences: cfg.pattern_min_occurrences,
        }
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self {
            path: AppDirs::config_path(),
        }
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
        if let Ok(bytes) = fs::read(&self.path) {
            match serde_json::from_slice::<Config>(&bytes) {
                Ok(cfg) => return cfg,
                Err(e) => tracing::warn!(
                    "ignoring unreadable config {}: {}",
                    self.path.display(),
                    e
                ),
            }
        }
        Config::default()
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg).map_err(std::io::Error::other)?;
        fs::write(&self.path, data)
    }
}
