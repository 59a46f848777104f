use directories::ProjectDirs;
use std::path::{Path, PathBuf};

const APP_NAME: &str = "zetamac-trainer";
const DB_FILE: &str = "results.db";
const CONFIG_FILE: &str = "config.json";

/// Where results and settings live on disk
pub struct AppDirs;

impl AppDirs {
    /// `$HOME/.local/state/zetamac-trainer/results.db`, or the platform data
    /// dir when `HOME` is unset
    pub fn db_path() -> Option<PathBuf> {
        match std::env::var_os("HOME") {
            Some(home) => Some(Self::state_db_path(Path::new(&home))),
            None => Self::project().map(|dirs| dirs.data_local_dir().join(DB_FILE)),
        }
    }

    pub fn config_path() -> PathBuf {
        Self::project()
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE))
            .unwrap_or_else(|| PathBuf::from("zetamac_trainer_config.json"))
    }

    fn state_db_path(home: &Path) -> PathBuf {
        home.join(".local").join("state").join(APP_NAME).join(DB_FILE)
    }

    fn project() -> Option<ProjectDirs> {
        ProjectDirs::from("", "", APP_NAME)
    }
}
