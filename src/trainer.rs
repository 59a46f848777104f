use crate::analysis::{analyze, Analysis, AnalysisConfig};
use crate::config::Config;
use crate::error::{Result, TrainerError};
use crate::record::ProblemResult;
use crate::session::{
    build_session_config, build_session_config_for_key, FormCapabilities, SessionConfig,
};
use crate::store::ResultStore;
use crate::training::TrainingGoal;
use tracing::{debug, info};
use webbrowser::Browser;

/// Ties the result store to the analysis engine: load, analyze, persist
#[derive(Debug)]
pub struct Trainer {
    store: ResultStore,
    config: Config,
}

impl Trainer {
    pub fn new(store: ResultStore, config: Config) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &ResultStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut ResultStore {
        &mut self.store
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn load_results(&self) -> Result<Vec<ProblemResult>> {
        self.store.load_results()
    }

    pub fn analyze(&self) -> Result<Analysis> {
        let results = self.store.load_results()?;
        debug!("analyzing {} results", results.len());
        Ok(analyze(&results, &AnalysisConfig::from(&self.config)))
    }

    /// Analyze and store the pattern trouble spot as the next training goal.
    /// Nothing is stored when there is no trouble spot.
    pub fn prepare_training(&mut self) -> Result<(Analysis, Option<TrainingGoal>)> {
        let analysis = self.analyze()?;
        let goal = analysis.training_goal();

        match &goal {
            Some(goal) => {
                self.store.save_training_goal(goal)?;
                info!("Training goal saved: {}", goal);
            }
            None => info!("Not enough data for pattern analysis"),
        }

        Ok((analysis, goal))
    }

    /// Session settings for an explicit goal key, or for the stored goal which
    /// is consumed in the process. `None` when neither exists.
    pub fn next_session(
        &self,
        goal_key: Option<&str>,
        capabilities: FormCapabilities,
    ) -> Result<Option<SessionConfig>> {
        let sample_size = self.config.borrow_sample_size;

        if let Some(key) = goal_key {
            return Ok(Some(build_session_config_for_key(key, capabilities, sample_size)));
        }

        let Some(stored) = self.store.take_training_goal()? else {
            info!("No training goal stored");
            return Ok(None);
        };
        info!("Setting up training for: {}", stored.key);

        Ok(Some(build_session_config(
            &stored.goal(),
            capabilities,
            sample_size,
        )))
    }

    pub fn open_game(&self) -> Result<()> {
        let url = &self.config.game_url;
        if !Browser::is_available() {
            return Err(TrainerError::Browser {
                url: url.clone(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "no browser available"),
            });
        }
        webbrowser::open(url).map_err(|source| TrainerError::Browser {
            url: url.clone(),
            source,
        })
    }
}
