//! Configuration of [`TrialOrchestrator`](super::TrialOrchestrator).
use crate::rollout::MAX_STEPS;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Where the episodes of a trial start from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrialStart {
    /// Continue from the state the previous trial left the environment in.
    Continue,

    /// Write the scenario into the environments again.
    RebuildScenario,

    /// Call [`Env::reset`](crate::Env::reset).
    Reset,
}

impl Default for TrialStart {
    fn default() -> Self {
        Self::Continue
    }
}

/// Configuration of [`TrialOrchestrator`](super::TrialOrchestrator).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct ExperimentConfig {
    /// The number of trials.
    pub n_trials: usize,

    /// Interval of checkpoints in trials. `0` disables periodic checkpoints.
    pub checkpoint_interval: usize,

    /// Step ceiling of an episode.
    pub max_steps: usize,

    /// Where the episodes of the second and later trials start from.
    #[serde(default)]
    pub trial_start: TrialStart,

    /// Directory of checkpoint files.
    pub output_dir: String,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            n_trials: 100,
            checkpoint_interval: 10,
            max_steps: MAX_STEPS,
            trial_start: TrialStart::default(),
            output_dir: "experiment_data".to_string(),
        }
    }
}

impl ExperimentConfig {
    /// Sets the number of trials.
    pub fn n_trials(mut self, v: usize) -> Self {
        self.n_trials = v;
        self
    }

    /// Sets the interval of checkpoints in trials.
    pub fn checkpoint_interval(mut self, v: usize) -> Self {
        self.checkpoint_interval = v;
        self
    }

    /// Sets the step ceiling of an episode.
    pub fn max_steps(mut self, v: usize) -> Self {
        self.max_steps = v;
        self
    }

    /// Sets where the episodes of later trials start from.
    pub fn trial_start(mut self, v: TrialStart) -> Self {
        self.trial_start = v;
        self
    }

    /// Sets the directory of checkpoint files.
    pub fn output_dir(mut self, v: impl Into<String>) -> Self {
        self.output_dir = v.into();
        self
    }

    /// Constructs [`ExperimentConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`ExperimentConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
