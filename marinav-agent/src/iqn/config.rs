//! Configuration of IQN agent.
use super::IqnSample;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
/// Configuration of [`IqnAgent`](super::IqnAgent).
pub struct IqnConfig {
    /// The number of features of an observation.
    pub obs_dim: usize,

    /// The number of discrete actions.
    pub n_actions: usize,

    /// Dimension of the feature vectors.
    pub feature_dim: usize,

    /// Dimension of the cosine embedding of percent points.
    pub embed_dim: usize,

    /// Percent points sampled for action selection.
    pub sample_percents_act: IqnSample,

    /// Distance of the closest sonar return below which the adaptive risk
    /// level drops under `1.0`.
    pub risk_distance: f64,

    /// Seed of the percent point sampler and of random initialization.
    pub seed: u64,
}

impl Default for IqnConfig {
    fn default() -> Self {
        Self {
            obs_dim: 18,
            n_actions: 9,
            feature_dim: 64,
            embed_dim: 64,
            sample_percents_act: IqnSample::Uniform32,
            risk_distance: 10.0,
            seed: 42,
        }
    }
}

impl IqnConfig {
    /// Sets the dimensions of observations and actions.
    pub fn dims(mut self, obs_dim: usize, n_actions: usize) -> Self {
        self.obs_dim = obs_dim;
        self.n_actions = n_actions;
        self
    }

    /// Sets the dimension of the feature vectors.
    pub fn feature_dim(mut self, v: usize) -> Self {
        self.feature_dim = v;
        self
    }

    /// Sets the dimension of the cosine embedding.
    pub fn embed_dim(mut self, v: usize) -> Self {
        self.embed_dim = v;
        self
    }

    /// Sets the way of sampling percent points for action selection.
    pub fn sample_percents_act(mut self, v: IqnSample) -> Self {
        self.sample_percents_act = v;
        self
    }

    /// Sets the seed.
    pub fn seed(mut self, v: u64) -> Self {
        self.seed = v;
        self
    }

    /// Constructs [`IqnConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`IqnConfig`] as YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
