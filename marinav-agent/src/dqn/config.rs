//! Configuration of DQN agent.
use super::EpsilonGreedy;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
/// Configuration of [`DqnAgent`](super::DqnAgent).
pub struct DqnConfig {
    /// The number of features of an observation.
    pub obs_dim: usize,

    /// The number of discrete actions.
    pub n_actions: usize,

    /// Sizes of the hidden layers of the Q-network.
    pub hidden_dims: Vec<usize>,

    /// Explorer used for non-deterministic predictions.
    pub explorer: EpsilonGreedy,

    /// Seed of the explorer and of random initialization.
    pub seed: u64,
}

impl Default for DqnConfig {
    fn default() -> Self {
        Self {
            obs_dim: 18,
            n_actions: 9,
            hidden_dims: vec![64, 64],
            explorer: EpsilonGreedy::default(),
            seed: 42,
        }
    }
}

impl DqnConfig {
    /// Sets the dimensions of observations and actions.
    pub fn dims(mut self, obs_dim: usize, n_actions: usize) -> Self {
        self.obs_dim = obs_dim;
        self.n_actions = n_actions;
        self
    }

    /// Sets the sizes of the hidden layers.
    pub fn hidden_dims(mut self, v: Vec<usize>) -> Self {
        self.hidden_dims = v;
        self
    }

    /// Sets the explorer.
    pub fn explorer(mut self, v: EpsilonGreedy) -> Self {
        self.explorer = v;
        self
    }

    /// Sets the seed.
    pub fn seed(mut self, v: u64) -> Self {
        self.seed = v;
        self
    }

    /// Layer sizes of the Q-network, from input to output.
    pub fn layer_dims(&self) -> Vec<usize> {
        let mut dims = vec![self.obs_dim];
        dims.extend_from_slice(&self.hidden_dims);
        dims.push(self.n_actions);
        dims
    }

    /// Constructs [`DqnConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`DqnConfig`] as YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempdir::TempDir;

    #[test]
    fn test_serde_dqn_config() -> Result<()> {
        let config = DqnConfig::default()
            .dims(6, 4)
            .hidden_dims(vec![32])
            .explorer(EpsilonGreedy::new(0.1));
        let dir = TempDir::new("dqn_config")?;
        let path = dir.path().join("dqn_config.yaml");
        config.save(&path)?;
        assert_eq!(DqnConfig::load(&path)?, config);
        assert_eq!(config.layer_dims(), vec![6, 32, 4]);
        Ok(())
    }
}
