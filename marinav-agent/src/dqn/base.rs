//! DQN agent implemented with ndarray.
use super::DqnConfig;
use crate::{mlp::{argmax, Mlp}, LoadModel};
use anyhow::{Context, Result};
use log::info;
use marinav_core::{error::MarinavError, Env, GreedyPolicy, Obs};
use ndarray::{Array1, Axis};
use std::{
    fs::{self, File},
    io::{BufReader, BufWriter},
    path::{Path, PathBuf},
};

const MODEL_FILE: &str = "dqn_model.json";

/// DQN agent for evaluation.
pub struct DqnAgent {
    config: DqnConfig,
    qnet: Mlp,
    rng: fastrand::Rng,
}

impl DqnAgent {
    /// Constructs an agent with random weights.
    pub fn build(config: DqnConfig) -> Self {
        let mut rng = fastrand::Rng::with_seed(config.seed);
        let qnet = Mlp::random(&config.layer_dims(), &mut rng);
        Self { config, qnet, rng }
    }

    /// The Q-network.
    pub fn qnet(&self) -> &Mlp {
        &self.qnet
    }

    fn check(&self, qnet: &Mlp) -> Result<()> {
        qnet.check()?;
        if qnet.in_dim() != self.config.obs_dim || qnet.out_dim() != self.config.n_actions {
            return Err(MarinavError::ShapeMismatch(format!(
                "Q-network maps {} features to {} actions, expected {} to {}",
                qnet.in_dim(),
                qnet.out_dim(),
                self.config.obs_dim,
                self.config.n_actions
            ))
            .into());
        }
        Ok(())
    }

    /// Action values of an observation.
    pub fn action_values(&self, features: &[f64]) -> Result<Array1<f32>> {
        let obs: Array1<f32> = features.iter().map(|x| *x as f32).collect();
        let q = self.qnet.forward(obs.view().insert_axis(Axis(0)))?;
        Ok(q.index_axis_move(Axis(0), 0))
    }
}

impl<E: Env> GreedyPolicy<E> for DqnAgent {
    fn predict(&mut self, obs: &E::Obs, deterministic: bool) -> Result<usize> {
        let q = self.action_values(obs.features())?;
        if deterministic {
            Ok(argmax(q.view()))
        } else {
            Ok(self.config.explorer.action(q.view(), &mut self.rng))
        }
    }
}

impl LoadModel for DqnAgent {
    fn save_model<T: AsRef<Path>>(&self, dir: T) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(&dir)?;
        let path = dir.as_ref().join(MODEL_FILE);
        let file = File::create(&path)?;
        serde_json::to_writer(BufWriter::new(file), &self.qnet)?;
        Ok(vec![path])
    }

    fn load_model<T: AsRef<Path>>(&mut self, dir: T) -> Result<()> {
        let path = dir.as_ref().join(MODEL_FILE);
        let file = File::open(&path).with_context(|| format!("Failed to open {:?}", path))?;
        let qnet: Mlp = serde_json::from_reader(BufReader::new(file))?;
        self.check(&qnet)?;
        self.qnet = qnet;
        info!("Loaded Q-network from {:?}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dqn::EpsilonGreedy;
    use marinav_core::dummy::{DummyEnv, DummyObs};
    use tempdir::TempDir;

    fn config() -> DqnConfig {
        DqnConfig::default().dims(3, 5).hidden_dims(vec![8])
    }

    #[test]
    fn test_deterministic_prediction_is_greedy() -> Result<()> {
        let mut agent = DqnAgent::build(config());
        let obs = DummyObs(vec![1.0, -2.0, 0.5]);
        let q = agent.action_values(&obs.0)?;
        let act = GreedyPolicy::<DummyEnv>::predict(&mut agent, &obs, true)?;
        assert!(q.iter().all(|v| *v <= q[act]));
        assert_eq!(GreedyPolicy::<DummyEnv>::predict(&mut agent, &obs, true)?, act);
        Ok(())
    }

    #[test]
    fn test_exploration() -> Result<()> {
        let mut agent = DqnAgent::build(config().explorer(EpsilonGreedy::new(1.0)));
        let obs = DummyObs(vec![0.0, 0.0, 0.0]);
        let mut seen = vec![false; 5];
        for _ in 0..200 {
            seen[GreedyPolicy::<DummyEnv>::predict(&mut agent, &obs, false)?] = true;
        }
        assert!(seen.iter().all(|s| *s));
        Ok(())
    }

    #[test]
    fn test_model_round_trip() -> Result<()> {
        let dir = TempDir::new("dqn")?;
        let agent = DqnAgent::build(config());
        agent.save_model(dir.path())?;

        let mut restored = DqnAgent::build(config().seed(3));
        restored.load_model(dir.path())?;
        assert_eq!(restored.qnet(), agent.qnet());

        let mut other = DqnAgent::build(DqnConfig::default());
        assert!(other.load_model(dir.path()).is_err());
        assert!(other.load_model(dir.path().join("missing")).is_err());
        Ok(())
    }
}
