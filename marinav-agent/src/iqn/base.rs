//! IQN agent implemented with ndarray.
use super::{average, IqnConfig, IqnModel};
use crate::{features::NavFeatures, mlp::argmax, LoadModel};
use anyhow::Result;
use log::trace;
use marinav_core::{Env, Obs, QuantileAction, QuantilePolicy};
use ndarray::Array1;
use std::{
    fs,
    path::{Path, PathBuf},
};

const MODEL_FILE: &str = "iqn_model.json";

/// IQN agent for evaluation.
///
/// Percent points are drawn from a generator seeded by [`IqnConfig::seed`], so
/// that evaluations are reproducible.
pub struct IqnAgent {
    config: IqnConfig,
    model: IqnModel,
    rng: fastrand::Rng,
}

impl IqnAgent {
    /// Constructs an agent with random weights.
    pub fn build(config: IqnConfig) -> Self {
        let mut rng = fastrand::Rng::with_seed(config.seed);
        let model = IqnModel::random(&config, &mut rng);
        Self { config, model, rng }
    }

    /// Constructs an agent with the given model.
    pub fn with_model(config: IqnConfig, model: IqnModel) -> Result<Self> {
        model.check(&config)?;
        let rng = fastrand::Rng::with_seed(config.seed);
        Ok(Self { config, model, rng })
    }

    /// The model.
    pub fn model(&self) -> &IqnModel {
        &self.model
    }

    /// Risk level derived from the closest sonar return: proportional to its
    /// distance below [`IqnConfig::risk_distance`], risk neutral otherwise.
    pub fn adaptive_cvar(&self, features: &[f64]) -> Result<f32> {
        let cvar = match NavFeatures::parse(features)?.closest_return() {
            Some((_, d)) if d < self.config.risk_distance => d / self.config.risk_distance,
            _ => 1.0,
        };
        Ok(cvar as f32)
    }

    fn eval(&mut self, features: &[f64], cvar: f32) -> Result<QuantileAction> {
        let taus: Vec<f32> = self
            .config
            .sample_percents_act
            .sample(&mut self.rng)
            .into_iter()
            .map(|u| u * cvar)
            .collect();
        let obs: Array1<f32> = features.iter().map(|x| *x as f32).collect();
        let quantiles = self.model.forward(obs.view(), &taus)?;
        let act = argmax(average(&quantiles).view());
        trace!("cvar = {}, act = {}", cvar, act);

        Ok(QuantileAction {
            act,
            quantiles: quantiles.outer_iter().map(|row| row.to_vec()).collect(),
            taus,
        })
    }
}

impl<E: Env> QuantilePolicy<E> for IqnAgent {
    fn act_eval(&mut self, obs: &E::Obs, cvar: f32) -> Result<QuantileAction> {
        self.eval(obs.features(), cvar)
    }

    fn act_adaptive_eval(&mut self, obs: &E::Obs) -> Result<QuantileAction> {
        let cvar = self.adaptive_cvar(obs.features())?;
        self.eval(obs.features(), cvar)
    }
}

impl LoadModel for IqnAgent {
    fn save_model<T: AsRef<Path>>(&self, dir: T) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(&dir)?;
        let path = dir.as_ref().join(MODEL_FILE);
        self.model.save(&path)?;
        Ok(vec![path])
    }

    fn load_model<T: AsRef<Path>>(&mut self, dir: T) -> Result<()> {
        let model = IqnModel::load(dir.as_ref().join(MODEL_FILE))?;
        model.check(&self.config)?;
        self.model = model;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::iqn::IqnSample;
    use marinav_core::dummy::{DummyEnv, DummyObs};
    use tempdir::TempDir;

    fn config() -> IqnConfig {
        IqnConfig::default().dims(6, 4).feature_dim(16).embed_dim(8)
    }

    fn obs(sonar: [f64; 2]) -> DummyObs {
        DummyObs(vec![10.0, 5.0, 1.0, 0.0, sonar[0], sonar[1]])
    }

    #[test]
    fn test_quantiles_shape_and_taus() -> Result<()> {
        let mut agent = IqnAgent::build(config());
        let sample = QuantilePolicy::<DummyEnv>::act_eval(&mut agent, &obs([0.0, 0.0]), 0.25)?;

        assert_eq!(sample.taus.len(), 32);
        assert!(sample.taus.iter().all(|t| *t >= 0.0 && *t <= 0.25));
        assert_eq!(sample.quantiles.len(), 32);
        assert!(sample.quantiles.iter().all(|row| row.len() == 4));
        assert!(sample.act < 4);
        Ok(())
    }

    #[test]
    fn test_adaptive_cvar_follows_closest_return() -> Result<()> {
        let agent = IqnAgent::build(config());
        assert_eq!(agent.adaptive_cvar(obs([0.0, 0.0]).features())?, 1.0);
        assert_eq!(agent.adaptive_cvar(obs([12.0, 0.0]).features())?, 1.0);
        assert!((agent.adaptive_cvar(obs([3.0, 4.0]).features())? - 0.5).abs() < 1e-6);
        Ok(())
    }

    #[test]
    fn test_adaptive_eval_samples_below_risk_level() -> Result<()> {
        let mut agent = IqnAgent::build(config().sample_percents_act(IqnSample::Const10));
        let sample = QuantilePolicy::<DummyEnv>::act_adaptive_eval(&mut agent, &obs([0.0, 4.0]))?;
        assert_eq!(sample.taus.len(), 10);
        assert!((sample.taus[9] - 0.95 * 0.4).abs() < 1e-6);
        Ok(())
    }

    #[test]
    fn test_model_round_trip() -> Result<()> {
        let dir = TempDir::new("iqn")?;
        let agent = IqnAgent::build(config());
        let paths = agent.save_model(dir.path())?;
        assert!(paths[0].ends_with(MODEL_FILE));

        let mut restored = IqnAgent::build(config().seed(7));
        assert_ne!(restored.model(), agent.model());
        restored.load_model(dir.path())?;
        assert_eq!(restored.model(), agent.model());

        let mut other = IqnAgent::build(IqnConfig::default());
        assert!(other.load_model(dir.path()).is_err());
        Ok(())
    }

    #[test]
    fn test_same_seed_same_decisions() -> Result<()> {
        let mut a = IqnAgent::build(config());
        let mut b = IqnAgent::build(config());
        for _ in 0..3 {
            let sa = QuantilePolicy::<DummyEnv>::act_eval(&mut a, &obs([1.0, 1.0]), 0.5)?;
            let sb = QuantilePolicy::<DummyEnv>::act_eval(&mut b, &obs([1.0, 1.0]), 0.5)?;
            assert_eq!(sa, sb);
        }
        Ok(())
    }
}
