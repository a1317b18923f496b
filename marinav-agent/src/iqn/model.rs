//! IQN model.
use super::IqnConfig;
use crate::mlp::{relu, Mlp};
use anyhow::{Context, Result};
use log::info;
use marinav_core::error::MarinavError;
use ndarray::{Array1, Array2, ArrayView1, Axis};
use serde::{Deserialize, Serialize};
use std::{
    f32::consts::PI,
    fs::File,
    io::{BufReader, BufWriter},
    path::Path,
};

#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
/// The way of taking percent points.
pub enum IqnSample {
    /// Samples over percent points `0.05:0.1:0.95`.
    ///
    /// The percent points are constants.
    Const10,

    /// 8 samples from uniform distribution.
    Uniform8,

    /// 32 samples from uniform distribution.
    Uniform32,

    /// 64 samples from uniform distribution.
    Uniform64,

    /// Single sample, median.
    Median,
}

impl IqnSample {
    /// Returns samples of percent points in `[0, 1)`.
    pub fn sample(&self, rng: &mut fastrand::Rng) -> Vec<f32> {
        match self {
            Self::Const10 => vec![0.05, 0.15, 0.25, 0.35, 0.45, 0.55, 0.65, 0.75, 0.85, 0.95],
            Self::Median => vec![0.5],
            _ => (0..self.n_percent_points()).map(|_| rng.f32()).collect(),
        }
    }

    /// Returns the number of percent points generated by this way.
    pub fn n_percent_points(&self) -> usize {
        match self {
            Self::Const10 => 10,
            Self::Uniform8 => 8,
            Self::Uniform32 => 32,
            Self::Uniform64 => 64,
            Self::Median => 1,
        }
    }
}

/// Implicit quantile network.
///
/// The return quantile of action `a` at percent point `tau` is
/// `head(psi(obs) * phi(tau))[a]`, where `psi` is a feature extractor and
/// `phi` a linear layer over the cosine embedding `cos(π i tau)`, `i = 1..=embed_dim`.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct IqnModel {
    psi: Mlp,
    phi: Mlp,
    head: Mlp,
}

impl IqnModel {
    /// Constructs a model with random weights.
    pub fn random(config: &IqnConfig, rng: &mut fastrand::Rng) -> Self {
        let h = config.feature_dim;
        Self {
            psi: Mlp::random(&[config.obs_dim, h, h], rng),
            phi: Mlp::random(&[config.embed_dim, h], rng),
            head: Mlp::random(&[h, h, config.n_actions], rng),
        }
    }

    /// Checks that the model fits the configuration.
    pub fn check(&self, config: &IqnConfig) -> Result<()> {
        self.psi.check()?;
        self.phi.check()?;
        self.head.check()?;
        let dims = [
            self.psi.in_dim(),
            self.phi.in_dim(),
            self.head.out_dim(),
        ];
        let expected = [config.obs_dim, config.embed_dim, config.n_actions];
        if dims != expected || self.psi.out_dim() != self.phi.out_dim()
            || self.phi.out_dim() != self.head.in_dim()
        {
            return Err(MarinavError::ShapeMismatch(format!(
                "IQN model with (obs, embed, actions) = {:?}, expected {:?}",
                dims, expected
            ))
            .into());
        }
        Ok(())
    }

    fn cos_embed(&self, taus: &[f32]) -> Array2<f32> {
        let embed_dim = self.phi.in_dim();
        Array2::from_shape_fn((taus.len(), embed_dim), |(k, i)| {
            (taus[k] * PI * (i + 1) as f32).cos()
        })
    }

    /// Returns the return quantiles, one row per percent point, one column per action.
    pub fn forward(&self, obs: ArrayView1<f32>, taus: &[f32]) -> Result<Array2<f32>> {
        let psi = self.psi.forward(obs.insert_axis(Axis(0)))?.mapv(relu);
        let phi = self.phi.forward(self.cos_embed(taus).view())?.mapv(relu);
        let h = phi * &psi;
        self.head.forward(h.view())
    }

    /// Loads the model from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).with_context(|| format!("Failed to open {:?}", path))?;
        let model = serde_json::from_reader(BufReader::new(file))?;
        info!("Loaded IQN model from {:?}", path);
        Ok(model)
    }

    /// Saves the model as a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = File::create(path)?;
        serde_json::to_writer(BufWriter::new(file), self)?;
        Ok(())
    }
}

/// Takes an average of the quantiles over percent points.
pub fn average(quantiles: &Array2<f32>) -> Array1<f32> {
    quantiles
        .mean_axis(Axis(0))
        .unwrap_or_else(|| Array1::zeros(quantiles.ncols()))
}
