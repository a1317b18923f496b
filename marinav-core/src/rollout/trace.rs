//! Quantile telemetry of distributional agents.
use crate::{
    error::MarinavError,
    record::{Record, RecordValue},
    QuantileAction,
};
use anyhow::Result;

/// Predicted quantiles at a single step.
#[derive(Debug, Clone, PartialEq)]
pub struct QuantileStep {
    /// `K` rows, one per tau, of `n_actions` return quantiles each.
    pub quantiles: Vec<Vec<f32>>,

    /// `K` probability levels.
    pub taus: Vec<f32>,
}

/// Quantile telemetry of one risk level over an episode, one block per step.
#[derive(Debug, Clone, PartialEq)]
pub struct QuantileTrace {
    cvar: f32,
    steps: Vec<QuantileStep>,
}

impl QuantileTrace {
    fn new(cvar: f32) -> Self {
        Self {
            cvar,
            steps: vec![],
        }
    }

    /// The risk level the trace belongs to.
    pub fn cvar(&self) -> f32 {
        self.cvar
    }

    /// Per-step blocks, in step order.
    pub fn steps(&self) -> &[QuantileStep] {
        &self.steps
    }

    /// Quantile rows of all steps, concatenated along the step axis.
    pub fn concat_quantiles(&self) -> Vec<Vec<f64>> {
        self.steps
            .iter()
            .flat_map(|s| s.quantiles.iter())
            .map(|row| row.iter().map(|q| f64::from(*q)).collect())
            .collect()
    }

    /// Taus of all steps, concatenated along the step axis.
    pub fn concat_taus(&self) -> Vec<f64> {
        self.steps
            .iter()
            .flat_map(|s| s.taus.iter())
            .map(|t| f64::from(*t))
            .collect()
    }
}

/// Quantile traces of all configured risk levels, grown in parallel.
///
/// Every risk level receives a block at every step, whether or not it is the
/// level whose action drives the robot.
#[derive(Debug, Clone, PartialEq)]
pub struct QuantileTraces {
    traces: Vec<QuantileTrace>,
}

impl QuantileTraces {
    /// Empty traces for the given risk levels.
    pub fn new(cvars: &[f32]) -> Self {
        Self {
            traces: cvars.iter().map(|c| QuantileTrace::new(*c)).collect(),
        }
    }

    /// Appends the samples of one step, one per risk level in configuration order.
    pub fn push(&mut self, samples: Vec<QuantileAction>) -> Result<()> {
        if samples.len() != self.traces.len() {
            return Err(MarinavError::ShapeMismatch(format!(
                "{} quantile samples for {} risk levels",
                samples.len(),
                self.traces.len()
            ))
            .into());
        }
        for (trace, sample) in self.traces.iter_mut().zip(samples) {
            trace.steps.push(QuantileStep {
                quantiles: sample.quantiles,
                taus: sample.taus,
            });
        }
        Ok(())
    }

    /// Traces in the order of the risk levels.
    pub fn traces(&self) -> &[QuantileTrace] {
        &self.traces
    }

    /// Adds `actions_cvars`, `actions_quantiles` and `actions_taus` to the
    /// `robot` sub-record of an episode record.
    pub fn write_to(&self, record: &mut Record) -> Result<()> {
        let robot = record.record_entry("robot")?;
        robot.insert(
            "actions_cvars",
            RecordValue::Array1(self.traces.iter().map(|t| f64::from(t.cvar)).collect()),
        );
        robot.insert(
            "actions_quantiles",
            RecordValue::Array3(self.traces.iter().map(|t| t.concat_quantiles()).collect()),
        );
        robot.insert(
            "actions_taus",
            RecordValue::Array2(self.traces.iter().map(|t| t.concat_taus()).collect()),
        );
        Ok(())
    }
}
