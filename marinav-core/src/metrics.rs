//! Accumulation of trial results per policy.
use crate::{error::MarinavError, record::Record, rollout::EpisodeOutcome};
use anyhow::Result;
use serde::{
    de::{self, Deserializer, MapAccess, Visitor},
    ser::Serializer,
    Deserialize, Serialize,
};
use std::fmt;

/// Results of a policy over all trials so far, in trial order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PolicyResults {
    /// Episode records.
    pub ep_data: Vec<Record>,

    /// Success flags.
    pub success: Vec<bool>,

    /// Simulated episode times.
    pub time: Vec<f64>,

    /// Energy consumed per episode.
    pub energy: Vec<f64>,
}

impl PolicyResults {
    /// Appends the outcome of a trial.
    pub fn push(&mut self, outcome: EpisodeOutcome) {
        self.ep_data.push(outcome.record);
        self.success.push(outcome.success);
        self.time.push(outcome.time);
        self.energy.push(outcome.energy);
    }

    /// The number of trials.
    pub fn n_trials(&self) -> usize {
        self.success.len()
    }

    /// The number of successful trials.
    pub fn n_successes(&self) -> usize {
        self.success.iter().filter(|s| **s).count()
    }

    /// Successes over all trials so far; `None` before the first trial.
    pub fn success_rate(&self) -> Option<f64> {
        match self.n_trials() {
            0 => None,
            n => Some(self.n_successes() as f64 / n as f64),
        }
    }

    /// Mean time over successful trials; `None` without successes.
    pub fn mean_time(&self) -> Option<f64> {
        self.mean_over_successes(&self.time)
    }

    /// Mean energy over successful trials; `None` without successes.
    pub fn mean_energy(&self) -> Option<f64> {
        self.mean_over_successes(&self.energy)
    }

    fn mean_over_successes(&self, values: &[f64]) -> Option<f64> {
        let (sum, n) = self
            .success
            .iter()
            .zip(values)
            .filter(|(s, _)| **s)
            .fold((0.0, 0usize), |(sum, n), (_, v)| (sum + v, n + 1));
        if n == 0 {
            None
        } else {
            Some(sum / n as f64)
        }
    }

    /// Summarizes the results under the given policy name.
    pub fn summary(&self, name: &str) -> PolicySummary {
        PolicySummary {
            name: name.to_string(),
            n_trials: self.n_trials(),
            success_rate: self.success_rate().unwrap_or(0.0),
            mean_time: self.mean_time(),
            mean_energy: self.mean_energy(),
        }
    }
}

/// Summary of a policy's results.
#[derive(Debug, Clone, PartialEq)]
pub struct PolicySummary {
    /// Policy name.
    pub name: String,

    /// The number of trials.
    pub n_trials: usize,

    /// Successes over trials.
    pub success_rate: f64,

    /// Mean time of successful trials.
    pub mean_time: Option<f64>,

    /// Mean energy of successful trials.
    pub mean_energy: Option<f64>,
}

fn fmt_mean(v: Option<f64>) -> String {
    match v {
        Some(v) => format!("{:.2}", v),
        None => "n/a".to_string(),
    }
}

impl fmt::Display for PolicySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | success rate: {:.2} | avg_time: {} | avg_energy: {}",
            self.name,
            self.success_rate,
            fmt_mean(self.mean_time),
            fmt_mean(self.mean_energy)
        )
    }
}

/// Append-only results of all policies, keyed by policy name.
///
/// Serializes to a JSON object with one key per policy, in registration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricsAggregator {
    results: Vec<(String, PolicyResults)>,
}

impl MetricsAggregator {
    /// Constructs an aggregator with empty results for the given policies.
    pub fn new(names: &[String]) -> Result<Self> {
        let mut results: Vec<(String, PolicyResults)> = Vec::with_capacity(names.len());
        for name in names.iter() {
            if results.iter().any(|(n, _)| n == name) {
                return Err(MarinavError::DuplicatePolicyName(name.clone()).into());
            }
            results.push((name.clone(), PolicyResults::default()));
        }
        Ok(Self { results })
    }

    /// Appends the outcome of a trial of the named policy.
    pub fn record(&mut self, name: &str, outcome: EpisodeOutcome) -> Result<()> {
        match self.results.iter_mut().find(|(n, _)| n == name) {
            Some((_, results)) => {
                results.push(outcome);
                Ok(())
            }
            None => Err(MarinavError::RecordKeyError(name.to_string()).into()),
        }
    }

    /// Results of the named policy.
    pub fn get(&self, name: &str) -> Option<&PolicyResults> {
        self.results
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, r)| r)
    }

    /// Policy names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.results.iter().map(|(n, _)| n.as_str())
    }

    /// Summaries of all policies in registration order.
    pub fn summaries(&self) -> Vec<PolicySummary> {
        self.results
            .iter()
            .map(|(name, results)| results.summary(name))
            .collect()
    }
}

struct MetricsVisitor;

impl<'de> Visitor<'de> for MetricsVisitor {
    type Value = MetricsAggregator;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a map from policy names to results")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut results: Vec<(String, PolicyResults)> =
            Vec::with_capacity(map.size_hint().unwrap_or(0));
        while let Some((name, r)) = map.next_entry::<String, PolicyResults>()? {
            if results.iter().any(|(n, _)| *n == name) {
                return Err(de::Error::custom(MarinavError::DuplicatePolicyName(name)));
            }
            results.push((name, r));
        }
        Ok(MetricsAggregator { results })
    }
}

// Entries are kept in document order.
impl<'de> Deserialize<'de> for MetricsAggregator {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(MetricsVisitor)
    }
}

impl Serialize for MetricsAggregator {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.results.iter().map(|(n, r)| (n, r)))
    }
}
