//! Comparative trials of several policies.
mod config;
use crate::{
    checkpoint::Checkpointer,
    error::MarinavError,
    metrics::{MetricsAggregator, PolicySummary},
    rollout::{run_episode, Protocol},
    scenario::{Scenario, ScenarioBuilder},
    Env,
};
use anyhow::Result;
pub use config::{ExperimentConfig, TrialStart};
use log::{debug, info};
use std::path::PathBuf;

/// A policy under test: a name, an environment owned exclusively by the
/// policy, and the protocol driving the agent.
pub struct Contender<E: Env> {
    name: String,
    env: E,
    protocol: Box<dyn Protocol<E>>,
}

impl<E: Env> Contender<E> {
    /// Constructs a contender.
    pub fn new(name: impl Into<String>, env: E, protocol: impl Protocol<E> + 'static) -> Self {
        Self {
            name: name.into(),
            env,
            protocol: Box::new(protocol),
        }
    }

    /// Name of the policy.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The environment of the policy.
    pub fn env(&self) -> &E {
        &self.env
    }
}

#[cfg_attr(doc, aquamarine::aquamarine)]
/// Runs trials of all contenders and accumulates their results.
///
/// # Trial loop
///
/// 0. The scenario is written into the environment of every contender, giving
///    the observations the first trial starts from.
/// 1. For each trial, the contenders run one episode each, strictly in the
///    order they were given. Later trials start from the state the previous
///    trial left the environments in, unless configured otherwise with
///    [`TrialStart`].
/// 2. Outcomes are appended to a [`MetricsAggregator`].
/// 3. Every `checkpoint_interval` trials, and after the last trial, a summary
///    per policy is logged and all results are written by the [`Checkpointer`].
///
/// ```mermaid
/// graph LR
///     S[ScenarioBuilder]-->|Env::Obs|R[run_episode]
///     R -->|EpisodeOutcome|M[MetricsAggregator]
///     M -->|every K trials|C[Checkpointer]
/// ```
///
/// Errors of agents or environments end the run. Results of trials finished
/// before the last checkpoint are on disk at that point.
pub struct TrialOrchestrator<E: Env> {
    config: ExperimentConfig,
    contenders: Vec<Contender<E>>,
    metrics: MetricsAggregator,
    checkpointer: Checkpointer,
}

impl<E: Env> TrialOrchestrator<E> {
    /// Constructs an orchestrator.
    ///
    /// The timestamp of the checkpoint file is fixed here.
    pub fn build(config: ExperimentConfig, contenders: Vec<Contender<E>>) -> Result<Self> {
        let names: Vec<String> = contenders.iter().map(|c| c.name.clone()).collect();
        let metrics = MetricsAggregator::new(&names)?;
        let checkpointer = Checkpointer::new(&config.output_dir);
        Ok(Self {
            config,
            contenders,
            metrics,
            checkpointer,
        })
    }

    /// Replaces the checkpointer.
    pub fn with_checkpointer(mut self, checkpointer: Checkpointer) -> Self {
        self.checkpointer = checkpointer;
        self
    }

    /// Results so far.
    pub fn metrics(&self) -> &MetricsAggregator {
        &self.metrics
    }

    /// The contenders.
    pub fn contenders(&self) -> &[Contender<E>] {
        &self.contenders
    }

    /// Path of the checkpoint file of the run.
    pub fn checkpoint_path(&self) -> PathBuf {
        self.checkpointer.path()
    }

    /// Writes `scenario` into the environments and runs all trials.
    pub fn run(&mut self, scenario: &Scenario) -> Result<&MetricsAggregator> {
        let builder = ScenarioBuilder::new(scenario);
        let observations = builder.apply_all(self.contenders.iter_mut().map(|c| &mut c.env));
        self.run_from(observations, &builder)
    }

    fn run_from(
        &mut self,
        observations: Vec<E::Obs>,
        builder: &ScenarioBuilder,
    ) -> Result<&MetricsAggregator> {
        let n_trials = self.config.n_trials;
        let interval = self.config.checkpoint_interval;
        info!(
            "Running {} trials of {} policies",
            n_trials,
            self.contenders.len()
        );

        let mut first = Some(observations);
        for trial in 0..n_trials {
            let observations = match first.take() {
                Some(observations) => observations,
                None => self.trial_observations(builder)?,
            };
            self.run_trial(trial, observations)?;

            if interval > 0 && (trial + 1) % interval == 0 {
                self.checkpoint(trial + 1)?;
            }
        }

        if n_trials > 0 && (interval == 0 || n_trials % interval != 0) {
            self.checkpoint(n_trials)?;
        }

        Ok(&self.metrics)
    }

    fn trial_observations(&mut self, builder: &ScenarioBuilder) -> Result<Vec<E::Obs>> {
        match self.config.trial_start {
            TrialStart::Continue => Ok(self.contenders.iter().map(|c| c.env.observation()).collect()),
            TrialStart::RebuildScenario => {
                Ok(builder.apply_all(self.contenders.iter_mut().map(|c| &mut c.env)))
            }
            TrialStart::Reset => self.contenders.iter_mut().map(|c| c.env.reset()).collect(),
        }
    }

    /// Runs one episode per contender, in order, starting from `observations`.
    pub fn run_trial(&mut self, trial: usize, observations: Vec<E::Obs>) -> Result<()> {
        if observations.len() != self.contenders.len() {
            return Err(MarinavError::ObservationCountMismatch {
                expected: self.contenders.len(),
                actual: observations.len(),
            }
            .into());
        }

        for (contender, obs) in self.contenders.iter_mut().zip(observations) {
            let outcome = run_episode(
                &mut contender.env,
                contender.protocol.as_mut(),
                obs,
                self.config.max_steps,
            )?;
            debug!(
                "Trial {}, {}: success = {}, steps = {}, time = {:.2}, energy = {:.2}",
                trial,
                contender.name,
                outcome.success,
                outcome.steps,
                outcome.time,
                outcome.energy
            );
            self.metrics.record(&contender.name, outcome)?;
        }
        Ok(())
    }

    /// Logs a summary of all policies and writes the checkpoint.
    pub fn checkpoint(&self, n_trials_done: usize) -> Result<Vec<PolicySummary>> {
        info!("=== Finish {} trials ===", n_trials_done);
        let summaries = self.metrics.summaries();
        for summary in summaries.iter() {
            info!("{}", summary);
        }
        let path = self.checkpointer.save(&self.metrics)?;
        info!("Saved results in {:?}", path);
        Ok(summaries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        dummy::{DummyEnv, DummyObs},
        rollout::Reactive,
        ReactivePolicy,
    };
    use anyhow::anyhow;
    use std::{cell::Cell, rc::Rc};
    use tempdir::TempDir;

    struct Constant(usize);

    impl ReactivePolicy<DummyEnv> for Constant {
        fn act(&mut self, _obs: &DummyObs) -> Result<usize> {
            Ok(self.0)
        }
    }

    /// Fails at the given call.
    struct FailAt {
        calls: Rc<Cell<usize>>,
        at: usize,
    }

    impl ReactivePolicy<DummyEnv> for FailAt {
        fn act(&mut self, _obs: &DummyObs) -> Result<usize> {
            self.calls.set(self.calls.get() + 1);
            if self.calls.get() == self.at {
                Err(anyhow!("agent fault"))
            } else {
                Ok(0)
            }
        }
    }

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn contenders() -> Vec<Contender<DummyEnv>> {
        vec![
            Contender::new("first", DummyEnv::new(3), Reactive::new(Constant(0))),
            Contender::new("second", DummyEnv::new(5), Reactive::new(Constant(1))),
        ]
    }

    #[test]
    fn test_trials_accumulate_per_policy() -> Result<()> {
        init();
        let dir = TempDir::new("orchestrator")?;
        let config = ExperimentConfig::default()
            .n_trials(4)
            .checkpoint_interval(2)
            .output_dir(dir.path().to_str().unwrap());
        let mut orchestrator = TrialOrchestrator::build(config, contenders())?;
        let metrics = orchestrator.run(&Scenario::open_water())?;

        let names: Vec<&str> = metrics.names().collect();
        assert_eq!(names, vec!["first", "second"]);
        for name in names {
            let results = metrics.get(name).unwrap();
            assert_eq!(results.n_trials(), 4);
            assert_eq!(results.success_rate(), Some(1.0));
        }

        let restored = Checkpointer::load(orchestrator.checkpoint_path())?;
        assert_eq!(&restored, orchestrator.metrics());
        Ok(())
    }

    #[test]
    fn test_trial_start_modes() -> Result<()> {
        let dir = TempDir::new("orchestrator")?;
        let steps = |trial_start: TrialStart| -> Result<Vec<usize>> {
            let config = ExperimentConfig::default()
                .n_trials(2)
                .trial_start(trial_start)
                .output_dir(dir.path().to_str().unwrap());
            let mut orchestrator = TrialOrchestrator::build(
                config,
                vec![Contender::new("only", DummyEnv::new(3), Reactive::new(Constant(0)))],
            )?;
            orchestrator.run(&Scenario::open_water())?;
            let results = orchestrator.metrics().get("only").unwrap();
            Ok(results.time.iter().map(|t| (t / 0.5).round() as usize).collect())
        };

        // Continuing at the goal ends the second episode after one step
        assert_eq!(steps(TrialStart::Continue)?, vec![3, 1]);
        assert_eq!(steps(TrialStart::RebuildScenario)?, vec![3, 3]);
        assert_eq!(steps(TrialStart::Reset)?, vec![3, 3]);
        Ok(())
    }

    #[test]
    fn test_fault_keeps_earlier_checkpoint() -> Result<()> {
        init();
        let dir = TempDir::new("orchestrator")?;
        let config = ExperimentConfig::default()
            .n_trials(5)
            .checkpoint_interval(1)
            .trial_start(TrialStart::RebuildScenario)
            .output_dir(dir.path().to_str().unwrap());
        // Episodes take 3 steps, so the 8th call is in the third trial
        let faulty = FailAt {
            calls: Rc::new(Cell::new(0)),
            at: 8,
        };
        let mut orchestrator = TrialOrchestrator::build(
            config,
            vec![Contender::new("faulty", DummyEnv::new(3), Reactive::new(faulty))],
        )?;

        assert!(orchestrator.run(&Scenario::open_water()).is_err());
        let restored = Checkpointer::load(orchestrator.checkpoint_path())?;
        assert_eq!(restored.get("faulty").unwrap().n_trials(), 2);
        Ok(())
    }

    #[test]
    fn test_observation_count_must_match() -> Result<()> {
        let mut orchestrator = TrialOrchestrator::build(ExperimentConfig::default(), contenders())?;
        let result = orchestrator.run_trial(0, vec![DummyObs(vec![0.0; 3])]);
        assert!(result.is_err());
        Ok(())
    }
}
