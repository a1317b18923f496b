//! Comparison of the navigation policies in [`MarineNavEnv`].
use anyhow::Result;
use log::{info, warn};
use marinav_agent::{
    dqn::{DqnAgent, DqnConfig},
    iqn::{IqnAgent, IqnConfig},
    ApfAgent, ApfConfig, BugAgent, BugConfig, LoadModel,
};
use marinav_core::{
    rollout::{Distributional, Greedy, Reactive, RiskMode},
    scenario::Scenario,
    Contender, Env, ExperimentConfig, MetricsAggregator, TrialOrchestrator,
};
use marinav_env::{MarineNavConfig, MarineNavEnv};
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::{Path, PathBuf},
};

/// IQN choosing its risk level from the closest sonar return.
pub const ADAPTIVE_IQN: &str = "adaptive_IQN";

/// IQN at fixed risk levels.
pub const IQN: &str = "IQN";

/// Greedy Q-network.
pub const DQN: &str = "DQN";

/// Artificial potential field controller.
pub const APF: &str = "APF";

/// Bug-style controller.
pub const BA: &str = "BA";

/// Agents taking part in an experiment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentsConfig {
    /// Directory of the IQN model. IQN contenders are left out without it.
    pub iqn_model_dir: Option<PathBuf>,

    /// Directory of the DQN model. DQN is left out without it.
    pub dqn_model_dir: Option<PathBuf>,

    /// Risk levels at which fixed-risk IQN is queried.
    pub cvars: Vec<f32>,

    /// Position in `cvars` of the level driving the robot.
    pub selected_cvar: usize,

    /// IQN agent. Dimensions are taken from the environment.
    pub iqn: IqnConfig,

    /// DQN agent. Dimensions are taken from the environment.
    pub dqn: DqnConfig,

    /// APF controller. The action grid is taken from the environment.
    pub apf: ApfConfig,

    /// Bug controller. The action grid is taken from the environment.
    pub bug: BugConfig,
}

impl Default for AgentsConfig {
    fn default() -> Self {
        Self {
            iqn_model_dir: None,
            dqn_model_dir: None,
            cvars: vec![1.0],
            selected_cvar: 0,
            iqn: IqnConfig::default(),
            dqn: DqnConfig::default(),
            apf: ApfConfig::default(),
            bug: BugConfig::default(),
        }
    }
}

impl AgentsConfig {
    /// Sets the directory of the IQN model.
    pub fn iqn_model_dir(mut self, v: impl Into<PathBuf>) -> Self {
        self.iqn_model_dir = Some(v.into());
        self
    }

    /// Sets the directory of the DQN model.
    pub fn dqn_model_dir(mut self, v: impl Into<PathBuf>) -> Self {
        self.dqn_model_dir = Some(v.into());
        self
    }

    /// Sets the risk levels of fixed-risk IQN and the one driving the robot.
    pub fn cvars(mut self, cvars: Vec<f32>, selected: usize) -> Self {
        self.cvars = cvars;
        self.selected_cvar = selected;
        self
    }

    /// Constructs [`AgentsConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`AgentsConfig`] as YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

fn env(env_config: &MarineNavConfig, seed: i64) -> Result<MarineNavEnv> {
    MarineNavEnv::build(env_config, seed)
}

/// Builds the contenders in the order `adaptive_IQN`, `IQN`, `DQN`, `APF`, `BA`,
/// each with its own environment built from the same configuration and seed.
pub fn contenders(
    env_config: &MarineNavConfig,
    seed: i64,
    agents: &AgentsConfig,
) -> Result<Vec<Contender<MarineNavEnv>>> {
    let (obs_dim, n_actions) = (env_config.obs_dim(), env_config.n_actions());
    let mut contenders = vec![];

    match &agents.iqn_model_dir {
        Some(dir) => {
            let config = agents.iqn.clone().dims(obs_dim, n_actions);
            let mut adaptive = IqnAgent::build(config.clone());
            adaptive.load_model(dir)?;
            let mut fixed = IqnAgent::build(config);
            fixed.load_model(dir)?;

            contenders.push(Contender::new(
                ADAPTIVE_IQN,
                env(env_config, seed)?,
                Distributional::risk_neutral(adaptive, RiskMode::Adaptive),
            ));
            contenders.push(Contender::new(
                IQN,
                env(env_config, seed)?,
                Distributional::new(
                    fixed,
                    agents.cvars.clone(),
                    agents.selected_cvar,
                    RiskMode::Fixed,
                )?,
            ));
        }
        None => warn!("No IQN model given, skipping {} and {}", ADAPTIVE_IQN, IQN),
    }

    match &agents.dqn_model_dir {
        Some(dir) => {
            let mut dqn = DqnAgent::build(agents.dqn.clone().dims(obs_dim, n_actions));
            dqn.load_model(dir)?;
            contenders.push(Contender::new(DQN, env(env_config, seed)?, Greedy::new(dqn)));
        }
        None => warn!("No DQN model given, skipping {}", DQN),
    }

    let robot = &env_config.robot;
    let apf = ApfConfig {
        accelerations: robot.accelerations.clone(),
        angular_velocities: robot.angular_velocities.clone(),
        ..agents.apf.clone()
    };
    contenders.push(Contender::new(
        APF,
        env(env_config, seed)?,
        Reactive::new(ApfAgent::new(apf)),
    ));

    let bug = BugConfig {
        accelerations: robot.accelerations.clone(),
        angular_velocities: robot.angular_velocities.clone(),
        ..agents.bug.clone()
    };
    contenders.push(Contender::new(
        BA,
        env(env_config, seed)?,
        Reactive::new(BugAgent::new(bug)),
    ));

    Ok(contenders)
}

/// Runs the comparison on `scenario`.
///
/// Returns the results and the path of the checkpoint file.
pub fn run(
    config: &ExperimentConfig,
    env_config: &MarineNavConfig,
    agents: &AgentsConfig,
    scenario: &Scenario,
    seed: i64,
) -> Result<(MetricsAggregator, PathBuf)> {
    let contenders = contenders(env_config, seed, agents)?;
    let names: Vec<&str> = contenders.iter().map(|c| c.name()).collect();
    info!("Contenders: {:?}", names);

    let mut orchestrator = TrialOrchestrator::build(config.clone(), contenders)?;
    let metrics = orchestrator.run(scenario)?.clone();
    Ok((metrics, orchestrator.checkpoint_path()))
}
