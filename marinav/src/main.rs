use anyhow::Result;
use clap::{Parser, Subcommand};
use log::info;
use marinav::experiment::{self, AgentsConfig};
use marinav_core::{scenario::Scenario, Checkpointer, ExperimentConfig};
use marinav_env::MarineNavConfig;
use std::path::{Path, PathBuf};

/// Compares navigation policies in a flow field.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Runs trials of all policies on a scenario.
    Run(RunArgs),

    /// Prints the summaries of a checkpoint file.
    Summarize {
        /// Path to `exp_data_<timestamp>.json`
        path: PathBuf,
    },
}

#[derive(clap::Args, Debug)]
struct RunArgs {
    /// Built-in scenario name (adverse_flow, open_water) or path to a scenario YAML file
    #[arg(short, long, default_value = "adverse_flow")]
    scenario: String,

    /// Experiment configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Environment configuration file
    #[arg(long)]
    env_config: Option<PathBuf>,

    /// Agents configuration file
    #[arg(long)]
    agents_config: Option<PathBuf>,

    /// Number of trials, overrides the experiment configuration
    #[arg(short, long)]
    n_trials: Option<usize>,

    /// Output directory, overrides the experiment configuration
    #[arg(short, long)]
    output_dir: Option<String>,

    /// Directory of the IQN model
    #[arg(long)]
    iqn_model: Option<PathBuf>,

    /// Directory of the DQN model
    #[arg(long)]
    dqn_model: Option<PathBuf>,

    /// Risk levels of fixed-risk IQN, comma separated
    #[arg(long, value_delimiter = ',')]
    cvars: Option<Vec<f32>>,

    /// Position of the risk level driving fixed-risk IQN
    #[arg(long, default_value_t = 0)]
    selected_cvar: usize,

    /// Random seed of the environments
    #[arg(long, default_value_t = 15)]
    seed: i64,
}

fn scenario(name_or_path: &str) -> Result<Scenario> {
    if Path::new(name_or_path).is_file() {
        Scenario::load(name_or_path)
    } else {
        Scenario::by_name(name_or_path)
    }
}

fn run(args: RunArgs) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => ExperimentConfig::load(path)?,
        None => ExperimentConfig::default(),
    };
    if let Some(n_trials) = args.n_trials {
        config = config.n_trials(n_trials);
    }
    if let Some(output_dir) = &args.output_dir {
        config = config.output_dir(output_dir);
    }

    let env_config = match &args.env_config {
        Some(path) => MarineNavConfig::load(path)?,
        None => MarineNavConfig::default(),
    };

    let mut agents = match &args.agents_config {
        Some(path) => AgentsConfig::load(path)?,
        None => AgentsConfig::default(),
    };
    if let Some(dir) = args.iqn_model {
        agents = agents.iqn_model_dir(dir);
    }
    if let Some(dir) = args.dqn_model {
        agents = agents.dqn_model_dir(dir);
    }
    if let Some(cvars) = args.cvars {
        agents = agents.cvars(cvars, args.selected_cvar);
    }

    let scenario = scenario(&args.scenario)?;
    let (_, path) = experiment::run(&config, &env_config, &agents, &scenario, args.seed)?;
    info!("Results are in {:?}", path);
    Ok(())
}

fn summarize(path: &Path) -> Result<()> {
    let metrics = Checkpointer::load(path)?;
    for summary in metrics.summaries() {
        println!("{} ({} trials)", summary, summary.n_trials);
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    match args.command {
        Command::Run(args) => run(args),
        Command::Summarize { path } => summarize(&path),
    }
}
