use anyhow::Result;
use marinav_agent::{ApfAgent, ApfConfig};
use marinav_core::{
    rollout::Reactive, scenario::Scenario, Checkpointer, Contender, Env, ExperimentConfig,
    TrialOrchestrator, TrialStart,
};
use marinav_env::{MarineNavConfig, MarineNavEnv};
use tempdir::TempDir;

#[test]
fn test_apf_reaches_goal_in_open_water() -> Result<()> {
    let _ = env_logger::builder().is_test(true).try_init();
    let dir = TempDir::new("open_water")?;
    let config = ExperimentConfig::default()
        .n_trials(3)
        .trial_start(TrialStart::RebuildScenario)
        .output_dir(dir.path().to_str().unwrap());
    let env = MarineNavEnv::build(&MarineNavConfig::default(), 15)?;
    let apf = Contender::new("APF", env, Reactive::new(ApfAgent::new(ApfConfig::default())));

    let mut orchestrator = TrialOrchestrator::build(config, vec![apf])?;
    let metrics = orchestrator.run(&Scenario::open_water())?;

    let results = metrics.get("APF").unwrap();
    assert_eq!(results.success, vec![true, true, true]);
    assert!(results.energy.iter().all(|e| *e > 0.0));
    // identical trials from a rebuilt scenario
    assert_eq!(results.time[0], results.time[2]);

    let summary = results.summary("APF").to_string();
    assert!(summary.starts_with("APF | success rate: 1.00 | avg_time: "));

    let restored = Checkpointer::load(orchestrator.checkpoint_path())?;
    assert_eq!(restored.get("APF").unwrap().n_trials(), 3);
    Ok(())
}
