//! Benchmark of navigation policies for unmanned surface vehicles in
//! turbulent flow fields.
//!
//! Marinav consists of the following crates:
//!
//! * [marinav-core](marinav_core) provides the environment and policy
//!   contracts, scenarios with spatial indices of hazards, episode rollouts,
//!   the trial orchestrator, result aggregation and checkpointing.
//! * [marinav-env](marinav_env) is a marine navigation environment with a
//!   flow field of Rankine vortices, obstacles and a range sensor.
//! * [marinav-agent](marinav_agent) includes the policies under comparison:
//!   a distributional agent (IQN), a value-based agent (DQN) and two classical
//!   controllers (artificial potential field and bug-style avoidance).
//!
//! This crate wires them into the comparison experiment in [`experiment`] and
//! the `marinav` binary.
pub mod experiment;
pub use marinav_agent as agent;
pub use marinav_core as core;
pub use marinav_env as env;
