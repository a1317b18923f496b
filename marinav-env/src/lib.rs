#![warn(missing_docs)]
//! Marine navigation environment.
//!
//! [`MarineNavEnv`] implements [`marinav_core::Env`]: a unicycle robot
//! ([`MarineRobot`]) crosses a rectangular map, drifting with the flow of
//! Rankine vortices and sensing circular obstacles with a fan of range beams.
//! Vortex cores and obstacles are read from the environment's
//! [`HazardField`](marinav_core::hazard::HazardField), which is usually written
//! by a [`ScenarioBuilder`](marinav_core::scenario::ScenarioBuilder).
//!
//! ```
//! use marinav_core::{scenario::{Scenario, ScenarioBuilder}, Env, Obs};
//! use marinav_env::{MarineNavConfig, MarineNavEnv};
//!
//! let config = MarineNavConfig::default();
//! let mut env = MarineNavEnv::build(&config, 15).unwrap();
//! let obs = ScenarioBuilder::new(&Scenario::adverse_flow()).apply(&mut env);
//! assert_eq!(obs.len(), config.obs_dim());
//! ```
mod config;
mod env;
pub mod flow;
mod obs;
mod robot;
pub mod sonar;
pub use config::{MarineNavConfig, RobotConfig, SonarConfig};
pub use env::MarineNavEnv;
pub use obs::MarineNavObs;
pub use robot::MarineRobot;
