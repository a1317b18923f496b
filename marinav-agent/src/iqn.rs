//! IQN agent.
//!
//! Implicit quantile networks predict the return distribution of every action
//! at sampled percent points. For risk-sensitive action selection, percent
//! points are drawn from `(0, cvar]` instead of `(0, 1]`, so that the mean over
//! them approximates the conditional value at risk.
mod base;
mod config;
mod model;
pub use base::IqnAgent;
pub use config::IqnConfig;
pub use model::{average, IqnModel, IqnSample};
