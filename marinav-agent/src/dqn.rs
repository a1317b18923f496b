//! DQN agent.
mod base;
mod config;
mod explorer;
pub use base::DqnAgent;
pub use config::DqnConfig;
pub use explorer::EpsilonGreedy;
