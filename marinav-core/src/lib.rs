#![warn(missing_docs)]
//! Evaluation harness for navigation policies in flow fields.
//!
//! The crate defines the contracts of environments ([`Env`], [`Robot`]) and of
//! the agent families under comparison ([`QuantilePolicy`], [`GreedyPolicy`],
//! [`ReactivePolicy`]), and the machinery to compare them fairly:
//!
//! * [`scenario`] writes a literal experiment condition into environments,
//!   building spatial indices over the hazards it places.
//! * [`rollout`] drives episodes through a single [`Protocol`](rollout::Protocol)
//!   abstraction over all agent families.
//! * [`TrialOrchestrator`] runs repeated trials, accumulates results in a
//!   [`MetricsAggregator`] and persists them with a [`Checkpointer`].
pub mod dummy;
pub mod error;
pub mod hazard;
pub mod record;
pub mod rollout;
pub mod scenario;

mod base;
pub use base::{
    Env, EpisodeState, GreedyPolicy, Obs, QuantileAction, QuantilePolicy, ReactivePolicy, Robot,
    Step,
};

mod checkpoint;
pub use checkpoint::Checkpointer;

mod metrics;
pub use metrics::{MetricsAggregator, PolicyResults, PolicySummary};

mod orchestrator;
pub use orchestrator::{Contender, ExperimentConfig, TrialOrchestrator, TrialStart};
