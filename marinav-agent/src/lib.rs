#![warn(missing_docs)]
//! Navigation policies without a deep learning backend.
//!
//! Neural agents evaluate networks stored as [`ndarray`] matrices and read
//! their parameters from model directories through [`LoadModel`]:
//!
//! * [`IqnAgent`](iqn::IqnAgent) is a distributional agent implementing
//!   [`QuantilePolicy`](marinav_core::QuantilePolicy), with fixed and adaptive
//!   risk levels.
//! * [`DqnAgent`](dqn::DqnAgent) is a value-based agent implementing
//!   [`GreedyPolicy`](marinav_core::GreedyPolicy).
//!
//! The classical controllers [`ApfAgent`] and [`BugAgent`] implement
//! [`ReactivePolicy`](marinav_core::ReactivePolicy).
//!
//! All agents read observations laid out as [`NavFeatures`].
mod apf;
mod base;
mod bug;
pub mod dqn;
mod features;
pub mod iqn;
pub mod mlp;
pub use apf::{ApfAgent, ApfConfig};
pub use base::LoadModel;
pub use bug::{BugAgent, BugConfig};
pub use features::NavFeatures;
