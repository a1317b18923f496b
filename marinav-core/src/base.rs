//! Core functionalities.
mod env;
mod policy;
mod robot;
mod step;
pub use env::Env;
pub use policy::{GreedyPolicy, QuantileAction, QuantilePolicy, ReactivePolicy};
pub use robot::Robot;
use std::fmt::Debug;
pub use step::{EpisodeState, Step};

/// An observation of an environment.
///
/// Policies in this crate consume observations as flat feature vectors, the
/// layout of which is defined by the environment.
pub trait Obs: Clone + Debug {
    /// Returns the features of the observation.
    fn features(&self) -> &[f64];

    /// Returns the number of features.
    fn len(&self) -> usize {
        self.features().len()
    }
}
