//! Types for recording episode data.
//!
//! Environments summarize a finished episode as a [`Record`], a nested
//! key-value structure. Rollouts of distributional agents extend the `robot`
//! sub-record of it with quantile telemetry, and the
//! [`Checkpointer`](crate::Checkpointer) serializes records as plain JSON.
//!
//! # Basic Usage
//!
//! ```rust
//! use marinav_core::record::{Record, RecordValue};
//!
//! let mut record = Record::empty();
//! record.insert("discount", RecordValue::Scalar(0.99));
//! record.insert("trajectory", RecordValue::Array2(vec![vec![15.0, 10.0], vec![15.1, 10.2]]));
//! ```
mod base;

pub use base::{Record, RecordValue};
