//! Errors in the library.
use thiserror::Error;

/// Errors in the library.
#[derive(Error, Debug)]
pub enum MarinavError {
    /// Record key error.
    #[error("Record key error: {0}")]
    RecordKeyError(String),

    /// Record value type error.
    #[error("Record value type error: {0}")]
    RecordValueTypeError(String),

    /// No built-in scenario has the given name.
    #[error("Unknown scenario: {0}")]
    UnknownScenario(String),

    /// The number of initial observations does not match the number of contenders.
    #[error("Expected {expected} initial observations, got {actual}")]
    ObservationCountMismatch {
        /// Number of contenders.
        expected: usize,
        /// Number of observations given.
        actual: usize,
    },

    /// Two contenders share a policy name.
    #[error("Duplicate policy name: {0}")]
    DuplicatePolicyName(String),

    /// A CVaR level outside of `(0, 1]`.
    #[error("Risk level must be in (0, 1], got {0}")]
    InvalidRiskLevel(f32),

    /// A distributional protocol was configured without risk levels.
    #[error("At least one risk level is required")]
    EmptyRiskLevels,

    /// The index of the selected risk level is not in the list.
    #[error("Selected risk level index {index} is out of range for {len} levels")]
    SelectedRiskLevelOutOfRange {
        /// Index of the selected risk level.
        index: usize,
        /// Number of configured risk levels.
        len: usize,
    },

    /// Shapes of model parameters or inputs do not match.
    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),
}
