use thiserror::Error;

/// Error types for the apl-focus-rs library.
#[derive(Error, Debug)]
pub enum AplError {
    /// The tracker rejected the beamline or bunch (e.g. a negative drift length).
    #[error("Propagation failed: {0}")]
    PropagationFailure(String),

    /// The scalar minimizer exhausted its budget without meeting its tolerance.
    ///
    /// Carries the best estimate found so far.
    #[error(
        "Optimization failed after {iterations} iterations: {message} (best x = {best_x:.6e}, f = {best_value:.6e})"
    )]
    OptimizationFailure {
        best_x: f64,
        best_value: f64,
        iterations: usize,
        message: String,
    },

    /// The objective produced a non-finite value.
    #[error("Function evaluation error: {0}")]
    FunctionEvaluation(String),

    /// Invalid input data.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// I/O error wrapper.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Generic error for cases that don't fit the other categories.
    #[error("Error: {0}")]
    Other(String),
}

/// Result type alias for apl-focus-rs operations.
pub type Result<T> = std::result::Result<T, AplError>;

impl From<String> for AplError {
    fn from(s: String) -> Self {
        AplError::Other(s)
    }
}

impl From<&str> for AplError {
    fn from(s: &str) -> Self {
        AplError::Other(s.to_string())
    }
}
