use thiserror::Error;

/// Failures raised by the analysis functions in [`crate::core`].
///
/// Every error is raised synchronously at the point of detection and
/// propagated unchanged to the caller. The analysis layer performs no
/// retries and never substitutes a default value for a failed computation.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AnalysisError {
    #[error("need at least {required} data points, got {got}")]
    InsufficientData { required: usize, got: usize },

    #[error("return series lengths differ: reference has {reference}, target has {target}")]
    MismatchedLength { reference: usize, target: usize },

    #[error("reference returns have zero variance over the window")]
    ZeroVariance,

    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },
}

impl AnalysisError {
    pub(crate) fn invalid_input(reason: impl Into<String>) -> Self {
        AnalysisError::InvalidInput {
            reason: reason.into(),
        }
    }
}
