//! Safety-probe error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SafetyError {
    #[error("probe '{check}' failed: {detail}")]
    ProbeFailed { check: String, detail: String },
}

pub type SafetyResult<T> = Result<T, SafetyError>;
