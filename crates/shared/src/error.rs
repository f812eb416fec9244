use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum SubmitError {
    #[error("missing URL: provide a URL before sending")]
    MissingUrl,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum HistoryError {
    #[error("history index {index} out of range (len {len})")]
    OutOfRange { index: usize, len: usize },
}

/// Non-fatal findings raised while preparing a submission.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum ValidationWarning {
    #[error("header line '{line}' is missing a colon and was skipped")]
    MalformedHeader { line: String },
}
