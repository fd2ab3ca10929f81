//! Failure taxonomy for option loading, submission and classification.

use thiserror::Error;

use crate::selection::Level;

pub const LOAD_FAILED_PLACEHOLDER: &str = "load failed";
pub const LOAD_ERROR_PLACEHOLDER: &str = "load error";
pub const QUERY_FAILED_MARKER: &str = "query failed";
pub const QUERY_ERROR_MARKER: &str = "query error";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("ValidationError: incomplete selection")]
    IncompleteSelection,
    #[error("ValidationError: missing amount")]
    MissingAmount,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("backend rejected option request{}", detail_suffix(.0))]
    Rejected(Option<String>),
    #[error("malformed option response: {0}")]
    Malformed(String),
    #[error("transport failure while loading options: {0}")]
    Transport(String),
}

impl LoadError {
    /// Text shown in the disabled selector after this failure.
    pub fn placeholder(&self) -> &'static str {
        match self {
            LoadError::Rejected(_) | LoadError::Malformed(_) => LOAD_FAILED_PLACEHOLDER,
            LoadError::Transport(_) => LOAD_ERROR_PLACEHOLDER,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassificationError {
    #[error("classification failed: {message}")]
    Rejected { message: String },
    #[error("classification request failed, check that the backend server is running: {0}")]
    Transport(String),
}

impl ClassificationError {
    /// Text that replaces the result level after this failure.
    pub fn marker(&self) -> &'static str {
        match self {
            ClassificationError::Rejected { .. } => QUERY_FAILED_MARKER,
            ClassificationError::Transport(_) => QUERY_ERROR_MARKER,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("{level} selector is not ready")]
    LevelNotReady { level: Level },
    #[error("{value:?} is not an option of the {level} selector")]
    UnknownOption { level: Level, value: String },
}

fn detail_suffix(detail: &Option<String>) -> String {
    match detail {
        Some(message) if !message.is_empty() => format!(": {message}"),
        _ => String::new(),
    }
}
