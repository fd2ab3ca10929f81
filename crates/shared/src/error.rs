use thiserror::Error;

/// A single flowchart step entry that cannot be drawn.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderDataError {
    #[error("flowchart step is not a sequence: {found}")]
    NotASequence { found: String },
    #[error("flowchart step needs at least 2 elements, found {found}")]
    TooFewElements { found: usize },
}
