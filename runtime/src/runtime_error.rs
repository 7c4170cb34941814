use thiserror::Error;

use tsquery_model::ParseError;

use crate::pipeline::StageKind;

pub type RuntimeResult<T> = Result<T, RuntimeError>;

#[derive(Debug, PartialEq, Clone, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("invalid operations in order array [{}]", .0.join(", "))]
    InvalidOrderOperations(Vec<String>),
    #[error("{0} configured but no {0} found in order array")]
    StageMissingFromOrder(StageKind),
    #[error("more than one {0} found in order array")]
    DuplicateStageInOrder(StageKind),
    #[error("Invalid regex: {0}")]
    InvalidRegex(String),
    #[error("{0}")]
    General(String),
}

impl From<&str> for RuntimeError {
    fn from(message: &str) -> Self {
        RuntimeError::General(String::from(message))
    }
}

impl From<String> for RuntimeError {
    fn from(message: String) -> Self {
        RuntimeError::General(message)
    }
}
