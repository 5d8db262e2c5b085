use thiserror::Error;

/// Failures found while walking a tree for a mutation anchor
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueryError {
    #[error("Expected {expected}, found {found}")]
    ShapeMismatch { expected: String, found: String },
}

impl QueryError {
    pub fn shape_mismatch(expected: impl Into<String>, found: impl Into<String>) -> Self {
        Self::ShapeMismatch {
            expected: expected.into(),
            found: found.into(),
        }
    }
}

pub type QueryResult<T> = Result<T, QueryError>;
