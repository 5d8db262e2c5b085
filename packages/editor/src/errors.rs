//! Error types for the editor

use sprout_common::QueryError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EditorError {
    /// A mutation addressed a slot that was never seeded
    #[error("Field not found: {0}")]
    FieldNotFound(String),

    #[error(transparent)]
    Parse(#[from] sprout_parser::ParseError),

    #[error("Expected {expected}, found {found}")]
    ShapeMismatch { expected: String, found: String },

    #[error("Query error: {0}")]
    Query(#[from] QueryError),

    #[error("No <{kind}> block at index {index}")]
    BlockNotFound { kind: String, index: usize },

    #[error("Invalid options: {0}")]
    Options(String),
}

impl EditorError {
    pub fn shape_mismatch(expected: impl Into<String>, found: impl Into<String>) -> Self {
        EditorError::ShapeMismatch {
            expected: expected.into(),
            found: found.into(),
        }
    }
}

impl From<serde_json::Error> for EditorError {
    fn from(e: serde_json::Error) -> Self {
        EditorError::Options(e.to_string())
    }
}
