use crate::schema::{Field, SchemaKind};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SampleNameError {
    #[error("{filename}: {found} tokens found but schema \"{schema}\" requires at least {required}")]
    TooFewTokens {
        filename: String,
        schema: SchemaKind,
        found: usize,
        required: usize,
    },
    #[error("{filename}: {field} is empty")]
    EmptyField { filename: String, field: Field },
    #[error("{filename}: schema \"{schema}\" has no {field}")]
    MissingField {
        filename: String,
        schema: SchemaKind,
        field: Field,
    },
    #[error("No file name in path: {0}")]
    NoFileName(String),
}
