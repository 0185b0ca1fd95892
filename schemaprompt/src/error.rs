//! Error types for schema construction and prompting.

use thiserror::Error;

use crate::schema::ScalarType;

/// Errors raised while building a schema from a JSON description.
#[derive(Error, Debug, PartialEq)]
pub enum SchemaError {
    /// A node that should be a section or a leaf is some other JSON value.
    #[error("Invalid schema node at '{path}': expected an object, got {actual}")]
    NotAnObject { path: String, actual: String },

    /// A leaf `prompt` field is not a string.
    #[error("Invalid prompt at '{path}': expected a string")]
    InvalidPrompt { path: String },

    /// The `type` tag of a leaf is not one of the supported scalar types.
    #[error("Unknown scalar type '{tag}' at '{path}'")]
    UnknownType { path: String, tag: String },

    /// A leaf default does not match its declared type.
    #[error("Type mismatch at '{path}': expected {expected}, got {actual}")]
    TypeMismatch {
        path: String,
        expected: ScalarType,
        actual: String,
    },
}

/// Raw input could not be converted to the requested scalar type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("'{raw}' is not a valid {expected}")]
pub struct CoercionError {
    /// The type the input was coerced to.
    pub expected: ScalarType,
    /// The rejected input.
    pub raw: String,
}

/// Errors raised while interactively collecting values.
#[derive(Error, Debug)]
pub enum PromptError {
    /// Reading input or writing the prompt failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Input ended before the prompt received a line.
    #[error("Input ended while waiting for '{prompt}'")]
    UnexpectedEof { prompt: String },
}

/// Result type for prompting operations.
pub type Result<T, E = PromptError> = std::result::Result<T, E>;
