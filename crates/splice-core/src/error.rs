use thiserror::Error;

use crate::data::ValueKind;
use crate::types::Signature;

#[derive(Debug, Error)]
pub enum SpliceError {
    // Wiring and validation errors
    #[error("Arity mismatch: expected {expected}, got {actual}")]
    ArityMismatch { expected: usize, actual: usize },

    #[error("Signature mismatch at position {position}: expected {expected}, got {actual}")]
    SignatureMismatch {
        position: usize,
        expected: Signature,
        actual: Signature,
    },

    #[error("Index {index} out of range (length {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Invalid topology: {0}")]
    InvalidTopology(String),

    // Data errors
    #[error("Unknown data signature: {0}")]
    UnknownSignature(Signature),

    #[error("Duplicate signature: {0}")]
    DuplicateSignature(Signature),

    #[error("Type mismatch for {signature}: expected {expected}, got {actual}")]
    TypeMismatch {
        signature: Signature,
        expected: ValueKind,
        actual: ValueKind,
    },

    // Site errors
    #[error("Procedure already registered: {0}")]
    AlreadyRegistered(Signature),

    #[error("Procedure not found: {0}")]
    NotFound(Signature),

    // Builder errors
    #[error("Unresolved procedure {procedure} for joint {joint}")]
    UnresolvedProcedure { joint: String, procedure: Signature },

    #[error("Unresolved joint: {0}")]
    UnresolvedJoint(String),

    #[error("Invalid description: {0}")]
    Description(String),

    // Evaluation errors
    #[error("Procedure {procedure} failed: {message}")]
    Runtime { procedure: Signature, message: String },

    #[error("Composite nesting exceeded max depth ({0})")]
    DepthExceeded(usize),

    // Config errors
    #[error("Config error: {0}")]
    Config(String),

    #[error("Config file not found: {0}")]
    ConfigNotFound(String),

    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // JSON errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SpliceError {
    /// Shorthand for a failure inside a native function.
    pub fn runtime(procedure: &Signature, message: impl Into<String>) -> Self {
        Self::Runtime {
            procedure: procedure.clone(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SpliceError>;
