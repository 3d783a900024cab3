//! Error types for the engine.

use crate::parser::ParseError;
use std::io;
use thiserror::Error;

/// Errors the engine surfaces to callers. User-program failures (type
/// errors in built-ins, arithmetic on unbound variables, depth exhaustion)
/// are ordinary resolution failure and never reach this type.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("{0}")]
    Parse(#[from] ParseError),

    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;
