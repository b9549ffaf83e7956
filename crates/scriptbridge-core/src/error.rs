//! Error types for interpreters and the interpreter factory.

use crate::language::ScriptLanguage;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by a backend while loading or evaluating source.
#[derive(Error, Debug)]
pub enum ScriptError {
    /// The script file could not be opened or read.
    #[error("Failed to read script {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The source failed to parse.
    #[error("Parse error: {0}")]
    Parse(String),

    /// The source parsed but raised while running.
    #[error("Evaluation error: {0}")]
    Evaluation(String),

    /// The backend runtime itself failed (missing executable, broken pipe, bad reply).
    #[error("Backend error: {0}")]
    Backend(String),

    /// The interpreter was closed before the call.
    #[error("Interpreter for {0} is closed")]
    Closed(ScriptLanguage),
}

impl ScriptError {
    /// Build an [`ScriptError::Io`] for the given path.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ScriptError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for interpreter operations.
pub type ScriptResult<T> = std::result::Result<T, ScriptError>;

/// Errors raised when resolving an interpreter by language.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FactoryError {
    /// The language is not one this build knows how to construct.
    #[error("Unhandled script language: {0}")]
    UnhandledConfiguration(String),
}

/// Result type for factory operations.
pub type FactoryResult<T> = std::result::Result<T, FactoryError>;
