//! Content loading errors.

use std::path::PathBuf;

use skirmish_core::EngineError;
use thiserror::Error;

/// Failure while loading or spawning content.
#[derive(Debug, Error)]
pub enum ContentError {
    /// The content file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// File that was being read.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The content is not valid bestiary JSON.
    #[error("invalid bestiary json: {0}")]
    Json(#[from] serde_json::Error),

    /// Two templates share a kind.
    #[error("enemy kind `{0}` is defined more than once")]
    DuplicateKind(String),

    /// No template has the requested kind.
    #[error("unknown enemy kind `{0}`")]
    UnknownKind(String),

    /// A template failed to build.
    #[error("enemy kind `{kind}` failed to build: {source}")]
    Build {
        /// Kind being built.
        kind: String,
        /// Engine error.
        #[source]
        source: EngineError,
    },
}
