//! Error taxonomy
//!
//! Configuration problems, missing prerequisites, failed gcloud invocations
//! and staging failures each get their own variant so the entry points can
//! decide what is fatal.

use std::path::PathBuf;
use thiserror::Error;

/// Invalid or missing configuration. Always reported before any gcloud call.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("error parsing config data: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("invalid schedule '{schedule}': {reason}")]
    InvalidSchedule { schedule: String, reason: String },

    #[error("missing required setting: {0}")]
    MissingField(&'static str),

    #[error("invalid value for {field}: '{value}'")]
    InvalidValue { field: &'static str, value: String },
}

/// Failure writing a staged artifact
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize {artifact}: {source}")]
    Json {
        artifact: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Fatal conditions surfaced by the deploy and inventory procedures
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("the {kind} '{name}' does not exist. Please create it first")]
    PreconditionMissing { kind: &'static str, name: String },

    #[error("failed to {action}: {message}")]
    CommandFailure { action: String, message: String },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("unexpected output from gcloud while trying to {action}: {reason}")]
    UnexpectedOutput { action: String, reason: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
