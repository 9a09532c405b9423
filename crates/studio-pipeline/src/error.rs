//! Error types for the pipeline
//!
//! [`CollaboratorError`] never escapes a batch: every capability has a
//! documented fallback. [`PipelineError`] is a terminal batch failure.

use std::path::PathBuf;
use studio_rank::RankError;
use studio_store::StoreError;

/// Failure of an external capability (generation or extraction)
#[derive(Debug, thiserror::Error)]
pub enum CollaboratorError {
    /// Capability switched off by configuration
    #[error("capability disabled")]
    Disabled,

    /// Request did not complete in time
    #[error("request timed out")]
    Timeout,

    /// Remote answered with an error status
    #[error("service returned status {0}")]
    Status(u16),

    /// Network or protocol failure
    #[error("transport error: {0}")]
    Transport(String),

    /// Response arrived but is unusable
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl From<ureq::Error> for CollaboratorError {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::Timeout(_) => Self::Timeout,
            ureq::Error::StatusCode(code) => Self::Status(code),
            other => Self::Transport(other.to_string()),
        }
    }
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("cannot read config {path}: {source}")]
    Io {
        /// Config file
        path: PathBuf,
        /// Read failure
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for this schema
    #[error("cannot parse config {path}: {source}")]
    Parse {
        /// Config file
        path: PathBuf,
        /// TOML decode failure
        #[source]
        source: toml::de::Error,
    },

    /// Values parse but cannot drive a batch
    #[error("invalid configuration: {0}")]
    Invalid(String),

    /// Ranking parameters out of range
    #[error("invalid ranking configuration: {0}")]
    Ranking(#[from] RankError),
}

/// Terminal batch failure
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Storage failed; the run is abandoned without an archive
    #[error("storage failure: {0}")]
    Store(#[from] StoreError),

    /// Configuration rejected before the run started
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Ad image could not be encoded
    #[error("failed to encode ad image: {0}")]
    Image(#[source] image::ImageError),
}

/// Result type alias for pipeline operations
pub type PipelineResult<T> = Result<T, PipelineError>;
