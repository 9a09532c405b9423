//! Error types for the studio store
//!
//! Every variant is a storage failure: the current run cannot continue and
//! no archive may be produced from it.

use std::path::PathBuf;

/// Storage errors for runs, records, the ledger and archives
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Filesystem operation failed
    #[error("io error at {path}: {source}")]
    Io {
        /// Path being accessed
        path: PathBuf,
        /// Underlying failure
        #[source]
        source: std::io::Error,
    },

    /// A run with this id already has a directory
    #[error("run already exists: {run_id}")]
    RunExists {
        /// Colliding run id
        run_id: String,
    },

    /// No directory for this run id
    #[error("run not found: {run_id}")]
    RunNotFound {
        /// Requested run id
        run_id: String,
    },

    /// Run id does not follow the timestamp format
    #[error("invalid run id: {0}")]
    InvalidRunId(String),

    /// Creative indices start at 1
    #[error("invalid creative index: {0} (indices start at 1)")]
    InvalidIndex(u32),

    /// Creative index already issued in this run
    #[error("creative index {0} already used in this run")]
    DuplicateIndex(u32),

    /// Referenced artifact is not on disk
    #[error("missing artifact: {path}")]
    MissingArtifact {
        /// Expected artifact location
        path: PathBuf,
    },

    /// Ranking does not cover the record set
    #[error("ranking covers {ranked} creatives but {records} records were supplied")]
    RankingMismatch {
        /// Positions in the ranking
        ranked: usize,
        /// Records supplied
        records: usize,
    },

    /// Structured document could not be written
    #[error("failed to serialize {path}: {source}")]
    Serialize {
        /// Document being written
        path: PathBuf,
        /// Encoder failure
        #[source]
        source: serde_json::Error,
    },

    /// History ledger exists but does not parse
    #[error("malformed history ledger {path}: {source}")]
    Ledger {
        /// Ledger file
        path: PathBuf,
        /// Parse failure
        #[source]
        source: serde_json::Error,
    },

    /// Another writer holds the ledger lock
    #[error("history ledger is locked: {path}")]
    LedgerLocked {
        /// Lock file held by another writer
        path: PathBuf,
    },
}

impl StoreError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_exists_display() {
        let err = StoreError::RunExists {
            run_id: "20261014_093000".to_string(),
        };
        assert_eq!(err.to_string(), "run already exists: 20261014_093000");
    }

    #[test]
    fn io_error_keeps_path() {
        let err = StoreError::io_error(
            "/tmp/x",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(err.to_string().starts_with("io error at /tmp/x"));
    }
}
