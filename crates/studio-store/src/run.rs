//! Run directories
//!
//! A run is a timestamped directory holding one batch of artifacts:
//!
//! ```text
//! generated_runs/
//! └── 20261014_093005/
//!     ├── ads/        ad_1.png, ad_2.png, ...
//!     ├── captions/   caption_1.txt, ...
//!     ├── metadata/   meta_1.json, ...
//!     ├── ranking_report.txt
//!     └── final_creatives.tar.gz
//! ```
//!
//! Artifact names are derived from kind and index, so any artifact can be
//! located without a side index.

use crate::error::{StoreError, StoreResult};
use crate::report::RankingReport;
use crate::types::{ArtifactKind, Clock, RunId};
use chrono::{DateTime, Utc};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Default base directory for runs
pub const DEFAULT_RUNS_ROOT: &str = "generated_runs";

/// Ranking report file name (run root and archive root)
pub const REPORT_FILE_NAME: &str = "ranking_report.txt";

/// Archive file name inside the run root
pub const ARCHIVE_FILE_NAME: &str = "final_creatives.tar.gz";

/// Creates and opens runs under a base directory
#[derive(Debug, Clone)]
pub struct RunStore {
    base_root: PathBuf,
}

impl RunStore {
    /// Store rooted at `base_root`
    #[inline]
    #[must_use]
    pub fn new(base_root: impl Into<PathBuf>) -> Self {
        Self {
            base_root: base_root.into(),
        }
    }

    /// Base directory
    #[inline]
    #[must_use]
    pub fn base_root(&self) -> &Path {
        &self.base_root
    }

    /// Create a new run named after `clock.now()`
    ///
    /// The run directory itself is created non-recursively, so a second run
    /// in the same second fails with [`StoreError::RunExists`] instead of
    /// writing into the first run's directory.
    ///
    /// # Errors
    /// [`StoreError::RunExists`] on id collision, [`StoreError::Io`] when a
    /// directory cannot be created.
    pub fn create_run(&self, clock: &dyn Clock) -> StoreResult<Run> {
        fs::create_dir_all(&self.base_root)
            .map_err(|e| StoreError::io_error(&self.base_root, e))?;

        let created_at = clock.now();
        let id = RunId::from_timestamp(created_at);
        let root = self.base_root.join(id.as_str());

        match fs::create_dir(&root) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                tracing::warn!(run_id = %id, "run id collision");
                return Err(StoreError::RunExists {
                    run_id: id.to_string(),
                });
            }
            Err(e) => return Err(StoreError::io_error(&root, e)),
        }

        let run = Run {
            id,
            root,
            created_at,
        };
        run.ensure_namespaces()?;

        tracing::info!(run_id = %run.id, root = %run.root.display(), "created run");
        Ok(run)
    }

    /// Open an existing run
    ///
    /// # Errors
    /// [`StoreError::RunNotFound`] when the directory does not exist.
    pub fn open_run(&self, id: &RunId) -> StoreResult<Run> {
        let root = self.base_root.join(id.as_str());
        if !root.is_dir() {
            return Err(StoreError::RunNotFound {
                run_id: id.to_string(),
            });
        }
        let created_at = id
            .timestamp()
            .ok_or_else(|| StoreError::InvalidRunId(id.to_string()))?;
        Ok(Run {
            id: id.clone(),
            root,
            created_at,
        })
    }
}

impl Default for RunStore {
    fn default() -> Self {
        Self::new(DEFAULT_RUNS_ROOT)
    }
}

/// One batch's artifact directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Run {
    id: RunId,
    root: PathBuf,
    created_at: DateTime<Utc>,
}

impl Run {
    /// Run identifier
    #[inline]
    #[must_use]
    pub fn id(&self) -> &RunId {
        &self.id
    }

    /// Run directory
    #[inline]
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Creation instant
    #[inline]
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Create the artifact namespaces; safe to call repeatedly
    ///
    /// # Errors
    /// [`StoreError::Io`] when a directory cannot be created.
    pub fn ensure_namespaces(&self) -> StoreResult<()> {
        for kind in ArtifactKind::ALL {
            let dir = self.namespace(kind);
            fs::create_dir_all(&dir).map_err(|e| StoreError::io_error(&dir, e))?;
        }
        Ok(())
    }

    /// Namespace directory for a kind
    #[inline]
    #[must_use]
    pub fn namespace(&self, kind: ArtifactKind) -> PathBuf {
        self.root.join(kind.dir_name())
    }

    /// Location of an artifact, whether or not it exists yet
    #[inline]
    #[must_use]
    pub fn artifact_path(&self, kind: ArtifactKind, index: u32) -> PathBuf {
        self.namespace(kind).join(kind.file_name(index))
    }

    /// Write an artifact under its namespace
    ///
    /// # Errors
    /// [`StoreError::InvalidIndex`] for index 0, [`StoreError::Io`] on write
    /// failure.
    pub fn write_artifact(
        &self,
        kind: ArtifactKind,
        index: u32,
        content: impl AsRef<[u8]>,
    ) -> StoreResult<PathBuf> {
        if index == 0 {
            return Err(StoreError::InvalidIndex(index));
        }
        let path = self.artifact_path(kind, index);
        fs::write(&path, content).map_err(|e| StoreError::io_error(&path, e))?;
        tracing::debug!(run_id = %self.id, %kind, index, "wrote artifact");
        Ok(path)
    }

    /// Ranking report location
    #[inline]
    #[must_use]
    pub fn report_path(&self) -> PathBuf {
        self.root.join(REPORT_FILE_NAME)
    }

    /// Archive location
    #[inline]
    #[must_use]
    pub fn archive_path(&self) -> PathBuf {
        self.root.join(ARCHIVE_FILE_NAME)
    }

    /// Write the ranking report into the run root
    ///
    /// # Errors
    /// [`StoreError::Io`] on write failure.
    pub fn write_ranking_report(&self, report: &RankingReport) -> StoreResult<PathBuf> {
        let path = self.report_path();
        fs::write(&path, report.render()).map_err(|e| StoreError::io_error(&path, e))?;
        Ok(path)
    }
}
