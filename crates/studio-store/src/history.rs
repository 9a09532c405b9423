//! Cross-run history ledger
//!
//! A single JSON array of [`RunSummary`] entries, read fully and rewritten
//! fully on every append. Entries are never edited once written; unknown
//! fields from other writers are carried through untouched so the document
//! can grow without losing history.
//!
//! Appends take an exclusive `<ledger>.lock` file and replace the ledger via
//! rename, so overlapping writers serialize instead of losing entries. A lock
//! left behind by a crashed writer is broken once it is older than
//! [`DEFAULT_STALE_LOCK`].

use crate::error::{StoreError, StoreResult};
use crate::record::RunContext;
use crate::types::{BrandPalette, Clock, CreativeRecord, RunId};
use serde::{Deserialize, Serialize};
use chrono::Utc;
use serde_json::{Map, Value};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant, SystemTime};

/// Default ledger file name
pub const DEFAULT_HISTORY_FILE: &str = "run_history.json";

const LOCK_POLL: Duration = Duration::from_millis(25);

/// Age after which an abandoned lock file is broken
pub const DEFAULT_STALE_LOCK: Duration = Duration::from_secs(30);

/// Run-level summary fields (`meta` in the ledger)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMeta {
    /// Visual style
    pub style: String,
    /// Copy tone
    pub tone: String,
    /// Target audience
    pub audience: String,
    /// Slogan used for the run
    pub slogan: String,
    /// Brand palette used for the run
    pub brand_colors: BrandPalette,
    /// Number of creatives produced
    pub total_creatives: usize,
    /// Highest engagement score, if any creative was produced
    pub best_score: Option<f64>,
    /// Fields this version does not know about
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RunMeta {
    /// Summarise a finished run
    #[must_use]
    pub fn from_records(context: &RunContext, records: &[CreativeRecord]) -> Self {
        let brief = context.brief();
        Self {
            style: brief.style.clone(),
            tone: brief.tone.clone(),
            audience: brief.audience.clone(),
            slogan: context.slogan().to_string(),
            brand_colors: context.palette(),
            total_creatives: records.len(),
            best_score: records
                .iter()
                .map(CreativeRecord::score)
                .max_by(f64::total_cmp),
            extra: Map::new(),
        }
    }
}

/// One ledger entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Run identifier
    pub run_id: String,
    /// Run directory
    pub path: String,
    /// Run-level fields
    pub meta: RunMeta,
    /// Append time, RFC 3339
    pub created_at: String,
    /// Fields this version does not know about
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Append-only ledger of run summaries
#[derive(Debug, Clone)]
pub struct HistoryLedger {
    path: PathBuf,
    lock_timeout: Duration,
    stale_lock: Duration,
}

impl HistoryLedger {
    /// Ledger stored at `path`; the file need not exist
    #[inline]
    #[must_use]
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock_timeout: Duration::from_secs(2),
            stale_lock: DEFAULT_STALE_LOCK,
        }
    }

    /// With lock wait bound
    #[inline]
    #[must_use]
    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }

    /// With age after which a leftover lock file is broken
    #[inline]
    #[must_use]
    pub fn with_stale_lock(mut self, age: Duration) -> Self {
        self.stale_lock = age;
        self
    }

    /// Ledger file
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All entries, oldest first; a missing file reads as empty
    ///
    /// Entries whose shape this version cannot read are skipped with a
    /// warning; they stay in the file untouched.
    ///
    /// # Errors
    /// [`StoreError::Ledger`] when the file is not a JSON array,
    /// [`StoreError::Io`] when it cannot be read.
    pub fn entries(&self) -> StoreResult<Vec<RunSummary>> {
        let document = self.document()?;
        let mut entries = Vec::with_capacity(document.len());
        for (position, value) in document.into_iter().enumerate() {
            match serde_json::from_value(value) {
                Ok(entry) => entries.push(entry),
                Err(e) => tracing::warn!(
                    position,
                    error = %e,
                    ledger = %self.path.display(),
                    "skipping unreadable history entry"
                ),
            }
        }
        Ok(entries)
    }

    /// Raw ledger document; earlier entries are never decoded into typed values
    fn document(&self) -> StoreResult<Vec<Value>> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::io_error(&self.path, e)),
        };
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&text).map_err(|source| StoreError::Ledger {
            path: self.path.clone(),
            source,
        })
    }

    /// Append one entry stamped with `clock.now()`
    ///
    /// Earlier entries are copied as raw JSON values and never re-encoded,
    /// so shapes this version does not understand survive unchanged.
    ///
    /// # Errors
    /// [`StoreError::LedgerLocked`] when the lock cannot be taken in time,
    /// plus read, parse and write failures. On error the ledger is unchanged.
    pub fn append(
        &self,
        run_id: &RunId,
        run_path: &Path,
        meta: RunMeta,
        clock: &dyn Clock,
    ) -> StoreResult<RunSummary> {
        let _lock = LedgerLock::acquire(&self.lock_path(), self.lock_timeout, self.stale_lock)?;

        let mut document = self.document()?;
        let entry = RunSummary {
            run_id: run_id.to_string(),
            path: run_path.display().to_string(),
            meta,
            created_at: clock.now().to_rfc3339(),
            extra: Map::new(),
        };
        let value = serde_json::to_value(&entry).map_err(|source| StoreError::Serialize {
            path: self.path.clone(),
            source,
        })?;
        document.push(value);
        self.rewrite(&document)?;

        tracing::info!(
            run_id = %run_id,
            entries = document.len(),
            ledger = %self.path.display(),
            "appended run history"
        );
        Ok(entry)
    }

    fn lock_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".lock");
        self.path.with_file_name(name)
    }

    fn rewrite(&self, entries: &[Value]) -> StoreResult<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir).map_err(|e| StoreError::io_error(&dir, e))?;

        let json = serde_json::to_vec_pretty(entries).map_err(|source| StoreError::Serialize {
            path: self.path.clone(),
            source,
        })?;

        let mut tmp =
            tempfile::NamedTempFile::new_in(&dir).map_err(|e| StoreError::io_error(&dir, e))?;
        tmp.write_all(&json)
            .and_then(|()| tmp.as_file().sync_all())
            .map_err(|e| StoreError::io_error(tmp.path(), e))?;
        tmp.persist(&self.path)
            .map_err(|e| StoreError::io_error(&self.path, e.error))?;
        Ok(())
    }
}

/// Exclusive lock file, removed on drop
///
/// The file records the holder's pid and acquisition time. A holder that
/// died without dropping the lock leaves the file behind; once its mtime is
/// older than the staleness bound the next writer breaks it.
#[derive(Debug)]
struct LedgerLock {
    path: PathBuf,
}

#[derive(Debug, Serialize)]
struct LockHolder {
    pid: u32,
    acquired_at: String,
}

impl LedgerLock {
    fn acquire(path: &Path, timeout: Duration, stale_after: Duration) -> StoreResult<Self> {
        let deadline = Instant::now() + timeout;
        loop {
            match OpenOptions::new().write(true).create_new(true).open(path) {
                Ok(mut file) => {
                    let lock = Self {
                        path: path.to_path_buf(),
                    };
                    let holder = LockHolder {
                        pid: std::process::id(),
                        acquired_at: Utc::now().to_rfc3339(),
                    };
                    // The holder record is informational; staleness uses mtime
                    if let Err(e) = serde_json::to_writer(&mut file, &holder) {
                        tracing::debug!(lock = %path.display(), error = %e, "could not record lock holder");
                    }
                    return Ok(lock);
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    if Self::is_stale(path, stale_after) {
                        tracing::warn!(
                            lock = %path.display(),
                            holder = %fs::read_to_string(path).unwrap_or_default(),
                            "breaking stale ledger lock"
                        );
                        match fs::remove_file(path) {
                            Ok(()) => continue,
                            Err(e) if e.kind() == ErrorKind::NotFound => continue,
                            Err(e) => return Err(StoreError::io_error(path, e)),
                        }
                    }
                    if Instant::now() >= deadline {
                        return Err(StoreError::LedgerLocked {
                            path: path.to_path_buf(),
                        });
                    }
                    std::thread::sleep(LOCK_POLL);
                }
                Err(e) if e.kind() == ErrorKind::NotFound => match path.parent() {
                    // Parent directory missing: create it and retry
                    Some(parent) if !parent.as_os_str().is_empty() && !parent.exists() => {
                        fs::create_dir_all(parent).map_err(|e| StoreError::io_error(parent, e))?;
                    }
                    _ => return Err(StoreError::io_error(path, e)),
                },
                Err(e) => return Err(StoreError::io_error(path, e)),
            }
        }
    }

    /// Lock file last written longer ago than `stale_after`
    fn is_stale(path: &Path, stale_after: Duration) -> bool {
        fs::metadata(path)
            .and_then(|meta| meta.modified())
            .ok()
            .and_then(|modified| SystemTime::now().duration_since(modified).ok())
            .is_some_and(|age| age > stale_after)
    }
}

impl Drop for LedgerLock {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            tracing::warn!(lock = %self.path.display(), error = %e, "failed to release ledger lock");
        }
    }
}
