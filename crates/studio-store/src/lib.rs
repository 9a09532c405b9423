//! Studio Store
//!
//! Durable layout and bookkeeping for creative batches.
//!
//! # Core Concepts
//!
//! - [`RunStore`] / [`Run`]: timestamped run directories with `ads/`,
//!   `captions/` and `metadata/` namespaces
//! - [`RecordBuilder`]: stores one creative's caption and metadata
//! - [`RunContext`]: values computed once per run and shared by every record
//! - [`RankingReport`]: `{rank}. {file} → Score: {score}` listing
//! - [`HistoryLedger`]: append-only cross-run summary log
//! - [`ArchiveBuilder`]: `final_creatives.tar.gz` for distribution
//!
//! # Example
//!
//! ```rust,ignore
//! use studio_store::{ArtifactKind, RecordBuilder, RunStore, SystemClock};
//!
//! let run = RunStore::default().create_run(&SystemClock)?;
//! let image = run.write_artifact(ArtifactKind::Ad, 1, png_bytes)?;
//! let record = RecordBuilder::new(&context).build_record(1, &image, caption, &mut scorer)?;
//! ```

#![warn(unreachable_pub)]

mod archive;
mod error;
mod history;
mod record;
mod report;
mod run;
mod types;

pub use archive::ArchiveBuilder;
pub use error::{StoreError, StoreResult};
pub use history::{
    HistoryLedger, RunMeta, RunSummary, DEFAULT_HISTORY_FILE, DEFAULT_STALE_LOCK,
};
pub use record::{RecordBuilder, RunContext, ScoreSource, ScoringConfig, SeededScorer};
pub use report::{RankingReport, ReportLine};
pub use run::{Run, RunStore, ARCHIVE_FILE_NAME, DEFAULT_RUNS_ROOT, REPORT_FILE_NAME};
pub use types::{
    scores_of, ArtifactKind, BrandPalette, Clock, CreativeMetadata, CreativeRecord, FixedClock,
    ParseRgbError, Rgb, RunBrief, RunId, SystemClock, RUN_ID_FORMAT,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
