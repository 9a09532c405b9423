//! Distributable run archive
//!
//! Packs a run into `final_creatives.tar.gz`:
//!
//! ```text
//! ads/ad_1.png ...
//! captions/caption_1.txt ...
//! metadata/meta_1.json ...
//! ranking_report.txt
//! ```
//!
//! The archive is assembled in a temporary file beside the target and moved
//! into place at the end, so a failed build never leaves a partial archive
//! and a rebuild replaces the previous one.

use crate::error::{StoreError, StoreResult};
use crate::report::RankingReport;
use crate::run::{Run, REPORT_FILE_NAME};
use crate::types::{ArtifactKind, CreativeRecord};
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use studio_rank::Ranking;

/// Builds run archives
#[derive(Debug, Clone, Copy)]
pub struct ArchiveBuilder {
    compression: Compression,
}

impl ArchiveBuilder {
    /// Builder with default compression
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With gzip level (0-9)
    #[inline]
    #[must_use]
    pub fn with_level(mut self, level: u32) -> Self {
        self.compression = Compression::new(level.min(9));
        self
    }

    /// Pack `records` and their ranking report into the run's archive
    ///
    /// Every artifact of every record must exist; an incomplete record
    /// aborts the build before anything is written.
    ///
    /// # Errors
    /// [`StoreError::MissingArtifact`] for an absent artifact,
    /// [`StoreError::RankingMismatch`] when `ranking` does not cover
    /// `records`, and IO failures.
    pub fn build(
        &self,
        run: &Run,
        records: &[CreativeRecord],
        ranking: &Ranking,
    ) -> StoreResult<PathBuf> {
        let report = RankingReport::new(records, ranking)?;

        for record in records {
            for kind in ArtifactKind::ALL {
                let path = record.artifact(kind);
                if !path.is_file() {
                    return Err(StoreError::MissingArtifact {
                        path: path.to_path_buf(),
                    });
                }
            }
        }

        let target = run.archive_path();
        let tmp = tempfile::NamedTempFile::new_in(run.root())
            .map_err(|e| StoreError::io_error(run.root(), e))?;
        let tmp_path = tmp.path().to_path_buf();
        let io = |e: std::io::Error| StoreError::io_error(&tmp_path, e);

        let mtime = u64::try_from(run.created_at().timestamp()).unwrap_or(0);
        let gz = GzEncoder::new(tmp.as_file(), self.compression);
        let mut tar = tar::Builder::new(gz);

        for kind in ArtifactKind::ALL {
            for record in records {
                let path = record.artifact(kind);
                let bytes = fs::read(path).map_err(|e| StoreError::io_error(path, e))?;
                let name = match path.file_name() {
                    Some(name) => name.to_string_lossy().into_owned(),
                    None => kind.file_name(record.index),
                };
                append_bytes(&mut tar, &format!("{}/{}", kind.dir_name(), name), &bytes, mtime)
                    .map_err(io)?;
            }
        }
        append_bytes(&mut tar, REPORT_FILE_NAME, report.render().as_bytes(), mtime).map_err(io)?;

        let mut gz = tar.into_inner().map_err(io)?;
        gz.flush().map_err(io)?;
        gz.finish().map_err(io)?;

        tmp.persist(&target)
            .map_err(|e| StoreError::io_error(&target, e.error))?;

        tracing::info!(
            run_id = %run.id(),
            creatives = records.len(),
            archive = %target.display(),
            "built archive"
        );
        Ok(target)
    }
}

impl Default for ArchiveBuilder {
    fn default() -> Self {
        Self {
            compression: Compression::default(),
        }
    }
}

fn append_bytes<W: Write>(
    tar: &mut tar::Builder<W>,
    name: &str,
    bytes: &[u8],
    mtime: u64,
) -> std::io::Result<()> {
    let mut header = tar::Header::new_gnu();
    header.set_size(bytes.len() as u64);
    header.set_mode(0o644);
    header.set_mtime(mtime);
    header.set_cksum();
    tar.append_data(&mut header, name, bytes)
}
