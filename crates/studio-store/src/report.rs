//! Plain-text ranking report
//!
//! One line per creative, best first:
//!
//! ```text
//! 1. ad_2.png → Score: 95
//! 2. ad_1.png → Score: 80
//! ```

use crate::error::{StoreError, StoreResult};
use crate::types::CreativeRecord;
use std::fmt;
use studio_rank::Ranking;

/// One ranked report line
#[derive(Debug, Clone, PartialEq)]
pub struct ReportLine {
    /// One-based rank
    pub rank: usize,
    /// Image file name
    pub file: String,
    /// Engagement score of that creative
    pub score: f64,
}

impl fmt::Display for ReportLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}. {} → Score: {}", self.rank, self.file, self.score)
    }
}

/// Ranked listing of a run's creatives
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RankingReport {
    lines: Vec<ReportLine>,
}

impl RankingReport {
    /// Build report from records and their ranking
    ///
    /// `ranking` indexes into `records` (zero-based slice positions).
    ///
    /// # Errors
    /// [`StoreError::RankingMismatch`] when the ranking is not a permutation
    /// of the record positions.
    pub fn new(records: &[CreativeRecord], ranking: &Ranking) -> StoreResult<Self> {
        let mismatch = || StoreError::RankingMismatch {
            ranked: ranking.len(),
            records: records.len(),
        };
        if ranking.len() != records.len() {
            return Err(mismatch());
        }

        let mut seen = vec![false; records.len()];
        let lines = ranking
            .iter()
            .enumerate()
            .map(|(position, index)| {
                let record = records.get(index).ok_or_else(mismatch)?;
                if std::mem::replace(&mut seen[index], true) {
                    return Err(mismatch());
                }
                Ok(ReportLine {
                    rank: position + 1,
                    file: record.image_file_name().to_string(),
                    score: record.score(),
                })
            })
            .collect::<StoreResult<Vec<_>>>()?;

        Ok(Self { lines })
    }

    /// Report lines, best first
    #[inline]
    #[must_use]
    pub fn lines(&self) -> &[ReportLine] {
        &self.lines
    }

    /// Render as newline-terminated text
    #[must_use]
    pub fn render(&self) -> String {
        self.lines.iter().map(|line| format!("{line}\n")).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BrandPalette, CreativeMetadata, Rgb};
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;
    use studio_rank::{rank, RankingConfig};

    fn record(index: u32, score: f64) -> CreativeRecord {
        CreativeRecord {
            index,
            image_path: PathBuf::from(format!("ads/ad_{index}.png")),
            caption_path: PathBuf::from(format!("captions/caption_{index}.txt")),
            metadata_path: PathBuf::from(format!("metadata/meta_{index}.json")),
            metadata: CreativeMetadata {
                index,
                style: "Luxury".to_string(),
                tone: "Funny".to_string(),
                audience: "Gamers".to_string(),
                slogan: "Hear more".to_string(),
                dominant_colors: BrandPalette::new(Rgb(0, 0, 0), Rgb(255, 255, 255)),
                engagement_score: score,
                file: format!("ad_{index}.png"),
                caption: "caption".to_string(),
            },
        }
    }

    #[test]
    fn report_lists_scores_in_rank_order() {
        let records = vec![record(1, 80.0), record(2, 95.0), record(3, 70.0)];
        let ranking = rank(&[80.0, 95.0, 70.0], &RankingConfig::default());
        let report = RankingReport::new(&records, &ranking).unwrap();

        assert_eq!(
            report.render(),
            "1. ad_2.png → Score: 95\n2. ad_1.png → Score: 80\n3. ad_3.png → Score: 70\n"
        );
    }

    #[test]
    fn report_rejects_short_ranking() {
        let records = vec![record(1, 80.0), record(2, 95.0)];
        let ranking = rank(&[80.0], &RankingConfig::default());
        assert!(matches!(
            RankingReport::new(&records, &ranking),
            Err(StoreError::RankingMismatch {
                ranked: 1,
                records: 2
            })
        ));
    }

    #[test]
    fn empty_report_renders_empty() {
        let ranking = rank(&[], &RankingConfig::default());
        let report = RankingReport::new(&[], &ranking).unwrap();
        assert_eq!(report.render(), "");
    }
}
