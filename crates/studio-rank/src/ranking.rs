//! Engagement ranking
//!
//! Orders creatives by a combined key that blends how typical a score is
//! (isolation forest decision) with how high it is:
//!
//! ```text
//! key(i) = decision(score[i]) + score[i] / 100
//! ```
//!
//! Indices are sorted by key descending, ties broken by index ascending.
//! Small or degenerate inputs fall back to plain score order.

use crate::error::RankError;
use crate::forest::{ForestConfig, IsolationForest};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Ranking engine parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingConfig {
    /// Isolation forest parameters
    pub forest: ForestConfig,
    /// Fewest scores for which the forest is consulted
    pub min_observations: usize,
}

impl RankingConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With forest seed
    #[inline]
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.forest.seed = seed;
        self
    }

    /// With fallback threshold
    #[inline]
    #[must_use]
    pub fn with_min_observations(mut self, min_observations: usize) -> Self {
        self.min_observations = min_observations;
        self
    }

    /// Check parameter bounds
    ///
    /// # Errors
    /// Returns [`RankError`] for unusable forest parameters or a zero
    /// fallback threshold.
    pub fn validate(&self) -> Result<(), RankError> {
        if self.min_observations == 0 {
            return Err(RankError::NoMinimumObservations);
        }
        self.forest.validate()
    }
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            forest: ForestConfig::default(),
            min_observations: 5,
        }
    }
}

/// How a ranking was derived
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankingMode {
    /// No scores
    Empty,
    /// Too few (or non-finite) scores; sorted by raw score
    RawScore,
    /// Every score identical; index order
    Uniform,
    /// Combined anomaly + score key
    Forest,
}

impl std::fmt::Display for RankingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RankingMode::Empty => "empty",
            RankingMode::RawScore => "raw-score",
            RankingMode::Uniform => "uniform",
            RankingMode::Forest => "forest",
        };
        f.write_str(name)
    }
}

/// Permutation of creative indices, best first
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ranking {
    order: Vec<usize>,
    mode: RankingMode,
}

impl Ranking {
    /// Ranked zero-based indices
    #[inline]
    #[must_use]
    pub fn indices(&self) -> &[usize] {
        &self.order
    }

    /// Strategy that produced the order
    #[inline]
    #[must_use]
    pub fn mode(&self) -> RankingMode {
        self.mode
    }

    /// Number of ranked entries
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Check if nothing was ranked
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// One-based rank of a zero-based index
    #[must_use]
    pub fn position_of(&self, index: usize) -> Option<usize> {
        self.order.iter().position(|i| *i == index).map(|p| p + 1)
    }

    /// Index ranked first
    #[inline]
    #[must_use]
    pub fn best(&self) -> Option<usize> {
        self.order.first().copied()
    }

    /// Iterate ranked indices
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.order.iter().copied()
    }

    /// Consume into the raw permutation
    #[inline]
    #[must_use]
    pub fn into_indices(self) -> Vec<usize> {
        self.order
    }
}

/// Per-creative ranking breakdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedEntry {
    /// One-based rank
    pub rank: usize,
    /// Zero-based creative index
    pub index: usize,
    /// Score as supplied
    pub raw_score: f64,
    /// Forest decision, when the forest was consulted
    pub anomaly_score: Option<f64>,
    /// Sort key
    pub combined_key: f64,
}

struct Evaluation {
    mode: RankingMode,
    anomaly: Option<Vec<f64>>,
    keys: Vec<f64>,
}

fn evaluate(scores: &[f64], config: &RankingConfig) -> Evaluation {
    // NaN sorts below everything else
    let raw_keys: Vec<f64> = scores
        .iter()
        .map(|s| if s.is_nan() { f64::NEG_INFINITY } else { *s })
        .collect();

    let mode = if scores.is_empty() {
        RankingMode::Empty
    } else if scores.iter().any(|s| !s.is_finite()) || scores.len() < config.min_observations {
        RankingMode::RawScore
    } else if scores.iter().all(|s| *s == scores[0]) {
        RankingMode::Uniform
    } else {
        RankingMode::Forest
    };

    if mode != RankingMode::Forest {
        return Evaluation {
            mode,
            anomaly: None,
            keys: raw_keys,
        };
    }

    let forest = IsolationForest::fit(scores, &config.forest);
    let anomaly = forest.decision_function(scores);
    let keys = anomaly
        .iter()
        .zip(scores)
        .map(|(decision, score)| decision + score / 100.0)
        .collect();

    Evaluation {
        mode,
        anomaly: Some(anomaly),
        keys,
    }
}

fn order_by_keys(keys: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..keys.len()).collect();
    order.sort_by(|&a, &b| match keys[b].total_cmp(&keys[a]) {
        Ordering::Equal => a.cmp(&b),
        other => other,
    });
    order
}

/// Rank scores from most to least engaging
///
/// Never panics: empty input yields an empty ranking, and inputs below
/// `min_observations` (or containing non-finite values) are ordered by raw
/// score. Identical scores yield the identity permutation. The result is a
/// pure function of `scores` and `config`.
#[must_use]
pub fn rank(scores: &[f64], config: &RankingConfig) -> Ranking {
    let evaluation = evaluate(scores, config);
    let order = if evaluation.mode == RankingMode::Uniform {
        (0..scores.len()).collect()
    } else {
        order_by_keys(&evaluation.keys)
    };

    tracing::debug!(
        count = scores.len(),
        mode = %evaluation.mode,
        best = ?order.first(),
        "ranked creatives"
    );

    Ranking {
        order,
        mode: evaluation.mode,
    }
}

/// Rank scores and report the key behind every position
#[must_use]
pub fn explain(scores: &[f64], config: &RankingConfig) -> Vec<RankedEntry> {
    let evaluation = evaluate(scores, config);
    let order = if evaluation.mode == RankingMode::Uniform {
        (0..scores.len()).collect()
    } else {
        order_by_keys(&evaluation.keys)
    };

    order
        .into_iter()
        .enumerate()
        .map(|(position, index)| RankedEntry {
            rank: position + 1,
            index,
            raw_score: scores[index],
            anomaly_score: evaluation.anomaly.as_ref().map(|a| a[index]),
            combined_key: evaluation.keys[index],
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn default_rank(scores: &[f64]) -> Vec<usize> {
        rank(scores, &RankingConfig::default()).into_indices()
    }

    #[test]
    fn empty_scores_rank_empty() {
        let ranking = rank(&[], &RankingConfig::default());
        assert!(ranking.is_empty());
        assert_eq!(ranking.mode(), RankingMode::Empty);
    }

    #[test]
    fn single_score_ranks_first() {
        assert_eq!(default_rank(&[73.0]), vec![0]);
    }

    #[test]
    fn identical_scores_are_identity() {
        let ranking = rank(&[88.0; 7], &RankingConfig::default());
        assert_eq!(ranking.indices(), &[0, 1, 2, 3, 4, 5, 6]);
        assert_eq!(ranking.mode(), RankingMode::Uniform);
    }

    #[test]
    fn small_input_sorts_by_raw_score() {
        let ranking = rank(&[80.0, 95.0, 70.0], &RankingConfig::default());
        assert_eq!(ranking.mode(), RankingMode::RawScore);
        assert_eq!(ranking.indices(), &[1, 0, 2]);
    }

    #[test]
    fn raw_fallback_breaks_ties_by_index() {
        assert_eq!(default_rank(&[70.0, 90.0, 70.0, 90.0]), vec![1, 3, 0, 2]);
    }

    #[test]
    fn tied_extremes_rank_by_score_then_index() {
        let ranking = rank(&[99.0, 70.0, 85.0, 99.0, 70.0], &RankingConfig::default());
        assert_eq!(ranking.mode(), RankingMode::Forest);
        assert_eq!(ranking.indices(), &[0, 3, 2, 1, 4]);
    }

    #[test]
    fn non_finite_scores_fall_back() {
        let scores = [f64::NAN, 80.0, f64::INFINITY, 75.0, 90.0, 60.0];
        let ranking = rank(&scores, &RankingConfig::default());
        assert_eq!(ranking.mode(), RankingMode::RawScore);
        assert_eq!(ranking.indices(), &[2, 4, 1, 3, 5, 0]);
    }

    #[test]
    fn position_of_is_one_based() {
        let ranking = rank(&[80.0, 95.0, 70.0], &RankingConfig::default());
        assert_eq!(ranking.position_of(1), Some(1));
        assert_eq!(ranking.position_of(2), Some(3));
        assert_eq!(ranking.position_of(9), None);
        assert_eq!(ranking.best(), Some(1));
    }

    #[test]
    fn explain_matches_rank() {
        let scores = [72.0, 91.0, 88.0, 79.0, 95.0, 70.0, 84.0];
        let config = RankingConfig::default();
        let entries = explain(&scores, &config);
        let order: Vec<usize> = entries.iter().map(|e| e.index).collect();
        assert_eq!(order, default_rank(&scores));
        assert!(entries.iter().all(|e| e.anomaly_score.is_some()));
        assert!(entries
            .windows(2)
            .all(|w| w[0].combined_key >= w[1].combined_key));
        assert_eq!(entries[0].rank, 1);
    }

    #[test]
    fn explain_fallback_has_no_anomaly_scores() {
        let entries = explain(&[80.0, 95.0], &RankingConfig::default());
        assert!(entries.iter().all(|e| e.anomaly_score.is_none()));
        assert_eq!(entries[0].combined_key, 95.0);
    }

    #[test]
    fn min_observations_controls_fallback() {
        let scores = [99.0, 70.0, 85.0, 99.0, 70.0];
        let strict = RankingConfig::default().with_min_observations(10);
        assert_eq!(rank(&scores, &strict).mode(), RankingMode::RawScore);
        assert_eq!(rank(&scores, &strict).indices(), &[0, 3, 2, 1, 4]);
    }

    #[test]
    fn config_validation() {
        assert!(RankingConfig::default().validate().is_ok());
        assert_eq!(
            RankingConfig::default().with_min_observations(0).validate(),
            Err(RankError::NoMinimumObservations)
        );
    }

    #[test]
    fn config_deserializes_with_defaults() {
        let config: RankingConfig =
            serde_json::from_str(r#"{"forest": {"seed": 7}}"#).unwrap();
        assert_eq!(config.forest.seed, 7);
        assert_eq!(config.forest.n_estimators, 100);
        assert_eq!(config.min_observations, 5);
    }
}
