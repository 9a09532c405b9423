//! One-dimensional isolation forest
//!
//! Fits an ensemble of random isolation trees over scalar observations and
//! reports how "normal" each observation is. Points that are isolated in few
//! splits sit far from the bulk of the data and receive low scores.
//!
//! The scoring convention follows the usual isolation forest definition:
//!
//! ```text
//! score(x)    = -2^(-E[h(x)] / c(psi))
//! decision(x) = score(x) - offset
//! ```
//!
//! where `h(x)` is the path length of `x` in one tree, `psi` the subsample
//! size and `offset` the `contamination` percentile of the training scores.
//! Larger decisions mean "more central".

use crate::error::RankError;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Euler-Mascheroni constant
const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

/// Isolation forest parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForestConfig {
    /// Number of trees in the ensemble
    pub n_estimators: usize,
    /// Upper bound on observations drawn per tree
    pub max_samples: usize,
    /// Expected fraction of outliers, in `(0, 0.5]`
    pub contamination: f64,
    /// Seed for subsampling and split thresholds
    pub seed: u64,
}

impl ForestConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With seed
    #[inline]
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// With contamination
    #[inline]
    #[must_use]
    pub fn with_contamination(mut self, contamination: f64) -> Self {
        self.contamination = contamination;
        self
    }

    /// With number of trees
    #[inline]
    #[must_use]
    pub fn with_estimators(mut self, n_estimators: usize) -> Self {
        self.n_estimators = n_estimators;
        self
    }

    /// Check parameter bounds
    ///
    /// # Errors
    /// Returns [`RankError`] when a parameter cannot produce a usable model.
    pub fn validate(&self) -> Result<(), RankError> {
        if !(self.contamination > 0.0 && self.contamination <= 0.5) {
            return Err(RankError::InvalidContamination(self.contamination));
        }
        if self.n_estimators == 0 {
            return Err(RankError::NoEstimators);
        }
        if self.max_samples == 0 {
            return Err(RankError::NoSamples);
        }
        Ok(())
    }
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            max_samples: 256,
            contamination: 0.2,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone)]
enum Node {
    Leaf {
        size: usize,
    },
    Split {
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

impl Node {
    fn grow(samples: Vec<f64>, depth: usize, height_limit: usize, rng: &mut StdRng) -> Self {
        let (min, max) = bounds(&samples);
        if samples.len() <= 1 || depth >= height_limit || min >= max {
            return Node::Leaf {
                size: samples.len(),
            };
        }

        // `min < max` here, and both halves end up non-empty
        let threshold = rng.random_range(min..max);
        let (left, right): (Vec<f64>, Vec<f64>) =
            samples.into_iter().partition(|v| *v <= threshold);

        Node::Split {
            threshold,
            left: Box::new(Self::grow(left, depth + 1, height_limit, rng)),
            right: Box::new(Self::grow(right, depth + 1, height_limit, rng)),
        }
    }

    fn path_length(&self, x: f64) -> f64 {
        let mut node = self;
        let mut depth = 0usize;
        loop {
            match node {
                Node::Leaf { size } => return depth as f64 + average_path_length(*size),
                Node::Split {
                    threshold,
                    left,
                    right,
                } => {
                    node = if x <= *threshold { left } else { right };
                    depth += 1;
                }
            }
        }
    }
}

/// Fitted isolation forest over scalar observations
#[derive(Debug, Clone)]
pub struct IsolationForest {
    trees: Vec<Node>,
    subsample_size: usize,
    offset: f64,
}

impl IsolationForest {
    /// Fit a forest over `observations`
    ///
    /// Observations must be finite. Parameters outside their valid range are
    /// clamped rather than rejected, so fitting never fails; callers that
    /// want strict checking run [`ForestConfig::validate`] first.
    #[must_use]
    pub fn fit(observations: &[f64], config: &ForestConfig) -> Self {
        let n = observations.len();
        let subsample_size = config.max_samples.max(1).min(n.max(1));
        let height_limit = height_limit(subsample_size);
        let mut rng = StdRng::seed_from_u64(config.seed);

        let trees = (0..config.n_estimators.max(1))
            .map(|_| {
                let sample: Vec<f64> = if n == 0 {
                    Vec::new()
                } else {
                    rand::seq::index::sample(&mut rng, n, subsample_size)
                        .into_iter()
                        .map(|i| observations[i])
                        .collect()
                };
                Node::grow(sample, 0, height_limit, &mut rng)
            })
            .collect();

        let mut forest = Self {
            trees,
            subsample_size,
            offset: 0.0,
        };

        let contamination = config.contamination.clamp(f64::EPSILON, 0.5);
        let mut training: Vec<f64> = observations.iter().map(|x| forest.score_sample(*x)).collect();
        training.sort_by(f64::total_cmp);
        forest.offset = percentile(&training, contamination * 100.0);

        tracing::debug!(
            trees = forest.trees.len(),
            subsample_size,
            offset = forest.offset,
            "fitted isolation forest"
        );
        forest
    }

    /// Raw normality score in `[-1, 0)`; higher is more normal
    #[must_use]
    pub fn score_sample(&self, x: f64) -> f64 {
        if self.trees.is_empty() {
            return -0.5;
        }
        let mean_depth =
            self.trees.iter().map(|t| t.path_length(x)).sum::<f64>() / self.trees.len() as f64;
        let normaliser = average_path_length(self.subsample_size);
        if normaliser <= 0.0 {
            // A single-point subsample cannot isolate anything
            return -0.5;
        }
        -(2f64.powf(-mean_depth / normaliser))
    }

    /// Score shifted by the contamination offset; negative values are outliers
    #[inline]
    #[must_use]
    pub fn decision(&self, x: f64) -> f64 {
        self.score_sample(x) - self.offset
    }

    /// Decision values for every observation
    #[must_use]
    pub fn decision_function(&self, observations: &[f64]) -> Vec<f64> {
        observations.iter().map(|x| self.decision(*x)).collect()
    }

    /// Contamination offset subtracted from raw scores
    #[inline]
    #[must_use]
    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Number of fitted trees
    #[inline]
    #[must_use]
    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }
}

/// Average path length of an unsuccessful BST search over `n` points
#[must_use]
pub fn average_path_length(n: usize) -> f64 {
    match n {
        0 | 1 => 0.0,
        2 => 1.0,
        _ => {
            let n = n as f64;
            2.0 * ((n - 1.0).ln() + EULER_GAMMA) - 2.0 * (n - 1.0) / n
        }
    }
}

fn height_limit(subsample_size: usize) -> usize {
    (subsample_size.max(2) as f64).log2().ceil() as usize
}

fn bounds(samples: &[f64]) -> (f64, f64) {
    samples
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(*v), hi.max(*v))
        })
}

/// Percentile with linear interpolation over an ascending slice
fn percentile(sorted: &[f64], pct: f64) -> f64 {
    match sorted.len() {
        0 => 0.0,
        1 => sorted[0],
        n => {
            let rank = (pct / 100.0) * (n - 1) as f64;
            let lo = rank.floor() as usize;
            let hi = rank.ceil() as usize;
            let frac = rank - lo as f64;
            sorted[lo] + (sorted[hi] - sorted[lo]) * frac
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn average_path_length_small_values() {
        assert_eq!(average_path_length(0), 0.0);
        assert_eq!(average_path_length(1), 0.0);
        assert_eq!(average_path_length(2), 1.0);
        assert!((average_path_length(3) - 1.207).abs() < 1e-3);
        assert!((average_path_length(5) - 2.327).abs() < 1e-3);
    }

    #[test]
    fn percentile_interpolates() {
        let data = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(percentile(&data, 0.0), 1.0);
        assert_eq!(percentile(&data, 100.0), 5.0);
        assert!((percentile(&data, 20.0) - 1.8).abs() < 1e-12);
    }

    #[test]
    fn height_limit_matches_log2() {
        assert_eq!(height_limit(1), 1);
        assert_eq!(height_limit(5), 3);
        assert_eq!(height_limit(256), 8);
    }

    #[test]
    fn outlier_scores_below_cluster() {
        let data = [50.0, 51.0, 50.5, 49.5, 50.2, 49.8, 50.1, 95.0];
        let forest = IsolationForest::fit(&data, &ForestConfig::default());
        let decisions = forest.decision_function(&data);
        let outlier = decisions[7];
        assert!(decisions[..7].iter().all(|d| *d > outlier));
        assert!(outlier < 0.0);
    }

    #[test]
    fn fit_is_deterministic_for_seed() {
        let data = [70.0, 88.0, 91.0, 75.0, 99.0, 82.0];
        let a = IsolationForest::fit(&data, &ForestConfig::default()).decision_function(&data);
        let b = IsolationForest::fit(&data, &ForestConfig::default()).decision_function(&data);
        assert_eq!(a, b);
    }

    #[test]
    fn identical_points_share_one_score() {
        let data = [80.0; 6];
        let forest = IsolationForest::fit(&data, &ForestConfig::default());
        let decisions = forest.decision_function(&data);
        assert!(decisions.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn empty_fit_does_not_panic() {
        let forest = IsolationForest::fit(&[], &ForestConfig::default());
        assert_eq!(forest.tree_count(), 100);
        assert!(forest.decision(1.0).is_finite());
    }

    #[test]
    fn validate_rejects_bad_contamination() {
        assert!(ForestConfig::default().validate().is_ok());
        assert!(matches!(
            ForestConfig::default().with_contamination(0.0).validate(),
            Err(RankError::InvalidContamination(_))
        ));
        assert!(ForestConfig::default()
            .with_contamination(0.7)
            .validate()
            .is_err());
        assert!(matches!(
            ForestConfig::default().with_estimators(0).validate(),
            Err(RankError::NoEstimators)
        ));
    }
}
