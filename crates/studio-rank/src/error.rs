//! Configuration errors for the ranking engine
//!
//! Ranking itself never fails; these errors only surface when a caller
//! validates its configuration up front.

/// Invalid ranking configuration
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RankError {
    /// Contamination outside `(0, 0.5]`
    #[error("contamination must be in (0, 0.5], got {0}")]
    InvalidContamination(f64),

    /// Forest with no trees
    #[error("isolation forest needs at least one estimator")]
    NoEstimators,

    /// Trees with no samples
    #[error("max_samples must be at least 1")]
    NoSamples,

    /// Fallback threshold of zero would feed empty vectors to the forest
    #[error("min_observations must be at least 1")]
    NoMinimumObservations,
}
