//! Studio Ranking Engine
//!
//! Orders a batch of generated creatives by predicted engagement.
//!
//! # Core Concepts
//!
//! - [`IsolationForest`]: seeded one-dimensional outlier model
//! - [`rank`]: combined anomaly + score ordering, best first
//! - [`explain`]: the same ordering with the key behind each position
//! - [`RankingConfig`]: contamination, tree count, seed and fallback threshold
//!
//! # Example
//!
//! ```rust
//! use studio_rank::{rank, RankingConfig};
//!
//! let ranking = rank(&[80.0, 95.0, 70.0], &RankingConfig::default());
//! assert_eq!(ranking.indices(), &[1, 0, 2]);
//! ```

#![warn(unreachable_pub)]

mod error;
mod forest;
mod ranking;

pub use error::RankError;
pub use forest::{average_path_length, ForestConfig, IsolationForest};
pub use ranking::{explain, rank, RankedEntry, Ranking, RankingConfig, RankingMode};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
