//! Core types for the studio store
//!
//! Defines:
//! - Run identifiers and the clock they are derived from
//! - Artifact kinds and their naming scheme
//! - Brand colours and the creative brief
//! - Per-creative metadata and records

use crate::error::StoreError;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// `strftime` layout of run identifiers
pub const RUN_ID_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Timestamp-derived run identifier, unique per second
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(String);

impl RunId {
    /// Derive id from a timestamp
    #[inline]
    #[must_use]
    pub fn from_timestamp(at: DateTime<Utc>) -> Self {
        Self(at.format(RUN_ID_FORMAT).to_string())
    }

    /// Timestamp encoded in the id
    #[must_use]
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        NaiveDateTime::parse_from_str(&self.0, RUN_ID_FORMAT)
            .ok()
            .map(|naive| naive.and_utc())
    }

    /// Id as string slice
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for RunId {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = Self(s.to_string());
        match id.timestamp() {
            Some(_) => Ok(id),
            None => Err(StoreError::InvalidRunId(s.to_string())),
        }
    }
}

/// Source of "now" for run ids and ledger timestamps
pub trait Clock {
    /// Current instant
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock pinned to one instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Artifact namespaces inside a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ArtifactKind {
    /// Ad image
    Ad,
    /// Caption text
    Caption,
    /// Metadata JSON
    Metadata,
}

impl ArtifactKind {
    /// All kinds, in archive order
    pub const ALL: [ArtifactKind; 3] = [ArtifactKind::Ad, ArtifactKind::Caption, ArtifactKind::Metadata];

    /// Namespace directory (also the archive prefix)
    #[inline]
    #[must_use]
    pub fn dir_name(self) -> &'static str {
        match self {
            ArtifactKind::Ad => "ads",
            ArtifactKind::Caption => "captions",
            ArtifactKind::Metadata => "metadata",
        }
    }

    /// Singular file stem
    #[inline]
    #[must_use]
    pub fn stem(self) -> &'static str {
        match self {
            ArtifactKind::Ad => "ad",
            ArtifactKind::Caption => "caption",
            ArtifactKind::Metadata => "meta",
        }
    }

    /// File extension
    #[inline]
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            ArtifactKind::Ad => "png",
            ArtifactKind::Caption => "txt",
            ArtifactKind::Metadata => "json",
        }
    }

    /// Deterministic file name `{stem}_{index}.{ext}`
    #[inline]
    #[must_use]
    pub fn file_name(self, index: u32) -> String {
        format!("{}_{}.{}", self.stem(), index, self.extension())
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// 8-bit RGB colour, serialized as `#rrggbb`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Hex form `#rrggbb`
    #[must_use]
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl From<(u8, u8, u8)> for Rgb {
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        Self(r, g, b)
    }
}

/// Error parsing a hex colour
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid hex colour: {0}")]
pub struct ParseRgbError(String);

impl FromStr for Rgb {
    type Err = ParseRgbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix('#').unwrap_or(s);
        if digits.len() != 6 || !digits.is_ascii() {
            return Err(ParseRgbError(s.to_string()));
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16).map_err(|_| ParseRgbError(s.to_string()))
        };
        Ok(Self(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }
}

impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Rgb {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Older ledgers stored raw `[r, g, b]` triples
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Hex(String),
            Triple([u8; 3]),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Hex(s) => s.parse().map_err(serde::de::Error::custom),
            Repr::Triple([r, g, b]) => Ok(Self(r, g, b)),
        }
    }
}

/// Ordered pair of dominant brand colours
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<Rgb>", into = "[Rgb; 2]")]
pub struct BrandPalette {
    /// Most dominant colour
    pub primary: Rgb,
    /// Second colour
    pub secondary: Rgb,
}

impl BrandPalette {
    /// Create palette
    #[inline]
    #[must_use]
    pub fn new(primary: Rgb, secondary: Rgb) -> Self {
        Self { primary, secondary }
    }

    /// Hex forms in order
    #[must_use]
    pub fn hex(&self) -> [String; 2] {
        [self.primary.to_hex(), self.secondary.to_hex()]
    }
}

impl From<[Rgb; 2]> for BrandPalette {
    fn from([primary, secondary]: [Rgb; 2]) -> Self {
        Self { primary, secondary }
    }
}

/// Palettes extracted with more than two colours keep the first two
impl TryFrom<Vec<Rgb>> for BrandPalette {
    type Error = String;

    fn try_from(colors: Vec<Rgb>) -> Result<Self, Self::Error> {
        match colors.as_slice() {
            [primary, secondary, ..] => Ok(Self::new(*primary, *secondary)),
            _ => Err(format!(
                "brand palette needs two colours, found {}",
                colors.len()
            )),
        }
    }
}

impl From<BrandPalette> for [Rgb; 2] {
    fn from(palette: BrandPalette) -> Self {
        [palette.primary, palette.secondary]
    }
}

/// Campaign parameters shared by every creative in a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunBrief {
    /// Product being advertised
    pub product: String,
    /// Visual style
    pub style: String,
    /// Copy tone
    pub tone: String,
    /// Target audience
    pub audience: String,
}

impl Default for RunBrief {
    fn default() -> Self {
        Self {
            product: "Wireless Earbuds".to_string(),
            style: "Luxury".to_string(),
            tone: "Funny".to_string(),
            audience: "Gamers".to_string(),
        }
    }
}

/// Per-creative metadata document (`metadata/meta_{i}.json`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreativeMetadata {
    /// One-based creative index
    pub index: u32,
    /// Visual style
    pub style: String,
    /// Copy tone
    pub tone: String,
    /// Target audience
    pub audience: String,
    /// Slogan read from the logo
    pub slogan: String,
    /// Brand palette in hex
    pub dominant_colors: BrandPalette,
    /// Placeholder engagement score
    pub engagement_score: f64,
    /// Image file name
    pub file: String,
    /// Caption text
    pub caption: String,
}

/// One generated creative and its stored artifacts
#[derive(Debug, Clone, PartialEq)]
pub struct CreativeRecord {
    /// One-based index, unique within the run
    pub index: u32,
    /// Stored ad image
    pub image_path: PathBuf,
    /// Stored caption
    pub caption_path: PathBuf,
    /// Stored metadata document
    pub metadata_path: PathBuf,
    /// Metadata as written
    pub metadata: CreativeMetadata,
}

impl CreativeRecord {
    /// Engagement score
    #[inline]
    #[must_use]
    pub fn score(&self) -> f64 {
        self.metadata.engagement_score
    }

    /// Image file name
    #[inline]
    #[must_use]
    pub fn image_file_name(&self) -> &str {
        &self.metadata.file
    }

    /// Artifact path for a kind
    #[must_use]
    pub fn artifact(&self, kind: ArtifactKind) -> &Path {
        match kind {
            ArtifactKind::Ad => &self.image_path,
            ArtifactKind::Caption => &self.caption_path,
            ArtifactKind::Metadata => &self.metadata_path,
        }
    }
}

/// Scores of `records` in slice order, ready for ranking
#[must_use]
pub fn scores_of(records: &[CreativeRecord]) -> Vec<f64> {
    records.iter().map(CreativeRecord::score).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn run_id_from_timestamp() {
        let at = Utc.with_ymd_and_hms(2026, 10, 14, 9, 30, 5).unwrap();
        let id = RunId::from_timestamp(at);
        assert_eq!(id.as_str(), "20261014_093005");
        assert_eq!(id.timestamp(), Some(at));
    }

    #[test]
    fn run_id_parse_rejects_garbage() {
        assert!("20261014_093005".parse::<RunId>().is_ok());
        assert!(matches!(
            "latest".parse::<RunId>(),
            Err(StoreError::InvalidRunId(_))
        ));
    }

    #[test]
    fn artifact_file_names() {
        assert_eq!(ArtifactKind::Ad.file_name(1), "ad_1.png");
        assert_eq!(ArtifactKind::Caption.file_name(12), "caption_12.txt");
        assert_eq!(ArtifactKind::Metadata.file_name(3), "meta_3.json");
    }

    #[test]
    fn rgb_hex_roundtrip() {
        let purple = Rgb(128, 0, 128);
        assert_eq!(purple.to_hex(), "#800080");
        assert_eq!("#800080".parse::<Rgb>(), Ok(purple));
        assert!("#80008".parse::<Rgb>().is_err());
        assert!("#zz0080".parse::<Rgb>().is_err());
    }

    #[test]
    fn palette_accepts_legacy_triples() {
        let legacy: BrandPalette = serde_json::from_str("[[128, 0, 128], [255, 255, 255]]").unwrap();
        let modern: BrandPalette = serde_json::from_str(r##"["#800080", "#ffffff"]"##).unwrap();
        assert_eq!(legacy, modern);
        assert_eq!(
            serde_json::to_string(&modern).unwrap(),
            r##"["#800080","#ffffff"]"##
        );
    }

    #[test]
    fn palette_keeps_first_two_of_longer_lists() {
        let palette: BrandPalette =
            serde_json::from_str("[[1, 2, 3], [4, 5, 6], [7, 8, 9]]").unwrap();
        assert_eq!(palette, BrandPalette::new(Rgb(1, 2, 3), Rgb(4, 5, 6)));
        assert!(serde_json::from_str::<BrandPalette>(r##"["#800080"]"##).is_err());
    }
}
