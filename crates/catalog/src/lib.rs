use std::collections::BTreeMap;

use foundation::math::Vec2;
use serde::{Deserialize, Serialize};

pub mod source;

pub use source::*;

/// One panorama as published by the metadata feed.
///
/// Positions are in world units (in-game inches). `rotation_offset` is the
/// panorama's north alignment relative to world north, in degrees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PanoramaRecord {
    pub id: String,
    pub x: f64,
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, rename = "rotation")]
    pub rotation_offset: f64,
}

impl PanoramaRecord {
    pub fn new(id: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            id: id.into(),
            x,
            y,
            display_name: None,
            rotation_offset: 0.0,
        }
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    pub fn with_rotation_offset(mut self, degrees: f64) -> Self {
        self.rotation_offset = degrees;
        self
    }

    /// Display name, falling back to the id.
    pub fn display_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.id)
    }

    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Transport failure (DNS, connect, read, file IO).
    Network(String),
    /// Upstream answered with a non-2xx status.
    Status(u16),
    /// Payload was not a valid panorama feed.
    Parse(String),
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchError::Network(msg) => write!(f, "metadata fetch failed: {msg}"),
            FetchError::Status(code) => write!(f, "metadata fetch returned HTTP {code}"),
            FetchError::Parse(msg) => write!(f, "metadata feed is invalid: {msg}"),
        }
    }
}

impl std::error::Error for FetchError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    NotFound(String),
    Fetch(FetchError),
}

impl std::fmt::Display for CatalogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogError::NotFound(id) => write!(f, "panorama not found: {id}"),
            CatalogError::Fetch(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for CatalogError {}

impl From<FetchError> for CatalogError {
    fn from(err: FetchError) -> Self {
        CatalogError::Fetch(err)
    }
}

/// Immutable view of one fetch of the metadata feed.
///
/// Records keep feed order, which is the order every consumer iterates in.
/// A re-fetch produces a new snapshot; nothing is ever edited in place.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogSnapshot {
    version: String,
    records: Vec<PanoramaRecord>,
    index: BTreeMap<String, usize>,
}

impl CatalogSnapshot {
    /// Parse a raw feed document. The snapshot version is the content hash.
    pub fn from_feed_bytes(bytes: &[u8]) -> Result<Self, FetchError> {
        let records: Vec<PanoramaRecord> =
            serde_json::from_slice(bytes).map_err(|e| FetchError::Parse(e.to_string()))?;
        Self::build(version_for_feed_bytes(bytes), records)
    }

    pub fn from_feed_str(text: &str) -> Result<Self, FetchError> {
        Self::from_feed_bytes(text.as_bytes())
    }

    /// Build from already-decoded records, hashing their canonical JSON form.
    pub fn from_records(records: Vec<PanoramaRecord>) -> Result<Self, FetchError> {
        let bytes = serde_json::to_vec(&records).map_err(|e| FetchError::Parse(e.to_string()))?;
        Self::build(version_for_feed_bytes(&bytes), records)
    }

    fn build(version: String, records: Vec<PanoramaRecord>) -> Result<Self, FetchError> {
        let mut index = BTreeMap::new();
        for (i, r) in records.iter().enumerate() {
            if r.id.trim().is_empty() {
                return Err(FetchError::Parse(format!("record {i} has an empty id")));
            }
            if !r.position().is_finite() || !r.rotation_offset.is_finite() {
                return Err(FetchError::Parse(format!(
                    "record {} has non-finite coordinates",
                    r.id
                )));
            }
            if index.insert(r.id.clone(), i).is_some() {
                return Err(FetchError::Parse(format!("duplicate panorama id: {}", r.id)));
            }
        }
        Ok(Self {
            version,
            records,
            index,
        })
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn records(&self) -> &[PanoramaRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn find_by_id(&self, id: &str) -> Result<&PanoramaRecord, CatalogError> {
        self.index
            .get(id)
            .map(|&i| &self.records[i])
            .ok_or_else(|| CatalogError::NotFound(id.to_string()))
    }
}

pub fn version_for_feed_bytes(bytes: &[u8]) -> String {
    blake3::hash(bytes).to_hex().to_string()
}
