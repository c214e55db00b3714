//! Route Map
//!
//! Ordered list of token mints reachable from the stablecoin. Generated
//! offline and loaded once at start-up.

use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use crate::error::{ArbitrageError, ArbitrageResult};

const EMBEDDED_ROUTE_MAP: &str = include_str!("../data/usdc_swaps.json");

#[derive(Deserialize)]
#[serde(untagged)]
enum RouteMapFile {
    Indexed {
        #[serde(rename = "mintKeys")]
        mint_keys: Vec<String>,
    },
    Plain(Vec<String>),
}

/// Immutable, process-wide mint list
#[derive(Debug, Clone)]
pub struct RouteMap {
    mints: Arc<[String]>,
}

impl RouteMap {
    pub fn new(mints: Vec<String>) -> Self {
        Self {
            mints: mints.into(),
        }
    }

    /// Parse either `["mint", ...]` or `{"mintKeys": ["mint", ...]}`
    pub fn from_json(raw: &str) -> ArbitrageResult<Self> {
        let mints = match serde_json::from_str::<RouteMapFile>(raw)? {
            RouteMapFile::Indexed { mint_keys } => mint_keys,
            RouteMapFile::Plain(mints) => mints,
        };
        let mints: Vec<String> = mints
            .into_iter()
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .collect();
        if mints.is_empty() {
            return Err(ArbitrageError::Config("route map contains no mints".to_string()));
        }
        Ok(Self::new(mints))
    }

    pub fn embedded() -> ArbitrageResult<Self> {
        Self::from_json(EMBEDDED_ROUTE_MAP)
    }

    pub fn from_file(path: impl AsRef<Path>) -> ArbitrageResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            ArbitrageError::Config(format!("cannot read route map {}: {}", path.display(), e))
        })?;
        Self::from_json(&raw)
    }

    /// Load from `path` when given, else the embedded list
    pub fn load(path: Option<&str>) -> ArbitrageResult<Self> {
        let map = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::embedded()?,
        };
        info!(
            "🗺️ Route map loaded: {} mints ({})",
            map.len(),
            path.unwrap_or("embedded")
        );
        Ok(map)
    }

    /// The first `limit` mints, in order
    pub fn window(&self, limit: usize) -> &[String] {
        &self.mints[..limit.min(self.mints.len())]
    }

    pub fn len(&self) -> usize {
        self.mints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mints.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_map_is_valid() {
        let map = RouteMap::embedded().unwrap();
        assert!(!map.is_empty());
        assert_eq!(map.window(1), &["So11111111111111111111111111111111111111112".to_string()]);
    }

    #[test]
    fn test_plain_and_indexed_forms() {
        let plain = RouteMap::from_json(r#"["A", " B ", ""]"#).unwrap();
        assert_eq!(plain.window(10), &["A".to_string(), "B".to_string()]);

        let indexed = RouteMap::from_json(r#"{"mintKeys": ["X", "Y", "Z"]}"#).unwrap();
        assert_eq!(indexed.len(), 3);
        assert_eq!(indexed.window(3).last().map(String::as_str), Some("Z"));
    }

    #[test]
    fn test_empty_map_rejected() {
        assert!(RouteMap::from_json("[]").unwrap_err().is_fatal());
        assert!(RouteMap::from_json("{\"nope\": 1}").is_err());
    }

    #[test]
    fn test_window_caps_at_limit() {
        let map = RouteMap::new((0..200).map(|i| format!("mint{}", i)).collect());
        assert_eq!(map.window(150).len(), 150);
        assert_eq!(map.window(150).last().map(String::as_str), Some("mint149"));
        assert_eq!(map.window(500).len(), 200);
    }
}
