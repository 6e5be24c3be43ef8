use crate::error::CacheError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Default chunk size for feature caches, in bases.
pub const DEFAULT_FEATURE_CHUNK_SIZE: u64 = 50_000;

/// Default chunk size for alignment caches, in bases.
pub const DEFAULT_ALIGNMENT_CHUNK_SIZE: u64 = 10_000;

/// Highest coordinate the adapter will ever request.
pub const DEFAULT_MAX_COORDINATE: i64 = 300_000_000;

/// Maximum number of region queries sent in one remote call.
pub const DEFAULT_BATCH_SIZE: usize = 50;

/// Free-form query parameters forwarded to the remote source.
pub type QueryParams = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Width of one chunk in bases
    pub chunk_size: u64,

    /// Maximum number of chunks kept per data type, `None` for unbounded
    pub max_chunks: Option<usize>,
}

impl CacheConfig {
    /// Configuration tuned for paired-read alignment chunks.
    pub fn alignments() -> Self {
        Self {
            chunk_size: DEFAULT_ALIGNMENT_CHUNK_SIZE,
            ..Default::default()
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_FEATURE_CHUNK_SIZE,
            max_chunks: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrefetchConfig {
    /// Number of chunks to prefetch on each side of a request
    pub neighbor_chunks: usize,
}

impl Default for PrefetchConfig {
    fn default() -> Self {
        Self { neighbor_chunks: 2 }
    }
}

/// Connection and request-shaping parameters for an [`Adapter`](crate::Adapter).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdapterConfig {
    pub host: String,
    pub version: String,
    pub species: String,
    pub category: String,
    pub subcategory: String,
    pub resource: String,

    /// Maximum regions per remote call
    pub batch_size: usize,

    /// Requests are clamped to `1..=max_coordinate`
    pub max_coordinate: i64,

    /// Extra parameters sent with every query
    #[serde(default)]
    pub params: QueryParams,

    #[serde(default)]
    pub prefetch: Option<PrefetchConfig>,
}

impl AdapterConfig {
    pub fn validate(&self) -> Result<(), CacheError> {
        if self.batch_size == 0 {
            return Err(CacheError::InvalidConfig(
                "batch_size must be at least 1".to_string(),
            ));
        }
        if self.max_coordinate < 1 {
            return Err(CacheError::InvalidConfig(format!(
                "max_coordinate must be positive, got {}",
                self.max_coordinate
            )));
        }
        if self.species.is_empty() {
            return Err(CacheError::InvalidConfig("species is empty".to_string()));
        }
        Ok(())
    }
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            host: "www.ebi.ac.uk/cellbase".to_string(),
            version: "v4".to_string(),
            species: "hsapiens".to_string(),
            category: "genomic".to_string(),
            subcategory: "region".to_string(),
            resource: "gene".to_string(),
            batch_size: DEFAULT_BATCH_SIZE,
            max_coordinate: DEFAULT_MAX_COORDINATE,
            params: QueryParams::new(),
            prefetch: None,
        }
    }
}
