use crate::error::CacheError;
use crate::region::Region;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::num::NonZeroU64;

/// Region-keyed chunk cache driven by an [`Adapter`](crate::Adapter).
///
/// Implementations partition their chunks by [`DataType`]; every data type
/// has its own chunk grid.
pub trait RegionCache: Send + Sync + 'static {
    /// What the remote source returns for one queried region
    type Payload: Send + 'static;

    /// What is stored per chunk
    type Value: Clone + Send + Sync + 'static;

    /// Chunk width for a data type
    fn chunk_size(&self, data_type: &DataType) -> u64;

    /// Split a region into cached chunks and coalesced runs of missing chunks
    fn cached_split(&mut self, region: &Region, data_type: &DataType) -> ChunkSplit;

    /// Resolve one chunk per region, skipping regions that are not resident
    fn chunks_by_regions(
        &mut self,
        regions: &[Region],
        data_type: &DataType,
    ) -> Vec<Chunk<Self::Value>>;

    /// Resident chunks overlapping a region
    fn chunks_by_region(&mut self, region: &Region, data_type: &DataType)
        -> Vec<Chunk<Self::Value>>;

    /// Store a remote result for a queried region, returning the chunks written
    fn put_by_region(
        &mut self,
        region: &Region,
        payload: Self::Payload,
        data_type: &DataType,
    ) -> Result<Vec<Chunk<Self::Value>>, CacheError>;

    /// Drop every chunk of every data type
    fn clear(&mut self);

    fn stats(&self) -> CacheStats;
}

/// One cached chunk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk<T> {
    pub key: String,
    pub chromosome: String,
    pub index: i64,
    /// First base covered by the chunk
    pub start: i64,
    /// Last base covered by the chunk
    pub end: i64,
    pub value: T,
}

/// Result of splitting a region against the cache.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChunkSplit {
    /// One chunk-aligned region per resident chunk
    pub cached: Vec<Region>,
    /// One chunk-aligned region per maximal run of missing chunks
    pub not_cached: Vec<Region>,
}

impl ChunkSplit {
    pub fn is_fully_cached(&self) -> bool {
        self.not_cached.is_empty()
    }
}

/// Cache partition: raw features, histogram bins, or anything named.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    #[default]
    Features,
    Histogram { interval: NonZeroU64 },
    Named(String),
}

impl DataType {
    /// Histogram bins of `interval` bases; zero is not a valid bin width.
    pub fn histogram(interval: u64) -> Result<Self, CacheError> {
        NonZeroU64::new(interval)
            .map(|interval| DataType::Histogram { interval })
            .ok_or(CacheError::InvalidChunkSize(interval))
    }

    pub fn is_histogram(&self) -> bool {
        matches!(self, DataType::Histogram { .. })
    }

    /// Histograms use their bin interval as chunk width.
    pub fn chunk_size(&self, default_chunk_size: NonZeroU64) -> NonZeroU64 {
        match self {
            DataType::Histogram { interval } => *interval,
            _ => default_chunk_size,
        }
    }

    /// Parameters the remote source needs to answer for this data type.
    pub fn query_params(&self) -> Vec<(String, String)> {
        match self {
            DataType::Histogram { interval } => vec![
                ("histogram".to_string(), "true".to_string()),
                ("interval".to_string(), interval.to_string()),
            ],
            _ => Vec::new(),
        }
    }
}

impl Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Features => write!(f, "features"),
            DataType::Histogram { interval } => write!(f, "histogram_{}", interval),
            DataType::Named(name) => write!(f, "{}", name),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub entry_count: usize,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub(crate) fn merge(self, other: CacheStats) -> CacheStats {
        CacheStats {
            hits: self.hits + other.hits,
            misses: self.misses + other.misses,
            evictions: self.evictions + other.evictions,
            entry_count: self.entry_count + other.entry_count,
        }
    }
}

pub mod alignment;
pub mod chunk;
pub mod feature;
pub mod partitioned;
pub mod recency;
