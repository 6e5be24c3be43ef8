//! # 🧬 genome-region-cache
//!
//! **Region-indexed chunk caching for genome browser tracks**
//!
//! A browser track asks for `chr1:150-250`, then `chr1:180-320`, then pans a
//! little further. Each of those requests overlaps the last one, and the
//! remote genomics service answers per region. This crate splits every
//! request over a fixed chunk grid, answers the resident chunks immediately,
//! and fetches only the coalesced gaps, a bounded number of regions per call.
//!
//! ## 🧩 Building blocks
//!
//! | Type | Role |
//! |------|------|
//! | [`Region`] | `chrom:start-end` interval with parsing and formatting |
//! | [`keyspace`] | chunk index, key and bounds arithmetic |
//! | [`RecencyStore`] | LRU-ordered key/value store with hit/miss stats |
//! | [`ChunkCache`] | region to chunk mapping, cached/missing split |
//! | [`FeatureCache`] | feature lists per chunk, partitioned by [`DataType`] |
//! | [`AlignmentCache`] | reads and per-base coverage per chunk |
//! | [`Adapter`] | clamps, splits, batches and fetches, then notifies |
//!
//! ## 🚀 Quick Start
//!
//! ### Splitting a region against the cache
//! ```rust
//! use genome_region_cache::{ChunkCache, Region};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut cache: ChunkCache<Vec<u32>> = ChunkCache::new(100)?;
//! cache.put_chunk("1", 2, vec![7])?;
//!
//! let split = cache.cached_split(&Region::new("1", 150, 250));
//! assert_eq!(split.cached, vec![Region::new("1", 200, 299)]);
//! assert_eq!(split.not_cached, vec![Region::new("1", 100, 199)]);
//! # Ok(())
//! # }
//! ```
//!
//! ### Fetching through an adapter
//! ```rust
//! use genome_region_cache::{
//!     Adapter, AdapterConfig, CacheConfig, CacheError, DataType, Feature, FeatureCache,
//!     FeatureSource, QueryParams, Region, RegionResult, RemoteQuery,
//! };
//!
//! struct Genes;
//!
//! #[async_trait::async_trait]
//! impl FeatureSource for Genes {
//!     type Payload = Vec<Feature>;
//!
//!     async fn fetch(
//!         &self,
//!         query: &RemoteQuery,
//!     ) -> Result<Vec<RegionResult<Vec<Feature>>>, CacheError> {
//!         Ok(query
//!             .regions
//!             .iter()
//!             .map(|r| RegionResult::new(r, vec![Feature::new(&r.chromosome, r.start, r.start + 10)]))
//!             .collect())
//!     }
//! }
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
//! let cache = FeatureCache::new(CacheConfig { chunk_size: 100, max_chunks: None })?;
//! let adapter = Adapter::new(AdapterConfig::default(), Genes, cache, tx)?;
//!
//! let region = Region::new("1", 150, 250);
//! let outcome = adapter.fetch(&region, &DataType::Features, &QueryParams::new()).await;
//! assert!(outcome.is_complete());
//! assert_eq!(outcome.chunks.len(), 2);
//!
//! // Second request is served from the cache.
//! let pending = adapter.get_data(&region, &DataType::Features, &QueryParams::new()).await;
//! assert_eq!(pending.batch_count(), 0);
//! assert!(rx.recv().await.is_some());
//! # Ok(())
//! # }
//! ```
//!
//! ## ✨ Core Features
//!
//! - 🧱 **Chunk grid**: floor-division chunking, independent per data type
//! - 🔗 **Coalescing**: consecutive missing chunks become one remote region
//! - 📦 **Batching**: at most `batch_size` regions per remote call
//! - 📊 **Histograms**: bin interval doubles as chunk width
//! - 🗜️ **Compressed chunks**: optional deflate-compressed JSON storage
//! - 🔭 **Prefetching**: neighbor or look-ahead chunk warming
//! - 📈 **Metrics**: request and batch counters, optionally exported via `metrics`

pub mod adapter;
pub mod cache;
pub mod codec;
pub mod config;
pub mod error;
pub mod keyspace;
pub mod metrics;
pub mod prefetch;
pub mod region;

// Re-export commonly used types
pub use adapter::{
    Adapter, AdapterEvent, AlignmentAdapter, ChunkAccumulator, DataReady, FeatureAdapter,
    FeatureSource, FetchOutcome, PendingFetch, RegionResult, RemoteQuery,
};
pub use cache::alignment::{
    AlignedRead, AlignmentCache, AlignmentChunk, AlignmentChunkEntry, AlignmentResult, Coverage,
};
pub use cache::chunk::ChunkCache;
pub use cache::feature::{Feature, FeatureCache, FeatureChunk};
pub use cache::partitioned::PartitionedCache;
pub use cache::recency::RecencyStore;
pub use cache::{CacheStats, Chunk, ChunkSplit, DataType, RegionCache};
pub use codec::{ChunkCodec, DeflateJsonCodec, Passthrough};
pub use config::{AdapterConfig, CacheConfig, PrefetchConfig, QueryParams};
pub use error::CacheError;
pub use keyspace::ChunkKey;
pub use metrics::{CacheMetrics, MetricsSnapshot};
pub use prefetch::{NeighborChunkPrefetch, NoPrefetch, PrefetchStrategy, SequentialPrefetch};
pub use region::{Region, RegionInput};
