use crate::cache::chunk::ChunkCache;
use crate::cache::{CacheStats, Chunk, ChunkSplit, DataType};
use crate::codec::ChunkCodec;
use crate::config::CacheConfig;
use crate::error::CacheError;
use crate::region::Region;
use std::collections::HashMap;
use std::num::{NonZeroU64, NonZeroUsize};

/// One [`ChunkCache`] per data type, created on first use.
///
/// Shared by the feature and alignment caches, which only differ in how a
/// remote result is spread over chunks.
pub struct PartitionedCache<T, C>
where
    C: ChunkCodec<T> + Clone,
{
    config: CacheConfig,
    default_chunk_size: NonZeroU64,
    codec: C,
    partitions: HashMap<DataType, ChunkCache<T, C>>,
}

impl<T, C> PartitionedCache<T, C>
where
    C: ChunkCodec<T> + Clone,
{
    pub fn new(config: CacheConfig, codec: C) -> Result<Self, CacheError> {
        let default_chunk_size = NonZeroU64::new(config.chunk_size)
            .ok_or(CacheError::InvalidChunkSize(config.chunk_size))?;
        Ok(Self {
            config,
            default_chunk_size,
            codec,
            partitions: HashMap::new(),
        })
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn chunk_size(&self, data_type: &DataType) -> u64 {
        data_type.chunk_size(self.default_chunk_size).get()
    }

    pub fn partition(&self, data_type: &DataType) -> Option<&ChunkCache<T, C>> {
        self.partitions.get(data_type)
    }

    pub fn partition_mut(&mut self, data_type: &DataType) -> &mut ChunkCache<T, C> {
        let Self {
            config,
            default_chunk_size,
            codec,
            partitions,
        } = self;

        partitions.entry(data_type.clone()).or_insert_with(|| {
            let chunk_size = data_type.chunk_size(*default_chunk_size);
            tracing::debug!(
                "Creating chunk cache for {} with chunk size {}",
                data_type,
                chunk_size
            );
            ChunkCache::build(
                chunk_size,
                config.max_chunks.and_then(NonZeroUsize::new),
                codec.clone(),
            )
        })
    }

    pub fn cached_split(&mut self, region: &Region, data_type: &DataType) -> ChunkSplit {
        self.partition_mut(data_type).cached_split(region)
    }

    pub fn chunks_by_regions(&mut self, regions: &[Region], data_type: &DataType) -> Vec<Chunk<T>> {
        self.partition_mut(data_type).get_by_regions(regions)
    }

    pub fn chunks_by_region(&mut self, region: &Region, data_type: &DataType) -> Vec<Chunk<T>> {
        self.partition_mut(data_type).chunks_by_region(region)
    }

    pub fn data_types(&self) -> Vec<&DataType> {
        self.partitions.keys().collect()
    }

    /// Drop the chunks of one data type.
    pub fn clear_data_type(&mut self, data_type: &DataType) {
        if let Some(partition) = self.partitions.get_mut(data_type) {
            partition.clear();
        }
    }

    /// Drop every partition.
    pub fn clear(&mut self) {
        self.partitions.clear();
    }

    pub fn stats(&self) -> CacheStats {
        self.partitions
            .values()
            .map(|partition| partition.stats())
            .fold(CacheStats::default(), CacheStats::merge)
    }
}
