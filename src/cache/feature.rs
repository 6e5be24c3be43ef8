use crate::cache::partitioned::PartitionedCache;
use crate::cache::{CacheStats, Chunk, ChunkSplit, DataType, RegionCache};
use crate::codec::{ChunkCodec, Passthrough};
use crate::config::CacheConfig;
use crate::error::CacheError;
use crate::keyspace;
use crate::region::Region;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A genomic feature as returned by the remote source.
///
/// Only the coordinates are interpreted; everything else is carried in
/// `attributes` untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feature {
    pub chromosome: String,
    pub start: i64,
    pub end: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_type: Option<String>,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl Feature {
    pub fn new(chromosome: impl Into<String>, start: i64, end: i64) -> Self {
        Self {
            chromosome: chromosome.into(),
            start,
            end,
            feature_type: None,
            attributes: Map::new(),
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }
}

pub type FeatureChunk = Chunk<Vec<Feature>>;

/// Per-chunk feature lists, partitioned by data type.
pub struct FeatureCache<C = Passthrough>
where
    C: ChunkCodec<Vec<Feature>> + Clone,
{
    partitions: PartitionedCache<Vec<Feature>, C>,
    feature_type: Option<String>,
}

impl FeatureCache<Passthrough> {
    pub fn new(config: CacheConfig) -> Result<Self, CacheError> {
        Self::with_codec(config, Passthrough)
    }
}

impl<C> FeatureCache<C>
where
    C: ChunkCodec<Vec<Feature>> + Clone,
{
    pub fn with_codec(config: CacheConfig, codec: C) -> Result<Self, CacheError> {
        Ok(Self {
            partitions: PartitionedCache::new(config, codec)?,
            feature_type: None,
        })
    }

    /// Tag stored features with this type instead of the data type name.
    pub fn with_feature_type(mut self, feature_type: impl Into<String>) -> Self {
        self.feature_type = Some(feature_type.into());
        self
    }

    /// Store the features answering `region`.
    ///
    /// Every chunk spanned by `region` is written, even when no feature falls
    /// in it, so an empty answer counts as cached. Each feature is filed into
    /// every chunk it overlaps inside the region. Writing the same region
    /// again replaces its chunks.
    pub fn put_features_by_region(
        &mut self,
        features: Vec<Feature>,
        region: &Region,
        data_type: &DataType,
    ) -> Result<Vec<FeatureChunk>, CacheError> {
        let tag = self
            .feature_type
            .clone()
            .unwrap_or_else(|| data_type.to_string());
        let partition = self.partitions.partition_mut(data_type);
        let chunk_size = partition.chunk_size();
        let span = keyspace::chunk_span(region, chunk_size);
        let (first, last) = (*span.start(), *span.end());
        if last < first {
            return Ok(Vec::new());
        }

        let mut buckets: Vec<Vec<Feature>> = vec![Vec::new(); (last - first + 1) as usize];
        for mut feature in features {
            feature.feature_type = Some(tag.clone());
            let from = keyspace::chunk_index_of(feature.start, chunk_size).max(first);
            let to = keyspace::chunk_index_of(feature.end.max(feature.start), chunk_size).min(last);
            for index in from..=to {
                buckets[(index - first) as usize].push(feature.clone());
            }
        }

        let mut stored = Vec::with_capacity(buckets.len());
        for (offset, bucket) in buckets.into_iter().enumerate() {
            let index = first + offset as i64;
            stored.push(partition.put_chunk(&region.chromosome, index, bucket)?);
        }
        tracing::debug!(
            "Stored {} {} chunks for {}",
            stored.len(),
            data_type,
            region
        );
        Ok(stored)
    }

    /// Resident chunks overlapping `region`. Never fetches.
    pub fn get_chunks_by_region(&mut self, region: &Region, data_type: &DataType) -> Vec<FeatureChunk> {
        self.partitions.chunks_by_region(region, data_type)
    }

    pub fn partitions(&self) -> &PartitionedCache<Vec<Feature>, C> {
        &self.partitions
    }

    pub fn partitions_mut(&mut self) -> &mut PartitionedCache<Vec<Feature>, C> {
        &mut self.partitions
    }
}

impl<C> RegionCache for FeatureCache<C>
where
    C: ChunkCodec<Vec<Feature>> + Clone,
{
    type Payload = Vec<Feature>;
    type Value = Vec<Feature>;

    fn chunk_size(&self, data_type: &DataType) -> u64 {
        self.partitions.chunk_size(data_type)
    }

    fn cached_split(&mut self, region: &Region, data_type: &DataType) -> ChunkSplit {
        self.partitions.cached_split(region, data_type)
    }

    fn chunks_by_regions(&mut self, regions: &[Region], data_type: &DataType) -> Vec<FeatureChunk> {
        self.partitions.chunks_by_regions(regions, data_type)
    }

    fn chunks_by_region(&mut self, region: &Region, data_type: &DataType) -> Vec<FeatureChunk> {
        self.get_chunks_by_region(region, data_type)
    }

    fn put_by_region(
        &mut self,
        region: &Region,
        payload: Vec<Feature>,
        data_type: &DataType,
    ) -> Result<Vec<FeatureChunk>, CacheError> {
        self.put_features_by_region(payload, region, data_type)
    }

    fn clear(&mut self) {
        self.partitions.clear();
    }

    fn stats(&self) -> CacheStats {
        self.partitions.stats()
    }
}
