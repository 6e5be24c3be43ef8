use crate::cache::partitioned::PartitionedCache;
use crate::cache::{CacheStats, Chunk, ChunkSplit, DataType, RegionCache};
use crate::codec::{ChunkCodec, Passthrough};
use crate::config::CacheConfig;
use crate::error::CacheError;
use crate::keyspace;
use crate::region::Region;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Per-base read depth, one array per nucleotide plus the combined total.
///
/// All five arrays are aligned with genomic offsets: index `i` is the depth
/// at `coverage_start + i` of whatever holds the coverage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coverage {
    pub all: Vec<u32>,
    pub a: Vec<u32>,
    pub c: Vec<u32>,
    pub g: Vec<u32>,
    pub t: Vec<u32>,
}

impl Coverage {
    pub fn len(&self) -> usize {
        self.all.len()
    }

    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }

    /// Up to `len` positions starting at `offset`; short or empty past the end.
    pub fn slice(&self, offset: usize, len: usize) -> Coverage {
        fn window(depth: &[u32], offset: usize, len: usize) -> Vec<u32> {
            let start = offset.min(depth.len());
            let end = offset.saturating_add(len).min(depth.len());
            depth[start..end].to_vec()
        }

        Coverage {
            all: window(&self.all, offset, len),
            a: window(&self.a, offset, len),
            c: window(&self.c, offset, len),
            g: window(&self.g, offset, len),
            t: window(&self.t, offset, len),
        }
    }
}

/// One aligned read. Coordinates are interpreted, the rest is opaque.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignedRead {
    pub name: String,
    pub chromosome: String,
    pub start: i64,
    pub end: i64,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl AlignedRead {
    pub fn new(name: impl Into<String>, chromosome: impl Into<String>, start: i64, end: i64) -> Self {
        Self {
            name: name.into(),
            chromosome: chromosome.into(),
            start,
            end,
            attributes: Map::new(),
        }
    }
}

/// Remote answer for one queried region: reads plus whole-region coverage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlignmentResult {
    pub reads: Vec<AlignedRead>,
    pub coverage: Coverage,
}

/// What one alignment chunk stores.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlignmentChunk {
    pub reads: Vec<AlignedRead>,
    pub coverage: Coverage,
    /// Genomic position of `coverage[0]`
    pub coverage_start: i64,
}

pub type AlignmentChunkEntry = Chunk<AlignmentChunk>;

/// Read and coverage chunks, partitioned by data type.
pub struct AlignmentCache<C = Passthrough>
where
    C: ChunkCodec<AlignmentChunk> + Clone,
{
    partitions: PartitionedCache<AlignmentChunk, C>,
}

impl AlignmentCache<Passthrough> {
    pub fn new(config: CacheConfig) -> Result<Self, CacheError> {
        Self::with_codec(config, Passthrough)
    }
}

impl<C> AlignmentCache<C>
where
    C: ChunkCodec<AlignmentChunk> + Clone,
{
    pub fn with_codec(config: CacheConfig, codec: C) -> Result<Self, CacheError> {
        Ok(Self {
            partitions: PartitionedCache::new(config, codec)?,
        })
    }

    /// Spread a whole-region result over the chunks spanned by `region`.
    ///
    /// The n-th chunk of the region takes coverage positions
    /// `n * chunk_size .. (n + 1) * chunk_size` of the supplied arrays, so the
    /// offsets are relative to the result, not to the genome. Reads are filed
    /// into every chunk of the region they overlap.
    pub fn put_alignments_by_region(
        &mut self,
        result: AlignmentResult,
        region: &Region,
        data_type: &DataType,
    ) -> Result<Vec<AlignmentChunkEntry>, CacheError> {
        let partition = self.partitions.partition_mut(data_type);
        let chunk_size = partition.chunk_size();
        let span = keyspace::chunk_span(region, chunk_size);
        let (first, last) = (*span.start(), *span.end());
        if last < first {
            return Ok(Vec::new());
        }

        let width = chunk_size as usize;
        let mut chunks: Vec<AlignmentChunk> = (0..=(last - first) as usize)
            .map(|ordinal| {
                let offset = ordinal * width;
                AlignmentChunk {
                    reads: Vec::new(),
                    coverage: result.coverage.slice(offset, width),
                    coverage_start: region.start + offset as i64,
                }
            })
            .collect();

        for read in result.reads {
            let from = keyspace::chunk_index_of(read.start, chunk_size).max(first);
            let to = keyspace::chunk_index_of(read.end.max(read.start), chunk_size).min(last);
            for index in from..=to {
                chunks[(index - first) as usize].reads.push(read.clone());
            }
        }

        let mut stored = Vec::with_capacity(chunks.len());
        for (ordinal, chunk) in chunks.into_iter().enumerate() {
            let index = first + ordinal as i64;
            stored.push(partition.put_chunk(&region.chromosome, index, chunk)?);
        }
        tracing::debug!("Stored {} alignment chunks for {}", stored.len(), region);
        Ok(stored)
    }

    pub fn get_chunks_by_region(
        &mut self,
        region: &Region,
        data_type: &DataType,
    ) -> Vec<AlignmentChunkEntry> {
        self.partitions.chunks_by_region(region, data_type)
    }

    pub fn partitions(&self) -> &PartitionedCache<AlignmentChunk, C> {
        &self.partitions
    }
}

impl<C> RegionCache for AlignmentCache<C>
where
    C: ChunkCodec<AlignmentChunk> + Clone,
{
    type Payload = AlignmentResult;
    type Value = AlignmentChunk;

    fn chunk_size(&self, data_type: &DataType) -> u64 {
        self.partitions.chunk_size(data_type)
    }

    fn cached_split(&mut self, region: &Region, data_type: &DataType) -> ChunkSplit {
        self.partitions.cached_split(region, data_type)
    }

    fn chunks_by_regions(
        &mut self,
        regions: &[Region],
        data_type: &DataType,
    ) -> Vec<AlignmentChunkEntry> {
        self.partitions.chunks_by_regions(regions, data_type)
    }

    fn chunks_by_region(&mut self, region: &Region, data_type: &DataType) -> Vec<AlignmentChunkEntry> {
        self.get_chunks_by_region(region, data_type)
    }

    fn put_by_region(
        &mut self,
        region: &Region,
        payload: AlignmentResult,
        data_type: &DataType,
    ) -> Result<Vec<AlignmentChunkEntry>, CacheError> {
        self.put_alignments_by_region(payload, region, data_type)
    }

    fn clear(&mut self) {
        self.partitions.clear();
    }

    fn stats(&self) -> CacheStats {
        self.partitions.stats()
    }
}
