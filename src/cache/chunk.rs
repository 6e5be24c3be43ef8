use crate::cache::recency::RecencyStore;
use crate::cache::{CacheStats, Chunk, ChunkSplit};
use crate::codec::{ChunkCodec, Passthrough};
use crate::error::CacheError;
use crate::keyspace::{self, ChunkKey};
use crate::region::Region;
use std::marker::PhantomData;
use std::num::{NonZeroU64, NonZeroUsize};

/// Region-to-chunk cache over a fixed chunk grid.
///
/// Values go through the codec `C` on their way in and out of the
/// underlying [`RecencyStore`].
pub struct ChunkCache<T, C = Passthrough>
where
    C: ChunkCodec<T>,
{
    chunk_size: u64,
    store: RecencyStore<C::Encoded>,
    codec: C,
    _value: PhantomData<fn() -> T>,
}

impl<T> ChunkCache<T, Passthrough>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new(chunk_size: u64) -> Result<Self, CacheError> {
        Self::with_codec(chunk_size, None, Passthrough)
    }
}

impl<T, C> ChunkCache<T, C>
where
    C: ChunkCodec<T>,
{
    pub fn with_codec(
        chunk_size: u64,
        max_chunks: Option<NonZeroUsize>,
        codec: C,
    ) -> Result<Self, CacheError> {
        let size = NonZeroU64::new(chunk_size).ok_or(CacheError::InvalidChunkSize(chunk_size))?;
        Ok(Self::build(size, max_chunks, codec))
    }

    pub(crate) fn build(chunk_size: NonZeroU64, max_chunks: Option<NonZeroUsize>, codec: C) -> Self {
        Self {
            chunk_size: chunk_size.get(),
            store: RecencyStore::with_capacity(max_chunks),
            codec,
            _value: PhantomData,
        }
    }

    pub fn chunk_size(&self) -> u64 {
        self.chunk_size
    }

    pub fn chunk_index(&self, position: i64) -> i64 {
        keyspace::chunk_index_of(position, self.chunk_size)
    }

    pub fn contains(&self, key: &ChunkKey) -> bool {
        self.store.contains(key)
    }

    /// Decoded value for a chunk key, promoting it to most recently used.
    pub fn get(&mut self, key: &ChunkKey) -> Option<T> {
        let encoded = self.store.get(key)?;
        match self.codec.decode(encoded) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("Failed to decode chunk {}: {:?}", key, e);
                None
            }
        }
    }

    pub fn get_chunk(&mut self, chromosome: &str, index: i64) -> Option<Chunk<T>> {
        let key = keyspace::chunk_key(chromosome, index);
        let value = self.get(&key)?;
        Some(self.make_chunk(key, chromosome, index, value))
    }

    /// Partition the chunks spanned by `region` into resident and missing.
    ///
    /// Resident chunks come back one region each. Missing chunks are merged
    /// into one region per maximal run of consecutive indices. All regions are
    /// snapped to chunk boundaries, so they may extend past `region`.
    pub fn cached_split(&self, region: &Region) -> ChunkSplit {
        let mut split = ChunkSplit::default();
        let mut missing = Vec::new();

        for index in keyspace::chunk_span(region, self.chunk_size) {
            let key = keyspace::chunk_key(&region.chromosome, index);
            if self.store.contains(&key) {
                split
                    .cached
                    .push(keyspace::chunk_region(&region.chromosome, index, self.chunk_size));
            } else {
                missing.push(index);
            }
        }

        split.not_cached = coalesce_runs(&region.chromosome, &missing, self.chunk_size);
        tracing::debug!(
            "Split {} into {} cached chunks and {} missing runs",
            region,
            split.cached.len(),
            split.not_cached.len()
        );
        split
    }

    /// `region` widened to whole chunks, regardless of what is cached.
    pub fn adjusted_region(&self, region: &Region) -> Region {
        let span = keyspace::chunk_span(region, self.chunk_size);
        let (start, _) = keyspace::chunk_bounds(*span.start(), self.chunk_size);
        let (_, end) = keyspace::chunk_bounds(*span.end(), self.chunk_size);
        Region::new(region.chromosome.clone(), start, end)
    }

    /// Only the gaps of `region`, as coalesced chunk-aligned regions.
    pub fn adjusted_regions(&self, region: &Region) -> Vec<Region> {
        self.cached_split(region).not_cached
    }

    /// Store `payload` under the chunk containing `region.start`.
    pub fn put_by_region(&mut self, region: &Region, payload: T) -> Result<Chunk<T>, CacheError> {
        let index = self.chunk_index(region.start);
        self.put_chunk(&region.chromosome, index, payload)
    }

    pub fn put_chunk(
        &mut self,
        chromosome: &str,
        index: i64,
        payload: T,
    ) -> Result<Chunk<T>, CacheError> {
        let key = keyspace::chunk_key(chromosome, index);
        let encoded = self.codec.encode(&payload)?;
        self.store.put(key.clone(), encoded);
        Ok(self.make_chunk(key, chromosome, index, payload))
    }

    /// One chunk per region, looked up by the chunk holding each region's start.
    pub fn get_by_regions(&mut self, regions: &[Region]) -> Vec<Chunk<T>> {
        regions
            .iter()
            .filter_map(|region| {
                let index = self.chunk_index(region.start);
                self.get_chunk(&region.chromosome, index)
            })
            .collect()
    }

    /// Resident chunks overlapping `region`. Never fetches.
    pub fn chunks_by_region(&mut self, region: &Region) -> Vec<Chunk<T>> {
        keyspace::chunk_span(region, self.chunk_size)
            .filter_map(|index| self.get_chunk(&region.chromosome, index))
            .collect()
    }

    pub fn remove(&mut self, key: &ChunkKey) -> bool {
        self.store.remove(key).is_some()
    }

    /// Drop the least recently used chunk and return it.
    pub fn evict_oldest(&mut self) -> Option<Chunk<T>> {
        let (key, encoded) = self.store.evict_oldest()?;
        let value = match self.codec.decode(&encoded) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("Evicted undecodable chunk {}: {:?}", key, e);
                return None;
            }
        };
        let (chromosome, index) = keyspace::parse_chunk_key(&key)?;
        let chromosome = chromosome.to_string();
        Some(self.make_chunk(key, &chromosome, index, value))
    }

    /// Keys from least to most recently used.
    pub fn keys(&self) -> Vec<&ChunkKey> {
        self.store.keys()
    }

    pub fn clear(&mut self) {
        self.store.clear();
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        self.store.stats()
    }

    fn make_chunk(&self, key: ChunkKey, chromosome: &str, index: i64, value: T) -> Chunk<T> {
        let (start, end) = keyspace::chunk_bounds(index, self.chunk_size);
        Chunk {
            key,
            chromosome: chromosome.to_string(),
            index,
            start,
            end,
            value,
        }
    }
}

/// Merge ascending chunk indices into one region per run of consecutive values.
fn coalesce_runs(chromosome: &str, indices: &[i64], chunk_size: u64) -> Vec<Region> {
    let mut regions = Vec::new();
    let mut run: Option<(i64, i64)> = None;

    for &index in indices {
        run = match run {
            Some((first, last)) if index == last + 1 => Some((first, index)),
            Some((first, last)) => {
                regions.push(run_region(chromosome, first, last, chunk_size));
                Some((index, index))
            }
            None => Some((index, index)),
        };
    }
    if let Some((first, last)) = run {
        regions.push(run_region(chromosome, first, last, chunk_size));
    }

    regions
}

fn run_region(chromosome: &str, first: i64, last: i64, chunk_size: u64) -> Region {
    let (start, _) = keyspace::chunk_bounds(first, chunk_size);
    let (_, end) = keyspace::chunk_bounds(last, chunk_size);
    Region::new(chromosome, start, end)
}
