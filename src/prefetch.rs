use crate::config::PrefetchConfig;
use crate::keyspace;
use crate::region::Region;

/// Chunk runs flanking `region` on either side, `neighbor_count` chunks wide.
/// The left run is clipped at chunk 0 and dropped when nothing is left.
fn neighbor_regions(region: &Region, chunk_size: u64, neighbor_count: usize) -> Vec<Region> {
    if neighbor_count == 0 {
        return Vec::new();
    }

    let span = keyspace::chunk_span(region, chunk_size);
    let count = neighbor_count as i64;
    let mut regions = Vec::with_capacity(2);

    let left_last = *span.start() - 1;
    if left_last >= 0 {
        let left_first = (*span.start() - count).max(0);
        regions.push(chunk_run(&region.chromosome, left_first, left_last, chunk_size));
    }

    regions.extend(following_regions(region, chunk_size, neighbor_count));
    regions
}


/// The `lookahead` chunks right after `region`, as a single run.
fn following_regions(region: &Region, chunk_size: u64, lookahead: usize) -> Vec<Region> {
    if lookahead == 0 {
        return Vec::new();
    }
    let span = keyspace::chunk_span(region, chunk_size);
    let first = *span.end() + 1;
    let last = *span.end() + lookahead as i64;
    vec![chunk_run(&region.chromosome, first, last, chunk_size)]
}

#[cfg(test)]
mod following_regions_tests {
    use super::*;

    #[test]
    fn test_lookahead() {
        let regions = following_regions(&Region::new("2", 0, 99), 100, 3);
        assert_eq!(regions, vec![Region::new("2", 100, 399)]);
    }

    #[test]
    fn test_zero_lookahead() {
        assert!(following_regions(&Region::new("2", 0, 99), 100, 0).is_empty());
    }
}

fn chunk_run(chromosome: &str, first: i64, last: i64, chunk_size: u64) -> Region {
    let (start, _) = keyspace::chunk_bounds(first, chunk_size);
    let (_, end) = keyspace::chunk_bounds(last, chunk_size);
    Region::new(chromosome, start, end)
}

/// Decides which extra regions to warm after a request.
pub trait PrefetchStrategy: Send + Sync + 'static {
    fn prefetch_regions(&self, requested: &Region, chunk_size: u64) -> Vec<Region>;
}

/// Prefetch chunks on both sides of the requested region
pub struct NeighborChunkPrefetch {
    neighbor_count: usize,
}

impl NeighborChunkPrefetch {
    pub fn new(config: &PrefetchConfig) -> Self {
        Self {
            neighbor_count: config.neighbor_chunks,
        }
    }
}

impl PrefetchStrategy for NeighborChunkPrefetch {
    fn prefetch_regions(&self, requested: &Region, chunk_size: u64) -> Vec<Region> {
        neighbor_regions(requested, chunk_size, self.neighbor_count)
    }
}

/// Prefetch chunks after the requested region, for left-to-right scrolling
pub struct SequentialPrefetch {
    lookahead: usize,
}

impl SequentialPrefetch {
    pub fn new(config: &PrefetchConfig) -> Self {
        Self {
            lookahead: config.neighbor_chunks,
        }
    }
}

impl PrefetchStrategy for SequentialPrefetch {
    fn prefetch_regions(&self, requested: &Region, chunk_size: u64) -> Vec<Region> {
        following_regions(requested, chunk_size, self.lookahead)
    }
}

/// No-op prefetching strategy
pub struct NoPrefetch;

impl PrefetchStrategy for NoPrefetch {
    fn prefetch_regions(&self, _requested: &Region, _chunk_size: u64) -> Vec<Region> {
        Vec::new()
    }
}
