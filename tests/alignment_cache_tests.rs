use genome_region_cache::{
    AlignedRead, AlignmentCache, AlignmentResult, CacheConfig, Coverage, DataType, Region,
    RegionCache,
};

fn alignment_cache(chunk_size: u64) -> AlignmentCache {
    AlignmentCache::new(CacheConfig {
        chunk_size,
        max_chunks: None,
    })
    .unwrap()
}

fn coverage(len: u32) -> Coverage {
    Coverage {
        all: (0..len).collect(),
        a: (0..len).map(|i| i % 4).collect(),
        c: vec![1; len as usize],
        g: vec![0; len as usize],
        t: (0..len).rev().collect(),
    }
}

#[test]
fn test_default_alignment_chunk_size() {
    let cache = AlignmentCache::new(CacheConfig::alignments()).unwrap();
    assert_eq!(cache.chunk_size(&DataType::Features), 10_000);
}

#[test]
fn test_coverage_is_sliced_per_chunk() {
    let mut cache = alignment_cache(100);
    let region = Region::new("1", 0, 149);
    let result = AlignmentResult {
        reads: Vec::new(),
        coverage: coverage(150),
    };

    let stored = cache
        .put_alignments_by_region(result.clone(), &region, &DataType::Features)
        .unwrap();

    assert_eq!(stored.len(), 2);
    assert_eq!(stored[0].value.coverage.len(), 100);
    assert_eq!(stored[1].value.coverage.len(), 50);
    assert_eq!(stored[0].value.coverage_start, 0);
    assert_eq!(stored[1].value.coverage_start, 100);

    // Concatenating the chunk slices gives back the original arrays.
    let mut all = Vec::new();
    let mut t = Vec::new();
    for chunk in &stored {
        all.extend_from_slice(&chunk.value.coverage.all);
        t.extend_from_slice(&chunk.value.coverage.t);
    }
    assert_eq!(all, result.coverage.all);
    assert_eq!(t, result.coverage.t);
}

#[test]
fn test_reads_are_filed_into_overlapping_chunks() {
    let mut cache = alignment_cache(100);
    let region = Region::new("2", 0, 299);
    let result = AlignmentResult {
        reads: vec![
            AlignedRead::new("r1", "2", 10, 60),
            AlignedRead::new("r2", "2", 90, 130),
            AlignedRead::new("r3", "2", 250, 280),
        ],
        coverage: coverage(300),
    };

    let stored = cache.put_by_region(&region, result, &DataType::Features).unwrap();
    let names: Vec<Vec<&str>> = stored
        .iter()
        .map(|c| c.value.reads.iter().map(|r| r.name.as_str()).collect())
        .collect();
    assert_eq!(names, vec![vec!["r1", "r2"], vec!["r2"], vec!["r3"]]);
}

#[test]
fn test_lookup_after_store() {
    let mut cache = alignment_cache(100);
    let region = Region::new("3", 100, 299);
    cache
        .put_by_region(
            &region,
            AlignmentResult {
                reads: vec![AlignedRead::new("r1", "3", 120, 170)],
                coverage: coverage(200),
            },
            &DataType::Features,
        )
        .unwrap();

    assert!(cache
        .cached_split(&Region::new("3", 150, 250), &DataType::Features)
        .is_fully_cached());

    let chunks = cache.get_chunks_by_region(&Region::new("3", 210, 220), &DataType::Features);
    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].index, 2);
    assert_eq!(chunks[0].value.coverage.all.first(), Some(&100));
    assert!(chunks[0].value.reads.is_empty());
}

#[test]
fn test_short_coverage_leaves_trailing_chunks_empty() {
    let mut cache = alignment_cache(100);
    let stored = cache
        .put_by_region(
            &Region::new("1", 0, 299),
            AlignmentResult {
                reads: Vec::new(),
                coverage: coverage(120),
            },
            &DataType::Features,
        )
        .unwrap();

    let lens: Vec<usize> = stored.iter().map(|c| c.value.coverage.len()).collect();
    assert_eq!(lens, vec![100, 20, 0]);
}
