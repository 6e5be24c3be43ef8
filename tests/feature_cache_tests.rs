use genome_region_cache::{
    CacheConfig, CacheError, DataType, DeflateJsonCodec, Feature, FeatureCache, Region, RegionCache,
};

fn feature_cache(chunk_size: u64) -> FeatureCache {
    FeatureCache::new(CacheConfig {
        chunk_size,
        max_chunks: None,
    })
    .unwrap()
}

#[test]
fn test_features_are_distributed_over_spanned_chunks() {
    let mut cache = feature_cache(100);
    let region = Region::new("1", 100, 399);
    let features = vec![
        Feature::new("1", 120, 130),
        Feature::new("1", 180, 220),
        Feature::new("1", 350, 360),
    ];

    let stored = cache
        .put_features_by_region(features, &region, &DataType::Features)
        .unwrap();
    let counts: Vec<(i64, usize)> = stored.iter().map(|c| (c.index, c.value.len())).collect();
    assert_eq!(counts, vec![(1, 2), (2, 1), (3, 1)]);

    let split = cache.cached_split(&region, &DataType::Features);
    assert!(split.is_fully_cached());
    assert_eq!(split.cached.len(), 3);
}

#[test]
fn test_feature_type_tagging() {
    let mut cache = feature_cache(100);
    let stored = cache
        .put_features_by_region(
            vec![Feature::new("1", 10, 20)],
            &Region::new("1", 0, 99),
            &DataType::Features,
        )
        .unwrap();
    assert_eq!(stored[0].value[0].feature_type.as_deref(), Some("features"));

    let mut genes = feature_cache(100).with_feature_type("gene");
    let stored = genes
        .put_features_by_region(
            vec![Feature::new("1", 10, 20)],
            &Region::new("1", 0, 99),
            &DataType::Features,
        )
        .unwrap();
    assert_eq!(stored[0].value[0].feature_type.as_deref(), Some("gene"));
}

#[test]
fn test_empty_answer_marks_region_cached() {
    let mut cache = feature_cache(100);
    let region = Region::new("X", 0, 299);

    let stored = cache
        .put_by_region(&region, Vec::new(), &DataType::Features)
        .unwrap();
    assert_eq!(stored.len(), 3);
    assert!(stored.iter().all(|c| c.value.is_empty()));
    assert!(cache
        .cached_split(&Region::new("X", 50, 250), &DataType::Features)
        .is_fully_cached());
}

#[test]
fn test_histogram_partition_uses_interval_as_chunk_size() {
    let mut cache = feature_cache(50_000);
    let histogram = DataType::histogram(1_000).unwrap();

    assert_eq!(cache.chunk_size(&DataType::Features), 50_000);
    assert_eq!(cache.chunk_size(&histogram), 1_000);

    cache
        .put_features_by_region(
            vec![Feature::new("1", 0, 999).with_attribute("features_count", 12)],
            &Region::new("1", 0, 999),
            &histogram,
        )
        .unwrap();

    // Same coordinates, different partition.
    let region = Region::new("1", 0, 999);
    assert!(cache.cached_split(&region, &histogram).is_fully_cached());
    assert!(!cache
        .cached_split(&region, &DataType::Features)
        .is_fully_cached());

    let chunks = cache.get_chunks_by_region(&region, &histogram);
    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].value[0].feature_type.as_deref(), Some("histogram_1000"));
}

#[test]
fn test_clear_drops_every_partition() {
    let mut cache = feature_cache(100);
    let region = Region::new("1", 0, 99);
    let named = DataType::Named("snp".to_string());

    cache
        .put_by_region(&region, vec![Feature::new("1", 1, 2)], &DataType::Features)
        .unwrap();
    cache
        .put_by_region(&region, vec![Feature::new("1", 1, 2)], &named)
        .unwrap();
    assert_eq!(cache.partitions().data_types().len(), 2);
    assert_eq!(cache.stats().entry_count, 2);

    cache.partitions_mut().clear_data_type(&named);
    assert_eq!(cache.cached_split(&region, &named).not_cached.len(), 1);
    assert!(cache.cached_split(&region, &DataType::Features).is_fully_cached());

    RegionCache::clear(&mut cache);
    assert_eq!(cache.stats().entry_count, 0);
    assert!(!cache
        .cached_split(&region, &DataType::Features)
        .is_fully_cached());
}

#[test]
fn test_chunks_by_regions_resolves_cached_half_of_split() {
    let mut cache = feature_cache(100);
    cache
        .put_by_region(
            &Region::new("1", 200, 299),
            vec![Feature::new("1", 210, 220)],
            &DataType::Features,
        )
        .unwrap();

    let split = cache.cached_split(&Region::new("1", 150, 250), &DataType::Features);
    let chunks = cache.chunks_by_regions(&split.cached, &DataType::Features);
    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].key, "1:2");
    assert_eq!(split.not_cached, vec![Region::new("1", 100, 199)]);
}

#[test]
fn test_compressed_feature_cache() -> anyhow::Result<()> {
    let mut cache = FeatureCache::with_codec(CacheConfig::default(), DeflateJsonCodec::new())?;
    let region = Region::new("13", 32_889_611, 32_973_805);
    let brca2 = Feature::new("13", 32_889_611, 32_973_805).with_attribute("name", "BRCA2");

    cache.put_by_region(&region, vec![brca2], &DataType::Features)?;
    let chunks = cache.chunks_by_region(&region, &DataType::Features);

    assert_eq!(chunks.len(), 3);
    assert!(chunks
        .iter()
        .all(|c| c.value[0].attributes.get("name") == Some(&serde_json::json!("BRCA2"))));
    Ok(())
}

#[test]
fn test_zero_histogram_interval_is_rejected() {
    assert!(matches!(
        DataType::histogram(0),
        Err(CacheError::InvalidChunkSize(0))
    ));
    assert!(serde_json::from_str::<DataType>(r#"{"Histogram":{"interval":0}}"#).is_err());

    let histogram: DataType = serde_json::from_str(r#"{"Histogram":{"interval":500}}"#).unwrap();
    assert!(histogram.is_histogram());
    assert_eq!(feature_cache(100).chunk_size(&histogram), 500);
}
