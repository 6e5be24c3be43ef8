//! Chunk grid arithmetic.
//!
//! Positions are never clamped here; callers clamp before doing chunk math.

use crate::region::Region;

pub type ChunkKey = String;

/// Index of the chunk containing `position`, using floor division.
pub fn chunk_index_of(position: i64, chunk_size: u64) -> i64 {
    position.div_euclid(chunk_size as i64)
}

pub fn chunk_key(chromosome: &str, chunk_index: i64) -> ChunkKey {
    format!("{}:{}", chromosome, chunk_index)
}

/// Inclusive `[start, end]` covered by a chunk.
pub fn chunk_bounds(chunk_index: i64, chunk_size: u64) -> (i64, i64) {
    let start = chunk_index * chunk_size as i64;
    (start, start + chunk_size as i64 - 1)
}

pub fn chunk_region(chromosome: &str, chunk_index: i64, chunk_size: u64) -> Region {
    let (start, end) = chunk_bounds(chunk_index, chunk_size);
    Region::new(chromosome, start, end)
}

/// Inclusive range of chunk indices touched by `region`.
pub fn chunk_span(region: &Region, chunk_size: u64) -> std::ops::RangeInclusive<i64> {
    chunk_index_of(region.start, chunk_size)..=chunk_index_of(region.end, chunk_size)
}

/// Parse a `chromosome:index` chunk key.
pub fn parse_chunk_key(key: &str) -> Option<(&str, i64)> {
    let (chromosome, index) = key.rsplit_once(':')?;
    index.parse().ok().map(|i| (chromosome, i))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_index_uses_floor() {
        assert_eq!(chunk_index_of(0, 100), 0);
        assert_eq!(chunk_index_of(99, 100), 0);
        assert_eq!(chunk_index_of(100, 100), 1);
        assert_eq!(chunk_index_of(250, 100), 2);
        assert_eq!(chunk_index_of(-1, 100), -1);
        assert_eq!(chunk_index_of(-100, 100), -1);
        assert_eq!(chunk_index_of(-101, 100), -2);
    }

    #[test]
    fn test_chunk_key_and_bounds() {
        assert_eq!(chunk_key("chr1", 3), "chr1:3");
        assert_eq!(chunk_bounds(1, 100), (100, 199));
        assert_eq!(chunk_bounds(0, 50_000), (0, 49_999));
        assert_eq!(chunk_region("7", 2, 100), Region::new("7", 200, 299));
    }

    #[test]
    fn test_chunk_span_covers_region() {
        for (start, end) in [(150, 250), (0, 0), (99, 100), (1, 1_000), (301, 399)] {
            let region = Region::new("1", start, end);
            let span = chunk_span(&region, 100);
            let (first, _) = chunk_bounds(*span.start(), 100);
            let (_, last) = chunk_bounds(*span.end(), 100);
            assert_eq!(first, (start / 100) * 100);
            assert_eq!(last, (end / 100) * 100 + 99);
            assert!(first <= start && last >= end);
        }
    }

    #[test]
    fn test_parse_chunk_key() {
        assert_eq!(parse_chunk_key("chr1:42"), Some(("chr1", 42)));
        assert_eq!(parse_chunk_key("GL000192.1:0"), Some(("GL000192.1", 0)));
        assert_eq!(parse_chunk_key("chr1"), None);
        assert_eq!(parse_chunk_key("chr1:x"), None);
    }
}
