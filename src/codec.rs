use crate::error::CacheError;
use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Codec applied at the chunk store boundary: encode on put, decode on get.
pub trait ChunkCodec<T>: Send + Sync + 'static {
    /// Representation kept in the recency store
    type Encoded: Send + Sync + 'static;

    fn encode(&self, value: &T) -> Result<Self::Encoded, CacheError>;
    fn decode(&self, encoded: &Self::Encoded) -> Result<T, CacheError>;
}

/// Stores values as-is
#[derive(Debug, Clone, Copy, Default)]
pub struct Passthrough;

impl<T> ChunkCodec<T> for Passthrough
where
    T: Clone + Send + Sync + 'static,
{
    type Encoded = T;

    fn encode(&self, value: &T) -> Result<T, CacheError> {
        Ok(value.clone())
    }

    fn decode(&self, encoded: &T) -> Result<T, CacheError> {
        Ok(encoded.clone())
    }
}

/// JSON serialization followed by deflate compression using flate2
#[derive(Debug, Clone)]
pub struct DeflateJsonCodec {
    level: u32,
}

impl DeflateJsonCodec {
    pub fn new() -> Self {
        Self { level: 6 }
    }

    pub fn with_level(level: u32) -> Self {
        Self {
            level: level.min(9),
        }
    }

    pub fn level(&self) -> u32 {
        self.level
    }
}

impl Default for DeflateJsonCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ChunkCodec<T> for DeflateJsonCodec
where
    T: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    type Encoded = Bytes;

    fn encode(&self, value: &T) -> Result<Bytes, CacheError> {
        use flate2::write::DeflateEncoder;
        use flate2::Compression;

        let mut encoder = DeflateEncoder::new(Vec::new(), Compression::new(self.level));
        serde_json::to_writer(&mut encoder, value)?;
        encoder
            .finish()
            .map(Bytes::from)
            .map_err(|e| CacheError::Compression(e.to_string()))
    }

    fn decode(&self, encoded: &Bytes) -> Result<T, CacheError> {
        use flate2::read::DeflateDecoder;

        let decoder = DeflateDecoder::new(encoded.as_ref());
        serde_json::from_reader(decoder).map_err(|e| {
            if e.is_io() {
                CacheError::Compression(e.to_string())
            } else {
                CacheError::Serialization(e)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deflate_shrinks_repetitive_payloads() {
        let codec = DeflateJsonCodec::new();
        let depth: Vec<u32> = vec![12; 10_000];

        let encoded = ChunkCodec::<Vec<u32>>::encode(&codec, &depth).unwrap();
        assert!(encoded.len() < 1_000);

        let decoded: Vec<u32> = codec.decode(&encoded).unwrap();
        assert_eq!(decoded, depth);
    }

    #[test]
    fn test_deflate_rejects_garbage() {
        let codec = DeflateJsonCodec::new();
        let result: Result<Vec<u32>, _> = codec.decode(&Bytes::from_static(b"not deflate"));
        assert!(result.is_err());
    }

    #[test]
    fn test_level_is_capped() {
        assert_eq!(DeflateJsonCodec::with_level(42).level(), 9);
    }
}
