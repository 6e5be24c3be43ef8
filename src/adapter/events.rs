use crate::cache::{Chunk, DataType};
use crate::region::Region;
use std::collections::BTreeMap;

/// Chunks that just became available for a data type.
#[derive(Debug, Clone, PartialEq)]
pub struct DataReady<T> {
    pub items: Vec<Chunk<T>>,
    pub data_type: DataType,
    pub chunk_size: u64,
    /// `true` when the items were already resident before the request
    pub cached: bool,
}

/// Everything an adapter reports to its listener.
#[derive(Debug, Clone, PartialEq)]
pub enum AdapterEvent<T> {
    DataReady(DataReady<T>),
    FetchFailed {
        data_type: DataType,
        regions: Vec<Region>,
        error: String,
    },
}

/// Consumer-side merge of data-ready notifications.
///
/// One `get_data` call may produce several notifications in any order; this
/// keeps the union keyed by `(chromosome, chunk index)`, so arrival order and
/// duplicates do not matter.
#[derive(Debug, Clone)]
pub struct ChunkAccumulator<T> {
    chunks: BTreeMap<(String, i64), Chunk<T>>,
}

impl<T> ChunkAccumulator<T> {
    pub fn new() -> Self {
        Self {
            chunks: BTreeMap::new(),
        }
    }

    /// Merge chunks, replacing older copies. Returns how many keys were new.
    pub fn merge(&mut self, items: impl IntoIterator<Item = Chunk<T>>) -> usize {
        let mut added = 0;
        for chunk in items {
            let key = (chunk.chromosome.clone(), chunk.index);
            if self.chunks.insert(key, chunk).is_none() {
                added += 1;
            }
        }
        added
    }

    /// Merge the items of a data-ready event; other events are ignored.
    pub fn apply(&mut self, event: AdapterEvent<T>) -> usize {
        match event {
            AdapterEvent::DataReady(ready) => self.merge(ready.items),
            AdapterEvent::FetchFailed { .. } => 0,
        }
    }

    /// Chunks overlapping `region`, in genomic order.
    pub fn overlapping(&self, region: &Region) -> Vec<&Chunk<T>> {
        self.chunks
            .range((region.chromosome.clone(), i64::MIN)..=(region.chromosome.clone(), i64::MAX))
            .map(|(_, chunk)| chunk)
            .filter(|chunk| chunk.start <= region.end && chunk.end >= region.start)
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Chunk<T>> {
        self.chunks.values()
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn clear(&mut self) {
        self.chunks.clear();
    }
}

impl<T> Default for ChunkAccumulator<T> {
    fn default() -> Self {
        Self::new()
    }
}
