//! Reconciles requested regions against the cache and fetches the gaps.

use crate::cache::alignment::AlignmentCache;
use crate::cache::feature::FeatureCache;
use crate::cache::{Chunk, DataType, RegionCache};
use crate::config::{AdapterConfig, QueryParams};
use crate::error::CacheError;
use crate::metrics::CacheMetrics;
use crate::prefetch::{NeighborChunkPrefetch, NoPrefetch, PrefetchStrategy};
use crate::region::Region;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

pub mod events;
pub mod source;

pub use events::{AdapterEvent, ChunkAccumulator, DataReady};
pub use source::{FeatureSource, RegionResult, RemoteQuery};

pub type FeatureAdapter<S> = Adapter<S, FeatureCache>;
pub type AlignmentAdapter<S> = Adapter<S, AlignmentCache>;

/// Owns a [`RegionCache`] and fills it from a [`FeatureSource`].
///
/// Every request is clamped, split against the cache, and only the missing
/// chunk runs are fetched, in batches of at most `batch_size` regions. Cached
/// chunks are announced on the event channel before any batch is spawned;
/// each successful batch then announces the chunks it stored. Batches finish
/// in any order and are never retried or cancelled.
///
/// Clearing the cache starts a new generation. Batches dispatched before the
/// clear are discarded when they land, so a species switch never serves data
/// fetched for the previous species.
pub struct Adapter<S, C>
where
    C: RegionCache,
    S: FeatureSource<Payload = C::Payload>,
{
    config: AdapterConfig,
    source: Arc<S>,
    cache: Arc<RwLock<C>>,
    events: UnboundedSender<AdapterEvent<C::Value>>,
    prefetch: Box<dyn PrefetchStrategy>,
    metrics: Arc<CacheMetrics>,
    generation: Arc<AtomicU64>,
}

impl<S, C> Adapter<S, C>
where
    C: RegionCache,
    S: FeatureSource<Payload = C::Payload>,
{
    pub fn new(
        config: AdapterConfig,
        source: S,
        cache: C,
        events: UnboundedSender<AdapterEvent<C::Value>>,
    ) -> Result<Self, CacheError> {
        config.validate()?;
        let prefetch: Box<dyn PrefetchStrategy> = match &config.prefetch {
            Some(prefetch) => Box::new(NeighborChunkPrefetch::new(prefetch)),
            None => Box::new(NoPrefetch),
        };

        Ok(Self {
            config,
            source: Arc::new(source),
            cache: Arc::new(RwLock::new(cache)),
            events,
            prefetch,
            metrics: Arc::new(CacheMetrics::new()),
            generation: Arc::new(AtomicU64::new(0)),
        })
    }

    pub fn with_prefetch(mut self, strategy: impl PrefetchStrategy) -> Self {
        self.prefetch = Box::new(strategy);
        self
    }

    pub fn config(&self) -> &AdapterConfig {
        &self.config
    }

    pub fn cache(&self) -> &Arc<RwLock<C>> {
        &self.cache
    }

    pub fn source(&self) -> &Arc<S> {
        &self.source
    }

    pub fn metrics(&self) -> &Arc<CacheMetrics> {
        &self.metrics
    }

    /// Clamp to `1..=max_coordinate`; `None` when nothing is left.
    pub fn clamp(&self, region: &Region) -> Option<Region> {
        let start = region.start.max(1);
        let end = region.end.min(self.config.max_coordinate);
        if end < start {
            return None;
        }
        Some(Region::new(region.chromosome.clone(), start, end))
    }

    /// Switch species; everything cached belongs to the old one.
    pub async fn set_species(&mut self, species: impl Into<String>) {
        self.config.species = species.into();
        self.clear_cache().await;
    }

    /// Drop every cached chunk and disown batches still in flight.
    pub async fn clear_cache(&self) {
        let mut cache = self.cache.write().await;
        cache.clear();
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::debug!(
            "Cleared region cache for {}, generation {}",
            self.config.species,
            generation
        );
    }

    /// Start resolving `region` and return without waiting for the network.
    ///
    /// Chunks already cached are sent as a [`DataReady`] event before this
    /// returns. Each batch sends its own event when it lands, so one call can
    /// produce several notifications.
    pub async fn get_data(
        &self,
        region: &Region,
        data_type: &DataType,
        params: &QueryParams,
    ) -> PendingFetch<C::Value> {
        let Some(region) = self.clamp(region) else {
            tracing::debug!(
                "Region {} lies outside 1..={}, nothing to fetch",
                region,
                self.config.max_coordinate
            );
            return PendingFetch::default();
        };

        let (cached, not_cached, chunk_size) = {
            let mut cache = self.cache.write().await;
            let split = cache.cached_split(&region, data_type);
            let cached = cache.chunks_by_regions(&split.cached, data_type);
            (cached, split.not_cached, cache.chunk_size(data_type))
        };

        // Histogram bins come from one query so they share a single binning.
        let not_cached = if data_type.is_histogram() {
            bounding_region(&not_cached).into_iter().collect()
        } else {
            not_cached
        };

        let missing_chunks = not_cached
            .iter()
            .map(|run| run.length() as u64 / chunk_size)
            .sum();
        self.metrics.record_request(cached.len() as u64, missing_chunks);

        if !cached.is_empty() {
            tracing::debug!("Cache HIT for {} chunks of {}", cached.len(), region);
            self.emit(AdapterEvent::DataReady(DataReady {
                items: cached.clone(),
                data_type: data_type.clone(),
                chunk_size,
                cached: true,
            }));
        }

        let batches = self.dispatch(not_cached, data_type, params, chunk_size);

        let prefetch_regions = self.prefetch.prefetch_regions(&region, chunk_size);
        if !prefetch_regions.is_empty() {
            self.warm(prefetch_regions, data_type, params).await;
        }

        PendingFetch { cached, batches }
    }

    /// Resolve `region` completely: cached chunks plus every batch's result.
    pub async fn fetch(
        &self,
        region: &Region,
        data_type: &DataType,
        params: &QueryParams,
    ) -> FetchOutcome<C::Value> {
        self.get_data(region, data_type, params).await.wait().await
    }

    /// Fire-and-forget fetches for regions nobody is waiting on yet.
    async fn warm(&self, regions: Vec<Region>, data_type: &DataType, params: &QueryParams) {
        let mut missing = Vec::new();
        {
            let mut cache = self.cache.write().await;
            for region in regions.iter().filter_map(|r| self.clamp(r)) {
                missing.extend(cache.cached_split(&region, data_type).not_cached);
            }
        }
        if missing.is_empty() {
            return;
        }

        let chunk_size = self.cache.read().await.chunk_size(data_type);
        tracing::debug!("Prefetching {} regions of {}", missing.len(), data_type);
        // Dropped handles keep running; their chunks are still announced.
        drop(self.dispatch(missing, data_type, params, chunk_size));
    }

    fn dispatch(
        &self,
        regions: Vec<Region>,
        data_type: &DataType,
        params: &QueryParams,
        chunk_size: u64,
    ) -> Vec<Batch<C::Value>> {
        let generation = self.generation.load(Ordering::SeqCst);
        regions
            .chunks(self.config.batch_size)
            .map(|batch| {
                let query = self.build_query(batch.to_vec(), data_type, params);
                tracing::debug!(
                    "Cache MISS, fetching {} regions of {}: {}",
                    batch.len(),
                    data_type,
                    query.region_list()
                );
                self.metrics.record_batch_dispatched();

                let handle = tokio::spawn(run_batch(
                    Arc::clone(&self.source),
                    Arc::clone(&self.cache),
                    self.events.clone(),
                    Arc::clone(&self.metrics),
                    Arc::clone(&self.generation),
                    query,
                    BatchStamp {
                        generation,
                        chunk_size,
                    },
                ));
                Batch {
                    regions: batch.to_vec(),
                    handle,
                }
            })
            .collect()
    }

    fn build_query(
        &self,
        regions: Vec<Region>,
        data_type: &DataType,
        params: &QueryParams,
    ) -> RemoteQuery {
        let mut merged = self.config.params.clone();
        merged.extend(params.iter().map(|(k, v)| (k.clone(), v.clone())));
        merged.extend(data_type.query_params());

        RemoteQuery {
            host: self.config.host.clone(),
            version: self.config.version.clone(),
            species: self.config.species.clone(),
            category: self.config.category.clone(),
            subcategory: self.config.subcategory.clone(),
            resource: self.config.resource.clone(),
            data_type: data_type.clone(),
            regions,
            params: merged,
        }
    }

    fn emit(&self, event: AdapterEvent<C::Value>) {
        send_event(&self.events, event);
    }
}

fn send_event<T>(events: &UnboundedSender<AdapterEvent<T>>, event: AdapterEvent<T>) {
    if events.send(event).is_err() {
        tracing::debug!("Event receiver dropped, discarding event");
    }
}

/// One region from the start of the first run to the end of the last.
fn bounding_region(runs: &[Region]) -> Option<Region> {
    let first = runs.first()?;
    let last = runs.last()?;
    Some(Region::new(first.chromosome.clone(), first.start, last.end))
}

/// Cache generation and chunk width a batch was dispatched under.
#[derive(Debug, Clone, Copy)]
struct BatchStamp {
    generation: u64,
    chunk_size: u64,
}

async fn run_batch<S, C>(
    source: Arc<S>,
    cache: Arc<RwLock<C>>,
    events: UnboundedSender<AdapterEvent<C::Value>>,
    metrics: Arc<CacheMetrics>,
    generation: Arc<AtomicU64>,
    query: RemoteQuery,
    stamp: BatchStamp,
) -> Result<BatchOutcome<C::Value>, CacheError>
where
    C: RegionCache,
    S: FeatureSource<Payload = C::Payload>,
{
    let results = match source.fetch(&query).await {
        Ok(results) => results,
        Err(e) => {
            tracing::warn!("Fetch failed for {}: {}", query.region_list(), e);
            metrics.record_batch_failed();
            send_event(
                &events,
                AdapterEvent::FetchFailed {
                    data_type: query.data_type.clone(),
                    regions: query.regions.clone(),
                    error: e.to_string(),
                },
            );
            return Err(e);
        }
    };

    let ids = query.region_ids();
    let mut answered = vec![false; ids.len()];
    let mut stored = Vec::new();
    {
        let mut cache = cache.write().await;
        if generation.load(Ordering::SeqCst) != stamp.generation {
            tracing::debug!(
                "Discarding batch for {} dispatched before the cache was cleared",
                query.region_list()
            );
            return Ok(BatchOutcome {
                chunks: Vec::new(),
                unanswered: query.regions,
            });
        }

        for RegionResult {
            queried_region_id,
            result,
        } in results
        {
            let Some(position) = ids.iter().position(|id| *id == queried_region_id) else {
                tracing::warn!("Ignoring result for unrequested region {}", queried_region_id);
                continue;
            };
            let region = &query.regions[position];
            match cache.put_by_region(region, result, &query.data_type) {
                Ok(chunks) => {
                    answered[position] = true;
                    stored.extend(chunks);
                }
                Err(e) => tracing::warn!("Failed to store chunks for {}: {:?}", region, e),
            }
        }
    }

    let unanswered: Vec<Region> = query
        .regions
        .iter()
        .zip(&answered)
        .filter(|(_, answered)| !**answered)
        .map(|(region, _)| region.clone())
        .collect();

    metrics.record_chunks_stored(stored.len() as u64);
    if !stored.is_empty() {
        send_event(
            &events,
            AdapterEvent::DataReady(DataReady {
                items: stored.clone(),
                data_type: query.data_type.clone(),
                chunk_size: stamp.chunk_size,
                cached: false,
            }),
        );
    }
    if !unanswered.is_empty() {
        tracing::warn!(
            "No usable answer for {} of {} regions",
            unanswered.len(),
            query.regions.len()
        );
        send_event(
            &events,
            AdapterEvent::FetchFailed {
                data_type: query.data_type.clone(),
                regions: unanswered.clone(),
                error: "source returned no usable answer".to_string(),
            },
        );
    }

    Ok(BatchOutcome {
        chunks: stored,
        unanswered,
    })
}

/// Chunks a batch stored, and the queried regions it could not resolve.
struct BatchOutcome<T> {
    chunks: Vec<Chunk<T>>,
    unanswered: Vec<Region>,
}

struct Batch<T> {
    regions: Vec<Region>,
    handle: JoinHandle<Result<BatchOutcome<T>, CacheError>>,
}

/// Handle for an in-progress [`Adapter::get_data`] call.
///
/// Dropping it does not cancel anything; batches keep running and still
/// report through the event channel.
pub struct PendingFetch<T> {
    cached: Vec<Chunk<T>>,
    batches: Vec<Batch<T>>,
}

impl<T> Default for PendingFetch<T> {
    fn default() -> Self {
        Self {
            cached: Vec::new(),
            batches: Vec::new(),
        }
    }
}

impl<T> PendingFetch<T> {
    /// Chunks that were resident when the request was made
    pub fn cached(&self) -> &[Chunk<T>] {
        &self.cached
    }

    /// Number of remote calls in flight for this request
    pub fn batch_count(&self) -> usize {
        self.batches.len()
    }

    /// Wait for every batch and collect old and new chunks.
    pub async fn wait(self) -> FetchOutcome<T> {
        let (regions, handles): (Vec<_>, Vec<_>) = self
            .batches
            .into_iter()
            .map(|batch| (batch.regions, batch.handle))
            .unzip();

        let mut outcome = FetchOutcome {
            chunks: self.cached,
            failed: Vec::new(),
        };
        for (regions, joined) in regions
            .into_iter()
            .zip(futures::future::join_all(handles).await)
        {
            match joined {
                Ok(Ok(batch)) => {
                    outcome.chunks.extend(batch.chunks);
                    outcome.failed.extend(batch.unanswered);
                }
                Ok(Err(_)) => outcome.failed.extend(regions),
                Err(e) => {
                    tracing::warn!("Batch task did not complete: {}", e);
                    outcome.failed.extend(regions);
                }
            }
        }
        outcome
    }
}

/// Everything a finished request produced.
#[derive(Debug, Clone)]
pub struct FetchOutcome<T> {
    pub chunks: Vec<Chunk<T>>,
    /// Queried regions left unresolved by a failed, partial or discarded batch
    pub failed: Vec<Region>,
}

impl<T> FetchOutcome<T> {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}
