use crate::cache::DataType;
use crate::config::QueryParams;
use crate::error::CacheError;
use crate::region::Region;
use serde::{Deserialize, Serialize};

/// One remote call: a batch of chunk-aligned regions for a resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemoteQuery {
    pub host: String,
    pub version: String,
    pub species: String,
    pub category: String,
    pub subcategory: String,
    pub resource: String,
    pub data_type: DataType,
    pub regions: Vec<Region>,
    pub params: QueryParams,
}

impl RemoteQuery {
    /// Regions in `chrom:start-end` form, in request order.
    pub fn region_ids(&self) -> Vec<String> {
        self.regions.iter().map(Region::to_string).collect()
    }

    /// Comma-separated region list as sent on the wire.
    pub fn region_list(&self) -> String {
        self.region_ids().join(",")
    }

    /// REST endpoint for this query, parameters in key order.
    pub fn url(&self) -> String {
        let mut url = format!(
            "https://{}/webservices/rest/{}/{}/{}/{}/{}/{}",
            self.host,
            self.version,
            self.species,
            self.category,
            self.subcategory,
            self.region_list(),
            self.resource
        );
        for (i, (key, value)) in self.params.iter().enumerate() {
            url.push(if i == 0 { '?' } else { '&' });
            url.push_str(&format!("{}={}", key, value));
        }
        url
    }
}

/// Answer for one queried region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionResult<P> {
    pub queried_region_id: String,
    pub result: P,
}

impl<P> RegionResult<P> {
    pub fn new(region: &Region, result: P) -> Self {
        Self {
            queried_region_id: region.to_string(),
            result,
        }
    }
}

/// Remote genomics service the adapter fills its cache from.
///
/// The payload format is opaque to the cache; a failed call leaves the cache
/// untouched for every region of the query.
#[async_trait::async_trait]
pub trait FeatureSource: Send + Sync + 'static {
    type Payload: Send + 'static;

    async fn fetch(
        &self,
        query: &RemoteQuery,
    ) -> Result<Vec<RegionResult<Self::Payload>>, CacheError>;
}
