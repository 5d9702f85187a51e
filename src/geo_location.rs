// Cache of resolved addresses
mod cache;
// Module containing response data structures for the geolocation provider
mod response;

use reqwest::Url;
use tracing::{debug, info};

use crate::error::AppError;
use crate::fetch::Fetcher;

pub use cache::{DEFAULT_CAPACITY, GeoCache};
pub use response::GeoRecord;
use response::IpApiResponse;

// API endpoint for the ip-api.com lookup service; the address is appended
pub const GEO_LOCATION_ENDPOINT: &str = "http://ip-api.com/json/";

/// Resolves client addresses to locations, remembering every answer.
pub struct GeoResolver {
    fetcher: Fetcher,
    endpoint: String,
    cache: GeoCache,
}

impl GeoResolver {
    pub fn new(fetcher: Fetcher, endpoint: impl Into<String>, cache: GeoCache) -> Self {
        Self {
            fetcher,
            endpoint: endpoint.into(),
            cache,
        }
    }

    /// Looks up the location for `addr`.
    ///
    /// The raw address string is the cache key. Concurrent callers for the
    /// same uncached address share one upstream request. Failures are not
    /// cached.
    pub async fn resolve(&self, addr: &str) -> Result<GeoRecord, AppError> {
        let slot = self.cache.slot(addr);

        if let Some(record) = slot.get() {
            debug!("geoip cache hit for {}", addr);
            return Ok(record.clone());
        }

        let result = slot.get_or_try_init(|| self.fetch(addr)).await.cloned();
        if result.is_err() {
            self.cache.discard(addr, &slot);
        }
        result
    }

    pub fn cache(&self) -> &GeoCache {
        &self.cache
    }

    async fn fetch(&self, addr: &str) -> Result<GeoRecord, AppError> {
        info!("Fetching geolocation for address: {}", addr);

        let url = self.lookup_url(addr)?;

        let response: IpApiResponse = self.fetcher.get_json(url).await?;

        if response.status.as_deref() == Some("fail") {
            return Err(AppError::UpstreamMalformedBody(format!(
                "lookup failed: {}",
                response.message.as_deref().unwrap_or("unknown reason")
            )));
        }

        let record = GeoRecord::from(response);
        debug!("Geolocation fetched successfully: {:?}", record);
        Ok(record)
    }

    /// Endpoint with `addr` appended as a single percent-encoded segment.
    fn lookup_url(&self, addr: &str) -> Result<Url, AppError> {
        let mut url = Url::parse(&self.endpoint)
            .map_err(|e| AppError::UpstreamMalformedBody(format!("bad lookup url: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| AppError::UpstreamMalformedBody(format!("bad lookup url: {}", self.endpoint)))?
            .pop_if_empty()
            .push(addr);
        Ok(url)
    }
}
