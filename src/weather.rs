use std::str::FromStr;

use reqwest::Url;
use tracing::{debug, info};

use crate::error::AppError;
use crate::fetch::Fetcher;
use crate::geo_location::GeoRecord;

mod response;

pub use response::WeatherRecord;
use response::{OpenWeatherResponse, WeatherApiResponse};

pub const WEATHER_API_ENDPOINT: &str = "https://api.weatherapi.com/v1/current.json";
pub const OPEN_WEATHER_ENDPOINT: &str = "https://api.openweathermap.org/data/2.5/weather";

/// Which upstream answers weather queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Provider {
    /// api.weatherapi.com, queried by client address
    #[default]
    WeatherApi,
    /// api.openweathermap.org, queried by coordinates
    OpenWeatherMap,
}

impl Provider {
    pub fn default_endpoint(self) -> &'static str {
        match self {
            Provider::WeatherApi => WEATHER_API_ENDPOINT,
            Provider::OpenWeatherMap => OPEN_WEATHER_ENDPOINT,
        }
    }
}

impl FromStr for Provider {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "weatherapi" => Ok(Provider::WeatherApi),
            "openweathermap" | "owm" => Ok(Provider::OpenWeatherMap),
            _ => Err(AppError::InvalidConfig {
                name: "WEATHER_PROVIDER",
                value: s.to_string(),
            }),
        }
    }
}

/// Fetches current conditions. Never cached.
pub struct WeatherResolver {
    fetcher: Fetcher,
    provider: Provider,
    endpoint: String,
    api_key: Option<String>,
}

impl WeatherResolver {
    pub fn new(
        fetcher: Fetcher,
        provider: Provider,
        endpoint: impl Into<String>,
        api_key: Option<String>,
    ) -> Self {
        Self {
            fetcher,
            provider,
            endpoint: endpoint.into(),
            api_key: api_key.filter(|k| !k.is_empty()),
        }
    }

    /// Resolves weather for a request, using whatever the active provider
    /// needs: the address for WeatherAPI, the geolocated coordinates for
    /// OpenWeatherMap.
    pub async fn current(
        &self,
        addr: &str,
        geo: Option<&GeoRecord>,
    ) -> Result<WeatherRecord, AppError> {
        match self.provider {
            Provider::WeatherApi => self.get_by_address(addr).await,
            Provider::OpenWeatherMap => {
                let geo = geo.ok_or(AppError::MissingCoordinates)?;
                self.get_by_coordinates(geo.latitude, geo.longitude).await
            }
        }
    }

    pub async fn get_by_address(&self, addr: &str) -> Result<WeatherRecord, AppError> {
        let api_key = self.api_key()?;
        info!("Fetching weather data for address: {}", addr);

        let url = self.url(&[("key", api_key), ("q", addr)])?;
        let response: WeatherApiResponse = self.fetcher.get_json(url).await?;

        let record = WeatherRecord::from(response);
        debug!("Weather data fetched successfully: {:?}", record);
        Ok(record)
    }

    pub async fn get_by_coordinates(&self, lat: f64, lon: f64) -> Result<WeatherRecord, AppError> {
        let api_key = self.api_key()?;
        info!("Fetching weather data for coordinates: {},{}", lat, lon);

        let (lat, lon) = (format!("{lat:.6}"), format!("{lon:.6}"));
        let url = self.url(&[
            ("units", "metric"),
            ("lat", lat.as_str()),
            ("lon", lon.as_str()),
            ("appid", api_key),
        ])?;
        let response: OpenWeatherResponse = self.fetcher.get_json(url).await?;

        let record = WeatherRecord::from(response);
        debug!("Weather data fetched successfully: {:?}", record);
        Ok(record)
    }

    fn api_key(&self) -> Result<&str, AppError> {
        self.api_key.as_deref().ok_or(AppError::MissingApiKey)
    }

    fn url(&self, query: &[(&str, &str)]) -> Result<Url, AppError> {
        Url::parse_with_params(&self.endpoint, query)
            .map_err(|e| AppError::UpstreamMalformedBody(format!("bad weather url: {e}")))
    }
}
