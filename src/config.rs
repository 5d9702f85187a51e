//! Service configuration read from the environment.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::AppError;
use crate::geo_location::{DEFAULT_CAPACITY, GEO_LOCATION_ENDPOINT};
use crate::timezone::TableSource;
use crate::weather::Provider;

pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:9000";
pub const DEFAULT_SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: String,
    pub weather_api_key: Option<String>,
    pub weather_provider: Provider,
    pub weather_url: String,
    pub geoip_url: String,
    pub geo_cache_capacity: usize,
    pub shutdown_grace: Duration,
    pub tz_table: TableSource,
}

impl Default for Config {
    fn default() -> Self {
        let weather_provider = Provider::default();
        Self {
            listen_addr: DEFAULT_LISTEN_ADDR.to_string(),
            weather_api_key: None,
            weather_provider,
            weather_url: weather_provider.default_endpoint().to_string(),
            geoip_url: GEO_LOCATION_ENDPOINT.to_string(),
            geo_cache_capacity: DEFAULT_CAPACITY,
            shutdown_grace: DEFAULT_SHUTDOWN_GRACE,
            tz_table: TableSource::Embedded,
        }
    }
}

impl Config {
    /// Reads the configuration from process environment variables.
    ///
    /// # Errors
    /// Returns `AppError::InvalidConfig` for unparseable values.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`Config::from_env`] with an injectable variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let defaults = Config::default();

        let weather_provider = match var("WEATHER_PROVIDER") {
            Some(v) => v.parse()?,
            None => defaults.weather_provider,
        };

        Ok(Self {
            listen_addr: var("LISTEN_ADDR")
                .map(|v| normalize_listen_addr(&v))
                .unwrap_or(defaults.listen_addr),
            weather_api_key: var("WEATHER_API_KEY"),
            weather_provider,
            weather_url: var("WEATHER_URL")
                .unwrap_or_else(|| weather_provider.default_endpoint().to_string()),
            geoip_url: var("GEOIP_URL").unwrap_or(defaults.geoip_url),
            geo_cache_capacity: parse_var("GEO_CACHE_CAPACITY", var("GEO_CACHE_CAPACITY"))?
                .unwrap_or(defaults.geo_cache_capacity),
            shutdown_grace: parse_var("SHUTDOWN_GRACE_SECS", var("SHUTDOWN_GRACE_SECS"))?
                .map(Duration::from_secs)
                .unwrap_or(defaults.shutdown_grace),
            tz_table: var("TZ_DATA_PATH")
                .map(|p| TableSource::File(PathBuf::from(p)))
                .unwrap_or(defaults.tz_table),
        })
    }
}

fn parse_var<T: FromStr>(name: &'static str, value: Option<String>) -> Result<Option<T>, AppError> {
    value
        .map(|v| {
            v.trim()
                .parse()
                .map_err(|_| AppError::InvalidConfig { name, value: v })
        })
        .transpose()
}

/// Accepts the `:9000` shorthand for "all interfaces".
fn normalize_listen_addr(addr: &str) -> String {
    match addr.strip_prefix(':') {
        Some(port) => format!("0.0.0.0:{port}"),
        None => addr.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config, AppError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg.listen_addr, "0.0.0.0:9000");
        assert_eq!(cfg.weather_api_key, None);
        assert_eq!(cfg.weather_provider, Provider::WeatherApi);
        assert_eq!(cfg.weather_url, crate::weather::WEATHER_API_ENDPOINT);
        assert_eq!(cfg.geoip_url, GEO_LOCATION_ENDPOINT);
        assert_eq!(cfg.geo_cache_capacity, DEFAULT_CAPACITY);
        assert_eq!(cfg.shutdown_grace, Duration::from_secs(5));
        assert!(matches!(cfg.tz_table, TableSource::Embedded));
    }

    #[test]
    fn test_overrides() {
        let cfg = config(&[
            ("LISTEN_ADDR", ":8080"),
            ("WEATHER_API_KEY", "k"),
            ("WEATHER_PROVIDER", "openweathermap"),
            ("GEO_CACHE_CAPACITY", "16"),
            ("SHUTDOWN_GRACE_SECS", "15"),
            ("TZ_DATA_PATH", "/etc/tz.json"),
        ])
        .unwrap();

        assert_eq!(cfg.listen_addr, "0.0.0.0:8080");
        assert_eq!(cfg.weather_api_key.as_deref(), Some("k"));
        assert_eq!(cfg.weather_provider, Provider::OpenWeatherMap);
        assert_eq!(cfg.weather_url, crate::weather::OPEN_WEATHER_ENDPOINT);
        assert_eq!(cfg.geo_cache_capacity, 16);
        assert_eq!(cfg.shutdown_grace, Duration::from_secs(15));
        assert!(matches!(cfg.tz_table, TableSource::File(ref p) if p.as_os_str() == "/etc/tz.json"));
    }

    #[test]
    fn test_empty_api_key_is_absent() {
        let cfg = config(&[("WEATHER_API_KEY", "  ")]).unwrap();
        assert_eq!(cfg.weather_api_key, None);
    }

    #[test]
    fn test_invalid_number_rejected() {
        let err = config(&[("GEO_CACHE_CAPACITY", "lots")]).unwrap_err();
        assert!(matches!(err, AppError::InvalidConfig { name: "GEO_CACHE_CAPACITY", .. }));
    }

    #[test]
    fn test_unknown_provider_rejected() {
        assert!(config(&[("WEATHER_PROVIDER", "darksky")]).is_err());
    }
}
