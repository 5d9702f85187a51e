//! Per-request resolution: address, location, zone, weather.

use std::net::SocketAddr;

use axum::http::HeaderMap;
use jiff::Timestamp;
use tracing::{Span, error, info, warn};

use super::Services;
use crate::address;
use crate::geo_location::GeoRecord;
use crate::weather::WeatherRecord;

/// What a request brings to the pipeline.
#[derive(Debug, Default)]
pub struct Inputs {
    pub headers: HeaderMap,
    pub remote: Option<SocketAddr>,
    /// Explicit `?tz=` override
    pub tz_override: Option<String>,
}

/// Everything gathered for one request. Each optional part is `None` when
/// its source failed.
#[derive(Debug, Clone)]
pub struct Resolved {
    pub now: Timestamp,
    /// IANA zone used for time fields, when one is known
    pub zone: Option<String>,
    /// POSIX rule for `zone`, or `UTC0`
    pub posix_rule: String,
    pub geo: Option<GeoRecord>,
    pub weather: Option<WeatherRecord>,
}

/// Runs the pipeline. Never fails: every downstream error is logged and the
/// corresponding part is left out.
pub async fn resolve(services: &Services, inputs: Inputs) -> Resolved {
    let now = Timestamp::now();

    let addr = match address::extract(&inputs.headers, inputs.remote) {
        Ok(addr) => {
            Span::current().record("remote", addr.as_str());
            Some(addr)
        }
        Err(e) => {
            error!(error = %e, "remote address get failed");
            None
        }
    };

    let geo = match &addr {
        Some(addr) => match services.geo.resolve(addr).await {
            Ok(geo) => {
                info!(
                    country = %geo.country_name,
                    region = %geo.region_name,
                    city = %geo.city,
                    tz = %geo.timezone_name,
                    "geoip resolved"
                );
                Some(geo)
            }
            Err(e) => {
                warn!(error = %e, "geoip get failed");
                None
            }
        },
        None => None,
    };

    let zone = inputs
        .tz_override
        .filter(|tz| !tz.is_empty())
        .or_else(|| geo.as_ref().map(|g| g.timezone_name.clone()))
        .filter(|tz| !tz.is_empty());
    let posix_rule = services.tz.to_posix(zone.as_deref().unwrap_or_default());

    // Weather is only attempted for a located client
    let weather = match (&addr, &geo) {
        (Some(addr), Some(geo)) => match services.weather.current(addr, Some(geo)).await {
            Ok(weather) => Some(weather),
            Err(e) => {
                error!(error = %e, "weather get failed");
                None
            }
        },
        _ => None,
    };

    Resolved {
        now,
        zone,
        posix_rule,
        geo,
        weather,
    }
}
