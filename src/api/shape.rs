//! Response layouts served by the different API generations.

use std::collections::BTreeMap;

use serde::Serialize;

use super::pipeline::Resolved;
use crate::clock::LocalTime;
use crate::weather::WeatherRecord;

/// The closed set of response layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseShape {
    /// Flat time fields with a four-digit year (`/v0`)
    Legacy,
    /// Flat time fields with a two-digit year (`/` and `/v1`)
    V1,
    /// Nested timestamp, geo and weather blocks (`/v2/me`)
    V2,
}

/// Flat layout shared by `Legacy` and `V1`.
#[derive(Serialize, Debug, PartialEq)]
pub struct FlatResponse {
    pub second: i8,
    pub minute: i8,
    pub hour: i8,
    pub dow: i8,
    pub day: i8,
    pub month: i8,
    pub year: i16,

    pub weather: bool,
    pub temp: f64,
    pub feels_like: f64,
}

#[derive(Serialize, Debug, PartialEq)]
pub struct TimestampBlock {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tz: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tz_data: Option<String>,
    /// Unix epoch seconds
    pub value: i64,
}

#[derive(Serialize, Debug, PartialEq)]
pub struct GeoBlock {
    pub country: String,
    pub region: String,
    pub city: String,
    pub timezone: String,
}

#[derive(Serialize, Debug, PartialEq)]
pub struct MeResponse {
    pub timestamp: TimestampBlock,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geo: Option<GeoBlock>,
    /// Keyed by period; only "current" is produced
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weather: Option<BTreeMap<String, WeatherRecord>>,
}

#[derive(Serialize, Debug, PartialEq)]
#[serde(untagged)]
pub enum ShapedResponse {
    Flat(FlatResponse),
    Me(MeResponse),
}

impl ResponseShape {
    pub fn render(self, resolved: &Resolved) -> ShapedResponse {
        match self {
            ResponseShape::Legacy => ShapedResponse::Flat(flat(resolved, 0)),
            ResponseShape::V1 => ShapedResponse::Flat(flat(resolved, 2000)),
            ResponseShape::V2 => ShapedResponse::Me(me(resolved)),
        }
    }
}

fn flat(resolved: &Resolved, year_base: i16) -> FlatResponse {
    let t = LocalTime::at(resolved.now, &resolved.posix_rule);

    FlatResponse {
        second: t.second,
        minute: t.minute,
        hour: t.hour,
        dow: t.dow,
        day: t.day,
        month: t.month,
        year: t.year - year_base,
        weather: resolved.weather.is_some(),
        temp: resolved.weather.as_ref().map_or(0.0, |w| w.temp),
        feels_like: resolved.weather.as_ref().map_or(0.0, |w| w.feels_like),
    }
}

fn me(resolved: &Resolved) -> MeResponse {
    MeResponse {
        timestamp: TimestampBlock {
            tz: resolved.zone.clone(),
            tz_data: resolved.zone.as_ref().map(|_| resolved.posix_rule.clone()),
            value: resolved.now.as_second(),
        },
        geo: resolved.geo.as_ref().map(|g| GeoBlock {
            country: g.country_name.clone(),
            region: g.region_name.clone(),
            city: g.city.clone(),
            timezone: g.timezone_name.clone(),
        }),
        weather: resolved
            .weather
            .clone()
            .map(|w| BTreeMap::from([("current".to_string(), w)])),
    }
}
