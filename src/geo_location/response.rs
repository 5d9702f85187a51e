use serde::{Deserialize, Serialize};

/// Response structure for the ip-api.com JSON endpoint
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct IpApiResponse {
    /// `success` or `fail`; failures still come back as HTTP 200
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub country_code: String,
    #[serde(default, rename = "country")]
    pub country_name: String,
    #[serde(default, rename = "query")]
    pub ip: String,
    #[serde(default)]
    pub lat: f64,
    #[serde(default)]
    pub lon: f64,
    #[serde(default, rename = "region")]
    pub region_code: String,
    #[serde(default)]
    pub region_name: String,
    #[serde(default)]
    pub timezone: String,
}

/// Location resolved for one client address
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct GeoRecord {
    pub city: String,
    pub region_name: String,
    pub region_code: String,
    pub country_name: String,
    pub country_code: String,
    pub latitude: f64,
    pub longitude: f64,
    /// IANA name, e.g. "America/Los_Angeles"
    pub timezone_name: String,
    pub source_ip: String,
}

impl From<IpApiResponse> for GeoRecord {
    fn from(r: IpApiResponse) -> Self {
        Self {
            city: r.city,
            region_name: r.region_name,
            region_code: r.region_code,
            country_name: r.country_name,
            country_code: r.country_code,
            latitude: r.lat,
            longitude: r.lon,
            timezone_name: r.timezone,
            source_ip: r.ip,
        }
    }
}
