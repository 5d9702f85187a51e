use serde::{Deserialize, Serialize};

/// Response structure for the WeatherAPI current weather endpoint
/// Represents the JSON structure returned by api.weatherapi.com/v1/current.json
#[derive(Deserialize, Debug)]
pub struct WeatherApiResponse {
    /// Current weather conditions
    pub current: WeatherApiCurrent,
}

#[derive(Deserialize, Debug)]
pub struct WeatherApiCurrent {
    /// Temperature in Celsius
    pub temp_c: f64,
    #[serde(rename = "feelslike_c")]
    pub feels_like_c: f64,
    #[serde(default)]
    pub pressure_mb: f64,
    /// Humidity percentage (0-100)
    #[serde(default)]
    pub humidity: f64,
    pub condition: WeatherApiCondition,
}

/// Weather condition description
#[derive(Deserialize, Debug)]
pub struct WeatherApiCondition {
    /// Human-readable description of the weather condition (e.g., "Partly cloudy")
    #[serde(default)]
    pub text: String,
    /// Protocol-relative icon URL
    #[serde(default)]
    pub icon: String,
}

/// Response structure for the OpenWeatherMap current weather endpoint
#[derive(Deserialize, Debug)]
pub struct OpenWeatherResponse {
    pub main: OpenWeatherMain,
    #[serde(default)]
    pub weather: Vec<OpenWeatherCondition>,
}

#[derive(Deserialize, Debug)]
pub struct OpenWeatherMain {
    pub temp: f64,
    pub feels_like: f64,
    #[serde(default)]
    pub pressure: f64,
    #[serde(default)]
    pub humidity: f64,
}

#[derive(Deserialize, Debug)]
pub struct OpenWeatherCondition {
    #[serde(default)]
    pub description: String,
    /// Icon code such as "04d"
    #[serde(default)]
    pub icon: String,
}

/// Current conditions, normalised across providers
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct WeatherRecord {
    pub title: String,
    /// Temperature in Celsius
    pub temp: f64,
    pub feels_like: f64,
    pub pressure: f64,
    pub humidity: f64,
    #[serde(rename = "icon")]
    pub icon_url: String,
}

impl From<WeatherApiResponse> for WeatherRecord {
    fn from(r: WeatherApiResponse) -> Self {
        let current = r.current;
        Self {
            title: current.condition.text,
            temp: current.temp_c,
            feels_like: current.feels_like_c,
            pressure: current.pressure_mb,
            humidity: current.humidity,
            icon_url: current.condition.icon,
        }
    }
}

impl From<OpenWeatherResponse> for WeatherRecord {
    fn from(r: OpenWeatherResponse) -> Self {
        let condition = r.weather.into_iter().next();
        Self {
            title: condition
                .as_ref()
                .map(|c| c.description.clone())
                .unwrap_or_default(),
            temp: r.main.temp,
            feels_like: r.main.feels_like,
            pressure: r.main.pressure,
            humidity: r.main.humidity,
            icon_url: condition.map(|c| c.icon).unwrap_or_default(),
        }
    }
}
