//! Serde types for the 5-day/3-hour forecast payload.

use serde::Deserialize;

/// Forecast response: an ordered series of 3-hour entries, 40 of them
/// covering roughly five days.
#[derive(Debug, Clone, Deserialize)]
pub struct ForecastSeries {
    #[serde(default)]
    pub cnt: u32,
    #[serde(default)]
    pub list: Vec<ForecastEntry>,
}

/// One timestamped forecast step.
#[derive(Debug, Clone, Deserialize)]
pub struct ForecastEntry {
    /// Unix time of the step, UTC.
    pub dt: i64,
    pub main: ForecastMain,
    #[serde(default)]
    pub weather: Vec<WeatherCondition>,
    #[serde(default)]
    pub wind: Wind,
    /// Precipitation probability, 0.0..=1.0.
    #[serde(default)]
    pub pop: f64,
    pub rain: Option<Rain>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ForecastMain {
    pub temp: f64,
    #[serde(default)]
    pub feels_like: f64,
    #[serde(default)]
    pub humidity: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeatherCondition {
    #[serde(default)]
    pub main: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Wind {
    #[serde(default)]
    pub speed: f64,
    #[serde(default)]
    pub deg: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Rain {
    /// Rain volume for the 3-hour step, mm.
    #[serde(rename = "3h", default)]
    pub three_hour: f64,
}
