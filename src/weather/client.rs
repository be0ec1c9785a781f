//! OpenWeather client — fetches the 5-day/3-hour forecast for a coordinate.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

use crate::error::WeatherError;
use crate::weather::types::ForecastSeries;

/// The forecast source the scheduler and `/forecast` command query.
/// `OpenWeatherClient` is the production implementation; tests substitute an
/// in-memory fake.
#[async_trait]
pub trait ForecastProvider: Send + Sync {
    async fn get_forecast(&self, lat: f64, lon: f64) -> Result<ForecastSeries, WeatherError>;
}

const API_ADDRESS: &str = "https://api.openweathermap.org";

pub struct OpenWeatherClient {
    token: SecretString,
    client: reqwest::Client,
}

impl OpenWeatherClient {
    pub fn new(token: SecretString) -> Self {
        Self {
            token,
            client: reqwest::Client::new(),
        }
    }

    fn forecast_url(&self, lat: f64, lon: f64) -> String {
        format!(
            "{API_ADDRESS}/data/2.5/forecast?lat={lat}&lon={lon}&units=metric&appid={}",
            self.token.expose_secret()
        )
    }
}

#[async_trait]
impl ForecastProvider for OpenWeatherClient {
    async fn get_forecast(&self, lat: f64, lon: f64) -> Result<ForecastSeries, WeatherError> {
        let resp = self
            .client
            .get(self.forecast_url(lat, lon))
            .send()
            .await
            .map_err(|e| WeatherError::RequestFailed(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(WeatherError::RequestFailed(format!(
                "forecast returned {}",
                resp.status()
            )));
        }

        resp.json()
            .await
            .map_err(|e| WeatherError::MalformedPayload(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forecast_url_carries_coordinates_and_units() {
        let client = OpenWeatherClient::new(SecretString::from("k3y"));
        let url = client.forecast_url(45.67, 32.312);
        assert!(url.starts_with("https://api.openweathermap.org/data/2.5/forecast?"));
        assert!(url.contains("lat=45.67"));
        assert!(url.contains("lon=32.312"));
        assert!(url.contains("units=metric"));
        assert!(url.contains("appid=k3y"));
    }
}
