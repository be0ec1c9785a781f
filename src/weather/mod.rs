//! Weather provider: wire types, OpenWeather client, message rendering.

pub mod client;
pub mod format;
pub mod types;

pub use client::{ForecastProvider, OpenWeatherClient};
pub use format::render_forecast;
pub use types::{ForecastEntry, ForecastSeries};
