//! Current-conditions fetcher against Open-Meteo.
//!
//! Free endpoint, no API key. Consumed alongside the speed limit when
//! assembling pipeline snapshots; not part of the resolution engine itself.

use anyhow::{Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::NetworkError;
use crate::models::GeoPoint;

const OPEN_METEO_URL: &str = "https://api.open-meteo.com/v1/forecast";

/// Current conditions at a location
#[derive(Debug, Clone, Copy, Serialize)]
pub struct WeatherSample {
    pub temperature_c: f64,
    pub humidity_pct: f64,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    current: Option<CurrentConditions>,
}

#[derive(Debug, Deserialize)]
struct CurrentConditions {
    temperature_2m: Option<f64>,
    relative_humidity_2m: Option<f64>,
}

/// Fetches current temperature and humidity for a GPS fix
pub struct WeatherFetcher {
    client: Client,
}

impl WeatherFetcher {
    pub fn new(timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self { client })
    }

    pub async fn fetch(&self, point: &GeoPoint) -> Result<WeatherSample, NetworkError> {
        let mut params = vec![
            ("latitude", point.lat.to_string()),
            ("longitude", point.lon.to_string()),
            (
                "current",
                "temperature_2m,relative_humidity_2m".to_string(),
            ),
            ("timezone", "auto".to_string()),
        ];
        // Elevation override sharpens the model's lapse-rate correction
        if let Some(altitude) = point.altitude {
            params.push(("elevation", altitude.to_string()));
        }

        let response = self.client.get(OPEN_METEO_URL).query(&params).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(NetworkError::Status {
                status,
                endpoint: "open-meteo/v1/forecast".to_string(),
            });
        }

        let body: ForecastResponse = response.json().await?;
        let current = body.current.ok_or_else(|| NetworkError::Decode {
            endpoint: "open-meteo/v1/forecast".to_string(),
            message: "missing current conditions block".to_string(),
        })?;

        match (current.temperature_2m, current.relative_humidity_2m) {
            (Some(temperature_c), Some(humidity_pct)) => {
                debug!(temperature_c, humidity_pct, "weather sample fetched");
                Ok(WeatherSample {
                    temperature_c,
                    humidity_pct,
                })
            }
            _ => Err(NetworkError::Decode {
                endpoint: "open-meteo/v1/forecast".to_string(),
                message: "missing temperature or humidity field".to_string(),
            }),
        }
    }
}
