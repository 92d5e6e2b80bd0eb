use std::time::{Duration, Instant};

use moka::future::Cache;
use reqwest::Client;

use crate::config::{mask_secret, OpenWeatherConfig};
use crate::error::{AppError, AppResult};

// ============================================================================
// OpenWeather Client - Current Conditions Near a Lake
// ============================================================================

/// Coordinates as given by the caller; used verbatim as the cache key
#[derive(Debug, Clone, Hash, Eq, PartialEq)]
struct CoordKey {
    lat: String,
    lon: String,
}

#[derive(Clone)]
pub struct WeatherClient {
    client: Client,
    api_key: String,
    base_url: String,
    cache: Cache<CoordKey, serde_json::Value>,
}

impl WeatherClient {
    pub fn new(config: &OpenWeatherConfig) -> AppResult<Self> {
        println!(
            "[WEATHER] Initializing OpenWeather client with API key: {}",
            mask_secret(&config.api_key)
        );
        tracing::debug!(base_url = %config.base_url, "Creating OpenWeather client");

        let cache = Cache::builder()
            .max_capacity(config.cache_capacity)
            .time_to_live(Duration::from_secs(config.cache_ttl_seconds))
            .build();

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build OpenWeather HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            cache,
        })
    }

    /// Current weather at `lat`/`lon` in metric units, returned as the
    /// upstream JSON document.
    pub async fn current(&self, lat: &str, lon: &str) -> AppResult<serde_json::Value> {
        let key = CoordKey {
            lat: lat.to_string(),
            lon: lon.to_string(),
        };

        if let Some(cached) = self.cache.get(&key).await {
            tracing::debug!(lat = %lat, lon = %lon, "Weather served from cache");
            return Ok(cached);
        }

        let start = Instant::now();
        let url = format!("{}/data/2.5/weather", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("lat", lat),
                ("lon", lon),
                ("units", "metric"),
                ("appid", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "OpenWeather request failed");
                AppError::ExternalApi(format!("OpenWeather request failed: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "OpenWeather API error");
            return Err(AppError::ExternalApi(format!(
                "OpenWeather API error {}: {}",
                status, body
            )));
        }

        let weather: serde_json::Value = response.json().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to parse OpenWeather response");
            AppError::ExternalApi(format!("Failed to parse OpenWeather response: {}", e))
        })?;

        tracing::info!(
            lat = %lat,
            lon = %lon,
            duration_ms = %start.elapsed().as_millis(),
            "Fetched current weather"
        );

        self.cache.insert(key, weather.clone()).await;
        Ok(weather)
    }
}
