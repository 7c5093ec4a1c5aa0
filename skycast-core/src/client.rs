//! HTTP client for the OpenWeather current-conditions and forecast
//! endpoints.

use std::fmt::Debug;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::WeatherError;
use crate::model::{CurrentConditions, ForecastSample};

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Source of weather data for a free-text location query.
///
/// The dashboard orchestration talks to this trait rather than the concrete
/// client, so tests can drive it with a stub.
#[async_trait]
pub trait WeatherSource: Send + Sync + Debug {
    async fn fetch_current(&self, location: &str) -> Result<CurrentConditions, WeatherError>;

    async fn fetch_forecast(&self, location: &str) -> Result<Vec<ForecastSample>, WeatherError>;
}

#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherClient {
    /// Client against the production endpoint with the default timeout.
    pub fn new(api_key: String) -> Result<Self, WeatherError> {
        Self::with_options(api_key, DEFAULT_BASE_URL.to_string(), DEFAULT_TIMEOUT)
    }

    /// Client with explicit base URL and request timeout. Tests point the
    /// base URL at a local mock server.
    pub fn with_options(
        api_key: String,
        base_url: String,
        timeout: Duration,
    ) -> Result<Self, WeatherError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { api_key, base_url, http })
    }

    async fn get_body(&self, endpoint: &str, location: &str) -> Result<String, WeatherError> {
        let url = format!("{}/{}", self.base_url, endpoint);
        debug!(%endpoint, %location, "requesting weather data");

        let res = self
            .http
            .get(&url)
            .query(&[
                ("q", location),
                ("units", "metric"),
                ("APPID", self.api_key.as_str()),
            ])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            warn!(
                %endpoint,
                status = status.as_u16(),
                body = %truncate_body(&body),
                "weather request rejected"
            );
            return Err(WeatherError::Http {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("unknown status").to_string(),
            });
        }

        Ok(body)
    }
}

#[async_trait]
impl WeatherSource for OpenWeatherClient {
    async fn fetch_current(&self, location: &str) -> Result<CurrentConditions, WeatherError> {
        let body = self.get_body("weather", location).await?;
        let parsed: OwCurrentResponse = serde_json::from_str(&body)?;
        debug!(city = %parsed.name, "decoded current conditions");

        let weather = primary_weather(&parsed.weather);

        Ok(CurrentConditions {
            city: parsed.name,
            country: parsed.sys.country,
            temperature_c: parsed.main.temp,
            condition: weather.main,
            description: weather.description,
            icon: weather.icon,
            timezone_offset_secs: parsed.timezone,
        })
    }

    async fn fetch_forecast(&self, location: &str) -> Result<Vec<ForecastSample>, WeatherError> {
        let body = self.get_body("forecast", location).await?;
        let parsed: OwForecastResponse = serde_json::from_str(&body)?;
        debug!(samples = parsed.list.len(), "decoded forecast");

        let samples = parsed
            .list
            .into_iter()
            .map(|entry| {
                let weather = primary_weather(&entry.weather);
                ForecastSample {
                    timestamp: unix_to_utc(entry.dt),
                    temperature_c: entry.main.temp,
                    condition: weather.main,
                    description: weather.description,
                    icon: weather.icon,
                }
            })
            .collect();

        Ok(samples)
    }
}

#[derive(Debug, Clone, Deserialize)]
struct OwMain {
    temp: f64,
}

#[derive(Debug, Clone, Deserialize)]
struct OwWeather {
    main: String,
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwSys {
    country: String,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    sys: OwSys,
    main: OwMain,
    weather: Vec<OwWeather>,
    timezone: i32,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt: i64,
    main: OwMain,
    weather: Vec<OwWeather>,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    list: Vec<OwForecastEntry>,
}

/// The provider always sends at least one `weather` element, but the array
/// shape allows zero; fall back to a placeholder rather than failing the
/// whole response.
fn primary_weather(weather: &[OwWeather]) -> OwWeather {
    weather.first().cloned().unwrap_or_else(|| OwWeather {
        main: "Unknown".to_string(),
        description: "Unknown".to_string(),
        icon: String::new(),
    })
}

fn unix_to_utc(ts: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(ts, 0).unwrap_or_else(Utc::now)
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() <= MAX {
        return body.to_string();
    }
    // The cut must land on a char boundary or slicing panics mid-codepoint.
    let mut cut = MAX;
    while !body.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}...", &body[..cut])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unix_to_utc_converts_known_timestamp() {
        // 2024-05-01T12:00:00Z
        let dt = unix_to_utc(1_714_564_800);
        assert_eq!(dt.to_rfc3339(), "2024-05-01T12:00:00+00:00");
    }

    #[test]
    fn primary_weather_falls_back_on_empty_array() {
        let weather = primary_weather(&[]);
        assert_eq!(weather.main, "Unknown");
        assert!(weather.icon.is_empty());
    }

    #[test]
    fn truncate_body_caps_long_payloads() {
        let long = "x".repeat(500);
        let truncated = truncate_body(&long);
        assert_eq!(truncated.len(), 203);
        assert!(truncated.ends_with("..."));
    }

    #[test]
    fn truncate_body_backs_off_to_a_char_boundary() {
        // 202 bytes, with the euro sign spanning bytes 199..202.
        let body = format!("{}\u{20ac}", "x".repeat(199));
        let truncated = truncate_body(&body);
        assert_eq!(truncated, format!("{}...", "x".repeat(199)));
    }

    #[test]
    fn truncate_body_handles_fully_multibyte_payloads() {
        // 300 bytes of 3-byte chars; byte 200 is mid-codepoint.
        let body = "\u{20ac}".repeat(100);
        let truncated = truncate_body(&body);
        assert_eq!(truncated, format!("{}...", "\u{20ac}".repeat(66)));
    }
}
