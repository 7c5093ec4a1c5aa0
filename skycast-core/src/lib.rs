//! Core library for the `skycast` weather dashboard.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The OpenWeather HTTP client behind a [`WeatherSource`] seam
//! - Forecast aggregation into per-day summaries
//! - The dashboard state container and its fetch orchestration
//!
//! It is used by `skycast-cli`, but can also be reused by other binaries or
//! services.

pub mod aggregate;
pub mod client;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod localtime;
pub mod model;

pub use aggregate::{aggregate_by_day, aggregate_by_day_in};
pub use client::{OpenWeatherClient, WeatherSource};
pub use config::Config;
pub use dashboard::Dashboard;
pub use error::WeatherError;
pub use localtime::{compute_local_time, local_time_at};
pub use model::{CurrentConditions, DailySummary, ForecastSample, icon_url};
