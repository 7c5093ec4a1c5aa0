//! Dashboard display state and the fetch orchestration that feeds it.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::error;

use crate::aggregate::aggregate_by_day;
use crate::client::WeatherSource;
use crate::error::WeatherError;
use crate::localtime::compute_local_time;
use crate::model::{CurrentConditions, DailySummary, ForecastSample};

/// The three pieces of display state, owned in one place and replaced
/// together on each successful search.
///
/// A failed search leaves the previous result on screen; there is no
/// rollback to empty. Searches may overlap: `refresh` takes `&self`, so a
/// second search can start while an earlier one is still in flight. Each
/// search draws a generation number, and only the most recently issued
/// generation may publish its result, so a slow stale response is dropped
/// instead of overwriting a newer one.
#[derive(Debug, Default)]
pub struct Dashboard {
    state: Mutex<DisplayState>,
    /// Generation of the most recently issued search.
    issued: AtomicU64,
}

#[derive(Debug, Clone, Default)]
struct DisplayState {
    current: Option<CurrentConditions>,
    forecast: Vec<ForecastSample>,
    daily: Vec<DailySummary>,
    local_time: Option<String>,
}

struct Snapshot {
    current: CurrentConditions,
    local_time: String,
    forecast: Vec<ForecastSample>,
    daily: Vec<DailySummary>,
}

impl Dashboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Conditions from the last successful search, if any yet.
    pub fn current(&self) -> Option<CurrentConditions> {
        self.lock().current.clone()
    }

    pub fn forecast(&self) -> Vec<ForecastSample> {
        self.lock().forecast.clone()
    }

    pub fn daily(&self) -> Vec<DailySummary> {
        self.lock().daily.clone()
    }

    /// City-local wall clock as of the last successful search.
    pub fn local_time(&self) -> Option<String> {
        self.lock().local_time.clone()
    }

    /// Run one search: current conditions first, then the forecast, then the
    /// per-day aggregation. Any failure is logged and leaves the existing
    /// state untouched; the forecast is never requested when the current
    /// conditions fetch failed.
    pub async fn refresh<S>(&self, source: &S, location: &str) -> Result<(), WeatherError>
    where
        S: WeatherSource + ?Sized,
    {
        let location = location.trim();
        if location.is_empty() {
            return Err(WeatherError::EmptyLocation);
        }

        let generation = self.begin_search();

        let current = match source.fetch_current(location).await {
            Ok(current) => current,
            Err(err) => {
                error!(%location, %err, "current conditions fetch failed, keeping previous results");
                return Err(err);
            }
        };

        let local_time = compute_local_time(current.timezone_offset_secs);

        let forecast = match source.fetch_forecast(location).await {
            Ok(forecast) => forecast,
            Err(err) => {
                error!(%location, %err, "forecast fetch failed, keeping previous results");
                return Err(err);
            }
        };

        let daily = aggregate_by_day(&forecast);

        self.apply(generation, Snapshot { current, local_time, forecast, daily });
        Ok(())
    }

    fn begin_search(&self) -> u64 {
        self.issued.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Publish a completed search. Returns false when a newer search was
    /// issued in the meantime; the stale snapshot is dropped.
    fn apply(&self, generation: u64, snapshot: Snapshot) -> bool {
        let mut state = self.lock();
        if generation != self.issued.load(Ordering::SeqCst) {
            return false;
        }

        state.current = Some(snapshot.current);
        state.local_time = Some(snapshot.local_time);
        state.forecast = snapshot.forecast;
        state.daily = snapshot.daily;
        true
    }

    fn lock(&self) -> MutexGuard<'_, DisplayState> {
        // Display state is plain data; a panic mid-update cannot leave it
        // torn, so a poisoned lock is still safe to reuse.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use tokio::sync::Notify;

    use super::*;

    #[derive(Debug, Default)]
    struct StubSource {
        /// When set, `fetch_current` fails with this HTTP status.
        fail_current_status: Option<u16>,
        current_calls: AtomicUsize,
        forecast_calls: AtomicUsize,
    }

    fn conditions(city: &str) -> CurrentConditions {
        CurrentConditions {
            city: city.to_string(),
            country: "GB".to_string(),
            temperature_c: 14.0,
            condition: "Clouds".to_string(),
            description: "broken clouds".to_string(),
            icon: "04d".to_string(),
            timezone_offset_secs: 0,
        }
    }

    fn sample(temp: f64) -> ForecastSample {
        ForecastSample {
            timestamp: DateTime::parse_from_rfc3339("2024-05-01T12:00:00Z")
                .expect("valid test timestamp")
                .with_timezone(&Utc),
            temperature_c: temp,
            condition: "Clear".to_string(),
            description: "clear sky".to_string(),
            icon: "01d".to_string(),
        }
    }

    #[async_trait]
    impl WeatherSource for StubSource {
        async fn fetch_current(&self, location: &str) -> Result<CurrentConditions, WeatherError> {
            self.current_calls.fetch_add(1, Ordering::SeqCst);
            match self.fail_current_status {
                Some(status) => Err(WeatherError::Http {
                    status,
                    reason: "Not Found".to_string(),
                }),
                None => Ok(conditions(location)),
            }
        }

        async fn fetch_forecast(&self, _location: &str) -> Result<Vec<ForecastSample>, WeatherError> {
            self.forecast_calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![sample(21.0)])
        }
    }

    /// `fetch_current` for the gated location parks until the gate opens,
    /// letting a test hold one search in flight while another completes.
    #[derive(Debug)]
    struct GatedSource {
        gated_location: &'static str,
        gate: Notify,
    }

    #[async_trait]
    impl WeatherSource for GatedSource {
        async fn fetch_current(&self, location: &str) -> Result<CurrentConditions, WeatherError> {
            if location == self.gated_location {
                self.gate.notified().await;
            }
            Ok(conditions(location))
        }

        async fn fetch_forecast(&self, _location: &str) -> Result<Vec<ForecastSample>, WeatherError> {
            Ok(vec![sample(9.0)])
        }
    }

    #[tokio::test]
    async fn successful_refresh_replaces_all_state() {
        let source = StubSource::default();
        let dashboard = Dashboard::new();

        dashboard.refresh(&source, "London").await.expect("refresh should succeed");

        let current = dashboard.current().expect("current conditions should be set");
        assert_eq!(current.city, "London");
        assert_eq!(dashboard.forecast().len(), 1);
        assert_eq!(dashboard.daily().len(), 1);
        assert_eq!(dashboard.daily()[0].avg_temp_c, 21.0);
        assert!(dashboard.local_time().is_some());
    }

    #[tokio::test]
    async fn empty_location_is_rejected_before_any_request() {
        let source = StubSource::default();
        let dashboard = Dashboard::new();

        let err = dashboard.refresh(&source, "   ").await.unwrap_err();

        assert!(matches!(err, WeatherError::EmptyLocation));
        assert_eq!(source.current_calls.load(Ordering::SeqCst), 0);
        assert_eq!(source.forecast_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn failed_current_fetch_skips_forecast_and_keeps_state() {
        let good = StubSource::default();
        let dashboard = Dashboard::new();
        dashboard.refresh(&good, "London").await.expect("seed refresh should succeed");

        let failing = StubSource {
            fail_current_status: Some(404),
            ..StubSource::default()
        };
        let err = dashboard.refresh(&failing, "Nowhereville").await.unwrap_err();

        assert_eq!(err.http_status(), Some(404));
        // The forecast endpoint is only consulted after current conditions
        // arrive.
        assert_eq!(failing.forecast_calls.load(Ordering::SeqCst), 0);

        // The previous successful search is still on display.
        let current = dashboard.current().expect("previous conditions retained");
        assert_eq!(current.city, "London");
        assert_eq!(dashboard.daily().len(), 1);
    }

    #[tokio::test]
    async fn failed_refresh_on_empty_dashboard_leaves_it_empty() {
        let failing = StubSource {
            fail_current_status: Some(502),
            ..StubSource::default()
        };
        let dashboard = Dashboard::new();

        let err = dashboard.refresh(&failing, "London").await.unwrap_err();

        assert_eq!(err.http_status(), Some(502));
        assert!(dashboard.current().is_none());
        assert!(dashboard.daily().is_empty());
        assert!(dashboard.local_time().is_none());
    }

    #[tokio::test]
    async fn slow_stale_search_cannot_overwrite_newer_result() {
        let source = GatedSource {
            gated_location: "Paris",
            gate: Notify::new(),
        };
        let dashboard = Dashboard::new();

        // The first search parks inside fetch_current; the second runs to
        // completion before the gate opens, so the first is stale by the
        // time it publishes.
        let slow = dashboard.refresh(&source, "Paris");
        let fast = async {
            dashboard.refresh(&source, "Berlin").await.expect("newer refresh should succeed");
            source.gate.notify_one();
        };

        let (slow_result, ()) = tokio::join!(slow, fast);
        slow_result.expect("stale refresh still completes cleanly");

        assert_eq!(dashboard.current().map(|c| c.city), Some("Berlin".to_string()));
        assert_eq!(dashboard.local_time().as_deref().map(str::is_empty), Some(false));
    }

    #[test]
    fn stale_generation_is_discarded() {
        let dashboard = Dashboard::new();

        let first = dashboard.begin_search();
        let second = dashboard.begin_search();

        let stale = Snapshot {
            current: conditions("Paris"),
            local_time: "stale".to_string(),
            forecast: vec![sample(10.0)],
            daily: Vec::new(),
        };
        assert!(!dashboard.apply(first, stale));
        assert!(dashboard.current().is_none());

        let fresh = Snapshot {
            current: conditions("Berlin"),
            local_time: "fresh".to_string(),
            forecast: vec![sample(12.0)],
            daily: Vec::new(),
        };
        assert!(dashboard.apply(second, fresh));
        assert_eq!(dashboard.current().map(|c| c.city), Some("Berlin".to_string()));
        assert_eq!(dashboard.local_time().as_deref(), Some("fresh"));
    }
}
