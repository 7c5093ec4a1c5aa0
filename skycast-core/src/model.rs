use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Icon assets live on the provider's image host; only the rendering layer
/// fetches them, the core just hands out the URL.
const ICON_HOST: &str = "https://openweathermap.org";

/// Current conditions for a location, as shown in the dashboard header.
///
/// Replaced wholesale on every successful fetch; never patched in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub city: String,
    pub country: String,
    pub temperature_c: f64,
    /// Short condition label, e.g. "Clouds".
    pub condition: String,
    /// Longer description, e.g. "broken clouds".
    pub description: String,
    pub icon: String,
    /// Seconds east of UTC for the queried location. Used for the local-time
    /// display only, not for date grouping.
    pub timezone_offset_secs: i32,
}

/// One timestamped forecast reading. The provider delivers these in
/// chronological order at 3-hour steps over a 5-day horizon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSample {
    pub timestamp: DateTime<Utc>,
    pub temperature_c: f64,
    pub condition: String,
    pub description: String,
    pub icon: String,
}

/// Aggregated single-day view over the samples sharing a calendar date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySummary {
    pub date: NaiveDate,
    /// Arithmetic mean of the day's sample temperatures.
    pub avg_temp_c: f64,
    /// Condition of the first sample seen for this date.
    pub condition: String,
    pub description: String,
    pub icon: String,
}

/// URL of the 2x condition icon for an icon identifier like "04d".
pub fn icon_url(icon: &str) -> String {
    format!("{ICON_HOST}/img/wn/{icon}@2x.png")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn icon_url_follows_provider_pattern() {
        assert_eq!(icon_url("10n"), "https://openweathermap.org/img/wn/10n@2x.png");
    }
}
