//! Forecast aggregation: collapse 3-hour samples into per-day summaries.

use chrono::{Local, NaiveDate, TimeZone};

use crate::model::{DailySummary, ForecastSample};

struct DayAccumulator {
    date: NaiveDate,
    temp_sum: f64,
    count: usize,
    condition: String,
    description: String,
    icon: String,
}

/// Group samples by the device-local calendar date and average each day's
/// temperatures.
///
/// Grouping deliberately uses the viewer's local date, not the queried
/// city's; the timezone offset delivered with current conditions feeds the
/// local-time display only. Use [`aggregate_by_day_in`] to group against an
/// explicit zone instead.
pub fn aggregate_by_day(samples: &[ForecastSample]) -> Vec<DailySummary> {
    aggregate_by_day_in(samples, &Local)
}

/// Same aggregation against an explicit timezone.
///
/// Output order follows the first occurrence of each date in the input; there
/// is no sort step, so an out-of-order input yields an out-of-order output.
/// The condition, description and icon of a day come from the first sample
/// seen for that date.
pub fn aggregate_by_day_in<Tz: TimeZone>(
    samples: &[ForecastSample],
    tz: &Tz,
) -> Vec<DailySummary> {
    let mut days: Vec<DayAccumulator> = Vec::new();

    for sample in samples {
        let date = sample.timestamp.with_timezone(tz).date_naive();

        // A forecast holds ~40 samples over at most 6 distinct dates, so a
        // linear scan beats a map here and keeps first-seen order for free.
        match days.iter_mut().find(|day| day.date == date) {
            Some(day) => {
                day.temp_sum += sample.temperature_c;
                day.count += 1;
            }
            None => days.push(DayAccumulator {
                date,
                temp_sum: sample.temperature_c,
                count: 1,
                condition: sample.condition.clone(),
                description: sample.description.clone(),
                icon: sample.icon.clone(),
            }),
        }
    }

    days.into_iter()
        .map(|day| DailySummary {
            date: day.date,
            avg_temp_c: day.temp_sum / day.count as f64,
            condition: day.condition,
            description: day.description,
            icon: day.icon,
        })
        .collect()
}
