//! Formatting helpers for rendered dive values
//!
//! Times are kept as whole seconds and rendered as `minutes:seconds`, numbers
//! are rendered with a fixed number of decimals.

use crate::decoder::DiveDateTime;

/// Render whole seconds as `m:ss`, e.g. 125 → `"2:05"`
pub fn format_clock(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// Render a dive duration in seconds as `m:ss min`
pub fn format_duration(seconds: u32) -> String {
    format!("{} min", format_clock(seconds))
}

/// Render the date part as `YYYY-MM-DD`
pub fn format_date(datetime: &DiveDateTime) -> String {
    format!(
        "{:04}-{:02}-{:02}",
        datetime.year, datetime.month, datetime.day
    )
}

/// Render the time-of-day part as `HH:MM:SS`
pub fn format_time_of_day(datetime: &DiveDateTime) -> String {
    format!(
        "{:02}:{:02}:{:02}",
        datetime.hour, datetime.minute, datetime.second
    )
}

/// Render a number with a fixed count of decimals
///
/// Returns `None` for NaN and infinities, which have no JSON representation.
pub fn format_fixed(value: f64, decimals: usize) -> Option<String> {
    if value.is_finite() {
        Some(format!("{value:.decimals$}"))
    } else {
        None
    }
}

/// Depth in metres, two decimals
pub fn format_depth(depth: f64) -> Option<String> {
    format_fixed(depth, 2)
}

/// Temperature in degrees Celsius, one decimal
pub fn format_temperature(temperature: f64) -> Option<String> {
    format_fixed(temperature, 1)
}

/// Oxygen partial pressure in bar, two decimals
pub fn format_ppo2(ppo2: f64) -> Option<String> {
    format_fixed(ppo2, 2)
}
