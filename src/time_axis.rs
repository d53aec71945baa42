// src/time_axis.rs

// Time window selection and the concise date axis used on every time-height plot.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

use crate::constants::MAX_TIME_TICKS;
use crate::error::{RenderError, Result};

/// Accepted textual forms for explicit time bounds.
const DATETIME_FORMATS: [&str; 5] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y%m%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];
const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y%m%d"];

/// Parses a time bound or timestamp such as `2021-01-01 06:00:00` or `20210101`.
/// Fractional seconds are accepted on the ISO forms.
pub fn parse_time(text: &str) -> Result<NaiveDateTime> {
    let trimmed = text.trim();
    if let Ok(t) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(t);
    }
    if let Ok(t) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S%.f") {
        return Ok(t);
    }
    for fmt in DATETIME_FORMATS.iter() {
        if let Ok(t) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Ok(t);
        }
    }
    for fmt in DATE_FORMATS.iter() {
        if let Ok(d) = NaiveDate::parse_from_str(trimmed, fmt) {
            return Ok(d.and_time(NaiveTime::MIN));
        }
    }
    Err(RenderError::InvalidTime(text.to_string()))
}

/// Inclusive time window a plot is restricted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl TimeWindow {
    /// Full calendar day (00:00:00 to 23:59:59) containing `t`.
    pub fn full_day(t: NaiveDateTime) -> Self {
        let day = t.date();
        Self {
            start: day.and_time(NaiveTime::MIN),
            end: day.and_hms_opt(23, 59, 59).unwrap_or(t),
        }
    }

    /// Window for data whose first timestamp is `first`.
    /// Explicit bounds take precedence over the full-day default, each side independently.
    pub fn resolve(
        first: NaiveDateTime,
        min_time: Option<NaiveDateTime>,
        max_time: Option<NaiveDateTime>,
    ) -> Result<Self> {
        let day = Self::full_day(first);
        let window = Self {
            start: min_time.unwrap_or(day.start),
            end: max_time.unwrap_or(day.end),
        };
        if window.start > window.end {
            return Err(RenderError::InvalidTimeWindow {
                start: window.start.to_string(),
                end: window.end.to_string(),
            });
        }
        Ok(window)
    }

    pub fn contains(&self, t: NaiveDateTime) -> bool {
        t >= self.start && t <= self.end
    }

    pub fn duration_secs(&self) -> f64 {
        (self.end - self.start).num_milliseconds() as f64 / 1000.0
    }

    /// Seconds of `t` relative to the window start (the x coordinate on the plot).
    pub fn offset_secs(&self, t: NaiveDateTime) -> f64 {
        (t - self.start).num_milliseconds() as f64 / 1000.0
    }

    pub fn time_at(&self, offset_secs: f64) -> NaiveDateTime {
        self.start + Duration::milliseconds((offset_secs * 1000.0).round() as i64)
    }
}

// Candidate tick spacings in seconds, smallest first.
const TICK_STEPS_S: [i64; 16] = [
    1, 5, 10, 15, 30, 60, 120, 300, 600, 900, 1800, 3600, 7200, 10800, 21600, 43200,
];
const SECONDS_PER_DAY: i64 = 86_400;

/// Automatic date locator plus concise formatter for a [`TimeWindow`].
///
/// Ticks are placed on round multiples of the chosen step counted from
/// midnight, so a one-day window gets 00:00, 03:00, 06:00, ...
#[derive(Debug, Clone)]
pub struct TimeAxis {
    pub window: TimeWindow,
    pub step_secs: i64,
}

impl TimeAxis {
    pub fn new(window: TimeWindow) -> Self {
        Self::with_max_ticks(window, MAX_TIME_TICKS)
    }

    pub fn with_max_ticks(window: TimeWindow, max_ticks: usize) -> Self {
        let span = window.duration_secs().max(1.0);
        let max_ticks = max_ticks.max(2) as f64;
        let step_secs = TICK_STEPS_S
            .iter()
            .copied()
            .find(|&step| span / step as f64 <= max_ticks - 1.0)
            .unwrap_or_else(|| {
                // Multi-day windows: whole days
                let days = (span / SECONDS_PER_DAY as f64 / (max_ticks - 1.0)).ceil() as i64;
                days.max(1) * SECONDS_PER_DAY
            });
        Self { window, step_secs }
    }

    /// Tick positions as offsets in seconds from the window start.
    pub fn tick_offsets(&self) -> Vec<f64> {
        let midnight = self.window.start.date().and_time(NaiveTime::MIN);
        let from_midnight = (self.window.start - midnight).num_seconds();
        let first = (from_midnight + self.step_secs - 1).div_euclid(self.step_secs) * self.step_secs;
        let mut ticks = Vec::new();
        let mut t = midnight + Duration::seconds(first);
        while t <= self.window.end {
            ticks.push(self.window.offset_secs(t));
            t += Duration::seconds(self.step_secs);
        }
        ticks
    }

    /// Concise tick label: the date at midnight, otherwise the finest unit the step needs.
    pub fn format_tick(&self, offset_secs: f64) -> String {
        let t = self.window.time_at(offset_secs);
        if self.step_secs >= SECONDS_PER_DAY {
            return t.format("%b-%d").to_string();
        }
        if t.hour() == 0 && t.minute() == 0 && t.second() == 0 {
            return t.format("%b-%d").to_string();
        }
        if self.step_secs < 60 {
            t.format("%H:%M:%S").to_string()
        } else {
            t.format("%H:%M").to_string()
        }
    }

    /// Offset text shown once per axis, carrying the part of the date the ticks omit.
    pub fn offset_label(&self) -> String {
        let start = self.window.start;
        let end = self.window.end;
        if self.step_secs >= SECONDS_PER_DAY {
            if start.format("%Y").to_string() == end.format("%Y").to_string() {
                start.format("%Y").to_string()
            } else {
                format!("{}-{}", start.format("%Y"), end.format("%Y"))
            }
        } else if start.date() == end.date() {
            start.format("%Y-%b-%d").to_string()
        } else {
            format!("{} - {}", start.format("%Y-%b-%d"), end.format("%Y-%b-%d"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(text: &str) -> NaiveDateTime {
        parse_time(text).unwrap()
    }

    #[test]
    fn test_parse_time_forms() {
        let expected = NaiveDate::from_ymd_opt(2021, 1, 1)
            .unwrap()
            .and_hms_opt(6, 30, 0)
            .unwrap();
        assert_eq!(ts("2021-01-01 06:30:00"), expected);
        assert_eq!(ts("2021-01-01T06:30:00"), expected);
        assert_eq!(ts("20210101 06:30:00"), expected);
        assert_eq!(ts("2021-01-01 06:30"), expected);
        assert_eq!(ts("2021-01-01T06:30:00.000"), expected);
        assert_eq!(ts("20210101"), ts("2021-01-01 00:00:00"));
    }

    #[test]
    fn test_parse_time_rejects_garbage() {
        assert!(matches!(
            parse_time("yesterday"),
            Err(RenderError::InvalidTime(_))
        ));
    }

    #[test]
    fn test_full_day_window() {
        let w = TimeWindow::full_day(ts("2021-01-01 13:45:10"));
        assert_eq!(w.start, ts("2021-01-01 00:00:00"));
        assert_eq!(w.end, ts("2021-01-01 23:59:59"));
        assert_eq!(w.duration_secs(), 86_399.0);
    }

    #[test]
    fn test_resolve_overrides_each_side() {
        let first = ts("2021-01-01 00:10:00");
        let w = TimeWindow::resolve(first, Some(ts("2021-01-01 02:00:00")), None).unwrap();
        assert_eq!(w.start, ts("2021-01-01 02:00:00"));
        assert_eq!(w.end, ts("2021-01-01 23:59:59"));

        let w = TimeWindow::resolve(first, None, Some(ts("2021-01-01 04:00:00"))).unwrap();
        assert_eq!(w.start, ts("2021-01-01 00:00:00"));
        assert_eq!(w.end, ts("2021-01-01 04:00:00"));
    }

    #[test]
    fn test_resolve_rejects_reversed_window() {
        let first = ts("2021-01-01 00:10:00");
        let result = TimeWindow::resolve(
            first,
            Some(ts("2021-01-01 05:00:00")),
            Some(ts("2021-01-01 04:00:00")),
        );
        assert!(matches!(result, Err(RenderError::InvalidTimeWindow { .. })));
    }

    #[test]
    fn test_full_day_ticks_every_three_hours() {
        let axis = TimeAxis::new(TimeWindow::full_day(ts("2021-01-01 05:00:00")));
        assert_eq!(axis.step_secs, 10_800);
        let ticks = axis.tick_offsets();
        assert_eq!(ticks.len(), 8);
        assert_eq!(ticks[0], 0.0);
        assert_eq!(ticks[1], 10_800.0);
        assert_eq!(axis.format_tick(ticks[0]), "Jan-01");
        assert_eq!(axis.format_tick(ticks[1]), "03:00");
        assert_eq!(axis.offset_label(), "2021-Jan-01");
    }

    #[test]
    fn test_ticks_align_to_round_times() {
        let window = TimeWindow {
            start: ts("2021-01-01 00:07:00"),
            end: ts("2021-01-01 01:07:00"),
        };
        let axis = TimeAxis::new(window);
        assert_eq!(axis.step_secs, 600);
        let labels: Vec<String> = axis
            .tick_offsets()
            .iter()
            .map(|&o| axis.format_tick(o))
            .collect();
        assert_eq!(labels.first().map(String::as_str), Some("00:10"));
        assert_eq!(labels.last().map(String::as_str), Some("01:00"));
    }

    #[test]
    fn test_multi_day_uses_whole_days() {
        let window = TimeWindow {
            start: ts("2021-01-01 00:00:00"),
            end: ts("2021-01-20 00:00:00"),
        };
        let axis = TimeAxis::new(window);
        assert_eq!(axis.step_secs % SECONDS_PER_DAY, 0);
        assert_eq!(axis.format_tick(0.0), "Jan-01");
        assert_eq!(axis.offset_label(), "2021");
    }
}
