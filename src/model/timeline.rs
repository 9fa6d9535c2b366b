use chrono::{Datelike, Duration, NaiveDate};

use super::task::Task;

pub const MIN_DAY_WIDTH: f32 = 2.0;
pub const MAX_DAY_WIDTH: f32 = 80.0;

/// Controls what scale the timeline header displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimelineScale {
    Days,
    Weeks,
    Months,
}

/// The visible date range, anchored on a week boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimelineWindow {
    /// The leftmost date; always a Monday.
    pub anchor: NaiveDate,
    /// Number of days from the anchor through the padded last date.
    pub total_days: i64,
}

impl TimelineWindow {
    /// Fit the window around every task's start and end, padded by
    /// `padding_days` on each side. An empty task set centers on `fallback`.
    pub fn fit(tasks: &[Task], padding_days: i64, fallback: NaiveDate) -> Self {
        let min = tasks.iter().map(|t| t.start).min().unwrap_or(fallback);
        let max = tasks.iter().map(|t| t.end).max().unwrap_or(fallback);

        let padded_start = min - Duration::days(padding_days);
        let padded_end = max + Duration::days(padding_days);
        let anchor = week_start(padded_start);

        Self {
            anchor,
            total_days: (padded_end - anchor).num_days() + 1,
        }
    }

    /// The last date covered by the window.
    pub fn end(&self) -> NaiveDate {
        self.anchor + Duration::days(self.total_days - 1)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.anchor && date <= self.end()
    }
}

/// Snap a date back to the Monday of its week.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let weekday = date.weekday().num_days_from_monday();
    date - Duration::days(weekday as i64)
}

/// Bidirectional date <-> x transform over a fixed window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimelineMapper {
    pub window: TimelineWindow,
    /// Pixels per day (controls zoom level).
    pub day_width: f32,
}

impl TimelineMapper {
    pub fn new(window: TimelineWindow, day_width: f32) -> Self {
        Self {
            window,
            day_width: day_width.clamp(MIN_DAY_WIDTH, MAX_DAY_WIDTH),
        }
    }

    /// Convert a date to an x-pixel offset from the window anchor.
    pub fn date_to_x(&self, date: NaiveDate) -> f32 {
        let days = (date - self.window.anchor).num_days() as f32;
        days * self.day_width
    }

    /// Convert an x-pixel offset back to a date.
    pub fn x_to_date(&self, x: f32) -> NaiveDate {
        self.window.anchor + Duration::days(self.x_to_days(x))
    }

    /// Round a pixel distance to whole days.
    pub fn x_to_days(&self, x: f32) -> i64 {
        (x / self.day_width).round() as i64
    }

    /// Round an x offset to the nearest whole-day boundary.
    pub fn snap_x(&self, x: f32) -> f32 {
        self.x_to_days(x) as f32 * self.day_width
    }

    /// Total width in pixels for the visible range.
    pub fn total_width(&self) -> f32 {
        self.window.total_days as f32 * self.day_width
    }

    /// Zoom in (increase pixels per day).
    pub fn zoom_in(&mut self) {
        self.day_width = (self.day_width * 1.2).min(MAX_DAY_WIDTH);
    }

    /// Zoom out (decrease pixels per day).
    pub fn zoom_out(&mut self) {
        self.day_width = (self.day_width / 1.2).max(MIN_DAY_WIDTH);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_window_is_padded_and_week_aligned() {
        let tasks = vec![
            Task::new("A", d(2024, 1, 10), d(2024, 1, 12)),
            Task::new("B", d(2024, 1, 11), d(2024, 1, 20)),
        ];
        let window = TimelineWindow::fit(&tasks, 7, d(2000, 1, 1));

        // 2024-01-03 is a Wednesday; the Monday before is 2024-01-01.
        assert_eq!(window.anchor, d(2024, 1, 1));
        assert_eq!(window.anchor.weekday(), chrono::Weekday::Mon);
        assert_eq!(window.end(), d(2024, 1, 27));
        assert!(window.contains(d(2024, 1, 3)));
        assert!(!window.contains(d(2024, 1, 28)));
    }

    #[test]
    fn test_empty_window_uses_fallback() {
        let window = TimelineWindow::fit(&[], 7, d(2024, 6, 12));
        assert!(window.contains(d(2024, 6, 12)));
        assert_eq!(window.anchor, week_start(d(2024, 6, 5)));
    }

    #[test]
    fn test_date_position_inverse() {
        let window = TimelineWindow {
            anchor: d(2024, 1, 1),
            total_days: 400,
        };
        for day_width in [2.0_f32, 7.5, 18.0, 33.3, 80.0] {
            let mapper = TimelineMapper::new(window, day_width);
            for offset in 0..window.total_days {
                let date = window.anchor + Duration::days(offset);
                assert_eq!(mapper.x_to_date(mapper.date_to_x(date)), date);
            }
        }
    }

    #[test]
    fn test_snap_rounds_to_nearest_day() {
        let window = TimelineWindow {
            anchor: d(2024, 1, 1),
            total_days: 30,
        };
        let mapper = TimelineMapper::new(window, 20.0);
        assert_eq!(mapper.snap_x(29.0), 20.0);
        assert_eq!(mapper.snap_x(31.0), 40.0);
        assert_eq!(mapper.snap_x(-11.0), -20.0);
    }

    #[test]
    fn test_zoom_is_clamped() {
        let window = TimelineWindow {
            anchor: d(2024, 1, 1),
            total_days: 30,
        };
        let mut mapper = TimelineMapper::new(window, 79.0);
        mapper.zoom_in();
        assert_eq!(mapper.day_width, MAX_DAY_WIDTH);
        let mut mapper = TimelineMapper::new(window, 2.1);
        mapper.zoom_out();
        assert_eq!(mapper.day_width, MIN_DAY_WIDTH);
    }
}
