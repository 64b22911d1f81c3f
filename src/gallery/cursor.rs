//! Backward date windows for archive pagination.
//!
//! Each window covers seven calendar days ending the day before the
//! earliest date already seen. The first window ends yesterday, since
//! today's entry may not be published yet.

use chrono::{Days, NaiveDate};

use crate::models::{MediaItem, DATE_FORMAT};

/// Days in one window, inclusive.
pub const WINDOW_DAYS: u64 = 7;

/// Inclusive `[start, end]` date range requested from `/apod/range`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Window of [`WINDOW_DAYS`] days ending on `end`.
    pub fn ending(end: NaiveDate) -> Self {
        let start = end
            .checked_sub_days(Days::new(WINDOW_DAYS - 1))
            .unwrap_or(NaiveDate::MIN);
        Self { start, end }
    }

    /// Number of calendar days covered, inclusive.
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn start_param(&self) -> String {
        self.start.format(DATE_FORMAT).to_string()
    }

    pub fn end_param(&self) -> String {
        self.end.format(DATE_FORMAT).to_string()
    }
}

impl std::fmt::Display for DateWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..{}", self.start_param(), self.end_param())
    }
}

fn day_before(date: NaiveDate) -> NaiveDate {
    date.pred_opt().unwrap_or(NaiveDate::MIN)
}

/// First window: the seven days ending yesterday.
pub fn first_window(today: NaiveDate) -> DateWindow {
    DateWindow::ending(day_before(today))
}

/// Window immediately preceding `earliest`.
pub fn window_before(earliest: NaiveDate) -> DateWindow {
    DateWindow::ending(day_before(earliest))
}

/// Earliest date in a page. Pages are not guaranteed to arrive sorted.
pub fn earliest_date(page: &[MediaItem]) -> Option<NaiveDate> {
    let mut dates: Vec<NaiveDate> = page.iter().map(|item| item.date).collect();
    dates.sort();
    dates.first().copied()
}

/// Window after consuming `page`, or `None` when the page was empty.
pub fn next_window(page: &[MediaItem]) -> Option<DateWindow> {
    earliest_date(page).map(window_before)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MediaType;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, DATE_FORMAT).unwrap()
    }

    fn item(d: &str) -> MediaItem {
        MediaItem {
            date: date(d),
            title: format!("Entry {}", d),
            explanation: String::new(),
            url: format!("https://apod.example/{}.jpg", d),
            hd_url: None,
            media_type: MediaType::Image,
            copyright: None,
        }
    }

    #[test]
    fn test_first_window_ends_yesterday() {
        let window = first_window(date("2024-06-10"));
        assert_eq!(window.start, date("2024-06-03"));
        assert_eq!(window.end, date("2024-06-09"));
        assert_eq!(window.days(), 7);
    }

    #[test]
    fn test_next_window_after_full_week() {
        let page: Vec<MediaItem> = (3..=9).map(|d| item(&format!("2024-06-{:02}", d))).collect();
        let window = next_window(&page).unwrap();
        assert_eq!(window.start, date("2024-05-27"));
        assert_eq!(window.end, date("2024-06-02"));
    }

    #[test]
    fn test_next_window_uses_earliest_of_unsorted_page() {
        let page = vec![item("2024-06-07"), item("2024-06-04"), item("2024-06-09")];
        let window = next_window(&page).unwrap();
        assert_eq!(window.end, date("2024-06-03"));
    }

    #[test]
    fn test_next_window_empty_page() {
        assert_eq!(next_window(&[]), None);
    }

    #[test]
    fn test_windows_are_monotonic_and_seven_days() {
        let mut window = first_window(date("2000-03-02"));
        for _ in 0..60 {
            assert_eq!((window.end - window.start).num_days(), 6);
            // Pretend the backend returned the window in reverse.
            let page: Vec<MediaItem> = window
                .start
                .iter_days()
                .take_while(|d| *d <= window.end)
                .map(|d| item(&d.format(DATE_FORMAT).to_string()))
                .collect::<Vec<_>>()
                .into_iter()
                .rev()
                .collect();
            let next = next_window(&page).unwrap();
            assert!(next.end < window.end);
            assert_eq!(next.end, window.start.pred_opt().unwrap());
            window = next;
        }
    }

    #[test]
    fn test_window_crosses_leap_day() {
        let window = window_before(date("2024-03-03"));
        assert_eq!(window.end, date("2024-03-02"));
        assert_eq!(window.start, date("2024-02-25"));
        assert!(window.contains(date("2024-02-29")));
    }

    #[test]
    fn test_display() {
        let window = first_window(date("2024-06-10"));
        assert_eq!(window.to_string(), "2024-06-03..2024-06-09");
    }
}
