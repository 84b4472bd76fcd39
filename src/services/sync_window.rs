use chrono::{DateTime, Datelike, Duration, TimeZone, Utc};

/// Half-open time range `[start, end)` a sync run covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl SyncWindow {
    /// Trailing window ending now, used by the ad-hoc sync.
    pub fn trailing_days(now: DateTime<Utc>, days: i64) -> Self {
        Self {
            start: now - Duration::days(days),
            end: now,
        }
    }

    /// Previous full calendar month, used by the monthly sync. Also returns
    /// the (year, month) the aggregate revenue row is filed under.
    pub fn previous_month(now: DateTime<Utc>) -> (Self, i32, u32) {
        let (year, month) = if now.month() == 1 {
            (now.year() - 1, 12)
        } else {
            (now.year(), now.month() - 1)
        };

        let start = Utc
            .with_ymd_and_hms(year, month, 1, 0, 0, 0)
            .single()
            .expect("first of month is always a valid timestamp");
        let end = Utc
            .with_ymd_and_hms(now.year(), now.month(), 1, 0, 0, 0)
            .single()
            .expect("first of month is always a valid timestamp");

        (Self { start, end }, year, month)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_window_spans_requested_days() {
        let now = Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap();
        let w = SyncWindow::trailing_days(now, 30);
        assert_eq!(w.end, now);
        assert_eq!(w.end - w.start, Duration::days(30));
    }

    #[test]
    fn previous_month_in_mid_year() {
        let now = Utc.with_ymd_and_hms(2025, 6, 3, 4, 0, 0).unwrap();
        let (w, year, month) = SyncWindow::previous_month(now);
        assert_eq!((year, month), (2025, 5));
        assert_eq!(w.start, Utc.with_ymd_and_hms(2025, 5, 1, 0, 0, 0).unwrap());
        assert_eq!(w.end, Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn previous_month_wraps_the_year_boundary() {
        let now = Utc.with_ymd_and_hms(2026, 1, 2, 0, 30, 0).unwrap();
        let (w, year, month) = SyncWindow::previous_month(now);
        assert_eq!((year, month), (2025, 12));
        assert_eq!(w.start, Utc.with_ymd_and_hms(2025, 12, 1, 0, 0, 0).unwrap());
        assert_eq!(w.end, Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap());
    }
}
