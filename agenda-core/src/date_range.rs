//! Visible date window for a focus date and granularity.

use std::fmt;

use chrono::{DateTime, Datelike, Days, NaiveDate, SecondsFormat, TimeZone, Utc, Weekday};
use chrono_tz::Tz;

use crate::granularity::Granularity;

/// The inclusive range of days currently rendered.
///
/// Both `start` and `end` are inclusive dates. The instant form used for
/// queries (`query_bounds`) is half-open: `[start 00:00, end+1 00:00)` in
/// the display timezone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VisibleRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl VisibleRange {
    /// Derive the window for `focus` under `granularity`.
    pub fn for_focus(focus: NaiveDate, granularity: Granularity, week_start: Weekday) -> Self {
        match granularity {
            Granularity::Month => {
                let start = focus.with_day(1).unwrap_or(focus);
                let end = last_day_of_month(focus);
                VisibleRange { start, end }
            }
            Granularity::Week => {
                let start = start_of_week(focus, week_start);
                let end = start.checked_add_days(Days::new(6)).unwrap_or(start);
                VisibleRange { start, end }
            }
            Granularity::Day => VisibleRange {
                start: focus,
                end: focus,
            },
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Number of days in the window.
    pub fn len(&self) -> usize {
        self.days().count()
    }

    pub fn is_empty(&self) -> bool {
        self.start > self.end
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + use<> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }

    /// Half-open instant bounds in UTC for fetching events of this window.
    pub fn query_bounds(&self, tz: &Tz) -> (DateTime<Utc>, DateTime<Utc>) {
        let after_end = self.end.succ_opt().unwrap_or(self.end);
        (start_of_day(self.start, tz), start_of_day(after_end, tz))
    }

    /// `query_bounds` as RFC 3339 strings.
    pub fn query_params(&self, tz: &Tz) -> (String, String) {
        let (start, end) = self.query_bounds(tz);
        (
            start.to_rfc3339_opts(SecondsFormat::Secs, true),
            end.to_rfc3339_opts(SecondsFormat::Secs, true),
        )
    }
}

impl fmt::Display for VisibleRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} .. {}", self.start, self.end)
    }
}

/// The first day of the week containing `date`.
pub fn start_of_week(date: NaiveDate, week_start: Weekday) -> NaiveDate {
    let offset = weekday_offset(date.weekday(), week_start);
    date.checked_sub_days(Days::new(offset as u64)).unwrap_or(date)
}

/// Position of `weekday` in a week beginning on `week_start` (0..=6).
pub fn weekday_offset(weekday: Weekday, week_start: Weekday) -> u32 {
    (7 + weekday.num_days_from_monday() - week_start.num_days_from_monday()) % 7
}

pub fn last_day_of_month(date: NaiveDate) -> NaiveDate {
    let first = date.with_day(1).unwrap_or(date);
    first
        .checked_add_months(chrono::Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(date)
}

/// Local midnight of `date` in `tz`, as UTC.
///
/// When midnight does not exist (DST gap) the earliest valid mapping is used,
/// falling back to treating the wall time as UTC.
fn start_of_day(date: NaiveDate, tz: &Tz) -> DateTime<Utc> {
    let midnight = date.and_time(chrono::NaiveTime::MIN);
    tz.from_local_datetime(&midnight)
        .earliest()
        .or_else(|| {
            (1..=3).find_map(|h| {
                tz.from_local_datetime(&(midnight + chrono::Duration::hours(h)))
                    .earliest()
            })
        })
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| midnight.and_utc())
}
