//! Focus date arithmetic.
//!
//! Month shifts clamp to the last valid day of the target month, so
//! Jan 31 + 1 month is Feb 28 (or 29) and stepping back lands on Jan 28.
//! Week and day shifts always round-trip exactly.

use chrono::{DateTime, Days, Months, NaiveDate};
use chrono_tz::Tz;

use crate::granularity::{Direction, Granularity};

/// Shift `focus` by one unit of `granularity`.
///
/// Returns `None` only when the result falls outside chrono's date range.
pub fn shift(focus: NaiveDate, granularity: Granularity, direction: Direction) -> Option<NaiveDate> {
    match (granularity, direction) {
        (Granularity::Month, Direction::Next) => focus.checked_add_months(Months::new(1)),
        (Granularity::Month, Direction::Previous) => focus.checked_sub_months(Months::new(1)),
        (Granularity::Week, Direction::Next) => focus.checked_add_days(Days::new(7)),
        (Granularity::Week, Direction::Previous) => focus.checked_sub_days(Days::new(7)),
        (Granularity::Day, Direction::Next) => focus.succ_opt(),
        (Granularity::Day, Direction::Previous) => focus.pred_opt(),
    }
}

/// Parse jump-to input: `YYYY-MM-DD`, or an RFC 3339 timestamp whose
/// date is taken in `tz`.
pub fn parse_jump_date(input: &str, tz: &Tz) -> Option<NaiveDate> {
    let input = input.trim();
    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return Some(date);
    }
    DateTime::parse_from_rfc3339(input)
        .ok()
        .map(|dt| dt.with_timezone(tz).date_naive())
}
