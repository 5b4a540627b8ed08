//! Day buckets: calendar day → events overlapping that day.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{Days, NaiveDate};
use chrono_tz::Tz;

use crate::event::CalendarEvent;

/// Longest run of days a single event is bucketed under.
pub const MAX_EVENT_DAYS: u64 = 3660;

/// Ordering of events within a single bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BucketOrder {
    /// Keep the order of the input list
    #[default]
    Input,
    /// Stable sort by start time; input order breaks ties
    StartTime,
}

/// Index from local calendar day to the events overlapping it.
///
/// Built in one pass over an event snapshot; never mutated afterwards.
#[derive(Debug, Clone, Default)]
pub struct DateBucketIndex {
    buckets: BTreeMap<NaiveDate, Vec<Arc<CalendarEvent>>>,
}

impl DateBucketIndex {
    pub fn build(events: &[Arc<CalendarEvent>], tz: &Tz, order: BucketOrder) -> Self {
        let mut buckets: BTreeMap<NaiveDate, Vec<Arc<CalendarEvent>>> = BTreeMap::new();

        for event in events {
            for day in event_days(event, tz) {
                buckets.entry(day).or_default().push(Arc::clone(event));
            }
        }

        if order == BucketOrder::StartTime {
            for bucket in buckets.values_mut() {
                bucket.sort_by_key(|e| e.start_time);
            }
        }

        tracing::debug!(events = events.len(), days = buckets.len(), "built day buckets");
        DateBucketIndex { buckets }
    }

    /// Events on `date`, in bucket order. Empty for days without events.
    pub fn events_on(&self, date: NaiveDate) -> &[Arc<CalendarEvent>] {
        self.buckets.get(&date).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }
}

/// `YYYY-MM-DD` key for a day.
pub fn day_key(date: &NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Local days covered by `event`, start day through end day inclusive.
fn event_days(event: &CalendarEvent, tz: &Tz) -> impl Iterator<Item = NaiveDate> + use<> {
    let first = event.start_time.with_timezone(tz).date_naive();
    let mut last = event.end_time.with_timezone(tz).date_naive();

    if last < first {
        tracing::warn!(
            event_id = event.id,
            start = %event.start_time,
            end = %event.end_time,
            "event ends before it starts, bucketing under start day only"
        );
        last = first;
    }

    let cap = first.checked_add_days(Days::new(MAX_EVENT_DAYS - 1)).unwrap_or(NaiveDate::MAX);
    if last > cap {
        tracing::warn!(
            event_id = event.id,
            start = %event.start_time,
            end = %event.end_time,
            "event spans more than {MAX_EVENT_DAYS} days, bucketing its first {MAX_EVENT_DAYS} only"
        );
        last = cap;
    }

    first.iter_days().take_while(move |d| *d <= last)
}
