//! The navigable calendar view.
//!
//! `CalendarView` holds the focus date, granularity and display timezone,
//! plus the current event snapshot and its day index. Hosts feed it events
//! and react to two callbacks: visible range changes (to re-fetch) and
//! event selection (to show details).

use std::sync::Arc;

use chrono::{NaiveDate, Weekday};
use chrono_tz::Tz;

use crate::bucket::{BucketOrder, DateBucketIndex};
use crate::date_range::VisibleRange;
use crate::event::{CalendarEvent, RawEvent};
use crate::grid::{CalendarGrid, DayDetail};
use crate::granularity::{Direction, Granularity};
use crate::navigation;

pub type RangeListener = Box<dyn FnMut(&VisibleRange)>;
pub type SelectListener = Box<dyn FnMut(&CalendarEvent)>;

/// Construction options for a `CalendarView`.
#[derive(Debug, Clone)]
pub struct ViewOptions {
    pub granularity: Granularity,
    pub week_start: Weekday,
    pub timezone: Tz,
    pub bucket_order: BucketOrder,
    /// Used to flag the current day in grids
    pub today: NaiveDate,
}

pub struct CalendarView {
    focus: NaiveDate,
    granularity: Granularity,
    week_start: Weekday,
    timezone: Tz,
    bucket_order: BucketOrder,
    today: NaiveDate,
    events: Vec<Arc<CalendarEvent>>,
    index: DateBucketIndex,
    on_range_change: Option<RangeListener>,
    on_select: Option<SelectListener>,
}

impl CalendarView {
    pub fn new(options: ViewOptions, focus: NaiveDate) -> Self {
        CalendarView {
            focus,
            granularity: options.granularity,
            week_start: options.week_start,
            timezone: options.timezone,
            bucket_order: options.bucket_order,
            today: options.today,
            events: Vec::new(),
            index: DateBucketIndex::default(),
            on_range_change: None,
            on_select: None,
        }
    }

    pub fn on_visible_range_change(&mut self, listener: impl FnMut(&VisibleRange) + 'static) {
        self.on_range_change = Some(Box::new(listener));
    }

    pub fn on_select(&mut self, listener: impl FnMut(&CalendarEvent) + 'static) {
        self.on_select = Some(Box::new(listener));
    }

    pub fn focus(&self) -> NaiveDate {
        self.focus
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    pub fn timezone(&self) -> &Tz {
        &self.timezone
    }

    pub fn week_start(&self) -> Weekday {
        self.week_start
    }

    pub fn visible_range(&self) -> VisibleRange {
        VisibleRange::for_focus(self.focus, self.granularity, self.week_start)
    }

    /// Fire the range listener for the current window (initial fetch).
    pub fn request_visible_range(&mut self) {
        let range = self.visible_range();
        self.emit_range(&range);
    }

    pub fn set_granularity(&mut self, granularity: Granularity) {
        self.navigate(|view| {
            view.granularity = granularity;
            true
        });
    }

    /// Move the focus date one unit of the current granularity.
    pub fn advance(&mut self, direction: Direction) {
        self.navigate(|view| match navigation::shift(view.focus, view.granularity, direction) {
            Some(focus) => {
                view.focus = focus;
                true
            }
            None => {
                tracing::warn!(focus = %view.focus, ?direction, "cannot move focus past the supported date range");
                false
            }
        });
    }

    /// Set the focus date from user input. Returns false, changing nothing,
    /// when the input is not a date.
    pub fn jump_to(&mut self, input: &str) -> bool {
        let Some(date) = navigation::parse_jump_date(input, &self.timezone) else {
            tracing::debug!(input, "ignoring unparseable jump date");
            return false;
        };
        self.navigate(|view| {
            view.focus = date;
            true
        });
        true
    }

    pub fn set_week_start(&mut self, week_start: Weekday) {
        self.navigate(|view| {
            view.week_start = week_start;
            true
        });
    }

    /// Change the display timezone. Day keys depend on it, so the index is rebuilt.
    pub fn set_timezone(&mut self, timezone: Tz) {
        if self.timezone != timezone {
            self.timezone = timezone;
            self.rebuild_index();
        }
    }

    /// Replace the snapshot from raw records, dropping malformed ones.
    /// Returns the number of records dropped.
    pub fn set_events(&mut self, raw: Vec<RawEvent>) -> usize {
        let total = raw.len();
        let events: Vec<CalendarEvent> = raw
            .into_iter()
            .filter_map(|record| match CalendarEvent::try_from(record) {
                Ok(event) => Some(event),
                Err(err) => {
                    tracing::warn!("dropping event: {err}");
                    None
                }
            })
            .collect();

        let dropped = total - events.len();
        self.replace_events(events);
        dropped
    }

    pub fn replace_events(&mut self, events: Vec<CalendarEvent>) {
        self.events = events.into_iter().map(Arc::new).collect();
        self.rebuild_index();
    }

    pub fn events(&self) -> &[Arc<CalendarEvent>] {
        &self.events
    }

    pub fn events_on(&self, date: NaiveDate) -> &[Arc<CalendarEvent>] {
        self.index.events_on(date)
    }

    pub fn index(&self) -> &DateBucketIndex {
        &self.index
    }

    pub fn grid(&self) -> CalendarGrid {
        CalendarGrid::build(
            self.granularity,
            self.visible_range(),
            self.week_start,
            self.focus,
            self.today,
            &self.index,
        )
    }

    /// All events of `date`, e.g. behind a day cell's "+N more".
    pub fn day_detail(&self, date: NaiveDate) -> DayDetail {
        DayDetail {
            date,
            events: self.index.events_on(date).to_vec(),
        }
    }

    /// Pick a single event from the snapshot and notify the selection listener.
    pub fn select_event(&mut self, id: i64) -> Option<Arc<CalendarEvent>> {
        let event = self.events.iter().find(|e| e.id == id).cloned()?;
        if let Some(listener) = self.on_select.as_mut() {
            listener(&event);
        }
        Some(event)
    }

    /// Apply a navigation step and fire the range listener once if the window moved.
    fn navigate(&mut self, step: impl FnOnce(&mut Self) -> bool) {
        let before = self.visible_range();
        if !step(self) {
            return;
        }
        let after = self.visible_range();
        tracing::debug!(focus = %self.focus, granularity = %self.granularity, range = %after, "navigated");
        if after != before {
            self.emit_range(&after);
        }
    }

    fn emit_range(&mut self, range: &VisibleRange) {
        if let Some(listener) = self.on_range_change.as_mut() {
            listener(range);
        }
    }

    fn rebuild_index(&mut self) {
        self.index = DateBucketIndex::build(&self.events, &self.timezone, self.bucket_order);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn options(granularity: Granularity) -> ViewOptions {
        ViewOptions {
            granularity,
            week_start: Weekday::Sun,
            timezone: chrono_tz::UTC,
            bucket_order: BucketOrder::Input,
            today: d(2025, 6, 15),
        }
    }

    fn raw(id: i64, start: &str, end: &str) -> RawEvent {
        RawEvent {
            id: Some(id),
            title: Some(format!("event {id}")),
            start_time: Some(start.to_string()),
            end_time: Some(end.to_string()),
            ..RawEvent::default()
        }
    }

    fn recorded_ranges(view: &mut CalendarView) -> Rc<RefCell<Vec<VisibleRange>>> {
        let ranges = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&ranges);
        view.on_visible_range_change(move |range| sink.borrow_mut().push(*range));
        ranges
    }

    fn ids(events: &[Arc<CalendarEvent>]) -> Vec<i64> {
        events.iter().map(|e| e.id).collect()
    }

    #[test]
    fn test_june_scenario_in_month_view() {
        let mut view = CalendarView::new(options(Granularity::Month), d(2025, 6, 1));
        view.set_events(vec![
            raw(1, "2025-06-01T09:00Z", "2025-06-01T10:00Z"),
            raw(2, "2025-06-01T12:00Z", "2025-06-03T08:00Z"),
        ]);

        let grid = view.grid();
        assert_eq!(ids(&grid.day(d(2025, 6, 1)).unwrap().events), vec![1, 2]);
        assert_eq!(ids(&grid.day(d(2025, 6, 2)).unwrap().events), vec![2]);
        assert_eq!(ids(&grid.day(d(2025, 6, 3)).unwrap().events), vec![2]);
        assert!(grid.days().filter(|c| c.date > d(2025, 6, 3)).all(|c| c.events.is_empty()));
    }

    #[test]
    fn test_bucket_membership_is_identical_across_granularities() {
        let mut view = CalendarView::new(options(Granularity::Month), d(2025, 6, 10));
        view.set_events(vec![
            raw(1, "2025-06-09T22:00:00Z", "2025-06-11T01:00:00Z"),
            raw(2, "2025-06-10T09:00:00Z", "2025-06-10T10:00:00Z"),
            raw(3, "2025-06-12T09:00:00Z", "2025-06-12T10:00:00Z"),
        ]);

        let date = d(2025, 6, 10);
        let month = ids(&view.grid().day(date).unwrap().events);
        view.set_granularity(Granularity::Week);
        let week = ids(&view.grid().day(date).unwrap().events);
        view.set_granularity(Granularity::Day);
        let day = ids(&view.grid().day(date).unwrap().events);

        assert_eq!(month, vec![1, 2]);
        assert_eq!(month, week);
        assert_eq!(week, day);
    }

    #[test]
    fn test_advance_fires_once_per_step_and_rolls_over_year() {
        let mut view = CalendarView::new(options(Granularity::Month), d(2024, 12, 10));
        let ranges = recorded_ranges(&mut view);

        view.advance(Direction::Next);
        assert_eq!(view.focus(), d(2025, 1, 10));
        assert_eq!(
            ranges.borrow().as_slice(),
            &[VisibleRange {
                start: d(2025, 1, 1),
                end: d(2025, 1, 31)
            }]
        );

        view.advance(Direction::Previous);
        assert_eq!(view.focus(), d(2024, 12, 10));
        assert_eq!(ranges.borrow().len(), 2);
    }

    #[test]
    fn test_granularity_switch_keeps_focus() {
        let mut view = CalendarView::new(options(Granularity::Month), d(2025, 6, 4));
        let ranges = recorded_ranges(&mut view);

        view.set_granularity(Granularity::Week);
        assert_eq!(view.focus(), d(2025, 6, 4));
        assert_eq!(
            view.visible_range(),
            VisibleRange {
                start: d(2025, 6, 1),
                end: d(2025, 6, 7)
            }
        );

        view.set_granularity(Granularity::Day);
        assert_eq!(view.visible_range().start, d(2025, 6, 4));

        // switching to the active mode leaves the window alone
        view.set_granularity(Granularity::Day);
        assert_eq!(ranges.borrow().len(), 2);
    }

    #[test]
    fn test_week_start_moves_week_window_only() {
        let mut view = CalendarView::new(options(Granularity::Month), d(2025, 6, 4));
        let ranges = recorded_ranges(&mut view);

        // month window doesn't depend on the first weekday
        view.set_week_start(Weekday::Mon);
        assert!(ranges.borrow().is_empty());
        assert_eq!(view.week_start(), Weekday::Mon);

        view.set_granularity(Granularity::Week);
        assert_eq!(view.visible_range().start, d(2025, 6, 2));

        view.set_week_start(Weekday::Sun);
        assert_eq!(
            *ranges.borrow(),
            vec![
                VisibleRange {
                    start: d(2025, 6, 2),
                    end: d(2025, 6, 8)
                },
                VisibleRange {
                    start: d(2025, 6, 1),
                    end: d(2025, 6, 7)
                },
            ]
        );
    }

    #[test]
    fn test_jump_to() {
        let mut view = CalendarView::new(options(Granularity::Month), d(2025, 6, 4));
        let ranges = recorded_ranges(&mut view);

        assert!(!view.jump_to("not-a-date"));
        assert_eq!(view.focus(), d(2025, 6, 4));
        assert!(ranges.borrow().is_empty());

        assert!(view.jump_to("2025-03-15"));
        assert_eq!(view.focus(), d(2025, 3, 15));
        assert_eq!(
            ranges.borrow().as_slice(),
            &[VisibleRange {
                start: d(2025, 3, 1),
                end: d(2025, 3, 31)
            }]
        );

        // same month: focus moves, window does not
        assert!(view.jump_to("2025-03-20"));
        assert_eq!(view.focus(), d(2025, 3, 20));
        assert_eq!(ranges.borrow().len(), 1);
    }

    #[test]
    fn test_week_and_day_round_trip() {
        for granularity in [Granularity::Week, Granularity::Day] {
            let mut view = CalendarView::new(options(granularity), d(2025, 2, 28));
            view.advance(Direction::Next);
            view.advance(Direction::Previous);
            assert_eq!(view.focus(), d(2025, 2, 28));
        }
    }

    #[test]
    fn test_month_advance_clamps() {
        let mut view = CalendarView::new(options(Granularity::Month), d(2025, 1, 31));
        view.advance(Direction::Next);
        assert_eq!(view.focus(), d(2025, 2, 28));
        view.advance(Direction::Previous);
        assert_eq!(view.focus(), d(2025, 1, 28));
    }

    #[test]
    fn test_malformed_records_are_dropped() {
        let mut view = CalendarView::new(options(Granularity::Month), d(2025, 6, 1));
        let mut broken = raw(2, "2025-06-01T09:00:00Z", "2025-06-01T10:00:00Z");
        broken.start_time = None;

        let dropped = view.set_events(vec![
            raw(1, "2025-06-01T09:00:00Z", "2025-06-01T10:00:00Z"),
            broken,
            RawEvent::default(),
        ]);

        assert_eq!(dropped, 2);
        assert_eq!(ids(view.events_on(d(2025, 6, 1))), vec![1]);
    }

    #[test]
    fn test_day_detail_lists_everything_in_bucket_order() {
        let mut view = CalendarView::new(options(Granularity::Month), d(2025, 6, 1));
        view.set_events(vec![
            raw(3, "2025-06-02T15:00:00Z", "2025-06-02T16:00:00Z"),
            raw(1, "2025-06-02T09:00:00Z", "2025-06-02T10:00:00Z"),
            raw(2, "2025-06-02T12:00:00Z", "2025-06-02T13:00:00Z"),
        ]);

        let cell = view.grid().day(d(2025, 6, 2)).cloned().unwrap();
        assert_eq!(cell.more_label().as_deref(), Some("+1 more"));

        let detail = view.day_detail(d(2025, 6, 2));
        assert_eq!(detail.key(), "2025-06-02");
        assert_eq!(ids(&detail.events), vec![3, 1, 2]);
        assert!(view.day_detail(d(2025, 6, 3)).is_empty());
    }

    #[test]
    fn test_select_event_notifies_listener() {
        let mut view = CalendarView::new(options(Granularity::Month), d(2025, 6, 1));
        view.set_events(vec![raw(8, "2025-06-02T15:00:00Z", "2025-06-02T16:00:00Z")]);

        let selected = Rc::new(RefCell::new(None));
        let sink = Rc::clone(&selected);
        view.on_select(move |event| *sink.borrow_mut() = Some(event.title.clone()));

        assert!(view.select_event(99).is_none());
        assert!(selected.borrow().is_none());

        assert_eq!(view.select_event(8).map(|e| e.id), Some(8));
        assert_eq!(selected.borrow().as_deref(), Some("event 8"));
    }

    #[test]
    fn test_timezone_change_rebuilds_buckets() {
        let mut view = CalendarView::new(options(Granularity::Month), d(2025, 6, 1));
        view.set_events(vec![raw(1, "2025-05-31T23:30:00Z", "2025-05-31T23:45:00Z")]);
        assert_eq!(ids(view.events_on(d(2025, 5, 31))), vec![1]);

        view.set_timezone(chrono_tz::Asia::Tokyo);
        assert!(view.events_on(d(2025, 5, 31)).is_empty());
        assert_eq!(ids(view.events_on(d(2025, 6, 1))), vec![1]);
    }

    #[test]
    fn test_request_visible_range_and_empty_calendar() {
        let mut view = CalendarView::new(options(Granularity::Month), d(2025, 6, 20));
        let ranges = recorded_ranges(&mut view);
        view.request_visible_range();

        assert_eq!(ranges.borrow()[0].start, d(2025, 6, 1));
        let grid = view.grid();
        assert!(grid.days().all(|c| c.events.is_empty()));
        assert!(grid.day(d(2025, 6, 15)).unwrap().is_today);
    }
}
