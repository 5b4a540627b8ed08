//! Grid layout for month, week and day views.

use std::sync::Arc;

use chrono::{Datelike, NaiveDate, Weekday};

use crate::bucket::{DateBucketIndex, day_key};
use crate::date_range::{VisibleRange, weekday_offset};
use crate::event::CalendarEvent;
use crate::granularity::Granularity;

/// Events shown inline in a day cell before collapsing into "+N more".
pub const MAX_INLINE_EVENTS: usize = 2;

/// A single day in the grid.
#[derive(Debug, Clone)]
pub struct DayCell {
    pub date: NaiveDate,
    pub is_today: bool,
    pub is_focus: bool,
    /// Every event of the day, in bucket order
    pub events: Vec<Arc<CalendarEvent>>,
}

impl DayCell {
    /// Events rendered inline in the cell.
    pub fn inline(&self) -> &[Arc<CalendarEvent>] {
        &self.events[..self.events.len().min(MAX_INLINE_EVENTS)]
    }

    /// Events hidden behind the "+N more" affordance.
    pub fn hidden_count(&self) -> usize {
        self.events.len().saturating_sub(MAX_INLINE_EVENTS)
    }

    pub fn more_label(&self) -> Option<String> {
        match self.hidden_count() {
            0 => None,
            n => Some(format!("+{n} more")),
        }
    }

    pub fn key(&self) -> String {
        day_key(&self.date)
    }
}

#[derive(Debug, Clone)]
pub enum GridCell {
    /// Leading filler before the 1st of the month
    Placeholder,
    Day(DayCell),
}

impl GridCell {
    pub fn as_day(&self) -> Option<&DayCell> {
        match self {
            GridCell::Day(cell) => Some(cell),
            GridCell::Placeholder => None,
        }
    }
}

/// The rendered cells of the visible window.
#[derive(Debug, Clone)]
pub struct CalendarGrid {
    pub granularity: Granularity,
    pub range: VisibleRange,
    pub week_start: Weekday,
    pub cells: Vec<GridCell>,
}

impl CalendarGrid {
    pub fn build(
        granularity: Granularity,
        range: VisibleRange,
        week_start: Weekday,
        focus: NaiveDate,
        today: NaiveDate,
        index: &DateBucketIndex,
    ) -> Self {
        let leading = match granularity {
            Granularity::Month => weekday_offset(range.start.weekday(), week_start) as usize,
            Granularity::Week | Granularity::Day => 0,
        };

        let mut cells = Vec::with_capacity(leading + range.len());
        cells.extend(std::iter::repeat_with(|| GridCell::Placeholder).take(leading));
        cells.extend(range.days().map(|date| {
            GridCell::Day(DayCell {
                date,
                is_today: date == today,
                is_focus: date == focus,
                events: index.events_on(date).to_vec(),
            })
        }));

        CalendarGrid {
            granularity,
            range,
            week_start,
            cells,
        }
    }

    pub fn leading_placeholders(&self) -> usize {
        self.cells
            .iter()
            .take_while(|c| matches!(c, GridCell::Placeholder))
            .count()
    }

    /// Rows of seven cells; the last row may be shorter.
    pub fn weeks(&self) -> std::slice::Chunks<'_, GridCell> {
        self.cells.chunks(7)
    }

    pub fn days(&self) -> impl Iterator<Item = &DayCell> {
        self.cells.iter().filter_map(GridCell::as_day)
    }

    pub fn day(&self, date: NaiveDate) -> Option<&DayCell> {
        self.days().find(|c| c.date == date)
    }

    /// Weekday column headers starting at the configured week start.
    pub fn weekday_headers(&self) -> Vec<Weekday> {
        std::iter::successors(Some(self.week_start), |w| Some(w.succ()))
            .take(7)
            .collect()
    }
}

/// Every event of one day, listed in bucket order.
#[derive(Debug, Clone)]
pub struct DayDetail {
    pub date: NaiveDate,
    pub events: Vec<Arc<CalendarEvent>>,
}

impl DayDetail {
    pub fn key(&self) -> String {
        day_key(&self.date)
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
