//! Connects a `CalendarView` to an event source.
//!
//! The view reports range changes synchronously; they are queued on a
//! channel and `sync` fetches the newest one before rendering.

use agenda_core::date_range::VisibleRange;
use agenda_core::{CalendarView, Granularity};
use anyhow::Result;
use chrono::NaiveDate;
use tokio::sync::mpsc::{self, UnboundedReceiver};

use crate::context::AppContext;
use crate::source::{EventSource, Source};
use crate::utils::tui::create_spinner;

pub struct Host {
    view: CalendarView,
    source: Source,
    ranges: UnboundedReceiver<VisibleRange>,
}

impl Host {
    pub fn new(ctx: &AppContext, source: Source, granularity: Option<Granularity>, focus: NaiveDate) -> Self {
        let mut view = CalendarView::new(ctx.view_options(granularity), focus);

        let (tx, ranges) = mpsc::unbounded_channel();
        view.on_visible_range_change(move |range| {
            // receiver lives as long as the host
            let _ = tx.send(*range);
        });
        view.request_visible_range();

        Host {
            view,
            source,
            ranges,
        }
    }

    pub fn view(&self) -> &CalendarView {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut CalendarView {
        &mut self.view
    }

    /// Fetch events for the latest requested range, if any.
    ///
    /// On error the previous events stay in place.
    pub async fn sync(&mut self) -> Result<()> {
        let mut latest = None;
        while let Ok(range) = self.ranges.try_recv() {
            latest = Some(range);
        }
        let Some(range) = latest else {
            return Ok(());
        };

        let spinner = create_spinner(format!("Loading {range}"));
        let result = self.source.fetch(&range, self.view.timezone()).await;
        spinner.finish_and_clear();

        let dropped = self.view.set_events(result?);
        if dropped > 0 {
            tracing::warn!(dropped, "some events were malformed and are not shown");
        }
        Ok(())
    }
}
