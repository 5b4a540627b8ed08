//! TUI rendering traits for agenda types.
//!
//! This module provides extension traits that add colored terminal rendering
//! to agenda-core types using owo_colors.

use agenda_core::Granularity;
use agenda_core::event::{CalendarEvent, DEFAULT_EVENT_COLOR, hex_to_rgb};
use agenda_core::grid::{CalendarGrid, DayCell, DayDetail, GridCell, MAX_INLINE_EVENTS};
use chrono::Datelike;
use chrono_tz::Tz;
use owo_colors::OwoColorize;

/// Width of one grid column, not counting the separator
const CELL_WIDTH: usize = 15;

/// Extension trait for TUI rendering in a display timezone.
pub trait Render {
    fn render(&self, tz: &Tz) -> String;
}

impl Render for CalendarGrid {
    fn render(&self, tz: &Tz) -> String {
        let mut lines = vec![title(self).bold().to_string(), String::new()];

        match self.granularity {
            Granularity::Month | Granularity::Week => {
                let headers: Vec<String> = self
                    .weekday_headers()
                    .iter()
                    .map(|w| fit(&w.to_string(), CELL_WIDTH))
                    .collect();
                lines.push(headers.join(" ").dimmed().to_string());

                for week in self.weeks() {
                    let mut rows = vec![String::new(); 2 + MAX_INLINE_EVENTS];
                    for slot in 0..7 {
                        let cell = week.get(slot).and_then(GridCell::as_day);
                        for (row, text) in rows.iter_mut().zip(cell_lines(cell, tz)) {
                            row.push_str(&text);
                            row.push(' ');
                        }
                    }
                    lines.extend(rows);
                }
            }
            Granularity::Day => {
                if let Some(cell) = self.days().next() {
                    lines.extend(day_view_lines(cell, tz));
                }
            }
        }

        lines.join("\n")
    }
}

impl Render for DayDetail {
    fn render(&self, tz: &Tz) -> String {
        let mut lines = vec![
            format!("Events on {}", self.date.format("%A, %B %-d, %Y"))
                .bold()
                .to_string(),
        ];

        if self.is_empty() {
            lines.push("   No events this day".dimmed().to_string());
        }

        for event in &self.events {
            lines.push(format!(
                "   {} {} {} {}",
                "●".color(event_color(event)),
                event,
                event.time_span_label(tz).dimmed(),
                format!("#{}", event.id).dimmed()
            ));
        }

        lines.join("\n")
    }
}

impl Render for CalendarEvent {
    fn render(&self, tz: &Tz) -> String {
        let start = self.start_time.with_timezone(tz);
        let end = self.end_time.with_timezone(tz);
        let when = if start.date_naive() == end.date_naive() {
            format!("{} - {}", start.format("%a %b %-d %Y, %H:%M"), end.format("%H:%M"))
        } else {
            format!(
                "{} - {}",
                start.format("%a %b %-d %Y, %H:%M"),
                end.format("%a %b %-d %Y, %H:%M")
            )
        };

        let mut lines = vec![
            format!("{} {}", "●".color(event_color(self)), self.bold()),
            format!("   {}  {}", "When:".dimmed(), when),
        ];
        if let Some(location) = &self.location {
            lines.push(format!("   {}  {}", "Where:".dimmed(), location));
        }
        if let Some(reminder) = self.reminder_label() {
            lines.push(format!("   {}  {}", "Reminder:".dimmed(), reminder));
        }
        lines.push(format!("   {}  {}", "Color:".dimmed(), self.display_color()));
        if let Some(owner) = self.owner_id {
            lines.push(format!("   {}  {}", "Owner:".dimmed(), owner));
        }
        if let Some(description) = self.description.as_deref().filter(|d| !d.trim().is_empty()) {
            lines.push(String::new());
            lines.extend(description.lines().map(|l| format!("   {l}")));
        }

        lines.join("\n")
    }
}

fn title(grid: &CalendarGrid) -> String {
    let range = grid.range;
    match grid.granularity {
        Granularity::Month => range.start.format("%B %Y").to_string(),
        Granularity::Week => format!(
            "Week of {} - {}",
            range.start.format("%b %-d"),
            range.end.format("%b %-d, %Y")
        ),
        Granularity::Day => range.start.format("%A, %B %-d, %Y").to_string(),
    }
}

/// The text rows of one grid column: day number, inline events, "+N more".
fn cell_lines(cell: Option<&DayCell>, tz: &Tz) -> Vec<String> {
    let blank = " ".repeat(CELL_WIDTH);
    let Some(cell) = cell else {
        return vec![blank; 2 + MAX_INLINE_EVENTS];
    };

    let number = fit(&format!("{:>2}", cell.date.day()), CELL_WIDTH);
    let mut lines = vec![if cell.is_today {
        number.reversed().to_string()
    } else if cell.is_focus {
        number.underline().to_string()
    } else {
        number
    }];

    for slot in 0..MAX_INLINE_EVENTS {
        lines.push(match cell.inline().get(slot) {
            Some(event) => {
                let label = format!("{} {}", event.start_time.with_timezone(tz).format("%H:%M"), event);
                fit(&label, CELL_WIDTH).color(event_color(event)).to_string()
            }
            None => blank.clone(),
        });
    }

    lines.push(match cell.more_label() {
        Some(more) => fit(&more, CELL_WIDTH).dimmed().to_string(),
        None => blank,
    });

    lines
}

fn day_view_lines(cell: &DayCell, tz: &Tz) -> Vec<String> {
    if cell.events.is_empty() {
        return vec!["   No events".dimmed().to_string()];
    }

    let mut lines: Vec<String> = cell
        .inline()
        .iter()
        .map(|event| {
            format!(
                "   {} {} {}",
                event.time_span_label(tz),
                event.to_string().color(event_color(event)),
                format!("#{}", event.id).dimmed()
            )
        })
        .collect();

    if let Some(more) = cell.more_label() {
        lines.push(format!(
            "   {} {}",
            more.dimmed(),
            format!("(agenda day {})", cell.key()).dimmed()
        ));
    }
    lines
}

fn event_color(event: &CalendarEvent) -> owo_colors::Rgb {
    let (r, g, b) = event
        .rgb()
        .or_else(|| hex_to_rgb(DEFAULT_EVENT_COLOR))
        .unwrap_or((0x51, 0x79, 0xa6));
    owo_colors::Rgb(r, g, b)
}

/// Truncate or pad `text` to exactly `width` characters.
fn fit(text: &str, width: usize) -> String {
    let count = text.chars().count();
    if count > width {
        let mut truncated: String = text.chars().take(width.saturating_sub(1)).collect();
        truncated.push('…');
        truncated
    } else {
        format!("{text}{}", " ".repeat(width - count))
    }
}
