//! Calendar event types.
//!
//! `RawEvent` is the record exactly as the backend sends it, every field
//! optional. `CalendarEvent` is the validated form the view works with.

use std::fmt;

use chrono::{DateTime, NaiveDateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{AgendaError, AgendaResult};

/// Color used when an event carries no display hint.
pub const DEFAULT_EVENT_COLOR: &str = "#5179a6";

/// An event record as received from an event source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEvent {
    pub id: Option<i64>,
    pub title: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub color: Option<String>,
    #[serde(alias = "userId")]
    pub owner_id: Option<i64>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub reminder_offset: Option<i64>,
}

/// A validated calendar event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub id: i64,
    pub title: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub color: Option<String>,
    pub owner_id: Option<i64>,
    pub description: Option<String>,
    pub location: Option<String>,
    /// Minutes before the start at which a reminder fires
    pub reminder_offset: Option<i64>,
}

impl TryFrom<RawEvent> for CalendarEvent {
    type Error = AgendaError;

    fn try_from(raw: RawEvent) -> AgendaResult<Self> {
        let id = raw.id.ok_or_else(|| AgendaError::MalformedEvent {
            id: None,
            reason: "missing id".into(),
        })?;

        let start_time = required_timestamp(id, "startTime", raw.start_time.as_deref())?;
        let end_time = required_timestamp(id, "endTime", raw.end_time.as_deref())?;

        Ok(CalendarEvent {
            id,
            title: raw.title.unwrap_or_default(),
            start_time,
            end_time,
            color: raw.color.filter(|c| !c.trim().is_empty()),
            owner_id: raw.owner_id,
            description: raw.description,
            location: raw.location,
            reminder_offset: raw.reminder_offset,
        })
    }
}

fn required_timestamp(id: i64, field: &str, value: Option<&str>) -> AgendaResult<DateTime<Utc>> {
    let value = value.ok_or_else(|| AgendaError::MalformedEvent {
        id: Some(id),
        reason: format!("missing {field}"),
    })?;

    parse_timestamp(value).ok_or_else(|| AgendaError::MalformedEvent {
        id: Some(id),
        reason: format!("unparseable {field} '{value}'"),
    })
}

/// Parse an RFC 3339 timestamp, also accepting minute precision
/// ("2025-06-01T09:00Z"). Timestamps without an offset are taken as UTC.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%dT%H:%M%:z") {
        return Some(dt.with_timezone(&Utc));
    }
    let naive = s.strip_suffix('Z').unwrap_or(s);
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(naive, fmt).ok())
        .map(|naive| naive.and_utc())
}

impl CalendarEvent {
    /// The event's color, or the default when none was given.
    pub fn display_color(&self) -> &str {
        self.color.as_deref().unwrap_or(DEFAULT_EVENT_COLOR)
    }

    /// Soft background tint: the color with ~20% alpha appended.
    pub fn soft_color(&self) -> String {
        match self.color.as_deref() {
            None => "#ffffff".to_string(),
            Some(c) if is_plain_hex(c) => format!("{c}33"),
            Some(c) => c.to_string(),
        }
    }

    /// Border tint: the color with ~40% alpha appended.
    pub fn border_color(&self) -> String {
        match self.color.as_deref() {
            None => "#99999966".to_string(),
            Some(c) if is_plain_hex(c) => format!("{c}66"),
            Some(c) => c.to_string(),
        }
    }

    /// The display color as RGB, if it is a `#rrggbb` hex string.
    pub fn rgb(&self) -> Option<(u8, u8, u8)> {
        hex_to_rgb(self.display_color())
    }

    /// "HH:MM - HH:MM" in the given timezone
    pub fn time_span_label(&self, tz: &Tz) -> String {
        format!(
            "{} - {}",
            self.start_time.with_timezone(tz).format("%H:%M"),
            self.end_time.with_timezone(tz).format("%H:%M")
        )
    }

    /// Human label for the reminder offset ("15 min before", "2 hrs before", "1 days before").
    pub fn reminder_label(&self) -> Option<String> {
        let offset = self.reminder_offset?;
        Some(if offset < 60 {
            format!("{offset} min before")
        } else if offset < 1440 {
            format!("{} hrs before", (offset as f64 / 60.0).round())
        } else {
            format!("{} days before", (offset as f64 / 1440.0).round())
        })
    }
}

impl fmt::Display for CalendarEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.title.is_empty() {
            write!(f, "(untitled #{})", self.id)
        } else {
            write!(f, "{}", self.title)
        }
    }
}

fn is_plain_hex(c: &str) -> bool {
    c.len() == 7 && c.starts_with('#')
}

/// Parse `#rrggbb` into its components.
pub fn hex_to_rgb(hex: &str) -> Option<(u8, u8, u8)> {
    let digits = hex.strip_prefix('#')?;
    if digits.len() != 6 {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(digits.get(i..i + 2)?, 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}
