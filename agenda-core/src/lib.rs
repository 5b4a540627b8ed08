//! Core types for agenda.
//!
//! This crate provides the calendar view model used by the agenda CLI:
//! - `view::CalendarView`, the navigable month/week/day view
//! - `bucket::DateBucketIndex`, events grouped by local calendar day
//! - `event` types as received from the backend
//! - `session` and `pin` state shared with other views

pub mod bucket;
pub mod config;
pub mod date_range;
pub mod error;
pub mod event;
pub mod granularity;
pub mod grid;
pub mod navigation;
pub mod pin;
pub mod session;
pub mod view;

pub use event::{CalendarEvent, RawEvent};
pub use granularity::{Direction, Granularity, WeekStart};
pub use view::{CalendarView, ViewOptions};
