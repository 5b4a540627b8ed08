pub mod browse;
pub mod config;
pub mod day;
pub mod event;
pub mod login;
pub mod logout;
pub mod show;

use agenda_core::navigation::parse_jump_date;
use anyhow::Result;
use chrono::NaiveDate;

use crate::context::AppContext;

/// Focus date from `--date`, defaulting to today in the display timezone.
pub fn resolve_focus(ctx: &AppContext, date: Option<&str>) -> Result<NaiveDate> {
    match date {
        None => Ok(ctx.today()),
        Some(s) => parse_jump_date(s, &ctx.timezone)
            .ok_or_else(|| anyhow::anyhow!("Invalid date '{}'. Expected YYYY-MM-DD", s)),
    }
}
