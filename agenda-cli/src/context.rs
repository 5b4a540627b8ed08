//! Per-invocation application context.
//!
//! Built once at startup from config and the stored session, then handed to
//! commands explicitly.

use std::path::PathBuf;

use agenda_core::config::AgendaConfig;
use agenda_core::session::Session;
use agenda_core::{Granularity, ViewOptions};
use anyhow::Result;
use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;

use crate::source::{FileSource, HttpSource, Source};

pub struct AppContext {
    pub config: AgendaConfig,
    pub timezone: Tz,
    pub session: Option<Session>,
    pub session_path: PathBuf,
}

impl AppContext {
    pub fn load() -> Result<Self> {
        let config = AgendaConfig::load()?;
        let timezone = match config.timezone()? {
            Some(tz) => tz,
            None => system_timezone(),
        };

        let session_path = Session::default_path()?;
        let session = match Session::load_from(&session_path)? {
            Some(session) if session.is_expired(Utc::now()) => {
                tracing::warn!("stored session has expired, run `agenda login` again");
                None
            }
            other => other,
        };

        tracing::debug!(%timezone, logged_in = session.is_some(), "loaded context");
        Ok(AppContext {
            config,
            timezone,
            session,
            session_path,
        })
    }

    pub fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.timezone).date_naive()
    }

    pub fn view_options(&self, granularity: Option<Granularity>) -> ViewOptions {
        ViewOptions {
            granularity: granularity.unwrap_or(self.config.default_view),
            week_start: self.config.week_start.weekday(),
            timezone: self.timezone,
            bucket_order: self.config.bucket_order(),
            today: self.today(),
        }
    }

    /// A file source when `events_file` is given, otherwise the backend.
    pub fn source(&self, events_file: Option<PathBuf>) -> Source {
        match events_file {
            Some(path) => Source::File(FileSource::new(path)),
            None => Source::Http(HttpSource::new(&self.config.api_url, self.session.clone())),
        }
    }
}

/// The system timezone, or UTC when it can't be determined.
fn system_timezone() -> Tz {
    match iana_time_zone::get_timezone() {
        Ok(name) => name.parse().unwrap_or_else(|_| {
            tracing::warn!(name, "unknown system timezone, using UTC");
            Tz::UTC
        }),
        Err(e) => {
            tracing::warn!("could not determine system timezone, using UTC: {e}");
            Tz::UTC
        }
    }
}
