//! User configuration at ~/.config/agenda/config.toml

use std::path::{Path, PathBuf};

use chrono_tz::Tz;
use ::config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::bucket::BucketOrder;
use crate::error::{AgendaError, AgendaResult};
use crate::granularity::{Granularity, WeekStart};

static DEFAULT_API_URL: &str = "http://localhost:3020/api";

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn is_default_api_url(url: &String) -> bool {
    url == DEFAULT_API_URL
}

fn is_false(b: &bool) -> bool {
    !*b
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AgendaConfig {
    /// Base URL of the REST backend
    #[serde(default = "default_api_url", skip_serializing_if = "is_default_api_url")]
    pub api_url: String,

    #[serde(default)]
    pub default_view: Granularity,

    #[serde(default)]
    pub week_start: WeekStart,

    /// IANA timezone name used for day boundaries. System zone when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,

    /// Sort each day's events by start time instead of keeping backend order
    #[serde(default, skip_serializing_if = "is_false")]
    pub sort_by_start: bool,
}

impl Default for AgendaConfig {
    fn default() -> Self {
        AgendaConfig {
            api_url: default_api_url(),
            default_view: Granularity::default(),
            week_start: WeekStart::default(),
            timezone: None,
            sort_by_start: false,
        }
    }
}

impl AgendaConfig {
    pub fn config_dir() -> AgendaResult<PathBuf> {
        Ok(dirs::config_dir()
            .ok_or_else(|| AgendaError::Config("Could not determine config directory".into()))?
            .join("agenda"))
    }

    pub fn config_path() -> AgendaResult<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load from the default path, creating a commented default file on first use.
    pub fn load() -> AgendaResult<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
        }

        Self::load_from(&config_path)
    }

    /// Load from `path`, with `AGENDA_*` environment variables taking precedence.
    pub fn load_from(path: &Path) -> AgendaResult<Self> {
        Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(Environment::with_prefix("AGENDA"))
            .build()
            .map_err(|e| AgendaError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| AgendaError::Config(e.to_string()))
    }

    pub fn save_to(&self, path: &Path) -> AgendaResult<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| AgendaError::Config(e.to_string()))?;

        std::fs::write(path, content)
            .map_err(|e| AgendaError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> AgendaResult<()> {
        let contents = format!(
            "\
# agenda configuration

# REST backend:
# api_url = \"{}\"

# View shown when none is given (month, week, day):
# default_view = \"month\"

# First column of the grid (sunday, monday):
# week_start = \"sunday\"

# Timezone for day boundaries (defaults to the system timezone):
# timezone = \"Europe/Madrid\"

# Sort each day's events by start time:
# sort_by_start = false
",
            DEFAULT_API_URL
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                AgendaError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| AgendaError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }

    /// The configured timezone, if one is set.
    pub fn timezone(&self) -> AgendaResult<Option<Tz>> {
        self.timezone
            .as_deref()
            .map(|name| {
                name.parse::<Tz>()
                    .map_err(|_| AgendaError::Config(format!("Unknown timezone '{name}'")))
            })
            .transpose()
    }

    pub fn bucket_order(&self) -> BucketOrder {
        if self.sort_by_start {
            BucketOrder::StartTime
        } else {
            BucketOrder::Input
        }
    }
}
