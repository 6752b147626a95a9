//! On-disk configuration.
//!
//! The file is TOML. Each `[[entries]]` table is one configuration entry with
//! a `data` section and an optional `options` section; options override data
//! field by field. Everything is merged and validated once, at load time, so
//! an invalid interval or stop never reaches a running poller.

use std::collections::HashSet;
use std::fmt;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::{
    ActiveWindow, DEFAULT_SCAN_INTERVAL_SECS, InvalidScanInterval, InvalidStopId, InvalidTime,
    InvalidWeekday, ScanInterval, StopConfig, StopId, parse_weekday,
};
use crate::tfl::TflConfig;

/// Default HTTP listen address.
const DEFAULT_BIND: ([u8; 4], u16) = ([127, 0, 0, 1], 3000);

/// Configuration errors. All of them are fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("tfl.timeout_secs must be at least 1")]
    ZeroTimeout,

    #[error("entry id must not be empty")]
    EmptyEntryId,

    #[error("duplicate entry id {0:?}")]
    DuplicateEntry(String),

    #[error("entry {entry}: {source}")]
    Interval {
        entry: String,
        source: InvalidScanInterval,
    },

    #[error("entry {entry}: {source}")]
    StopId {
        entry: String,
        source: InvalidStopId,
    },

    #[error("entry {entry}, stop {stop_id}: {source}")]
    Time {
        entry: String,
        stop_id: StopId,
        source: InvalidTime,
    },

    #[error("entry {entry}, stop {stop_id}: start_time and end_time must be given together")]
    IncompleteWindow { entry: String, stop_id: StopId },

    #[error("entry {entry}, stop {stop_id}: {source}")]
    Weekday {
        entry: String,
        stop_id: StopId,
        source: InvalidWeekday,
    },
}

/// Identifier of a configuration entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct EntryId(String);

impl EntryId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One validated configuration entry: a stop set polled on one interval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryConfig {
    pub id: EntryId,
    pub scan_interval: ScanInterval,
    pub stops: Vec<StopConfig>,
}

/// The whole validated configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertConfig {
    pub tfl: TflConfig,
    pub bind: SocketAddr,
    pub entries: Vec<EntryConfig>,
}

impl AlertConfig {
    /// Load and validate a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Parse and validate configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = toml::from_str(s)?;
        raw.validate()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    #[serde(default)]
    tfl: TflSection,
    #[serde(default)]
    server: ServerSection,
    #[serde(default)]
    entries: Vec<RawEntry>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct TflSection {
    base_url: Option<String>,
    app_key: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ServerSection {
    bind: Option<SocketAddr>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawEntry {
    id: String,
    #[serde(default)]
    data: EntrySettings,
    #[serde(default)]
    options: EntrySettings,
}

/// The overridable fields of an entry. `None` means "not set here", and so
/// does an empty `stops` list.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct EntrySettings {
    scan_interval: Option<u64>,
    stops: Option<Vec<RawStop>>,
}

impl EntrySettings {
    /// `self` wins wherever it has a value.
    fn over(self, base: EntrySettings) -> EntrySettings {
        EntrySettings {
            scan_interval: self.scan_interval.or(base.scan_interval),
            stops: self.stops.filter(|stops| !stops.is_empty()).or(base.stops),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawStop {
    stop_id: String,
    name: Option<String>,
    #[serde(default)]
    line_names: LineNames,
    start_time: Option<String>,
    end_time: Option<String>,
    #[serde(default)]
    days: Vec<String>,
}

/// Line names as a list, or as one comma-separated string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum LineNames {
    List(Vec<String>),
    Csv(String),
}

impl Default for LineNames {
    fn default() -> Self {
        LineNames::List(Vec::new())
    }
}

impl LineNames {
    fn into_vec(self) -> Vec<String> {
        match self {
            LineNames::List(lines) => lines,
            LineNames::Csv(s) => s.split(',').map(|l| l.trim().to_string()).collect(),
        }
    }
}

impl RawConfig {
    fn validate(self) -> Result<AlertConfig, ConfigError> {
        let mut tfl = TflConfig::new();
        if let Some(url) = self.tfl.base_url {
            tfl = tfl.with_base_url(url);
        }
        if let Some(key) = self.tfl.app_key.filter(|k| !k.trim().is_empty()) {
            tfl = tfl.with_app_key(key);
        }
        if let Some(secs) = self.tfl.timeout_secs {
            if secs == 0 {
                return Err(ConfigError::ZeroTimeout);
            }
            tfl = tfl.with_timeout(secs);
        }

        let bind = self.server.bind.unwrap_or_else(|| SocketAddr::from(DEFAULT_BIND));

        let mut seen = HashSet::new();
        let mut entries = Vec::with_capacity(self.entries.len());
        for raw in self.entries {
            let entry = raw.validate()?;
            if !seen.insert(entry.id.clone()) {
                return Err(ConfigError::DuplicateEntry(entry.id.0));
            }
            entries.push(entry);
        }

        Ok(AlertConfig {
            tfl,
            bind,
            entries,
        })
    }
}

impl RawEntry {
    fn validate(self) -> Result<EntryConfig, ConfigError> {
        let id = self.id.trim().to_string();
        if id.is_empty() {
            return Err(ConfigError::EmptyEntryId);
        }

        let merged = self.options.over(self.data);

        let scan_interval =
            ScanInterval::from_secs(merged.scan_interval.unwrap_or(DEFAULT_SCAN_INTERVAL_SECS))
                .map_err(|e| ConfigError::Interval {
                    entry: id.clone(),
                    source: e,
                })?;

        let stops = merged
            .stops
            .unwrap_or_default()
            .into_iter()
            .map(|stop| stop.validate(&id))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(EntryConfig {
            id: EntryId(id),
            scan_interval,
            stops,
        })
    }
}

impl RawStop {
    fn validate(self, entry: &str) -> Result<StopConfig, ConfigError> {
        let stop_id = StopId::parse(&self.stop_id).map_err(|e| ConfigError::StopId {
            entry: entry.to_string(),
            source: e,
        })?;

        let days = self
            .days
            .iter()
            .map(|d| parse_weekday(d))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| ConfigError::Weekday {
                entry: entry.to_string(),
                stop_id: stop_id.clone(),
                source: e,
            })?;

        let window = match (self.start_time.as_deref(), self.end_time.as_deref()) {
            (None, None) => None,
            (Some(start), Some(end)) => Some(ActiveWindow::parse(start, end).map_err(|e| {
                ConfigError::Time {
                    entry: entry.to_string(),
                    stop_id: stop_id.clone(),
                    source: e,
                }
            })?),
            _ => {
                return Err(ConfigError::IncompleteWindow {
                    entry: entry.to_string(),
                    stop_id,
                });
            }
        };

        let mut config = StopConfig::new(stop_id)
            .with_lines(self.line_names.into_vec())
            .with_days(days);
        if let Some(name) = self.name {
            config = config.with_name(name);
        }
        if let Some(window) = window {
            config = config.with_window(window);
        }
        Ok(config)
    }
}
