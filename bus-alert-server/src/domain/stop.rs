//! Stop identifiers and per-stop polling configuration.

use std::fmt;

use chrono::Weekday;
use serde::Serialize;

use super::ActiveWindow;

/// Error returned when parsing an invalid stop id.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid stop id {input:?}: {reason}")]
pub struct InvalidStopId {
    input: String,
    reason: &'static str,
}

/// A TfL stop point identifier (e.g. `490008660N`).
///
/// Stop ids are interpolated into the request path, so only ASCII
/// alphanumerics, `-` and `_` are accepted.
///
/// # Examples
///
/// ```
/// use bus_alert_server::domain::StopId;
///
/// let stop = StopId::parse(" 490008660N ").unwrap();
/// assert_eq!(stop.as_str(), "490008660N");
///
/// assert!(StopId::parse("").is_err());
/// assert!(StopId::parse("490/008").is_err());
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct StopId(String);

impl StopId {
    /// Parse a stop id, trimming surrounding whitespace.
    pub fn parse(s: &str) -> Result<Self, InvalidStopId> {
        let trimmed = s.trim();

        if trimmed.is_empty() {
            return Err(InvalidStopId {
                input: s.to_string(),
                reason: "must not be empty",
            });
        }

        if !trimmed
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
        {
            return Err(InvalidStopId {
                input: s.to_string(),
                reason: "must contain only ASCII letters, digits, '-' or '_'",
            });
        }

        Ok(Self(trimmed.to_string()))
    }

    /// Returns the stop id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for StopId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StopId({})", self.0)
    }
}

impl fmt::Display for StopId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A monitored stop: which lines to keep and when to poll at all.
///
/// Built by the configuration layer and never mutated by the polling cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopConfig {
    stop_id: StopId,
    name: Option<String>,
    line_names: Vec<String>,
    window: Option<ActiveWindow>,
    days: Vec<Weekday>,
}

impl StopConfig {
    /// Create a config that polls every line, all day, every day.
    pub fn new(stop_id: StopId) -> Self {
        Self {
            stop_id,
            name: None,
            line_names: Vec::new(),
            window: None,
            days: Vec::new(),
        }
    }

    /// Set the display name. Blank names are treated as absent.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        let trimmed = name.trim();
        self.name = (!trimmed.is_empty()).then(|| trimmed.to_string());
        self
    }

    /// Restrict results to the given line names.
    ///
    /// Names are trimmed; blanks and repeats are dropped. An empty list
    /// means "allow all lines".
    pub fn with_lines<I, L>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = L>,
        L: AsRef<str>,
    {
        let mut line_names: Vec<String> = Vec::new();
        for line in lines {
            let line = line.as_ref().trim();
            if !line.is_empty() && !line_names.iter().any(|l| l == line) {
                line_names.push(line.to_string());
            }
        }
        self.line_names = line_names;
        self
    }

    /// Only poll while the local time is inside `window`.
    pub fn with_window(mut self, window: ActiveWindow) -> Self {
        self.window = Some(window);
        self
    }

    /// Only poll on the given weekdays. An empty list means every day.
    pub fn with_days(mut self, days: impl IntoIterator<Item = Weekday>) -> Self {
        let mut unique: Vec<Weekday> = Vec::new();
        for day in days {
            if !unique.contains(&day) {
                unique.push(day);
            }
        }
        self.days = unique;
        self
    }

    pub fn stop_id(&self) -> &StopId {
        &self.stop_id
    }

    /// The configured name, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The configured name, falling back to the stop id.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(self.stop_id.as_str())
    }

    pub fn line_names(&self) -> &[String] {
        &self.line_names
    }

    pub fn window(&self) -> Option<&ActiveWindow> {
        self.window.as_ref()
    }

    pub fn days(&self) -> &[Weekday] {
        &self.days
    }

    /// Whether a line passes this stop's allow-list.
    pub fn allows_line(&self, line: &str) -> bool {
        self.line_names.is_empty() || self.line_names.iter().any(|l| l == line)
    }
}

/// Error returned when a weekday name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown weekday: {0:?}")]
pub struct InvalidWeekday(pub String);

/// Parse an English weekday name, full or abbreviated, ignoring case.
pub fn parse_weekday(s: &str) -> Result<Weekday, InvalidWeekday> {
    s.trim()
        .parse::<Weekday>()
        .map_err(|_| InvalidWeekday(s.to_string()))
}
