//! Time-of-day activity windows.

use std::fmt;

use chrono::NaiveTime;

/// Error returned when parsing an invalid wall-clock time.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid time {input:?}: expected HH:MM or HH:MM:SS")]
pub struct InvalidTime {
    input: String,
}

/// Parse a local wall-clock time in `HH:MM` or `HH:MM:SS` form.
pub fn parse_wall_time(s: &str) -> Result<NaiveTime, InvalidTime> {
    let trimmed = s.trim();
    NaiveTime::parse_from_str(trimmed, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M"))
        .map_err(|_| InvalidTime {
            input: s.to_string(),
        })
}

/// An inclusive `[start, end]` range of local wall-clock time.
///
/// A window whose start is later than its end wraps past midnight, so
/// `22:00-02:00` covers late evening and the small hours.
///
/// # Examples
///
/// ```
/// use bus_alert_server::domain::ActiveWindow;
/// use chrono::NaiveTime;
///
/// let window = ActiveWindow::parse("08:00", "10:00").unwrap();
/// assert!(window.contains(NaiveTime::from_hms_opt(10, 0, 0).unwrap()));
/// assert!(!window.contains(NaiveTime::from_hms_opt(7, 59, 0).unwrap()));
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActiveWindow {
    start: NaiveTime,
    end: NaiveTime,
}

impl ActiveWindow {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }

    /// Parse both bounds from `HH:MM` / `HH:MM:SS` strings.
    pub fn parse(start: &str, end: &str) -> Result<Self, InvalidTime> {
        Ok(Self::new(parse_wall_time(start)?, parse_wall_time(end)?))
    }

    pub fn start(&self) -> NaiveTime {
        self.start
    }

    pub fn end(&self) -> NaiveTime {
        self.end
    }

    /// Whether this window crosses midnight.
    pub fn wraps_midnight(&self) -> bool {
        self.start > self.end
    }

    /// Whether `time` falls inside the window, bounds included.
    pub fn contains(&self, time: NaiveTime) -> bool {
        if self.wraps_midnight() {
            time >= self.start || time <= self.end
        } else {
            self.start <= time && time <= self.end
        }
    }
}

impl fmt::Debug for ActiveWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ActiveWindow({self})")
    }
}

impl fmt::Display for ActiveWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}",
            self.start.format("%H:%M"),
            self.end.format("%H:%M")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn parse_short_and_long_forms() {
        assert_eq!(parse_wall_time("08:30"), Ok(t(8, 30)));
        assert_eq!(
            parse_wall_time("08:30:15"),
            Ok(NaiveTime::from_hms_opt(8, 30, 15).unwrap())
        );
        assert_eq!(parse_wall_time(" 23:59 "), Ok(t(23, 59)));
    }

    #[test]
    fn reject_malformed_times() {
        assert!(parse_wall_time("8").is_err());
        assert!(parse_wall_time("25:00").is_err());
        assert!(parse_wall_time("12:60").is_err());
        assert!(parse_wall_time("noon").is_err());
        assert!(parse_wall_time("").is_err());
    }

    #[test]
    fn bounds_are_inclusive() {
        let window = ActiveWindow::new(t(8, 0), t(10, 0));
        assert!(window.contains(t(8, 0)));
        assert!(window.contains(t(9, 0)));
        assert!(window.contains(t(10, 0)));
        assert!(!window.contains(t(7, 59)));
        assert!(!window.contains(NaiveTime::from_hms_opt(10, 0, 1).unwrap()));
    }

    #[test]
    fn wrapping_window_spans_midnight() {
        let window = ActiveWindow::new(t(22, 0), t(2, 0));
        assert!(window.wraps_midnight());
        assert!(window.contains(t(23, 30)));
        assert!(window.contains(t(0, 0)));
        assert!(window.contains(t(1, 0)));
        assert!(window.contains(t(2, 0)));
        assert!(!window.contains(t(12, 0)));
        assert!(!window.contains(t(21, 59)));
    }

    #[test]
    fn single_instant_window() {
        let window = ActiveWindow::new(t(9, 0), t(9, 0));
        assert!(!window.wraps_midnight());
        assert!(window.contains(t(9, 0)));
        assert!(!window.contains(t(9, 1)));
    }

    #[test]
    fn display() {
        let window = ActiveWindow::parse("07:30", "09:00").unwrap();
        assert_eq!(window.to_string(), "07:30-09:00");
        assert_eq!(format!("{window:?}"), "ActiveWindow(07:30-09:00)");
    }
}
