use chrono::{DateTime, Days, FixedOffset, NaiveDate, NaiveTime, SecondsFormat, TimeZone};
use chrono_tz::Tz;
use thiserror::Error;

const LABEL_FORMAT: &str = "%Y-%m-%d %H:%M";

#[derive(Debug, Error, PartialEq)]
pub enum WindowError {
    #[error("window start {from} is not before end {to}")]
    Inverted { from: String, to: String },

    #[error("unknown timezone '{0}'")]
    UnknownTimezone(String),

    #[error("local time {date} {time} does not exist in {tz}")]
    NonexistentLocalTime { date: NaiveDate, time: NaiveTime, tz: String },

    #[error("no previous day before {0}")]
    OutOfRange(NaiveDate),
}

/// Reporting interval, `from < to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    from: DateTime<FixedOffset>,
    to: DateTime<FixedOffset>,
}

impl TimeWindow {
    pub fn new(from: DateTime<FixedOffset>, to: DateTime<FixedOffset>) -> Result<Self, WindowError> {
        if from >= to {
            return Err(WindowError::Inverted {
                from: from.to_rfc3339(),
                to: to.to_rfc3339(),
            });
        }
        Ok(Self { from, to })
    }

    /// The `start..end` local-time range on the day before `now` in `tz`.
    pub fn previous_day<T: TimeZone>(
        now: DateTime<T>,
        tz: Tz,
        start: NaiveTime,
        end: NaiveTime,
    ) -> Result<Self, WindowError> {
        let today = now.with_timezone(&tz).date_naive();
        let yesterday = today
            .checked_sub_days(Days::new(1))
            .ok_or(WindowError::OutOfRange(today))?;

        let from = local_instant(tz, yesterday, start)?;
        let to = local_instant(tz, yesterday, end)?;
        Self::new(from, to)
    }

    /// Resolves the window for a named IANA timezone.
    pub fn previous_day_in<T: TimeZone>(
        now: DateTime<T>,
        timezone: &str,
        start: NaiveTime,
        end: NaiveTime,
    ) -> Result<Self, WindowError> {
        let tz: Tz = timezone
            .parse()
            .map_err(|_| WindowError::UnknownTimezone(timezone.to_string()))?;
        Self::previous_day(now, tz, start, end)
    }

    pub fn from(&self) -> DateTime<FixedOffset> {
        self.from
    }

    pub fn to(&self) -> DateTime<FixedOffset> {
        self.to
    }

    /// RFC 3339 at second precision, as sent in the `from` query parameter.
    pub fn from_wire(&self) -> String {
        self.from.to_rfc3339_opts(SecondsFormat::Secs, true)
    }

    pub fn to_wire(&self) -> String {
        self.to.to_rfc3339_opts(SecondsFormat::Secs, true)
    }

    pub fn from_label(&self) -> String {
        self.from.format(LABEL_FORMAT).to_string()
    }

    pub fn to_label(&self) -> String {
        self.to.format(LABEL_FORMAT).to_string()
    }
}

// Ambiguous local times (DST fall-back) resolve to the earlier instant.
fn local_instant(tz: Tz, date: NaiveDate, time: NaiveTime) -> Result<DateTime<FixedOffset>, WindowError> {
    tz.from_local_datetime(&date.and_time(time))
        .earliest()
        .map(|dt| dt.fixed_offset())
        .ok_or_else(|| WindowError::NonexistentLocalTime {
            date,
            time,
            tz: tz.name().to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn hms(h: u32, m: u32, s: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, s).unwrap()
    }

    #[test]
    fn test_previous_day_in_melbourne_summer() {
        // 2024-01-02 09:30 in Melbourne (UTC+11)
        let now = DateTime::parse_from_rfc3339("2024-01-01T22:30:00Z").unwrap().with_timezone(&Utc);
        let window = TimeWindow::previous_day_in(now, "Australia/Melbourne", hms(18, 0, 0), hms(23, 59, 59)).unwrap();

        assert_eq!(window.from_wire(), "2024-01-01T18:00:00+11:00");
        assert_eq!(window.to_wire(), "2024-01-01T23:59:59+11:00");
    }

    #[test]
    fn test_previous_day_uses_local_date_not_utc_date() {
        // Still 2024-06-30 in UTC but already 2024-07-01 in Melbourne (UTC+10)
        let now = DateTime::parse_from_rfc3339("2024-06-30T20:00:00Z").unwrap();
        let window = TimeWindow::previous_day_in(now, "Australia/Melbourne", hms(18, 0, 0), hms(23, 59, 59)).unwrap();

        assert_eq!(window.from_wire(), "2024-06-30T18:00:00+10:00");
    }

    #[test]
    fn test_utc_window_uses_z_suffix() {
        let now = DateTime::parse_from_rfc3339("2024-03-10T12:00:00Z").unwrap();
        let window = TimeWindow::previous_day(now, chrono_tz::UTC, hms(18, 0, 0), hms(23, 59, 59)).unwrap();

        assert_eq!(window.from_wire(), "2024-03-09T18:00:00Z");
        assert_eq!(window.to_wire(), "2024-03-09T23:59:59Z");
    }

    #[test]
    fn test_labels() {
        let window = TimeWindow::new(
            DateTime::parse_from_rfc3339("2024-01-01T18:00:00+11:00").unwrap(),
            DateTime::parse_from_rfc3339("2024-01-01T23:59:59+11:00").unwrap(),
        )
        .unwrap();

        assert_eq!(window.from_label(), "2024-01-01 18:00");
        assert_eq!(window.to_label(), "2024-01-01 23:59");
    }

    #[test]
    fn test_rejects_inverted_window() {
        let a = DateTime::parse_from_rfc3339("2024-01-01T18:00:00+11:00").unwrap();
        let b = DateTime::parse_from_rfc3339("2024-01-01T17:00:00+11:00").unwrap();

        assert!(matches!(TimeWindow::new(a, b), Err(WindowError::Inverted { .. })));
        assert!(matches!(TimeWindow::new(a, a), Err(WindowError::Inverted { .. })));
    }

    #[test]
    fn test_unknown_timezone() {
        let now = Utc::now();
        let err = TimeWindow::previous_day_in(now, "Mars/Olympus_Mons", hms(18, 0, 0), hms(23, 0, 0)).unwrap_err();
        assert_eq!(err, WindowError::UnknownTimezone("Mars/Olympus_Mons".to_string()));
    }
}
