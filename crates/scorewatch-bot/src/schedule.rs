use crate::{Error, Result};
use chrono::{DateTime, Days, NaiveTime, TimeZone};
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_SCHEDULE: &str = "10:00";

/// A wall-clock time that fires once a day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailySchedule {
    time: NaiveTime,
}

impl DailySchedule {
    pub fn new(time: NaiveTime) -> Self {
        Self { time }
    }

    pub fn time(&self) -> NaiveTime {
        self.time
    }

    /// The first firing strictly after `now`, in `now`'s time zone.
    ///
    /// A day on which the time does not exist locally (DST gap) is skipped.
    pub fn next_run<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> DateTime<Tz> {
        let tz = now.timezone();
        let mut date = now.date_naive();

        for _ in 0..4 {
            if let Some(candidate) = tz.from_local_datetime(&date.and_time(self.time)).earliest()
                && candidate > *now
            {
                return candidate;
            }
            date = match date.checked_add_days(Days::new(1)) {
                Some(next) => next,
                None => break,
            };
        }

        now.clone() + chrono::Duration::days(1)
    }
}

impl Default for DailySchedule {
    fn default() -> Self {
        Self::new(NaiveTime::from_hms_opt(10, 0, 0).unwrap_or(NaiveTime::MIN))
    }
}

impl FromStr for DailySchedule {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        NaiveTime::parse_from_str(s.trim(), "%H:%M")
            .map(Self::new)
            .map_err(|_| Error::InvalidSchedule(s.to_string()))
    }
}

impl fmt::Display for DailySchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.time.format("%H:%M"))
    }
}
