/**
 * The Task Scheduler service exchanges dates and durations as text.
 *
 * Dates use `YYYY-MM-DDTHH:MM:SS` with an optional `(+-)HH:MM` UTC offset, empty text means "not set".
 * Durations use a restricted ISO-8601 profile `PnYnMnDTnHnMnS` where the `T` is always present.
 * Empty, zero and unreadable durations all mean "not set".
 *
 * References:
 * `https://learn.microsoft.com/en-us/windows/win32/taskschd/trigger-startboundary`
 * `https://learn.microsoft.com/en-us/windows/win32/taskschd/repetitionpattern-duration`
 */
use super::{error::TimeError, regex_options::create_regex};
use chrono::{DateTime, FixedOffset, Local, Months, NaiveDateTime, TimeDelta, Timelike};
use log::{error, warn};
use regex::Regex;
use std::sync::OnceLock;

/// Duration written when a duration property has no value
pub const DEFAULT_DURATION: &str = "PT0S";

const DURATION_PATTERN: &str = r"(?i)^P(?:([0-9]+)Y)?(?:([0-9]+)M)?(?:([0-9]+)D)?T(?:([0-9]+)H)?(?:([0-9]+)M)?(?:([0-9]+)S)?";

const INSTANT_PATTERN: &str =
    r"^[0-9]{4}-[0-9]{2}-[0-9]{2}T[0-9]{2}:[0-9]{2}:[0-9]{2}(?:\.[0-9]+)?(?:Z|[+-][0-9]{2}:[0-9]{2})?$";

const INSTANT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

static DURATION_REGEX: OnceLock<Option<Regex>> = OnceLock::new();
static INSTANT_REGEX: OnceLock<Option<Regex>> = OnceLock::new();

/// A point in time as the service reports it. Local wall clock time, or a time with a UTC offset
#[derive(Debug, Clone, Copy, Eq)]
pub enum Instant {
    Local(NaiveDateTime),
    Fixed(DateTime<FixedOffset>),
}

/// Fixed instants are only equal when both the moment and the UTC offset match
impl PartialEq for Instant {
    fn eq(&self, other: &Instant) -> bool {
        match (self, other) {
            (Instant::Local(left), Instant::Local(right)) => left == right,
            (Instant::Fixed(left), Instant::Fixed(right)) => {
                left == right && left.offset() == right.offset()
            }
            _ => false,
        }
    }
}

impl Instant {
    /// Wall clock reading of the instant, dropping any UTC offset
    pub fn wall_clock(&self) -> NaiveDateTime {
        match self {
            Instant::Local(local) => *local,
            Instant::Fixed(fixed) => fixed.naive_local(),
        }
    }
}

impl From<NaiveDateTime> for Instant {
    fn from(value: NaiveDateTime) -> Instant {
        Instant::Local(value)
    }
}

impl From<DateTime<FixedOffset>> for Instant {
    fn from(value: DateTime<FixedOffset>) -> Instant {
        Instant::Fixed(value)
    }
}

/// Calendar aware duration. Components are never negative
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Offset {
    pub years: u32,
    pub months: u32,
    pub days: u32,
    pub hours: u32,
    pub minutes: u32,
    pub seconds: u32,
}

impl Offset {
    pub const fn new(
        years: u32,
        months: u32,
        days: u32,
        hours: u32,
        minutes: u32,
        seconds: u32,
    ) -> Offset {
        Offset {
            years,
            months,
            days,
            hours,
            minutes,
            seconds,
        }
    }

    pub const fn from_days(days: u32) -> Offset {
        Offset::new(0, 0, days, 0, 0, 0)
    }

    pub const fn from_hours(hours: u32) -> Offset {
        Offset::new(0, 0, 0, hours, 0, 0)
    }

    pub const fn from_minutes(minutes: u32) -> Offset {
        Offset::new(0, 0, 0, 0, minutes, 0)
    }

    pub const fn from_seconds(seconds: u32) -> Offset {
        Offset::new(0, 0, 0, 0, 0, seconds)
    }

    pub const fn is_zero(&self) -> bool {
        self.years == 0
            && self.months == 0
            && self.days == 0
            && self.hours == 0
            && self.minutes == 0
            && self.seconds == 0
    }

    /// Move `instant` forward by this offset. Years and months follow the calendar
    /// (clamped to the end of shorter months), everything else is exact seconds
    pub fn add_to(&self, instant: &Instant) -> Option<Instant> {
        let months = Months::new(self.years.checked_mul(12)?.checked_add(self.months)?);
        let seconds = i64::from(self.days) * 86400
            + i64::from(self.hours) * 3600
            + i64::from(self.minutes) * 60
            + i64::from(self.seconds);
        let delta = TimeDelta::try_seconds(seconds)?;

        match instant {
            Instant::Local(local) => {
                let moved = local.checked_add_months(months)?.checked_add_signed(delta)?;
                Some(Instant::Local(moved))
            }
            Instant::Fixed(fixed) => {
                let moved = fixed.checked_add_months(months)?.checked_add_signed(delta)?;
                Some(Instant::Fixed(moved))
            }
        }
    }
}

/// Parse date text from the service. Empty text is "not set", anything else must be a valid date
pub fn decode_instant(text: &str) -> Result<Option<Instant>, TimeError> {
    if text.is_empty() {
        return Ok(None);
    }

    let shape = match instant_regex() {
        Some(result) => result,
        None => return Err(TimeError::Instant),
    };
    if !shape.is_match(text) {
        error!("[time] Date text {text:?} is not YYYY-MM-DDTHH:MM:SS");
        return Err(TimeError::Instant);
    }

    if let Ok(fixed) = DateTime::parse_from_rfc3339(text) {
        return Ok(Some(Instant::Fixed(fixed)));
    }

    // No offset means local time. Fractional seconds are accepted but never written
    match NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f") {
        Ok(local) => Ok(Some(Instant::Local(local))),
        Err(err) => {
            error!("[time] Could not parse date text {text:?}: {err:?}");
            Err(TimeError::Instant)
        }
    }
}

/// Format an instant for the service, using an empty string when not set
pub fn encode_instant(instant: Option<Instant>) -> String {
    encode_instant_or(instant, "")
}

/// Format an instant for the service at second precision
pub fn encode_instant_or(instant: Option<Instant>, default: &str) -> String {
    match instant {
        None => default.to_string(),
        Some(Instant::Local(local)) => local.format(INSTANT_FORMAT).to_string(),
        Some(Instant::Fixed(fixed)) => fixed.format("%Y-%m-%dT%H:%M:%S%:z").to_string(),
    }
}

fn instant_regex() -> Option<&'static Regex> {
    INSTANT_REGEX
        .get_or_init(|| create_regex(INSTANT_PATTERN).ok())
        .as_ref()
}

fn duration_regex() -> Option<&'static Regex> {
    DURATION_REGEX
        .get_or_init(|| create_regex(DURATION_PATTERN).ok())
        .as_ref()
}

/// Parse duration text from the service.
/// Unreadable text is treated as "not set", the service returns junk for unset durations
pub fn decode_offset(text: &str) -> Option<Offset> {
    if text.is_empty() {
        return None;
    }

    let captures = match duration_regex()?.captures(text) {
        Some(result) => result,
        None => {
            warn!("[time] Duration text {text:?} is not PnYnMnDTnHnMnS");
            return None;
        }
    };

    let component = |index: usize| -> Option<u32> {
        match captures.get(index) {
            Some(value) => match value.as_str().parse::<u32>() {
                Ok(result) => Some(result),
                Err(err) => {
                    warn!("[time] Duration component in {text:?} out of range: {err:?}");
                    None
                }
            },
            None => Some(0),
        }
    };

    let offset = Offset {
        years: component(1)?,
        months: component(2)?,
        days: component(3)?,
        hours: component(4)?,
        minutes: component(5)?,
        seconds: component(6)?,
    };

    if offset.is_zero() {
        return None;
    }
    Some(offset)
}

/// Format a duration for the service, using `PT0S` when not set
pub fn encode_offset(offset: Option<Offset>) -> String {
    encode_offset_or(offset, DEFAULT_DURATION)
}

/// Format a duration for the service. Zero components are left out
pub fn encode_offset_or(offset: Option<Offset>, default: &str) -> String {
    let offset = match offset {
        Some(result) => result,
        None => return default.to_string(),
    };

    let mut text = String::from("P");
    for (value, unit) in [(offset.years, 'Y'), (offset.months, 'M'), (offset.days, 'D')] {
        if value > 0 {
            text.push_str(&format!("{value}{unit}"));
        }
    }

    text.push('T');
    for (value, unit) in [
        (offset.hours, 'H'),
        (offset.minutes, 'M'),
        (offset.seconds, 'S'),
    ] {
        if value > 0 {
            text.push_str(&format!("{value}{unit}"));
        }
    }

    // Nothing written. "PT" alone is not a valid duration
    if text.len() == 2 {
        return default.to_string();
    }
    text
}

/// Current local time at second precision
pub fn instant_now() -> Instant {
    let now = Local::now().naive_local();
    Instant::Local(now.with_nanosecond(0).unwrap_or(now))
}
