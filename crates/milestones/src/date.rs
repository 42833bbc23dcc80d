//! Calendar dates and the normalizer that turns the loosely formatted date
//! strings found in milestone records into them.

use {
    chrono::{Datelike, Days, NaiveDate, Weekday},
    serde::{Deserialize, Deserializer, de::Error as _},
    serde_json::Value,
    serde_with::{DeserializeFromStr, SerializeDisplay},
    std::str::FromStr,
};

/// A pure calendar date (year, month, day).
///
/// Dates are never converted between time zones and never compared as
/// timestamps. Two milestones recorded on the same day are equal no matter
/// what time of day was attached to them.
#[derive(
    Clone,
    Copy,
    Debug,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
    derive_more::Display,
    derive_more::From,
    DeserializeFromStr,
    SerializeDisplay,
)]
pub struct CalendarDate(NaiveDate);

impl CalendarDate {
    pub const MIN: CalendarDate = CalendarDate(NaiveDate::MIN);

    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    pub fn weekday(&self) -> Weekday {
        self.0.weekday()
    }

    /// Monday through Friday.
    pub fn is_business_day(&self) -> bool {
        !matches!(self.weekday(), Weekday::Sat | Weekday::Sun)
    }

    /// Signed number of calendar days from `earlier` to `self`.
    pub fn days_since(&self, earlier: CalendarDate) -> i64 {
        self.0.signed_duration_since(earlier.0).num_days()
    }

    pub fn checked_sub_days(&self, days: u64) -> Option<Self> {
        self.0.checked_sub_days(Days::new(days)).map(Self)
    }

    pub fn checked_add_days(&self, days: u64) -> Option<Self> {
        self.0.checked_add_days(Days::new(days)).map(Self)
    }
}

#[derive(Debug, thiserror::Error)]
#[error("invalid calendar date {0:?}, expected YYYY-MM-DD")]
pub struct InvalidDate(pub String);

impl FromStr for CalendarDate {
    type Err = InvalidDate;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        normalize(Some(s)).ok_or_else(|| InvalidDate(s.to_owned()))
    }
}

/// Parses a raw date or timestamp string into a calendar date.
///
/// Accepts bare `YYYY-MM-DD` values as well as timestamps where the date is
/// followed by a space or a `T` and a time of day. The time of day is
/// discarded. Returns `None` for absent, empty or unparseable input; callers
/// treat that as a missing milestone rather than an error.
pub fn normalize(raw: Option<&str>) -> Option<CalendarDate> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }
    let date = raw
        .split(|c: char| c == ' ' || c == 'T')
        .next()
        .unwrap_or_default();
    if !has_iso_date_shape(date) {
        return None;
    }
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .ok()
        .map(CalendarDate)
}

fn has_iso_date_shape(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}

/// Deserializes an optional milestone date through [`normalize`], so that
/// `null`, empty strings, timestamps and garbage are all accepted. Values that
/// are not strings at all count as missing too.
pub fn deserialize_lenient<'de, D>(deserializer: D) -> Result<Option<CalendarDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(normalize(raw.as_ref().and_then(Value::as_str)))
}

/// Deserializes a date that must be present, still accepting a time suffix.
pub fn deserialize_required<'de, D>(deserializer: D) -> Result<CalendarDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    raw.parse().map_err(D::Error::custom)
}
