//! Event datetime resolution.
//!
//! Source datetime cells range from clean ISO timestamps to prose like
//! "14 May - AI Workshop". `DateResolver::resolve` is total: it walks a
//! ladder of accepted shapes and returns the epoch sentinel when nothing
//! matches, so downstream code never deals with a parse error.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;

use crate::config::MatchingConfig;

/// Permissive datetime shapes tried after the exact ladder steps.
const GENERIC_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%d/%m/%Y %H:%M",
];

const GENERIC_DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d-%m-%Y"];

/// Shared sentinel for unresolvable datetimes: the Unix epoch.
pub fn fallback_instant() -> NaiveDateTime {
    NaiveDateTime::default()
}

/// True when the instant is the unresolvable-date sentinel.
pub fn is_fallback(instant: NaiveDateTime) -> bool {
    instant == fallback_instant()
}

/// Resolves raw datetime text into an event-local instant.
pub struct DateResolver {
    embedded_utc: Regex,
    day_month: Regex,
    assumed_year: i32,
    utc_offset_hours: i64,
}

impl DateResolver {
    pub fn new(matching: &MatchingConfig) -> Self {
        DateResolver {
            embedded_utc: Regex::new(r"\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}\.\d{3}Z").unwrap(),
            day_month: Regex::new(
                r"(?i)^\s*(\d{1,2})(?:st|nd|rd|th)?\s+(jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\b",
            )
            .unwrap(),
            assumed_year: matching.assumed_year,
            utc_offset_hours: matching.utc_offset_hours,
        }
    }

    /// Resolve raw text to an event-local instant.
    ///
    /// Ladder, first hit wins:
    /// 1. an embedded `YYYY-MM-DDThh:mm:ss.sssZ` UTC timestamp anywhere in
    ///    the text, shifted into event local time;
    /// 2. exact `DD/MM/YYYY hh:mm:ss`;
    /// 3. exact `DD/MM/YYYY`, at midnight;
    /// 4. a leading `DD Month` fragment (trailing prose ignored), placed in
    ///    the assumed year at 09:00;
    /// 5. a short list of generic datetime and date shapes, then RFC 3339.
    ///
    /// Anything else resolves to [`fallback_instant`].
    pub fn resolve(&self, raw: &str) -> NaiveDateTime {
        let raw = raw.trim();
        if raw.is_empty() {
            return fallback_instant();
        }
        if let Some(m) = self.embedded_utc.find(raw) {
            if let Ok(utc) = NaiveDateTime::parse_from_str(m.as_str(), "%Y-%m-%dT%H:%M:%S%.3fZ") {
                return utc + Duration::hours(self.utc_offset_hours);
            }
        }
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%d/%m/%Y %H:%M:%S") {
            return dt;
        }
        if let Ok(d) = NaiveDate::parse_from_str(raw, "%d/%m/%Y") {
            return d.and_time(NaiveTime::MIN);
        }
        if let Some(caps) = self.day_month.captures(raw) {
            let day: u32 = caps[1].parse().unwrap_or(0);
            if let Some(month) = month_number(&caps[2]) {
                if let Some(date) = NaiveDate::from_ymd_opt(self.assumed_year, month, day) {
                    return date.and_hms_opt(9, 0, 0).unwrap();
                }
            }
        }
        for format in GENERIC_DATETIME_FORMATS {
            if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
                return dt;
            }
        }
        for format in GENERIC_DATE_FORMATS {
            if let Ok(d) = NaiveDate::parse_from_str(raw, format) {
                return d.and_time(NaiveTime::MIN);
            }
        }
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return dt.naive_utc() + Duration::hours(self.utc_offset_hours);
        }
        fallback_instant()
    }
}

fn month_number(name: &str) -> Option<u32> {
    match name.to_lowercase().as_str() {
        "jan" => Some(1),
        "feb" => Some(2),
        "mar" => Some(3),
        "apr" => Some(4),
        "may" => Some(5),
        "jun" => Some(6),
        "jul" => Some(7),
        "aug" => Some(8),
        "sep" => Some(9),
        "oct" => Some(10),
        "nov" => Some(11),
        "dec" => Some(12),
        _ => None,
    }
}
