//! Post visibility rules and calendar bucketing.

use chrono::{DateTime, Datelike, TimeZone, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use time::{OffsetDateTime, format_description::FormatItem, macros::format_description};

use crate::domain::error::DomainError;

pub const HUMAN_DATE_FORMAT: &[FormatItem<'static>] =
    format_description!("[month repr:long] [day padding:none], [year]");

/// Whether a post's `l18n_cfg` bitmask permits the requesting language.
///
/// Default language (`0`) sees records with cfg `0` or `2`; any other
/// language sees records with cfg below `2`.
pub fn visible_in_language(language_cfg: i16, language: i64) -> bool {
    if language == 0 {
        language_cfg == 0 || language_cfg == 2
    } else {
        language_cfg < 2
    }
}

/// Whether the archive window still includes `now`. `0` never archives.
pub fn within_archive_window(archive_date: i64, now: i64) -> bool {
    archive_date == 0 || archive_date >= now
}

/// Derive the denormalized `(publish_month, publish_year)` pair from a
/// publish timestamp, bucketed in the site timezone.
pub fn publish_parts(timestamp: i64, tz: Tz) -> Result<(i16, i32), DomainError> {
    let utc = DateTime::<Utc>::from_timestamp(timestamp, 0).ok_or_else(|| {
        DomainError::invariant(format!("publish timestamp `{timestamp}` out of range"))
    })?;
    let local = tz.from_utc_datetime(&utc.naive_utc());
    Ok((local.month() as i16, local.year()))
}

/// Render a publish timestamp the way listings display it.
pub fn format_human_date(timestamp: i64) -> Result<String, DomainError> {
    let datetime = OffsetDateTime::from_unix_timestamp(timestamp).map_err(|_| {
        DomainError::invariant(format!("publish timestamp `{timestamp}` out of range"))
    })?;
    datetime
        .format(HUMAN_DATE_FORMAT)
        .map_err(|err| DomainError::invariant(format!("date formatting failed: {err}")))
}

/// Aggregated archive bucket: posts published in a given month and year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthCount {
    pub year: i32,
    pub month: i16,
    pub count: u64,
}

/// A whole month, or a whole year when `month` is absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchivePeriod {
    pub year: i32,
    pub month: Option<u8>,
}

impl ArchivePeriod {
    pub fn year(year: i32) -> Self {
        Self { year, month: None }
    }

    pub fn month(year: i32, month: u8) -> Self {
        Self {
            year,
            month: Some(month),
        }
    }

    /// Inclusive epoch bounds of the period in the site timezone.
    pub fn bounds(&self, tz: Tz) -> Result<(i64, i64), DomainError> {
        let (first_month, last_month) = match self.month {
            Some(month @ 1..=12) => (u32::from(month), u32::from(month)),
            Some(month) => {
                return Err(DomainError::invariant(format!(
                    "archive month `{month}` outside 1..=12"
                )));
            }
            None => (1, 12),
        };

        let start = tz
            .with_ymd_and_hms(self.year, first_month, 1, 0, 0, 0)
            .earliest()
            .ok_or_else(|| {
                DomainError::invariant(format!("no representable start for {}", self.year))
            })?;
        let end = tz
            .with_ymd_and_hms(
                self.year,
                last_month,
                days_in_month(self.year, last_month),
                23,
                59,
                59,
            )
            .latest()
            .ok_or_else(|| {
                DomainError::invariant(format!("no representable end for {}", self.year))
            })?;

        Ok((start.timestamp(), end.timestamp()))
    }
}

fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        _ => {
            if year % 4 == 0 && (year % 100 != 0 || year % 400 == 0) {
                29
            } else {
                28
            }
        }
    }
}
