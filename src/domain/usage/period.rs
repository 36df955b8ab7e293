//! Monthly accounting periods

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, Offset, TimeZone, Utc};

use crate::domain::DomainError;

/// Half-open window `[start, end)` covering one calendar month
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Period {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Period {
    /// The month containing `now`, with month boundaries taken in `zone`
    pub fn containing(now: DateTime<Utc>, zone: FixedOffset) -> Result<Self, DomainError> {
        let local = now.with_timezone(&zone);
        let (year, month) = (local.year(), local.month());
        let (next_year, next_month) = if month == 12 {
            (year + 1, 1)
        } else {
            (year, month + 1)
        };

        Ok(Self {
            start: month_start(year, month, zone)?,
            end: month_start(next_year, next_month, zone)?,
        })
    }

    /// The month containing `now` in UTC
    pub fn current_utc(now: DateTime<Utc>) -> Result<Self, DomainError> {
        Self::containing(now, Utc.fix())
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.start && at < self.end
    }
}

/// Build a fixed reference zone from an offset in minutes east of UTC
pub fn offset_from_minutes(minutes: i32) -> Result<FixedOffset, DomainError> {
    FixedOffset::east_opt(minutes.saturating_mul(60)).ok_or_else(|| {
        DomainError::configuration(format!("Invalid period UTC offset: {} minutes", minutes))
    })
}

fn month_start(year: i32, month: u32, zone: FixedOffset) -> Result<DateTime<Utc>, DomainError> {
    let naive = NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .ok_or_else(|| DomainError::internal(format!("Invalid period start {}-{}", year, month)))?;

    zone.from_local_datetime(&naive)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| DomainError::internal(format!("Ambiguous period start {}-{}", year, month)))
}
