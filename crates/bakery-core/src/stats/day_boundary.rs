//! Which calendar date a timestamp falls on.

use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Fixed UTC offset used to cut timestamps into calendar days.
///
/// "Today" and the trend window are both evaluated in this offset. The
/// default is UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct DayBoundary {
    offset: FixedOffset,
}

impl DayBoundary {
    pub fn utc() -> Self {
        Self { offset: Utc.fix() }
    }

    /// Offset east of UTC in minutes, strictly within one day.
    pub fn from_offset_minutes(minutes: i32) -> Result<Self> {
        minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .map(|offset| Self { offset })
            .ok_or_else(|| {
                CoreError::invalid(
                    "utc_offset_minutes",
                    format!("{minutes} is outside -1439..=1439"),
                )
            })
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    pub fn offset_minutes(&self) -> i32 {
        self.offset.local_minus_utc() / 60
    }

    pub fn date_of(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.offset).date_naive()
    }
}

impl Default for DayBoundary {
    fn default() -> Self {
        Self::utc()
    }
}

impl TryFrom<i32> for DayBoundary {
    type Error = CoreError;

    fn try_from(minutes: i32) -> Result<Self> {
        Self::from_offset_minutes(minutes)
    }
}

impl From<DayBoundary> for i32 {
    fn from(boundary: DayBoundary) -> i32 {
        boundary.offset_minutes()
    }
}
