//! Epoch timestamp conversion
//!
//! Rows store Unix epoch seconds. The driver wants Windows file times:
//! 100-nanosecond ticks since 1601-01-01, split into two 32-bit words.

use chrono::{DateTime, Utc};

/// Ticks between 1601-01-01 and 1970-01-01
const EPOCH_DIFFERENCE_TICKS: i64 = 116_444_736_000_000_000;

const TICKS_PER_SECOND: i64 = 10_000_000;

/// Platform file time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FileTime {
    pub low_date_time: u32,
    pub high_date_time: u32,
}

impl FileTime {
    /// Convert Unix epoch seconds
    ///
    /// Times before 1601 clamp to zero; times past the representable range
    /// clamp to the maximum tick count.
    pub fn from_unix(secs: i64) -> Self {
        let ticks = secs
            .checked_mul(TICKS_PER_SECOND)
            .and_then(|t| t.checked_add(EPOCH_DIFFERENCE_TICKS))
            .unwrap_or(if secs < 0 { 0 } else { i64::MAX });
        Self::from_ticks(ticks.max(0) as u64)
    }

    pub fn from_ticks(ticks: u64) -> Self {
        FileTime {
            low_date_time: ticks as u32,
            high_date_time: (ticks >> 32) as u32,
        }
    }

    pub fn ticks(self) -> u64 {
        ((self.high_date_time as u64) << 32) | self.low_date_time as u64
    }

    /// Back to Unix epoch seconds (sub-second ticks truncated)
    ///
    /// Tick counts beyond `i64::MAX` saturate.
    pub fn to_unix(self) -> i64 {
        i64::try_from(self.ticks())
            .unwrap_or(i64::MAX)
            .saturating_sub(EPOCH_DIFFERENCE_TICKS)
            .div_euclid(TICKS_PER_SECOND)
    }

    pub fn to_datetime(self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.to_unix(), 0)
    }
}

/// Current time as Unix epoch seconds
pub fn now_unix() -> i64 {
    Utc::now().timestamp()
}
