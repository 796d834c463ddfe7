//! Entry timestamps.
//!
//! ZIP archives record times in three encodings, with different precision:
//!
//! | Source | Encoding | Precision |
//! |--------|----------|-----------|
//! | Central directory header | MS-DOS date + time, local time, no zone | 2 seconds |
//! | Extended timestamp extra (`0x5455`) | signed Unix seconds | 1 second |
//! | NTFS extra (`0x000A`) | Windows FILETIME | 100 nanoseconds |
//!
//! [`Timestamp`] stores all of them as a FILETIME value so the finest source
//! is never truncated. DOS times carry no zone and are interpreted as UTC.
//!
//! # Example
//!
//! ```rust
//! use std::time::{Duration, UNIX_EPOCH};
//! use zipvfs::Timestamp;
//!
//! // 2024-03-15 12:30:08 in DOS encoding
//! let date = ((2024 - 1980) << 9) | (3 << 5) | 15;
//! let time = (12 << 11) | (30 << 5) | (8 / 2);
//! let ts = Timestamp::from_dos(date, time).unwrap();
//! assert_eq!(
//!     ts.as_system_time(),
//!     UNIX_EPOCH + Duration::from_secs(1_710_505_808)
//! );
//! ```

use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Windows FILETIME epoch: January 1, 1601 (UTC)
/// Difference from Unix epoch (January 1, 1970) in 100-nanosecond intervals.
const FILETIME_UNIX_DIFF: u64 = 116444736000000000;

/// Number of 100-nanosecond intervals per second.
const INTERVALS_PER_SECOND: u64 = 10_000_000;

const SECONDS_PER_DAY: i64 = 86_400;

/// A point in time attached to an archive entry.
///
/// Wraps a Windows FILETIME value (100-nanosecond intervals since January 1, 1601).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp {
    filetime: u64,
}

impl Timestamp {
    /// Creates a timestamp from a raw Windows FILETIME value.
    #[inline]
    pub const fn from_filetime(filetime: u64) -> Self {
        Self { filetime }
    }

    /// Creates a timestamp from Unix seconds (since January 1, 1970).
    ///
    /// Returns `None` if the timestamp would overflow.
    pub fn from_unix_secs(secs: i64) -> Option<Self> {
        let intervals = secs.unsigned_abs().checked_mul(INTERVALS_PER_SECOND)?;
        if secs < 0 {
            FILETIME_UNIX_DIFF
                .checked_sub(intervals)
                .map(Self::from_filetime)
        } else {
            FILETIME_UNIX_DIFF
                .checked_add(intervals)
                .map(Self::from_filetime)
        }
    }

    /// Creates a timestamp from an MS-DOS date and time pair.
    ///
    /// Layout (little-endian words as stored in ZIP headers):
    /// - date: bits 9-15 years since 1980, bits 5-8 month, bits 0-4 day
    /// - time: bits 11-15 hours, bits 5-10 minutes, bits 0-4 seconds / 2
    ///
    /// Returns `None` for the "no date" value (date `0`) and for fields out
    /// of range (month 0 or >12, day 0, hour >23, minute >59).
    pub fn from_dos(date: u16, time: u16) -> Option<Self> {
        let year = 1980 + i64::from(date >> 9);
        let month = u32::from((date >> 5) & 0x0F);
        let day = u32::from(date & 0x1F);
        let hour = i64::from(time >> 11);
        let minute = i64::from((time >> 5) & 0x3F);
        let second = i64::from(time & 0x1F) * 2;

        if !(1..=12).contains(&month) || day == 0 || hour > 23 || minute > 59 || second > 59 {
            return None;
        }

        let days = days_from_civil(year, month, day);
        Self::from_unix_secs(days * SECONDS_PER_DAY + hour * 3600 + minute * 60 + second)
    }

    /// Converts to a `SystemTime`, preserving 100-nanosecond precision.
    pub fn as_system_time(&self) -> SystemTime {
        let split = |intervals: u64| {
            Duration::new(
                intervals / INTERVALS_PER_SECOND,
                ((intervals % INTERVALS_PER_SECOND) * 100) as u32,
            )
        };
        if self.filetime >= FILETIME_UNIX_DIFF {
            UNIX_EPOCH + split(self.filetime - FILETIME_UNIX_DIFF)
        } else {
            UNIX_EPOCH - split(FILETIME_UNIX_DIFF - self.filetime)
        }
    }
}

impl Default for Timestamp {
    /// Returns the Unix epoch (January 1, 1970).
    fn default() -> Self {
        Self::from_filetime(FILETIME_UNIX_DIFF)
    }
}

impl From<Timestamp> for SystemTime {
    fn from(ts: Timestamp) -> SystemTime {
        ts.as_system_time()
    }
}

/// Days since 1970-01-01 for a proleptic Gregorian date.
fn days_from_civil(year: i64, month: u32, day: u32) -> i64 {
    let y = if month <= 2 { year - 1 } else { year };
    let era = y.div_euclid(400);
    let yoe = y - era * 400;
    let m = i64::from(month);
    let mp = if m > 2 { m - 3 } else { m + 9 };
    let doy = (153 * mp + 2) / 5 + i64::from(day) - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    era * 146_097 + doe - 719_468
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dos_date(year: u16, month: u16, day: u16) -> u16 {
        ((year - 1980) << 9) | (month << 5) | day
    }

    fn dos_time(hour: u16, minute: u16, second: u16) -> u16 {
        (hour << 11) | (minute << 5) | (second / 2)
    }

    /// Whole Unix seconds, rounded towards negative infinity.
    fn unix_secs(ts: Timestamp) -> i64 {
        let intervals = ts.filetime as i128 - FILETIME_UNIX_DIFF as i128;
        intervals.div_euclid(INTERVALS_PER_SECOND as i128) as i64
    }

    #[test]
    fn test_unix_epoch() {
        let ts = Timestamp::from_filetime(FILETIME_UNIX_DIFF);
        assert_eq!(unix_secs(ts), 0);
        assert_eq!(ts.as_system_time(), UNIX_EPOCH);
        assert_eq!(Timestamp::default(), ts);
    }

    #[test]
    fn test_from_unix_secs() {
        let ts = Timestamp::from_unix_secs(1).unwrap();
        assert_eq!(ts.filetime, FILETIME_UNIX_DIFF + INTERVALS_PER_SECOND);

        let ts = Timestamp::from_unix_secs(-1).unwrap();
        assert_eq!(ts.filetime, FILETIME_UNIX_DIFF - INTERVALS_PER_SECOND);
        assert_eq!(unix_secs(ts), -1);
    }

    #[test]
    fn test_from_unix_secs_overflow() {
        assert!(Timestamp::from_unix_secs(i64::MIN).is_none());
    }

    #[test]
    fn test_dos_earliest() {
        let ts = Timestamp::from_dos(dos_date(1980, 1, 1), 0).unwrap();
        assert_eq!(unix_secs(ts), 315_532_800);
    }

    #[test]
    fn test_dos_leap_day() {
        let ts = Timestamp::from_dos(dos_date(2000, 2, 29), dos_time(23, 59, 58)).unwrap();
        assert_eq!(unix_secs(ts), 951_868_798);
    }

    #[test]
    fn test_dos_two_second_resolution() {
        let even = Timestamp::from_dos(dos_date(2020, 6, 1), dos_time(0, 0, 10)).unwrap();
        let odd = Timestamp::from_dos(dos_date(2020, 6, 1), dos_time(0, 0, 11)).unwrap();
        assert_eq!(even, odd);
    }

    #[test]
    fn test_dos_invalid() {
        assert!(Timestamp::from_dos(0, 0).is_none());
        assert!(Timestamp::from_dos(dos_date(2020, 13, 1), 0).is_none());
        assert!(Timestamp::from_dos(dos_date(2020, 0, 1), 0).is_none());
        assert!(Timestamp::from_dos(dos_date(2020, 1, 0), 0).is_none());
        assert!(Timestamp::from_dos(dos_date(2020, 1, 1), dos_time(24, 0, 0)).is_none());
    }

    #[test]
    fn test_roundtrip_system_time() {
        let ts = Timestamp::from_filetime(FILETIME_UNIX_DIFF + 12_345_678_901);
        let expected = UNIX_EPOCH + Duration::new(1234, 567_890_100);
        assert_eq!(ts.as_system_time(), expected);
    }

    #[test]
    fn test_before_unix_epoch() {
        let ts = Timestamp::from_filetime(FILETIME_UNIX_DIFF - 5_000_000);
        assert_eq!(unix_secs(ts), -1);
        assert_eq!(ts.as_system_time(), UNIX_EPOCH - Duration::from_millis(500));
    }
}
