//! Packed timestamp codec
//!
//! The logger stores a point in time as a single little-endian `u32` with
//! fixed-width bit fields, most significant first:
//!
//! | Field  | Bits | Offset |
//! |--------|------|--------|
//! | year   | 6    | 26     |
//! | month  | 4    | 22     |
//! | day    | 5    | 17     |
//! | hour   | 5    | 12     |
//! | minute | 6    | 6      |
//! | second | 6    | 0      |
//!
//! The year field holds `year - 2000`. Nothing is validated: values wider
//! than their field are masked and wrap silently.

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;

/// First year representable in the year field
pub const YEAR_BASE: u16 = 2000;

const YEAR_SHIFT: u32 = 26;
const YEAR_BITS: u32 = 6;
const MONTH_SHIFT: u32 = 22;
const MONTH_BITS: u32 = 4;
const DAY_SHIFT: u32 = 17;
const DAY_BITS: u32 = 5;
const HOUR_SHIFT: u32 = 12;
const HOUR_BITS: u32 = 5;
const MINUTE_SHIFT: u32 = 6;
const MINUTE_BITS: u32 = 6;
const SECOND_SHIFT: u32 = 0;
const SECOND_BITS: u32 = 6;

#[inline]
const fn mask(bits: u32) -> u32 {
    (1 << bits) - 1
}

#[inline]
const fn field(packed: u32, shift: u32, bits: u32) -> u32 {
    (packed >> shift) & mask(bits)
}

#[inline]
const fn place(value: u32, shift: u32, bits: u32) -> u32 {
    (value & mask(bits)) << shift
}

/// Calendar fields unpacked from a 32-bit packed timestamp
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DecodedTimestamp {
    /// Full year (e.g. 2024)
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl DecodedTimestamp {
    pub fn new(year: u16, month: u8, day: u8, hour: u8, minute: u8, second: u8) -> Self {
        Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
        }
    }

    /// Convert to a chrono date-time, if the fields form a valid date
    pub fn to_datetime(&self) -> Option<NaiveDateTime> {
        NaiveDate::from_ymd_opt(i32::from(self.year), u32::from(self.month), u32::from(self.day))?
            .and_hms_opt(
                u32::from(self.hour),
                u32::from(self.minute),
                u32::from(self.second),
            )
    }

    /// Build from a chrono date-time (sub-second precision is dropped)
    pub fn from_datetime(dt: &NaiveDateTime) -> Self {
        Self {
            year: u16::try_from(dt.year()).unwrap_or(YEAR_BASE),
            month: dt.month() as u8,
            day: dt.day() as u8,
            hour: dt.hour() as u8,
            minute: dt.minute() as u8,
            second: dt.second() as u8,
        }
    }
}

impl fmt::Display for DecodedTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}

/// Unpack a 32-bit packed timestamp
pub fn unpack(packed: u32) -> DecodedTimestamp {
    DecodedTimestamp {
        year: YEAR_BASE + field(packed, YEAR_SHIFT, YEAR_BITS) as u16,
        month: field(packed, MONTH_SHIFT, MONTH_BITS) as u8,
        day: field(packed, DAY_SHIFT, DAY_BITS) as u8,
        hour: field(packed, HOUR_SHIFT, HOUR_BITS) as u8,
        minute: field(packed, MINUTE_SHIFT, MINUTE_BITS) as u8,
        second: field(packed, SECOND_SHIFT, SECOND_BITS) as u8,
    }
}

/// Pack calendar fields into a 32-bit timestamp
pub fn pack(ts: &DecodedTimestamp) -> u32 {
    let year_offset = u32::from(ts.year.wrapping_sub(YEAR_BASE));

    place(year_offset, YEAR_SHIFT, YEAR_BITS)
        | place(u32::from(ts.month), MONTH_SHIFT, MONTH_BITS)
        | place(u32::from(ts.day), DAY_SHIFT, DAY_BITS)
        | place(u32::from(ts.hour), HOUR_SHIFT, HOUR_BITS)
        | place(u32::from(ts.minute), MINUTE_SHIFT, MINUTE_BITS)
        | place(u32::from(ts.second), SECOND_SHIFT, SECOND_BITS)
}
