//! Tolerant date/time parsing for observation files
//!
//! Source files mix ISO and US-style dates, with and without times, with
//! two- and four-digit years. [`parse_datetime`] walks [`DATETIME_LAYOUTS`]
//! top to bottom and returns the first layout that consumes the whole input.
//! The order matters: the single-digit US layouts (`M/D/YYYY`) precede the
//! zero-padded ones and win whenever both would match.

use crate::error::DateFormatUnrecognized;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use tracing::warn;

/// One element of a layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    /// Exactly four digits
    Year4,
    /// Exactly two digits, 69-99 => 19xx, 00-68 => 20xx
    Year2,
    /// One or two digits
    Month,
    /// Exactly two digits
    ZeroMonth,
    /// One or two digits
    Day,
    /// Exactly two digits
    ZeroDay,
    /// One or two digits
    Hour,
    /// Exactly two digits
    ZeroMinute,
    /// Exactly two digits, optionally followed by a fraction
    ZeroSecond,
    Lit(u8),
}

use Token::*;

const ISO_T_SECONDS: &[Token] = &[
    Year4, Lit(b'-'), ZeroMonth, Lit(b'-'), ZeroDay, Lit(b'T'),
    Hour, Lit(b':'), ZeroMinute, Lit(b':'), ZeroSecond,
];
const ISO_T_MINUTES: &[Token] = &[
    Year4, Lit(b'-'), ZeroMonth, Lit(b'-'), ZeroDay, Lit(b'T'),
    Hour, Lit(b':'), ZeroMinute,
];
const ISO_SPACE_SECONDS: &[Token] = &[
    Year4, Lit(b'-'), ZeroMonth, Lit(b'-'), ZeroDay, Lit(b' '),
    Hour, Lit(b':'), ZeroMinute, Lit(b':'), ZeroSecond,
];
const ISO_SPACE_MINUTES: &[Token] = &[
    Year4, Lit(b'-'), ZeroMonth, Lit(b'-'), ZeroDay, Lit(b' '),
    Hour, Lit(b':'), ZeroMinute,
];
const US_YEAR4_SECONDS: &[Token] = &[
    Month, Lit(b'/'), Day, Lit(b'/'), Year4, Lit(b' '),
    Hour, Lit(b':'), ZeroMinute, Lit(b':'), ZeroSecond,
];
const US_YEAR4_MINUTES: &[Token] = &[
    Month, Lit(b'/'), Day, Lit(b'/'), Year4, Lit(b' '),
    Hour, Lit(b':'), ZeroMinute,
];
const US_YEAR2_SECONDS: &[Token] = &[
    Month, Lit(b'/'), Day, Lit(b'/'), Year2, Lit(b' '),
    Hour, Lit(b':'), ZeroMinute, Lit(b':'), ZeroSecond,
];
const US_YEAR2_MINUTES: &[Token] = &[
    Month, Lit(b'/'), Day, Lit(b'/'), Year2, Lit(b' '),
    Hour, Lit(b':'), ZeroMinute,
];
const PADDED_YEAR4_SECONDS: &[Token] = &[
    ZeroMonth, Lit(b'/'), ZeroDay, Lit(b'/'), Year4, Lit(b' '),
    Hour, Lit(b':'), ZeroMinute, Lit(b':'), ZeroSecond,
];
const PADDED_YEAR4_MINUTES: &[Token] = &[
    ZeroMonth, Lit(b'/'), ZeroDay, Lit(b'/'), Year4, Lit(b' '),
    Hour, Lit(b':'), ZeroMinute,
];
const PADDED_YEAR2_SECONDS: &[Token] = &[
    ZeroMonth, Lit(b'/'), ZeroDay, Lit(b'/'), Year2, Lit(b' '),
    Hour, Lit(b':'), ZeroMinute, Lit(b':'), ZeroSecond,
];
const PADDED_YEAR2_MINUTES: &[Token] = &[
    ZeroMonth, Lit(b'/'), ZeroDay, Lit(b'/'), Year2, Lit(b' '),
    Hour, Lit(b':'), ZeroMinute,
];
const ISO_DATE: &[Token] = &[Year4, Lit(b'-'), ZeroMonth, Lit(b'-'), ZeroDay];
const PADDED_YEAR4_DATE: &[Token] = &[ZeroMonth, Lit(b'/'), ZeroDay, Lit(b'/'), Year4];
const PADDED_YEAR2_DATE: &[Token] = &[ZeroMonth, Lit(b'/'), ZeroDay, Lit(b'/'), Year2];

/// A named date/time layout
#[derive(Debug, Clone, Copy)]
pub struct DateTimeLayout {
    /// Human-readable form, e.g. `M/D/YY HH:MM`
    pub pattern: &'static str,
    tokens: &'static [Token],
}

/// Layouts in priority order
pub static DATETIME_LAYOUTS: [DateTimeLayout; 15] = [
    DateTimeLayout { pattern: "YYYY-MM-DD'T'HH:MM:SS", tokens: ISO_T_SECONDS },
    DateTimeLayout { pattern: "YYYY-MM-DD'T'HH:MM", tokens: ISO_T_MINUTES },
    DateTimeLayout { pattern: "YYYY-MM-DD HH:MM:SS", tokens: ISO_SPACE_SECONDS },
    DateTimeLayout { pattern: "YYYY-MM-DD HH:MM", tokens: ISO_SPACE_MINUTES },
    DateTimeLayout { pattern: "M/D/YYYY HH:MM:SS", tokens: US_YEAR4_SECONDS },
    DateTimeLayout { pattern: "M/D/YYYY HH:MM", tokens: US_YEAR4_MINUTES },
    DateTimeLayout { pattern: "M/D/YY HH:MM:SS", tokens: US_YEAR2_SECONDS },
    DateTimeLayout { pattern: "M/D/YY HH:MM", tokens: US_YEAR2_MINUTES },
    DateTimeLayout { pattern: "MM/DD/YYYY HH:MM:SS", tokens: PADDED_YEAR4_SECONDS },
    DateTimeLayout { pattern: "MM/DD/YYYY HH:MM", tokens: PADDED_YEAR4_MINUTES },
    DateTimeLayout { pattern: "MM/DD/YY HH:MM:SS", tokens: PADDED_YEAR2_SECONDS },
    DateTimeLayout { pattern: "MM/DD/YY HH:MM", tokens: PADDED_YEAR2_MINUTES },
    DateTimeLayout { pattern: "YYYY-MM-DD", tokens: ISO_DATE },
    DateTimeLayout { pattern: "MM/DD/YYYY", tokens: PADDED_YEAR4_DATE },
    DateTimeLayout { pattern: "MM/DD/YY", tokens: PADDED_YEAR2_DATE },
];

/// Parse `input` with the first matching layout in [`DATETIME_LAYOUTS`]
pub fn parse_datetime(input: &str) -> Result<NaiveDateTime, DateFormatUnrecognized> {
    DATETIME_LAYOUTS
        .iter()
        .find_map(|layout| layout.parse(input))
        .ok_or_else(|| {
            warn!("unknown date/time format '{}'", input);
            DateFormatUnrecognized {
                input: input.to_string(),
            }
        })
}

/// Fields collected while walking a layout
#[derive(Default)]
struct Parts {
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    minute: u32,
    second: u32,
    nanos: u32,
}

impl DateTimeLayout {
    /// Parse `input` with this layout only; the whole input must be consumed
    pub fn parse(&self, input: &str) -> Option<NaiveDateTime> {
        let mut rest = input.as_bytes();
        let mut parts = Parts::default();

        for token in self.tokens {
            rest = match *token {
                Lit(expected) => rest.strip_prefix(&[expected])?,
                Year4 => {
                    let (year, rest) = take_digits(rest, 4, 4)?;
                    parts.year = year as i32;
                    rest
                }
                Year2 => {
                    let (year, rest) = take_digits(rest, 2, 2)?;
                    let century = if year >= 69 { 1900 } else { 2000 };
                    parts.year = (century + year) as i32;
                    rest
                }
                Month | ZeroMonth => {
                    let min = if *token == ZeroMonth { 2 } else { 1 };
                    let (month, rest) = take_digits(rest, min, 2)?;
                    parts.month = month;
                    rest
                }
                Day | ZeroDay => {
                    let min = if *token == ZeroDay { 2 } else { 1 };
                    let (day, rest) = take_digits(rest, min, 2)?;
                    parts.day = day;
                    rest
                }
                Hour => {
                    let (hour, rest) = take_digits(rest, 1, 2)?;
                    parts.hour = hour;
                    rest
                }
                ZeroMinute => {
                    let (minute, rest) = take_digits(rest, 2, 2)?;
                    parts.minute = minute;
                    rest
                }
                ZeroSecond => {
                    let (second, rest) = take_digits(rest, 2, 2)?;
                    parts.second = second;
                    let (nanos, rest) = take_fraction(rest);
                    parts.nanos = nanos;
                    rest
                }
            };
        }

        if !rest.is_empty() {
            return None;
        }

        let date = NaiveDate::from_ymd_opt(parts.year, parts.month, parts.day)?;
        let time = NaiveTime::from_hms_nano_opt(parts.hour, parts.minute, parts.second, parts.nanos)?;
        Some(date.and_time(time))
    }
}

/// Read between `min` and `max` leading ASCII digits
fn take_digits(input: &[u8], min: usize, max: usize) -> Option<(u32, &[u8])> {
    let len = input
        .iter()
        .take(max)
        .take_while(|b| b.is_ascii_digit())
        .count();
    if len < min {
        return None;
    }

    let value = input[..len]
        .iter()
        .fold(0u32, |acc, b| acc * 10 + u32::from(b - b'0'));
    Some((value, &input[len..]))
}

/// Consume an optional `.123` / `,123` suffix, returning nanoseconds
fn take_fraction(input: &[u8]) -> (u32, &[u8]) {
    let Some((&sep, after)) = input.split_first() else {
        return (0, input);
    };
    if sep != b'.' && sep != b',' {
        return (0, input);
    }

    let len = after.iter().take_while(|b| b.is_ascii_digit()).count();
    if len == 0 {
        return (0, input);
    }

    // Digits past nanosecond precision are dropped
    let nanos = after[..len.min(9)]
        .iter()
        .fold(0u32, |acc, b| acc * 10 + u32::from(b - b'0'))
        * 10u32.pow(9 - len.min(9) as u32);
    (nanos, &after[len..])
}
