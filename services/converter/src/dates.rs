//! Date normalization for the execution and submission columns.
//!
//! The sheet mixes three encodings in the same column: native date cells,
//! day/month/year strings typed by hand, and bare serial numbers. All of
//! them end up as a `NaiveDate`, or `None` when the cell is empty or cannot
//! be read as a date.

use crate::cell::{parse_number, CellValue};
use chrono::{Days, NaiveDate};

/// Days subtracted from a serial number before it is added to the epoch.
///
/// The sheet has always been converted with `epoch + (serial - 1)`, one day
/// earlier than the usual spreadsheet reading of the same serial (45000 is
/// 2023-03-14 here, 2023-03-15 in the spreadsheet UI). Changing this moves
/// every serial-encoded date in the output.
pub const SERIAL_DAY_SHIFT: f64 = 1.0;

/// Serials further than this from the epoch are treated as garbage.
const MAX_SERIAL_DAYS: f64 = 3_000_000.0;

fn serial_epoch() -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(1899, 12, 30)
}

/// Normalize a raw cell into a calendar date.
///
/// Rules, first match wins:
/// 1. falsy cell -> `None`
/// 2. native date -> unchanged
/// 3. text with `/` -> `day/month/year`, no range correction
/// 4. number, or text that parses as one -> serial day offset
/// 5. text in `YYYY-MM-DD` form -> that date
pub fn normalize_date(value: &CellValue) -> Option<NaiveDate> {
    if value.is_falsy() {
        return None;
    }

    match value {
        CellValue::Date(date) => Some(*date),
        CellValue::Text(text) if text.contains('/') => from_day_month_year(text),
        CellValue::Text(text) => match parse_number(text) {
            Some(serial) => from_serial(serial),
            None => NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d").ok(),
        },
        CellValue::Number(serial) => from_serial(*serial),
        other => from_serial(other.to_number()),
    }
}

/// `dd/mm/yyyy`. Components past the third are ignored.
///
/// Out-of-range components are not clamped or rolled over: a day or month
/// that no calendar has yields `None`.
fn from_day_month_year(text: &str) -> Option<NaiveDate> {
    let mut parts = text.split('/').map(str::trim);
    let day: u32 = parts.next()?.parse().ok()?;
    let month: u32 = parts.next()?.parse().ok()?;
    let year: i32 = parts.next()?.parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Serial day offset from 1899-12-30, shifted by [`SERIAL_DAY_SHIFT`] and
/// truncated to whole days.
pub fn from_serial(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() {
        return None;
    }

    let days = (serial - SERIAL_DAY_SHIFT).floor();
    if days.abs() > MAX_SERIAL_DAYS {
        return None;
    }

    let epoch = serial_epoch()?;
    if days >= 0.0 {
        epoch.checked_add_days(Days::new(days as u64))
    } else {
        epoch.checked_sub_days(Days::new((-days) as u64))
    }
}
