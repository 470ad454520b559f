//! Low-level value decoding.
//!
//! Every numeric, textual and temporal value in an MPP file is pulled out of
//! a raw byte buffer by one of these functions. They are pure and total: an
//! out-of-bounds or malformed read yields the documented default (0, empty,
//! `None`) instead of panicking, so a damaged field degrades to "unset"
//! rather than taking the whole record down.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use uuid::Uuid;

use crate::model::project::ProjectProperties;
use crate::model::{Duration, TimeUnit};

/// Day-count fields are measured from this date.
pub fn epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1984, 1, 1).unwrap_or(NaiveDate::MIN)
}

fn slice_at<const N: usize>(data: &[u8], offset: usize) -> Option<[u8; N]> {
    let end = offset.checked_add(N)?;
    let bytes = data.get(offset..end)?;
    let mut out = [0u8; N];
    out.copy_from_slice(bytes);
    Some(out)
}

pub fn u8_at(data: &[u8], offset: usize) -> u8 {
    data.get(offset).copied().unwrap_or(0)
}

pub fn u16_at(data: &[u8], offset: usize) -> u16 {
    slice_at(data, offset).map(u16::from_le_bytes).unwrap_or(0)
}

pub fn i16_at(data: &[u8], offset: usize) -> i16 {
    u16_at(data, offset) as i16
}

pub fn u32_at(data: &[u8], offset: usize) -> u32 {
    slice_at(data, offset).map(u32::from_le_bytes).unwrap_or(0)
}

pub fn i32_at(data: &[u8], offset: usize) -> i32 {
    u32_at(data, offset) as i32
}

pub fn u64_at(data: &[u8], offset: usize) -> u64 {
    slice_at(data, offset).map(u64::from_le_bytes).unwrap_or(0)
}

pub fn i64_at(data: &[u8], offset: usize) -> i64 {
    u64_at(data, offset) as i64
}

/// IEEE-754 double. NaN (from garbage bytes) normalizes to 0.0 so cost and
/// work fields never carry NaN through the model.
pub fn f64_at(data: &[u8], offset: usize) -> f64 {
    let value = f64::from_bits(u64_at(data, offset));
    if value.is_nan() {
        0.0
    } else {
        value
    }
}

/// A 16-byte GUID: the first three groups are little-endian (4+2+2), the
/// final 8 bytes are literal.
pub fn guid_at(data: &[u8], offset: usize) -> Option<Uuid> {
    let d4: [u8; 8] = slice_at(data, offset + 8)?;
    Some(Uuid::from_fields(
        u32_at(data, offset),
        u16_at(data, offset + 4),
        u16_at(data, offset + 6),
        &d4,
    ))
}

/// A u16 day count since the 1984-01-01 epoch. 65535 means "not set".
pub fn date_at(data: &[u8], offset: usize) -> Option<NaiveDate> {
    let days = slice_at(data, offset).map(u16::from_le_bytes)?;
    if days == 65535 {
        return None;
    }
    Some(epoch() + chrono::Duration::days(i64::from(days)))
}

/// A u16 time of day in tenths of a minute, wrapped modulo one day.
pub fn time_at(data: &[u8], offset: usize) -> NaiveTime {
    let seconds = u32::from(u16_at(data, offset)) * 6 % 86_400;
    NaiveTime::from_num_seconds_from_midnight_opt(seconds, 0).unwrap_or_default()
}

/// A 4-byte timestamp cell: time in tenths of a minute at `offset`, day
/// count at `offset+2`.
///
/// Day 0, 1 or 65535 means "not set". A time of 65535 reads as midnight.
/// Day counts below 100 whose time carries a non-zero seconds component are
/// rejected as well; this mirrors the original decoder's guard against
/// spurious low-day records and is kept for compatibility, not because the
/// format documents it.
pub fn timestamp_at(data: &[u8], offset: usize) -> Option<NaiveDateTime> {
    let days = u16_at(data, offset + 2);
    if days <= 1 || days == 65535 {
        return None;
    }
    let time = match u16_at(data, offset) {
        65535 => 0,
        t => t,
    };
    let seconds = u32::from(time) * 6 % 86_400;
    if days < 100 && seconds % 60 != 0 {
        return None;
    }
    let date = epoch() + chrono::Duration::days(i64::from(days));
    let time = NaiveTime::from_num_seconds_from_midnight_opt(seconds, 0).unwrap_or_default();
    Some(date.and_time(time))
}

/// UTF-16LE text up to the first zero code unit or the end of the buffer.
pub fn unicode_string_at(data: &[u8], offset: usize) -> String {
    unicode_string_max(data, offset, data.len().saturating_sub(offset))
}

/// UTF-16LE text up to the first zero code unit, the end of the buffer, or
/// `max_bytes`, whichever comes first. A missing terminator is fine.
pub fn unicode_string_max(data: &[u8], offset: usize, max_bytes: usize) -> String {
    let end = data.len().min(offset.saturating_add(max_bytes));
    let mut units = Vec::new();
    let mut i = offset;
    while i + 2 <= end {
        let unit = u16::from_le_bytes([data[i], data[i + 1]]);
        if unit == 0 {
            break;
        }
        units.push(unit);
        i += 2;
    }
    char::decode_utf16(units)
        .map(|r| r.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect()
}

/// Convert a raw duration value using the fixed per-unit divisor table.
pub fn duration_of(value: f64, unit: TimeUnit) -> Duration {
    let divisor = match unit {
        TimeUnit::Minutes | TimeUnit::ElapsedMinutes => 10.0,
        TimeUnit::Hours | TimeUnit::ElapsedHours => 600.0,
        TimeUnit::Days => 4_800.0,
        TimeUnit::ElapsedDays => 14_400.0,
        TimeUnit::Weeks => 24_000.0,
        TimeUnit::ElapsedWeeks => 100_800.0,
        TimeUnit::Months => 96_000.0,
        TimeUnit::ElapsedMonths => 432_000.0,
    };
    Duration::new(value / divisor, unit)
}

/// Convert a raw duration value honoring the project's working-time
/// settings for day, week and month units.
///
/// A raw value of −1 is the "no value" sentinel. Elapsed units always use
/// the fixed calendar divisors (24h days, 7-day weeks, 30-day months); other
/// units not listed fall back to the fixed table.
pub fn adjusted_duration_of(
    properties: &ProjectProperties,
    value: i64,
    unit: TimeUnit,
) -> Option<Duration> {
    if value == -1 {
        return None;
    }
    let raw = value as f64;
    let per_unit = match unit {
        TimeUnit::Days => f64::from(properties.minutes_per_day) * 10.0,
        TimeUnit::Weeks => f64::from(properties.minutes_per_week) * 10.0,
        TimeUnit::Months => {
            f64::from(properties.minutes_per_day) * f64::from(properties.days_per_month) * 10.0
        }
        TimeUnit::ElapsedDays => 14_400.0,
        TimeUnit::ElapsedWeeks => 100_800.0,
        TimeUnit::ElapsedMonths => 432_000.0,
        _ => return Some(duration_of(raw, unit)),
    };
    let scaled = if per_unit == 0.0 { 0.0 } else { raw / per_unit };
    Some(Duration::new(scaled, unit))
}

/// Convert a raw work value (thousandths of a minute) to hours.
///
/// Magnitudes below 1000 are noise and read as "not set".
pub fn work_duration_of(value: i64) -> Option<Duration> {
    if value.unsigned_abs() < 1000 {
        return None;
    }
    Some(Duration::new(value as f64 / 60_000.0, TimeUnit::Hours))
}

/// XOR every byte with `code`. Applying it twice restores the input, so the
/// same call both decrypts and re-encrypts.
pub fn xor_transform(data: &mut [u8], code: u8) {
    if code == 0 {
        return;
    }
    for byte in data {
        *byte ^= code;
    }
}
