//! Calendar decoding, shared by all generations.
//!
//! The calendar storage pairs a small fixed record (unique id, parent id)
//! with a variable-data blob holding the actual week: seven 60-byte day
//! blocks, then the exception table. Derived calendars leave inherited
//! weekdays on the default marker.

use chrono::NaiveTime;

use crate::container::{find_storage, find_stream, Container};
use crate::decode::bytes;
use crate::decode::crypt::Protection;
use crate::decode::fixed::{FixedData, FixedMeta};
use crate::decode::var::{VarData, VarMeta, VarMetaShape};
use crate::error::Result;
use crate::model::{
    CalendarException, DayType, ProjectCalendar, ProjectFile, Recurrence, RecurrenceKind,
    TimeRange,
};

const NAME_KIND: u32 = 1;
const DATA_KIND: u32 = 3;

const FIXED_RECORD_SIZE: usize = 12;
const DAY_BLOCKS_START: usize = 4;
const DAY_BLOCK_SIZE: usize = 60;
const MAX_PERIODS: usize = 5;
const EXCEPTIONS_START: usize = 424;
const EXCEPTION_RECORD_SIZE: usize = 20;

pub(crate) fn process(
    storage: &dyn Container,
    protection: &Protection,
    shape: VarMetaShape,
    file: &mut ProjectFile,
) -> Result<()> {
    let dir = find_storage(storage, "TBkndCal")?;
    let meta = FixedMeta::parse(&find_stream(dir, "FixedMeta")?, 8)?;
    let data = protection.decode(find_stream(dir, "FixedData")?);
    let fixed = FixedData::from_meta(&meta, &data, FIXED_RECORD_SIZE);
    let var_meta = VarMeta::parse(&find_stream(dir, "VarMeta")?, shape)?;
    let var_buffer = find_stream(dir, "Var2Data")?;
    let var = VarData::new(&var_meta, &var_buffer);

    for index in 0..fixed.item_count() {
        if meta.is_deleted(index) {
            continue;
        }
        let Some(record) = fixed.item(index) else {
            continue;
        };
        if record.len() < 8 {
            continue;
        }
        let unique_id = bytes::u32_at(record, 0);
        if unique_id == 0 {
            continue;
        }
        let parent_id = bytes::u32_at(record, 4);

        let mut calendar = ProjectCalendar::new();
        calendar.unique_id = Some(unique_id);
        if parent_id != 0 {
            calendar.parent_unique_id = Some(parent_id);
        }
        let name = var.unicode_string(unique_id, NAME_KIND);
        if !name.is_empty() {
            calendar.name = Some(name);
        }

        match var.payload(unique_id, DATA_KIND) {
            Some(blob) => populate_from_blob(&mut calendar, blob),
            None => populate_defaults(&mut calendar),
        }
        file.calendars.push(calendar);
    }
    log::debug!("decoded {} calendars", file.calendars.len());
    Ok(())
}

/// A calendar with no data blob: base calendars get the standard working
/// week, derived ones inherit everything.
fn populate_defaults(calendar: &mut ProjectCalendar) {
    if !calendar.is_base() {
        return;
    }
    for (day, slot) in calendar.days.iter_mut().enumerate() {
        // Slot 0 is Sunday, 6 is Saturday.
        if day == 0 || day == 6 {
            slot.day_type = DayType::NonWorking;
            slot.hours.clear();
        } else {
            *slot = crate::model::CalendarDay::standard_working();
        }
    }
}

fn populate_from_blob(calendar: &mut ProjectCalendar, data: &[u8]) {
    for day in 0..7 {
        let offset = DAY_BLOCKS_START + day * DAY_BLOCK_SIZE;
        if offset + DAY_BLOCK_SIZE > data.len() {
            break;
        }
        let flag = bytes::u16_at(data, offset);
        if flag == 0 {
            // Default marker: inherit from the parent (or the standard
            // week for base calendars, as consumers see fit).
            continue;
        }
        let slot = &mut calendar.days[day];
        slot.hours.clear();
        let periods = (bytes::u16_at(data, offset + 2) as usize).min(MAX_PERIODS);
        if periods == 0 {
            slot.day_type = DayType::NonWorking;
            continue;
        }
        slot.day_type = DayType::Working;
        for period in 0..periods {
            let start_tenths = u32::from(bytes::u16_at(data, offset + 8 + 2 * period));
            let duration_tenths = bytes::u32_at(data, offset + 20 + 4 * period);
            slot.hours.push(range_of(start_tenths, duration_tenths));
        }
    }

    if data.len() < EXCEPTIONS_START + 2 {
        return;
    }
    let count = bytes::u16_at(data, EXCEPTIONS_START) as usize;
    for index in 0..count {
        let base = EXCEPTIONS_START + 2 + index * EXCEPTION_RECORD_SIZE;
        if base + EXCEPTION_RECORD_SIZE > data.len() {
            break;
        }
        let Some(from) = bytes::date_at(data, base) else {
            continue;
        };
        let to = bytes::date_at(data, base + 2).unwrap_or(from);
        let mut hours = Vec::new();
        if bytes::u16_at(data, base + 4) > 0 {
            let start_tenths = u32::from(bytes::u16_at(data, base + 6));
            let duration_tenths = bytes::u32_at(data, base + 8);
            hours.push(range_of(start_tenths, duration_tenths));
        }
        let recurrence = recurrence_of(
            bytes::u16_at(data, base + 12),
            bytes::u16_at(data, base + 14),
        );
        calendar.exceptions.push(CalendarException {
            from,
            to,
            hours,
            recurrence,
        });
    }
}

fn range_of(start_tenths: u32, duration_tenths: u32) -> TimeRange {
    let start = start_tenths * 6 % 86_400;
    let end = start
        .saturating_add(duration_tenths.saturating_mul(6))
        .min(86_399);
    TimeRange::new(time_of(start), time_of(end))
}

fn time_of(seconds: u32) -> NaiveTime {
    NaiveTime::from_num_seconds_from_midnight_opt(seconds.min(86_399), 0).unwrap_or_default()
}

fn recurrence_of(kind: u16, interval: u16) -> Option<Recurrence> {
    let kind = match kind {
        1 => RecurrenceKind::Daily,
        2 => RecurrenceKind::Weekly,
        3 => RecurrenceKind::Monthly,
        4 => RecurrenceKind::Yearly,
        _ => return None,
    };
    Some(Recurrence {
        kind,
        interval: interval.max(1),
    })
}
