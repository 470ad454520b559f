//! Property stores: flat key-to-blob maps used for project settings and the
//! embedded field maps.
//!
//! Each format generation serializes the store differently, but once parsed
//! they all behave the same: look a key up, decode the blob with a typed
//! accessor, fall back to a default when the key is absent.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use uuid::Uuid;

use super::bytes;

/// Well-known property keys.
///
/// The high byte groups keys by section. Every key stays below 2^24 so the
/// same constants work for the middle-generation store, whose on-disk key
/// is only three bytes wide.
pub mod keys {
    pub const PROJECT_START_DATE: u32 = 0x24_0002;
    pub const PROJECT_FINISH_DATE: u32 = 0x24_0003;
    pub const SCHEDULE_FROM: u32 = 0x24_0004;
    pub const CURRENCY_SYMBOL: u32 = 0x24_0010;
    pub const CURRENCY_DIGITS: u32 = 0x24_0012;
    pub const DURATION_UNITS: u32 = 0x24_0015;
    pub const MINUTES_PER_DAY: u32 = 0x24_0018;
    pub const MINUTES_PER_WEEK: u32 = 0x24_0019;
    pub const DAYS_PER_MONTH: u32 = 0x24_001A;
    pub const DEFAULT_START_TIME: u32 = 0x24_001C;
    pub const STATUS_DATE: u32 = 0x24_0045;

    pub const PASSWORD_FLAG: u32 = 0x35_0400;
    pub const ENCRYPTION_CODE: u32 = 0x35_0401;

    pub const TASK_FIELD_MAP: u32 = 0x02_0014;
    pub const RESOURCE_FIELD_MAP: u32 = 0x02_0015;
    pub const ASSIGNMENT_FIELD_MAP: u32 = 0x02_0016;
}

/// A parsed property store.
#[derive(Debug, Default, Clone)]
pub struct Props {
    entries: BTreeMap<u32, Vec<u8>>,
}

impl Props {
    /// The first-generation layout: a 16-byte header with a u16 record
    /// count at offset 12, then `[u32 size][u32 key][payload]` records,
    /// each padded to an even length.
    pub fn parse9(data: &[u8]) -> Props {
        let mut props = Props::default();
        if data.len() < 16 {
            return props;
        }
        let count = bytes::u16_at(data, 12);
        let mut offset = 16;
        for _ in 0..count {
            if offset + 8 > data.len() {
                break;
            }
            let size = bytes::u32_at(data, offset) as usize;
            let key = bytes::u32_at(data, offset + 4);
            offset += 8;
            if offset + size > data.len() {
                break;
            }
            props.entries.insert(key, data[offset..offset + size].to_vec());
            offset += size + size % 2;
        }
        props
    }

    /// The middle-generation layout: a 24-byte header with a u16 record
    /// count at offset 12, then `[3-byte id][1-byte type][u32 size][payload]`
    /// records padded to an even length. Entries are keyed by the 3-byte id.
    pub fn parse12(data: &[u8]) -> Props {
        let mut props = Props::default();
        if data.len() < 24 {
            return props;
        }
        let count = bytes::u16_at(data, 12);
        let mut offset = 24;
        for _ in 0..count {
            if offset + 8 > data.len() {
                break;
            }
            let key = bytes::u32_at(data, offset) & 0x00FF_FFFF;
            let size = bytes::u32_at(data, offset + 4) as usize;
            offset += 8;
            if offset + size > data.len() {
                break;
            }
            props.entries.insert(key, data[offset..offset + size].to_vec());
            offset += size + size % 2;
        }
        props
    }

    /// The newest layout: a 24-byte header with a u16 record count at
    /// offset 12, then `[u32 key][u32 size][payload]` records padded to an
    /// even length.
    pub fn parse14(data: &[u8]) -> Props {
        let mut props = Props::default();
        if data.len() < 24 {
            return props;
        }
        let count = bytes::u16_at(data, 12);
        let mut offset = 24;
        for _ in 0..count {
            if offset + 8 > data.len() {
                break;
            }
            let key = bytes::u32_at(data, offset);
            let size = bytes::u32_at(data, offset + 4) as usize;
            offset += 8;
            if offset + size > data.len() {
                break;
            }
            props.entries.insert(key, data[offset..offset + size].to_vec());
            offset += size + size % 2;
        }
        props
    }

    pub fn insert(&mut self, key: u32, value: Vec<u8>) {
        self.entries.insert(key, value);
    }

    pub fn bytes(&self, key: u32) -> Option<&[u8]> {
        self.entries.get(&key).map(Vec::as_slice)
    }

    pub fn has(&self, key: u32) -> bool {
        self.entries.contains_key(&key)
    }

    pub fn byte(&self, key: u32) -> u8 {
        self.bytes(key).map_or(0, |b| bytes::u8_at(b, 0))
    }

    pub fn short(&self, key: u32) -> u16 {
        self.bytes(key).map_or(0, |b| bytes::u16_at(b, 0))
    }

    pub fn int(&self, key: u32) -> u32 {
        self.bytes(key).map_or(0, |b| bytes::u32_at(b, 0))
    }

    pub fn double(&self, key: u32) -> f64 {
        self.bytes(key).map_or(0.0, |b| bytes::f64_at(b, 0))
    }

    /// Any non-zero leading byte reads as true.
    pub fn boolean(&self, key: u32) -> bool {
        self.byte(key) != 0
    }

    pub fn unicode_string(&self, key: u32) -> String {
        self.bytes(key)
            .map_or_else(String::new, |b| bytes::unicode_string_at(b, 0))
    }

    pub fn date(&self, key: u32) -> Option<NaiveDate> {
        self.bytes(key).and_then(|b| bytes::date_at(b, 0))
    }

    pub fn time(&self, key: u32) -> Option<NaiveTime> {
        self.bytes(key).map(|b| bytes::time_at(b, 0))
    }

    pub fn timestamp(&self, key: u32) -> Option<NaiveDateTime> {
        self.bytes(key).and_then(|b| bytes::timestamp_at(b, 0))
    }

    /// A GUID property. Sixteen-byte blobs hold the binary form; larger
    /// blobs hold the bracketed `{...}` text form as UTF-16, which some
    /// writers emit instead.
    pub fn uuid(&self, key: u32) -> Option<Uuid> {
        let blob = self.bytes(key)?;
        if blob.len() == 16 {
            return bytes::guid_at(blob, 0);
        }
        let text = bytes::unicode_string_at(blob, 0);
        let trimmed = text.trim_start_matches('{').trim_end_matches('}');
        Uuid::parse_str(trimmed).ok()
    }
}
