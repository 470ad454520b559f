//! Field-offset maps.
//!
//! Different files of the same format generation can place the same logical
//! field at different physical offsets, so a per-entity-kind descriptor
//! table ships inside the property store. Each 28-byte descriptor tells the
//! extraction stage where one field lives: a fixed-data block and offset, a
//! variable-data key, or nowhere at all (metadata-only fields).

use std::collections::BTreeMap;

use super::bytes;

/// One descriptor is 28 bytes on disk.
pub const RECORD_SIZE: usize = 28;

/// Storage category codes carried at descriptor offset +20.
///
/// The category decides how many bytes a fixed-data field occupies; text
/// always lives in variable data and occupies none.
pub mod category {
    pub const SHORT: u16 = 0x01;
    pub const INT: u16 = 0x02;
    pub const DOUBLE: u16 = 0x03;
    pub const GUID: u16 = 0x04;
    pub const TEXT: u16 = 0x05;
    /// Stored in the record's metadata item, never materialized as a field.
    pub const META: u16 = 0x40;
}

fn category_size(category: u16) -> usize {
    match category {
        category::SHORT => 2,
        category::INT => 4,
        category::DOUBLE => 8,
        category::GUID => 16,
        _ => 0,
    }
}

/// How a descriptor derives its variable-data key. The newest generation
/// reuses the field type value itself; older generations carry a separate
/// key byte at descriptor offset +6.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarKeyMode {
    TypeValue,
    SecondaryByte,
}

/// Where a logical field lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldLocation {
    FixedData { block: usize, offset: usize },
    VarData { key: u32 },
    Meta,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldItem {
    pub field: u16,
    pub category: u16,
    pub location: FieldLocation,
}

/// The decoded map for one entity kind (task, resource or assignment).
#[derive(Debug, Default, Clone)]
pub struct FieldMap {
    items: BTreeMap<u16, FieldItem>,
    block_sizes: Vec<usize>,
}

impl FieldMap {
    /// Decode a descriptor table. A trailing partial record is ignored.
    ///
    /// An offset of 65535 means the field lives in variable data, keyed per
    /// `mode`; a variable key of zero marks the field unmapped. Fixed-data
    /// offsets normally increase record to record; a decrease starts the
    /// next logical block, which is how formats with two physical byte
    /// arrays per entity encode the second one.
    pub fn parse(data: &[u8], mode: VarKeyMode) -> FieldMap {
        let mut map = FieldMap::default();
        let mut block = 0usize;
        let mut previous_offset: Option<usize> = None;
        let mut record = 0;
        while (record + 1) * RECORD_SIZE <= data.len() {
            let base = record * RECORD_SIZE;
            record += 1;

            let fixed_offset = bytes::u16_at(data, base + 4);
            let field_type = bytes::u32_at(data, base + 12);
            let field = (field_type & 0xFFFF) as u16;
            let category = bytes::u16_at(data, base + 20);

            let location = if category == category::META {
                FieldLocation::Meta
            } else if fixed_offset == 65535 {
                let key = match mode {
                    VarKeyMode::TypeValue => field_type & 0xFFFF,
                    VarKeyMode::SecondaryByte => u32::from(bytes::u8_at(data, base + 6)),
                };
                if key == 0 {
                    FieldLocation::Unknown
                } else {
                    FieldLocation::VarData { key }
                }
            } else {
                let offset = fixed_offset as usize;
                if previous_offset.is_some_and(|prev| offset < prev) {
                    block += 1;
                }
                previous_offset = Some(offset);
                map.note_fixed(block, offset, category);
                FieldLocation::FixedData { block, offset }
            };

            map.items.insert(
                field,
                FieldItem {
                    field,
                    category,
                    location,
                },
            );
        }
        map
    }

    /// Build a map from an in-code table; used for the default layouts when
    /// a file carries no descriptor table of its own.
    pub fn from_items(items: impl IntoIterator<Item = (u16, u16, FieldLocation)>) -> FieldMap {
        let mut map = FieldMap::default();
        for (field, category, location) in items {
            if let FieldLocation::FixedData { block, offset } = location {
                map.note_fixed(block, offset, category);
            }
            map.items.insert(
                field,
                FieldItem {
                    field,
                    category,
                    location,
                },
            );
        }
        map
    }

    fn note_fixed(&mut self, block: usize, offset: usize, category: u16) {
        if self.block_sizes.len() <= block {
            self.block_sizes.resize(block + 1, 0);
        }
        let end = offset + category_size(category);
        if self.block_sizes[block] < end {
            self.block_sizes[block] = end;
        }
    }

    pub fn item(&self, field: u16) -> Option<&FieldItem> {
        self.items.get(&field)
    }

    /// The fixed-data offset of `field`, optionally restricted to one block.
    pub fn fixed_offset(&self, field: u16, block: Option<usize>) -> Option<usize> {
        match self.item(field)?.location {
            FieldLocation::FixedData { block: b, offset } if block.is_none() || block == Some(b) => {
                Some(offset)
            }
            _ => None,
        }
    }

    pub fn var_key(&self, field: u16) -> Option<u32> {
        match self.item(field)?.location {
            FieldLocation::VarData { key } => Some(key),
            _ => None,
        }
    }

    /// Highest byte needed by any field mapped into `block`; sizes
    /// fixed-record buffers when the on-disk grouping is ambiguous.
    pub fn max_block_size(&self, block: usize) -> usize {
        self.block_sizes.get(block).copied().unwrap_or(0)
    }

    pub fn block_count(&self) -> usize {
        self.block_sizes.len()
    }
}
