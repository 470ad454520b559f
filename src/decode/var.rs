//! Variable-record blocks: a metadata table mapping `(entity id, field
//! type)` to offsets in a companion buffer of length-prefixed payloads.
//! Strings live here; so does anything else too irregular for the fixed
//! records.

use std::collections::BTreeMap;

use crate::error::{MppError, Result};

use super::bytes;
use super::fixed::MAGIC;

/// The two on-disk metadata shapes.
///
/// `Old` is a 16-byte header followed by 8-byte items (3-byte id, 1-byte
/// type, 4-byte offset). `New` is a 24-byte header whose last field is the
/// declared data size, followed by 12-byte items (4-byte id, 4-byte offset,
/// 2-byte type, 2-byte padding). `New` headers sometimes carry a zeroed
/// magic in otherwise readable files, so zero passes validation there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarMetaShape {
    Old,
    New,
}

#[derive(Debug, Clone)]
pub struct VarMeta {
    entries: BTreeMap<(u32, u32), usize>,
}

impl VarMeta {
    pub fn parse(data: &[u8], shape: VarMetaShape) -> Result<VarMeta> {
        let header_size = match shape {
            VarMetaShape::Old => 16,
            VarMetaShape::New => 24,
        };
        if data.len() < header_size {
            return Err(MppError::Truncated("VarMeta"));
        }
        let magic = bytes::u32_at(data, 0);
        let magic_ok = magic == MAGIC || (shape == VarMetaShape::New && magic == 0);
        if !magic_ok {
            return Err(MppError::InvalidStream {
                stream: "VarMeta",
                detail: format!("unexpected magic 0x{magic:08X}"),
            });
        }
        let declared = bytes::u32_at(data, 8) as usize;
        let stride = match shape {
            VarMetaShape::Old => 8,
            VarMetaShape::New => 12,
        };
        let count = declared.min((data.len() - header_size) / stride);
        let mut entries = BTreeMap::new();
        for index in 0..count {
            let base = header_size + index * stride;
            let (unique_id, kind, offset) = match shape {
                VarMetaShape::Old => {
                    let unique_id = bytes::u32_at(data, base) & 0x00FF_FFFF;
                    let kind = u32::from(bytes::u8_at(data, base + 3));
                    let offset = bytes::u32_at(data, base + 4);
                    (unique_id, kind, offset)
                }
                VarMetaShape::New => {
                    let unique_id = bytes::u32_at(data, base);
                    let offset = bytes::u32_at(data, base + 4);
                    let kind = u32::from(bytes::u16_at(data, base + 8));
                    (unique_id, kind, offset)
                }
            };
            entries.insert((unique_id, kind), offset as usize);
        }
        Ok(VarMeta { entries })
    }

    pub fn offset(&self, unique_id: u32, kind: u32) -> Option<usize> {
        self.entries.get(&(unique_id, kind)).copied()
    }

    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }
}

/// The data buffer, read through its metadata.
#[derive(Debug, Clone, Copy)]
pub struct VarData<'a> {
    meta: &'a VarMeta,
    data: &'a [u8],
}

impl<'a> VarData<'a> {
    pub fn new(meta: &'a VarMeta, data: &'a [u8]) -> VarData<'a> {
        VarData { meta, data }
    }

    /// The payload for one `(entity, field type)` pair: a 4-byte length
    /// prefix at the mapped offset, then that many bytes. A missing entry
    /// or a payload running past the buffer reads as absent.
    pub fn payload(&self, unique_id: u32, kind: u32) -> Option<&'a [u8]> {
        let offset = self.meta.offset(unique_id, kind)?;
        let length = bytes::u32_at(self.data, offset) as usize;
        let start = offset.checked_add(4)?;
        self.data.get(start..start.checked_add(length)?)
    }

    pub fn unicode_string(&self, unique_id: u32, kind: u32) -> String {
        self.payload(unique_id, kind)
            .map_or_else(String::new, |p| bytes::unicode_string_at(p, 0))
    }

    /// Single-byte text up to the first NUL.
    pub fn string(&self, unique_id: u32, kind: u32) -> String {
        self.payload(unique_id, kind).map_or_else(String::new, |p| {
            p.iter()
                .take_while(|&&b| b != 0)
                .map(|&b| char::from(b))
                .collect()
        })
    }

    pub fn byte(&self, unique_id: u32, kind: u32) -> u8 {
        self.payload(unique_id, kind)
            .map_or(0, |p| bytes::u8_at(p, 0))
    }

    pub fn short(&self, unique_id: u32, kind: u32) -> u16 {
        self.payload(unique_id, kind)
            .map_or(0, |p| bytes::u16_at(p, 0))
    }

    pub fn int(&self, unique_id: u32, kind: u32) -> u32 {
        self.payload(unique_id, kind)
            .map_or(0, |p| bytes::u32_at(p, 0))
    }

    pub fn long(&self, unique_id: u32, kind: u32) -> i64 {
        self.payload(unique_id, kind)
            .map_or(0, |p| bytes::i64_at(p, 0))
    }

    pub fn double(&self, unique_id: u32, kind: u32) -> f64 {
        self.payload(unique_id, kind)
            .map_or(0.0, |p| bytes::f64_at(p, 0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn old_meta(items: &[(u32, u8, u32)]) -> Vec<u8> {
        let mut data = Vec::new();
        data.extend_from_slice(&MAGIC.to_le_bytes());
        data.extend_from_slice(&0u32.to_le_bytes());
        data.extend_from_slice(&(items.len() as u32).to_le_bytes());
        data.extend_from_slice(&0u32.to_le_bytes());
        for (id, kind, offset) in items {
            data.extend_from_slice(&id.to_le_bytes()[..3]);
            data.push(*kind);
            data.extend_from_slice(&offset.to_le_bytes());
        }
        data
    }

    fn new_meta(magic: u32, items: &[(u32, u16, u32)]) -> Vec<u8> {
        let mut data = Vec::new();
        data.extend_from_slice(&magic.to_le_bytes());
        data.extend_from_slice(&0u32.to_le_bytes());
        data.extend_from_slice(&(items.len() as u32).to_le_bytes());
        data.extend_from_slice(&[0u8; 12]);
        for (id, kind, offset) in items {
            data.extend_from_slice(&id.to_le_bytes());
            data.extend_from_slice(&offset.to_le_bytes());
            data.extend_from_slice(&kind.to_le_bytes());
            data.extend_from_slice(&[0u8; 2]);
        }
        data
    }

    fn payload_buffer(entries: &[&[u8]]) -> Vec<u8> {
        let mut data = Vec::new();
        for entry in entries {
            data.extend_from_slice(&(entry.len() as u32).to_le_bytes());
            data.extend_from_slice(entry);
        }
        data
    }

    #[test]
    fn old_shape_packs_id_and_type_into_four_bytes() {
        let data = old_meta(&[(0x0002_0301, 7, 0)]);
        let meta = VarMeta::parse(&data, VarMetaShape::Old).unwrap();
        assert_eq!(meta.offset(0x0002_0301, 7), Some(0));
        assert_eq!(meta.offset(0x0002_0301, 8), None);
    }

    #[test]
    fn new_shape_reads_wide_ids_and_short_types() {
        let data = new_meta(MAGIC, &[(9, 14, 4), (9, 15, 20)]);
        let meta = VarMeta::parse(&data, VarMetaShape::New).unwrap();
        assert_eq!(meta.entry_count(), 2);
        assert_eq!(meta.offset(9, 14), Some(4));
        assert_eq!(meta.offset(9, 15), Some(20));
    }

    #[test]
    fn bad_magic_is_rejected_but_zero_passes_for_the_new_shape() {
        let data = new_meta(0, &[(1, 1, 0)]);
        assert!(VarMeta::parse(&data, VarMetaShape::New).is_ok());

        let data = new_meta(0xDEAD_BEEF, &[(1, 1, 0)]);
        assert!(matches!(
            VarMeta::parse(&data, VarMetaShape::New),
            Err(MppError::InvalidStream { stream: "VarMeta", .. })
        ));

        let mut data = old_meta(&[(1, 1, 0)]);
        data[0..4].copy_from_slice(&0u32.to_le_bytes());
        assert!(VarMeta::parse(&data, VarMetaShape::Old).is_err());
    }

    #[test]
    fn declared_count_clamps_to_stream_length() {
        let mut data = old_meta(&[(1, 1, 0)]);
        data[8..12].copy_from_slice(&50u32.to_le_bytes());
        let meta = VarMeta::parse(&data, VarMetaShape::Old).unwrap();
        assert_eq!(meta.entry_count(), 1);
    }

    #[test]
    fn payloads_are_length_prefixed() {
        let buffer = payload_buffer(&[b"abc", b"defgh"]);
        let data = new_meta(MAGIC, &[(1, 1, 0), (1, 2, 7)]);
        let meta = VarMeta::parse(&data, VarMetaShape::New).unwrap();
        let var = VarData::new(&meta, &buffer);
        assert_eq!(var.payload(1, 1), Some(&b"abc"[..]));
        assert_eq!(var.payload(1, 2), Some(&b"defgh"[..]));
        assert_eq!(var.string(1, 1), "abc");
    }

    #[test]
    fn overrunning_payload_reads_as_absent() {
        let mut buffer = Vec::new();
        buffer.extend_from_slice(&100u32.to_le_bytes());
        buffer.extend_from_slice(b"xy");
        let data = new_meta(MAGIC, &[(1, 1, 0)]);
        let meta = VarMeta::parse(&data, VarMetaShape::New).unwrap();
        let var = VarData::new(&meta, &buffer);
        assert_eq!(var.payload(1, 1), None);
        assert_eq!(var.string(1, 1), "");
        assert_eq!(var.int(1, 1), 0);
    }

    #[test]
    fn typed_accessors_decode_the_payload_head() {
        let mut buffer = Vec::new();
        buffer.extend_from_slice(&8u32.to_le_bytes());
        buffer.extend_from_slice(&3.5f64.to_le_bytes());
        let mut name = Vec::new();
        for unit in "crew".encode_utf16() {
            name.extend_from_slice(&unit.to_le_bytes());
        }
        name.extend_from_slice(&[0, 0]);
        buffer.extend_from_slice(&(name.len() as u32).to_le_bytes());
        buffer.extend_from_slice(&name);
        buffer.extend_from_slice(&8u32.to_le_bytes());
        buffer.extend_from_slice(&(-120i64).to_le_bytes());

        let data = new_meta(MAGIC, &[(3, 1, 0), (3, 2, 12), (3, 3, 26)]);
        let meta = VarMeta::parse(&data, VarMetaShape::New).unwrap();
        let var = VarData::new(&meta, &buffer);
        assert_eq!(var.double(3, 1), 3.5);
        assert_eq!(var.unicode_string(3, 2), "crew");
        assert_eq!(var.long(3, 3), -120);
        assert_eq!(var.byte(3, 3), 0x88); // low byte of the two's complement
        assert_eq!(var.short(99, 1), 0);
    }
}
