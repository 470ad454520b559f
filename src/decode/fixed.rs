//! Fixed-record blocks: a metadata stream describing per-item offsets and
//! flags, plus a flat data buffer sliced into per-entity records.

use crate::error::{MppError, Result};

use super::bytes;

/// Magic constant opening the metadata header.
pub const MAGIC: u32 = 0xFADF_ADBA;

const HEADER_SIZE: usize = 16;
const DELETED_FLAG: u32 = 0x02;

/// One per-item metadata record: status flags, then the item's byte offset
/// into the companion data buffer.
#[derive(Debug, Clone, Copy)]
pub struct MetaItem {
    pub flags: u32,
    pub offset: u32,
}

/// The decoded metadata stream.
///
/// Header: magic, unknown, declared item count, unknown (4 bytes each).
/// The declared count is unreliable in the wild, so the usable count is
/// recomputed from the stream length; that adjusted count is what the data
/// decoder mirrors.
#[derive(Debug, Clone)]
pub struct FixedMeta {
    declared_count: u32,
    items: Vec<MetaItem>,
}

impl FixedMeta {
    pub fn parse(data: &[u8], item_size: usize) -> Result<FixedMeta> {
        if data.len() < HEADER_SIZE {
            return Err(MppError::Truncated("FixedMeta"));
        }
        let magic = bytes::u32_at(data, 0);
        if magic != MAGIC {
            log::debug!("unexpected FixedMeta magic 0x{magic:08X}");
        }
        let declared_count = bytes::u32_at(data, 8);
        let item_size = item_size.max(8);
        let count = (data.len() - HEADER_SIZE) / item_size;
        let mut items = Vec::with_capacity(count);
        for index in 0..count {
            let base = HEADER_SIZE + index * item_size;
            items.push(MetaItem {
                flags: bytes::u32_at(data, base),
                offset: bytes::u32_at(data, base + 4),
            });
        }
        Ok(FixedMeta {
            declared_count,
            items,
        })
    }

    /// The adjusted item count derived from the stream length.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn declared_item_count(&self) -> u32 {
        self.declared_count
    }

    pub fn item(&self, index: usize) -> Option<&MetaItem> {
        self.items.get(index)
    }

    /// Whether the slot at `index` is flagged deleted.
    pub fn is_deleted(&self, index: usize) -> bool {
        self.item(index)
            .is_some_and(|item| item.flags & DELETED_FLAG != 0)
    }
}

/// The data buffer sliced into per-item records.
#[derive(Debug)]
pub struct FixedData<'a> {
    items: Vec<Option<&'a [u8]>>,
}

impl<'a> FixedData<'a> {
    /// Slice `data` as directed by `meta`. Each item's size is the delta to
    /// the next item's offset; when that delta is unusable (last item, or
    /// offsets out of order) `max_size` is used instead, or the rest of the
    /// buffer when `max_size` is zero. Sizes clamp to the remaining buffer
    /// and to `max_size`; an item whose offset lies outside the buffer is
    /// absent, not an error.
    pub fn from_meta(meta: &FixedMeta, data: &'a [u8], max_size: usize) -> FixedData<'a> {
        let count = meta.item_count();
        let mut items = Vec::with_capacity(count);
        for index in 0..count {
            let offset = match meta.item(index) {
                Some(item) => item.offset as usize,
                None => {
                    items.push(None);
                    continue;
                }
            };
            if offset >= data.len() {
                items.push(None);
                continue;
            }
            let remaining = data.len() - offset;
            let mut size = match meta.item(index + 1) {
                Some(next) if next.offset as usize > offset => next.offset as usize - offset,
                _ if max_size == 0 => remaining,
                _ => max_size,
            };
            if max_size != 0 && size > max_size {
                size = max_size;
            }
            if size > remaining {
                size = remaining;
            }
            if size == 0 {
                items.push(None);
            } else {
                items.push(Some(&data[offset..offset + size]));
            }
        }
        FixedData { items }
    }

    /// Slice `data` into equal `item_size` chunks; used where no metadata
    /// stream exists.
    pub fn with_item_size(data: &'a [u8], item_size: usize) -> FixedData<'a> {
        if item_size == 0 {
            return FixedData { items: Vec::new() };
        }
        let items = data.chunks_exact(item_size).map(Some).collect();
        FixedData { items }
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn item(&self, index: usize) -> Option<&'a [u8]> {
        self.items.get(index).copied().flatten()
    }
}
