//! Inter-task relation decoding.
//!
//! Relations live in their own storage as packed 20-byte records. The
//! newest generation writes the same logical records in either of two
//! physical encodings: metadata-described, or a bare array with no
//! metadata stream at all.

use crate::container::{find_storage, find_stream, Container};
use crate::decode::bytes;
use crate::decode::crypt::Protection;
use crate::decode::fixed::{FixedData, FixedMeta};
use crate::error::Result;
use crate::model::{Duration, ProjectFile, Relation, RelationType, TimeUnit};

/// Source id at +4, target id at +8, type at +12, lag at +14.
const RECORD_SIZE: usize = 20;

pub(crate) fn process(
    storage: &dyn Container,
    protection: &Protection,
    allow_flat: bool,
    file: &mut ProjectFile,
) -> Result<()> {
    let dir = find_storage(storage, "TBkndCons")?;
    let data = protection.decode(find_stream(dir, "FixedData")?);

    let meta = match find_stream(dir, "FixedMeta") {
        Ok(meta_bytes) => Some(FixedMeta::parse(&meta_bytes, 8)?),
        Err(err) if allow_flat => {
            log::debug!("no relation metadata, slicing flat records: {err}");
            None
        }
        Err(err) => return Err(err),
    };
    let fixed = match &meta {
        Some(meta) => FixedData::from_meta(meta, &data, RECORD_SIZE),
        None => FixedData::with_item_size(&data, RECORD_SIZE),
    };

    for index in 0..fixed.item_count() {
        if meta.as_ref().is_some_and(|m| m.is_deleted(index)) {
            continue;
        }
        let Some(record) = fixed.item(index) else {
            continue;
        };
        if record.len() < RECORD_SIZE {
            continue;
        }
        let source = bytes::u32_at(record, 4);
        let target = bytes::u32_at(record, 8);
        // Self-referential records and the id-0 sentinel carry no usable
        // dependency.
        if source == target || source == 0 || target == 0 {
            continue;
        }
        let Some(kind) = RelationType::from_code(bytes::u16_at(record, 12)) else {
            continue;
        };
        let lag_tenths = bytes::i32_at(record, 14);
        file.relations.push(Relation {
            source_unique_id: source,
            target_unique_id: target,
            kind,
            lag: Some(Duration::new(
                f64::from(lag_tenths) / 10.0,
                TimeUnit::Minutes,
            )),
            source: None,
            target: None,
        });
    }
    log::debug!("decoded {} relations", file.relations.len());
    Ok(())
}
