//! Shared record extraction.
//!
//! The per-generation readers differ in stream layouts and property-store
//! encodings, but once the blocks are decoded the walk over task, resource
//! and assignment records is identical. Everything here reads through the
//! field map; no byte offset is hard-coded except the pinned placeholder
//! record layout.

use chrono::NaiveDateTime;

use crate::container::{find_storage, find_stream, Container};
use crate::decode::bytes;
use crate::decode::crypt::Protection;
use crate::decode::fieldmap::{FieldLocation, FieldMap};
use crate::decode::fixed::{FixedData, FixedMeta};
use crate::decode::var::{VarData, VarMeta, VarMetaShape};
use crate::error::Result;
use crate::model::{
    ConstraintType, ProjectFile, ProjectProperties, Rate, Resource, ResourceAssignment, Task,
    TimeUnit,
};

use super::fields;

/// Placeholder records are exactly this long: unique id, then id.
pub(crate) const NULL_RECORD_SIZE: usize = 16;

/// Records shorter than this cannot even hold their own identity.
const MIN_RECORD_SIZE: usize = 8;

/// Metadata item width used by the entity blocks.
const META_ITEM_SIZE: usize = 8;

/// The first task slots are reserved and never hold real tasks.
const RESERVED_TASK_SLOTS: usize = 3;

/// One entity's raw data: its fixed-block records plus the variable data
/// shared by its kind. All reads go through the field map; a field whose
/// backing bytes are missing reads as unset.
pub(crate) struct EntityRow<'a> {
    map: &'a FieldMap,
    unique_id: u32,
    blocks: Vec<Option<&'a [u8]>>,
    var: Option<VarData<'a>>,
}

impl<'a> EntityRow<'a> {
    pub(crate) fn new(
        map: &'a FieldMap,
        unique_id: u32,
        blocks: Vec<Option<&'a [u8]>>,
        var: Option<VarData<'a>>,
    ) -> EntityRow<'a> {
        EntityRow {
            map,
            unique_id,
            blocks,
            var,
        }
    }

    fn cell(&self, field: u16) -> Option<(&'a [u8], usize)> {
        match self.map.item(field)?.location {
            FieldLocation::FixedData { block, offset } => {
                let data = (*self.blocks.get(block)?)?;
                if offset >= data.len() {
                    return None;
                }
                Some((data, offset))
            }
            FieldLocation::VarData { key } => self
                .var
                .as_ref()?
                .payload(self.unique_id, key)
                .map(|payload| (payload, 0)),
            _ => None,
        }
    }

    pub(crate) fn short(&self, field: u16) -> u16 {
        self.opt_short(field).unwrap_or(0)
    }

    pub(crate) fn opt_short(&self, field: u16) -> Option<u16> {
        self.cell(field).map(|(d, o)| bytes::u16_at(d, o))
    }

    pub(crate) fn int(&self, field: u16) -> u32 {
        self.cell(field).map_or(0, |(d, o)| bytes::u32_at(d, o))
    }

    pub(crate) fn opt_i32(&self, field: u16) -> Option<i32> {
        self.cell(field).map(|(d, o)| bytes::i32_at(d, o))
    }

    pub(crate) fn opt_i64(&self, field: u16) -> Option<i64> {
        self.cell(field).map(|(d, o)| bytes::i64_at(d, o))
    }

    pub(crate) fn opt_double(&self, field: u16) -> Option<f64> {
        self.cell(field).map(|(d, o)| bytes::f64_at(d, o))
    }

    pub(crate) fn timestamp(&self, field: u16) -> Option<NaiveDateTime> {
        self.cell(field)
            .and_then(|(d, o)| bytes::timestamp_at(d, o))
    }

    pub(crate) fn boolean(&self, field: u16) -> bool {
        self.short(field) != 0
    }

    pub(crate) fn opt_boolean(&self, field: u16) -> Option<bool> {
        self.opt_short(field).map(|v| v != 0)
    }

    /// Text fields live in variable data; empty text reads as unset.
    pub(crate) fn string(&self, field: u16) -> Option<String> {
        let (data, offset) = self.cell(field)?;
        let text = bytes::unicode_string_at(data, offset);
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

/// The unique id of a slot's record. Placeholder records pin it to the
/// record head regardless of what the field map says.
fn slot_unique_id(record: &[u8], uid_offset: usize) -> u32 {
    if record.len() == NULL_RECORD_SIZE {
        bytes::u32_at(record, 0)
    } else {
        bytes::u32_at(record, uid_offset)
    }
}

/// Pick the task slots to extract.
///
/// Slots are scanned from the last one backward down to (excluding) the
/// reserved head. Deleted and unreadable slots are dropped. When several
/// slots carry the same unique id, the one seen first in this backward scan
/// is the physically last surviving record and supersedes the rest. The
/// kept slots come back in ascending order so extraction preserves file
/// order.
pub(crate) fn select_task_slots(
    meta: &FixedMeta,
    data: &FixedData,
    uid_offset: usize,
) -> Vec<usize> {
    let mut seen = std::collections::BTreeSet::new();
    let mut keep = Vec::new();
    for index in (RESERVED_TASK_SLOTS..data.item_count()).rev() {
        if meta.is_deleted(index) {
            continue;
        }
        let Some(record) = data.item(index) else {
            continue;
        };
        if record.len() < MIN_RECORD_SIZE {
            continue;
        }
        if seen.insert(slot_unique_id(record, uid_offset)) {
            keep.push(index);
        }
    }
    keep.reverse();
    keep
}

fn task_from_row(row: &EntityRow, properties: &ProjectProperties) -> Task {
    use fields::task::*;

    let mut task = Task::default();
    task.unique_id = Some(row.int(UNIQUE_ID));
    task.id = Some(row.int(ID));
    task.name = row.string(NAME);
    task.start = row.timestamp(START);
    task.finish = row.timestamp(FINISH);
    task.actual_start = row.timestamp(ACTUAL_START);
    task.actual_finish = row.timestamp(ACTUAL_FINISH);

    let unit = TimeUnit::from_code(row.short(DURATION_UNITS) as u8);
    if let Some(raw) = row.opt_i32(DURATION) {
        task.duration = bytes::adjusted_duration_of(properties, i64::from(raw), unit);
    }
    if let Some(raw) = row.opt_i64(WORK) {
        task.work = bytes::work_duration_of(raw);
    }
    task.cost = row.opt_double(COST).map(|c| c / 100.0);
    task.percent_complete = row.opt_short(PERCENT_COMPLETE).map(f64::from);
    task.priority = row.opt_short(PRIORITY).map(u32::from);
    task.constraint_type = row.opt_short(CONSTRAINT_TYPE).map(ConstraintType::from_code);
    task.constraint_date = row.timestamp(CONSTRAINT_DATE);
    task.outline_level = row.opt_short(OUTLINE_LEVEL);
    task.milestone = row.boolean(MILESTONE);
    task.summary = row.opt_boolean(SUMMARY);
    task.external_project = row.boolean(EXTERNAL_PROJECT);
    let parent = row.int(PARENT_UNIQUE_ID);
    if parent != 0 {
        task.parent_unique_id = Some(parent);
    }
    task
}

fn resource_from_row(row: &EntityRow) -> Resource {
    use fields::resource::*;

    let mut resource = Resource::default();
    resource.unique_id = Some(row.int(UNIQUE_ID));
    resource.id = Some(row.int(ID));
    resource.name = row.string(NAME);
    resource.initials = row.string(INITIALS);
    resource.email = row.string(EMAIL);
    resource.group = row.string(GROUP);
    resource.code = row.string(CODE);
    resource.max_units = row.opt_short(MAX_UNITS).map(|u| f64::from(u) / 100.0);
    resource.standard_rate = row
        .opt_double(STANDARD_RATE)
        .map(|a| Rate::new(a / 100.0, TimeUnit::Hours));
    resource.overtime_rate = row
        .opt_double(OVERTIME_RATE)
        .map(|a| Rate::new(a / 100.0, TimeUnit::Hours));
    resource.cost = row.opt_double(COST).map(|c| c / 100.0);
    resource.work = row.opt_i64(WORK).and_then(bytes::work_duration_of);
    resource.actual_work = row.opt_i64(ACTUAL_WORK).and_then(bytes::work_duration_of);
    resource.overtime_work = row.opt_i64(OVERTIME_WORK).and_then(bytes::work_duration_of);
    let calendar = row.int(CALENDAR_UNIQUE_ID);
    if calendar != 0 {
        resource.calendar_unique_id = Some(calendar);
    }
    resource
}

fn assignment_from_row(row: &EntityRow) -> ResourceAssignment {
    use fields::assignment::*;

    let mut assignment = ResourceAssignment::default();
    assignment.unique_id = Some(row.int(UNIQUE_ID));
    let task = row.int(TASK_UNIQUE_ID);
    if task != 0 {
        assignment.task_unique_id = Some(task);
    }
    let resource = row.int(RESOURCE_UNIQUE_ID);
    if resource != 0 {
        assignment.resource_unique_id = Some(resource);
    }
    assignment.start = row.timestamp(START);
    assignment.finish = row.timestamp(FINISH);
    assignment.units = row.opt_short(UNITS).map(|u| f64::from(u) / 100.0);
    assignment.work = row.opt_i64(WORK).and_then(bytes::work_duration_of);
    assignment.actual_work = row.opt_i64(ACTUAL_WORK).and_then(bytes::work_duration_of);
    assignment.remaining_work = row
        .opt_i64(REMAINING_WORK)
        .and_then(bytes::work_duration_of);
    assignment.cost = row.opt_double(COST).map(|c| c / 100.0);
    assignment
}

/// Decode the task storage into `file.tasks`.
///
/// `two_blocks` enables the newest generation's split fixed data, where an
/// extra stream carries the second logical block of each record.
pub(crate) fn read_tasks(
    storage: &dyn Container,
    protection: &Protection,
    map: &FieldMap,
    shape: VarMetaShape,
    two_blocks: bool,
    file: &mut ProjectFile,
) -> Result<()> {
    let dir = find_storage(storage, "TBkndTask")?;
    let meta = FixedMeta::parse(&find_stream(dir, "FixedMeta")?, META_ITEM_SIZE)?;
    let data = protection.decode(find_stream(dir, "FixedData")?);
    let fixed = FixedData::from_meta(&meta, &data, map.max_block_size(0));
    let var_meta = VarMeta::parse(&find_stream(dir, "VarMeta")?, shape)?;
    let var_buffer = find_stream(dir, "Var2Data")?;
    let var = VarData::new(&var_meta, &var_buffer);

    let data2;
    let fixed2 = if two_blocks && map.block_count() > 1 {
        data2 = protection.decode(find_stream(dir, "Fixed2Data")?);
        let sliced = match find_stream(dir, "Fixed2Meta") {
            Ok(meta2_bytes) => {
                let meta2 = FixedMeta::parse(&meta2_bytes, META_ITEM_SIZE)?;
                FixedData::from_meta(&meta2, &data2, map.max_block_size(1))
            }
            Err(_) => FixedData::with_item_size(&data2, map.max_block_size(1)),
        };
        Some(sliced)
    } else {
        None
    };

    let uid_offset = map
        .fixed_offset(fields::task::UNIQUE_ID, Some(0))
        .unwrap_or(0);
    for index in select_task_slots(&meta, &fixed, uid_offset) {
        let Some(record) = fixed.item(index) else {
            continue;
        };
        let unique_id = slot_unique_id(record, uid_offset);
        if record.len() == NULL_RECORD_SIZE {
            file.tasks
                .push(Task::null_task(unique_id, bytes::u32_at(record, 4)));
            continue;
        }
        let blocks = match &fixed2 {
            Some(second) => vec![Some(record), second.item(index)],
            None => vec![Some(record)],
        };
        let row = EntityRow::new(map, unique_id, blocks, Some(var));
        let task = task_from_row(&row, &file.properties);
        file.tasks.push(task);
    }
    log::debug!("decoded {} tasks", file.tasks.len());
    Ok(())
}

/// Decode the resource storage into `file.resources`.
///
/// Unlike tasks, duplicate unique ids are all kept here; the resolution
/// pass builds its id map last-wins, so a populated record later in the
/// file supersedes an earlier placeholder.
pub(crate) fn read_resources(
    storage: &dyn Container,
    protection: &Protection,
    map: &FieldMap,
    shape: VarMetaShape,
    file: &mut ProjectFile,
) -> Result<()> {
    let dir = find_storage(storage, "TBkndRsc")?;
    let meta = FixedMeta::parse(&find_stream(dir, "FixedMeta")?, META_ITEM_SIZE)?;
    let data = protection.decode(find_stream(dir, "FixedData")?);
    let fixed = FixedData::from_meta(&meta, &data, map.max_block_size(0));
    let var_meta = VarMeta::parse(&find_stream(dir, "VarMeta")?, shape)?;
    let var_buffer = find_stream(dir, "Var2Data")?;
    let var = VarData::new(&var_meta, &var_buffer);

    let uid_offset = map
        .fixed_offset(fields::resource::UNIQUE_ID, Some(0))
        .unwrap_or(0);
    for index in 0..fixed.item_count() {
        if meta.is_deleted(index) {
            continue;
        }
        let Some(record) = fixed.item(index) else {
            continue;
        };
        if record.len() < MIN_RECORD_SIZE {
            continue;
        }
        let unique_id = slot_unique_id(record, uid_offset);
        if record.len() == NULL_RECORD_SIZE {
            let mut placeholder = Resource::default();
            placeholder.unique_id = Some(unique_id);
            placeholder.id = Some(bytes::u32_at(record, 4));
            file.resources.push(placeholder);
            continue;
        }
        let row = EntityRow::new(map, unique_id, vec![Some(record)], Some(var));
        file.resources.push(resource_from_row(&row));
    }
    log::debug!("decoded {} resources", file.resources.len());
    Ok(())
}

/// Decode the assignment storage into `file.assignments`.
pub(crate) fn read_assignments(
    storage: &dyn Container,
    protection: &Protection,
    map: &FieldMap,
    file: &mut ProjectFile,
) -> Result<()> {
    let dir = find_storage(storage, "TBkndAssn")?;
    let meta = FixedMeta::parse(&find_stream(dir, "FixedMeta")?, META_ITEM_SIZE)?;
    let data = protection.decode(find_stream(dir, "FixedData")?);
    let fixed = FixedData::from_meta(&meta, &data, map.max_block_size(0));

    for index in 0..fixed.item_count() {
        if meta.is_deleted(index) {
            continue;
        }
        let Some(record) = fixed.item(index) else {
            continue;
        };
        if record.len() < 12 {
            continue;
        }
        let unique_id = bytes::u32_at(
            record,
            map.fixed_offset(fields::assignment::UNIQUE_ID, Some(0))
                .unwrap_or(0),
        );
        let row = EntityRow::new(map, unique_id, vec![Some(record)], None);
        file.assignments.push(assignment_from_row(&row));
    }
    log::debug!("decoded {} assignments", file.assignments.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::fieldmap::category;
    use crate::decode::fixed::MAGIC;

    fn meta_stream(items: &[(u32, u32)]) -> Vec<u8> {
        let mut data = Vec::new();
        data.extend_from_slice(&MAGIC.to_le_bytes());
        data.extend_from_slice(&0u32.to_le_bytes());
        data.extend_from_slice(&(items.len() as u32).to_le_bytes());
        data.extend_from_slice(&0u32.to_le_bytes());
        for (flags, offset) in items {
            data.extend_from_slice(&flags.to_le_bytes());
            data.extend_from_slice(&offset.to_le_bytes());
        }
        data
    }

    fn map_with(items: &[(u16, u16, FieldLocation)]) -> FieldMap {
        FieldMap::from_items(items.iter().copied())
    }

    #[test]
    fn row_reads_across_blocks() {
        let map = map_with(&[
            (1, category::INT, FieldLocation::FixedData { block: 0, offset: 0 }),
            (2, category::SHORT, FieldLocation::FixedData { block: 1, offset: 2 }),
        ]);
        let block0 = 77u32.to_le_bytes();
        let block1 = [0, 0, 9, 0];
        let row = EntityRow::new(&map, 1, vec![Some(&block0), Some(&block1)], None);
        assert_eq!(row.int(1), 77);
        assert_eq!(row.short(2), 9);
    }

    #[test]
    fn short_record_reads_as_unset_not_zero() {
        let map = map_with(&[
            (1, category::DOUBLE, FieldLocation::FixedData { block: 0, offset: 8 }),
        ]);
        let record = [0u8; 8];
        let row = EntityRow::new(&map, 1, vec![Some(&record)], None);
        assert_eq!(row.opt_double(1), None);
        assert_eq!(row.int(1), 0);
    }

    #[test]
    fn missing_second_block_defaults_its_fields() {
        let map = map_with(&[
            (1, category::INT, FieldLocation::FixedData { block: 1, offset: 0 }),
        ]);
        let row = EntityRow::new(&map, 1, vec![Some(&[1, 2, 3, 4]), None], None);
        assert_eq!(row.opt_i32(1), None);
    }

    #[test]
    fn backward_scan_keeps_the_last_record_per_unique_id() {
        // Slots 0-2 reserved; slot 3 and 5 share uid 7, slot 4 is deleted.
        let meta_bytes = meta_stream(&[
            (0, 0),
            (0, 8),
            (0, 16),
            (0, 24),
            (2, 32),
            (0, 40),
        ]);
        let meta = FixedMeta::parse(&meta_bytes, 8).unwrap();
        let mut buffer = Vec::new();
        for uid in [100u32, 101, 102, 7, 8, 7] {
            buffer.extend_from_slice(&uid.to_le_bytes());
            buffer.extend_from_slice(&0u32.to_le_bytes());
        }
        let fixed = FixedData::from_meta(&meta, &buffer, 8);
        assert_eq!(select_task_slots(&meta, &fixed, 0), vec![5]);
    }

    #[test]
    fn reserved_slots_are_never_selected() {
        let meta_bytes = meta_stream(&[(0, 0), (0, 8), (0, 16), (0, 24)]);
        let meta = FixedMeta::parse(&meta_bytes, 8).unwrap();
        let mut buffer = Vec::new();
        for uid in [1u32, 2, 3, 4] {
            buffer.extend_from_slice(&uid.to_le_bytes());
            buffer.extend_from_slice(&0u32.to_le_bytes());
        }
        let fixed = FixedData::from_meta(&meta, &buffer, 8);
        assert_eq!(select_task_slots(&meta, &fixed, 0), vec![3]);
    }

    #[test]
    fn placeholder_records_read_identity_from_the_head() {
        let mut record = Vec::new();
        record.extend_from_slice(&55u32.to_le_bytes());
        record.extend_from_slice(&6u32.to_le_bytes());
        record.extend_from_slice(&[0u8; 8]);
        assert_eq!(record.len(), NULL_RECORD_SIZE);
        // Even with a map that moves the unique id, the placeholder wins.
        assert_eq!(slot_unique_id(&record, 8), 55);

        let longer = [record.clone(), vec![0u8; 4]].concat();
        assert_eq!(slot_unique_id(&longer, 8), 0);
    }
}
