//! Builders for synthetic in-memory project containers.
//!
//! Everything here writes the on-disk encodings by hand, so the tests stay
//! a true end-to-end check: known bytes go in, a known model comes out.

use mpp_reader::MemoryContainer;

/// Magic constant opening the fixed and variable metadata headers.
pub const META_MAGIC: u32 = 0xFADF_ADBA;

/// Property-store keys the fixtures populate.
pub mod prop_keys {
    pub const PROJECT_START_DATE: u32 = 0x24_0002;
    pub const MINUTES_PER_DAY: u32 = 0x24_0018;
    pub const PASSWORD_FLAG: u32 = 0x35_0400;
    pub const ENCRYPTION_CODE: u32 = 0x35_0401;
}

pub fn put_u16(record: &mut [u8], offset: usize, value: u16) {
    record[offset..offset + 2].copy_from_slice(&value.to_le_bytes());
}

pub fn put_u32(record: &mut [u8], offset: usize, value: u32) {
    record[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}

pub fn put_i64(record: &mut [u8], offset: usize, value: i64) {
    record[offset..offset + 8].copy_from_slice(&value.to_le_bytes());
}

pub fn put_f64(record: &mut [u8], offset: usize, value: f64) {
    record[offset..offset + 8].copy_from_slice(&value.to_le_bytes());
}

/// UTF-16LE encoding with a terminating NUL unit.
pub fn utf16(text: &str) -> Vec<u8> {
    let mut out = Vec::new();
    for unit in text.encode_utf16() {
        out.extend_from_slice(&unit.to_le_bytes());
    }
    out.extend_from_slice(&[0, 0]);
    out
}

/// A 4-byte timestamp cell: time in tenths of a minute, then a day count
/// from the 1984-01-01 epoch.
pub fn timestamp(time_tenths: u16, days: u16) -> Vec<u8> {
    let mut cell = time_tenths.to_le_bytes().to_vec();
    cell.extend_from_slice(&days.to_le_bytes());
    cell
}

/// XOR-scramble a stream; code 0 passes through.
pub fn xor(mut data: Vec<u8>, code: u8) -> Vec<u8> {
    for byte in &mut data {
        *byte ^= code;
    }
    data
}

/// A CompObj stream naming the writing application and the format id.
pub fn comp_obj(user_type: &str, format_id: &str) -> Vec<u8> {
    let mut data = vec![0u8; 28];
    for text in [user_type, format_id] {
        data.extend_from_slice(&((text.len() + 1) as u32).to_le_bytes());
        data.extend_from_slice(text.as_bytes());
        data.push(0);
    }
    data
}

/// A newest-generation property store: `[u32 key][u32 size][payload]`
/// records behind a 24-byte header.
pub fn props14(records: &[(u32, Vec<u8>)]) -> Vec<u8> {
    let mut data = vec![0u8; 24];
    data[12..14].copy_from_slice(&(records.len() as u16).to_le_bytes());
    for (key, payload) in records {
        data.extend_from_slice(&key.to_le_bytes());
        data.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        data.extend_from_slice(payload);
        if payload.len() % 2 == 1 {
            data.push(0);
        }
    }
    data
}

/// A first-generation property store: `[u32 size][u32 key][payload]`
/// records behind a 16-byte header.
pub fn props9(records: &[(u32, Vec<u8>)]) -> Vec<u8> {
    let mut data = vec![0u8; 16];
    data[12..14].copy_from_slice(&(records.len() as u16).to_le_bytes());
    for (key, payload) in records {
        data.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        data.extend_from_slice(&key.to_le_bytes());
        data.extend_from_slice(payload);
        if payload.len() % 2 == 1 {
            data.push(0);
        }
    }
    data
}

/// Fixed metadata: 16-byte header, then 8-byte `(flags, offset)` items.
pub fn fixed_meta(items: &[(u32, u32)]) -> Vec<u8> {
    let mut data = Vec::new();
    data.extend_from_slice(&META_MAGIC.to_le_bytes());
    data.extend_from_slice(&0u32.to_le_bytes());
    data.extend_from_slice(&(items.len() as u32).to_le_bytes());
    data.extend_from_slice(&0u32.to_le_bytes());
    for (flags, offset) in items {
        data.extend_from_slice(&flags.to_le_bytes());
        data.extend_from_slice(&offset.to_le_bytes());
    }
    data
}

/// Variable index in the newest shape: 24-byte header, 12-byte items.
pub fn var_meta_new(items: &[(u32, u16, u32)]) -> Vec<u8> {
    let mut data = Vec::new();
    data.extend_from_slice(&META_MAGIC.to_le_bytes());
    data.extend_from_slice(&0u32.to_le_bytes());
    data.extend_from_slice(&(items.len() as u32).to_le_bytes());
    data.extend_from_slice(&[0u8; 12]);
    for (unique_id, kind, offset) in items {
        data.extend_from_slice(&unique_id.to_le_bytes());
        data.extend_from_slice(&offset.to_le_bytes());
        data.extend_from_slice(&kind.to_le_bytes());
        data.extend_from_slice(&[0u8; 2]);
    }
    data
}

/// Variable index in the oldest shape: 16-byte header, packed 8-byte items.
pub fn var_meta_old(items: &[(u32, u8, u32)]) -> Vec<u8> {
    let mut data = Vec::new();
    data.extend_from_slice(&META_MAGIC.to_le_bytes());
    data.extend_from_slice(&0u32.to_le_bytes());
    data.extend_from_slice(&(items.len() as u32).to_le_bytes());
    data.extend_from_slice(&0u32.to_le_bytes());
    for (unique_id, kind, offset) in items {
        data.extend_from_slice(&unique_id.to_le_bytes()[..3]);
        data.push(*kind);
        data.extend_from_slice(&offset.to_le_bytes());
    }
    data
}

/// Accumulates fixed records into a metadata/data stream pair.
pub struct FixedWriter {
    items: Vec<(u32, u32)>,
    data: Vec<u8>,
}

impl FixedWriter {
    pub fn new() -> Self {
        FixedWriter {
            items: Vec::new(),
            data: Vec::new(),
        }
    }

    pub fn push(&mut self, record: &[u8]) {
        self.items.push((0, self.data.len() as u32));
        self.data.extend_from_slice(record);
    }

    pub fn streams(self) -> (Vec<u8>, Vec<u8>) {
        (fixed_meta(&self.items), self.data)
    }
}

/// Accumulates `(entity, kind)` payloads into a variable index/data pair.
pub struct VarWriter {
    items: Vec<(u32, u16, u32)>,
    data: Vec<u8>,
}

impl VarWriter {
    pub fn new() -> Self {
        VarWriter {
            items: Vec::new(),
            data: Vec::new(),
        }
    }

    pub fn add(&mut self, unique_id: u32, kind: u16, payload: &[u8]) {
        self.items.push((unique_id, kind, self.data.len() as u32));
        self.data
            .extend_from_slice(&(payload.len() as u32).to_le_bytes());
        self.data.extend_from_slice(payload);
    }

    pub fn new_shape(self) -> (Vec<u8>, Vec<u8>) {
        (var_meta_new(&self.items), self.data)
    }

    pub fn old_shape(self) -> (Vec<u8>, Vec<u8>) {
        let items: Vec<(u32, u8, u32)> = self
            .items
            .iter()
            .map(|&(id, kind, offset)| (id, kind as u8, offset))
            .collect();
        (var_meta_old(&items), self.data)
    }
}

/// An entity directory whose streams parse but hold no entities.
pub fn add_empty_dir(storage: &mut MemoryContainer, name: &str, old_shape: bool) {
    let dir = storage.storage_mut(name);
    dir.add_stream("FixedMeta", fixed_meta(&[]));
    dir.add_stream("FixedData", Vec::new());
    let (var_meta, var_data) = if old_shape {
        VarWriter::new().old_shape()
    } else {
        VarWriter::new().new_shape()
    };
    dir.add_stream("VarMeta", var_meta);
    dir.add_stream("Var2Data", var_data);
}

// The standard newest-generation fixture:
//   calendar 1 "Standard" (base, default week)
//   resource 7 "Crane" (id 1, max units 2.0, rate 75/h, calendar 1)
//   task 10 "Design" (10 days from epoch+200 08:00, 80h work, cost 123.45)
//   task 11 "Install" (milestone, child of 10)
//   task 12 (null placeholder)
//   assignment 1: task 10 <- resource 7, units 1.0, 40h work
//   relation: 10 -> 11 finish-to-start, flat encoding
// `code` XOR-scrambles the streams a protected file scrambles; 0 is plain.

pub fn add_settings(storage: &mut MemoryContainer, code: u8) {
    let props = props14(&[
        (prop_keys::PROJECT_START_DATE, timestamp(0, 200)),
        (prop_keys::MINUTES_PER_DAY, 480u32.to_le_bytes().to_vec()),
    ]);
    storage.add_stream("Props14", xor(props, code));
}

pub fn add_calendars(storage: &mut MemoryContainer, code: u8) {
    let dir = storage.storage_mut("TBkndCal");
    let mut record = vec![0u8; 12];
    put_u32(&mut record, 0, 1);
    let mut fixed = FixedWriter::new();
    fixed.push(&record);
    let (meta, data) = fixed.streams();
    dir.add_stream("FixedMeta", meta);
    dir.add_stream("FixedData", xor(data, code));

    let mut var = VarWriter::new();
    var.add(1, 1, &utf16("Standard"));
    let (var_meta, var_data) = var.new_shape();
    dir.add_stream("VarMeta", var_meta);
    dir.add_stream("Var2Data", var_data);
}

pub fn add_resources(storage: &mut MemoryContainer, code: u8) {
    let dir = storage.storage_mut("TBkndRsc");
    let mut record = vec![0u8; 62];
    put_u32(&mut record, 0, 7); // unique id
    put_u32(&mut record, 4, 1); // id
    put_u16(&mut record, 8, 200); // max units in hundredths
    put_u32(&mut record, 10, 1); // calendar
    put_f64(&mut record, 14, 7_500.0); // standard rate in hundredths
    let mut fixed = FixedWriter::new();
    fixed.push(&record);
    let (meta, data) = fixed.streams();
    dir.add_stream("FixedMeta", meta);
    dir.add_stream("FixedData", xor(data, code));

    let mut var = VarWriter::new();
    var.add(7, 1, &utf16("Crane"));
    let (var_meta, var_data) = var.new_shape();
    dir.add_stream("VarMeta", var_meta);
    dir.add_stream("Var2Data", var_data);
}

pub fn add_tasks(storage: &mut MemoryContainer, code: u8) {
    let dir = storage.storage_mut("TBkndTask");
    let mut fixed = FixedWriter::new();
    for _ in 0..3 {
        fixed.push(&[0u8; 4]); // reserved head slots
    }

    let mut design = vec![0u8; 52];
    put_u32(&mut design, 0, 10);
    put_u32(&mut design, 4, 1);
    put_u32(&mut design, 8, 48_000); // 10 days at 480 min/day
    put_u16(&mut design, 12, 7); // unit code: days
    design[14..18].copy_from_slice(&timestamp(4_800, 200)); // start 08:00
    design[18..22].copy_from_slice(&timestamp(5_400, 210)); // finish 09:00
    put_u16(&mut design, 36, 500); // priority
    put_u16(&mut design, 38, 25); // percent complete
    put_u16(&mut design, 40, 1); // outline level
    put_u16(&mut design, 44, 1); // summary
    fixed.push(&design);

    let mut install = vec![0u8; 52];
    put_u32(&mut install, 0, 11);
    put_u32(&mut install, 4, 2);
    put_u32(&mut install, 8, 4_800); // one day
    put_u16(&mut install, 12, 7);
    install[14..18].copy_from_slice(&timestamp(0, 210));
    put_u16(&mut install, 40, 2); // outline level
    put_u16(&mut install, 42, 1); // milestone
    put_u32(&mut install, 48, 10); // parent
    fixed.push(&install);

    let mut null_task = vec![0u8; 16];
    put_u32(&mut null_task, 0, 12);
    put_u32(&mut null_task, 4, 3);
    fixed.push(&null_task);

    let (meta, data) = fixed.streams();
    dir.add_stream("FixedMeta", meta);
    dir.add_stream("FixedData", xor(data, code));

    // Second fixed block, flat 16-byte chunks indexed by slot: work and
    // cost for the design task, zeroes for the rest.
    let mut second = vec![0u8; 5 * 16];
    put_i64(&mut second, 3 * 16, 4_800_000); // 80 hours
    put_f64(&mut second, 3 * 16 + 8, 12_345.0); // cost in hundredths
    dir.add_stream("Fixed2Data", xor(second, code));

    let mut var = VarWriter::new();
    var.add(10, 1, &utf16("Design"));
    var.add(11, 1, &utf16("Install"));
    let (var_meta, var_data) = var.new_shape();
    dir.add_stream("VarMeta", var_meta);
    dir.add_stream("Var2Data", var_data);
}

pub fn add_assignments(storage: &mut MemoryContainer, code: u8) {
    let dir = storage.storage_mut("TBkndAssn");
    let mut record = vec![0u8; 54];
    put_u32(&mut record, 0, 1);
    put_u32(&mut record, 4, 10); // task
    put_u32(&mut record, 8, 7); // resource
    put_u16(&mut record, 12, 100); // units in hundredths
    put_i64(&mut record, 22, 2_400_000); // 40 hours
    let mut fixed = FixedWriter::new();
    fixed.push(&record);
    let (meta, data) = fixed.streams();
    dir.add_stream("FixedMeta", meta);
    dir.add_stream("FixedData", xor(data, code));
}

pub fn add_relations(storage: &mut MemoryContainer, code: u8) {
    let dir = storage.storage_mut("TBkndCons");
    let mut record = vec![0u8; 20];
    put_u32(&mut record, 4, 10); // predecessor
    put_u32(&mut record, 8, 11); // successor
    put_u16(&mut record, 12, 1); // finish-to-start
    dir.add_stream("FixedData", xor(record, code));
}

/// A root container with the newest-generation CompObj and header store.
pub fn mpp14_root(protected: bool) -> MemoryContainer {
    let mut root = MemoryContainer::new();
    root.add_stream(
        "\u{1}CompObj",
        comp_obj("Microsoft Project 14.0", "MSProject.MPP14"),
    );
    let header = if protected {
        props14(&[
            (prop_keys::PASSWORD_FLAG, vec![0x03]),
            (prop_keys::ENCRYPTION_CODE, vec![0x20]),
        ])
    } else {
        props14(&[])
    };
    root.add_stream("Props14", header);
    root
}

/// The fully populated standard fixture.
pub fn standard_project(protected: bool) -> MemoryContainer {
    // The stored code 0x20 complements to the working XOR byte 0xDF.
    let code = if protected { 0xDF } else { 0 };
    let mut root = mpp14_root(protected);
    let storage = root.storage_mut("   114");
    add_settings(storage, code);
    add_calendars(storage, code);
    add_resources(storage, code);
    add_tasks(storage, code);
    add_assignments(storage, code);
    add_relations(storage, code);
    root
}
