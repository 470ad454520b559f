//! Field indexes and default field layouts.
//!
//! Extraction never hard-codes a byte offset: every logical field goes
//! through a [`FieldMap`]. Files normally embed their own descriptor tables
//! in the property store; when a table is missing the default layout for
//! the generation applies. Field index values are part of the on-disk
//! contract and must not be renumbered.

use crate::decode::fieldmap::{category, FieldLocation, FieldMap, VarKeyMode};
use crate::decode::props::{keys, Props};
use crate::model::FileFormat;

/// Task field indexes.
pub mod task {
    pub const WORK: u16 = 0;
    pub const NAME: u16 = 1;
    pub const OUTLINE_LEVEL: u16 = 15;
    pub const CONSTRAINT_TYPE: u16 = 17;
    pub const CONSTRAINT_DATE: u16 = 18;
    pub const MILESTONE: u16 = 24;
    pub const PRIORITY: u16 = 25;
    pub const DURATION: u16 = 29;
    pub const DURATION_UNITS: u16 = 30;
    pub const PERCENT_COMPLETE: u16 = 32;
    pub const START: u16 = 35;
    pub const FINISH: u16 = 36;
    pub const COST: u16 = 37;
    pub const ACTUAL_START: u16 = 41;
    pub const ACTUAL_FINISH: u16 = 42;
    pub const ID: u16 = 85;
    pub const UNIQUE_ID: u16 = 98;
    pub const SUMMARY: u16 = 120;
    pub const EXTERNAL_PROJECT: u16 = 158;
    pub const PARENT_UNIQUE_ID: u16 = 199;
}

/// Resource field indexes.
pub mod resource {
    pub const ID: u16 = 0;
    pub const NAME: u16 = 1;
    pub const INITIALS: u16 = 2;
    pub const GROUP: u16 = 3;
    pub const MAX_UNITS: u16 = 4;
    pub const STANDARD_RATE: u16 = 5;
    pub const OVERTIME_RATE: u16 = 6;
    pub const CODE: u16 = 10;
    pub const COST: u16 = 11;
    pub const WORK: u16 = 13;
    pub const ACTUAL_WORK: u16 = 14;
    pub const OVERTIME_WORK: u16 = 16;
    pub const EMAIL: u16 = 35;
    pub const CALENDAR_UNIQUE_ID: u16 = 48;
    pub const UNIQUE_ID: u16 = 49;
}

/// Assignment field indexes.
pub mod assignment {
    pub const UNIQUE_ID: u16 = 0;
    pub const TASK_UNIQUE_ID: u16 = 1;
    pub const RESOURCE_UNIQUE_ID: u16 = 2;
    pub const START: u16 = 3;
    pub const FINISH: u16 = 4;
    pub const UNITS: u16 = 5;
    pub const WORK: u16 = 6;
    pub const ACTUAL_WORK: u16 = 7;
    pub const REMAINING_WORK: u16 = 9;
    pub const COST: u16 = 10;
}

/// How this generation derives variable-data keys from descriptors.
pub fn var_key_mode(format: FileFormat) -> VarKeyMode {
    match format {
        FileFormat::Mpp14 => VarKeyMode::TypeValue,
        _ => VarKeyMode::SecondaryByte,
    }
}

pub fn task_map(props: &Props, format: FileFormat) -> FieldMap {
    match props.bytes(keys::TASK_FIELD_MAP) {
        Some(data) => FieldMap::parse(data, var_key_mode(format)),
        None => default_task_map(format),
    }
}

pub fn resource_map(props: &Props, format: FileFormat) -> FieldMap {
    match props.bytes(keys::RESOURCE_FIELD_MAP) {
        Some(data) => FieldMap::parse(data, var_key_mode(format)),
        None => default_resource_map(),
    }
}

pub fn assignment_map(props: &Props, format: FileFormat) -> FieldMap {
    match props.bytes(keys::ASSIGNMENT_FIELD_MAP) {
        Some(data) => FieldMap::parse(data, var_key_mode(format)),
        None => default_assignment_map(),
    }
}

const fn fixed(block: usize, offset: usize) -> FieldLocation {
    FieldLocation::FixedData { block, offset }
}

const fn var(key: u16) -> FieldLocation {
    FieldLocation::VarData { key: key as u32 }
}

/// The default task layout. The newest generation moves the 8-byte work
/// and cost fields into a second fixed block; the oldest has no explicit
/// summary flag, which leaves it to be derived from the hierarchy.
fn default_task_map(format: FileFormat) -> FieldMap {
    let mut items = vec![
        (task::UNIQUE_ID, category::INT, fixed(0, 0)),
        (task::ID, category::INT, fixed(0, 4)),
        (task::DURATION, category::INT, fixed(0, 8)),
        (task::DURATION_UNITS, category::SHORT, fixed(0, 12)),
        (task::START, category::INT, fixed(0, 14)),
        (task::FINISH, category::INT, fixed(0, 18)),
        (task::ACTUAL_START, category::INT, fixed(0, 22)),
        (task::ACTUAL_FINISH, category::INT, fixed(0, 26)),
        (task::CONSTRAINT_DATE, category::INT, fixed(0, 30)),
        (task::CONSTRAINT_TYPE, category::SHORT, fixed(0, 34)),
        (task::PRIORITY, category::SHORT, fixed(0, 36)),
        (task::PERCENT_COMPLETE, category::SHORT, fixed(0, 38)),
        (task::OUTLINE_LEVEL, category::SHORT, fixed(0, 40)),
        (task::MILESTONE, category::SHORT, fixed(0, 42)),
        (task::EXTERNAL_PROJECT, category::SHORT, fixed(0, 46)),
        (task::PARENT_UNIQUE_ID, category::INT, fixed(0, 48)),
        (task::NAME, category::TEXT, var(task::NAME)),
    ];
    if format != FileFormat::Mpp9 {
        items.push((task::SUMMARY, category::SHORT, fixed(0, 44)));
    }
    if format == FileFormat::Mpp14 {
        items.push((task::WORK, category::DOUBLE, fixed(1, 0)));
        items.push((task::COST, category::DOUBLE, fixed(1, 8)));
    } else {
        items.push((task::WORK, category::DOUBLE, fixed(0, 52)));
        items.push((task::COST, category::DOUBLE, fixed(0, 60)));
    }
    FieldMap::from_items(items)
}

fn default_resource_map() -> FieldMap {
    FieldMap::from_items([
        (resource::UNIQUE_ID, category::INT, fixed(0, 0)),
        (resource::ID, category::INT, fixed(0, 4)),
        (resource::MAX_UNITS, category::SHORT, fixed(0, 8)),
        (resource::CALENDAR_UNIQUE_ID, category::INT, fixed(0, 10)),
        (resource::STANDARD_RATE, category::DOUBLE, fixed(0, 14)),
        (resource::OVERTIME_RATE, category::DOUBLE, fixed(0, 22)),
        (resource::COST, category::DOUBLE, fixed(0, 30)),
        (resource::WORK, category::DOUBLE, fixed(0, 38)),
        (resource::ACTUAL_WORK, category::DOUBLE, fixed(0, 46)),
        (resource::OVERTIME_WORK, category::DOUBLE, fixed(0, 54)),
        (resource::NAME, category::TEXT, var(resource::NAME)),
        (resource::INITIALS, category::TEXT, var(resource::INITIALS)),
        (resource::EMAIL, category::TEXT, var(resource::EMAIL)),
        (resource::GROUP, category::TEXT, var(resource::GROUP)),
        (resource::CODE, category::TEXT, var(resource::CODE)),
    ])
}

fn default_assignment_map() -> FieldMap {
    FieldMap::from_items([
        (assignment::UNIQUE_ID, category::INT, fixed(0, 0)),
        (assignment::TASK_UNIQUE_ID, category::INT, fixed(0, 4)),
        (assignment::RESOURCE_UNIQUE_ID, category::INT, fixed(0, 8)),
        (assignment::UNITS, category::SHORT, fixed(0, 12)),
        (assignment::START, category::INT, fixed(0, 14)),
        (assignment::FINISH, category::INT, fixed(0, 18)),
        (assignment::WORK, category::DOUBLE, fixed(0, 22)),
        (assignment::ACTUAL_WORK, category::DOUBLE, fixed(0, 30)),
        (assignment::REMAINING_WORK, category::DOUBLE, fixed(0, 38)),
        (assignment::COST, category::DOUBLE, fixed(0, 46)),
    ])
}
