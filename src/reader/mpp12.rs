//! Reader for the middle property-store generation.
//!
//! Property records switch to key-first order with three-byte keys, and the
//! variable-data indexes move to the twelve-byte entry layout. Entity
//! extraction itself matches the first generation.

use crate::container::{find_storage, find_stream, Container};
use crate::decode::crypt::Protection;
use crate::decode::props::Props;
use crate::decode::var::VarMetaShape;
use crate::error::{MppError, Result};
use crate::model::{DiagnosticCategory, FileFormat, ProjectFile};

use super::{calendars, extract, fields, properties, relations, run_category, ReadOptions};

const STORAGE_NAME: &str = "   112";
const PROPS_NAME: &str = "Props12";

pub(crate) fn read(
    container: &dyn Container,
    options: &ReadOptions,
    file: &mut ProjectFile,
) -> Result<()> {
    let root_props = Props::parse12(&find_stream(container, PROPS_NAME)?);
    let protection = Protection::from_props(&root_props);
    if protection.password_protected && options.respect_password_protection {
        return Err(MppError::PasswordProtected);
    }

    let storage = find_storage(container, STORAGE_NAME)?;
    let props = Props::parse12(&protection.decode(find_stream(storage, PROPS_NAME)?));
    properties::apply(&props, file);

    let task_map = fields::task_map(&props, FileFormat::Mpp12);
    let resource_map = fields::resource_map(&props, FileFormat::Mpp12);
    let assignment_map = fields::assignment_map(&props, FileFormat::Mpp12);

    run_category(file, DiagnosticCategory::Calendars, |file| {
        calendars::process(storage, &protection, VarMetaShape::New, file)
    });
    run_category(file, DiagnosticCategory::Resources, |file| {
        extract::read_resources(storage, &protection, &resource_map, VarMetaShape::New, file)
    });
    run_category(file, DiagnosticCategory::Tasks, |file| {
        extract::read_tasks(
            storage,
            &protection,
            &task_map,
            VarMetaShape::New,
            false,
            file,
        )
    });
    run_category(file, DiagnosticCategory::Assignments, |file| {
        extract::read_assignments(storage, &protection, &assignment_map, file)
    });
    run_category(file, DiagnosticCategory::Relations, |file| {
        relations::process(storage, &protection, false, file)
    });
    Ok(())
}
