//! Reader for the newest property-store generation.
//!
//! Keys widen to a full four bytes, variable-data keys come from the low
//! half of each descriptor's type word, task rows may span a second fixed
//! block, and a link stream without its index is still readable as a flat
//! run of records.

use crate::container::{find_storage, find_stream, Container};
use crate::decode::crypt::Protection;
use crate::decode::props::Props;
use crate::decode::var::VarMetaShape;
use crate::error::{MppError, Result};
use crate::model::{DiagnosticCategory, FileFormat, ProjectFile};

use super::{calendars, extract, fields, properties, relations, run_category, ReadOptions};

const STORAGE_NAME: &str = "   114";
const PROPS_NAME: &str = "Props14";

pub(crate) fn read(
    container: &dyn Container,
    options: &ReadOptions,
    file: &mut ProjectFile,
) -> Result<()> {
    let root_props = Props::parse14(&find_stream(container, PROPS_NAME)?);
    let protection = Protection::from_props(&root_props);
    if protection.password_protected && options.respect_password_protection {
        return Err(MppError::PasswordProtected);
    }

    let storage = find_storage(container, STORAGE_NAME)?;
    let props = Props::parse14(&protection.decode(find_stream(storage, PROPS_NAME)?));
    properties::apply(&props, file);

    let task_map = fields::task_map(&props, FileFormat::Mpp14);
    let resource_map = fields::resource_map(&props, FileFormat::Mpp14);
    let assignment_map = fields::assignment_map(&props, FileFormat::Mpp14);

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
            true,
            file,
        )
    });
    run_category(file, DiagnosticCategory::Assignments, |file| {
        extract::read_assignments(storage, &protection, &assignment_map, file)
    });
    run_category(file, DiagnosticCategory::Relations, |file| {
        relations::process(storage, &protection, true, file)
    });
    Ok(())
}
