//! Reader for the first property-store generation.
//!
//! Distinguished from the later generations by its size-first property
//! records, the packed eight-byte variable-index entries and a fixed task
//! layout that predates the explicit summary flag.

use crate::container::{find_storage, find_stream, Container};
use crate::decode::crypt::Protection;
use crate::decode::props::Props;
use crate::decode::var::VarMetaShape;
use crate::error::{MppError, Result};
use crate::model::{DiagnosticCategory, FileFormat, ProjectFile};

use super::{calendars, extract, fields, properties, relations, run_category, ReadOptions};

const STORAGE_NAME: &str = "   19";
const PROPS_NAME: &str = "Props9";

pub(crate) fn read(
    container: &dyn Container,
    options: &ReadOptions,
    file: &mut ProjectFile,
) -> Result<()> {
    let root_props = Props::parse9(&find_stream(container, PROPS_NAME)?);
    let protection = Protection::from_props(&root_props);
    if protection.password_protected && options.respect_password_protection {
        return Err(MppError::PasswordProtected);
    }

    let storage = find_storage(container, STORAGE_NAME)?;
    let props = Props::parse9(&protection.decode(find_stream(storage, PROPS_NAME)?));
    properties::apply(&props, file);

    let task_map = fields::task_map(&props, FileFormat::Mpp9);
    let resource_map = fields::resource_map(&props, FileFormat::Mpp9);
    let assignment_map = fields::assignment_map(&props, FileFormat::Mpp9);

    run_category(file, DiagnosticCategory::Calendars, |file| {
        calendars::process(storage, &protection, VarMetaShape::Old, file)
    });
    run_category(file, DiagnosticCategory::Resources, |file| {
        extract::read_resources(storage, &protection, &resource_map, VarMetaShape::Old, file)
    });
    run_category(file, DiagnosticCategory::Tasks, |file| {
        extract::read_tasks(
            storage,
            &protection,
            &task_map,
            VarMetaShape::Old,
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
