//! Turning an opened container into a [`ProjectFile`].
//!
//! [`read_project`] sniffs the format from the embedded CompObj stream,
//! hands off to the matching generation reader, then resolves every
//! cross-reference. The generation readers share all of their decoding
//! machinery; each one only picks the property parser, storage name and
//! index shapes its files use.

mod calendars;
mod extract;
mod fields;
mod mpp12;
mod mpp14;
mod mpp8;
mod mpp9;
mod properties;
mod relations;

use crate::container::{find_stream, Container};
use crate::decode::format::CompObj;
use crate::error::Result;
use crate::model::{DiagnosticCategory, FileFormat, ProjectFile};
use crate::resolve;

/// Policy knobs for a read.
#[derive(Debug, Clone)]
pub struct ReadOptions {
    /// Fail with [`crate::MppError::PasswordProtected`] when the file
    /// carries the password flag. Turning this off still decodes the
    /// scrambled streams; it merely skips the refusal.
    pub respect_password_protection: bool,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            respect_password_protection: true,
        }
    }
}

/// Read a fully resolved project out of an opened container.
pub fn read_project(container: &dyn Container, options: &ReadOptions) -> Result<ProjectFile> {
    let comp_obj = CompObj::parse(&find_stream(container, "CompObj")?);
    let format = comp_obj.format()?;
    log::debug!("detected {format}, written by {:?}", comp_obj.user_type);

    let mut file = ProjectFile::new();
    file.properties.file_format = Some(format);
    if !comp_obj.user_type.is_empty() {
        file.properties.application_name = Some(comp_obj.user_type);
    }

    match format {
        FileFormat::Mpp8 => mpp8::read(container, options, &mut file)?,
        FileFormat::Mpp9 => mpp9::read(container, options, &mut file)?,
        FileFormat::Mpp12 => mpp12::read(container, options, &mut file)?,
        FileFormat::Mpp14 => mpp14::read(container, options, &mut file)?,
    }

    resolve::resolve(&mut file);
    Ok(file)
}

/// Run one category's decode, downgrading failure to a diagnostic so the
/// remaining categories still get their chance.
pub(crate) fn run_category(
    file: &mut ProjectFile,
    category: DiagnosticCategory,
    decode: impl FnOnce(&mut ProjectFile) -> Result<()>,
) {
    if let Err(err) = decode(file) {
        log::warn!("{category}: {err}");
        file.add_diagnostic(category, err.to_string());
    }
}
