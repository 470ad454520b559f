//! The oldest container generation.
//!
//! Its fixed-block layout predates the property-store design shared by the
//! later generations and is not decoded here. Recognising the signature and
//! refusing loudly keeps callers from mistaking silence for an empty
//! project.

use crate::container::Container;
use crate::error::{MppError, Result};
use crate::model::{FileFormat, ProjectFile};

use super::ReadOptions;

pub(crate) fn read(
    _container: &dyn Container,
    _options: &ReadOptions,
    _file: &mut ProjectFile,
) -> Result<()> {
    Err(MppError::unsupported(FileFormat::Mpp8))
}
