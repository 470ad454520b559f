//! File format identification from the container's CompObj stream.
//!
//! The CompObj stream names the application that wrote the file. The format
//! identifier embedded in it is the only reliable way to tell the
//! generations apart, so an unrecognized identifier is a hard error rather
//! than a guess.

use crate::error::{MppError, Result};
use crate::model::FileFormat;

use super::bytes;

/// Strings parsed out of a CompObj stream.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CompObj {
    pub user_type: String,
    pub file_format: String,
    pub application: String,
}

impl CompObj {
    /// Parse the stream: a 28-byte header, then up to three
    /// length-prefixed ASCII strings (u32 length including the trailing
    /// NUL). Trailing strings are optional.
    pub fn parse(data: &[u8]) -> CompObj {
        let mut comp = CompObj::default();
        let mut offset = 28;
        for slot in [
            &mut comp.user_type,
            &mut comp.file_format,
            &mut comp.application,
        ] {
            match read_ascii(data, offset) {
                Some((text, next)) => {
                    *slot = text;
                    offset = next;
                }
                None => break,
            }
        }
        comp
    }

    /// Map the format identifier to a known generation.
    pub fn format(&self) -> Result<FileFormat> {
        let format = match self.file_format.as_str() {
            "MSProject.MPP14" | "MSProject.MPT14" | "MSProject.GLOBAL14" => FileFormat::Mpp14,
            "MSProject.MPP12" | "MSProject.MPT12" | "MSProject.GLOBAL12" => FileFormat::Mpp12,
            "MSProject.MPP9" | "MSProject.MPT9" | "MSProject.GLOBAL9" => FileFormat::Mpp9,
            "MSProject.MPP8" | "MSProject.MPT8" => FileFormat::Mpp8,
            _ => return Err(MppError::UndetectableFormat),
        };
        Ok(format)
    }
}

fn read_ascii(data: &[u8], offset: usize) -> Option<(String, usize)> {
    let end = offset.checked_add(4)?;
    if end > data.len() {
        return None;
    }
    let length = bytes::u32_at(data, offset) as usize;
    let start = end;
    let stop = start.checked_add(length)?;
    if length == 0 || stop > data.len() {
        return None;
    }
    // Drop the trailing NUL; tolerate stray high bytes.
    let text = data[start..stop - 1]
        .iter()
        .map(|&b| char::from(b))
        .collect();
    Some((text, stop))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comp_obj_stream(strings: &[&str]) -> Vec<u8> {
        let mut data = vec![0u8; 28];
        for s in strings {
            data.extend_from_slice(&((s.len() + 1) as u32).to_le_bytes());
            data.extend_from_slice(s.as_bytes());
            data.push(0);
        }
        data
    }

    #[test]
    fn parses_all_three_strings() {
        let data = comp_obj_stream(&[
            "Microsoft Project 14.0",
            "MSProject.MPP14",
            "MSProject.MPP14\u{3}",
        ]);
        let comp = CompObj::parse(&data);
        assert_eq!(comp.user_type, "Microsoft Project 14.0");
        assert_eq!(comp.file_format, "MSProject.MPP14");
        assert_eq!(comp.format().unwrap(), FileFormat::Mpp14);
    }

    #[test]
    fn trailing_strings_are_optional() {
        let data = comp_obj_stream(&["Microsoft Project 9.0", "MSProject.MPP9"]);
        let comp = CompObj::parse(&data);
        assert_eq!(comp.file_format, "MSProject.MPP9");
        assert_eq!(comp.application, "");
        assert_eq!(comp.format().unwrap(), FileFormat::Mpp9);
    }

    #[test]
    fn truncated_stream_parses_to_empty_strings() {
        let comp = CompObj::parse(&[0u8; 10]);
        assert_eq!(comp, CompObj::default());
        assert!(matches!(
            comp.format(),
            Err(MppError::UndetectableFormat)
        ));
    }

    #[test]
    fn template_and_global_identifiers_map_to_their_generation() {
        for (id, format) in [
            ("MSProject.MPT14", FileFormat::Mpp14),
            ("MSProject.GLOBAL14", FileFormat::Mpp14),
            ("MSProject.MPT12", FileFormat::Mpp12),
            ("MSProject.GLOBAL12", FileFormat::Mpp12),
            ("MSProject.MPT9", FileFormat::Mpp9),
            ("MSProject.GLOBAL9", FileFormat::Mpp9),
            ("MSProject.MPP8", FileFormat::Mpp8),
            ("MSProject.MPT8", FileFormat::Mpp8),
        ] {
            let data = comp_obj_stream(&["x", id]);
            assert_eq!(CompObj::parse(&data).format().unwrap(), format, "{id}");
        }
    }

    #[test]
    fn unknown_identifier_is_an_error() {
        let data = comp_obj_stream(&["x", "MSProject.MPP99"]);
        assert!(matches!(
            CompObj::parse(&data).format(),
            Err(MppError::UndetectableFormat)
        ));
    }
}
