use std::collections::BTreeMap;

use crate::error::{MppError, Result};

/// One level of a compound-document container: named streams plus named
/// sub-storages, like a directory in a tiny filesystem.
///
/// MPP files live inside such a container. Parsing the container itself is
/// out of scope for this crate; any compound-document library can sit
/// behind this trait, and [`MemoryContainer`] covers tests and callers that
/// already hold the decoded contents.
pub trait Container {
    /// Bytes of the stream with exactly this name, or `None`.
    fn stream(&self, name: &str) -> Option<Vec<u8>>;

    /// The sub-storage with exactly this name, or `None`.
    fn storage(&self, name: &str) -> Option<&dyn Container>;

    /// Names of all streams and storages at this level.
    fn entry_names(&self) -> Vec<String>;

    /// True when a stream or storage with exactly this name exists.
    fn has_entry(&self, name: &str) -> bool {
        self.stream(name).is_some() || self.storage(name).is_some()
    }
}

/// Control-prefix bytes some producing applications prepend to stream names.
const CONTROL_PREFIXES: [char; 2] = ['\u{1}', '\u{5}'];

/// Look up a stream tolerantly.
///
/// Different applications writing the same format disagree about control
/// prefixes on stream names, so the lookup runs a fallback chain: the exact
/// name, the name with a `0x01`/`0x05` prefix stripped or added, and finally
/// a case-insensitive suffix match over every entry at this level.
pub fn find_stream(container: &dyn Container, name: &str) -> Result<Vec<u8>> {
    if let Some(data) = container.stream(name) {
        return Ok(data);
    }

    if let Some(stripped) = name.strip_prefix(CONTROL_PREFIXES) {
        if let Some(data) = container.stream(stripped) {
            return Ok(data);
        }
    } else {
        for prefix in CONTROL_PREFIXES {
            let prefixed = format!("{}{}", prefix, name);
            if let Some(data) = container.stream(&prefixed) {
                return Ok(data);
            }
        }
    }

    // Last resort: suffix match, ignoring case and whatever junk leads the name.
    let wanted = name.to_lowercase();
    for entry in container.entry_names() {
        if entry.to_lowercase().ends_with(&wanted) {
            if let Some(data) = container.stream(&entry) {
                log::debug!("stream {:?} found via suffix match as {:?}", name, entry);
                return Ok(data);
            }
        }
    }

    Err(MppError::StreamNotFound(name.to_string()))
}

/// Look up a sub-storage by exact name.
pub fn find_storage<'a>(container: &'a dyn Container, name: &str) -> Result<&'a dyn Container> {
    container
        .storage(name)
        .ok_or_else(|| MppError::StorageNotFound(name.to_string()))
}

/// An in-memory container tree.
///
/// Used by the test suite to assemble synthetic files, and usable by any
/// caller that has already pulled streams out of a real compound document.
#[derive(Debug, Default, Clone)]
pub struct MemoryContainer {
    streams: BTreeMap<String, Vec<u8>>,
    storages: BTreeMap<String, MemoryContainer>,
}

impl MemoryContainer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a stream at this level.
    pub fn add_stream(&mut self, name: &str, data: Vec<u8>) {
        self.streams.insert(name.to_string(), data);
    }

    /// Get (creating if needed) a sub-storage at this level.
    pub fn storage_mut(&mut self, name: &str) -> &mut MemoryContainer {
        self.storages.entry(name.to_string()).or_default()
    }
}

impl Container for MemoryContainer {
    fn stream(&self, name: &str) -> Option<Vec<u8>> {
        self.streams.get(name).cloned()
    }

    fn storage(&self, name: &str) -> Option<&dyn Container> {
        self.storages.get(name).map(|s| s as &dyn Container)
    }

    fn entry_names(&self) -> Vec<String> {
        self.streams
            .keys()
            .chain(self.storages.keys())
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_name_wins() {
        let mut c = MemoryContainer::new();
        c.add_stream("Props14", vec![1]);
        c.add_stream("\u{1}Props14", vec![2]);
        assert_eq!(find_stream(&c, "Props14").unwrap(), vec![1]);
    }

    #[test]
    fn control_prefix_is_added_when_missing() {
        let mut c = MemoryContainer::new();
        c.add_stream("\u{1}CompObj", vec![7]);
        assert_eq!(find_stream(&c, "CompObj").unwrap(), vec![7]);
    }

    #[test]
    fn control_prefix_is_stripped_when_present() {
        let mut c = MemoryContainer::new();
        c.add_stream("CompObj", vec![9]);
        assert_eq!(find_stream(&c, "\u{1}CompObj").unwrap(), vec![9]);
    }

    #[test]
    fn falls_back_to_case_insensitive_suffix() {
        let mut c = MemoryContainer::new();
        c.add_stream("\u{5}SomeJunk.PROPS14", vec![3]);
        assert_eq!(find_stream(&c, "props14").unwrap(), vec![3]);
    }

    #[test]
    fn missing_stream_is_an_error() {
        let c = MemoryContainer::new();
        assert!(matches!(
            find_stream(&c, "Props14"),
            Err(MppError::StreamNotFound(_))
        ));
    }

    #[test]
    fn storages_nest() {
        let mut c = MemoryContainer::new();
        c.storage_mut("   114").add_stream("Props14", vec![4]);
        let dir = find_storage(&c, "   114").unwrap();
        assert_eq!(find_stream(dir, "Props14").unwrap(), vec![4]);
    }
}
