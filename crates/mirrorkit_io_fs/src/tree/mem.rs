use std::borrow::Cow;
use std::collections::BTreeMap;
use std::io;
use std::time::{SystemTime, UNIX_EPOCH};

use super::{SourceTree, SpecEntryMeta, SpecTreeEntry};
use crate::spec::EnumEntryType;
use crate::util::{
    C_TREE_ROOT, collect_children, has_descendant, join_tree_path, normalize_separators,
    tree_path_name, validate_tree_path,
};

const N_MODE_FILE: u32 = 0o644;
const N_MODE_DIR: u32 = 0o755;

#[derive(Debug, Clone)]
struct SpecMemEntry {
    /// `None` marks a directory.
    data: Option<Vec<u8>>,
    time_modified: SystemTime,
}

/// In-memory source tree.
///
/// Parent directories of inserted paths exist implicitly with an epoch
/// modification time; insert them with [`MemTree::insert_dir`] to give them
/// one of their own.
#[derive(Debug, Clone, Default)]
pub struct MemTree {
    entries: BTreeMap<String, SpecMemEntry>,
}

impl MemTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert (or replace) a file.
    pub fn insert_file(
        &mut self,
        path: &str,
        data: impl Into<Vec<u8>>,
        time_modified: SystemTime,
    ) -> &mut Self {
        self.entries.insert(
            _normalize_key(path),
            SpecMemEntry {
                data: Some(data.into()),
                time_modified,
            },
        );
        self
    }

    /// Insert (or replace) a directory.
    pub fn insert_dir(&mut self, path: &str, time_modified: SystemTime) -> &mut Self {
        self.entries.insert(
            _normalize_key(path),
            SpecMemEntry {
                data: None,
                time_modified,
            },
        );
        self
    }

    pub fn with_file(
        mut self,
        path: &str,
        data: impl Into<Vec<u8>>,
        time_modified: SystemTime,
    ) -> Self {
        self.insert_file(path, data, time_modified);
        self
    }

    pub fn with_dir(mut self, path: &str, time_modified: SystemTime) -> Self {
        self.insert_dir(path, time_modified);
        self
    }

    fn _keys(&self) -> impl Iterator<Item = &str> {
        self.entries
            .keys()
            .map(String::as_str)
            .filter(|k| *k != C_TREE_ROOT)
    }
}

fn _normalize_key(path: &str) -> String {
    let c_normalized = normalize_separators(path);
    let l_segments: Vec<&str> = c_normalized
        .split('/')
        .filter(|seg| !seg.is_empty() && *seg != ".")
        .collect();
    if l_segments.is_empty() {
        C_TREE_ROOT.to_string()
    } else {
        l_segments.join("/")
    }
}

fn _not_found(path: &str) -> io::Error {
    io::Error::new(io::ErrorKind::NotFound, format!("No such entry: `{path}`"))
}

impl SourceTree for MemTree {
    fn stat(&self, path: &str) -> io::Result<SpecEntryMeta> {
        validate_tree_path(path)?;
        let c_name = tree_path_name(path).to_string();

        if let Some(entry) = self.entries.get(path) {
            return Ok(match &entry.data {
                Some(data) => SpecEntryMeta {
                    name: c_name,
                    size: data.len() as u64,
                    time_modified: entry.time_modified,
                    entry_type: EnumEntryType::File,
                    mode: N_MODE_FILE,
                },
                None => SpecEntryMeta {
                    name: c_name,
                    size: 0,
                    time_modified: entry.time_modified,
                    entry_type: EnumEntryType::Directory,
                    mode: N_MODE_DIR,
                },
            });
        }

        if has_descendant(self._keys(), path) {
            return Ok(SpecEntryMeta {
                name: c_name,
                size: 0,
                time_modified: UNIX_EPOCH,
                entry_type: EnumEntryType::Directory,
                mode: N_MODE_DIR,
            });
        }
        Err(_not_found(path))
    }

    fn read_dir(&self, path: &str) -> io::Result<Vec<SpecTreeEntry>> {
        if !self.stat(path)?.entry_type.is_dir() {
            return Err(io::Error::other(format!("Not a directory: `{path}`")));
        }

        let l_entries = collect_children(self._keys(), path)
            .into_iter()
            .map(|(name, entry_type_implied)| {
                let path_child = join_tree_path(path, &name);
                let entry_type = match self.entries.get(&path_child) {
                    Some(SpecMemEntry { data: None, .. }) => EnumEntryType::Directory,
                    Some(SpecMemEntry { data: Some(_), .. }) => EnumEntryType::File,
                    None => entry_type_implied,
                };
                SpecTreeEntry { name, entry_type }
            })
            .collect();
        Ok(l_entries)
    }

    fn read_file(&self, path: &str) -> io::Result<Cow<'_, [u8]>> {
        validate_tree_path(path)?;
        match self.entries.get(path) {
            Some(SpecMemEntry {
                data: Some(data), ..
            }) => Ok(Cow::Borrowed(data.as_slice())),
            Some(SpecMemEntry { data: None, .. }) => {
                Err(io::Error::other(format!("Is a directory: `{path}`")))
            }
            None if has_descendant(self._keys(), path) => {
                Err(io::Error::other(format!("Is a directory: `{path}`")))
            }
            None => Err(_not_found(path)),
        }
    }
}
