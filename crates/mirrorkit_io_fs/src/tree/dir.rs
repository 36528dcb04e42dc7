use std::borrow::Cow;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::{SourceTree, SpecEntryMeta, SpecTreeEntry};
use crate::spec::EnumEntryType;
use crate::util::{C_TREE_ROOT, tree_path_name, validate_tree_path};

/// A real directory served as a read-only source tree.
///
/// Symbolic links are followed; anything that is not a directory is
/// reported as a file.
#[derive(Debug, Clone)]
pub struct DirTree {
    path_dir_root: PathBuf,
}

impl DirTree {
    pub fn new(path_dir_root: impl Into<PathBuf>) -> Self {
        Self {
            path_dir_root: path_dir_root.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.path_dir_root
    }

    fn resolve(&self, path: &str) -> io::Result<PathBuf> {
        validate_tree_path(path)?;
        if path == C_TREE_ROOT {
            return Ok(self.path_dir_root.clone());
        }
        Ok(path
            .split('/')
            .fold(self.path_dir_root.clone(), |acc, seg| acc.join(seg)))
    }
}

fn _entry_type_of(meta: &fs::Metadata) -> EnumEntryType {
    if meta.is_dir() {
        EnumEntryType::Directory
    } else {
        EnumEntryType::File
    }
}

#[cfg(unix)]
fn _mode_of(meta: &fs::Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    meta.permissions().mode() & 0o7777
}

#[cfg(not(unix))]
fn _mode_of(meta: &fs::Metadata) -> u32 {
    match (meta.is_dir(), meta.permissions().readonly()) {
        (true, false) => 0o755,
        (true, true) => 0o555,
        (false, false) => 0o644,
        (false, true) => 0o444,
    }
}

impl SourceTree for DirTree {
    fn stat(&self, path: &str) -> io::Result<SpecEntryMeta> {
        let path_abs = self.resolve(path)?;
        let meta = fs::metadata(&path_abs)?;
        let entry_type = _entry_type_of(&meta);
        Ok(SpecEntryMeta {
            name: tree_path_name(path).to_string(),
            size: if entry_type.is_dir() { 0 } else { meta.len() },
            time_modified: meta.modified()?,
            entry_type,
            mode: _mode_of(&meta),
        })
    }

    fn read_dir(&self, path: &str) -> io::Result<Vec<SpecTreeEntry>> {
        let path_abs = self.resolve(path)?;
        let mut l_entries = Vec::new();
        for entry_res in fs::read_dir(&path_abs)? {
            let entry = entry_res?;
            let entry_type = match fs::metadata(entry.path()) {
                Ok(meta) => _entry_type_of(&meta),
                // Dangling link; stat on visit fails and the entry is skipped there.
                Err(_) => EnumEntryType::File,
            };
            l_entries.push(SpecTreeEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                entry_type,
            });
        }
        Ok(l_entries)
    }

    fn read_file(&self, path: &str) -> io::Result<Cow<'_, [u8]>> {
        let path_abs = self.resolve(path)?;
        fs::read(path_abs).map(Cow::Owned)
    }
}
