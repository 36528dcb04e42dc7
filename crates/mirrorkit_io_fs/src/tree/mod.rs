//! Read-only source trees and the deterministic walker over them.
//!
//! Tree paths are `/`-separated and relative; `.` names the root. Backends:
//! - [`MemTree`]   : in-memory entries with implicit parent directories
//! - [`DirTree`]   : a real directory exposed read-only
//! - [`EmbedTree`] : assets compiled in through `rust-embed`

use std::borrow::Cow;
use std::io;
use std::time::SystemTime;

use crate::spec::EnumEntryType;
use crate::util::join_tree_path;

mod dir;
mod embed;
mod mem;

pub use dir::DirTree;
pub use embed::EmbedTree;
pub use mem::MemTree;

/// Metadata of one source entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecEntryMeta {
    /// Base name (`.` for the root).
    pub name: String,
    /// Content length in bytes (0 for directories).
    pub size: u64,
    /// Last modification time.
    pub time_modified: SystemTime,
    /// File or directory.
    pub entry_type: EnumEntryType,
    /// Permission bits.
    pub mode: u32,
}

/// One child returned by [`SourceTree::read_dir`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecTreeEntry {
    pub name: String,
    pub entry_type: EnumEntryType,
}

/// A read-only hierarchy of files and directories.
pub trait SourceTree {
    /// Metadata for `path`.
    fn stat(&self, path: &str) -> io::Result<SpecEntryMeta>;

    /// Direct children of the directory at `path`, in any order.
    fn read_dir(&self, path: &str) -> io::Result<Vec<SpecTreeEntry>>;

    /// Full content of the file at `path`.
    fn read_file(&self, path: &str) -> io::Result<Cow<'_, [u8]>>;
}

/// Walk `tree` from `root`, calling `fn_visit` once per entry in lexical
/// order, each directory before its children.
///
/// Failures are delivered to `fn_visit` as `Err` instead of ending the walk:
/// an unreadable `root` is reported once, and a directory whose children
/// cannot be listed is reported a second time after its own `Ok` visit.
/// An `Err` returned by `fn_visit` stops the walk and is returned.
pub fn walk_dir<T, F, E>(tree: &T, root: &str, mut fn_visit: F) -> Result<(), E>
where
    T: SourceTree + ?Sized,
    F: FnMut(&str, io::Result<EnumEntryType>) -> Result<(), E>,
{
    match tree.stat(root) {
        Ok(meta_root) => _walk(tree, root, meta_root.entry_type, &mut fn_visit),
        Err(e) => fn_visit(root, Err(e)),
    }
}

fn _walk<T, F, E>(
    tree: &T,
    path: &str,
    entry_type: EnumEntryType,
    fn_visit: &mut F,
) -> Result<(), E>
where
    T: SourceTree + ?Sized,
    F: FnMut(&str, io::Result<EnumEntryType>) -> Result<(), E>,
{
    fn_visit(path, Ok(entry_type))?;
    if !entry_type.is_dir() {
        return Ok(());
    }

    let mut l_entries = match tree.read_dir(path) {
        Ok(v) => v,
        Err(e) => return fn_visit(path, Err(e)),
    };
    l_entries.sort_by(|a, b| a.name.cmp(&b.name));

    for entry in l_entries {
        let path_child = join_tree_path(path, &entry.name);
        _walk(tree, &path_child, entry.entry_type, fn_visit)?;
    }
    Ok(())
}

/// Wraps a [`MemTree`] whose `path_unlistable` directory refuses `read_dir`.
#[cfg(test)]
pub(crate) struct UnlistableDirTree {
    pub(crate) inner: MemTree,
    pub(crate) path_unlistable: &'static str,
}

#[cfg(test)]
impl SourceTree for UnlistableDirTree {
    fn stat(&self, path: &str) -> io::Result<SpecEntryMeta> {
        self.inner.stat(path)
    }

    fn read_dir(&self, path: &str) -> io::Result<Vec<SpecTreeEntry>> {
        if path == self.path_unlistable {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "unlistable"));
        }
        self.inner.read_dir(path)
    }

    fn read_file(&self, path: &str) -> io::Result<Cow<'_, [u8]>> {
        self.inner.read_file(path)
    }
}
