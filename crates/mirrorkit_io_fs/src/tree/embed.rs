use std::borrow::Cow;
use std::fmt;
use std::io;
use std::marker::PhantomData;
use std::time::{Duration, UNIX_EPOCH};

use rust_embed::Embed;

use super::{SourceTree, SpecEntryMeta, SpecTreeEntry};
use crate::spec::EnumEntryType;
use crate::util::{collect_children, has_descendant, tree_path_name, validate_tree_path};

const N_MODE_FILE: u32 = 0o444;
const N_MODE_DIR: u32 = 0o555;

/// Assets compiled into the binary through [`rust_embed`].
///
/// Directories only exist as prefixes of embedded file paths and carry an
/// epoch modification time. Files use the embedded `last_modified` stamp when
/// present.
pub struct EmbedTree<E> {
    _marker: PhantomData<fn() -> E>,
}

impl<E: Embed> EmbedTree<E> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<E: Embed> Default for EmbedTree<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for EmbedTree<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmbedTree")
            .field("assets", &std::any::type_name::<E>())
            .finish()
    }
}

impl<E: Embed> SourceTree for EmbedTree<E> {
    fn stat(&self, path: &str) -> io::Result<SpecEntryMeta> {
        validate_tree_path(path)?;
        let c_name = tree_path_name(path).to_string();

        if let Some(file) = E::get(path) {
            let time_modified = file
                .metadata
                .last_modified()
                .map(|n_secs| UNIX_EPOCH + Duration::from_secs(n_secs))
                .unwrap_or(UNIX_EPOCH);
            return Ok(SpecEntryMeta {
                name: c_name,
                size: file.data.len() as u64,
                time_modified,
                entry_type: EnumEntryType::File,
                mode: N_MODE_FILE,
            });
        }
        if has_descendant(E::iter(), path) {
            return Ok(SpecEntryMeta {
                name: c_name,
                size: 0,
                time_modified: UNIX_EPOCH,
                entry_type: EnumEntryType::Directory,
                mode: N_MODE_DIR,
            });
        }
        Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("No embedded entry: `{path}`"),
        ))
    }

    fn read_dir(&self, path: &str) -> io::Result<Vec<SpecTreeEntry>> {
        if !self.stat(path)?.entry_type.is_dir() {
            return Err(io::Error::other(format!("Not a directory: `{path}`")));
        }
        Ok(collect_children(E::iter(), path)
            .into_iter()
            .map(|(name, entry_type)| SpecTreeEntry { name, entry_type })
            .collect())
    }

    fn read_file(&self, path: &str) -> io::Result<Cow<'_, [u8]>> {
        validate_tree_path(path)?;
        E::get(path).map(|file| file.data).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("No embedded file: `{path}`"),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use std::convert::Infallible;

    use super::*;
    use crate::tree::walk_dir;

    #[derive(Embed)]
    #[folder = "tests/fixtures/site/"]
    struct FixtureSite;

    #[test]
    fn embed_tree_walks_embedded_folder() {
        let tree = EmbedTree::<FixtureSite>::new();
        let mut l_paths = Vec::new();
        walk_dir(&tree, ".", |path, res| -> Result<(), Infallible> {
            if res.is_ok() {
                l_paths.push(path.to_string());
            }
            Ok(())
        })
        .expect("walk");
        assert_eq!(l_paths, [".", "css", "css/site.css", "index.html"]);
    }

    #[test]
    fn embed_tree_stats_and_reads_files() {
        let tree = EmbedTree::<FixtureSite>::new();
        let meta = tree.stat("css/site.css").expect("stat");
        assert_eq!(meta.entry_type, EnumEntryType::File);
        assert_eq!(meta.name, "site.css");

        let data = tree.read_file("css/site.css").expect("read");
        assert_eq!(meta.size, data.len() as u64);
        assert!(tree.stat("css").expect("stat dir").entry_type.is_dir());
        assert!(tree.read_file("css").is_err());
    }
}
