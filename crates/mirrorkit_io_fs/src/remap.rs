//! Source-prefix / destination-prefix path remapping.
//!
//! A walked source path keeps every segment after the first `N`, where `N` is
//! the number of `/` separators in the source prefix. The subtree's own name
//! therefore survives: prefix `b` maps `b/c.txt` under the destination as
//! `b/c.txt`, prefix `b/c` maps `b/c/e.txt` as `c/e.txt`.

use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};

use crate::util::{C_TREE_ROOT, normalize_separators};

/// A `/`-separated path kept as its raw segments (empty ones included).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpecPathSegments {
    segments: Vec<String>,
}

impl SpecPathSegments {
    /// Split after normalizing `\` to `/`. An empty input has no segments.
    pub fn split(raw: &str) -> Self {
        let c_normalized = normalize_separators(raw);
        if c_normalized.is_empty() {
            return Self::default();
        }
        Self {
            segments: c_normalized.split('/').map(str::to_string).collect(),
        }
    }

    /// Separator occurrences in `raw` after normalization.
    pub fn count_separators(raw: &str) -> usize {
        normalize_separators(raw).matches('/').count()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Drop the first `n` segments (all of them if `n` exceeds the length).
    pub fn strip_leading(&self, n: usize) -> Self {
        Self {
            segments: self.segments.iter().skip(n).cloned().collect(),
        }
    }

    /// Append `other`'s segments.
    pub fn extend(&mut self, other: &Self) {
        self.segments.extend(other.segments.iter().cloned());
    }

    /// Join onto `base` with native separators and clean the whole result.
    ///
    /// Empty and `.` components vanish, `..` cancels the previous normal
    /// component (reaching into `base` too) and is dropped at a root. The
    /// result is `.` if nothing remains at all.
    pub fn join_onto(&self, base: &Path) -> PathBuf {
        let mut path_clean = SpecCleanPath::default();
        for comp in base.components() {
            match comp {
                Component::Prefix(_) | Component::RootDir => {
                    path_clean.push_root(comp.as_os_str())
                }
                Component::CurDir => {}
                Component::ParentDir => path_clean.push_parent(),
                Component::Normal(seg) => path_clean.push_normal(seg),
            }
        }
        for seg in &self.segments {
            match seg.as_str() {
                "" | "." => {}
                ".." => path_clean.push_parent(),
                other => path_clean.push_normal(OsStr::new(other)),
            }
        }
        path_clean.into_path()
    }
}

/// Lexically cleaned path under construction.
#[derive(Debug, Default)]
struct SpecCleanPath {
    path: PathBuf,
    n_depth: usize,
    if_rooted: bool,
}

impl SpecCleanPath {
    fn push_root(&mut self, comp: &OsStr) {
        self.path.push(comp);
        self.if_rooted = true;
    }

    fn push_normal(&mut self, seg: &OsStr) {
        self.path.push(seg);
        self.n_depth += 1;
    }

    fn push_parent(&mut self) {
        if self.n_depth > 0 {
            self.path.pop();
            self.n_depth -= 1;
        } else if !self.if_rooted {
            self.path.push("..");
        }
    }

    fn into_path(mut self) -> PathBuf {
        if self.path.as_os_str().is_empty() {
            self.path.push(C_TREE_ROOT);
        }
        self.path
    }
}

/// Derives `(relative key, destination path)` for walked source paths.
#[derive(Debug, Clone)]
pub struct SpecPathRemapper {
    prefix_src: String,
    n_strip: usize,
    path_dst_base: PathBuf,
    segs_dst_prefix: SpecPathSegments,
}

impl SpecPathRemapper {
    /// `prefix_src` empty means the tree root.
    pub fn new(prefix_src: &str, dir_dst_root: &Path, prefix_dst: &str) -> Self {
        let mut prefix_src = normalize_separators(prefix_src);
        if prefix_src.is_empty() {
            prefix_src = C_TREE_ROOT.to_string();
        }
        let n_strip = SpecPathSegments::count_separators(&prefix_src);

        let path_dst_base = match dir_dst_root.to_str() {
            Some(raw) if raw == C_TREE_ROOT => PathBuf::new(),
            Some(raw) => PathBuf::from(normalize_separators(raw)),
            None => dir_dst_root.to_path_buf(),
        };

        Self {
            prefix_src,
            n_strip,
            path_dst_base,
            segs_dst_prefix: SpecPathSegments::split(prefix_dst),
        }
    }

    /// Normalized source prefix, the walk root.
    pub fn prefix_src(&self) -> &str {
        &self.prefix_src
    }

    /// Number of leading segments dropped from every walked path.
    pub fn n_strip(&self) -> usize {
        self.n_strip
    }

    /// Walked path minus the literal `prefix_src + "/"`, if present.
    pub fn relative_key(&self, path_walked: &str) -> String {
        let c_prefix = format!("{}/", self.prefix_src);
        path_walked
            .strip_prefix(c_prefix.as_str())
            .unwrap_or(path_walked)
            .to_string()
    }

    pub fn destination(&self, path_walked: &str) -> PathBuf {
        let mut segs_tail = self.segs_dst_prefix.clone();
        segs_tail.extend(&SpecPathSegments::split(path_walked).strip_leading(self.n_strip));
        segs_tail.join_onto(&self.path_dst_base)
    }

    pub fn remap(&self, path_walked: &str) -> (String, PathBuf) {
        (
            self.relative_key(path_walked),
            self.destination(path_walked),
        )
    }
}
