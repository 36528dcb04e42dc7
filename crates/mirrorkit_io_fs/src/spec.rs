//! Mirror option models and top-level error types.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::report::ReportMirror;

////////////////////////////////////////////////////////////////////////////////
// #region EnumsInit

/// Kind of a source tree entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EnumEntryType {
    /// Regular file with byte content.
    File,
    /// Directory with child entries.
    Directory,
}

impl EnumEntryType {
    pub fn is_dir(self) -> bool {
        self == Self::Directory
    }
}

/// Pattern matching mode for include/exclude lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumListPatternMode {
    /// Shell-like wildcards (`*`, `**`, `?`, character classes).
    Glob,
    /// Regular expression pattern.
    Regex,
    /// Substring match.
    Literal,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region StructsAndErrors

/// Input options for `mirror_tree`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecMirrorOptions {
    /// Permission bits for newly written files (unix only).
    pub mode_file: u32,
    /// Permission bits for newly created directories (unix only).
    pub mode_dir: u32,
}

impl Default for SpecMirrorOptions {
    fn default() -> Self {
        Self {
            mode_file: 0o644,
            mode_dir: 0o755,
        }
    }
}

/// Input options for `glob_star_matching`.
#[derive(Debug, Clone)]
pub struct SpecListOptions {
    /// Include patterns applied to the full walked path.
    pub patterns_include: Option<Vec<String>>,
    /// Exclude patterns applied to the full walked path.
    pub patterns_exclude: Option<Vec<String>>,
    /// Pattern interpretation mode.
    pub rule_pattern: EnumListPatternMode,
}

impl Default for SpecListOptions {
    fn default() -> Self {
        Self {
            patterns_include: None,
            patterns_exclude: None,
            rule_pattern: EnumListPatternMode::Glob,
        }
    }
}

/// Per-entry failure that aborts a mirror run.
#[derive(Debug, Error)]
pub enum MirrorError {
    /// Destination directory (or one of its ancestors) could not be created.
    #[error("Failed to create directory {}: {source}", .path.display())]
    CreateDirectory { path: PathBuf, source: io::Error },
    /// A directory entry maps onto an existing non-directory.
    #[error("Destination exists and is not a directory: {}", .path.display())]
    DestinationNotDirectory { path: PathBuf },
    /// Source file content could not be read.
    #[error("Failed to read source {path}: {source}")]
    ReadSource { path: String, source: io::Error },
    /// Destination file could not be written.
    #[error("Failed to write {}: {source}", .path.display())]
    WriteDestination { path: PathBuf, source: io::Error },
    /// Destination could not be inspected right after the write.
    #[error("Failed to stat written file {}: {source}", .path.display())]
    StatDestination { path: PathBuf, source: io::Error },
    /// Destination records a different size than the bytes written.
    #[error(
        "writing error to {}, expected {expected}, was recorded {recorded}",
        .path.display()
    )]
    SizeMismatch {
        path: PathBuf,
        expected: u64,
        recorded: u64,
    },
}

/// A mirror run aborted by `error`; `report` holds everything done before it.
#[derive(Debug, Error)]
#[error("{error}")]
pub struct MirrorTreeError {
    /// Mapping, change lines and counters accumulated up to the failure.
    pub report: ReportMirror,
    /// First fatal error.
    pub error: MirrorError,
}

impl MirrorTreeError {
    pub fn into_parts(self) -> (ReportMirror, MirrorError) {
        (self.report, self.error)
    }
}

/// "Top-level call failed" errors for listing.
#[derive(Debug, Error)]
pub enum ListTreeError {
    /// Invalid include/exclude pattern.
    #[error("Invalid pattern in include/exclude: {0}")]
    InvalidPattern(String),
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
