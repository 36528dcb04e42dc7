//! `mirrorkit_io_fs` v1:
//! Copy-if-newer mirroring of read-only trees onto the real filesystem.
//!
//! Modules:
//! - `mirror` : remap + freshness decision + copy orchestration
//! - `remap`  : source-prefix / destination-prefix path arithmetic
//! - `tree`   : source tree trait, walker and backends
//! - `target` : destination filesystem primitives
//! - `list`   : glob-star flattening of a tree
//! - `format` : one-line file-info rendering
//! - `spec`   : enums/options/errors
//! - `report` : run-time report model
//! - `util`   : shared helper functions

pub mod format;
pub mod list;
pub mod mirror;
pub mod remap;
pub mod report;
pub mod spec;
pub mod target;
pub mod tree;
mod util;

pub use format::{FileInfo, FileMode, format_file_info};
pub use list::{glob_star, glob_star_matching};
pub use mirror::{mirror_tree, mirror_tree_with, xcopy};
pub use remap::{SpecPathRemapper, SpecPathSegments};
pub use report::{ReportMirror, ReportMirrorBuilder, SpecChangeLine};
pub use spec::{
    EnumEntryType, EnumListPatternMode, ListTreeError, MirrorError, MirrorTreeError,
    SpecListOptions, SpecMirrorOptions,
};
pub use target::{LocalFs, SpecTargetMeta, TargetFs};
pub use tree::{DirTree, EmbedTree, MemTree, SourceTree, SpecEntryMeta, SpecTreeEntry, walk_dir};
