//! Copy-if-newer mirroring of a source tree into a destination directory.

use std::io;
use std::path::{Path, PathBuf};

use crate::remap::SpecPathRemapper;
use crate::report::{ReportMirror, ReportMirrorBuilder, SpecChangeLine};
use crate::spec::{EnumEntryType, MirrorError, MirrorTreeError, SpecMirrorOptions};
use crate::target::{LocalFs, SpecTargetMeta, TargetFs};
use crate::tree::{SourceTree, SpecEntryMeta, walk_dir};

struct SpecMirrorContext<'a, T: ?Sized, D: ?Sized> {
    tree: &'a T,
    target: &'a D,
    remapper: SpecPathRemapper,
    spec_mr_options: SpecMirrorOptions,
    builder_mr_report: ReportMirrorBuilder,
}

/// Mirror `prefix_src` of `tree` under `dir_dst_root/prefix_dst` with default
/// options, like `xcopy src root\trg\ /s /d`.
///
/// With `a/x` and `b/c` in the tree and `dir_dst_root = /tmp`:
/// - `prefix_src = ""`,  `prefix_dst = ""`  gives `/tmp/a/x` and `/tmp/b/c`
/// - `prefix_src = "b"`, `prefix_dst = ""`  gives `/tmp/b/c`
/// - `prefix_src = "b"`, `prefix_dst = "d"` gives `/tmp/d/b/c`
pub fn xcopy<T, P>(
    tree: &T,
    prefix_src: &str,
    dir_dst_root: P,
    prefix_dst: &str,
) -> Result<ReportMirror, MirrorTreeError>
where
    T: SourceTree + ?Sized,
    P: AsRef<Path>,
{
    mirror_tree(
        tree,
        prefix_src,
        dir_dst_root,
        prefix_dst,
        SpecMirrorOptions::default(),
    )
}

/// [`mirror_tree_with`] onto the host filesystem.
pub fn mirror_tree<T, P>(
    tree: &T,
    prefix_src: &str,
    dir_dst_root: P,
    prefix_dst: &str,
    spec_mr_options: SpecMirrorOptions,
) -> Result<ReportMirror, MirrorTreeError>
where
    T: SourceTree + ?Sized,
    P: AsRef<Path>,
{
    mirror_tree_with(
        tree,
        &LocalFs,
        prefix_src,
        dir_dst_root,
        prefix_dst,
        spec_mr_options,
    )
}

/// Mirror the subtree `prefix_src` of `tree` into `target`.
///
/// Every walked entry is recorded in [`ReportMirror::mapping`]. An entry is
/// left alone when its destination exists with a modification time at or
/// after the source's. Otherwise directories are created and files are
/// written, size-checked and stamped with the source modification time;
/// each such entry adds one change line.
///
/// Unreadable source entries are counted and skipped. The first directory
/// creation, read, write or size-check failure ends the run with
/// [`MirrorTreeError`], which carries the report built so far.
pub fn mirror_tree_with<T, D, P>(
    tree: &T,
    target: &D,
    prefix_src: &str,
    dir_dst_root: P,
    prefix_dst: &str,
    spec_mr_options: SpecMirrorOptions,
) -> Result<ReportMirror, MirrorTreeError>
where
    T: SourceTree + ?Sized,
    D: TargetFs + ?Sized,
    P: AsRef<Path>,
{
    let remapper = SpecPathRemapper::new(prefix_src, dir_dst_root.as_ref(), prefix_dst);
    let c_walk_root = remapper.prefix_src().to_string();
    tracing::debug!(
        root = %c_walk_root,
        destination = %dir_dst_root.as_ref().display(),
        prefix_dst,
        "Mirroring tree"
    );

    let mut spec_mr_ctx = SpecMirrorContext {
        tree,
        target,
        remapper,
        spec_mr_options,
        builder_mr_report: ReportMirrorBuilder::default(),
    };

    let res_walk = walk_dir(tree, &c_walk_root, |path_src, res_entry| {
        visit_entry(path_src, res_entry, &mut spec_mr_ctx)
    });

    let report_mirror = spec_mr_ctx.builder_mr_report.build();
    match res_walk {
        Ok(()) => {
            tracing::info!("{report_mirror}");
            Ok(report_mirror)
        }
        Err(error) => {
            tracing::error!(%error, "{report_mirror}");
            Err(MirrorTreeError {
                report: report_mirror,
                error,
            })
        }
    }
}

fn visit_entry<T, D>(
    path_src: &str,
    res_entry: io::Result<EnumEntryType>,
    spec_mr_ctx: &mut SpecMirrorContext<'_, T, D>,
) -> Result<(), MirrorError>
where
    T: SourceTree + ?Sized,
    D: TargetFs + ?Sized,
{
    // A node the walker could not read is skipped; the walk goes on.
    let entry_type = match res_entry {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(path = path_src, error = %e, "Skipping unreadable source entry");
            spec_mr_ctx.builder_mr_report.add_walk_error();
            return Ok(());
        }
    };
    spec_mr_ctx.builder_mr_report.add_visited();

    let (key, path_dst) = spec_mr_ctx.remapper.remap(path_src);
    spec_mr_ctx
        .builder_mr_report
        .add_mapping(key, path_dst.clone());

    let meta_src = match spec_mr_ctx.tree.stat(path_src) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(path = path_src, error = %e, "Skipping source entry without metadata");
            spec_mr_ctx.builder_mr_report.add_walk_error();
            return Ok(());
        }
    };
    let meta_dst = stat_destination(spec_mr_ctx.target, &path_dst);

    if let Some(meta_prev) = meta_dst
        && meta_prev.time_modified >= meta_src.time_modified
    {
        tracing::debug!(path = path_src, destination = %path_dst.display(), "Up to date");
        spec_mr_ctx.builder_mr_report.add_skipped();
        return Ok(());
    }

    match entry_type {
        EnumEntryType::Directory => {
            ensure_directory(path_src, &meta_src, path_dst, meta_dst, spec_mr_ctx)
        }
        EnumEntryType::File => copy_file(path_src, &meta_src, path_dst, meta_dst, spec_mr_ctx),
    }
}

/// Destination metadata, `None` when missing or unreadable.
fn stat_destination<D: TargetFs + ?Sized>(target: &D, path_dst: &Path) -> Option<SpecTargetMeta> {
    match target.stat(path_dst) {
        Ok(meta) => Some(meta),
        Err(e) if e.kind() == io::ErrorKind::NotFound => None,
        Err(e) => {
            tracing::debug!(
                destination = %path_dst.display(),
                error = %e,
                "Destination stat failed; treating as missing"
            );
            None
        }
    }
}

fn ensure_directory<T, D>(
    path_src: &str,
    meta_src: &SpecEntryMeta,
    path_dst: PathBuf,
    meta_dst: Option<SpecTargetMeta>,
    spec_mr_ctx: &mut SpecMirrorContext<'_, T, D>,
) -> Result<(), MirrorError>
where
    T: SourceTree + ?Sized,
    D: TargetFs + ?Sized,
{
    match meta_dst {
        Some(meta_prev) if meta_prev.if_is_dir => {
            spec_mr_ctx.builder_mr_report.add_skipped();
            Ok(())
        }
        Some(_) => Err(MirrorError::DestinationNotDirectory { path: path_dst }),
        None => {
            spec_mr_ctx
                .target
                .create_dir_all(&path_dst, spec_mr_ctx.spec_mr_options.mode_dir)
                .map_err(|source| MirrorError::CreateDirectory {
                    path: path_dst.clone(),
                    source,
                })?;
            tracing::debug!(path = path_src, destination = %path_dst.display(), "Created directory");

            spec_mr_ctx.builder_mr_report.add_created();
            spec_mr_ctx.builder_mr_report.add_change(SpecChangeLine {
                time_modified_src: meta_src.time_modified,
                size_src: meta_src.size,
                path_src: path_src.to_string(),
                state_dst_prev: None,
                path_dst,
            });
            Ok(())
        }
    }
}

fn copy_file<T, D>(
    path_src: &str,
    meta_src: &SpecEntryMeta,
    path_dst: PathBuf,
    meta_dst: Option<SpecTargetMeta>,
    spec_mr_ctx: &mut SpecMirrorContext<'_, T, D>,
) -> Result<(), MirrorError>
where
    T: SourceTree + ?Sized,
    D: TargetFs + ?Sized,
{
    let tree = spec_mr_ctx.tree;
    let target = spec_mr_ctx.target;

    let data = tree
        .read_file(path_src)
        .map_err(|source| MirrorError::ReadSource {
            path: path_src.to_string(),
            source,
        })?;
    target
        .write_file(&path_dst, &data, spec_mr_ctx.spec_mr_options.mode_file)
        .map_err(|source| MirrorError::WriteDestination {
            path: path_dst.clone(),
            source,
        })?;

    let n_expected = data.len() as u64;
    let meta_written = target
        .stat(&path_dst)
        .map_err(|source| MirrorError::StatDestination {
            path: path_dst.clone(),
            source,
        })?;
    if meta_written.size != n_expected {
        return Err(MirrorError::SizeMismatch {
            path: path_dst,
            expected: n_expected,
            recorded: meta_written.size,
        });
    }

    if let Err(e) = target.set_time_modified(&path_dst, meta_src.time_modified) {
        tracing::warn!(destination = %path_dst.display(), error = %e, "Failed to set modification time");
        spec_mr_ctx.builder_mr_report.add_warning(format!(
            "Failed to set modification time on {} ({e})",
            path_dst.display()
        ));
    }
    tracing::debug!(path = path_src, destination = %path_dst.display(), size = n_expected, "Copied file");

    spec_mr_ctx.builder_mr_report.add_copied();
    spec_mr_ctx.builder_mr_report.add_change(SpecChangeLine {
        time_modified_src: meta_src.time_modified,
        size_src: meta_src.size,
        path_src: path_src.to_string(),
        state_dst_prev: meta_dst.map(|meta_prev| (meta_prev.time_modified, meta_prev.size)),
        path_dst,
    });
    Ok(())
}
