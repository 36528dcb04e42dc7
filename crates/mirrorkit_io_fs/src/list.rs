//! Flatten a source tree into walked paths, like `src/**` under `globstar`.

use std::convert::Infallible;

use crate::spec::{ListTreeError, SpecListOptions};
use crate::tree::{SourceTree, walk_dir};
use crate::util::{C_TREE_ROOT, SpecListPatterns, normalize_separators};

fn _walk_root(prefix_src: &str) -> String {
    let c_root = normalize_separators(prefix_src);
    if c_root.is_empty() {
        C_TREE_ROOT.to_string()
    } else {
        c_root
    }
}

/// Every path under `prefix_src` (itself included), files and directories,
/// in walk order. Entries the walker fails on are left out.
pub fn glob_star<T>(tree: &T, prefix_src: &str) -> Vec<String>
where
    T: SourceTree + ?Sized,
{
    let mut l_paths = Vec::new();
    let res_walk = walk_dir(
        tree,
        &_walk_root(prefix_src),
        |path, res_entry| -> Result<(), Infallible> {
            if res_entry.is_ok() {
                l_paths.push(path.to_string());
            }
            Ok(())
        },
    );
    match res_walk {
        Ok(()) => l_paths,
        Err(never) => match never {},
    }
}

/// [`glob_star`] filtered by include/exclude patterns on the full path.
pub fn glob_star_matching<T>(
    tree: &T,
    prefix_src: &str,
    spec_ls_options: &SpecListOptions,
) -> Result<Vec<String>, ListTreeError>
where
    T: SourceTree + ?Sized,
{
    let spec_ls_pats = SpecListPatterns::from_raw(
        spec_ls_options.patterns_include.as_deref(),
        spec_ls_options.patterns_exclude.as_deref(),
        spec_ls_options.rule_pattern,
    )?;
    let mut l_paths = glob_star(tree, prefix_src);
    l_paths.retain(|path| spec_ls_pats.is_selected(path));
    Ok(l_paths)
}

#[cfg(test)]
mod tests {
    use std::time::UNIX_EPOCH;

    use super::*;
    use crate::spec::EnumListPatternMode;
    use crate::tree::{MemTree, UnlistableDirTree};

    fn sample_tree() -> MemTree {
        MemTree::new()
            .with_file("docs/readme.md", "r", UNIX_EPOCH)
            .with_file("docs/img/logo.png", "p", UNIX_EPOCH)
            .with_file("main.rs", "m", UNIX_EPOCH)
    }

    #[test]
    fn glob_star_lists_everything_in_walk_order() {
        let tree = sample_tree();
        assert_eq!(
            glob_star(&tree, ""),
            [
                ".",
                "docs",
                "docs/img",
                "docs/img/logo.png",
                "docs/readme.md",
                "main.rs"
            ]
        );
        assert_eq!(
            glob_star(&tree, r"docs\img"),
            ["docs/img", "docs/img/logo.png"]
        );
    }

    #[test]
    fn glob_star_keeps_unlistable_directory_and_later_siblings() {
        let tree = UnlistableDirTree {
            inner: sample_tree().with_file("zz.txt", "z", UNIX_EPOCH),
            path_unlistable: "docs",
        };
        assert_eq!(glob_star(&tree, ""), [".", "docs", "main.rs", "zz.txt"]);
    }

    #[test]
    fn glob_star_missing_root_is_empty() {
        assert!(glob_star(&sample_tree(), "missing").is_empty());
    }

    #[test]
    fn glob_star_matching_filters_by_glob() {
        let spec_ls_options = SpecListOptions {
            patterns_include: Some(vec!["**/*.md".to_string(), "*.rs".to_string()]),
            ..SpecListOptions::default()
        };
        let l_paths = glob_star_matching(&sample_tree(), ".", &spec_ls_options).expect("list");
        assert_eq!(l_paths, ["docs/readme.md", "main.rs"]);
    }

    #[test]
    fn glob_star_matching_literal_exclude() {
        let spec_ls_options = SpecListOptions {
            patterns_exclude: Some(vec!["img".to_string()]),
            rule_pattern: EnumListPatternMode::Literal,
            ..SpecListOptions::default()
        };
        let l_paths = glob_star_matching(&sample_tree(), "docs", &spec_ls_options).expect("list");
        assert_eq!(l_paths, ["docs", "docs/readme.md"]);
    }

    #[test]
    fn glob_star_matching_invalid_glob_rejected() {
        let spec_ls_options = SpecListOptions {
            patterns_include: Some(vec!["[".to_string()]),
            ..SpecListOptions::default()
        };
        let err = glob_star_matching(&sample_tree(), "", &spec_ls_options)
            .expect_err("invalid glob must fail");
        assert!(matches!(err, ListTreeError::InvalidPattern(_)));
    }
}
