use std::collections::BTreeMap;
use std::io;
use std::time::{SystemTime, UNIX_EPOCH};

use globset::{Glob, GlobMatcher};
use regex::Regex;
use time::OffsetDateTime;
use time::macros::format_description;

use crate::spec::{EnumEntryType, EnumListPatternMode, ListTreeError};

/// Tree path of the root entry.
pub(crate) const C_TREE_ROOT: &str = ".";

////////////////////////////////////////////////////////////////////////////////
// #region PatternMatching

#[derive(Debug, Clone)]
pub(crate) enum TypeListPatternSeq {
    Literal(Vec<String>),
    Glob(Vec<GlobMatcher>),
    Regex(Vec<Regex>),
}

#[derive(Debug, Clone, Default)]
pub(crate) struct SpecListPatterns {
    pub(crate) patterns_include: Option<TypeListPatternSeq>,
    pub(crate) patterns_exclude: Option<TypeListPatternSeq>,
}

impl SpecListPatterns {
    pub(crate) fn from_raw(
        patterns_include: Option<&[String]>,
        patterns_exclude: Option<&[String]>,
        rule_pattern: EnumListPatternMode,
    ) -> Result<Self, ListTreeError> {
        Ok(Self {
            patterns_include: _compile(patterns_include, rule_pattern)?,
            patterns_exclude: _compile(patterns_exclude, rule_pattern)?,
        })
    }

    /// `true` when `value` passes the include list and misses the exclude list.
    pub(crate) fn is_selected(&self, value: &str) -> bool {
        let b_included = match &self.patterns_include {
            None => true,
            Some(patterns) => _is_pattern_matching(value, patterns),
        };
        let b_excluded = match &self.patterns_exclude {
            None => false,
            Some(patterns) => _is_pattern_matching(value, patterns),
        };
        b_included && !b_excluded
    }
}

fn _compile(
    patterns: Option<&[String]>,
    rule_pattern: EnumListPatternMode,
) -> Result<Option<TypeListPatternSeq>, ListTreeError> {
    let Some(patterns) = patterns else {
        return Ok(None);
    };
    if patterns.is_empty() {
        return Ok(None);
    }

    match rule_pattern {
        EnumListPatternMode::Literal => Ok(Some(TypeListPatternSeq::Literal(patterns.to_vec()))),
        EnumListPatternMode::Glob => {
            let mut l_glob = Vec::with_capacity(patterns.len());
            for pattern in patterns {
                let matcher = Glob::new(pattern)
                    .map_err(|e| ListTreeError::InvalidPattern(e.to_string()))?
                    .compile_matcher();
                l_glob.push(matcher);
            }
            Ok(Some(TypeListPatternSeq::Glob(l_glob)))
        }
        EnumListPatternMode::Regex => {
            let mut l_regex = Vec::with_capacity(patterns.len());
            for pattern in patterns {
                let regex =
                    Regex::new(pattern).map_err(|e| ListTreeError::InvalidPattern(e.to_string()))?;
                l_regex.push(regex);
            }
            Ok(Some(TypeListPatternSeq::Regex(l_regex)))
        }
    }
}

fn _is_pattern_matching(value: &str, patterns: &TypeListPatternSeq) -> bool {
    match patterns {
        TypeListPatternSeq::Literal(v) => v.iter().any(|p| value.contains(p.as_str())),
        TypeListPatternSeq::Glob(v) => v.iter().any(|p| p.is_match(value)),
        TypeListPatternSeq::Regex(v) => v.iter().any(|p| p.is_match(value)),
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region TreePaths

/// Rewrite `\` separators to `/`.
pub(crate) fn normalize_separators(raw: &str) -> String {
    raw.replace('\\', "/")
}

/// Reject paths a read-only tree must never resolve (absolute, `..`, empty segments).
pub(crate) fn validate_tree_path(path: &str) -> io::Result<()> {
    if path == C_TREE_ROOT {
        return Ok(());
    }
    let b_is_valid = !path.is_empty()
        && path
            .split('/')
            .all(|seg| !seg.is_empty() && seg != "." && seg != "..");
    if b_is_valid {
        Ok(())
    } else {
        Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("Invalid tree path: `{path}`"),
        ))
    }
}

/// Join a child name onto a tree path, keeping the root implicit.
pub(crate) fn join_tree_path(parent: &str, name: &str) -> String {
    if parent == C_TREE_ROOT {
        name.to_string()
    } else {
        format!("{parent}/{name}")
    }
}

/// Last segment of a tree path (`.` for the root).
pub(crate) fn tree_path_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Direct children of `path_dir` among a flat set of file paths, with
/// intermediate directories synthesized from deeper paths.
pub(crate) fn collect_children<I, S>(
    paths_file: I,
    path_dir: &str,
) -> BTreeMap<String, EnumEntryType>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let c_prefix = if path_dir == C_TREE_ROOT {
        String::new()
    } else {
        format!("{path_dir}/")
    };

    let mut dict_children = BTreeMap::new();
    for path_file in paths_file {
        let Some(rest) = path_file.as_ref().strip_prefix(c_prefix.as_str()) else {
            continue;
        };
        if rest.is_empty() {
            continue;
        }
        match rest.split_once('/') {
            Some((name_dir, _)) => {
                dict_children.insert(name_dir.to_string(), EnumEntryType::Directory);
            }
            None => {
                dict_children
                    .entry(rest.to_string())
                    .or_insert(EnumEntryType::File);
            }
        }
    }
    dict_children
}

/// `true` if any path lies strictly below `path_dir`.
pub(crate) fn has_descendant<I, S>(paths: I, path_dir: &str) -> bool
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    if path_dir == C_TREE_ROOT {
        return true;
    }
    let c_prefix = format!("{path_dir}/");
    paths
        .into_iter()
        .any(|p| p.as_ref().starts_with(c_prefix.as_str()))
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Timestamps

fn _to_datetime(time_value: SystemTime) -> Option<OffsetDateTime> {
    match time_value.duration_since(UNIX_EPOCH) {
        Ok(d) => time::Duration::try_from(d)
            .ok()
            .and_then(|d| OffsetDateTime::UNIX_EPOCH.checked_add(d)),
        Err(e) => time::Duration::try_from(e.duration())
            .ok()
            .and_then(|d| OffsetDateTime::UNIX_EPOCH.checked_sub(d)),
    }
}

/// `YYYY-MM-DD HH:MM:SS` in UTC. Times outside the representable calendar
/// range fall back to the `Debug` form of the `SystemTime`.
pub(crate) fn format_timestamp(time_value: SystemTime) -> String {
    let fmt_datetime = format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
    _to_datetime(time_value)
        .and_then(|dt| dt.format(&fmt_datetime).ok())
        .unwrap_or_else(|| format!("{time_value:?}"))
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collect_children_synthesizes_directories() {
        let l_paths = ["a/b.txt", "a/c/d.txt", "e.txt"];

        let dict_root = collect_children(l_paths, ".");
        assert_eq!(
            dict_root.into_iter().collect::<Vec<_>>(),
            vec![
                ("a".to_string(), EnumEntryType::Directory),
                ("e.txt".to_string(), EnumEntryType::File),
            ]
        );

        let dict_a = collect_children(l_paths, "a");
        assert_eq!(dict_a.get("b.txt"), Some(&EnumEntryType::File));
        assert_eq!(dict_a.get("c"), Some(&EnumEntryType::Directory));
        assert!(collect_children(l_paths, "ab").is_empty());
    }

    #[test]
    fn validate_tree_path_rejects_escapes() {
        assert!(validate_tree_path(".").is_ok());
        assert!(validate_tree_path("a/b").is_ok());
        for bad in ["", "/a", "a/../b", "a//b", "./a", "a/"] {
            let err = validate_tree_path(bad).expect_err("must reject");
            assert_eq!(err.kind(), io::ErrorKind::InvalidInput, "{bad}");
        }
    }

    #[test]
    fn list_patterns_glob_include_and_exclude() {
        let spec_pats = SpecListPatterns::from_raw(
            Some(&["**/*.txt".to_string()]),
            Some(&["skip/**".to_string()]),
            EnumListPatternMode::Glob,
        )
        .expect("compile");
        assert!(spec_pats.is_selected("a/b.txt"));
        assert!(!spec_pats.is_selected("a/b.md"));
        assert!(!spec_pats.is_selected("skip/c.txt"));
    }

    #[test]
    fn list_patterns_invalid_regex_rejected() {
        let err = SpecListPatterns::from_raw(
            Some(&["(".to_string()]),
            None,
            EnumListPatternMode::Regex,
        )
        .expect_err("invalid regex must fail");
        assert!(matches!(err, ListTreeError::InvalidPattern(_)));
    }

    #[test]
    fn format_timestamp_is_utc_datetime() {
        let t = SystemTime::UNIX_EPOCH + std::time::Duration::from_secs(43_200);
        assert_eq!(format_timestamp(t), "1970-01-01 12:00:00");
    }

    #[test]
    fn format_timestamp_handles_pre_epoch_times() {
        let t = UNIX_EPOCH - std::time::Duration::from_secs(1);
        assert_eq!(format_timestamp(t), "1969-12-31 23:59:59");
    }

    #[test]
    fn format_timestamp_out_of_range_falls_back_to_debug() {
        let t = UNIX_EPOCH + std::time::Duration::from_secs(400_000_000_000);
        let c_text = format_timestamp(t);
        assert_eq!(c_text, format!("{t:?}"));
    }
}
