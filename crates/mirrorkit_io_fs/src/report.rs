//! Mirror report models and mutable report builder.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::time::SystemTime;

use crate::util::format_timestamp;

/// One created or copied entry in the change report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecChangeLine {
    /// Source modification time.
    pub time_modified_src: SystemTime,
    /// Source size in bytes.
    pub size_src: u64,
    /// Walked source path.
    pub path_src: String,
    /// Destination `(mtime, size)` before the write; `None` if it was missing.
    pub state_dst_prev: Option<(SystemTime, u64)>,
    /// Final destination path.
    pub path_dst: PathBuf,
}

impl fmt::Display for SpecChangeLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c_state_prev = match self.state_dst_prev {
            Some((time_modified, size)) => format!("{} {size}", format_timestamp(time_modified)),
            None => String::new(),
        };
        write!(
            f,
            "{} {} {} -> {} {}",
            format_timestamp(self.time_modified_src),
            self.size_src,
            self.path_src,
            c_state_prev,
            self.path_dst.display()
        )
    }
}

/// Path mapping, change lines and counters for one `mirror_tree` run.
#[derive(Debug, Default, Clone)]
pub struct ReportMirror {
    /// Relative source path -> destination path, one key per visited entry.
    pub mapping: BTreeMap<String, PathBuf>,
    /// Created/copied entries in walk order.
    pub changes: Vec<SpecChangeLine>,
    /// Entries the walker delivered without error.
    pub cnt_visited: u64,
    /// Files written.
    pub cnt_copied: u64,
    /// Directories created.
    pub cnt_created: u64,
    /// Entries left untouched because the destination was fresh or present.
    pub cnt_skipped: u64,
    /// Swallowed walker/stat failures.
    pub cnt_walk_errors: u64,
    /// Non-fatal warnings (e.g. failed restamp).
    pub warnings: Vec<String>,
}

impl ReportMirror {
    /// Number of collected warnings.
    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    /// Machine-readable counters.
    pub fn to_dict(&self) -> BTreeMap<String, u64> {
        let mut dict_counts = BTreeMap::new();
        dict_counts.insert("cnt_visited".to_string(), self.cnt_visited);
        dict_counts.insert("cnt_copied".to_string(), self.cnt_copied);
        dict_counts.insert("cnt_created".to_string(), self.cnt_created);
        dict_counts.insert("cnt_skipped".to_string(), self.cnt_skipped);
        dict_counts.insert("cnt_walk_errors".to_string(), self.cnt_walk_errors);
        dict_counts.insert("cnt_warnings".to_string(), self.warning_count() as u64);
        dict_counts
    }

    /// Human-readable one-line summary.
    pub fn format(&self, prefix: &str) -> String {
        let dict_counts = self.to_dict();
        format!(
            "{prefix} visited={} copied={} created={} skipped={} walk_errors={} warnings={}",
            dict_counts["cnt_visited"],
            dict_counts["cnt_copied"],
            dict_counts["cnt_created"],
            dict_counts["cnt_skipped"],
            dict_counts["cnt_walk_errors"],
            dict_counts["cnt_warnings"]
        )
    }

    /// Multi-line change report, each line newline-terminated.
    pub fn change_report(&self) -> String {
        self.changes
            .iter()
            .map(|line| format!("{line}\n"))
            .collect()
    }
}

impl fmt::Display for ReportMirror {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format("[MIRROR]"))
    }
}

/// Mutable accumulator threaded through one walk.
#[derive(Debug, Default, Clone)]
pub struct ReportMirrorBuilder {
    report: ReportMirror,
}

impl ReportMirrorBuilder {
    /// Record where a visited entry maps to.
    pub fn add_mapping(&mut self, key: String, path_dst: PathBuf) {
        self.report.mapping.insert(key, path_dst);
    }

    /// Append one change line.
    pub fn add_change(&mut self, line: SpecChangeLine) {
        self.report.changes.push(line);
    }

    pub fn add_visited(&mut self) {
        self.report.cnt_visited += 1;
    }

    pub fn add_copied(&mut self) {
        self.report.cnt_copied += 1;
    }

    pub fn add_created(&mut self) {
        self.report.cnt_created += 1;
    }

    pub fn add_skipped(&mut self) {
        self.report.cnt_skipped += 1;
    }

    pub fn add_walk_error(&mut self) {
        self.report.cnt_walk_errors += 1;
    }

    pub fn add_warning(&mut self, warning: String) {
        self.report.warnings.push(warning);
    }

    /// Finalize builder into the report.
    pub fn build(self) -> ReportMirror {
        self.report
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::time::{Duration, SystemTime, UNIX_EPOCH};

    use super::{ReportMirror, ReportMirrorBuilder, SpecChangeLine};

    fn at(n_secs: u64) -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(n_secs)
    }

    #[test]
    fn report_mirror_to_dict_and_format() {
        let report = ReportMirror {
            cnt_visited: 8,
            cnt_copied: 3,
            cnt_created: 2,
            cnt_skipped: 3,
            cnt_walk_errors: 1,
            warnings: vec!["w".to_string()],
            ..ReportMirror::default()
        };

        let dict_counts = report.to_dict();
        assert_eq!(dict_counts["cnt_visited"], 8);
        assert_eq!(dict_counts["cnt_copied"], 3);
        assert_eq!(dict_counts["cnt_created"], 2);
        assert_eq!(dict_counts["cnt_skipped"], 3);
        assert_eq!(dict_counts["cnt_walk_errors"], 1);
        assert_eq!(dict_counts["cnt_warnings"], 1);

        let txt = report.format("[MIRROR]");
        assert_eq!(
            txt,
            "[MIRROR] visited=8 copied=3 created=2 skipped=3 walk_errors=1 warnings=1"
        );
        assert_eq!(report.to_string(), txt);
    }

    #[test]
    fn change_line_for_new_destination_leaves_state_empty() {
        let line = SpecChangeLine {
            time_modified_src: at(43_200),
            size_src: 5,
            path_src: "a/b.txt".to_string(),
            state_dst_prev: None,
            path_dst: PathBuf::from("/tmp/a/b.txt"),
        };
        assert_eq!(
            line.to_string(),
            "1970-01-01 12:00:00 5 a/b.txt ->  /tmp/a/b.txt"
        );
    }

    #[test]
    fn change_line_for_stale_destination_shows_previous_state() {
        let line = SpecChangeLine {
            time_modified_src: at(86_400 + 60),
            size_src: 7,
            path_src: "b.txt".to_string(),
            state_dst_prev: Some((at(86_400), 3)),
            path_dst: PathBuf::from("/tmp/b.txt"),
        };
        assert_eq!(
            line.to_string(),
            "1970-01-02 00:01:00 7 b.txt -> 1970-01-02 00:00:00 3 /tmp/b.txt"
        );
    }

    #[test]
    fn change_line_with_far_future_time_still_renders() {
        let t_far = at(400_000_000_000);
        let line = SpecChangeLine {
            time_modified_src: t_far,
            size_src: 1,
            path_src: "f".to_string(),
            state_dst_prev: Some((t_far, 2)),
            path_dst: PathBuf::from("/tmp/f"),
        };
        let c_line = line.to_string();
        assert!(c_line.starts_with(&format!("{t_far:?} 1 f -> ")));
        assert!(c_line.ends_with(" 2 /tmp/f"));
    }

    #[test]
    fn change_report_terminates_every_line() {
        let mut builder = ReportMirrorBuilder::default();
        for name in ["x", "y"] {
            builder.add_change(SpecChangeLine {
                time_modified_src: at(0),
                size_src: 1,
                path_src: name.to_string(),
                state_dst_prev: None,
                path_dst: PathBuf::from(name),
            });
        }
        let report = builder.build();
        let txt = report.change_report();
        assert_eq!(txt.lines().count(), 2);
        assert!(txt.ends_with('\n'));
        assert!(ReportMirror::default().change_report().is_empty());
    }
}
