//! One-line human-readable rendering of entry metadata.

use std::fmt::{self, Write};
use std::time::SystemTime;

use crate::tree::SpecEntryMeta;
use crate::util::format_timestamp;

/// Entry type plus permission bits, rendered like `drwxr-xr-x`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileMode {
    perm: u32,
    if_is_dir: bool,
}

impl FileMode {
    pub fn file(perm: u32) -> Self {
        Self {
            perm: perm & 0o777,
            if_is_dir: false,
        }
    }

    pub fn dir(perm: u32) -> Self {
        Self {
            perm: perm & 0o777,
            if_is_dir: true,
        }
    }

    pub fn perm(self) -> u32 {
        self.perm
    }

    pub fn is_dir(self) -> bool {
        self.if_is_dir
    }
}

impl fmt::Display for FileMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const C_RWX: &[u8; 9] = b"rwxrwxrwx";

        f.write_char(if self.if_is_dir { 'd' } else { '-' })?;
        for (n_idx, ch) in C_RWX.iter().enumerate() {
            let n_bit = 1 << (8 - n_idx);
            f.write_char(if self.perm & n_bit != 0 {
                char::from(*ch)
            } else {
                '-'
            })?;
        }
        Ok(())
    }
}

/// Metadata that [`format_file_info`] can render.
pub trait FileInfo {
    fn name(&self) -> &str;
    /// Size in bytes; negative values are rendered with a leading `-`.
    fn size(&self) -> i64;
    fn mode(&self) -> FileMode;
    fn time_modified(&self) -> SystemTime;

    fn is_dir(&self) -> bool {
        self.mode().is_dir()
    }
}

impl FileInfo for SpecEntryMeta {
    fn name(&self) -> &str {
        &self.name
    }

    fn size(&self) -> i64 {
        i64::try_from(self.size).unwrap_or(i64::MAX)
    }

    fn mode(&self) -> FileMode {
        if self.entry_type.is_dir() {
            FileMode::dir(self.mode)
        } else {
            FileMode::file(self.mode)
        }
    }

    fn time_modified(&self) -> SystemTime {
        self.time_modified
    }
}

impl fmt::Display for SpecEntryMeta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_file_info(self))
    }
}

/// `<mode> <size> <YYYY-MM-DD HH:MM:SS> <name>`, with `/` appended for
/// directories. The timestamp is rendered in UTC.
///
/// A 100-byte `hello.txt` with mode `0o644` modified at noon on
/// 1970-01-01 gives `-rw-r--r-- 100 1970-01-01 12:00:00 hello.txt`.
pub fn format_file_info<I>(info: &I) -> String
where
    I: FileInfo + ?Sized,
{
    let name = info.name();
    let mut c_line = String::with_capacity(40 + name.len());
    // Writing into a String cannot fail.
    let _ = write!(
        c_line,
        "{} {} {} {name}",
        info.mode(),
        info.size(),
        format_timestamp(info.time_modified())
    );
    if info.is_dir() {
        c_line.push('/');
    }
    c_line
}
