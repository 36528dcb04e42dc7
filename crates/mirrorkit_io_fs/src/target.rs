//! Destination filesystem primitives used by the mirror engine.

use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::time::SystemTime;

use filetime::{FileTime, set_file_times};

/// What the mirror engine needs to know about an existing destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecTargetMeta {
    pub if_is_dir: bool,
    pub size: u64,
    pub time_modified: SystemTime,
}

/// Writable destination filesystem.
pub trait TargetFs {
    /// Metadata of `path`; `NotFound` when it does not exist.
    fn stat(&self, path: &Path) -> io::Result<SpecTargetMeta>;

    /// Create `path` and every missing ancestor.
    fn create_dir_all(&self, path: &Path, mode: u32) -> io::Result<()>;

    /// Create or truncate `path` and write `data` to it.
    fn write_file(&self, path: &Path, data: &[u8], mode: u32) -> io::Result<()>;

    /// Stamp `path` with `time_modified` (access time becomes now).
    fn set_time_modified(&self, path: &Path, time_modified: SystemTime) -> io::Result<()>;
}

/// The host filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

impl TargetFs for LocalFs {
    fn stat(&self, path: &Path) -> io::Result<SpecTargetMeta> {
        let meta = fs::metadata(path)?;
        Ok(SpecTargetMeta {
            if_is_dir: meta.is_dir(),
            size: meta.len(),
            time_modified: meta.modified()?,
        })
    }

    fn create_dir_all(&self, path: &Path, mode: u32) -> io::Result<()> {
        let mut dir_builder = fs::DirBuilder::new();
        dir_builder.recursive(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::DirBuilderExt;
            dir_builder.mode(mode);
        }
        #[cfg(not(unix))]
        {
            let _ = mode;
        }
        dir_builder.create(path)
    }

    fn write_file(&self, path: &Path, data: &[u8], mode: u32) -> io::Result<()> {
        let mut open_options = fs::OpenOptions::new();
        open_options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            open_options.mode(mode);
        }
        #[cfg(not(unix))]
        {
            let _ = mode;
        }
        let mut file = open_options.open(path)?;
        file.write_all(data)?;
        file.flush()
    }

    fn set_time_modified(&self, path: &Path, time_modified: SystemTime) -> io::Result<()> {
        set_file_times(
            path,
            FileTime::now(),
            FileTime::from_system_time(time_modified),
        )
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, UNIX_EPOCH};

    use super::*;

    #[test]
    fn local_fs_write_stat_and_restamp() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let path_dir = tmp.path().join("x/y");
        let path_file = path_dir.join("f.bin");

        LocalFs.create_dir_all(&path_dir, 0o755).expect("mkdir");
        LocalFs
            .write_file(&path_file, b"12345", 0o644)
            .expect("write");
        let t_stamp = UNIX_EPOCH + Duration::from_secs(1_600_000_000);
        LocalFs
            .set_time_modified(&path_file, t_stamp)
            .expect("restamp");

        let meta = LocalFs.stat(&path_file).expect("stat");
        assert!(!meta.if_is_dir);
        assert_eq!(meta.size, 5);
        assert_eq!(meta.time_modified, t_stamp);
        assert!(LocalFs.stat(&path_dir).expect("stat dir").if_is_dir);
    }

    #[test]
    fn local_fs_write_truncates_existing_file() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let path_file = tmp.path().join("f.txt");
        LocalFs
            .write_file(&path_file, b"long content", 0o644)
            .expect("write");
        LocalFs.write_file(&path_file, b"short", 0o644).expect("rewrite");
        assert_eq!(fs::read(&path_file).expect("read"), b"short");
    }

    #[cfg(unix)]
    #[test]
    fn local_fs_applies_creation_modes() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempfile::tempdir().expect("tempdir");
        let path_dir = tmp.path().join("d");
        let path_file = tmp.path().join("f");
        LocalFs.create_dir_all(&path_dir, 0o700).expect("mkdir");
        LocalFs.write_file(&path_file, b"", 0o600).expect("write");

        let n_mode_dir = fs::metadata(&path_dir).expect("meta").permissions().mode();
        let n_mode_file = fs::metadata(&path_file).expect("meta").permissions().mode();
        assert_eq!(n_mode_dir & 0o777, 0o700);
        assert_eq!(n_mode_file & 0o777, 0o600);
    }
}
