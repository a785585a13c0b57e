//! Exclusive run-directory lock.
//!
//! `run.lock` carries an OS advisory lock held for the lifetime of the
//! [`RunLock`]. The kernel drops it when the process exits, so a crashed run
//! never blocks the next one. The file itself stays behind and only records
//! who held it last.

use crate::error::{IoError, Result};
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use uuid::Uuid;

pub const LOCK_FILE: &str = "run.lock";

#[derive(Debug)]
pub struct RunLock {
    path: PathBuf,
    token: String,
    file: File,
}

fn is_contended(e: &std::io::Error) -> bool {
    e.kind() == std::io::ErrorKind::WouldBlock
        || e.raw_os_error() == fs2::lock_contended_error().raw_os_error()
}

impl RunLock {
    /// Takes the lock of `run_dir`, creating the directory if needed.
    pub fn acquire(run_dir: &Path) -> Result<Self> {
        fs::create_dir_all(run_dir).map_err(|e| {
            IoError::from(e).with_context(format!("creating {}", run_dir.display()))
        })?;
        let path = run_dir.join(LOCK_FILE);
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .map_err(|e| IoError::from(e).with_context(format!("opening {}", path.display())))?;

        if let Err(e) = fs2::FileExt::try_lock_exclusive(&file) {
            if is_contended(&e) {
                let holder = fs::read_to_string(&path)
                    .map(|s| s.trim().to_string())
                    .unwrap_or_else(|_| "unknown".to_string());
                return Err(IoError::Locked { path, holder });
            }
            return Err(IoError::from(e).with_context(format!("locking {}", path.display())));
        }

        let token = Uuid::new_v4().simple().to_string();
        file.set_len(0)?;
        writeln!(file, "{token} pid={}", std::process::id())?;
        file.sync_all()?;
        tracing::debug!(path = %path.display(), "run lock acquired");
        Ok(Self { path, token, file })
    }

    /// Random token of this holder, also used to name temp files.
    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }
}

impl Drop for RunLock {
    fn drop(&mut self) {
        if let Err(e) = fs2::FileExt::unlock(&self.file) {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to release run lock");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_second_acquire_fails_until_drop() {
        let dir = tempfile::tempdir().unwrap();
        let first = RunLock::acquire(dir.path()).unwrap();
        let err = RunLock::acquire(dir.path()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConcurrentWriteConflict);

        drop(first);
        assert!(RunLock::acquire(dir.path()).is_ok());
    }

    #[test]
    fn test_leftover_lock_file_does_not_block() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(LOCK_FILE), "deadbeef pid=1\n").unwrap();

        let lock = RunLock::acquire(dir.path()).unwrap();
        let content = std::fs::read_to_string(dir.path().join(LOCK_FILE)).unwrap();
        assert!(content.starts_with(lock.token()));
        assert!(!content.contains("deadbeef"));
    }
}
