//! Serialization utilities with robust error handling.
//!
//! JSON helpers plus the two file-publishing strategies used by a run:
//! [`write_json_file`] replaces a file atomically (temp file + rename) and
//! [`publish_json_file`] creates a file that must not exist yet
//! (temp file + hard link), reporting a lost race instead of overwriting.

use crate::error::{IoError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Serializes data to pretty-printed JSON.
pub fn to_json_pretty<T>(data: &T) -> Result<String>
where
    T: Serialize,
{
    serde_json::to_string_pretty(data)
        .map_err(|e| IoError::serialization(format!("JSON serialization failed: {}", e)))
}

/// Reads and parses a JSON file. Parse failures become [`IoError::Corrupt`].
pub fn read_json_file<T, P>(path: P) -> Result<T>
where
    T: for<'de> Deserialize<'de>,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .map_err(|e| IoError::from(e).with_context(format!("reading {}", path.display())))?;
    if content.trim().is_empty() {
        return Err(IoError::corrupt(path, "file is empty"));
    }
    serde_json::from_str(&content).map_err(|e| IoError::corrupt(path, e.to_string()))
}

fn temp_path(path: &Path, token: &str) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{name}.{token}.tmp"))
}

fn write_temp<T: Serialize>(data: &T, path: &Path, token: &str) -> Result<PathBuf> {
    let json = to_json_pretty(data)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| IoError::from(e).with_context(format!("creating {}", parent.display())))?;
    }
    let tmp = temp_path(path, token);
    fs::write(&tmp, json)
        .map_err(|e| IoError::from(e).with_context(format!("writing {}", tmp.display())))?;
    Ok(tmp)
}

/// Writes pretty JSON to `path`, replacing any previous content atomically.
pub fn write_json_file<T, P>(data: &T, path: P) -> Result<()>
where
    T: Serialize,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let tmp = write_temp(data, path, &uuid::Uuid::new_v4().simple().to_string())?;
    fs::rename(&tmp, path).map_err(|e| {
        let _ = fs::remove_file(&tmp);
        IoError::from(e).with_context(format!("replacing {}", path.display()))
    })
}

/// Outcome of [`publish_json_file`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Publish {
    Created,
    AlreadyExists,
}

/// Creates `path` with pretty JSON content only if it does not exist yet.
///
/// The content is fully written to a temp file first and then hard-linked
/// into place, so readers never see a partial file and an existing file is
/// never touched.
pub fn publish_json_file<T, P>(data: &T, path: P, token: &str) -> Result<Publish>
where
    T: Serialize,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let tmp = write_temp(data, path, token)?;
    let linked = fs::hard_link(&tmp, path);
    let _ = fs::remove_file(&tmp);
    match linked {
        Ok(()) => Ok(Publish::Created),
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => Ok(Publish::AlreadyExists),
        Err(e) => Err(IoError::from(e).with_context(format!("publishing {}", path.display()))),
    }
}
