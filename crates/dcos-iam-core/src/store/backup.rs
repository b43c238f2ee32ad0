// ── Named backups ──
//
// A named backup is a directory under the backup root holding copies of
// the buffer files. Saving copies buffer → backup, loading copies
// backup → buffer. Each name is its own directory; nothing is shared.
//
// A backup is always one snapshot. Saving builds the new copy in a staging
// directory next to the old one and swaps it in whole; loading replaces the
// buffer rather than layering onto it.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use strum::IntoEnumIterator;
use tempfile::TempDir;
use tracing::{debug, info};

use super::buffer::BufferStore;
use crate::error::CoreError;
use crate::model::BufferFile;

/// Prefix of the scratch directories used while saving. Never listed.
const STAGING_PREFIX: &str = ".staging-";

/// A backup found on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackupInfo {
    pub name: String,
    pub modified: Option<DateTime<Utc>>,
    pub files: usize,
}

/// Handle on the backup root directory.
#[derive(Debug, Clone)]
pub struct BackupStore {
    dir: PathBuf,
}

impl BackupStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// All backups, sorted by name. A missing root means no backups.
    pub fn list(&self) -> Result<Vec<BackupInfo>, CoreError> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(CoreError::io(&self.dir, e)),
        };

        let mut backups = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| CoreError::io(&self.dir, e))?;
            let path = entry.path();
            if !path.is_dir() {
                continue;
            }
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if name.starts_with(STAGING_PREFIX) {
                continue;
            }
            let modified = entry
                .metadata()
                .and_then(|m| m.modified())
                .ok()
                .map(DateTime::<Utc>::from);
            let files = BufferFile::iter()
                .filter(|f| path.join(f.file_name()).is_file())
                .count();
            backups.push(BackupInfo {
                name: name.to_owned(),
                modified,
                files,
            });
        }
        backups.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(backups)
    }

    /// Snapshot the buffer into `<root>/<name>/`, replacing any earlier
    /// backup of that name.
    ///
    /// Returns the number of files copied.
    pub fn save(&self, name: &str, buffer: &BufferStore) -> Result<usize, CoreError> {
        validate_name(name)?;
        fs::create_dir_all(&self.dir).map_err(|e| CoreError::io(&self.dir, e))?;
        let target = self.dir.join(name);

        let staging = self.staging_dir()?;
        let mut copied = 0;
        for file in buffer.present_files() {
            let bytes = buffer.read_bytes(file)?;
            let dest = staging.path().join(file.file_name());
            fs::write(&dest, bytes).map_err(|e| CoreError::io(&dest, e))?;
            copied += 1;
        }

        // The old copy is parked in a scratch dir that is removed on drop, so
        // the name never points at a half-written snapshot.
        let retired = if target.exists() {
            let retired = self.staging_dir()?;
            fs::rename(&target, retired.path().join(name))
                .map_err(|e| CoreError::io(&target, e))?;
            debug!(backup = name, "replacing existing backup");
            Some(retired)
        } else {
            None
        };
        if let Err(e) = fs::rename(staging.path(), &target) {
            if let Some(retired) = &retired {
                let _ = fs::rename(retired.path().join(name), &target);
            }
            return Err(CoreError::io(&target, e));
        }
        drop(retired);

        info!(backup = name, files = copied, "backup saved");
        Ok(copied)
    }

    /// Replace the buffer with the files stored in `<root>/<name>/`.
    ///
    /// Buffer files absent from the backup are removed, so the buffer holds
    /// exactly that snapshot afterwards.
    pub fn load(&self, name: &str, buffer: &BufferStore) -> Result<usize, CoreError> {
        validate_name(name)?;
        let source = self.dir.join(name);
        if !source.is_dir() {
            return Err(CoreError::BackupNotFound {
                name: name.to_owned(),
            });
        }

        buffer.reset()?;
        let mut copied = 0;
        for file in BufferFile::iter() {
            let src = source.join(file.file_name());
            let bytes = match fs::read(&src) {
                Ok(bytes) => bytes,
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => return Err(CoreError::io(&src, e)),
            };
            buffer.write_bytes(file, &bytes)?;
            debug!(backup = name, file = %file, "restored buffer file");
            copied += 1;
        }

        info!(backup = name, files = copied, "backup loaded");
        Ok(copied)
    }

    fn staging_dir(&self) -> Result<TempDir, CoreError> {
        tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .tempdir_in(&self.dir)
            .map_err(|e| CoreError::io(&self.dir, e))
    }
}

/// Backup names become directory names: one plain path component.
pub fn validate_name(name: &str) -> Result<(), CoreError> {
    let reason = if name.trim().is_empty() {
        Some("name is empty")
    } else if name == "." || name == ".." {
        Some("name is a relative path component")
    } else if name.contains(['/', '\\']) {
        Some("name contains a path separator")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(CoreError::InvalidBackupName {
            name: name.to_owned(),
            reason: reason.into(),
        }),
        None => Ok(()),
    }
}
