// ── Local buffer ──
//
// One JSON file per collection under a single directory. The buffer is the
// only hand-off between a GET and a later PUT: fetchers write it,
// publishers and the check views read it, and nothing is cached in memory
// between operations.
//
// Every write replaces the whole file through a temp file in the same
// directory followed by a rename, so an interrupted run leaves either the
// old file or the new one, never a truncated mix.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use strum::IntoEnumIterator;
use tempfile::NamedTempFile;
use tracing::{debug, trace};

use crate::error::CoreError;
use crate::model::BufferFile;

/// Handle on the buffer directory.
#[derive(Debug, Clone)]
pub struct BufferStore {
    dir: PathBuf,
}

impl BufferStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Full path of one buffer file.
    pub fn path(&self, file: BufferFile) -> PathBuf {
        self.dir.join(file.file_name())
    }

    pub fn exists(&self, file: BufferFile) -> bool {
        self.path(file).is_file()
    }

    /// Buffer files currently on disk, in declaration order.
    pub fn present_files(&self) -> Vec<BufferFile> {
        BufferFile::iter().filter(|f| self.exists(*f)).collect()
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Create the directory if it does not exist yet.
    pub fn create(&self) -> Result<(), CoreError> {
        fs::create_dir_all(&self.dir).map_err(|e| CoreError::io(&self.dir, e))
    }

    /// Start from an empty buffer.
    pub fn reset(&self) -> Result<(), CoreError> {
        debug!(dir = %self.dir.display(), "resetting buffer");
        self.destroy()?;
        self.create()
    }

    /// Delete the buffer directory and everything in it.
    pub fn destroy(&self) -> Result<(), CoreError> {
        match fs::remove_dir_all(&self.dir) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CoreError::io(&self.dir, e)),
        }
    }

    // ── Writes ───────────────────────────────────────────────────────

    /// Store a response body exactly as received.
    pub fn write_raw(&self, file: BufferFile, body: &str) -> Result<(), CoreError> {
        self.replace(file, body.as_bytes())
    }

    /// Serialize a document and store it.
    pub fn write_doc<T: Serialize>(&self, file: BufferFile, doc: &T) -> Result<(), CoreError> {
        let bytes = serde_json::to_vec_pretty(doc).map_err(|e| CoreError::BufferCorrupt {
            file: file.to_string(),
            reason: e.to_string(),
        })?;
        self.replace(file, &bytes)
    }

    pub(crate) fn write_bytes(&self, file: BufferFile, bytes: &[u8]) -> Result<(), CoreError> {
        self.replace(file, bytes)
    }

    fn replace(&self, file: BufferFile, bytes: &[u8]) -> Result<(), CoreError> {
        self.create()?;
        let target = self.path(file);

        let mut tmp = NamedTempFile::new_in(&self.dir).map_err(|e| CoreError::io(&self.dir, e))?;
        tmp.write_all(bytes)
            .map_err(|e| CoreError::io(tmp.path(), e))?;
        tmp.as_file()
            .sync_all()
            .map_err(|e| CoreError::io(tmp.path(), e))?;
        tmp.persist(&target)
            .map_err(|e| CoreError::io(&target, e.error))?;

        trace!(file = %file, bytes = bytes.len(), "buffer file written");
        Ok(())
    }

    // ── Reads ────────────────────────────────────────────────────────

    /// Read a buffer file as text.
    pub fn read_raw(&self, file: BufferFile) -> Result<String, CoreError> {
        let path = self.path(file);
        match fs::read_to_string(&path) {
            Ok(text) => Ok(text),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(CoreError::BufferNotFound {
                file: file.to_string(),
            }),
            Err(e) => Err(CoreError::io(path, e)),
        }
    }

    /// Read and parse a buffer file.
    pub fn read_doc<T: DeserializeOwned>(&self, file: BufferFile) -> Result<T, CoreError> {
        let text = self.read_raw(file)?;
        serde_json::from_str(&text).map_err(|e| CoreError::BufferCorrupt {
            file: file.to_string(),
            reason: e.to_string(),
        })
    }

    pub(crate) fn read_bytes(&self, file: BufferFile) -> Result<Vec<u8>, CoreError> {
        let path = self.path(file);
        fs::read(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => CoreError::BufferNotFound {
                file: file.to_string(),
            },
            _ => CoreError::io(path, e),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::{GroupEntry, List};
    use pretty_assertions::assert_eq;

    fn store() -> (tempfile::TempDir, BufferStore) {
        let tmp = tempfile::tempdir().unwrap();
        let store = BufferStore::new(tmp.path().join("data"));
        (tmp, store)
    }

    #[test]
    fn raw_bodies_round_trip_byte_for_byte() {
        let (_tmp, store) = store();
        let body = "{\"array\":[{\"uid\":\"a\"}],  \"extra\" : 1}\n";
        store.write_raw(BufferFile::Users, body).unwrap();
        assert_eq!(store.read_raw(BufferFile::Users).unwrap(), body);
    }

    #[test]
    fn documents_round_trip_structurally() {
        let (_tmp, store) = store();
        let doc = List {
            array: vec![GroupEntry {
                gid: "ops".into(),
                url: "/acs/api/v1/groups/ops".into(),
                description: "Ops".into(),
                users: Vec::new(),
                permissions: Vec::new(),
            }],
        };
        store.write_doc(BufferFile::GroupsUsers, &doc).unwrap();
        let back: List<GroupEntry> = store.read_doc(BufferFile::GroupsUsers).unwrap();
        assert_eq!(back.array, doc.array);
    }

    #[test]
    fn writes_replace_not_append() {
        let (_tmp, store) = store();
        store.write_raw(BufferFile::Ldap, "{\"a\": 1, \"long\": true}").unwrap();
        store.write_raw(BufferFile::Ldap, "{}").unwrap();
        assert_eq!(store.read_raw(BufferFile::Ldap).unwrap(), "{}");
    }

    #[test]
    fn missing_file_is_typed_not_found() {
        let (_tmp, store) = store();
        let err = store.read_raw(BufferFile::Groups).unwrap_err();
        assert!(matches!(err, CoreError::BufferNotFound { .. }), "got {err:?}");
    }

    #[test]
    fn unparseable_file_is_corrupt() {
        let (_tmp, store) = store();
        store.write_raw(BufferFile::Acls, "not json").unwrap();
        let err = store
            .read_doc::<serde_json::Value>(BufferFile::Acls)
            .unwrap_err();
        assert!(matches!(err, CoreError::BufferCorrupt { .. }));
    }

    #[test]
    fn reset_empties_and_destroy_removes() {
        let (_tmp, store) = store();
        store.write_raw(BufferFile::Agents, "{}").unwrap();
        assert_eq!(store.present_files(), vec![BufferFile::Agents]);

        store.reset().unwrap();
        assert!(store.dir().is_dir());
        assert!(store.present_files().is_empty());

        store.destroy().unwrap();
        assert!(!store.dir().exists());
        // destroying twice is fine
        store.destroy().unwrap();
    }

    #[test]
    fn no_temp_files_left_behind() {
        let (_tmp, store) = store();
        store.write_raw(BufferFile::Users, "{}").unwrap();
        store.write_raw(BufferFile::Groups, "{}").unwrap();
        let entries = fs::read_dir(store.dir()).unwrap().count();
        assert_eq!(entries, 2);
    }
}
