//! JSON-array file case store.
//!
//! The whole collection lives in one file as a pretty-printed JSON array.
//! Append is read-full / push / write-full, serialized by a process-wide
//! lock keyed on the canonical file path, so every store instance pointing
//! at the same file shares one lock. Writes go to a uniquely named sibling
//! temp file that is fsynced and renamed over the target, then the directory
//! is fsynced. The file on disk is always a complete snapshot: readers (which
//! don't take the lock) see the old collection or the new one, and a crash
//! mid-write leaves the previous snapshot intact.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock, Mutex};

use wardcast_core::TriageCase;

use super::{CaseStore, CaseStoreError};

/// One append lock per canonical case-file path, shared by every instance.
static PATH_LOCKS: LazyLock<Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>> = LazyLock::new(Default::default);

fn path_lock(key: PathBuf) -> Arc<Mutex<()>> {
    // The map is valid after every insert, so a poisoned lock is still usable.
    let mut locks = PATH_LOCKS.lock().unwrap_or_else(|p| p.into_inner());
    locks.entry(key).or_default().clone()
}

#[cfg(unix)]
fn sync_dir(dir: &Path) -> std::io::Result<()> {
    File::open(dir)?.sync_all()
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> std::io::Result<()> {
    Ok(())
}

#[derive(Debug)]
pub struct JsonFileCaseStore {
    path: PathBuf,
}

impl JsonFileCaseStore {
    /// The file is created on first append; a missing file reads as empty.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn parent_dir(&self) -> &Path {
        self.path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."))
    }

    fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "cases.json".to_string())
    }

    fn io_err(&self, source: std::io::Error) -> CaseStoreError {
        CaseStoreError::Io {
            path: self.path.clone(),
            source,
        }
    }

    /// Canonical path of the case file. The parent directory must exist.
    fn lock_key(&self) -> Result<PathBuf, CaseStoreError> {
        let parent = fs::canonicalize(self.parent_dir()).map_err(|e| self.io_err(e))?;
        Ok(parent.join(self.file_name()))
    }

    fn load(&self) -> Result<Vec<TriageCase>, CaseStoreError> {
        let bytes = match fs::read(&self.path) {
            Ok(b) => b,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(self.io_err(e)),
        };

        // A zero-length file (e.g. created by hand) reads as an empty collection.
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }

        serde_json::from_slice(&bytes).map_err(|e| CaseStoreError::Corrupt {
            path: self.path.clone(),
            reason: e.to_string(),
        })
    }

    fn write_atomic(&self, cases: &[TriageCase]) -> Result<(), CaseStoreError> {
        let parent = self.parent_dir();
        let result = (|| -> std::io::Result<()> {
            // Removed on drop if anything below fails.
            let mut temp = tempfile::Builder::new()
                .prefix(&format!(".{}.", self.file_name()))
                .suffix(".tmp")
                .tempfile_in(parent)?;

            let mut writer = BufWriter::new(temp.as_file_mut());
            serde_json::to_writer_pretty(&mut writer, cases)?;
            writer.write_all(b"\n")?;
            writer.flush()?;
            drop(writer);

            temp.as_file().sync_all()?;
            temp.persist(&self.path).map_err(|e| e.error)?;
            sync_dir(parent)
        })();

        result.map_err(|e| self.io_err(e))
    }
}

impl CaseStore for JsonFileCaseStore {
    fn append(&self, case: TriageCase) -> Result<(), CaseStoreError> {
        fs::create_dir_all(self.parent_dir()).map_err(|e| self.io_err(e))?;

        let lock = path_lock(self.lock_key()?);
        // Guards no in-memory state; a poisoned lock is safe to reuse.
        let _guard = lock.lock().unwrap_or_else(|p| p.into_inner());

        let mut cases = self.load()?;
        cases.push(case);
        self.write_atomic(&cases)?;

        tracing::debug!(path = %self.path.display(), total = cases.len(), "case appended");
        Ok(())
    }

    fn read_all(&self) -> Result<Vec<TriageCase>, CaseStoreError> {
        self.load()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    use proptest::prelude::*;

    fn case(i: usize) -> TriageCase {
        TriageCase::new(
            "2025-06-07 10:00",
            format!("patient {i}"),
            format!("answer {i}"),
        )
    }

    #[test]
    fn missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileCaseStore::new(dir.path().join("cases.json"));
        assert!(store.read_all().unwrap().is_empty());
    }

    #[test]
    fn append_creates_file_and_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("cases.json");
        let store = JsonFileCaseStore::new(&path);

        store.append(case(1)).unwrap();

        let on_disk: Vec<TriageCase> = serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
        assert_eq!(on_disk, vec![case(1)]);

        let leftovers: Vec<_> = fs::read_dir(path.parent().unwrap())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(leftovers, vec![std::ffi::OsString::from("cases.json")]);
    }

    #[test]
    fn read_all_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileCaseStore::new(dir.path().join("cases.json"));
        store.append(case(1)).unwrap();
        store.append(case(2)).unwrap();

        assert_eq!(store.read_all().unwrap(), store.read_all().unwrap());
    }

    #[test]
    fn corrupt_file_fails_reads_and_appends_without_overwriting() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cases.json");
        fs::write(&path, b"[{\"timestamp\": ").unwrap();
        let store = JsonFileCaseStore::new(&path);

        assert!(matches!(store.read_all(), Err(CaseStoreError::Corrupt { .. })));
        assert!(matches!(store.append(case(1)), Err(CaseStoreError::Corrupt { .. })));
        assert_eq!(fs::read(&path).unwrap(), b"[{\"timestamp\": ");
    }

    #[test]
    fn wrong_shape_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cases.json");
        fs::write(&path, br#"{"timestamp": "x"}"#).unwrap();

        let store = JsonFileCaseStore::new(&path);
        assert!(matches!(store.read_all(), Err(CaseStoreError::Corrupt { .. })));
    }

    #[test]
    fn stale_temp_file_does_not_affect_reads() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileCaseStore::new(dir.path().join("cases.json"));
        store.append(case(1)).unwrap();

        // Simulate a crash after a partial temp write.
        fs::write(dir.path().join(".cases.json.a1b2c3.tmp"), b"[{\"half").unwrap();

        assert_eq!(store.read_all().unwrap(), vec![case(1)]);
        store.append(case(2)).unwrap();
        assert_eq!(store.read_all().unwrap(), vec![case(1), case(2)]);
    }

    #[test]
    fn concurrent_appends_lose_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(JsonFileCaseStore::new(dir.path().join("cases.json")));
        let n = 32;

        let writers: Vec<_> = (0..n)
            .map(|i| {
                let store = store.clone();
                thread::spawn(move || store.append(case(i)).unwrap())
            })
            .collect();

        // Readers racing the writers must never observe a torn file.
        let readers: Vec<_> = (0..4)
            .map(|_| {
                let store = store.clone();
                thread::spawn(move || {
                    for _ in 0..20 {
                        let seen = store.read_all().unwrap();
                        assert!(seen.len() <= n);
                    }
                })
            })
            .collect();

        for h in writers.into_iter().chain(readers) {
            h.join().unwrap();
        }

        let all = store.read_all().unwrap();
        assert_eq!(all.len(), n);
        let mut descriptions: Vec<_> = all.iter().map(|c| c.description.clone()).collect();
        descriptions.sort();
        descriptions.dedup();
        assert_eq!(descriptions.len(), n);
    }

    #[test]
    fn separate_instances_on_one_file_share_the_append_lock() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        let stores = [
            Arc::new(JsonFileCaseStore::new(dir.path().join("cases.json"))),
            // Same file, spelled differently.
            Arc::new(JsonFileCaseStore::new(dir.path().join("sub").join("..").join("cases.json"))),
        ];
        let n = 40;

        let writers: Vec<_> = (0..n)
            .map(|i| {
                let store = stores[i % 2].clone();
                thread::spawn(move || store.append(case(i)))
            })
            .collect();
        for h in writers {
            h.join().unwrap().unwrap();
        }

        assert_eq!(stores[0].read_all().unwrap().len(), n);
        assert_eq!(stores[1].read_all().unwrap().len(), n);
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 16,
            ..ProptestConfig::default()
        })]

        /// Property: N appends read back as exactly those N cases, in append order.
        #[test]
        fn appends_read_back_in_order(texts in prop::collection::vec("\\PC{1,40}", 1..12)) {
            let dir = tempfile::tempdir().unwrap();
            let store = JsonFileCaseStore::new(dir.path().join("cases.json"));

            let cases: Vec<TriageCase> = texts
                .iter()
                .map(|t| TriageCase::new("2025-06-07 10:00", t.clone(), "self-care"))
                .collect();
            for c in &cases {
                store.append(c.clone()).unwrap();
                let all = store.read_all().unwrap();
                prop_assert_eq!(all.last(), Some(c));
            }

            prop_assert_eq!(store.read_all().unwrap(), cases);
        }
    }
}
