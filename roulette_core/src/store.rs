//! Exercise record persistence.
//!
//! The catalog is stored as a JSON array. Reads take a shared lock; updates
//! hold an exclusive lock on a sidecar lock file for the whole
//! read-modify-write and replace the data file atomically.

use crate::{Error, Exercise, Result};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Storage backend for exercise records
pub trait ExerciseStore {
    fn list(&self) -> Result<Vec<Exercise>>;
    fn create(&mut self, exercise: &Exercise) -> Result<()>;
    fn delete(&mut self, id: &str) -> Result<()>;
}

/// JSON file store with file locking
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Create a store backed by the given file (created lazily)
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `<data_dir>/exercises.json`
    pub fn in_dir(data_dir: &Path) -> Self {
        Self::new(data_dir.join("exercises.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".lock");
        self.path.with_file_name(name)
    }

    fn parent_dir(&self) -> &Path {
        match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        }
    }

    /// Read all records with a shared lock
    fn read_all(&self) -> Result<Vec<Exercise>> {
        if !self.path.exists() {
            tracing::debug!("No exercise file at {:?}, starting empty", self.path);
            return Ok(Vec::new());
        }

        let file = File::open(&self.path)?;
        file.lock_shared()?;

        let mut contents = String::new();
        let read = std::io::BufReader::new(&file).read_to_string(&mut contents);
        let _ = file.unlock();
        read?;

        if contents.trim().is_empty() {
            return Ok(Vec::new());
        }

        let exercises: Vec<Exercise> = serde_json::from_str(&contents)?;
        tracing::debug!("Read {} exercises from {:?}", exercises.len(), self.path);
        Ok(exercises)
    }

    /// Atomically replace the data file
    fn write_all(&self, exercises: &[Exercise]) -> Result<()> {
        let parent = self.parent_dir();
        let temp = NamedTempFile::new_in(parent)?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            let contents = serde_json::to_string_pretty(exercises)?;
            writer.write_all(contents.as_bytes())?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.persist(&self.path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Wrote {} exercises to {:?}", exercises.len(), self.path);
        Ok(())
    }

    /// Load, modify and save under an exclusive lock
    fn update<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce(&mut Vec<Exercise>) -> Result<()>,
    {
        std::fs::create_dir_all(self.parent_dir())?;

        let lock = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(self.lock_path())?;
        lock.lock_exclusive()?;

        let result = self.read_all().and_then(|mut exercises| {
            f(&mut exercises)?;
            self.write_all(&exercises)
        });

        let _ = lock.unlock();
        result
    }
}

impl ExerciseStore for JsonFileStore {
    fn list(&self) -> Result<Vec<Exercise>> {
        self.read_all().map_err(Error::into_storage)
    }

    fn create(&mut self, exercise: &Exercise) -> Result<()> {
        self.update(|exercises| {
            if exercises.iter().any(|e| e.id == exercise.id) {
                return Err(Error::Validation(format!(
                    "Exercise id '{}' already stored",
                    exercise.id
                )));
            }
            exercises.push(exercise.clone());
            Ok(())
        })
        .map_err(Error::into_storage)
    }

    fn delete(&mut self, id: &str) -> Result<()> {
        self.update(|exercises| {
            let before = exercises.len();
            exercises.retain(|e| e.id != id);
            if exercises.len() == before {
                return Err(Error::NotFound(id.to_string()));
            }
            Ok(())
        })
        .map_err(Error::into_storage)
    }
}

/// In-memory store, optionally failing every call
#[derive(Debug, Default)]
pub struct MemoryStore {
    exercises: Vec<Exercise>,
    failing: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_exercises(exercises: Vec<Exercise>) -> Self {
        Self {
            exercises,
            failing: false,
        }
    }

    /// Make every subsequent call fail with a storage error
    pub fn set_failing(&mut self, failing: bool) {
        self.failing = failing;
    }

    fn check(&self) -> Result<()> {
        if self.failing {
            Err(Error::Storage("memory store unavailable".into()))
        } else {
            Ok(())
        }
    }
}

impl ExerciseStore for MemoryStore {
    fn list(&self) -> Result<Vec<Exercise>> {
        self.check()?;
        Ok(self.exercises.clone())
    }

    fn create(&mut self, exercise: &Exercise) -> Result<()> {
        self.check()?;
        if self.exercises.iter().any(|e| e.id == exercise.id) {
            return Err(Error::Validation(format!(
                "Exercise id '{}' already stored",
                exercise.id
            )));
        }
        self.exercises.push(exercise.clone());
        Ok(())
    }

    fn delete(&mut self, id: &str) -> Result<()> {
        self.check()?;
        let before = self.exercises.len();
        self.exercises.retain(|e| e.id != id);
        if self.exercises.len() == before {
            return Err(Error::NotFound(id.to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Difficulty, MeasureType};

    fn exercise(id: &str) -> Exercise {
        Exercise {
            id: id.into(),
            name: format!("Exercise {}", id),
            tag: "bras".into(),
            difficulty: Difficulty::Facile,
            measure_type: MeasureType::Reps,
        }
    }

    #[test]
    fn test_missing_file_lists_empty() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::in_dir(temp_dir.path());
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn test_create_list_delete() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = JsonFileStore::in_dir(&temp_dir.path().join("nested"));

        store.create(&exercise("1")).unwrap();
        store.create(&exercise("2")).unwrap();

        let listed = store.list().unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, "1");

        store.delete("1").unwrap();
        let listed = store.list().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, "2");
    }

    #[test]
    fn test_duplicate_create_is_rejected_and_file_unchanged() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = JsonFileStore::in_dir(temp_dir.path());

        store.create(&exercise("1")).unwrap();
        assert!(store.create(&exercise("1")).is_err());
        assert_eq!(store.list().unwrap().len(), 1);
    }

    #[test]
    fn test_delete_unknown_is_not_found() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = JsonFileStore::in_dir(temp_dir.path());
        store.create(&exercise("1")).unwrap();

        assert!(matches!(store.delete("9"), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_corrupted_file_is_storage_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::in_dir(temp_dir.path());
        std::fs::write(store.path(), "{ not json ]").unwrap();

        assert!(matches!(store.list(), Err(Error::Storage(_))));
    }

    #[test]
    fn test_corrupted_file_is_not_overwritten() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = JsonFileStore::in_dir(temp_dir.path());
        std::fs::write(store.path(), "garbage").unwrap();

        assert!(store.create(&exercise("1")).is_err());
        assert_eq!(std::fs::read_to_string(store.path()).unwrap(), "garbage");
    }

    #[test]
    fn test_legacy_records_without_measure_type() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::in_dir(temp_dir.path());
        std::fs::write(
            store.path(),
            r#"[{"id":"a","name":"Pompes","tag":"bras","difficulty":"facile"}]"#,
        )
        .unwrap();

        let listed = store.list().unwrap();
        assert_eq!(listed[0].measure_type, MeasureType::Reps);
    }

    #[test]
    fn test_no_stray_temp_files() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = JsonFileStore::in_dir(temp_dir.path());
        store.create(&exercise("1")).unwrap();

        let extras: Vec<_> = std::fs::read_dir(temp_dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .filter(|n| n != "exercises.json" && n != "exercises.json.lock")
            .collect();
        assert!(extras.is_empty(), "unexpected files: {:?}", extras);
    }

    #[test]
    fn test_memory_store_failure_switch() {
        let mut store = MemoryStore::with_exercises(vec![exercise("1")]);
        store.set_failing(true);
        assert!(matches!(store.list(), Err(Error::Storage(_))));
        assert!(matches!(store.delete("1"), Err(Error::Storage(_))));

        store.set_failing(false);
        assert_eq!(store.list().unwrap().len(), 1);
    }
}
