//! Snapshot persistence with file locking.
//!
//! The snapshot is stored as two entries in the data directory,
//! `skills.json` and `habits.json`, each holding one serialized collection.
//! Entries are always replaced whole: written to a temp file, synced, then
//! renamed over the original. Readers take a shared lock while reading.

use crate::{get_default_state, Error, ProgressionState, ProgressionStore, Result};
use fs2::FileExt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

pub const SKILLS_FILE: &str = "skills.json";
pub const HABITS_FILE: &str = "habits.json";

/// Durable storage for the progression snapshot
#[derive(Clone, Debug)]
pub struct SnapshotStore {
    dir: PathBuf,
}

impl SnapshotStore {
    /// Create a snapshot store rooted at the given data directory
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn skills_path(&self) -> PathBuf {
        self.dir.join(SKILLS_FILE)
    }

    pub fn habits_path(&self) -> PathBuf {
        self.dir.join(HABITS_FILE)
    }

    /// Load the persisted state
    ///
    /// Returns the starter state if either entry is missing.
    /// If an entry is unreadable or corrupted, logs a warning and returns
    /// the starter state.
    pub fn load(&self) -> Result<ProgressionState> {
        let skills_path = self.skills_path();
        let habits_path = self.habits_path();

        if !skills_path.exists() || !habits_path.exists() {
            tracing::info!("No snapshot found in {:?}, using starter state", self.dir);
            return Ok(get_default_state().clone());
        }

        let skills = read_entry(&skills_path);
        let habits = read_entry(&habits_path);

        match (skills, habits) {
            (Some(skills), Some(habits)) => {
                tracing::debug!("Loaded snapshot from {:?}", self.dir);
                Ok(ProgressionState { skills, habits })
            }
            _ => Ok(get_default_state().clone()),
        }
    }

    /// Persist the full state, replacing both entries
    ///
    /// Both entries are fully written and synced to temp files before either
    /// is renamed into place. If the habits rename fails after the skills
    /// entry was replaced, the previous skills entry is restored, so a failed
    /// save leaves the snapshot as it was.
    pub fn save(&self, state: &ProgressionState) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;

        let skills_path = self.skills_path();
        let habits_path = self.habits_path();

        let skills = prepare_entry(&self.dir, &state.skills)?;
        let habits = prepare_entry(&self.dir, &state.habits)?;
        let previous_skills = backup_entry(&self.dir, &skills_path)?;

        skills
            .persist(&skills_path)
            .map_err(|e| Error::Io(e.error))?;

        if let Err(e) = habits.persist(&habits_path) {
            tracing::warn!(
                "Failed to replace {:?}: {}. Restoring previous skills entry.",
                habits_path,
                e.error
            );
            restore_entry(previous_skills, &skills_path)?;
            return Err(Error::Io(e.error));
        }

        tracing::debug!("Saved snapshot to {:?}", self.dir);
        Ok(())
    }

    /// Load the state, run a store operation on it, and save it back
    ///
    /// Nothing is written when the operation fails, so a rejected mutation
    /// never reaches disk.
    pub fn update<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut ProgressionStore) -> Result<T>,
    {
        let mut store = ProgressionStore::new(self.load()?);
        let output = f(&mut store)?;
        self.save(store.state())?;
        Ok(output)
    }
}

/// Read one entry with a shared lock, returning None on any failure
fn read_entry<T: DeserializeOwned>(path: &Path) -> Option<T> {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) => {
            tracing::warn!(
                "Unable to open snapshot entry {:?}: {}. Using starter state.",
                path,
                e
            );
            return None;
        }
    };

    // Acquire shared lock for reading
    if let Err(e) = file.lock_shared() {
        tracing::warn!(
            "Unable to lock snapshot entry {:?}: {}. Using starter state.",
            path,
            e
        );
        return None;
    }

    let mut contents = String::new();
    let mut reader = std::io::BufReader::new(&file);
    let read = reader.read_to_string(&mut contents);
    let _ = file.unlock();

    if let Err(e) = read {
        tracing::warn!(
            "Failed to read snapshot entry {:?}: {}. Using starter state.",
            path,
            e
        );
        return None;
    }

    match serde_json::from_str::<T>(&contents) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(
                "Failed to parse snapshot entry {:?}: {}. Using starter state.",
                path,
                e
            );
            None
        }
    }
}

/// Write one entry to a synced temp file in `dir`, ready to be persisted
fn prepare_entry<T: Serialize>(dir: &Path, value: &T) -> Result<NamedTempFile> {
    // Same directory as the target so the final rename is atomic
    let temp = NamedTempFile::new_in(dir)?;

    {
        let mut writer = std::io::BufWriter::new(temp.as_file());
        let contents = serde_json::to_string(value)?;
        writer.write_all(contents.as_bytes())?;
        writer.flush()?;
    }

    temp.as_file().sync_all()?;
    Ok(temp)
}

/// Copy the current contents of an entry into a temp file, if it exists
fn backup_entry(dir: &Path, path: &Path) -> Result<Option<NamedTempFile>> {
    if !path.exists() {
        return Ok(None);
    }

    let mut source = File::open(path)?;
    let mut backup = NamedTempFile::new_in(dir)?;
    std::io::copy(&mut source, backup.as_file_mut())?;
    backup.as_file().sync_all()?;
    Ok(Some(backup))
}

/// Put a backed-up entry back, or remove the entry if there was none
fn restore_entry(backup: Option<NamedTempFile>, path: &Path) -> Result<()> {
    match backup {
        Some(backup) => {
            backup.persist(path).map_err(|e| Error::Io(e.error))?;
        }
        None => std::fs::remove_file(path)?,
    }
    Ok(())
}
