//! Key/value backends the settings document is persisted to.

use std::{
    collections::HashMap,
    fs, io,
    path::{Path, PathBuf},
};

use crate::SettingsError;

/// Key/value persistence used by [`crate::SettingsStore`].
pub trait SettingsStorage {
    /// Reads the value stored under `key`, or `None` when nothing is stored.
    fn read(&self, key: &str) -> Result<Option<String>, SettingsError>;

    /// Stores `value` under `key`, replacing any previous value.
    fn write(&mut self, key: &str, value: &str) -> Result<(), SettingsError>;
}

/// Volatile storage that lives as long as the process.
#[derive(Clone, Debug, Default)]
pub struct MemoryStorage {
    values: HashMap<String, String>,
}

impl MemoryStorage {
    /// Creates an empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a storage preloaded with a single entry.
    #[must_use]
    pub fn with_entry(key: &str, value: &str) -> Self {
        let mut storage = Self::new();
        let _ = storage.values.insert(key.to_owned(), value.to_owned());
        storage
    }

    /// Borrows the value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }
}

impl SettingsStorage for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>, SettingsError> {
        Ok(self.values.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), SettingsError> {
        let _ = self.values.insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

/// Stores each key as `<key>.json` inside a directory.
#[derive(Clone, Debug)]
pub struct FileStorage {
    directory: PathBuf,
}

impl FileStorage {
    /// Creates a storage rooted at `directory`. The directory is created on
    /// the first write.
    #[must_use]
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    /// Directory the files live in.
    #[must_use]
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.directory.join(format!("{key}.json"))
    }
}

impl SettingsStorage for FileStorage {
    fn read(&self, key: &str) -> Result<Option<String>, SettingsError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(error) => Err(SettingsError::Read(error)),
        }
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), SettingsError> {
        fs::create_dir_all(&self.directory).map_err(SettingsError::Write)?;
        fs::write(self.path_for(key), value).map_err(SettingsError::Write)
    }
}
