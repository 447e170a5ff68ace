//! Persisted player preferences
//!
//! [`PlayerPrefs`] stores every value as a string in a [`KeyValueStore`] and
//! parses on read, so a value written as one type and read as another fails
//! with [`PrefsError::WrongType`] instead of being coerced.
//!
//! [`MemoryStore`] lives as long as the process; [`FileStore`] keeps the
//! values in a TOML file and rewrites it after every change.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use thiserror::Error;

/// Preference errors
#[derive(Error, Debug)]
pub enum PrefsError {
    /// No value stored under the key and no default given
    #[error("Key {0} not found")]
    NotFound(String),

    /// The stored value does not parse as the requested type
    #[error("Key {key} is not a valid {expected}")]
    WrongType {
        /// Key that was read
        key: String,
        /// Requested type
        expected: &'static str,
    },

    /// File IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The preferences file is not valid TOML
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// The preferences could not be written as TOML
    #[error("Serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// String key-value storage
pub trait KeyValueStore {
    /// Stored value
    fn get(&self, key: &str) -> Option<String>;

    /// Store a value
    fn set(&mut self, key: &str, value: String) -> Result<(), PrefsError>;

    /// Forget a value
    fn remove(&mut self, key: &str) -> Result<(), PrefsError>;

    /// Forget every value
    fn clear(&mut self) -> Result<(), PrefsError>;
}

/// In-memory store
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: BTreeMap<String, String>,
}

impl MemoryStore {
    /// Empty store
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), PrefsError> {
        self.values.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), PrefsError> {
        self.values.remove(key);
        Ok(())
    }

    fn clear(&mut self) -> Result<(), PrefsError> {
        self.values.clear();
        Ok(())
    }
}

/// Store persisted to a TOML file
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl FileStore {
    /// Open the store at `path`, loading it if the file exists
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PrefsError> {
        let path = path.as_ref().to_path_buf();
        let values = if path.exists() {
            let content = fs::read_to_string(&path)?;
            toml::from_str(&content)?
        } else {
            BTreeMap::new()
        };
        debug!("Opened preferences at {}", path.display());
        Ok(Self { path, values })
    }

    /// File backing the store
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), PrefsError> {
        let content = toml::to_string(&self.values)?;
        fs::write(&self.path, content)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), PrefsError> {
        self.values.insert(key.to_string(), value);
        self.flush()
    }

    fn remove(&mut self, key: &str) -> Result<(), PrefsError> {
        if self.values.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }

    fn clear(&mut self) -> Result<(), PrefsError> {
        self.values.clear();
        self.flush()
    }
}

/// Typed access to a key-value store
#[derive(Debug, Clone, Default)]
pub struct PlayerPrefs<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> PlayerPrefs<S> {
    /// Preferences over a store
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// The underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Give back the underlying store
    pub fn into_inner(self) -> S {
        self.store
    }

    fn read<T>(
        &self,
        key: &str,
        default: Option<T>,
        expected: &'static str,
        parse: impl FnOnce(&str) -> Option<T>,
    ) -> Result<T, PrefsError> {
        match self.store.get(key) {
            Some(raw) => parse(&raw).ok_or_else(|| PrefsError::WrongType {
                key: key.to_string(),
                expected,
            }),
            None => default.ok_or_else(|| PrefsError::NotFound(key.to_string())),
        }
    }

    /// String value, or `default` when missing
    pub fn get_string(&self, key: &str, default: Option<&str>) -> Result<String, PrefsError> {
        self.read(key, default.map(str::to_string), "string", |raw| {
            Some(raw.to_string())
        })
    }

    /// Store a string
    pub fn set_string(&mut self, key: &str, value: &str) -> Result<(), PrefsError> {
        self.store.set(key, value.to_string())
    }

    /// Integer value, or `default` when missing
    pub fn get_int(&self, key: &str, default: Option<i64>) -> Result<i64, PrefsError> {
        self.read(key, default, "integer", |raw| raw.trim().parse().ok())
    }

    /// Store an integer
    pub fn set_int(&mut self, key: &str, value: i64) -> Result<(), PrefsError> {
        self.store.set(key, value.to_string())
    }

    /// Float value, or `default` when missing
    pub fn get_float(&self, key: &str, default: Option<f64>) -> Result<f64, PrefsError> {
        self.read(key, default, "number", |raw| {
            raw.trim().parse::<f64>().ok().filter(|v| !v.is_nan())
        })
    }

    /// Store a float
    pub fn set_float(&mut self, key: &str, value: f64) -> Result<(), PrefsError> {
        self.store.set(key, value.to_string())
    }

    /// Boolean value, or `default` when missing
    pub fn get_bool(&self, key: &str, default: Option<bool>) -> Result<bool, PrefsError> {
        self.read(key, default, "boolean", |raw| match raw {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        })
    }

    /// Store a boolean
    pub fn set_bool(&mut self, key: &str, value: bool) -> Result<(), PrefsError> {
        self.store.set(key, value.to_string())
    }

    /// Whether a value is stored under the key
    pub fn has_key(&self, key: &str) -> bool {
        self.store.get(key).is_some()
    }

    /// Forget one value
    pub fn delete_key(&mut self, key: &str) -> Result<(), PrefsError> {
        self.store.remove(key)
    }

    /// Forget every value
    pub fn delete_all(&mut self) -> Result<(), PrefsError> {
        self.store.clear()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_typed_round_trip_and_defaults() {
        let mut prefs = PlayerPrefs::new(MemoryStore::new());
        prefs.set_int("high_score", 4200).unwrap();
        prefs.set_float("volume", 0.75).unwrap();
        prefs.set_bool("fullscreen", true).unwrap();
        prefs.set_string("name", "wolf").unwrap();

        assert_eq!(prefs.get_int("high_score", None).unwrap(), 4200);
        assert_eq!(prefs.get_float("volume", None).unwrap(), 0.75);
        assert!(prefs.get_bool("fullscreen", None).unwrap());
        assert_eq!(prefs.get_string("name", None).unwrap(), "wolf");

        assert_eq!(prefs.get_int("lives", Some(3)).unwrap(), 3);
        assert!(matches!(prefs.get_int("lives", None), Err(PrefsError::NotFound(_))));
    }

    #[test]
    fn test_wrong_type_is_an_error() {
        let mut prefs = PlayerPrefs::new(MemoryStore::new());
        prefs.set_float("volume", 0.5).unwrap();
        prefs.set_string("name", "wolf").unwrap();

        assert!(matches!(
            prefs.get_int("volume", Some(1)),
            Err(PrefsError::WrongType { expected: "integer", .. })
        ));
        assert!(matches!(
            prefs.get_bool("name", None),
            Err(PrefsError::WrongType { expected: "boolean", .. })
        ));
        assert_eq!(prefs.get_float("volume", None).unwrap(), 0.5);
    }

    #[test]
    fn test_delete() {
        let mut prefs = PlayerPrefs::new(MemoryStore::new());
        prefs.set_int("a", 1).unwrap();
        prefs.set_int("b", 2).unwrap();
        prefs.delete_key("a").unwrap();
        assert!(!prefs.has_key("a"));
        assert!(prefs.has_key("b"));
        prefs.delete_all().unwrap();
        assert!(!prefs.has_key("b"));
    }

    #[test]
    fn test_file_store_persists_between_opens() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("prefs.toml");

        let mut prefs = PlayerPrefs::new(FileStore::open(&path).unwrap());
        prefs.set_int("high_score", 99).unwrap();
        prefs.set_bool("muted", false).unwrap();
        drop(prefs);

        let prefs = PlayerPrefs::new(FileStore::open(&path).unwrap());
        assert_eq!(prefs.get_int("high_score", None).unwrap(), 99);
        assert!(!prefs.get_bool("muted", None).unwrap());
        assert_eq!(prefs.store().path(), path.as_path());
    }
}
