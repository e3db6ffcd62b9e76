use std::io;
use std::path::PathBuf;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to create storage directory {dir}: {source}")]
    Init {
        dir: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to read key `{key}`: {source}")]
    Read {
        key: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to write key `{key}`: {source}")]
    Write {
        key: String,
        #[source]
        source: io::Error,
    },
}

/// Durable on-device key-value storage. Values are opaque text; callers own
/// the encoding.
pub trait KeyValueStorage: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// One file per key under a fixed directory.
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|source| StorageError::Init {
            dir: dir.clone(),
            source,
        })?;
        Ok(Self { dir })
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl KeyValueStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match std::fs::read_to_string(self.key_path(key)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("storage miss for key `{}`", key);
                Ok(None)
            }
            Err(source) => Err(StorageError::Read {
                key: key.to_string(),
                source,
            }),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        // Atomic write: write to temp file, then rename
        let path = self.key_path(key);
        let temp_path = path.with_extension("tmp");
        let write_err = |source| StorageError::Write {
            key: key.to_string(),
            source,
        };
        std::fs::write(&temp_path, value).map_err(write_err)?;
        std::fs::rename(&temp_path, &path).map_err(write_err)?;
        debug!("storage wrote {} bytes for key `{}`", value.len(), key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_key_is_none() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();
        assert_eq!(storage.get("myList").unwrap(), None);
    }

    #[test]
    fn test_set_then_get() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();
        storage.set("myList", r#"["m1","m2"]"#).unwrap();
        assert_eq!(
            storage.get("myList").unwrap().as_deref(),
            Some(r#"["m1","m2"]"#)
        );
    }

    #[test]
    fn test_overwrite_replaces_value() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();
        storage.set("myList", "[]").unwrap();
        storage.set("myList", r#"["m1"]"#).unwrap();
        assert_eq!(storage.get("myList").unwrap().as_deref(), Some(r#"["m1"]"#));
        // The temp file from the atomic write must not linger
        assert!(!dir.path().join("myList.tmp").exists());
    }

    #[test]
    fn test_new_creates_missing_directory() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("data").join("store");
        let storage = FileStorage::new(&nested).unwrap();
        storage.set("myList", "[]").unwrap();
        assert!(nested.join("myList.json").exists());
    }
}
