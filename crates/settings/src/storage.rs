use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;

/// 設定持久化時可能發生的錯誤。 / Errors that may surface while persisting settings.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to read settings {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse settings {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to serialize settings {path}: {source}")]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to write settings {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to prepare directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// 鍵值式設定儲存介面。 / Key-value seam over whatever holds persisted settings.
pub trait SettingsBackend {
    /// 讀取指定鍵的值；不存在時回傳 `None`。 / Reads a key, `None` when absent.
    fn read(&self, key: &str) -> Result<Option<Value>, StorageError>;

    /// 寫入指定鍵的值並立即持久化。 / Writes a key and persists immediately.
    fn write(&mut self, key: &str, value: Value) -> Result<(), StorageError>;
}

/// 以單一 JSON 檔案儲存所有鍵值的後端。 / Backend keeping every key in one JSON object file.
#[derive(Debug)]
pub struct JsonFileBackend {
    path: PathBuf,
    entries: BTreeMap<String, Value>,
}

impl JsonFileBackend {
    /// 從指定路徑載入設定；檔案不存在則回傳空集合。 / Loads settings from disk, empty when the file is missing.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            return Ok(Self {
                path,
                entries: BTreeMap::new(),
            });
        }

        let contents = fs::read_to_string(&path).map_err(|source| StorageError::Read {
            path: path.clone(),
            source,
        })?;
        let entries: BTreeMap<String, Value> =
            serde_json::from_str(&contents).map_err(|source| StorageError::Parse {
                path: path.clone(),
                source,
            })?;
        Ok(Self { path, entries })
    }

    /// 目前的設定檔路徑。 / Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| StorageError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let payload = serde_json::to_string_pretty(&self.entries).map_err(|source| {
            StorageError::Serialize {
                path: self.path.clone(),
                source,
            }
        })?;

        let tmp_path = self.path.with_extension("tmp");
        fs::write(&tmp_path, payload.as_bytes()).map_err(|source| StorageError::Write {
            path: tmp_path.clone(),
            source,
        })?;
        fs::rename(&tmp_path, &self.path).map_err(|source| StorageError::Write {
            path: self.path.clone(),
            source,
        })
    }
}

impl SettingsBackend for JsonFileBackend {
    fn read(&self, key: &str) -> Result<Option<Value>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: Value) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value);
        self.save()
    }
}

/// 僅存在於記憶體的後端，供測試與暫時性工作階段使用。 / In-memory backend for tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: BTreeMap<String, Value>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsBackend for MemoryBackend {
    fn read(&self, key: &str) -> Result<Option<Value>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: Value) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }
}
