//! Durable key-value store with JSON values and live in-process mirrors

use crate::error::StoreError;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::watch;
use tracing::{debug, warn};

type StoreResult<T> = std::result::Result<T, StoreError>;

/// Raw text storage underneath a [`Store`]
pub trait Backend: Send + Sync {
    /// Stored text for `key`, `None` when absent
    fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Persist `value` under `key`. A failure must leave every stored entry as it was.
    fn set(&self, key: &str, value: &str) -> StoreResult<()>;
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

// ============================================
// Backends
// ============================================

/// One `<key>.json` file per key
#[derive(Debug, Clone)]
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl Backend for FileBackend {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        match fs::read_to_string(self.entry_path(key)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        fs::create_dir_all(&self.dir)?;

        // Each write stages in its own file and swaps it in whole; a failed
        // write removes its staging file and keeps the old entry
        let mut staging = tempfile::Builder::new()
            .prefix(&format!(".{}.", key))
            .suffix(".tmp")
            .tempfile_in(&self.dir)?;
        staging.write_all(value.as_bytes())?;
        staging.as_file().sync_all()?;
        staging.persist(self.entry_path(key)).map_err(|e| e.error)?;
        Ok(())
    }
}

/// In-process map with an optional total byte quota
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: Mutex<HashMap<String, String>>,
    quota: Option<usize>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Limit the combined size of all stored values
    pub fn with_quota(quota: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            quota: Some(quota),
        }
    }
}

impl Backend for MemoryBackend {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(lock(&self.entries).get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let mut entries = lock(&self.entries);

        if let Some(quota) = self.quota {
            let others: usize = entries
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(_, v)| v.len())
                .sum();
            let available = quota.saturating_sub(others);
            if value.len() > available {
                return Err(StoreError::QuotaExceeded {
                    key: key.to_string(),
                    needed: value.len(),
                    available,
                });
            }
        }

        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

// ============================================
// Store
// ============================================

/// Typed access to a [`Backend`], shared by both surfaces as `Arc<Store>`
pub struct Store {
    backend: Box<dyn Backend>,
    mirrors: Mutex<HashMap<String, watch::Sender<Value>>>,
}

impl Store {
    pub fn new(backend: impl Backend + 'static) -> Self {
        Self {
            backend: Box::new(backend),
            mirrors: Mutex::new(HashMap::new()),
        }
    }

    /// File-backed store rooted at `dir`
    pub fn open(dir: impl Into<PathBuf>) -> Self {
        Self::new(FileBackend::new(dir))
    }

    /// Store that forgets everything when dropped
    pub fn in_memory() -> Self {
        Self::new(MemoryBackend::new())
    }

    /// Read and decode `key`, surfacing every failure
    pub fn try_read<T: DeserializeOwned>(&self, key: &str) -> StoreResult<Option<T>> {
        let Some(text) = self.backend.get(key)? else {
            return Ok(None);
        };
        Ok(Some(serde_json::from_str(&text)?))
    }

    /// Read `key`, falling back to `default` when it is missing or unreadable
    pub fn read<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        match self.try_read(key) {
            Ok(Some(value)) => value,
            Ok(None) => default,
            Err(e) => {
                warn!(key, error = %e, "Stored value unreadable, using default");
                default
            }
        }
    }

    /// Persist `value` under `key` and publish it to every mirror of that key.
    ///
    /// Mirrors see the new value even when persisting fails.
    pub fn write<T: Serialize>(&self, key: &str, value: &T) -> StoreResult<()> {
        let value = serde_json::to_value(value)?;
        let result = self.backend.set(key, &value.to_string());

        match &result {
            Ok(()) => debug!(key, "Stored value"),
            Err(e) => warn!(key, error = %e, "Failed to persist value"),
        }

        if let Some(sender) = lock(&self.mirrors).get(key) {
            sender.send_replace(value);
        }
        result
    }

    /// Live handle on `key`
    pub fn persisted<T>(self: &Arc<Self>, key: &str, default: T) -> Persisted<T>
    where
        T: Clone + Serialize + DeserializeOwned,
    {
        let receiver = {
            let mut mirrors = lock(&self.mirrors);
            match mirrors.get(key) {
                Some(sender) => sender.subscribe(),
                None => {
                    let initial = self.read(key, default.clone());
                    let initial = serde_json::to_value(&initial).unwrap_or(Value::Null);
                    let (sender, receiver) = watch::channel(initial);
                    mirrors.insert(key.to_string(), sender);
                    receiver
                }
            }
        };

        Persisted {
            store: Arc::clone(self),
            key: key.to_string(),
            default,
            receiver,
        }
    }
}

/// An in-memory mirror of one store key.
///
/// Every mirror of a key in this process observes the same value.
#[derive(Clone)]
pub struct Persisted<T> {
    store: Arc<Store>,
    key: String,
    default: T,
    receiver: watch::Receiver<Value>,
}

impl<T> Persisted<T>
where
    T: Clone + Serialize + DeserializeOwned,
{
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Current value
    pub fn get(&self) -> T {
        serde_json::from_value(self.receiver.borrow().clone()).unwrap_or_else(|_| self.default.clone())
    }

    /// Write through the store
    pub fn set(&self, value: T) -> StoreResult<()> {
        self.store.write(&self.key, &value)
    }

    /// Replace the value with `f(current)` and return what was attempted
    pub fn update(&self, f: impl FnOnce(T) -> T) -> StoreResult<T> {
        let next = f(self.get());
        self.set(next.clone())?;
        Ok(next)
    }

    /// Wait until another mirror writes this key
    pub async fn changed(&mut self) -> bool {
        self.receiver.changed().await.is_ok()
    }
}
