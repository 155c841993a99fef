//! Local key-value settings and the privacy consent flag stored in them.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::{Error, Result};

/// Key under which the consent flag is stored.
pub const CONSENT_KEY: &str = "privacyConsent";

/// Local key-value storage for extension settings (async)
#[allow(async_fn_in_trait)]
pub trait KeyValueStore {
    /// Value stored under `key`, if any
    async fn get(&self, key: &str) -> Result<Option<Value>>;

    /// Store `value` under `key`, replacing any previous value
    async fn set(&self, key: &str, value: Value) -> Result<()>;

    /// Remove `key`; missing keys are not an error
    async fn remove(&self, key: &str) -> Result<()>;

    /// Remove every key
    async fn clear(&self) -> Result<()>;
}

/// Typed helpers over any [`KeyValueStore`].
#[allow(async_fn_in_trait)]
pub trait KeyValueStoreExt: KeyValueStore {
    async fn get_as<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        self.get(key)
            .await?
            .map(serde_json::from_value)
            .transpose()
            .map_err(Error::from)
    }

    async fn set_as<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        self.set(key, serde_json::to_value(value)?).await
    }
}

impl<S: KeyValueStore> KeyValueStoreExt for S {}

type Entries = BTreeMap<String, Value>;

fn lock_entries(entries: &Mutex<Entries>) -> Result<MutexGuard<'_, Entries>> {
    entries
        .lock()
        .map_err(|_| Error::Store("settings lock poisoned".to_string()))
}

/// Settings kept in memory only.
#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    entries: Mutex<Entries>,
}

impl KeyValueStore for MemorySettingsStore {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(lock_entries(&self.entries)?.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        lock_entries(&self.entries)?.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        lock_entries(&self.entries)?.remove(key);
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        lock_entries(&self.entries)?.clear();
        Ok(())
    }
}

/// Settings persisted as a single JSON object file.
#[derive(Debug)]
pub struct JsonFileSettingsStore {
    path: PathBuf,
    entries: Mutex<Entries>,
}

impl JsonFileSettingsStore {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let entries = if path.exists() {
            let raw = std::fs::read_to_string(&path)?;
            if raw.trim().is_empty() {
                Entries::new()
            } else {
                serde_json::from_str(&raw)?
            }
        } else {
            Entries::new()
        };
        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write(&self, entries: &Entries) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(entries)?)?;
        Ok(())
    }

    fn mutate(&self, change: impl FnOnce(&mut Entries)) -> Result<()> {
        let mut entries = lock_entries(&self.entries)?;
        change(&mut entries);
        self.write(&entries)
    }
}

impl KeyValueStore for JsonFileSettingsStore {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(lock_entries(&self.entries)?.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        self.mutate(|entries| {
            entries.insert(key.to_string(), value);
        })
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.mutate(|entries| {
            entries.remove(key);
        })
    }

    async fn clear(&self) -> Result<()> {
        self.mutate(BTreeMap::clear)
    }
}

/// Reads and records the user's privacy consent.
#[derive(Debug)]
pub struct ConsentGate<'a, S> {
    store: &'a S,
}

impl<'a, S: KeyValueStore> ConsentGate<'a, S> {
    pub const fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Any truthy stored value counts as consent.
    pub async fn has_consent(&self) -> Result<bool> {
        Ok(self.store.get(CONSENT_KEY).await?.is_some_and(|value| is_truthy(&value)))
    }

    pub async fn grant(&self) -> Result<()> {
        tracing::info!("Privacy consent granted");
        self.store.set(CONSENT_KEY, Value::Bool(true)).await
    }

    pub async fn revoke(&self) -> Result<()> {
        tracing::info!("Privacy consent revoked");
        self.store.remove(CONSENT_KEY).await
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|number| number.abs() > 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
