use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Context, Result};

use crate::config::data_dir;
use crate::models::{Identity, RequestSpec};

/// Durable string-to-string storage
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// In-memory store. Clones share the same entries.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.lock().map_err(|_| anyhow!("memory store poisoned"))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.lock().map_err(|_| anyhow!("memory store poisoned"))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// One file per key under a directory
#[derive(Clone, Debug)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileStore { dir: dir.into() }
    }

    /// `~/.scriptprobe/requests`
    pub fn default_location() -> Self {
        Self::new(data_dir().join("requests"))
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", urlencoding::encode(key)))
    }

    fn ensure_dir(&self) -> Result<()> {
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir)
                .with_context(|| format!("creating {}", self.dir.display()))?;
        }
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("reading {}", path.display())),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.ensure_dir()?;
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value).with_context(|| format!("writing {}", tmp.display()))?;
        fs::rename(&tmp, &path).with_context(|| format!("replacing {}", path.display()))?;
        Ok(())
    }
}

/// Persists one request snapshot per identity.
///
/// Failures never reach the caller: loads fall back to the default request
/// and saves are logged and dropped.
pub struct RequestStore {
    backend: Box<dyn KeyValueStore>,
}

impl RequestStore {
    pub fn new(backend: impl KeyValueStore + 'static) -> Self {
        RequestStore {
            backend: Box::new(backend),
        }
    }

    /// Snapshot for `identity`, or the default request
    pub fn load(&self, identity: &Identity) -> RequestSpec {
        match self.try_load(identity) {
            Ok(Some(spec)) => spec,
            Ok(None) => RequestSpec::default(),
            Err(e) => {
                tracing::warn!(%identity, error = %e, "Failed to load request snapshot, using defaults");
                RequestSpec::default()
            }
        }
    }

    pub fn try_load(&self, identity: &Identity) -> Result<Option<RequestSpec>> {
        let Some(raw) = self.backend.get(&identity.storage_key())? else {
            return Ok(None);
        };
        let spec = serde_json::from_str(&raw).context("corrupt request snapshot")?;
        Ok(Some(spec))
    }

    /// Overwrite the snapshot for `identity`
    pub fn save(&self, identity: &Identity, spec: &RequestSpec) {
        match self.try_save(identity, spec) {
            Ok(()) => tracing::debug!(%identity, "Saved request snapshot"),
            Err(e) => tracing::warn!(%identity, error = %e, "Failed to save request snapshot"),
        }
    }

    pub fn try_save(&self, identity: &Identity, spec: &RequestSpec) -> Result<()> {
        let content = serde_json::to_string(spec)?;
        self.backend.set(&identity.storage_key(), &content)
    }
}

impl Default for RequestStore {
    fn default() -> Self {
        Self::new(FileStore::default_location())
    }
}
