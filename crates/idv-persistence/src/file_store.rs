use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use idv_core::{SessionStore, StoreError, StoreKey};
use log::{debug, warn};

use crate::config::StoreConfig;
use crate::error::PersistenceError;

/// `SessionStore` respaldado por un archivo JSON. Mantiene una copia en
/// memoria; cada `set`/`remove` reescribe el archivo completo.
#[derive(Debug)]
pub struct FileSessionStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileSessionStore {
    /// Abre (o prepara) el store en `path`. Un archivo inexistente es un
    /// store vacío; uno ilegible es un error.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PersistenceError> {
        let path = path.as_ref().to_path_buf();
        let entries = match fs::read_to_string(&path) {
            Ok(text) if text.trim().is_empty() => BTreeMap::new(),
            Ok(text) => serde_json::from_str(&text)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        debug!("session store opened at {} ({} keys)", path.display(), entries.len());
        Ok(Self { path,
                  entries: Mutex::new(entries) })
    }

    pub fn from_config(config: &StoreConfig) -> Result<Self, PersistenceError> {
        Self::open(&config.path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Copia de todas las entradas (para inspección).
    pub fn snapshot(&self) -> Result<BTreeMap<String, String>, PersistenceError> {
        Ok(self.entries()?.clone())
    }

    fn entries(&self) -> Result<MutexGuard<'_, BTreeMap<String, String>>, PersistenceError> {
        self.entries.lock().map_err(|_| PersistenceError::Poisoned)
    }

    fn flush(&self, entries: &BTreeMap<String, String>) -> Result<(), PersistenceError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        let written = Self::write_tmp(&tmp, entries).and_then(|_| fs::rename(&tmp, &self.path).map_err(PersistenceError::from));
        if written.is_err() {
            let _ = fs::remove_file(&tmp);
        }
        written
    }

    fn write_tmp(tmp: &Path, entries: &BTreeMap<String, String>) -> Result<(), PersistenceError> {
        let mut file = fs::File::create(tmp)?;
        file.write_all(serde_json::to_string_pretty(entries)?.as_bytes())?;
        file.sync_all()?;
        Ok(())
    }

    /// Aplica el cambio sobre una copia; la memoria sólo se actualiza si
    /// el archivo se escribió.
    fn mutate(&self, f: impl FnOnce(&mut BTreeMap<String, String>) -> bool) -> Result<(), PersistenceError> {
        let mut entries = self.entries()?;
        let mut next = entries.clone();
        if !f(&mut next) {
            return Ok(());
        }
        if let Err(e) = self.flush(&next) {
            warn!("could not write session store {}: {e}", self.path.display());
            return Err(e);
        }
        *entries = next;
        Ok(())
    }
}

impl SessionStore for FileSessionStore {
    fn get(&self, key: StoreKey) -> Result<Option<String>, StoreError> {
        Ok(self.entries()?.get(key.as_str()).cloned())
    }

    fn set(&self, key: StoreKey, value: &str) -> Result<(), StoreError> {
        Ok(self.mutate(|m| m.insert(key.as_str().to_string(), value.to_string()).as_deref() != Some(value))?)
    }

    fn remove(&self, key: StoreKey) -> Result<(), StoreError> {
        Ok(self.mutate(|m| m.remove(key.as_str()).is_some())?)
    }
}
