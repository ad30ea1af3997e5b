use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use mural_safe_core::{PortError, SafeRecord, SafeStorePort};

const STORE_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct StoreFile {
    version: u32,
    safes: Vec<SafeRecord>,
}

fn add_record(
    records: &mut BTreeMap<Address, SafeRecord>,
    record: SafeRecord,
) -> Result<(), PortError> {
    if records.contains_key(&record.address) {
        return Err(PortError::Conflict(format!(
            "safe {} is already stored",
            record.address
        )));
    }
    records.insert(record.address, record);
    Ok(())
}

/// Safes kept for the lifetime of the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<BTreeMap<Address, SafeRecord>>,
}

impl MemoryStore {
    fn lock(&self) -> Result<MutexGuard<'_, BTreeMap<Address, SafeRecord>>, PortError> {
        self.records
            .lock()
            .map_err(|e| PortError::Transport(format!("store lock poisoned: {e}")))
    }
}

impl SafeStorePort for MemoryStore {
    fn add(&self, record: SafeRecord) -> Result<(), PortError> {
        add_record(&mut *self.lock()?, record)
    }

    fn list(&self) -> Result<Vec<SafeRecord>, PortError> {
        Ok(self.lock()?.values().cloned().collect())
    }

    fn get(&self, address: Address) -> Result<Option<SafeRecord>, PortError> {
        Ok(self.lock()?.get(&address).cloned())
    }

    fn remove(&self, address: Address) -> Result<bool, PortError> {
        Ok(self.lock()?.remove(&address).is_some())
    }
}

/// Safes persisted as a JSON document, rewritten atomically on every change.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    guard: Mutex<()>,
}

impl JsonFileStore {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, PortError> {
        let store = Self {
            path: path.into(),
            guard: Mutex::new(()),
        };
        // Surface a corrupt file at startup rather than on first use.
        let count = store.load()?.len();
        info!(path = %store.path.display(), count, "safe store opened");
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> Result<MutexGuard<'_, ()>, PortError> {
        self.guard
            .lock()
            .map_err(|e| PortError::Transport(format!("store lock poisoned: {e}")))
    }

    fn load(&self) -> Result<BTreeMap<Address, SafeRecord>, PortError> {
        let raw = match fs::read(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => {
                return Err(PortError::Transport(format!(
                    "failed to read {}: {e}",
                    self.path.display()
                )))
            }
        };
        let file: StoreFile = serde_json::from_slice(&raw).map_err(|e| {
            PortError::Validation(format!("corrupt store {}: {e}", self.path.display()))
        })?;
        if file.version != STORE_VERSION {
            return Err(PortError::Validation(format!(
                "unsupported store version {} in {}",
                file.version,
                self.path.display()
            )));
        }
        Ok(file.safes.into_iter().map(|r| (r.address, r)).collect())
    }

    fn save(&self, records: &BTreeMap<Address, SafeRecord>) -> Result<(), PortError> {
        let io_err =
            |e: std::io::Error| PortError::Transport(format!("failed to write store: {e}"));
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let file = StoreFile {
            version: STORE_VERSION,
            safes: records.values().cloned().collect(),
        };
        let json = serde_json::to_vec_pretty(&file)
            .map_err(|e| PortError::Validation(format!("store serialization failed: {e}")))?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(io_err)?;
        fs::rename(&tmp, &self.path).map_err(io_err)?;
        debug!(path = %self.path.display(), count = records.len(), "safe store saved");
        Ok(())
    }
}

impl SafeStorePort for JsonFileStore {
    fn add(&self, record: SafeRecord) -> Result<(), PortError> {
        let _guard = self.lock()?;
        let mut records = self.load()?;
        add_record(&mut records, record)?;
        self.save(&records)
    }

    fn list(&self) -> Result<Vec<SafeRecord>, PortError> {
        let _guard = self.lock()?;
        Ok(self.load()?.into_values().collect())
    }

    fn get(&self, address: Address) -> Result<Option<SafeRecord>, PortError> {
        let _guard = self.lock()?;
        Ok(self.load()?.remove(&address))
    }

    fn remove(&self, address: Address) -> Result<bool, PortError> {
        let _guard = self.lock()?;
        let mut records = self.load()?;
        if records.remove(&address).is_none() {
            return Ok(false);
        }
        self.save(&records)?;
        Ok(true)
    }
}
