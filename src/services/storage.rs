use crate::domain::errors::NominationError;
use crate::domain::models::{Ledger, NewNomination, NominationRecord, Status};
use chrono::Utc;
use fs2::FileExt;
use std::ffi::OsString;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

/// Create/read/update access to nomination records, keyed by `id`.
///
/// Implementations assign ids on insert and reject updates whose `version`
/// does not match the stored one.
pub trait NominationStore {
    fn insert(&mut self, new: NewNomination) -> Result<NominationRecord, NominationError>;
    fn get(&self, id: &str) -> Result<NominationRecord, NominationError>;
    fn update(&mut self, record: NominationRecord) -> Result<NominationRecord, NominationError>;
    fn list(&self) -> Result<Vec<NominationRecord>, NominationError>;

    fn find_by_kobo_uid(&self, uid: &str) -> Result<Option<NominationRecord>, NominationError> {
        Ok(self.list()?.into_iter().find(|r| {
            r.source
                .as_ref()
                .map(|s| s.kobo_uid == uid)
                .unwrap_or(false)
        }))
    }

    /// Best-effort audit trail; stores without one ignore it.
    fn audit(&self, _action: &str, _data: serde_json::Value) {}
}

fn mint(new: NewNomination) -> NominationRecord {
    NominationRecord {
        id: uuid::Uuid::new_v4().to_string(),
        nominator: new.nominator,
        nominee: new.nominee,
        award_cycle: new.award_cycle,
        justification: new.justification,
        status: Status::Draft,
        submitted_at: None,
        created_at: Utc::now(),
        version: 1,
        reviewer: None,
        votes: 0,
        history: Vec::new(),
        details: new.details,
        source: new.source,
        attachments: Vec::new(),
    }
}

fn check_version(stored: &NominationRecord, incoming: &NominationRecord) -> Result<(), NominationError> {
    if stored.version != incoming.version {
        return Err(NominationError::Conflict {
            id: incoming.id.clone(),
            expected: incoming.version,
            found: stored.version,
        });
    }
    Ok(())
}

#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: std::collections::BTreeMap<String, NominationRecord>,
}

#[cfg(test)]
impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
impl NominationStore for MemoryStore {
    fn insert(&mut self, new: NewNomination) -> Result<NominationRecord, NominationError> {
        let record = mint(new);
        self.records.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn get(&self, id: &str) -> Result<NominationRecord, NominationError> {
        self.records
            .get(id)
            .cloned()
            .ok_or_else(|| NominationError::NotFound(id.to_string()))
    }

    fn update(&mut self, mut record: NominationRecord) -> Result<NominationRecord, NominationError> {
        let stored = self
            .records
            .get_mut(&record.id)
            .ok_or_else(|| NominationError::NotFound(record.id.clone()))?;
        check_version(stored, &record)?;
        record.version += 1;
        *stored = record.clone();
        Ok(record)
    }

    fn list(&self) -> Result<Vec<NominationRecord>, NominationError> {
        Ok(self.records.values().cloned().collect())
    }
}

/// Exclusive advisory lock on the ledger's `.lock` sidecar, released on drop.
struct LedgerLock {
    file: File,
}

impl LedgerLock {
    fn acquire(path: &Path) -> Result<Self, NominationError> {
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(path)?;
        FileExt::lock_exclusive(&file)?;
        Ok(Self { file })
    }
}

impl Drop for LedgerLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

/// Whole-ledger JSON file.
///
/// Writers hold an exclusive lock on `<ledger>.lock` from load to rename, so
/// handles in other threads or processes never lose each other's records,
/// and a stale `version` surfaces as a conflict. Readers see either the old
/// or the new ledger because writes land through a per-write temp file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn sibling(&self, suffix: &str) -> PathBuf {
        let mut name = OsString::from(self.path.as_os_str());
        name.push(suffix);
        PathBuf::from(name)
    }

    fn lock(&self) -> Result<LedgerLock, NominationError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        LedgerLock::acquire(&self.sibling(".lock"))
    }

    fn audit_path(&self) -> PathBuf {
        self.path
            .parent()
            .map(|p| p.join("audit.jsonl"))
            .unwrap_or_else(|| PathBuf::from("audit.jsonl"))
    }

    fn load(&self) -> Result<Ledger, NominationError> {
        if !self.path.exists() {
            return Ok(Ledger {
                version: 1,
                records: Vec::new(),
            });
        }
        let raw = std::fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    fn save(&self, ledger: &Ledger) -> Result<(), NominationError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let tmp = self.sibling(&format!(".{}.tmp", uuid::Uuid::new_v4().simple()));
        if let Err(e) = std::fs::write(&tmp, serde_json::to_string_pretty(ledger)?)
            .and_then(|_| std::fs::rename(&tmp, &self.path))
        {
            let _ = std::fs::remove_file(&tmp);
            return Err(e.into());
        }
        Ok(())
    }
}

impl NominationStore for JsonFileStore {
    fn insert(&mut self, new: NewNomination) -> Result<NominationRecord, NominationError> {
        let _lock = self.lock()?;
        let mut ledger = self.load()?;
        let record = mint(new);
        ledger.records.push(record.clone());
        self.save(&ledger)?;
        Ok(record)
    }

    fn get(&self, id: &str) -> Result<NominationRecord, NominationError> {
        self.load()?
            .records
            .into_iter()
            .find(|r| r.id == id)
            .ok_or_else(|| NominationError::NotFound(id.to_string()))
    }

    fn update(&mut self, mut record: NominationRecord) -> Result<NominationRecord, NominationError> {
        let _lock = self.lock()?;
        let mut ledger = self.load()?;
        let stored = ledger
            .records
            .iter_mut()
            .find(|r| r.id == record.id)
            .ok_or_else(|| NominationError::NotFound(record.id.clone()))?;
        check_version(stored, &record)?;
        record.version += 1;
        *stored = record.clone();
        self.save(&ledger)?;
        Ok(record)
    }

    fn list(&self) -> Result<Vec<NominationRecord>, NominationError> {
        Ok(self.load()?.records)
    }

    fn audit(&self, action: &str, data: serde_json::Value) {
        let path = self.audit_path();
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        let event = serde_json::json!({
            "ts": Utc::now().to_rfc3339(),
            "action": action,
            "data": data
        });
        let line = format!("{}\n", event);
        let _ = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .and_then(|mut f| std::io::Write::write_all(&mut f, line.as_bytes()));
    }
}

pub fn data_dir() -> anyhow::Result<PathBuf> {
    let home = std::env::var("HOME")?;
    Ok(PathBuf::from(home)
        .join(".local")
        .join("share")
        .join("vawards"))
}

pub fn default_store_path() -> anyhow::Result<PathBuf> {
    Ok(data_dir()?.join("nominations.json"))
}
