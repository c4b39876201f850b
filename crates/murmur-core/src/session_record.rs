//! Persisted session record.
//!
//! One record per config directory remembers the last seed resolved through
//! an agent-host ancestor, so sibling invocations whose own ancestry walk
//! fails can recover it. The file is a cache: reads and writes never fail
//! outward and every reader re-validates before trusting it.

use std::cell::RefCell;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ancestry::ProcessTable;
use crate::constants::{SESSION_RECORD_FILE, WINDOW_SEED_PREFIX};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionRecord {
    pub owner_pid: u32,
    /// Terminal-session token at write time; empty when none was set.
    pub terminal: String,
    pub seed: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub written_at: Option<DateTime<Utc>>,
}

/// On-disk shape. Every field is optional so older or newer files decode;
/// a record missing its owner or seed reads as absent.
#[derive(Debug, Deserialize)]
struct RawSessionRecord {
    #[serde(default)]
    owner_pid: Option<u32>,
    #[serde(default)]
    terminal: Option<String>,
    #[serde(default)]
    seed: Option<String>,
    #[serde(default)]
    written_at: Option<DateTime<Utc>>,
}

impl RawSessionRecord {
    fn into_record(self) -> Option<SessionRecord> {
        let seed = self.seed.filter(|s| !s.trim().is_empty())?;
        Some(SessionRecord {
            owner_pid: self.owner_pid?,
            terminal: self.terminal.unwrap_or_default(),
            seed,
            written_at: self.written_at,
        })
    }
}

/// Decode a record file body. Unparsable or incomplete data is `None`.
pub fn decode_record(data: &str) -> Option<SessionRecord> {
    serde_json::from_str::<RawSessionRecord>(data)
        .ok()?
        .into_record()
}

pub trait SessionRecordStore {
    /// The stored record, or `None` if absent or unreadable.
    fn read(&self) -> Option<SessionRecord>;

    /// Replace the stored record.
    fn write(&self, record: &SessionRecord) -> Result<(), String>;
}

/// Token tying a record to one terminal: the terminal-session token, else
/// `window-<id>`. `None` when neither is set; such a session never writes or
/// trusts a record, since it cannot tell its terminal from any other.
pub fn session_correlator(terminal: &str, window_id: Option<&str>) -> Option<String> {
    if !terminal.is_empty() {
        return Some(terminal.to_string());
    }
    window_id
        .filter(|w| !w.is_empty())
        .map(|w| format!("{WINDOW_SEED_PREFIX}{w}"))
}

/// A read record is usable only for the same terminal and a live owner.
/// An empty correlator matches nothing.
pub fn validate_record<'a>(
    record: &'a SessionRecord,
    terminal: &str,
    table: &dyn ProcessTable,
) -> Option<&'a SessionRecord> {
    if terminal.is_empty() || record.terminal.is_empty() {
        tracing::debug!("no terminal correlator; session record ignored");
        return None;
    }
    if record.terminal != terminal {
        tracing::debug!(
            recorded = %record.terminal,
            current = %terminal,
            "session record belongs to another terminal"
        );
        return None;
    }
    if !table.is_alive(record.owner_pid) {
        tracing::debug!(owner_pid = record.owner_pid, "session record owner is gone");
        return None;
    }
    Some(record)
}

/// Read the store and return the record only if it passes [`validate_record`].
pub fn read_valid_record(
    store: &dyn SessionRecordStore,
    terminal: &str,
    table: &dyn ProcessTable,
) -> Option<SessionRecord> {
    let record = store.read()?;
    validate_record(&record, terminal, table).cloned()
}

// ---------------------------------------------------------------------------
// File store
// ---------------------------------------------------------------------------

/// Record stored at `<config_dir>/session.json`.
#[derive(Debug, Clone)]
pub struct FileSessionRecordStore {
    path: PathBuf,
}

impl FileSessionRecordStore {
    pub fn new(config_dir: &Path) -> Self {
        Self {
            path: config_dir.join(SESSION_RECORD_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionRecordStore for FileSessionRecordStore {
    fn read(&self) -> Option<SessionRecord> {
        let data = fs::read_to_string(&self.path).ok()?;
        decode_record(&data)
    }

    fn write(&self, record: &SessionRecord) -> Result<(), String> {
        let dir = self
            .path
            .parent()
            .ok_or_else(|| format!("no parent for {}", self.path.display()))?;
        fs::create_dir_all(dir).map_err(|e| format!("create config dir: {e}"))?;

        let data =
            serde_json::to_string_pretty(record).map_err(|e| format!("encode record: {e}"))?;
        let tmp = dir.join(format!(".{SESSION_RECORD_FILE}.{}", std::process::id()));
        write_private(&tmp, data.as_bytes())?;
        fs::rename(&tmp, &self.path).map_err(|e| {
            let _ = fs::remove_file(&tmp);
            format!("replace session record: {e}")
        })
    }
}

fn write_private(path: &Path, data: &[u8]) -> Result<(), String> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options
        .open(path)
        .map_err(|e| format!("create session record: {e}"))?;
    file.write_all(data)
        .map_err(|e| format!("write session record: {e}"))?;
    file.flush()
        .map_err(|e| format!("flush session record: {e}"))
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct MemorySessionRecordStore {
    pub record: RefCell<Option<SessionRecord>>,
    pub write_error: Option<String>,
}

impl MemorySessionRecordStore {
    pub fn with_record(record: SessionRecord) -> Self {
        Self {
            record: RefCell::new(Some(record)),
            write_error: None,
        }
    }

    pub fn current(&self) -> Option<SessionRecord> {
        self.record.borrow().clone()
    }
}

impl SessionRecordStore for MemorySessionRecordStore {
    fn read(&self) -> Option<SessionRecord> {
        self.record.borrow().clone()
    }

    fn write(&self, record: &SessionRecord) -> Result<(), String> {
        if let Some(ref err) = self.write_error {
            return Err(err.clone());
        }
        *self.record.borrow_mut() = Some(record.clone());
        Ok(())
    }
}
