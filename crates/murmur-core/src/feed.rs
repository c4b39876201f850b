//! Append-only feed, one JSON line per post, one file per scope.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::FEED_DIR;

/// Posts larger than this are rejected.
pub const MAX_BODY_BYTES: usize = 64 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedEntry {
    pub time: DateTime<Utc>,
    pub from: String,
    pub body: String,
}

#[derive(Debug, Clone)]
pub struct FeedStore {
    path: PathBuf,
}

impl FeedStore {
    /// Feed for `scope` under `<config_dir>/feed/`.
    pub fn new(config_dir: &Path, scope: &str) -> Self {
        Self {
            path: config_dir.join(FEED_DIR).join(format!("{scope}.jsonl")),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, entry: &FeedEntry) -> Result<(), String> {
        if entry.body.trim().is_empty() {
            return Err("empty post".to_string());
        }
        if entry.body.len() > MAX_BODY_BYTES {
            return Err("post exceeds 64KB limit".to_string());
        }
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir).map_err(|e| format!("create feed dir: {e}"))?;
        }
        let mut line = serde_json::to_string(entry).map_err(|e| format!("encode post: {e}"))?;
        line.push('\n');

        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| format!("open feed: {e}"))?;
        file.write_all(line.as_bytes())
            .map_err(|e| format!("write feed: {e}"))
    }

    /// Last `limit` entries, oldest first. Lines that fail to parse are skipped.
    pub fn read_recent(&self, limit: usize) -> Result<Vec<FeedEntry>, String> {
        let data = match fs::read_to_string(&self.path) {
            Ok(v) => v,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(format!("read feed: {err}")),
        };
        let entries: Vec<FeedEntry> = data
            .lines()
            .filter(|l| !l.trim().is_empty())
            .filter_map(|l| serde_json::from_str(l).ok())
            .collect();
        let skip = entries.len().saturating_sub(limit);
        Ok(entries.into_iter().skip(skip).collect())
    }
}
