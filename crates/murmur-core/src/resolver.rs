//! Session seed resolution.
//!
//! Ranked sources, first hit wins:
//! agent-host ancestor -> valid session record -> terminal-session token ->
//! window id -> parent PID.

use std::fmt;

use chrono::Utc;

use crate::ancestry::{AgentHost, ProcessTable};
use crate::constants::{AGENT_SEED_PREFIX, PARENT_SEED_PREFIX, WINDOW_SEED_PREFIX};
use crate::session_record::{
    read_valid_record, session_correlator, SessionRecord, SessionRecordStore,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedSource {
    AgentAncestor,
    SessionRecord,
    TerminalSession,
    WindowId,
    ParentProcess,
}

impl fmt::Display for SeedSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::AgentAncestor => "agent-ancestor",
            Self::SessionRecord => "session-record",
            Self::TerminalSession => "terminal-session",
            Self::WindowId => "window-id",
            Self::ParentProcess => "parent-process",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSeed {
    pub seed: String,
    pub source: SeedSource,
}

/// Inputs gathered by the caller. The ancestry walk is done once upstream
/// and shared with the classifier.
pub struct SeedInputs<'a> {
    pub agent_host: Option<&'a AgentHost>,
    pub records: &'a dyn SessionRecordStore,
    pub table: &'a dyn ProcessTable,
    pub terminal: &'a str,
    pub window_id: Option<&'a str>,
    pub parent_pid: Option<u32>,
}

pub fn agent_seed(pid: u32) -> String {
    format!("{AGENT_SEED_PREFIX}{pid}")
}

pub fn resolve_seed(inputs: &SeedInputs<'_>) -> Option<ResolvedSeed> {
    let correlator = session_correlator(inputs.terminal, inputs.window_id);

    if let Some(host) = inputs.agent_host {
        let seed = agent_seed(host.pid);
        match &correlator {
            Some(terminal) => {
                let record = SessionRecord {
                    owner_pid: host.pid,
                    terminal: terminal.clone(),
                    seed: seed.clone(),
                    written_at: Some(Utc::now()),
                };
                if let Err(err) = inputs.records.write(&record) {
                    tracing::warn!(error = %err, "could not persist session record");
                }
            }
            None => tracing::debug!("no terminal correlator; session record not written"),
        }
        tracing::debug!(pid = host.pid, host = %host.name, "seed from agent-host ancestor");
        return Some(ResolvedSeed {
            seed,
            source: SeedSource::AgentAncestor,
        });
    }

    let record = correlator
        .as_deref()
        .and_then(|terminal| read_valid_record(inputs.records, terminal, inputs.table));
    if let Some(record) = record {
        tracing::debug!(owner_pid = record.owner_pid, "seed from session record");
        return Some(ResolvedSeed {
            seed: record.seed,
            source: SeedSource::SessionRecord,
        });
    }

    if !inputs.terminal.is_empty() {
        tracing::debug!("seed from terminal-session token");
        return Some(ResolvedSeed {
            seed: inputs.terminal.to_string(),
            source: SeedSource::TerminalSession,
        });
    }

    if let Some(window) = inputs.window_id.filter(|w| !w.is_empty()) {
        tracing::debug!("seed from window id");
        return Some(ResolvedSeed {
            seed: format!("{WINDOW_SEED_PREFIX}{window}"),
            source: SeedSource::WindowId,
        });
    }

    if let Some(ppid) = inputs.parent_pid.filter(|p| *p > 0) {
        tracing::debug!(ppid, "seed from parent process");
        return Some(ResolvedSeed {
            seed: format!("{PARENT_SEED_PREFIX}{ppid}"),
            source: SeedSource::ParentProcess,
        });
    }

    tracing::debug!("no seed source available");
    None
}
