//! Process ancestry walking.
//!
//! The walk climbs from a starting PID through its parents looking for a
//! process whose command name matches a pattern. It is best-effort: every
//! failure (process gone, table unavailable, cycle) ends the walk with
//! `None`.

use std::collections::{HashMap, HashSet};
use std::process::Command;

use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System};

/// Upper bound on hops, independent of the visited-set cycle guard.
const MAX_WALK_DEPTH: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessInfo {
    pub pid: u32,
    pub parent_pid: Option<u32>,
    pub name: String,
}

/// Capability for querying the OS process table.
pub trait ProcessTable {
    /// Parent PID and command name for `pid`, or `None` if unavailable.
    fn lookup(&self, pid: u32) -> Option<ProcessInfo>;

    /// Whether a process with `pid` exists right now.
    fn is_alive(&self, pid: u32) -> bool;
}

// ---------------------------------------------------------------------------
// sysinfo-backed table
// ---------------------------------------------------------------------------

/// Direct process-table queries through `sysinfo`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SysinfoProcessTable;

impl ProcessTable for SysinfoProcessTable {
    fn lookup(&self, pid: u32) -> Option<ProcessInfo> {
        let target = Pid::from_u32(pid);
        let mut system = System::new();
        system.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[target]),
            true,
            ProcessRefreshKind::nothing(),
        );
        let process = system.process(target)?;
        Some(ProcessInfo {
            pid,
            parent_pid: process.parent().map(|p| p.as_u32()),
            name: process.name().to_string_lossy().into_owned(),
        })
    }

    fn is_alive(&self, pid: u32) -> bool {
        probe_alive(pid).unwrap_or_else(|| self.lookup(pid).is_some())
    }
}

// ---------------------------------------------------------------------------
// ps-backed table
// ---------------------------------------------------------------------------

/// Fallback that shells out to `ps` for each query.
#[derive(Debug, Default, Clone, Copy)]
pub struct PsProcessTable;

impl ProcessTable for PsProcessTable {
    fn lookup(&self, pid: u32) -> Option<ProcessInfo> {
        let output = Command::new("ps")
            .args(["-o", "ppid=,comm=", "-p", &pid.to_string()])
            .output()
            .ok()?;
        if !output.status.success() {
            return None;
        }
        parse_ps_line(pid, &String::from_utf8_lossy(&output.stdout))
    }

    fn is_alive(&self, pid: u32) -> bool {
        probe_alive(pid).unwrap_or_else(|| self.lookup(pid).is_some())
    }
}

fn parse_ps_line(pid: u32, text: &str) -> Option<ProcessInfo> {
    let line = text.lines().map(str::trim).find(|l| !l.is_empty())?;
    let (ppid, name) = line.split_once(char::is_whitespace)?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    Some(ProcessInfo {
        pid,
        parent_pid: ppid.trim().parse::<u32>().ok(),
        name: name.to_string(),
    })
}

/// Pick the table implementation for this platform.
pub fn default_process_table() -> Box<dyn ProcessTable> {
    if sysinfo::IS_SUPPORTED_SYSTEM {
        Box::new(SysinfoProcessTable)
    } else {
        Box::new(PsProcessTable)
    }
}

/// Signal-0 liveness probe. `None` when the platform has no such probe.
///
/// `EPERM` means the process exists but belongs to someone else.
#[cfg(unix)]
pub fn probe_alive(pid: u32) -> Option<bool> {
    use nix::errno::Errno;
    use nix::sys::signal::kill;
    use nix::unistd::Pid as NixPid;

    let raw = match i32::try_from(pid) {
        Ok(raw) if raw > 0 => raw,
        _ => return Some(false),
    };
    Some(match kill(NixPid::from_raw(raw), None) {
        Ok(()) | Err(Errno::EPERM) => true,
        Err(_) => false,
    })
}

#[cfg(not(unix))]
pub fn probe_alive(_pid: u32) -> Option<bool> {
    None
}

// ---------------------------------------------------------------------------
// In-memory table
// ---------------------------------------------------------------------------

/// Fixed process tree. Every listed PID is alive.
#[derive(Debug, Default, Clone)]
pub struct StaticProcessTable {
    processes: HashMap<u32, ProcessInfo>,
}

impl StaticProcessTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, pid: u32, parent_pid: u32, name: &str) -> Self {
        self.processes.insert(
            pid,
            ProcessInfo {
                pid,
                parent_pid: Some(parent_pid),
                name: name.to_string(),
            },
        );
        self
    }

    pub fn kill(&mut self, pid: u32) {
        self.processes.remove(&pid);
    }
}

impl ProcessTable for StaticProcessTable {
    fn lookup(&self, pid: u32) -> Option<ProcessInfo> {
        self.processes.get(&pid).cloned()
    }

    fn is_alive(&self, pid: u32) -> bool {
        self.processes.contains_key(&pid)
    }
}

// ---------------------------------------------------------------------------
// Walk
// ---------------------------------------------------------------------------

/// A matched agent-host ancestor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentHost {
    pub pid: u32,
    pub name: String,
    /// The pattern that matched `name`.
    pub pattern: String,
}

/// Walk upward from `start` (inclusive) until `matches` accepts a name.
///
/// Stops at PID 1, on a revisited PID, after [`MAX_WALK_DEPTH`] hops, or
/// when a lookup fails.
pub fn find_ancestor<F>(table: &dyn ProcessTable, start: u32, matches: F) -> Option<ProcessInfo>
where
    F: Fn(&str) -> bool,
{
    let mut visited = HashSet::new();
    let mut current = start;
    while current > 1 && visited.len() < MAX_WALK_DEPTH && visited.insert(current) {
        let info = table.lookup(current)?;
        if matches(&info.name) {
            return Some(info);
        }
        current = info.parent_pid?;
    }
    None
}

/// PID of the nearest ancestor whose name contains `needle`, ignoring case.
pub fn find_ancestor_matching(table: &dyn ProcessTable, start: u32, needle: &str) -> Option<u32> {
    let needle = needle.to_lowercase();
    if needle.is_empty() {
        return None;
    }
    find_ancestor(table, start, |name| name.to_lowercase().contains(&needle)).map(|p| p.pid)
}

/// Nearest ancestor matching any of `patterns` (already lowercased).
pub fn find_agent_host(
    table: &dyn ProcessTable,
    start: u32,
    patterns: &[String],
) -> Option<AgentHost> {
    let matching = |name: &str| -> Option<String> {
        let lower = name.to_lowercase();
        patterns
            .iter()
            .find(|p| !p.is_empty() && lower.contains(p.as_str()))
            .cloned()
    };
    let info = find_ancestor(table, start, |name| matching(name).is_some())?;
    let pattern = matching(&info.name)?;
    Some(AgentHost {
        pid: info.pid,
        name: info.name,
        pattern,
    })
}
