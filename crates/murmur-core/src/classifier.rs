//! Human/agent session classification.
//!
//! Agent evidence from the environment or ancestry dominates; a live session
//! record for this terminal comes next; only then does an interactive stdin
//! count as a human.

use std::fmt;

use crate::ancestry::{AgentHost, ProcessTable};
use crate::env_signals::EnvSignals;
use crate::session_record::{read_valid_record, SessionRecordStore};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassificationReason {
    AgentTypeOverride(String),
    AgentEnvironment(String),
    ContinuousIntegration(String),
    AgentAncestor { pid: u32, name: String },
    LiveSessionRecord { owner_pid: u32 },
    InteractiveTerminal,
    NoTerminal,
}

impl fmt::Display for ClassificationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AgentTypeOverride(kind) => write!(f, "agent type override ({kind})"),
            Self::AgentEnvironment(var) => write!(f, "agent environment variable {var}"),
            Self::ContinuousIntegration(var) => write!(f, "ci runner ({var})"),
            Self::AgentAncestor { pid, name } => write!(f, "agent-host ancestor {name} ({pid})"),
            Self::LiveSessionRecord { owner_pid } => {
                write!(f, "live session record (owner {owner_pid})")
            }
            Self::InteractiveTerminal => f.write_str("interactive terminal"),
            Self::NoTerminal => f.write_str("stdin is not a terminal"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub human: bool,
    pub reason: ClassificationReason,
}

impl Classification {
    fn agent(reason: ClassificationReason) -> Self {
        Self {
            human: false,
            reason,
        }
    }
}

pub struct ClassifierInputs<'a> {
    pub signals: &'a EnvSignals,
    pub agent_host: Option<&'a AgentHost>,
    pub records: &'a dyn SessionRecordStore,
    pub table: &'a dyn ProcessTable,
    pub stdin_is_terminal: bool,
}

pub fn classify_session(inputs: &ClassifierInputs<'_>) -> Classification {
    let signals = inputs.signals;
    if let Some(kind) = &signals.agent_type_override {
        return Classification::agent(ClassificationReason::AgentTypeOverride(kind.clone()));
    }
    if let Some(var) = &signals.agent_var {
        return Classification::agent(ClassificationReason::AgentEnvironment(var.clone()));
    }
    if let Some(var) = &signals.ci_var {
        return Classification::agent(ClassificationReason::ContinuousIntegration(var.clone()));
    }
    if let Some(host) = inputs.agent_host {
        return Classification::agent(ClassificationReason::AgentAncestor {
            pid: host.pid,
            name: host.name.clone(),
        });
    }

    let record = signals
        .correlator()
        .and_then(|terminal| read_valid_record(inputs.records, &terminal, inputs.table));
    if let Some(record) = record {
        return Classification::agent(ClassificationReason::LiveSessionRecord {
            owner_pid: record.owner_pid,
        });
    }

    if inputs.stdin_is_terminal {
        Classification {
            human: true,
            reason: ClassificationReason::InteractiveTerminal,
        }
    } else {
        Classification::agent(ClassificationReason::NoTerminal)
    }
}

pub fn is_human_session(inputs: &ClassifierInputs<'_>) -> bool {
    classify_session(inputs).human
}
