//! Environment signal reader.
//!
//! Classifies the surrounding execution environment from environment
//! variables: explicit overrides, agent-host variables, CI runners and the
//! terminal/window tokens used to correlate invocations.

use std::collections::HashMap;

use crate::config::Config;
use crate::session_record::session_correlator;
use crate::constants::{
    AGENT_ENV_VARS, CI_VARS, ENV_AGENT_TYPE, ENV_IDENTITY, ENV_WINDOW_ID, TERMINAL_SESSION_VARS,
};

/// Read-only view of environment variables. Empty values read as absent.
pub trait EnvSource {
    fn var(&self, name: &str) -> Option<String>;
}

/// The real process environment.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, name: &str) -> Option<String> {
        non_empty(std::env::var(name).ok())
    }
}

/// Fixed environment for tests and embedding.
#[derive(Debug, Default, Clone)]
pub struct MapEnv {
    vars: HashMap<String, String>,
}

impl MapEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, value: &str) -> Self {
        self.vars.insert(name.to_string(), value.to_string());
        self
    }

    pub fn set(&mut self, name: &str, value: &str) {
        self.vars.insert(name.to_string(), value.to_string());
    }
}

impl EnvSource for MapEnv {
    fn var(&self, name: &str) -> Option<String> {
        non_empty(self.vars.get(name).cloned())
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Coarse classification of where the invocation runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionContext {
    /// An agent host was signalled through the environment.
    Agent(String),
    /// A continuous-integration runner.
    Ci(String),
    Unknown,
}

impl ExecutionContext {
    pub fn label(&self) -> String {
        match self {
            Self::Agent(source) => format!("agent ({source})"),
            Self::Ci(var) => format!("ci ({var})"),
            Self::Unknown => "unknown".to_string(),
        }
    }
}

/// Everything the identity pipeline needs from the environment, read once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvSignals {
    pub identity_override: Option<String>,
    pub agent_type_override: Option<String>,
    /// First known agent variable found set.
    pub agent_var: Option<String>,
    /// First CI indicator found set.
    pub ci_var: Option<String>,
    pub terminal_correlator: Option<String>,
    pub window_id: Option<String>,
}

impl EnvSignals {
    pub fn read(env: &dyn EnvSource, config: &Config) -> Self {
        let agent_var = AGENT_ENV_VARS
            .iter()
            .map(|v| v.to_string())
            .chain(config.agent_env.iter().cloned())
            .find(|name| env.var(name).is_some_and(|v| !is_falsey(&v)));

        let ci_var = CI_VARS
            .iter()
            .find(|name| env.var(name).is_some_and(|v| !is_falsey(&v)))
            .map(|v| v.to_string());

        let terminal_correlator = TERMINAL_SESSION_VARS
            .iter()
            .find_map(|name| env.var(name));

        Self {
            identity_override: env.var(ENV_IDENTITY),
            agent_type_override: env.var(ENV_AGENT_TYPE),
            agent_var,
            ci_var,
            terminal_correlator,
            window_id: env.var(ENV_WINDOW_ID),
        }
    }

    /// Terminal-session token; empty when unset.
    pub fn terminal(&self) -> &str {
        self.terminal_correlator.as_deref().unwrap_or("")
    }

    /// Token matched against session records; see [`session_correlator`].
    pub fn correlator(&self) -> Option<String> {
        session_correlator(self.terminal(), self.window_id.as_deref())
    }

    pub fn context(&self) -> ExecutionContext {
        if let Some(kind) = &self.agent_type_override {
            return ExecutionContext::Agent(kind.clone());
        }
        if let Some(var) = &self.agent_var {
            return ExecutionContext::Agent(var.clone());
        }
        if let Some(var) = &self.ci_var {
            return ExecutionContext::Ci(var.clone());
        }
        ExecutionContext::Unknown
    }
}

fn is_falsey(value: &str) -> bool {
    matches!(value.to_ascii_lowercase().as_str(), "0" | "false" | "no")
}
