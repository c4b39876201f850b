//! Identity assembly: the single entry point commands call to learn who is
//! speaking.
//!
//! explicit override -> `MURMUR_IDENTITY` -> human/agent classification ->
//! seed resolution -> pseudonym.

use std::fmt;
use std::io::IsTerminal;
use std::path::PathBuf;

use crate::ancestry::{find_agent_host, AgentHost, ProcessTable};
use crate::classifier::{classify_session, Classification, ClassifierInputs};
use crate::config::{Config, NamingStyle};
use crate::constants::HUMAN_SUFFIX;
use crate::env_signals::{EnvSignals, EnvSource, ExecutionContext};
use crate::error::IdentityError;
use crate::names::pseudonym;
use crate::resolver::{resolve_seed, ResolvedSeed, SeedInputs};
use crate::scope::detect_scope;
use crate::session_record::SessionRecordStore;
use crate::validate::{override_suffix, sanitize_name};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Empty for the plain naming style.
    pub agent_tag: String,
    /// Override-derived suffixes are lowercase `[a-z0-9_-]`. Generated
    /// suffixes keep their style's casing (`nebulaEmber`, `Stoic-Smithers`).
    pub suffix: String,
    /// Always auto-detected, never caller-supplied.
    pub scope: String,
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.agent_tag.is_empty() {
            write!(f, "{}@{}", self.suffix, self.scope)
        } else {
            write!(f, "{}-{}@{}", self.agent_tag, self.suffix, self.scope)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityOrigin {
    ExplicitOverride,
    EnvironmentOverride,
    Human,
    Pseudonym,
}

impl fmt::Display for IdentityOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::ExplicitOverride => "explicit-override",
            Self::EnvironmentOverride => "environment-override",
            Self::Human => "human",
            Self::Pseudonym => "pseudonym",
        })
    }
}

/// The identity plus the findings that produced it, for diagnostics and
/// structured logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityReport {
    pub identity: Identity,
    pub origin: IdentityOrigin,
    pub context: ExecutionContext,
    /// `None` on the override paths, which skip classification.
    pub classification: Option<Classification>,
    pub seed: Option<ResolvedSeed>,
    pub agent_host: Option<AgentHost>,
}

impl IdentityReport {
    /// Flat string fields handed to log/telemetry sinks.
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("identity", self.identity.to_string()),
            ("agent_tag", self.identity.agent_tag.clone()),
            ("suffix", self.identity.suffix.clone()),
            ("scope", self.identity.scope.clone()),
            ("origin", self.origin.to_string()),
            ("context", self.context.label()),
        ];
        if let Some(c) = &self.classification {
            fields.push(("human", c.human.to_string()));
            fields.push(("classification", c.reason.to_string()));
        }
        if let Some(seed) = &self.seed {
            fields.push(("seed", seed.seed.clone()));
            fields.push(("seed_source", seed.source.to_string()));
        }
        if let Some(host) = &self.agent_host {
            fields.push(("agent_host", format!("{} ({})", host.name, host.pid)));
        }
        fields
    }
}

/// Facts about the running process that the pipeline consumes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessContext {
    pub pid: u32,
    pub parent_pid: Option<u32>,
    pub stdin_is_terminal: bool,
    /// Directory scope detection starts from.
    pub cwd: PathBuf,
}

impl ProcessContext {
    pub fn current(table: &dyn ProcessTable) -> Self {
        let pid = std::process::id();
        Self {
            pid,
            parent_pid: current_parent_pid(table, pid),
            stdin_is_terminal: std::io::stdin().is_terminal(),
            cwd: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        }
    }
}

#[cfg(unix)]
fn current_parent_pid(_table: &dyn ProcessTable, _pid: u32) -> Option<u32> {
    Some(std::os::unix::process::parent_id())
}

#[cfg(not(unix))]
fn current_parent_pid(table: &dyn ProcessTable, pid: u32) -> Option<u32> {
    table.lookup(pid).and_then(|p| p.parent_pid)
}

pub struct IdentityResolver<'a> {
    env: &'a dyn EnvSource,
    table: &'a dyn ProcessTable,
    records: &'a dyn SessionRecordStore,
    config: &'a Config,
    process: ProcessContext,
}

impl<'a> IdentityResolver<'a> {
    pub fn new(
        env: &'a dyn EnvSource,
        table: &'a dyn ProcessTable,
        records: &'a dyn SessionRecordStore,
        config: &'a Config,
        process: ProcessContext,
    ) -> Self {
        Self {
            env,
            table,
            records,
            config,
            process,
        }
    }

    /// Resolve the identity for this invocation.
    pub fn get_identity(&self, explicit: Option<&str>) -> Result<Identity, IdentityError> {
        self.resolve(explicit).map(|report| report.identity)
    }

    /// Like [`Self::get_identity`], keeping the intermediate findings.
    pub fn resolve(&self, explicit: Option<&str>) -> Result<IdentityReport, IdentityError> {
        let signals = EnvSignals::read(self.env, self.config);
        let context = signals.context();

        if let Some((name, origin)) = override_name(explicit, &signals) {
            let suffix = override_suffix(&name);
            if suffix.is_empty() {
                tracing::warn!(%origin, "identity override is empty after sanitizing; ignoring it");
            } else {
                let report = IdentityReport {
                    identity: Identity {
                        agent_tag: String::new(),
                        suffix,
                        scope: detect_scope(&self.process.cwd),
                    },
                    origin,
                    context,
                    classification: None,
                    seed: None,
                    agent_host: None,
                };
                log_report(&report);
                return Ok(report);
            }
        }

        let scope = detect_scope(&self.process.cwd);
        let agent_host = find_agent_host(
            self.table,
            self.process.pid,
            &self.config.host_patterns(),
        );
        let classification = classify_session(&ClassifierInputs {
            signals: &signals,
            agent_host: agent_host.as_ref(),
            records: self.records,
            table: self.table,
            stdin_is_terminal: self.process.stdin_is_terminal,
        });

        if classification.human {
            let report = IdentityReport {
                identity: Identity {
                    agent_tag: String::new(),
                    suffix: HUMAN_SUFFIX.to_string(),
                    scope,
                },
                origin: IdentityOrigin::Human,
                context,
                classification: Some(classification),
                seed: None,
                agent_host,
            };
            log_report(&report);
            return Ok(report);
        }

        let seed = resolve_seed(&SeedInputs {
            agent_host: agent_host.as_ref(),
            records: self.records,
            table: self.table,
            terminal: signals.terminal(),
            window_id: signals.window_id.as_deref(),
            parent_pid: self.process.parent_pid,
        })
        .ok_or(IdentityError::NoIdentity)?;

        let agent_tag = match self.config.naming.style {
            NamingStyle::Plain => String::new(),
            NamingStyle::Tagged => agent_tag(&signals, agent_host.as_ref()),
        };

        let report = IdentityReport {
            identity: Identity {
                agent_tag,
                suffix: pseudonym(&seed.seed),
                scope,
            },
            origin: IdentityOrigin::Pseudonym,
            context,
            classification: Some(classification),
            seed: Some(seed),
            agent_host,
        };
        log_report(&report);
        Ok(report)
    }
}

/// Explicit argument first, then the environment override.
fn override_name(explicit: Option<&str>, signals: &EnvSignals) -> Option<(String, IdentityOrigin)> {
    if let Some(name) = explicit.map(str::trim).filter(|s| !s.is_empty()) {
        return Some((name.to_string(), IdentityOrigin::ExplicitOverride));
    }
    signals
        .identity_override
        .clone()
        .map(|name| (name, IdentityOrigin::EnvironmentOverride))
}

/// Tag for the tagged naming style: agent-type override, else the matched
/// host pattern, else the family of the agent variable.
fn agent_tag(signals: &EnvSignals, host: Option<&AgentHost>) -> String {
    let raw = signals
        .agent_type_override
        .clone()
        .or_else(|| host.map(|h| h.pattern.clone()))
        .or_else(|| signals.agent_var.as_deref().map(agent_var_family))
        .unwrap_or_else(|| "agent".to_string());
    let tag = sanitize_name(&raw);
    if tag.is_empty() {
        "agent".to_string()
    } else {
        tag
    }
}

fn agent_var_family(var: &str) -> String {
    let upper = var.to_ascii_uppercase();
    let family = ["CLAUDE", "CODEX", "GEMINI", "CURSOR", "AIDER", "OPENCODE"]
        .iter()
        .find(|prefix| upper.starts_with(*prefix));
    match family {
        Some(prefix) => prefix.to_ascii_lowercase(),
        None => var.to_ascii_lowercase(),
    }
}

fn log_report(report: &IdentityReport) {
    tracing::debug!(
        identity = %report.identity,
        origin = %report.origin,
        context = %report.context.label(),
        seed = report.seed.as_ref().map(|s| s.seed.as_str()).unwrap_or(""),
        seed_source = %report
            .seed
            .as_ref()
            .map(|s| s.source.to_string())
            .unwrap_or_default(),
        classification = %report
            .classification
            .as_ref()
            .map(|c| c.reason.to_string())
            .unwrap_or_default(),
        "identity resolved"
    );
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use super::*;
    use crate::ancestry::StaticProcessTable;
    use crate::constants::{ENV_AGENT_TYPE, ENV_IDENTITY};
    use crate::env_signals::MapEnv;
    use crate::names::pseudonym;
    use crate::resolver::SeedSource;
    use crate::session_record::MemorySessionRecordStore;

    fn scoped_dir() -> (tempfile::TempDir, PathBuf) {
        let tmp = tempfile::tempdir().expect("tempdir");
        let repo = tmp.path().join("feedproj");
        std::fs::create_dir_all(repo.join(".git")).expect("mkdir");
        (tmp, repo)
    }

    fn process(cwd: PathBuf, tty: bool) -> ProcessContext {
        ProcessContext {
            pid: 100,
            parent_pid: Some(9001),
            stdin_is_terminal: tty,
            cwd,
        }
    }

    #[test]
    fn display_formats() {
        let mut id = Identity {
            agent_tag: String::new(),
            suffix: "ember-world".to_string(),
            scope: "proj".to_string(),
        };
        assert_eq!(id.to_string(), "ember-world@proj");
        id.agent_tag = "claude".to_string();
        assert_eq!(id.to_string(), "claude-ember-world@proj");
    }

    #[test]
    fn explicit_override_strips_caller_scope() {
        let (_tmp, repo) = scoped_dir();
        let env = MapEnv::new();
        let table = StaticProcessTable::new();
        let records = MemorySessionRecordStore::default();
        let config = Config::default();
        let resolver = IdentityResolver::new(&env, &table, &records, &config, process(repo, false));

        let id = resolver
            .get_identity(Some("Ember World@ignored"))
            .expect("identity");
        assert_eq!(id.suffix, "ember-world");
        assert_eq!(id.scope, "feedproj");
        assert_eq!(id.agent_tag, "");
        assert_eq!(id.to_string(), "ember-world@feedproj");
    }

    #[test]
    fn explicit_override_beats_env_and_agent_type() {
        let (_tmp, repo) = scoped_dir();
        let env = MapEnv::new()
            .with(ENV_IDENTITY, "from-env")
            .with(ENV_AGENT_TYPE, "codex");
        let table = StaticProcessTable::new();
        let records = MemorySessionRecordStore::default();
        let config = Config {
            naming: crate::config::NamingConfig {
                style: NamingStyle::Tagged,
            },
            ..Config::default()
        };
        let resolver = IdentityResolver::new(&env, &table, &records, &config, process(repo, false));

        let report = resolver.resolve(Some("chosen")).expect("identity");
        assert_eq!(report.identity.suffix, "chosen");
        assert_eq!(report.identity.agent_tag, "");
        assert_eq!(report.origin, IdentityOrigin::ExplicitOverride);
        assert!(report.classification.is_none());

        let report = resolver.resolve(None).expect("identity");
        assert_eq!(report.identity.suffix, "from-env");
        assert_eq!(report.origin, IdentityOrigin::EnvironmentOverride);
    }

    #[test]
    fn override_that_sanitizes_to_nothing_is_ignored() {
        let (_tmp, repo) = scoped_dir();
        let env = MapEnv::new();
        let table = StaticProcessTable::new();
        let records = MemorySessionRecordStore::default();
        let config = Config::default();
        let resolver = IdentityResolver::new(&env, &table, &records, &config, process(repo, false));

        let report = resolver.resolve(Some("@elsewhere")).expect("identity");
        assert_eq!(report.origin, IdentityOrigin::Pseudonym);
        assert_eq!(report.identity.suffix, pseudonym("ppid-9001"));
    }

    #[test]
    fn interactive_human_gets_placeholder() {
        let (_tmp, repo) = scoped_dir();
        let env = MapEnv::new();
        let table = StaticProcessTable::new().with(100, 9001, "murmur");
        let records = MemorySessionRecordStore::default();
        let config = Config::default();
        let resolver = IdentityResolver::new(&env, &table, &records, &config, process(repo, true));

        let report = resolver.resolve(None).expect("identity");
        assert_eq!(report.origin, IdentityOrigin::Human);
        assert_eq!(report.identity.to_string(), "human@feedproj");
        assert!(records.current().is_none());
    }

    #[test]
    fn agent_env_with_tty_is_not_human() {
        let (_tmp, repo) = scoped_dir();
        let env = MapEnv::new().with("CLAUDECODE", "1");
        let table = StaticProcessTable::new();
        let records = MemorySessionRecordStore::default();
        let config = Config::default();
        let resolver = IdentityResolver::new(&env, &table, &records, &config, process(repo, true));

        let report = resolver.resolve(None).expect("identity");
        assert_eq!(report.origin, IdentityOrigin::Pseudonym);
        assert_ne!(report.identity.suffix, HUMAN_SUFFIX);
    }

    #[test]
    fn parent_pid_fallback_never_fails() {
        let (_tmp, repo) = scoped_dir();
        let env = MapEnv::new();
        let table = StaticProcessTable::new().with(100, 9001, "murmur").with(9001, 1, "sh");
        let records = MemorySessionRecordStore::default();
        let config = Config::default();
        let resolver = IdentityResolver::new(&env, &table, &records, &config, process(repo, false));

        let report = resolver.resolve(None).expect("identity");
        let seed = report.seed.expect("seed");
        assert_eq!(seed.seed, "ppid-9001");
        assert_eq!(seed.source, SeedSource::ParentProcess);
        assert_eq!(report.identity.suffix, pseudonym("ppid-9001"));
    }

    #[test]
    fn no_seed_is_no_identity() {
        let (_tmp, repo) = scoped_dir();
        let env = MapEnv::new();
        let table = StaticProcessTable::new();
        let records = MemorySessionRecordStore::default();
        let config = Config::default();
        let mut ctx = process(repo, false);
        ctx.parent_pid = None;
        let resolver = IdentityResolver::new(&env, &table, &records, &config, ctx);

        assert_eq!(resolver.get_identity(None), Err(IdentityError::NoIdentity));
    }

    #[test]
    fn tagged_style_uses_host_pattern() {
        let (_tmp, repo) = scoped_dir();
        let env = MapEnv::new();
        let table = StaticProcessTable::new()
            .with(100, 90, "murmur")
            .with(90, 70, "bash")
            .with(70, 1, "claude");
        let records = MemorySessionRecordStore::default();
        let config = Config {
            naming: crate::config::NamingConfig {
                style: NamingStyle::Tagged,
            },
            ..Config::default()
        };
        let resolver = IdentityResolver::new(&env, &table, &records, &config, process(repo, false));

        let id = resolver.get_identity(None).expect("identity");
        assert_eq!(id.agent_tag, "claude");
        assert_eq!(id.suffix, pseudonym("agent-ppid-70"));
    }

    #[test]
    fn generated_suffix_keeps_style_casing() {
        let (_tmp, repo) = scoped_dir();
        let env = MapEnv::new().with("WINDOWID", "111");
        let table = StaticProcessTable::new()
            .with(100, 90, "murmur")
            .with(90, 5555, "bash")
            .with(5555, 1, "claude");
        let records = MemorySessionRecordStore::default();
        let config = Config::default();
        let resolver = IdentityResolver::new(&env, &table, &records, &config, process(repo, false));

        assert_eq!(resolver.get_identity(None).expect("identity").suffix, "nebulaEmber");
        assert_eq!(
            resolver.get_identity(Some("Nebula Ember")).expect("identity").suffix,
            "nebula-ember"
        );
    }

    #[test]
    fn agent_var_family_names() {
        assert_eq!(agent_var_family("CLAUDE_CODE_ENTRYPOINT"), "claude");
        assert_eq!(agent_var_family("CODEX_SANDBOX"), "codex");
        assert_eq!(agent_var_family("MY_BOT"), "my_bot");
    }

    #[test]
    fn report_fields_are_plain_strings() {
        let (_tmp, repo) = scoped_dir();
        let env = MapEnv::new();
        let table = StaticProcessTable::new();
        let records = MemorySessionRecordStore::default();
        let config = Config::default();
        let resolver = IdentityResolver::new(&env, &table, &records, &config, process(repo, false));

        let report = resolver.resolve(None).expect("identity");
        let fields = report.fields();
        let get = |k: &str| {
            fields
                .iter()
                .find(|(name, _)| *name == k)
                .map(|(_, v)| v.clone())
        };
        assert_eq!(get("seed").as_deref(), Some("ppid-9001"));
        assert_eq!(get("seed_source").as_deref(), Some("parent-process"));
        assert_eq!(get("human").as_deref(), Some("false"));
        assert_eq!(get("scope").as_deref(), Some("feedproj"));
    }
}
