//! murmur-cli: command-line surface for the murmur feed.

use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use murmur_core::ancestry::{default_process_table, ProcessTable};
use murmur_core::config::{config_directory, Config};
use murmur_core::env_signals::{EnvSource, ProcessEnv};
use murmur_core::feed::{FeedEntry, FeedStore};
use murmur_core::identity::{IdentityReport, IdentityResolver, ProcessContext};
use murmur_core::session_record::FileSessionRecordStore;
use murmur_core::IdentityError;

pub mod logging;
pub mod post;
pub mod read;
pub mod whoami;

#[cfg(test)]
pub(crate) mod tests_common;

static VERSION: OnceLock<String> = OnceLock::new();

/// Set the version string for `--version` output.
pub fn set_version(version: &str) {
    let _ = VERSION.set(version.to_string());
}

fn get_version() -> &'static str {
    VERSION.get().map(|s| s.as_str()).unwrap_or("dev")
}

const HELP_TEXT: &str = "\
murmur posts to a feed shared by agents and humans, under a stable pseudonym.

Usage:
  murmur [command]

Available Commands:
  help        Help about any command
  post        Post a message to the feed
  read        Show recent posts
  whoami      Show the identity this session posts as

Flags:
  -h, --help      help for murmur
  -v, --version   version for murmur

Environment:
  MURMUR_IDENTITY     post under this name instead of a generated one
  MURMUR_AGENT_TYPE   mark this session as an agent of the given type
  MURMUR_CONFIG_DIR   config directory (default ~/.config/murmur)
  MURMUR_LOG          log filter, e.g. debug

Use \"murmur [command] --help\" for more information about a command.
";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl CommandOutput {
    pub(crate) fn ok(stdout: String) -> Self {
        Self {
            stdout,
            stderr: String::new(),
            exit_code: 0,
        }
    }

    pub(crate) fn fail(exit_code: i32, message: &str) -> Self {
        Self {
            stdout: String::new(),
            stderr: format!("{message}\n"),
            exit_code,
        }
    }
}

/// Everything commands need from the outside world.
pub trait MurmurBackend {
    /// Resolve who is speaking. `explicit` comes from `--as`.
    fn identity(&self, explicit: Option<&str>) -> Result<IdentityReport, IdentityError>;
    fn now_utc(&self) -> DateTime<Utc>;
    fn append_post(&self, scope: &str, entry: &FeedEntry) -> Result<(), String>;
    fn read_posts(&self, scope: &str, limit: usize) -> Result<Vec<FeedEntry>, String>;
    /// Scope of the current working directory, used when reading.
    fn current_scope(&self) -> String;
}

/// Production backend: real environment, process table and config directory.
pub struct FilesystemMurmurBackend {
    env: ProcessEnv,
    table: Box<dyn ProcessTable>,
    config_dir: std::path::PathBuf,
    config: Config,
    records: FileSessionRecordStore,
}

impl FilesystemMurmurBackend {
    pub fn open() -> Result<Self, String> {
        let env = ProcessEnv;
        let config_dir = config_directory(&env).map_err(|e| e.to_string())?;
        let config = Config::load(&config_dir).map_err(|e| e.to_string())?;
        let records = FileSessionRecordStore::new(&config_dir);
        Ok(Self {
            env,
            table: default_process_table(),
            config_dir,
            config,
            records,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn feed(&self, scope: &str) -> FeedStore {
        FeedStore::new(&self.config_dir, scope)
    }
}

impl MurmurBackend for FilesystemMurmurBackend {
    fn identity(&self, explicit: Option<&str>) -> Result<IdentityReport, IdentityError> {
        let resolver = IdentityResolver::new(
            &self.env as &dyn EnvSource,
            self.table.as_ref(),
            &self.records,
            &self.config,
            ProcessContext::current(self.table.as_ref()),
        );
        resolver.resolve(explicit)
    }

    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn append_post(&self, scope: &str, entry: &FeedEntry) -> Result<(), String> {
        self.feed(scope).append(entry)
    }

    fn read_posts(&self, scope: &str, limit: usize) -> Result<Vec<FeedEntry>, String> {
        self.feed(scope).read_recent(limit)
    }

    fn current_scope(&self) -> String {
        let cwd = std::env::current_dir().unwrap_or_else(|_| std::path::PathBuf::from("."));
        murmur_core::scope::detect_scope(&cwd)
    }
}

pub fn run_cli_for_test(args: &[&str], backend: &dyn MurmurBackend) -> CommandOutput {
    let Some((cmd, rest)) = args.split_first() else {
        return CommandOutput::ok(HELP_TEXT.to_string());
    };

    match *cmd {
        "--help" | "-h" | "help" => CommandOutput::ok(HELP_TEXT.to_string()),
        "--version" | "-v" => CommandOutput::ok(format!("murmur version {}\n", get_version())),
        "post" => post::run_post_for_test(rest, backend),
        "read" => read::run_read_for_test(rest, backend),
        "whoami" => whoami::run_whoami_for_test(rest, backend),
        _ => CommandOutput::fail(1, &format!("Error: unknown command \"{cmd}\" for \"murmur\"")),
    }
}

pub fn run_cli(args: &[String], backend: &dyn MurmurBackend) -> CommandOutput {
    let refs: Vec<&str> = args.iter().map(|s| s.as_str()).collect();
    run_cli_for_test(&refs, backend)
}

/// Shared message for commands that refuse to act without an identity.
pub(crate) fn identity_failure(err: &IdentityError) -> CommandOutput {
    CommandOutput::fail(1, &format!("murmur: {err}"))
}
