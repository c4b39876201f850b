//! Environment variable names, file names and built-in detection tables.

/// Explicit identity override (`suffix` only; any `@scope` is discarded).
pub const ENV_IDENTITY: &str = "MURMUR_IDENTITY";
/// Explicit agent-type override. Marks the session as an agent.
pub const ENV_AGENT_TYPE: &str = "MURMUR_AGENT_TYPE";
/// Overrides the per-user config directory.
pub const ENV_CONFIG_DIR: &str = "MURMUR_CONFIG_DIR";
/// Log filter in `tracing_subscriber::EnvFilter` syntax.
pub const ENV_LOG: &str = "MURMUR_LOG";

/// Window-system token; seeds built from it are prefixed with [`WINDOW_SEED_PREFIX`].
pub const ENV_WINDOW_ID: &str = "WINDOWID";

/// Terminal-session tokens, first non-empty wins.
pub const TERMINAL_SESSION_VARS: &[&str] =
    &["TERM_SESSION_ID", "ITERM_SESSION_ID", "WT_SESSION", "TMUX_PANE"];

pub const CI_VARS: &[&str] = &[
    "CI",
    "GITHUB_ACTIONS",
    "GITLAB_CI",
    "BUILDKITE",
    "CIRCLECI",
    "JENKINS_URL",
    "TF_BUILD",
];

/// Variables exported by agent hosts into the commands they run.
pub const AGENT_ENV_VARS: &[&str] = &[
    "CLAUDECODE",
    "CLAUDE_CODE_ENTRYPOINT",
    "CODEX_SANDBOX",
    "CODEX_SANDBOX_NETWORK_DISABLED",
    "GEMINI_CLI",
    "CURSOR_AGENT",
    "AIDER_MODEL",
    "OPENCODE",
];

/// Process-name substrings of known agent hosts, matched case-insensitively.
pub const AGENT_HOST_PATTERNS: &[&str] = &[
    "claude",
    "codex",
    "gemini",
    "cursor-agent",
    "aider",
    "opencode",
    "goose",
];

pub const AGENT_SEED_PREFIX: &str = "agent-ppid-";
pub const PARENT_SEED_PREFIX: &str = "ppid-";
pub const WINDOW_SEED_PREFIX: &str = "window-";

/// Reserved suffix for interactive human sessions.
pub const HUMAN_SUFFIX: &str = "human";

pub const CONFIG_FILE: &str = "config.yaml";
pub const SESSION_RECORD_FILE: &str = "session.json";
pub const FEED_DIR: &str = "feed";
