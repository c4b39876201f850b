//! Tracing subscriber setup. Diagnostics go to stderr so stdout stays
//! clean for command output.

use tracing_subscriber::EnvFilter;

use murmur_core::constants::ENV_LOG;

const DEFAULT_FILTER: &str = "warn";

/// Filter directive: `MURMUR_LOG`, then the config `log` key, then `warn`.
pub fn filter_directive(env_value: Option<&str>, config_log: Option<&str>) -> String {
    env_value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .or_else(|| config_log.map(str::trim).filter(|v| !v.is_empty()))
        .unwrap_or(DEFAULT_FILTER)
        .to_string()
}

pub fn init_logging(config_log: Option<&str>) {
    let env_value = std::env::var(ENV_LOG).ok();
    let directive = filter_directive(env_value.as_deref(), config_log);
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    // A second init (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
