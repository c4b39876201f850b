//! Caller-visible errors.
//!
//! Most of the identity pipeline treats failure as "absent, try the next
//! source" and returns `Option`. Only the top-level identity call and the
//! config loader can fail outward.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdentityError {
    /// No override was supplied and no ranked seed source produced a value.
    #[error("could not determine identity; pass --as <name> or set MURMUR_IDENTITY")]
    NoIdentity,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("no config directory: set MURMUR_CONFIG_DIR or HOME")]
    NoConfigDir,
}
