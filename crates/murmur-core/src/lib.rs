//! murmur-core: session identity resolution for the shared murmur feed.
//!
//! Every command invocation asks [`identity::IdentityResolver`] who is
//! speaking. The answer is derived from process ancestry, a small persisted
//! session record, terminal signals and a deterministic pseudonym generator.

pub mod ancestry;
pub mod classifier;
pub mod config;
pub mod constants;
pub mod env_signals;
pub mod error;
pub mod feed;
pub mod identity;
pub mod names;
pub mod resolver;
pub mod scope;
pub mod session_record;
pub mod validate;

pub use error::{ConfigError, IdentityError};
pub use identity::{Identity, IdentityReport, IdentityResolver};
