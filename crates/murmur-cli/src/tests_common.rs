//! Shared mock backend for CLI unit tests.

use std::cell::RefCell;

use chrono::{DateTime, TimeZone, Utc};
use murmur_core::env_signals::ExecutionContext;
use murmur_core::feed::FeedEntry;
use murmur_core::identity::{Identity, IdentityOrigin, IdentityReport};
use murmur_core::resolver::{ResolvedSeed, SeedSource};
use murmur_core::validate::override_suffix;
use murmur_core::IdentityError;

use crate::MurmurBackend;

pub struct MockMurmurBackend {
    pub resolvable: bool,
    pub posts: RefCell<Vec<(String, FeedEntry)>>,
}

impl MockMurmurBackend {
    pub fn new() -> Self {
        Self {
            resolvable: true,
            posts: RefCell::new(Vec::new()),
        }
    }

    pub fn without_identity() -> Self {
        Self {
            resolvable: false,
            ..Self::new()
        }
    }
}

impl MurmurBackend for MockMurmurBackend {
    fn identity(&self, explicit: Option<&str>) -> Result<IdentityReport, IdentityError> {
        if let Some(name) = explicit.map(override_suffix).filter(|s| !s.is_empty()) {
            return Ok(IdentityReport {
                identity: Identity {
                    agent_tag: String::new(),
                    suffix: name,
                    scope: "proj".to_string(),
                },
                origin: IdentityOrigin::ExplicitOverride,
                context: ExecutionContext::Unknown,
                classification: None,
                seed: None,
                agent_host: None,
            });
        }
        if !self.resolvable {
            return Err(IdentityError::NoIdentity);
        }
        Ok(IdentityReport {
            identity: Identity {
                agent_tag: String::new(),
                suffix: "ember-world".to_string(),
                scope: "proj".to_string(),
            },
            origin: IdentityOrigin::Pseudonym,
            context: ExecutionContext::Agent("CLAUDECODE".to_string()),
            classification: None,
            seed: Some(ResolvedSeed {
                seed: "agent-ppid-4242".to_string(),
                source: SeedSource::AgentAncestor,
            }),
            agent_host: None,
        })
    }

    fn now_utc(&self) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 9, 30, 0)
            .single()
            .unwrap_or_default()
    }

    fn append_post(&self, scope: &str, entry: &FeedEntry) -> Result<(), String> {
        self.posts
            .borrow_mut()
            .push((scope.to_string(), entry.clone()));
        Ok(())
    }

    fn read_posts(&self, scope: &str, limit: usize) -> Result<Vec<FeedEntry>, String> {
        let posts: Vec<FeedEntry> = self
            .posts
            .borrow()
            .iter()
            .filter(|(s, _)| s == scope)
            .map(|(_, e)| e.clone())
            .collect();
        let skip = posts.len().saturating_sub(limit);
        Ok(posts.into_iter().skip(skip).collect())
    }

    fn current_scope(&self) -> String {
        "proj".to_string()
    }
}
