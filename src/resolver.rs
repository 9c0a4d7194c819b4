//! Membership resolution: who may auto-merge right now.
//!
//! The effective allow-set is the additional whitelist plus the live
//! commit-access list. If the live list cannot be fetched, the fallback
//! committers take its place for that one resolution. Resolution never fails;
//! a [`Resolution`] carries an [`AllowSource`] so callers can tell live data
//! from degraded data.

use crate::config::WhitelistConfig;
use crate::source::CommitAccessSource;
use crate::usernames::UsernameSet;
use serde::Serialize;
use tracing::info;

/// Where the commit-access part of a resolution came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum AllowSource {
    /// Fetched from the commit-access source during this resolution
    Live,
    /// Source failed; static fallback committers were used instead
    Fallback { reason: String },
}

/// The effective allow-set for one merge decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub allowed: UsernameSet,
    pub source: AllowSource,
}

impl Resolution {
    /// Whether `user` may have their changes merged automatically.
    pub fn is_allowed(&self, user: &str) -> bool {
        self.allowed.contains(user)
    }

    /// True when the resolution is running on fallback data.
    pub fn is_degraded(&self) -> bool {
        matches!(self.source, AllowSource::Fallback { .. })
    }
}

/// Recompute the effective allow-set.
pub fn refresh(config: &WhitelistConfig, source: &dyn CommitAccessSource) -> Resolution {
    let mut allowed = config.additional_whitelist.clone();

    let source_kind = match source.users_with_commit_access() {
        Ok(users) => {
            allowed.extend(users);
            AllowSource::Live
        }
        Err(e) => {
            info!(source = %source.describe(), error = %e, "Falling back to static committers list.");
            allowed.extend(config.fallback_committers.iter().cloned());
            AllowSource::Fallback {
                reason: e.to_string(),
            }
        }
    };

    Resolution {
        allowed,
        source: source_kind,
    }
}
