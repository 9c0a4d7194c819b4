//! Command implementations for the mergegate CLI.
//!
//! - `gen-committers` - regenerate the committers snapshot and de-dup the whitelist
//! - `whitelist` - print the effective allow-set
//! - `check` - answer whether one user may auto-merge

use crate::Result;
use crate::config::{ResolvedSettings, WhitelistConfig};
use crate::reconcile::{self, ReconcileOptions, ReconcileReport};
use crate::resolver::{self, AllowSource, Resolution};
use crate::usernames::UsernameSet;
use serde::Serialize;

/// Command results that can be serialized to JSON or formatted for humans.
pub trait Output {
    /// Serialize to JSON string.
    fn to_json(&self) -> String;

    /// Format for human-readable output.
    fn to_human(&self) -> String;
}

fn fallback_reason(resolution: &Resolution) -> Option<String> {
    match &resolution.source {
        AllowSource::Live => None,
        AllowSource::Fallback { reason } => Some(reason.clone()),
    }
}

/// Result of `mergegate whitelist`.
#[derive(Debug, Serialize)]
pub struct WhitelistShown {
    pub source: String,
    pub live: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<String>,
    pub override_label: String,
    pub count: usize,
    pub users: UsernameSet,
}

impl Output for WhitelistShown {
    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    fn to_human(&self) -> String {
        let mut lines = Vec::new();
        if self.live {
            lines.push(format!("{} users may auto-merge (live from {}):", self.count, self.source));
        } else {
            lines.push(format!(
                "{} users may auto-merge (FALLBACK, {} unavailable: {}):",
                self.count,
                self.source,
                self.fallback_reason.as_deref().unwrap_or("unknown error")
            ));
        }
        for user in self.users.iter() {
            lines.push(format!("  {}", user));
        }
        lines.push(format!(
            "PRs labelled '{}' bypass the whitelist.",
            self.override_label
        ));
        lines.join("\n")
    }
}

/// Result of `mergegate check <user>`.
#[derive(Debug, Serialize)]
pub struct CheckResult {
    pub user: String,
    pub allowed: bool,
    pub live: bool,
    pub override_label: String,
}

impl Output for CheckResult {
    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    fn to_human(&self) -> String {
        let verdict = if self.allowed {
            format!("{} may auto-merge", self.user)
        } else {
            format!(
                "{} may not auto-merge (unless the PR is labelled '{}')",
                self.user, self.override_label
            )
        };
        if self.live {
            verdict
        } else {
            format!("{} [fallback committers list in use]", verdict)
        }
    }
}

impl Output for ReconcileReport {
    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    fn to_human(&self) -> String {
        let mut lines = Vec::new();
        if self.dry_run {
            lines.push("Dry run: no files were written.".to_string());
        }
        lines.push(format!(
            "Wrote {} committers from {} to {}",
            self.committers,
            self.source,
            self.committers_path.display()
        ));
        lines.push(format!(
            "Whitelist {}: kept {}, removed {}",
            self.whitelist_path.display(),
            self.kept.len(),
            self.removed.len()
        ));
        for user in &self.removed {
            lines.push(format!("  - {}", user));
        }
        lines.join("\n")
    }
}

fn resolve(settings: &ResolvedSettings) -> Result<(WhitelistConfig, Resolution, String)> {
    let config = WhitelistConfig::from_settings(settings).with_persisted_lists()?;
    let source = settings.commit_access_source();
    let resolution = resolver::refresh(&config, source.as_ref());
    Ok((config, resolution, source.describe()))
}

/// Show the effective allow-set.
pub fn whitelist_show(settings: &ResolvedSettings) -> Result<WhitelistShown> {
    let (config, resolution, source) = resolve(settings)?;
    let fallback_reason = fallback_reason(&resolution);
    Ok(WhitelistShown {
        source,
        live: !resolution.is_degraded(),
        fallback_reason,
        override_label: config.override_label,
        count: resolution.allowed.len(),
        users: resolution.allowed,
    })
}

/// Check whether a single user may auto-merge.
pub fn check_user(settings: &ResolvedSettings, user: &str) -> Result<CheckResult> {
    let (config, resolution, _) = resolve(settings)?;
    Ok(CheckResult {
        user: user.to_string(),
        allowed: resolution.is_allowed(user),
        live: !resolution.is_degraded(),
        override_label: config.override_label,
    })
}

/// Regenerate the committers snapshot and de-duplicate the whitelist.
pub fn gen_committers(settings: &ResolvedSettings, dry_run: bool) -> Result<ReconcileReport> {
    let config = WhitelistConfig::from_settings(settings);
    let source = settings.commit_access_source();
    let options = ReconcileOptions {
        dry_run,
        ..Default::default()
    };
    Ok(reconcile::reconcile(&config, source.as_ref(), &options)?)
}
