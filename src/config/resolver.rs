//! Precedence resolution for mergegate settings.
//!
//! ## Precedence (highest to lowest)
//!
//! 1. CLI flags (including their environment variable fallbacks)
//! 2. Settings file (`--config` / `MERGEGATE_CONFIG`)
//! 3. Built-in defaults
//!
//! List-valued settings (`additional_users`, `fallback_committers`) are merged
//! rather than overridden.

use super::{ConfigError, Settings};
use crate::source::{CommitAccessSource, GITHUB_API_BASE, GitHubSource, ListFileSource};
use std::path::PathBuf;

/// Default whitelist path.
pub const DEFAULT_WHITELIST: &str = "./whitelist.txt";

/// Default committers snapshot path.
pub const DEFAULT_COMMITTERS: &str = "./committers.txt";

/// Default label that bypasses the whitelist.
pub const DEFAULT_OVERRIDE_LABEL: &str = "ok-to-merge";

/// Tracks where a resolved value came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueSource {
    /// Value from CLI flag (or its env var)
    CliFlag,
    /// Value from the settings file
    ConfigFile(PathBuf),
    /// Built-in default value
    Default,
}

impl std::fmt::Display for ValueSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueSource::CliFlag => write!(f, "cli"),
            ValueSource::ConfigFile(path) => write!(f, "config:{}", path.display()),
            ValueSource::Default => write!(f, "default"),
        }
    }
}

/// A resolved value with its source.
#[derive(Debug, Clone)]
pub struct Resolved<T> {
    /// The resolved value
    pub value: T,
    /// Where the value came from
    pub source: ValueSource,
}

impl<T> Resolved<T> {
    pub fn new(value: T, source: ValueSource) -> Self {
        Self { value, source }
    }
}

/// Values supplied on the command line. `None`/empty means "not given".
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub whitelist: Option<PathBuf>,
    pub committers: Option<PathBuf>,
    pub override_label: Option<String>,
    pub additional_users: Vec<String>,
    pub github_repo: Option<String>,
    pub github_api: Option<String>,
    pub github_token: Option<String>,
    pub source_file: Option<PathBuf>,
}

/// Where the authoritative commit-access list comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceSpec {
    /// Collaborators of a GitHub repository
    GitHub {
        owner: String,
        repo: String,
        api_base: String,
    },
    /// A list file maintained elsewhere
    File(PathBuf),
}

impl std::fmt::Display for SourceSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceSpec::GitHub { owner, repo, .. } => write!(f, "github:{}/{}", owner, repo),
            SourceSpec::File(path) => write!(f, "file:{}", path.display()),
        }
    }
}

/// Fully resolved settings with source tracking.
#[derive(Debug, Clone)]
pub struct ResolvedSettings {
    pub whitelist: Resolved<PathBuf>,
    pub committers: Resolved<PathBuf>,
    pub override_label: Resolved<String>,
    pub additional_users: Vec<String>,
    pub fallback_committers: Vec<String>,
    pub source: Resolved<SourceSpec>,
    github_token: Option<String>,
}

impl ResolvedSettings {
    /// Build the commit-access source these settings point at.
    pub fn commit_access_source(&self) -> Box<dyn CommitAccessSource> {
        match &self.source.value {
            SourceSpec::GitHub {
                owner,
                repo,
                api_base,
            } => Box::new(
                GitHubSource::new(owner.clone(), repo.clone(), self.github_token.clone())
                    .with_api_base(api_base.clone()),
            ),
            SourceSpec::File(path) => Box::new(ListFileSource::new(path.clone())),
        }
    }
}

/// Split `owner/name` into its two parts.
pub fn parse_repo_slug(slug: &str) -> Result<(String, String), ConfigError> {
    match slug.split_once('/') {
        Some((owner, repo)) if !owner.is_empty() && !repo.is_empty() && !repo.contains('/') => {
            Ok((owner.to_string(), repo.to_string()))
        }
        _ => Err(ConfigError::InvalidRepo(slug.to_string())),
    }
}

fn pick<T>(cli: Option<T>, file: Option<T>, file_source: &ValueSource, default: T) -> Resolved<T> {
    match (cli, file) {
        (Some(value), _) => Resolved::new(value, ValueSource::CliFlag),
        (None, Some(value)) => Resolved::new(value, file_source.clone()),
        (None, None) => Resolved::new(default, ValueSource::Default),
    }
}

fn github_spec(slug: &str, api_base: Option<String>) -> Result<SourceSpec, ConfigError> {
    let (owner, repo) = parse_repo_slug(slug)?;
    Ok(SourceSpec::GitHub {
        owner,
        repo,
        api_base: api_base.unwrap_or_else(|| GITHUB_API_BASE.to_string()),
    })
}

/// Resolve settings from CLI overrides and an optional settings file.
///
/// `settings` is paired with the path it was read from so resolved values can
/// report their origin.
pub fn resolve_settings(
    settings: Option<(&Settings, PathBuf)>,
    overrides: ConfigOverrides,
) -> Result<ResolvedSettings, ConfigError> {
    let (file, file_source) = match settings {
        Some((s, path)) => (s.clone(), ValueSource::ConfigFile(path)),
        None => (Settings::default(), ValueSource::Default),
    };

    let whitelist = pick(
        overrides.whitelist,
        file.whitelist,
        &file_source,
        PathBuf::from(DEFAULT_WHITELIST),
    );
    let committers = pick(
        overrides.committers,
        file.committers,
        &file_source,
        PathBuf::from(DEFAULT_COMMITTERS),
    );
    let override_label = pick(
        overrides.override_label,
        file.override_label,
        &file_source,
        DEFAULT_OVERRIDE_LABEL.to_string(),
    );

    let mut additional_users = file.additional_users;
    additional_users.extend(overrides.additional_users);

    let api_base = overrides.github_api.or(file.github_api);
    let source = if let Some(path) = overrides.source_file {
        Resolved::new(SourceSpec::File(path), ValueSource::CliFlag)
    } else if let Some(slug) = overrides.github_repo {
        Resolved::new(github_spec(&slug, api_base)?, ValueSource::CliFlag)
    } else if let Some(path) = file.source_file {
        Resolved::new(SourceSpec::File(path), file_source.clone())
    } else if let Some(slug) = file.github_repo {
        Resolved::new(github_spec(&slug, api_base)?, file_source.clone())
    } else {
        return Err(ConfigError::NoSource);
    };

    Ok(ResolvedSettings {
        whitelist,
        committers,
        override_label,
        additional_users,
        fallback_committers: file.fallback_committers,
        source,
        github_token: overrides.github_token.filter(|t| !t.is_empty()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_file_source() -> ConfigOverrides {
        ConfigOverrides {
            source_file: Some(PathBuf::from("access.txt")),
            ..Default::default()
        }
    }

    #[test]
    fn test_defaults() {
        let resolved = resolve_settings(None, with_file_source()).unwrap();

        assert_eq!(resolved.whitelist.value, PathBuf::from(DEFAULT_WHITELIST));
        assert_eq!(resolved.whitelist.source, ValueSource::Default);
        assert_eq!(resolved.committers.value, PathBuf::from(DEFAULT_COMMITTERS));
        assert_eq!(resolved.override_label.value, DEFAULT_OVERRIDE_LABEL);
        assert_eq!(
            resolved.source.value,
            SourceSpec::File(PathBuf::from("access.txt"))
        );
        assert_eq!(resolved.source.source, ValueSource::CliFlag);
    }

    #[test]
    fn test_cli_beats_config_file() {
        let settings = Settings {
            whitelist: Some(PathBuf::from("file-whitelist.txt")),
            override_label: Some("file-label".to_string()),
            ..Default::default()
        };
        let overrides = ConfigOverrides {
            whitelist: Some(PathBuf::from("cli-whitelist.txt")),
            ..with_file_source()
        };

        let resolved =
            resolve_settings(Some((&settings, PathBuf::from("m.toml"))), overrides).unwrap();

        assert_eq!(resolved.whitelist.value, PathBuf::from("cli-whitelist.txt"));
        assert_eq!(resolved.whitelist.source, ValueSource::CliFlag);
        assert_eq!(resolved.override_label.value, "file-label");
        assert_eq!(
            resolved.override_label.source,
            ValueSource::ConfigFile(PathBuf::from("m.toml"))
        );
    }

    #[test]
    fn test_user_lists_are_merged() {
        let settings = Settings {
            additional_users: vec!["from-file".to_string()],
            fallback_committers: vec!["fallback".to_string()],
            ..Default::default()
        };
        let overrides = ConfigOverrides {
            additional_users: vec!["from-cli".to_string()],
            ..with_file_source()
        };

        let resolved =
            resolve_settings(Some((&settings, PathBuf::from("m.toml"))), overrides).unwrap();
        assert_eq!(resolved.additional_users, vec!["from-file", "from-cli"]);
        assert_eq!(resolved.fallback_committers, vec!["fallback"]);
    }

    #[test]
    fn test_github_source_from_config_file() {
        let settings = Settings {
            github_repo: Some("acme/widgets".to_string()),
            ..Default::default()
        };

        let resolved = resolve_settings(
            Some((&settings, PathBuf::from("m.toml"))),
            ConfigOverrides::default(),
        )
        .unwrap();

        assert_eq!(
            resolved.source.value,
            SourceSpec::GitHub {
                owner: "acme".to_string(),
                repo: "widgets".to_string(),
                api_base: GITHUB_API_BASE.to_string(),
            }
        );
        assert_eq!(resolved.source.value.to_string(), "github:acme/widgets");
    }

    #[test]
    fn test_source_file_wins_over_github_repo() {
        let overrides = ConfigOverrides {
            github_repo: Some("acme/widgets".to_string()),
            ..with_file_source()
        };

        let resolved = resolve_settings(None, overrides).unwrap();
        assert!(matches!(resolved.source.value, SourceSpec::File(_)));
    }

    #[test]
    fn test_cli_github_repo_wins_over_file_source_file() {
        let settings = Settings {
            source_file: Some(PathBuf::from("access.txt")),
            ..Default::default()
        };
        let overrides = ConfigOverrides {
            github_repo: Some("acme/widgets".to_string()),
            ..Default::default()
        };

        let resolved =
            resolve_settings(Some((&settings, PathBuf::from("m.toml"))), overrides).unwrap();
        assert!(matches!(resolved.source.value, SourceSpec::GitHub { .. }));
    }

    #[test]
    fn test_missing_source_is_error() {
        let err = resolve_settings(None, ConfigOverrides::default()).unwrap_err();
        assert!(matches!(err, ConfigError::NoSource));
    }

    #[test]
    fn test_parse_repo_slug() {
        assert_eq!(
            parse_repo_slug("acme/widgets").unwrap(),
            ("acme".to_string(), "widgets".to_string())
        );
        assert!(parse_repo_slug("acme").is_err());
        assert!(parse_repo_slug("/widgets").is_err());
        assert!(parse_repo_slug("acme/").is_err());
        assert!(parse_repo_slug("acme/widgets/extra").is_err());
    }

    #[test]
    fn test_empty_token_is_ignored() {
        let overrides = ConfigOverrides {
            github_token: Some(String::new()),
            ..with_file_source()
        };

        let resolved = resolve_settings(None, overrides).unwrap();
        assert!(resolved.github_token.is_none());
    }

    #[test]
    fn test_value_source_display() {
        assert_eq!(ValueSource::CliFlag.to_string(), "cli");
        assert_eq!(ValueSource::Default.to_string(), "default");
        assert_eq!(
            ValueSource::ConfigFile(PathBuf::from("m.toml")).to_string(),
            "config:m.toml"
        );
    }
}
