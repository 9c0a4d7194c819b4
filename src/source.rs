//! Sources of the authoritative "users with commit access" list.
//!
//! - [`GitHubSource`]: collaborators with push access, via the GitHub REST API
//! - [`ListFileSource`]: a list file maintained by some other system

use crate::lists::{self, ListError};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// GitHub API base URL
pub const GITHUB_API_BASE: &str = "https://api.github.com";

/// User-Agent header required by GitHub API
const USER_AGENT: &str = "mergegate";

/// Collaborators requested per page (GitHub maximum)
const PER_PAGE: usize = 100;

/// Upper bound on pages fetched in one call.
const MAX_PAGES: usize = 200;

/// Per-request timeout for GitHub calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors that can occur while fetching the commit-access list.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Token is invalid or expired (401 Unauthorized)
    #[error("Invalid or expired token: GitHub returned 401 Unauthorized")]
    Unauthorized,

    /// Token lacks required permissions (403 Forbidden)
    #[error("Token lacks required permissions: GitHub returned 403 Forbidden")]
    Forbidden,

    /// Repository does not exist or is not visible to the token
    #[error("Repository {0} not found or not visible")]
    RepoNotFound(String),

    /// Network or other HTTP error
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Failed to parse response
    #[error("Failed to parse GitHub response: {0}")]
    Parse(String),

    /// File-backed source could not be read
    #[error(transparent)]
    List(#[from] ListError),
}

/// Something that can list the users who currently hold commit access.
pub trait CommitAccessSource {
    /// Fetch the current list of usernames with commit access.
    fn users_with_commit_access(&self) -> Result<Vec<String>, SourceError>;

    /// Short description for logs and command output.
    fn describe(&self) -> String;
}

/// Collaborator entry from GET /repos/{owner}/{repo}/collaborators (only fields we care about).
#[derive(Debug, Deserialize)]
struct Collaborator {
    login: String,
    #[serde(default)]
    permissions: Option<CollaboratorPermissions>,
}

#[derive(Debug, Default, Deserialize)]
struct CollaboratorPermissions {
    #[serde(default)]
    admin: bool,
    #[serde(default)]
    maintain: bool,
    #[serde(default)]
    push: bool,
}

impl Collaborator {
    fn has_commit_access(&self) -> bool {
        self.permissions
            .as_ref()
            .is_some_and(|p| p.admin || p.maintain || p.push)
    }
}

/// Commit-access source backed by a GitHub repository's collaborator list.
#[derive(Clone)]
pub struct GitHubSource {
    owner: String,
    repo: String,
    token: Option<String>,
    api_base: String,
    agent: ureq::Agent,
}

impl std::fmt::Debug for GitHubSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubSource")
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .field("api_base", &self.api_base)
            .field("authenticated", &self.token.is_some())
            .finish_non_exhaustive()
    }
}

impl GitHubSource {
    /// Create a source for `owner/repo` against the public GitHub API.
    pub fn new(owner: impl Into<String>, repo: impl Into<String>, token: Option<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            token: token.filter(|t| !t.is_empty()),
            api_base: GITHUB_API_BASE.to_string(),
            agent: ureq::AgentBuilder::new().timeout(REQUEST_TIMEOUT).build(),
        }
    }

    /// Point the source at a different API root (GitHub Enterprise).
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    fn slug(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }

    fn fetch_page(&self, page: usize) -> Result<Vec<Collaborator>, SourceError> {
        let url = format!(
            "{}/repos/{}/{}/collaborators",
            self.api_base, self.owner, self.repo
        );

        let mut request = self
            .agent
            .get(&url)
            .set("Accept", "application/vnd.github+json")
            .set("User-Agent", USER_AGENT)
            .set("X-GitHub-Api-Version", "2022-11-28")
            .query("affiliation", "all")
            .query("per_page", &PER_PAGE.to_string())
            .query("page", &page.to_string());
        if let Some(token) = &self.token {
            request = request.set("Authorization", &format!("Bearer {}", token));
        }

        match request.call() {
            Ok(resp) => resp
                .into_json()
                .map_err(|e| SourceError::Parse(e.to_string())),
            Err(ureq::Error::Status(401, _)) => Err(SourceError::Unauthorized),
            Err(ureq::Error::Status(403, _)) => Err(SourceError::Forbidden),
            Err(ureq::Error::Status(404, _)) => Err(SourceError::RepoNotFound(self.slug())),
            Err(ureq::Error::Status(code, resp)) => {
                let body = resp.into_string().unwrap_or_default();
                Err(SourceError::Http(format!("HTTP {}: {}", code, body)))
            }
            Err(e) => Err(SourceError::Http(e.to_string())),
        }
    }
}

impl CommitAccessSource for GitHubSource {
    fn users_with_commit_access(&self) -> Result<Vec<String>, SourceError> {
        let mut users = Vec::new();
        for page in 1..=MAX_PAGES {
            let collaborators = self.fetch_page(page)?;
            let fetched = collaborators.len();
            debug!(repo = %self.slug(), page, fetched, "fetched collaborators page");

            users.extend(
                collaborators
                    .into_iter()
                    .filter(Collaborator::has_commit_access)
                    .map(|c| c.login),
            );
            if fetched < PER_PAGE {
                return Ok(users);
            }
        }
        Err(SourceError::Http(format!(
            "collaborator listing for {} exceeded {} pages",
            self.slug(),
            MAX_PAGES
        )))
    }

    fn describe(&self) -> String {
        format!("github:{}", self.slug())
    }
}

/// Commit-access source read from a list file.
#[derive(Debug, Clone)]
pub struct ListFileSource {
    path: PathBuf,
}

impl ListFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CommitAccessSource for ListFileSource {
    fn users_with_commit_access(&self) -> Result<Vec<String>, SourceError> {
        Ok(lists::load(&self.path)?)
    }

    fn describe(&self) -> String {
        format!("file:{}", self.path.display())
    }
}
