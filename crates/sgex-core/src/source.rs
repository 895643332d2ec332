//! Access to FSH sources in DAK repositories
//!
//! [`GitHubSource`] uses the single "get repository content" endpoint in raw
//! mode; [`LocalSource`] reads from a checkout on disk. Both report an absent
//! file as `Ok(None)` so callers can fall back without inspecting errors.

use async_trait::async_trait;
use reqwest::{Client, StatusCode, header};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

use crate::error::SgexError;
use crate::result::Result;

pub const GITHUB_API_URL: &str = "https://api.github.com";
pub const DEFAULT_BRANCH: &str = "main";

const RAW_MEDIA_TYPE: &str = "application/vnd.github.raw";
const USER_AGENT: &str = concat!("sgex/", env!("CARGO_PKG_VERSION"));

/// A repository at a branch
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoRef {
    pub owner: String,
    pub repo: String,
    pub branch: String,
}

impl RepoRef {
    pub fn new(
        owner: impl Into<String>,
        repo: impl Into<String>,
        branch: impl Into<String>,
    ) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            branch: branch.into(),
        }
    }

    /// Parse `owner/repo`, optionally followed by `@branch`
    pub fn parse(input: &str, branch: Option<&str>) -> Result<Self> {
        let (slug, inline_branch) = match input.split_once('@') {
            Some((slug, branch)) => (slug, Some(branch)),
            None => (input, None),
        };

        let (owner, repo) = slug
            .split_once('/')
            .ok_or_else(|| SgexError::invalid_repo_ref(input, "expected 'owner/repo'"))?;

        if owner.is_empty() || repo.is_empty() || repo.contains('/') {
            return Err(SgexError::invalid_repo_ref(input, "expected 'owner/repo'"));
        }

        let branch = branch.or(inline_branch).unwrap_or(DEFAULT_BRANCH);
        if branch.is_empty() {
            return Err(SgexError::invalid_repo_ref(input, "branch must not be empty"));
        }

        Ok(Self::new(owner, repo, branch))
    }

    pub fn slug(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }

    pub fn with_branch(&self, branch: impl Into<String>) -> Self {
        Self {
            branch: branch.into(),
            ..self.clone()
        }
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}@{}", self.owner, self.repo, self.branch)
    }
}

impl FromStr for RepoRef {
    type Err = SgexError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s, None)
    }
}

/// Something that can produce the text of a repository file
#[async_trait]
pub trait FshSource: Send + Sync {
    /// Fetch `path` at `repo`'s branch. `Ok(None)` when the file does not exist.
    async fn fetch(&self, repo: &RepoRef, path: &str) -> Result<Option<String>>;

    /// Short description for logs and diagnostics headers
    fn describe(&self, repo: &RepoRef, path: &str) -> String {
        format!("{repo}:{path}")
    }
}

/// GitHub REST client for raw file content
pub struct GitHubSource {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl GitHubSource {
    pub fn new(token: Option<String>) -> Result<Self> {
        Self::with_base_url(GITHUB_API_URL, token)
    }

    /// Point at another API root (GitHub Enterprise, test servers)
    pub fn with_base_url(base_url: impl Into<String>, token: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.filter(|t| !t.trim().is_empty()),
        })
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    fn content_url(&self, repo: &RepoRef, path: &str) -> String {
        let encoded_path = path
            .trim_start_matches('/')
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect::<Vec<_>>()
            .join("/");
        format!(
            "{}/repos/{}/{}/contents/{}?ref={}",
            self.base_url,
            urlencoding::encode(&repo.owner),
            urlencoding::encode(&repo.repo),
            encoded_path,
            urlencoding::encode(&repo.branch)
        )
    }
}

#[async_trait]
impl FshSource for GitHubSource {
    async fn fetch(&self, repo: &RepoRef, path: &str) -> Result<Option<String>> {
        let url = self.content_url(repo, path);
        debug!("Fetching {}", url);

        let mut request = self
            .client
            .get(&url)
            .header(header::ACCEPT, RAW_MEDIA_TYPE);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            debug!("{} not found at {}", path, repo);
            return Ok(None);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string());
            return Err(SgexError::remote_error(status.as_u16(), path, message));
        }

        Ok(Some(response.text().await?))
    }
}

/// Files from a local checkout; the branch is whatever is checked out
pub struct LocalSource {
    root: PathBuf,
}

impl LocalSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl FshSource for LocalSource {
    async fn fetch(&self, _repo: &RepoRef, path: &str) -> Result<Option<String>> {
        let full_path = self.root.join(path.trim_start_matches('/'));
        match tokio::fs::read_to_string(&full_path).await {
            Ok(text) => Ok(Some(text)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(SgexError::io_error(full_path, err)),
        }
    }

    fn describe(&self, _repo: &RepoRef, path: &str) -> String {
        self.root.join(path).display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_ref_parse() {
        let repo = RepoRef::parse("WorldHealthOrganization/smart-immunizations", None).unwrap();
        assert_eq!(repo.owner, "WorldHealthOrganization");
        assert_eq!(repo.repo, "smart-immunizations");
        assert_eq!(repo.branch, "main");
    }

    #[test]
    fn test_repo_ref_inline_and_explicit_branch() {
        let inline = RepoRef::parse("who/anc@develop", None).unwrap();
        assert_eq!(inline.branch, "develop");

        let explicit = RepoRef::parse("who/anc@develop", Some("release")).unwrap();
        assert_eq!(explicit.branch, "release");
    }

    #[test]
    fn test_repo_ref_rejects_bad_input() {
        assert!(RepoRef::parse("no-slash", None).is_err());
        assert!(RepoRef::parse("/repo", None).is_err());
        assert!(RepoRef::parse("a/b/c", None).is_err());
        assert!(RepoRef::parse("a/b@", None).is_err());
    }

    #[test]
    fn test_repo_ref_display() {
        let repo = RepoRef::new("who", "anc", "main");
        assert_eq!(repo.to_string(), "who/anc@main");
        assert_eq!(repo.slug(), "who/anc");
        assert_eq!(repo.with_branch("dev").to_string(), "who/anc@dev");
    }

    #[test]
    fn test_content_url() {
        let source = GitHubSource::with_base_url("https://api.example.com/", None).unwrap();
        let url = source.content_url(
            &RepoRef::new("who", "anc", "feature/x"),
            "input/fsh/codesystems/DAK.fsh",
        );
        assert_eq!(
            url,
            "https://api.example.com/repos/who/anc/contents/input/fsh/codesystems/DAK.fsh?ref=feature%2Fx"
        );
    }

    #[test]
    fn test_blank_token_is_anonymous() {
        let source = GitHubSource::new(Some("  ".to_string())).unwrap();
        assert!(!source.is_authenticated());
    }

    #[tokio::test]
    async fn test_local_source_missing_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let source = LocalSource::new(dir.path());
        let repo = RepoRef::new("local", "checkout", "main");
        assert_eq!(source.fetch(&repo, "missing.fsh").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_local_source_reads_file() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("input/fsh")).unwrap();
        std::fs::write(dir.path().join("input/fsh/x.fsh"), "* #\"A\" \"B\"").unwrap();

        let source = LocalSource::new(dir.path());
        let repo = RepoRef::new("local", "checkout", "main");
        let text = source.fetch(&repo, "input/fsh/x.fsh").await.unwrap();
        assert_eq!(text.as_deref(), Some("* #\"A\" \"B\""));
    }
}
