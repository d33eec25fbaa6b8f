use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use covgate_core::repository::RepositoryId;

pub const DEFAULT_API_URL: &str = "https://api.github.com";

const TIMEOUT: Duration = Duration::from_secs(10);

/// Minimal blocking client for the GitHub REST endpoints gating needs.
pub struct GitHubApi {
    client: reqwest::blocking::Client,
    base_url: String,
    token: Option<String>,
}

#[derive(Deserialize)]
struct RepositoryInfo {
    default_branch: String,
}

#[derive(Deserialize)]
struct PullRequestInfo {
    number: u64,
}

impl GitHubApi {
    pub fn new(base_url: &str, token: Option<String>) -> Result<Self, String> {
        let client = reqwest::blocking::Client::builder()
            .timeout(TIMEOUT)
            .user_agent(concat!("covgate/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| format!("cannot create HTTP client: {e}"))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.filter(|t| !t.is_empty()),
        })
    }

    fn get<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, String> {
        let url = format!("{}{path}", self.base_url);
        debug!(url = %url, "GitHub API request");
        let mut request = self
            .client
            .get(&url)
            .query(query)
            .header("Accept", "application/vnd.github+json");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        let resp = request.send().map_err(|e| format!("GET {url}: {e}"))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(format!("GET {url}: {status}"));
        }
        resp.json::<T>()
            .map_err(|e| format!("GET {url}: invalid response: {e}"))
    }

    /// `GET /repos/{owner}/{repo}` → `default_branch`.
    pub fn default_branch(&self, repo: &RepositoryId) -> Result<String, String> {
        let info: RepositoryInfo =
            self.get(&format!("/repos/{}/{}", repo.owner, repo.repo), &[])?;
        Ok(info.default_branch)
    }

    /// Number of the open pull request whose head is `branch`, if any.
    pub fn open_pull_request(
        &self,
        repo: &RepositoryId,
        branch: &str,
    ) -> Result<Option<u64>, String> {
        let head = format!("{}:{branch}", repo.owner);
        let pulls: Vec<PullRequestInfo> = self.get(
            &format!("/repos/{}/{}/pulls", repo.owner, repo.repo),
            &[("state", "open"), ("head", head.as_str()), ("per_page", "1")],
        )?;
        Ok(pulls.first().map(|p| p.number))
    }
}
