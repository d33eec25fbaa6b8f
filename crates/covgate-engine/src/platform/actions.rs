use std::collections::BTreeMap;
use std::sync::OnceLock;

use covgate_core::context::Event;
use covgate_core::errors::PlatformError;
use covgate_core::repository::RepositoryId;
use covgate_core::traits::{EnvironmentSource, PlatformClient};
use tracing::debug;

use super::env::ProcessEnvironment;
use super::github::{GitHubApi, DEFAULT_API_URL};

/// Platform client for GitHub Actions jobs.
///
/// - event: `GITHUB_EVENT_NAME` + JSON file at `GITHUB_EVENT_PATH`, decoded once
/// - default branch: the payload's `repository.default_branch`, else
///   `GET /repos/{owner}/{repo}`
/// - current branch: `GITHUB_HEAD_REF`, else `GITHUB_REF` (`refs/heads/<name>`)
/// - pull request: `GITHUB_REF` (`refs/pull/<n>/merge`), then the payload's
///   `pull_request.number`, then the open pull request for the current branch
///
/// API calls go to `GITHUB_API_URL` (default `https://api.github.com`) and
/// authenticate with `GITHUB_TOKEN` when it is set.
pub struct ActionsClient {
    vars: BTreeMap<String, String>,
    event: OnceLock<Result<Event, PlatformError>>,
    api: OnceLock<Result<GitHubApi, String>>,
}

impl ActionsClient {
    pub fn from_env() -> Self {
        Self::with_vars(ProcessEnvironment.vars())
    }

    pub fn with_vars(vars: BTreeMap<String, String>) -> Self {
        Self {
            vars,
            event: OnceLock::new(),
            api: OnceLock::new(),
        }
    }

    fn var(&self, name: &'static str) -> Result<&str, PlatformError> {
        self.vars
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
            .ok_or(PlatformError::MissingEnv(name))
    }

    fn decoded_event(&self) -> &Result<Event, PlatformError> {
        self.event.get_or_init(|| self.read_event())
    }

    fn read_event(&self) -> Result<Event, PlatformError> {
        let name = self.var("GITHUB_EVENT_NAME")?;
        let path = self.var("GITHUB_EVENT_PATH")?;
        let content = std::fs::read_to_string(path)
            .map_err(|e| PlatformError::EventPayload(format!("cannot read {path}: {e}")))?;
        let payload = serde_json::from_str(&content)
            .map_err(|e| PlatformError::EventPayload(format!("{path}: {e}")))?;
        Ok(Event {
            name: name.to_string(),
            payload,
        })
    }

    fn payload(&self) -> Option<&serde_json::Value> {
        self.decoded_event().as_ref().ok().map(|e| &e.payload)
    }

    fn api(&self) -> Result<&GitHubApi, String> {
        self.api
            .get_or_init(|| {
                let base = self.var("GITHUB_API_URL").unwrap_or(DEFAULT_API_URL);
                let token = self.var("GITHUB_TOKEN").ok().map(str::to_string);
                GitHubApi::new(base, token)
            })
            .as_ref()
            .map_err(Clone::clone)
    }

    // Only trusted when the payload describes the repository being gated.
    fn payload_default_branch(&self, repo: &RepositoryId) -> Option<String> {
        let repository = self.payload()?.get("repository")?;
        if let Some(full_name) = repository.get("full_name").and_then(|v| v.as_str()) {
            if !full_name.eq_ignore_ascii_case(&repo.to_string()) {
                return None;
            }
        }
        repository
            .get("default_branch")
            .and_then(|v| v.as_str())
            .map(str::to_string)
    }
}

impl PlatformClient for ActionsClient {
    fn default_branch(&self, repo: &RepositoryId) -> Result<String, PlatformError> {
        if let Some(branch) = self.payload_default_branch(repo) {
            return Ok(branch);
        }
        debug!(repository = %repo, "default branch not in event payload; asking the API");
        self.api()
            .and_then(|api| api.default_branch(repo))
            .map_err(|reason| PlatformError::DefaultBranch {
                repo: repo.to_string(),
                reason,
            })
    }

    fn current_branch(&self) -> Result<String, PlatformError> {
        if let Ok(head) = self.var("GITHUB_HEAD_REF") {
            return Ok(head.to_string());
        }
        let git_ref = self
            .var("GITHUB_REF")
            .map_err(|e| PlatformError::BranchUndetected(e.to_string()))?;
        git_ref
            .strip_prefix("refs/heads/")
            .map(str::to_string)
            .ok_or_else(|| PlatformError::BranchUndetected(format!("{git_ref} is not a branch")))
    }

    fn current_pull_request_number(&self, repo: &RepositoryId) -> Result<u64, PlatformError> {
        if let Ok(git_ref) = self.var("GITHUB_REF") {
            if let Some(rest) = git_ref.strip_prefix("refs/pull/") {
                if let Some(number) = rest.split('/').next().and_then(|n| n.parse().ok()) {
                    return Ok(number);
                }
            }
        }
        if let Some(number) = self
            .payload()
            .and_then(|p| p.pointer("/pull_request/number"))
            .and_then(|n| n.as_u64())
        {
            return Ok(number);
        }

        let branch = self
            .current_branch()
            .map_err(|e| PlatformError::PullRequestUndetected(e.to_string()))?;
        match self.api().and_then(|api| api.open_pull_request(repo, &branch)) {
            Ok(Some(number)) => Ok(number),
            Ok(None) => Err(PlatformError::PullRequestUndetected(format!(
                "no open pull request for branch {branch}"
            ))),
            Err(reason) => Err(PlatformError::Unavailable(reason)),
        }
    }

    fn event(&self) -> Result<Event, PlatformError> {
        self.decoded_event().clone()
    }
}
