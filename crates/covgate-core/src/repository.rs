use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::ConfigError;

/// A repository identifier in `owner/repo` form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RepositoryId {
    pub owner: String,
    pub repo: String,
}

impl fmt::Display for RepositoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

impl FromStr for RepositoryId {
    type Err = ConfigError;

    /// Accepts `owner/repo`. A trailing path (`owner/repo/sub/dir`, used for monorepo
    /// reports) is allowed and ignored for addressing.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ConfigError::MissingRepository);
        }
        let mut parts = s.splitn(3, '/');
        let owner = parts.next().unwrap_or_default();
        let repo = parts.next().unwrap_or_default();
        if owner.is_empty()
            || repo.is_empty()
            || owner.contains(char::is_whitespace)
            || repo.contains(char::is_whitespace)
        {
            return Err(ConfigError::MalformedRepository(s.to_string()));
        }
        Ok(RepositoryId {
            owner: owner.to_string(),
            repo: repo.to_string(),
        })
    }
}

impl TryFrom<String> for RepositoryId {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RepositoryId> for String {
    fn from(value: RepositoryId) -> Self {
        value.to_string()
    }
}
