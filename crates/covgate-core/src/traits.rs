use std::collections::BTreeMap;

use crate::context::Event;
use crate::errors::PlatformError;
use crate::repository::RepositoryId;

/// Access to the version-control platform hosting the CI run.
///
/// Every lookup is fallible; callers decide which failures are fatal.
pub trait PlatformClient {
    fn default_branch(&self, repo: &RepositoryId) -> Result<String, PlatformError>;
    fn current_branch(&self) -> Result<String, PlatformError>;
    fn current_pull_request_number(&self, repo: &RepositoryId) -> Result<u64, PlatformError>;
    /// Name and decoded payload of the event that triggered the run.
    fn event(&self) -> Result<Event, PlatformError>;
}

impl<P: PlatformClient + ?Sized> PlatformClient for &P {
    fn default_branch(&self, repo: &RepositoryId) -> Result<String, PlatformError> {
        (**self).default_branch(repo)
    }

    fn current_branch(&self) -> Result<String, PlatformError> {
        (**self).current_branch()
    }

    fn current_pull_request_number(&self, repo: &RepositoryId) -> Result<u64, PlatformError> {
        (**self).current_pull_request_number(repo)
    }

    fn event(&self) -> Result<Event, PlatformError> {
        (**self).event()
    }
}

/// Source of environment variables exposed under `env`.
pub trait EnvironmentSource {
    fn vars(&self) -> BTreeMap<String, String>;
}

impl EnvironmentSource for BTreeMap<String, String> {
    fn vars(&self) -> BTreeMap<String, String> {
        self.clone()
    }
}
