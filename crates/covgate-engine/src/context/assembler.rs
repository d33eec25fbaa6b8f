use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use covgate_core::context::RunContext;
use covgate_core::errors::GateError;
use covgate_core::repository::RepositoryId;
use covgate_core::traits::{EnvironmentSource, PlatformClient};

/// Builds a [`RunContext`] for one gating call.
///
/// Lookup order:
/// 1. Decode the triggering event (fatal on failure)
/// 2. Parse the repository identifier (fatal on failure)
/// 3. Look up the default branch (fatal on failure)
/// 4. Detect the current branch (degrades to `is_default_branch = false`)
/// 5. Detect the pull request (degrades to `is_pull_request = false`)
///
/// The platform client is owned by the assembler and reused for every call.
pub struct ContextAssembler<P, E> {
    client: P,
    environment: E,
    repository: String,
}

impl<P: PlatformClient, E: EnvironmentSource> ContextAssembler<P, E> {
    pub fn new(client: P, environment: E, repository: impl Into<String>) -> Self {
        Self {
            client,
            environment,
            repository: repository.into(),
        }
    }

    pub fn client(&self) -> &P {
        &self.client
    }

    pub fn repository(&self) -> &str {
        &self.repository
    }

    pub fn assemble(&self) -> Result<RunContext, GateError> {
        self.assemble_at(Utc::now())
    }

    /// Assemble with an explicit invocation instant.
    pub fn assemble_at(&self, now: DateTime<Utc>) -> Result<RunContext, GateError> {
        let event = self.client.event()?;
        let repo: RepositoryId = self.repository.parse()?;

        let default_branch = self.client.default_branch(&repo)?;
        let is_default_branch = match self.client.current_branch() {
            Ok(branch) => branch == default_branch,
            Err(e) => {
                warn!(error = %e, "current branch unknown; treating as non-default branch");
                false
            }
        };

        let is_pull_request = match self.client.current_pull_request_number(&repo) {
            Ok(number) => {
                debug!(number, "running in pull request");
                true
            }
            Err(e) => {
                debug!(reason = %e, "not a pull request run");
                false
            }
        };

        debug!(
            repository = %repo,
            event = %event.name,
            default_branch = %default_branch,
            is_default_branch,
            is_pull_request,
            "assembled run context"
        );

        Ok(RunContext::new(
            now,
            event,
            self.environment.vars(),
            is_default_branch,
            is_pull_request,
        ))
    }
}
