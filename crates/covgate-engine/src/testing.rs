//! Substitute collaborators shared by unit tests.

use std::cell::RefCell;
use std::sync::{Arc, Mutex};

use covgate_core::context::Event;
use covgate_core::errors::PlatformError;
use covgate_core::repository::RepositoryId;
use covgate_core::traits::PlatformClient;

/// Scripted platform client that records which lookups were made.
pub struct StubPlatform {
    pub event: Result<Event, PlatformError>,
    pub default_branch: Result<String, PlatformError>,
    pub branch: Result<String, PlatformError>,
    pub pull_request: Result<u64, PlatformError>,
    calls: RefCell<Vec<&'static str>>,
}

impl StubPlatform {
    /// A push to `branch` in a repository whose default branch is `main`.
    pub fn on_branch(branch: &str) -> Self {
        StubPlatform {
            event: Ok(Event {
                name: "push".into(),
                payload: serde_json::json!({"ref": format!("refs/heads/{branch}")}),
            }),
            default_branch: Ok("main".into()),
            branch: Ok(branch.into()),
            pull_request: Err(PlatformError::PullRequestUndetected("no pull request".into())),
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn with_pull_request(mut self, number: u64) -> Self {
        self.pull_request = Ok(number);
        self
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.borrow().clone()
    }

    fn record(&self, call: &'static str) {
        self.calls.borrow_mut().push(call);
    }
}

impl PlatformClient for StubPlatform {
    fn default_branch(&self, _repo: &RepositoryId) -> Result<String, PlatformError> {
        self.record("default_branch");
        self.default_branch.clone()
    }

    fn current_branch(&self) -> Result<String, PlatformError> {
        self.record("current_branch");
        self.branch.clone()
    }

    fn current_pull_request_number(&self, _repo: &RepositoryId) -> Result<u64, PlatformError> {
        self.record("pull_request");
        self.pull_request.clone()
    }

    fn event(&self) -> Result<Event, PlatformError> {
        self.record("event");
        self.event.clone()
    }
}

/// A request seen by [`StubApi`].
#[derive(Debug, Clone)]
pub struct SeenRequest {
    pub url: String,
    pub authorization: Option<String>,
}

/// Local HTTP server standing in for the GitHub REST API. `route` maps a
/// request path and query to a status code and JSON body.
pub struct StubApi {
    pub base_url: String,
    seen: Arc<Mutex<Vec<SeenRequest>>>,
}

impl StubApi {
    pub fn serve<F>(route: F) -> Self
    where
        F: Fn(&str) -> (u16, String) + Send + 'static,
    {
        let server = tiny_http::Server::http("127.0.0.1:0").unwrap();
        let addr = server.server_addr().to_ip().unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&seen);
        std::thread::spawn(move || {
            for request in server.incoming_requests() {
                let authorization = request
                    .headers()
                    .iter()
                    .find(|h| h.field.equiv("Authorization"))
                    .map(|h| h.value.as_str().to_string());
                let url = request.url().to_string();
                log.lock().unwrap().push(SeenRequest {
                    url: url.clone(),
                    authorization,
                });
                let (status, body) = route(&url);
                let _ = request.respond(tiny_http::Response::from_string(body).with_status_code(status));
            }
        });
        StubApi {
            base_url: format!("http://{addr}"),
            seen,
        }
    }

    pub fn requests(&self) -> Vec<SeenRequest> {
        self.seen.lock().unwrap().clone()
    }
}
