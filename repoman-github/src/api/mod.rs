//! GitHub REST API access
//!
//! [`GitHubApi`] is the narrow surface the rest of the crate depends on:
//! an existence check, paginated repository and issue listings, and file
//! read/write with revision-marker semantics. [`GitHubApiClient`] implements
//! it over `reqwest`.

use async_trait::async_trait;
use repoman_core::{ErrorContext, Owner, RepomanError, RepomanResult, RepositoryRef};
use serde::{Deserialize, Serialize};

pub mod github;
pub mod pagination;

#[cfg(test)]
mod tests;

pub use github::GitHubApiClient;
pub use pagination::next_page_from_link;

/// One page of a listing request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// 1-based page number
    pub page: u32,
    pub per_page: u32,
}

impl PageRequest {
    pub fn first(per_page: u32) -> Self {
        Self { page: 1, per_page }
    }
}

/// One page of results plus the upstream pointer to the next page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// `None` once the upstream reports no further page
    pub next_page: Option<u32>,
}

/// An entry of the repository issue listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueRecord {
    pub state: String,
    /// Pull requests show up in the issue listing with a pull-request link
    pub is_pull_request: bool,
}

/// A file read through the contents API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileContent {
    pub path: String,
    /// Blob SHA, the revision marker required to update the file
    pub sha: String,
}

/// Body of a create-or-update call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileWriteRequest {
    pub message: String,
    pub content: String,
    /// Present for updates, absent for creates
    pub sha: Option<String>,
}

/// Commit produced by a file write
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FileCommit {
    pub content_sha: Option<String>,
    pub commit_sha: Option<String>,
}

/// Configuration for API clients
#[derive(Debug, Clone)]
pub struct ApiClientConfig {
    /// Base URL for the API
    pub base_url: String,
    /// Access token for authentication
    pub access_token: Option<String>,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    /// User agent string
    pub user_agent: String,
}

impl Default for ApiClientConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.github.com".to_string(),
            access_token: None,
            timeout_seconds: 30,
            user_agent: format!("repoman/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ApiClientConfig {
    /// Configuration for api.github.com; an empty token means unauthenticated
    pub fn github(access_token: Option<String>) -> Self {
        Self {
            access_token: access_token.filter(|t| !t.is_empty()),
            ..Default::default()
        }
    }

    /// Build from the `[github]` section of the configuration file
    pub fn from_settings(settings: &repoman_core::GitHubConfig, access_token: Option<String>) -> Self {
        Self {
            base_url: settings.api_url.clone(),
            access_token: access_token.filter(|t| !t.is_empty()),
            timeout_seconds: settings.timeout_seconds,
            user_agent: settings.user_agent.clone(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

/// The GitHub operations the discovery, issue and file modules rely on
#[async_trait]
pub trait GitHubApi: Send + Sync {
    /// Look up a single repository; a missing repository is `NotFound`
    async fn get_repository(&self, owner: &str, repo: &str) -> RepomanResult<RepositoryRef>;

    /// One page of the repositories held by an organization or user
    async fn list_repositories(
        &self,
        owner: &Owner,
        page: PageRequest,
    ) -> RepomanResult<Page<RepositoryRef>>;

    /// One page of the issue listing (state=all), pull requests included
    async fn list_issues(
        &self,
        owner: &str,
        repo: &str,
        page: PageRequest,
    ) -> RepomanResult<Page<IssueRecord>>;

    /// Read a file; a missing file is `NotFound`
    async fn get_file(&self, owner: &str, repo: &str, path: &str) -> RepomanResult<FileContent>;

    /// Create the file, or update it when `request.sha` is set
    async fn put_file(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        request: &FileWriteRequest,
    ) -> RepomanResult<FileCommit>;
}

/// Helper function to create HTTP client with common configuration
pub(crate) fn create_http_client(config: &ApiClientConfig) -> RepomanResult<reqwest::Client> {
    let mut headers = reqwest::header::HeaderMap::new();

    headers.insert(
        reqwest::header::USER_AGENT,
        reqwest::header::HeaderValue::from_str(&config.user_agent).map_err(|e| {
            RepomanError::Config {
                message: format!("Invalid user agent: {}", e),
                source: Some(Box::new(e)),
                context: ErrorContext::new("http_client").with_operation("create_client"),
            }
        })?,
    );
    headers.insert(
        reqwest::header::ACCEPT,
        reqwest::header::HeaderValue::from_static("application/vnd.github+json"),
    );
    headers.insert(
        "X-GitHub-Api-Version",
        reqwest::header::HeaderValue::from_static("2022-11-28"),
    );

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(config.timeout_seconds))
        .default_headers(headers)
        .build()
        .map_err(|e| RepomanError::Network {
            message: format!("Failed to create HTTP client: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("http_client").with_operation("create_client"),
        })?;

    Ok(client)
}

/// Map a non-success response onto the error taxonomy
pub(crate) async fn handle_response_error(
    response: reqwest::Response,
    operation: &str,
) -> RepomanError {
    let status = response.status();
    let url = response.url().clone();
    let headers = response.headers().clone();

    let error_body = response.text().await.unwrap_or_default();
    let detail = if error_body.is_empty() {
        status.canonical_reason().unwrap_or("Unknown error").to_string()
    } else {
        error_body
    };

    let context = ErrorContext::new("github_api_client")
        .with_operation(operation)
        .with_metadata("url", url.as_str())
        .with_metadata("status", &status.as_u16().to_string());

    let header_u64 = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok())
    };

    match status.as_u16() {
        401 => RepomanError::Authentication {
            message: format!("HTTP 401 for {}: {}", url, detail),
            context: context.with_suggestion("Check your access token"),
        },
        403 | 429 if header_u64("x-ratelimit-remaining") == Some(0) => {
            let retry_after_ms = header_u64("x-ratelimit-reset").map(|reset| {
                let now = std::time::SystemTime::now()
                    .duration_since(std::time::UNIX_EPOCH)
                    .map(|d| d.as_secs())
                    .unwrap_or(0);
                reset.saturating_sub(now) * 1000
            });
            RepomanError::RateLimit {
                message: format!("HTTP {} for {}: {}", status.as_u16(), url, detail),
                retry_after_ms,
                context: context
                    .with_suggestion("Wait for the rate limit window to reset")
                    .with_suggestion("Authenticated requests get a higher limit"),
            }
        }
        404 => RepomanError::NotFound {
            resource: url.path().to_string(),
            context: context.with_suggestion("Repository or file not found or not accessible"),
        },
        code => RepomanError::Repository {
            message: format!("HTTP {} error for {}: {}", code, url, detail),
            source: None,
            context: context.with_suggestion(match code {
                403 => "Check repository permissions",
                409 | 422 => "The file changed upstream; re-run to pick up the new revision",
                _ => "Check network connectivity and API status",
            }),
        },
    }
}
