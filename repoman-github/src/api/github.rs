//! GitHub API client implementation

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use repoman_core::{ErrorContext, Owner, OwnerKind, RepomanError, RepomanResult, RepositoryRef};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::pagination::next_page;
use super::{
    create_http_client, handle_response_error, ApiClientConfig, FileCommit, FileContent,
    FileWriteRequest, GitHubApi, IssueRecord, Page, PageRequest,
};

/// GitHub API client
pub struct GitHubApiClient {
    client: reqwest::Client,
    config: ApiClientConfig,
}

/// GitHub repository response
#[derive(Debug, Deserialize)]
struct GitHubRepository {
    name: String,
}

impl From<GitHubRepository> for RepositoryRef {
    fn from(repo: GitHubRepository) -> Self {
        RepositoryRef::new(repo.name)
    }
}

/// GitHub issue listing entry
#[derive(Debug, Deserialize)]
struct GitHubIssue {
    state: String,
    /// Only present on pull requests
    #[serde(default)]
    pull_request: Option<serde_json::Value>,
}

/// GitHub content response
#[derive(Debug, Deserialize)]
struct GitHubContentResponse {
    path: String,
    sha: String,
}

/// Body of a create-or-update contents call
#[derive(Debug, Serialize)]
struct GitHubPutContentRequest<'a> {
    message: &'a str,
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct GitHubPutContentResponse {
    content: Option<GitHubShaRef>,
    commit: Option<GitHubShaRef>,
}

#[derive(Debug, Deserialize)]
struct GitHubShaRef {
    sha: Option<String>,
}

impl GitHubApiClient {
    /// Create a new GitHub API client
    pub fn new(config: ApiClientConfig) -> RepomanResult<Self> {
        let client = create_http_client(&config)?;

        if config.access_token.is_none() {
            warn!("No GitHub token provided, requests are subject to unauthenticated rate limits");
        }
        info!(base_url = %config.base_url, "Created GitHub API client");

        Ok(Self { client, config })
    }

    /// Create authorization headers
    fn create_auth_headers(&self) -> reqwest::header::HeaderMap {
        let mut headers = reqwest::header::HeaderMap::new();

        if let Some(ref token) = self.config.access_token {
            if let Ok(auth_value) =
                reqwest::header::HeaderValue::from_str(&format!("Bearer {}", token))
            {
                headers.insert(reqwest::header::AUTHORIZATION, auth_value);
            }
        }

        headers
    }

    fn url(&self, endpoint: &str) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        )
    }

    fn request_error(e: reqwest::Error, operation: &str) -> Box<RepomanError> {
        let message = format!("Failed to make request to GitHub API: {}", e);
        let context = ErrorContext::new("github_api_client").with_operation(operation);
        let err = if e.is_timeout() || e.is_connect() {
            RepomanError::Network {
                message,
                source: Some(Box::new(e)),
                context: context.with_suggestion("Check network connectivity and API status"),
            }
        } else {
            RepomanError::Repository {
                message,
                source: Some(Box::new(e)),
                context,
            }
        };
        Box::new(err)
    }

    /// Make a GET request to GitHub API
    async fn get_request(
        &self,
        endpoint: &str,
        query: &[(&str, String)],
        operation: &str,
    ) -> RepomanResult<reqwest::Response> {
        let url = self.url(endpoint);
        debug!(url = %url, ?query, "Making GitHub API request");

        let response = self
            .client
            .get(&url)
            .query(query)
            .headers(self.create_auth_headers())
            .send()
            .await
            .map_err(|e| Self::request_error(e, operation))?;

        if !response.status().is_success() {
            return Err(Box::new(handle_response_error(response, operation).await));
        }

        Ok(response)
    }

    async fn parse_json<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
        operation: &str,
    ) -> RepomanResult<T> {
        response.json().await.map_err(|e| {
            Box::new(RepomanError::Repository {
                message: format!("Failed to parse GitHub response: {}", e),
                source: Some(Box::new(e)),
                context: ErrorContext::new("github_api_client").with_operation(operation),
            })
        })
    }
}

fn page_query(page: PageRequest) -> Vec<(&'static str, String)> {
    vec![
        ("per_page", page.per_page.to_string()),
        ("page", page.page.to_string()),
    ]
}

fn contents_endpoint(owner: &str, repo: &str, path: &str) -> String {
    let encoded_path = path
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/");
    format!(
        "repos/{}/{}/contents/{}",
        urlencoding::encode(owner),
        urlencoding::encode(repo),
        encoded_path
    )
}

#[async_trait]
impl GitHubApi for GitHubApiClient {
    async fn get_repository(&self, owner: &str, repo: &str) -> RepomanResult<RepositoryRef> {
        debug!(owner, repo, "Fetching GitHub repository");

        let endpoint = format!(
            "repos/{}/{}",
            urlencoding::encode(owner),
            urlencoding::encode(repo)
        );
        let response = self
            .get_request(&endpoint, &[], "get_repository")
            .await
            .map_err(|e| e.annotate(owner, repo))?;
        let github_repo: GitHubRepository = Self::parse_json(response, "get_repository")
            .await
            .map_err(|e| e.annotate(owner, repo))?;

        Ok(github_repo.into())
    }

    async fn list_repositories(
        &self,
        owner: &Owner,
        page: PageRequest,
    ) -> RepomanResult<Page<RepositoryRef>> {
        let mut query = page_query(page);
        let endpoint = match owner.kind {
            OwnerKind::Organization => {
                query.push(("type", "all".to_string()));
                format!("orgs/{}/repos", urlencoding::encode(&owner.name))
            }
            OwnerKind::User => format!("users/{}/repos", urlencoding::encode(&owner.name)),
        };

        let response = self
            .get_request(&endpoint, &query, "list_repositories")
            .await?;
        let next_page = next_page(response.headers());
        let repos: Vec<GitHubRepository> = Self::parse_json(response, "list_repositories")
            .await
            .map_err(|mut e| {
                if let Some(context) = e.context_mut() {
                    context.metadata.insert("owner".to_string(), owner.name.clone());
                }
                e
            })?;

        debug!(
            owner = %owner.name,
            page = page.page,
            count = repos.len(),
            ?next_page,
            "Fetched repository page"
        );

        Ok(Page {
            items: repos.into_iter().map(RepositoryRef::from).collect(),
            next_page,
        })
    }

    async fn list_issues(
        &self,
        owner: &str,
        repo: &str,
        page: PageRequest,
    ) -> RepomanResult<Page<IssueRecord>> {
        let mut query = page_query(page);
        query.push(("state", "all".to_string()));
        let endpoint = format!(
            "repos/{}/{}/issues",
            urlencoding::encode(owner),
            urlencoding::encode(repo)
        );

        let response = self
            .get_request(&endpoint, &query, "list_issues")
            .await
            .map_err(|e| e.annotate(owner, repo))?;
        let next_page = next_page(response.headers());
        let issues: Vec<GitHubIssue> = Self::parse_json(response, "list_issues")
            .await
            .map_err(|e| e.annotate(owner, repo))?;

        Ok(Page {
            items: issues
                .into_iter()
                .map(|issue| IssueRecord {
                    state: issue.state,
                    is_pull_request: issue.pull_request.is_some(),
                })
                .collect(),
            next_page,
        })
    }

    async fn get_file(&self, owner: &str, repo: &str, path: &str) -> RepomanResult<FileContent> {
        debug!(owner, repo, path, "Fetching file contents");

        let response = self
            .get_request(&contents_endpoint(owner, repo, path), &[], "get_file")
            .await
            .map_err(|e| e.annotate(owner, repo))?;
        let file: GitHubContentResponse = Self::parse_json(response, "get_file")
            .await
            .map_err(|e| e.annotate(owner, repo))?;

        Ok(FileContent {
            path: file.path,
            sha: file.sha,
        })
    }

    async fn put_file(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        request: &FileWriteRequest,
    ) -> RepomanResult<FileCommit> {
        let url = self.url(&contents_endpoint(owner, repo, path));
        let body = GitHubPutContentRequest {
            message: &request.message,
            content: BASE64.encode(request.content.as_bytes()),
            sha: request.sha.as_deref(),
        };

        debug!(url = %url, update = request.sha.is_some(), "Writing file contents");

        let response = self
            .client
            .put(&url)
            .headers(self.create_auth_headers())
            .json(&body)
            .send()
            .await
            .map_err(|e| Self::request_error(e, "put_file").annotate(owner, repo))?;

        if !response.status().is_success() {
            let err = Box::new(handle_response_error(response, "put_file").await);
            return Err(err.annotate(owner, repo));
        }

        let written: GitHubPutContentResponse = Self::parse_json(response, "put_file")
            .await
            .map_err(|e| e.annotate(owner, repo))?;

        Ok(FileCommit {
            content_sha: written.content.and_then(|c| c.sha),
            commit_sha: written.commit.and_then(|c| c.sha),
        })
    }
}
