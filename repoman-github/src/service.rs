//! Repository batch service
//!
//! Wires discovery and the per-repository operations to the bounded
//! [`BatchExecutor`]. Issue statistics use the collect-successes policy;
//! file writes use the partition policy so every repository is accounted for.

use repoman_core::{
    log_operation_start, log_operation_success, BatchExecutor, BatchPartition, FileUpsertOutcome,
    IssueStats, Logger, Owner, RepomanConfig, RepomanResult, RepositoryRef, MAX_PAGE_SIZE,
};
use std::sync::Arc;
use tracing::info;

use crate::api::GitHubApi;
use crate::contents::upsert_file;
use crate::discovery::discover_repositories;
use crate::issues::fetch_issue_stats;

/// Tunables of a [`RepositoryService`]
#[derive(Debug, Clone)]
pub struct ServiceOptions {
    /// Requested concurrency; zero or negative falls back to the executor default
    pub concurrency: i64,
    pub page_size: u32,
    pub file_path: String,
    pub commit_message: String,
}

impl Default for ServiceOptions {
    fn default() -> Self {
        Self {
            concurrency: 1,
            page_size: MAX_PAGE_SIZE,
            file_path: ".github/CODEOWNERS".to_string(),
            commit_message: "Add/Update CODEOWNERS file".to_string(),
        }
    }
}

impl ServiceOptions {
    /// Options from configuration; `concurrency` overrides `[batch].concurrency`
    pub fn from_config(config: &RepomanConfig, concurrency: Option<i64>) -> Self {
        Self {
            concurrency: concurrency.unwrap_or(config.batch.concurrency),
            page_size: config.batch.page_size,
            file_path: config.codeowners.path.clone(),
            commit_message: config.codeowners.commit_message.clone(),
        }
    }
}

/// Discovery, issue statistics and file writes against one GitHub API
pub struct RepositoryService {
    api: Arc<dyn GitHubApi>,
    executor: BatchExecutor,
    logger: Logger,
    options: ServiceOptions,
}

impl RepositoryService {
    pub fn new(api: Arc<dyn GitHubApi>, options: ServiceOptions, logger: Logger) -> Self {
        let executor = BatchExecutor::new(options.concurrency, logger.clone());
        Self {
            api,
            executor,
            logger,
            options,
        }
    }

    pub fn options(&self) -> &ServiceOptions {
        &self.options
    }

    pub fn max_concurrency(&self) -> usize {
        self.executor.max_concurrency()
    }

    /// Repositories of `owner` whose names start with `prefix`
    pub async fn discover(
        &self,
        owner: &Owner,
        prefix: Option<&str>,
    ) -> RepomanResult<Vec<RepositoryRef>> {
        self.logger
            .scope(async {
                log_operation_start!("discover", owner = %owner, prefix = prefix.unwrap_or(""));
                let result = discover_repositories(
                    self.api.as_ref(),
                    owner,
                    prefix,
                    self.options.page_size,
                )
                .await;
                if let Ok(repos) = &result {
                    log_operation_success!("discover", owner = %owner, count = repos.len());
                }
                result
            })
            .await
    }

    /// Issue statistics of a single repository
    pub async fn issue_stats(&self, owner: &Owner, repo: &str) -> RepomanResult<IssueStats> {
        self.logger
            .scope(fetch_issue_stats(
                self.api.as_ref(),
                &owner.name,
                repo,
                self.options.page_size,
            ))
            .await
    }

    /// Issue statistics of every matching repository
    ///
    /// Repositories whose statistics cannot be fetched are logged and left
    /// out. Only a discovery failure fails the call.
    pub async fn issue_stats_batch(
        &self,
        owner: &Owner,
        prefix: Option<&str>,
    ) -> RepomanResult<Vec<IssueStats>> {
        let names = self.discover_names(owner, prefix).await?;
        if names.is_empty() {
            return Ok(Vec::new());
        }

        let api = Arc::clone(&self.api);
        let owner_name = owner.name.clone();
        let page_size = self.options.page_size;

        let stats = self
            .executor
            .collect_successes(names, move |repo| {
                let api = Arc::clone(&api);
                let owner_name = owner_name.clone();
                async move { fetch_issue_stats(api.as_ref(), &owner_name, &repo, page_size).await }
            })
            .await;

        self.logger.in_scope(|| {
            log_operation_success!("issue_stats_batch", owner = %owner, collected = stats.len());
        });
        Ok(stats)
    }

    /// Write `content` to the configured path of a single repository
    pub async fn upsert_file(
        &self,
        owner: &Owner,
        repo: &str,
        content: &str,
    ) -> RepomanResult<FileUpsertOutcome> {
        self.logger
            .scope(upsert_file(
                self.api.as_ref(),
                &owner.name,
                repo,
                &self.options.file_path,
                content,
                &self.options.commit_message,
            ))
            .await
    }

    /// Write `content` to the configured path of every matching repository
    pub async fn upsert_file_batch(
        &self,
        owner: &Owner,
        prefix: Option<&str>,
        content: &str,
    ) -> RepomanResult<BatchPartition> {
        let names = self.discover_names(owner, prefix).await?;
        if names.is_empty() {
            return Ok(BatchPartition::default());
        }

        let api = Arc::clone(&self.api);
        let owner_name = owner.name.clone();
        let path: Arc<str> = Arc::from(self.options.file_path.as_str());
        let message: Arc<str> = Arc::from(self.options.commit_message.as_str());
        let content: Arc<str> = Arc::from(content);

        let partition = self
            .executor
            .partition(names, move |repo| {
                let api = Arc::clone(&api);
                let owner_name = owner_name.clone();
                let path = Arc::clone(&path);
                let message = Arc::clone(&message);
                let content = Arc::clone(&content);
                async move {
                    upsert_file(api.as_ref(), &owner_name, &repo, &path, &content, &message).await
                }
            })
            .await;

        self.logger.in_scope(|| {
            log_operation_success!(
                "upsert_file_batch",
                owner = %owner,
                succeeded = partition.succeeded.len(),
                failed = partition.failed.len()
            );
        });
        Ok(partition)
    }

    async fn discover_names(&self, owner: &Owner, prefix: Option<&str>) -> RepomanResult<Vec<String>> {
        if prefix.is_none() {
            self.logger.in_scope(|| {
                info!(owner = %owner, "No repository or prefix given, processing all repositories");
            });
        }

        let repos = self.discover(owner, prefix).await?;
        if repos.is_empty() {
            self.logger.in_scope(|| {
                info!(owner = %owner, prefix = prefix.unwrap_or(""), "No repositories found");
            });
        }

        Ok(repos.into_iter().map(|repo| repo.name).collect())
    }
}
