//! Repoman GitHub - REST adapter and repository operations
//!
//! This crate provides:
//! - The [`GitHubApi`] trait and its `reqwest` implementation
//! - Prefix-filtered repository discovery across all listing pages
//! - Per-repository issue statistics and file create-or-update
//! - [`RepositoryService`], which runs those operations over a bounded batch

pub mod api;
pub mod contents;
pub mod discovery;
pub mod issues;
pub mod service;

#[cfg(test)]
mod fake;

pub use api::{
    ApiClientConfig, FileCommit, FileContent, FileWriteRequest, GitHubApi, GitHubApiClient,
    IssueRecord, Page, PageRequest,
};
pub use contents::upsert_file;
pub use discovery::discover_repositories;
pub use issues::fetch_issue_stats;
pub use service::{RepositoryService, ServiceOptions};
