//! Core data type definitions

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of GitHub account that owns repositories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OwnerKind {
    Organization,
    User,
}

impl OwnerKind {
    pub fn label(&self) -> &'static str {
        match self {
            OwnerKind::Organization => "organization",
            OwnerKind::User => "user",
        }
    }
}

/// A GitHub organization or user account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    pub name: String,
    pub kind: OwnerKind,
}

impl Owner {
    pub fn organization(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: OwnerKind::Organization,
        }
    }

    pub fn user(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: OwnerKind::User,
        }
    }

    pub fn is_user(&self) -> bool {
        self.kind == OwnerKind::User
    }
}

impl fmt::Display for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} '{}'", self.kind.label(), self.name)
    }
}

/// A repository name under an [`Owner`], as produced by discovery
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryRef {
    pub name: String,
}

impl RepositoryRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Issue counts for one repository, pull requests excluded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueStats {
    pub repo_name: String,
    pub total_issues: usize,
    pub open_issues: usize,
    pub closed_issues: usize,
}

impl IssueStats {
    pub fn new(repo_name: impl Into<String>) -> Self {
        Self {
            repo_name: repo_name.into(),
            total_issues: 0,
            open_issues: 0,
            closed_issues: 0,
        }
    }

    /// Count one issue. Only the exact state `"open"` counts as open.
    pub fn record(&mut self, state: &str) {
        self.total_issues += 1;
        if state == "open" {
            self.open_issues += 1;
        } else {
            self.closed_issues += 1;
        }
    }

    pub fn is_clean(&self) -> bool {
        self.total_issues == 0
    }
}

/// Whether a file write committed a new file or replaced an existing one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpsertAction {
    Created,
    Updated,
}

/// Result of writing a file into one repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileUpsertOutcome {
    pub repo_name: String,
    pub path: String,
    pub action: UpsertAction,
    pub commit_sha: Option<String>,
}

/// Success and failure name lists of a file-write batch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchPartition {
    pub succeeded: Vec<String>,
    pub failed: Vec<String>,
}

impl BatchPartition {
    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}
