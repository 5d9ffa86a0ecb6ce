//! Command line targeting flags and their validation
//!
//! Everything here runs before any network call.

use clap::Args;
use repoman_core::{validation_error, Owner, RepomanResult};
use std::path::Path;

/// Flags shared by every repository subcommand
#[derive(Args, Debug, Clone, Default)]
pub struct TargetArgs {
    /// GitHub organization name
    #[arg(long)]
    pub org: Option<String>,

    /// GitHub username
    #[arg(long)]
    pub username: Option<String>,

    /// Specific repository name
    #[arg(long)]
    pub repo: Option<String>,

    /// Repository name prefix to filter repositories
    #[arg(long)]
    pub repo_prefix: Option<String>,

    /// GitHub personal access token (falls back to the configured environment variable)
    #[arg(long)]
    pub token: Option<String>,

    /// Maximum number of repositories processed at once (defaults to [batch].concurrency)
    #[arg(long, allow_negative_numbers = true)]
    pub concurrency: Option<i64>,
}

/// Which repositories a command applies to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    /// One named repository, no discovery
    Single(String),
    /// Every repository of the owner, optionally prefix-filtered
    Discover(Option<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub owner: Owner,
    pub scope: Scope,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

impl TargetArgs {
    /// Check the owner and repository flags
    pub fn target(&self) -> RepomanResult<Target> {
        let owner = match (present(&self.org), present(&self.username)) {
            (Some(_), Some(_)) => {
                return Err(Box::new(validation_error!(
                    "cannot specify both --org and --username",
                    "org",
                    "cli"
                )))
            }
            (Some(org), None) => Owner::organization(org),
            (None, Some(username)) => Owner::user(username),
            (None, None) => {
                return Err(Box::new(validation_error!(
                    "either organization (--org) or username (--username) is required",
                    "org",
                    "cli"
                )))
            }
        };

        let scope = match (present(&self.repo), present(&self.repo_prefix)) {
            (Some(_), Some(_)) => {
                return Err(Box::new(validation_error!(
                    "cannot specify both --repo and --repo-prefix",
                    "repo",
                    "cli"
                )))
            }
            (Some(repo), None) => Scope::Single(repo.to_string()),
            (None, prefix) => Scope::Discover(prefix.map(str::to_string)),
        };

        Ok(Target { owner, scope })
    }

    /// The token flag, else the value of `token_env`
    pub fn token(&self, token_env: &str) -> RepomanResult<String> {
        let token = present(&self.token)
            .map(str::to_string)
            .or_else(|| std::env::var(token_env).ok().filter(|t| !t.is_empty()));

        token.ok_or_else(|| {
            Box::new(validation_error!(
                format!(
                    "GitHub token (--token) is required or must be set in {} environment variable",
                    token_env
                ),
                "token",
                "cli"
            ))
        })
    }
}

/// Read the local file that will be uploaded
pub fn read_content_file(path: &Path) -> RepomanResult<String> {
    std::fs::read_to_string(path).map_err(|e| {
        Box::new(validation_error!(
            format!("failed to read CODEOWNERS file {}: {}", path.display(), e),
            "codeowner-file",
            "cli"
        ))
    })
}
