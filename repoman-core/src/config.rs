//! Configuration management

use crate::error::{ErrorContext, RepomanError, RepomanResult};
use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Largest page size the GitHub REST API accepts
pub const MAX_PAGE_SIZE: u32 = 100;

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RepomanConfig {
    pub github: GitHubConfig,
    pub batch: BatchConfig,
    pub codeowners: CodeownersConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    /// REST API base URL
    pub api_url: String,
    /// Per-request timeout
    pub timeout_seconds: u64,
    pub user_agent: String,
    /// Environment variable consulted when no token flag is given
    pub token_env: String,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.github.com".to_string(),
            timeout_seconds: 30,
            user_agent: format!("repoman/{}", env!("CARGO_PKG_VERSION")),
            token_env: "GITHUB_TOKEN".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Concurrency used when the command line does not set one
    pub concurrency: i64,
    /// Items requested per page when listing repositories and issues
    pub page_size: u32,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            concurrency: 1,
            page_size: MAX_PAGE_SIZE,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CodeownersConfig {
    /// Target path inside each repository
    pub path: String,
    pub commit_message: String,
}

impl Default for CodeownersConfig {
    fn default() -> Self {
        Self {
            path: ".github/CODEOWNERS".to_string(),
            commit_message: "Add/Update CODEOWNERS file".to_string(),
        }
    }
}

impl RepomanConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> RepomanResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| RepomanError::Config {
            message: format!("Failed to read config file: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("read_file")
                .with_suggestion("Check if the config file exists and is readable"),
        })?;

        let config: RepomanConfig = toml::from_str(&content).map_err(|e| RepomanError::Config {
            message: format!("Failed to parse config: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("parse_toml")
                .with_suggestion("Check TOML syntax in config file"),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file, creating parent directories
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> RepomanResult<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self).map_err(|e| RepomanError::Config {
            message: format!("Failed to serialize config: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config").with_operation("serialize_toml"),
        })?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(RepomanError::from)?;
        }

        std::fs::write(path, content).map_err(|e| RepomanError::Config {
            message: format!("Failed to write config file: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("write_file")
                .with_suggestion("Check if the directory exists and is writable"),
        })?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> RepomanResult<()> {
        if self.github.api_url.trim().is_empty() {
            return Err(invalid("github.api_url must not be empty", "Set github.api_url"));
        }

        if self.github.timeout_seconds == 0 {
            return Err(invalid(
                "github.timeout_seconds must be greater than 0",
                "Set github.timeout_seconds to a positive value",
            ));
        }

        if self.batch.page_size == 0 || self.batch.page_size > MAX_PAGE_SIZE {
            return Err(invalid(
                &format!("batch.page_size must be between 1 and {}", MAX_PAGE_SIZE),
                "Set batch.page_size to 100",
            ));
        }

        if self.codeowners.path.trim().is_empty() {
            return Err(invalid(
                "codeowners.path must not be empty",
                "Set codeowners.path to .github/CODEOWNERS",
            ));
        }

        if self.codeowners.commit_message.trim().is_empty() {
            return Err(invalid(
                "codeowners.commit_message must not be empty",
                "Set codeowners.commit_message",
            ));
        }

        Ok(())
    }
}

fn invalid(message: &str, suggestion: &str) -> Box<RepomanError> {
    Box::new(RepomanError::Config {
        message: message.to_string(),
        source: None,
        context: ErrorContext::new("config")
            .with_operation("validate")
            .with_suggestion(suggestion),
    })
}
