//! Unified error handling system
//!
//! Provides structured error types with context, recovery suggestions, and proper error chaining

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, warn};

use crate::logging::Logger;

pub type RepomanResult<T> = Result<T, Box<RepomanError>>;

/// Error context providing additional information for debugging and recovery
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorContext {
    /// Unique error ID for tracking
    pub error_id: String,
    /// Timestamp when error occurred
    pub timestamp: DateTime<Utc>,
    /// Component where error originated
    pub component: String,
    /// Operation being performed when error occurred
    pub operation: Option<String>,
    /// Additional metadata (owner, repo, path, page, ...)
    pub metadata: std::collections::HashMap<String, String>,
    /// Recovery suggestions
    pub recovery_suggestions: Vec<String>,
}

impl ErrorContext {
    pub fn new(component: &str) -> Self {
        Self {
            error_id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            component: component.to_string(),
            operation: None,
            metadata: std::collections::HashMap::new(),
            recovery_suggestions: Vec::new(),
        }
    }

    pub fn with_operation(mut self, operation: &str) -> Self {
        self.operation = Some(operation.to_string());
        self
    }

    pub fn with_metadata(mut self, key: &str, value: &str) -> Self {
        self.metadata.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_suggestion(mut self, suggestion: &str) -> Self {
        self.recovery_suggestions.push(suggestion.to_string());
        self
    }

    /// Attach owner and repository name in one go
    pub fn with_repo(self, owner: &str, repo: &str) -> Self {
        self.with_metadata("owner", owner).with_metadata("repo", repo)
    }
}

/// Main error type for repoman
#[derive(Error, Debug)]
pub enum RepomanError {
    #[error("Repository error: {message}")]
    Repository {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },

    #[error("Discovery error: {message}")]
    Discovery {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },

    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },

    #[error("Network error: {message}")]
    Network {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },

    #[error("Authentication error: {message}")]
    Authentication {
        message: String,
        context: ErrorContext,
    },

    #[error("Validation error: {message}")]
    Validation {
        message: String,
        field: Option<String>,
        context: ErrorContext,
    },

    #[error("Resource not found: {resource}")]
    NotFound {
        resource: String,
        context: ErrorContext,
    },

    #[error("Rate limit exceeded: {message}")]
    RateLimit {
        message: String,
        retry_after_ms: Option<u64>,
        context: ErrorContext,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },
}

impl RepomanError {
    /// Get the error context
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            RepomanError::Repository { context, .. } => Some(context),
            RepomanError::Discovery { context, .. } => Some(context),
            RepomanError::Config { context, .. } => Some(context),
            RepomanError::Network { context, .. } => Some(context),
            RepomanError::Authentication { context, .. } => Some(context),
            RepomanError::Validation { context, .. } => Some(context),
            RepomanError::NotFound { context, .. } => Some(context),
            RepomanError::RateLimit { context, .. } => Some(context),
            RepomanError::Internal { context, .. } => Some(context),
            RepomanError::Io(_) => None,
        }
    }

    pub fn context_mut(&mut self) -> Option<&mut ErrorContext> {
        match self {
            RepomanError::Repository { context, .. } => Some(context),
            RepomanError::Discovery { context, .. } => Some(context),
            RepomanError::Config { context, .. } => Some(context),
            RepomanError::Network { context, .. } => Some(context),
            RepomanError::Authentication { context, .. } => Some(context),
            RepomanError::Validation { context, .. } => Some(context),
            RepomanError::NotFound { context, .. } => Some(context),
            RepomanError::RateLimit { context, .. } => Some(context),
            RepomanError::Internal { context, .. } => Some(context),
            RepomanError::Io(_) => None,
        }
    }

    /// Attach owner and repository metadata to an error raised further down
    pub fn annotate(mut self: Box<Self>, owner: &str, repo: &str) -> Box<Self> {
        if let Some(context) = self.context_mut() {
            context
                .metadata
                .entry("owner".to_string())
                .or_insert_with(|| owner.to_string());
            context
                .metadata
                .entry("repo".to_string())
                .or_insert_with(|| repo.to_string());
        }
        self
    }

    /// Whether the upstream reported the resource as missing (HTTP 404)
    pub fn is_not_found(&self) -> bool {
        matches!(self, RepomanError::NotFound { .. })
    }

    /// Recovery suggestions carried by the context, if any
    pub fn suggestions(&self) -> &[String] {
        self.context()
            .map(|c| c.recovery_suggestions.as_slice())
            .unwrap_or(&[])
    }

    /// Log the error through `logger` with a level fitting the variant
    pub fn log(&self, logger: &Logger) {
        logger.in_scope(|| self.log_current());
    }

    fn log_current(&self) {
        let error_id = self.context().map(|c| c.error_id.as_str());
        let repo = self
            .context()
            .and_then(|c| c.metadata.get("repo"))
            .map(String::as_str);

        match self {
            RepomanError::Internal { .. } => {
                error!(error_id = ?error_id, repo = ?repo, error = %self, "Internal error occurred");
            }
            RepomanError::Config { .. } | RepomanError::Validation { .. } => {
                error!(
                    error_id = ?error_id,
                    error = %self,
                    "Configuration or validation error"
                );
            }
            RepomanError::Network { .. } | RepomanError::RateLimit { .. } => {
                warn!(
                    error_id = ?error_id,
                    repo = ?repo,
                    error = %self,
                    "Network or rate limit error"
                );
            }
            _ => {
                error!(error_id = ?error_id, repo = ?repo, error = %self, "Error occurred");
            }
        }
    }
}

/// Convenience macros for creating errors with context
#[macro_export]
macro_rules! repository_error {
    ($msg:expr, $component:expr) => {
        $crate::RepomanError::Repository {
            message: $msg.to_string(),
            source: None,
            context: $crate::ErrorContext::new($component),
        }
    };
    ($msg:expr, $component:expr, $source:expr) => {
        $crate::RepomanError::Repository {
            message: $msg.to_string(),
            source: Some(Box::new($source)),
            context: $crate::ErrorContext::new($component),
        }
    };
}

#[macro_export]
macro_rules! config_error {
    ($msg:expr, $component:expr) => {
        $crate::RepomanError::Config {
            message: $msg.to_string(),
            source: None,
            context: $crate::ErrorContext::new($component)
                .with_suggestion("Check your configuration file")
                .with_suggestion("Run 'repoman config --init' to create default config"),
        }
    };
}

#[macro_export]
macro_rules! validation_error {
    ($msg:expr, $field:expr, $component:expr) => {
        $crate::RepomanError::Validation {
            message: $msg.to_string(),
            field: Some($field.to_string()),
            context: $crate::ErrorContext::new($component)
                .with_suggestion("Check the command line flags"),
        }
    };
}

#[macro_export]
macro_rules! not_found_error {
    ($resource:expr, $component:expr) => {
        $crate::RepomanError::NotFound {
            resource: $resource.to_string(),
            context: $crate::ErrorContext::new($component)
                .with_suggestion("Verify the owner and repository names")
                .with_suggestion("Check that the token can access the repository"),
        }
    };
}
