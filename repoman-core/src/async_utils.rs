//! Async utilities and patterns
//!
//! Bounded fan-out/fan-in over a batch of repositories. Every repository gets
//! its own task; a semaphore caps how many of them run the operation at once,
//! and the collector drains exactly one completion per dispatched task.
//!
//! Two aggregation policies sit on top of [`BatchExecutor::execute`]:
//!
//! | Method | Failures |
//! |--------|----------|
//! | [`BatchExecutor::collect_successes`] | logged, dropped from the result |
//! | [`BatchExecutor::partition`] | kept, by name, in a separate list |

use crate::error::{ErrorContext, RepomanError, RepomanResult};
use crate::logging::Logger;
use crate::types::BatchPartition;
use futures::FutureExt;
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, warn};

/// Concurrency used when the requested value is zero or negative
pub const DEFAULT_CONCURRENCY: usize = 10;

/// Coerce a requested concurrency into a usable slot count
///
/// Values above the semaphore capacity are capped at [`Semaphore::MAX_PERMITS`].
pub fn normalize_concurrency(requested: i64) -> usize {
    if requested <= 0 {
        DEFAULT_CONCURRENCY
    } else {
        usize::try_from(requested)
            .unwrap_or(Semaphore::MAX_PERMITS)
            .min(Semaphore::MAX_PERMITS)
    }
}

/// Outcome of one repository's operation
#[derive(Debug)]
pub struct BatchEntry<T> {
    pub repo_name: String,
    pub result: RepomanResult<T>,
}

/// Runs one operation per repository name with at most `max_concurrency` in flight
#[derive(Debug, Clone)]
pub struct BatchExecutor {
    max_concurrency: usize,
    logger: Logger,
}

impl BatchExecutor {
    pub fn new(max_concurrency: i64, logger: Logger) -> Self {
        let normalized = normalize_concurrency(max_concurrency);
        if max_concurrency <= 0 {
            logger.in_scope(|| {
                warn!(
                    provided = max_concurrency,
                    default = DEFAULT_CONCURRENCY,
                    "Invalid concurrency value, using default"
                );
            });
        }

        Self {
            max_concurrency: normalized,
            logger,
        }
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    /// Run `operation` once per name and return every outcome in completion order
    pub async fn execute<T, F, Fut>(&self, repo_names: Vec<String>, operation: F) -> Vec<BatchEntry<T>>
    where
        T: Send + 'static,
        F: Fn(String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = RepomanResult<T>> + Send + 'static,
    {
        let total = repo_names.len();
        let semaphore = Arc::new(Semaphore::new(self.max_concurrency));
        let operation = Arc::new(operation);
        let mut join_set = JoinSet::new();

        for repo_name in repo_names {
            let semaphore = Arc::clone(&semaphore);
            let operation = Arc::clone(&operation);

            let task = async move {
                // Held until the task returns, whichever way it exits
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(e) => {
                        let err = RepomanError::Internal {
                            message: format!("Failed to acquire batch slot: {}", e),
                            source: Some(Box::new(e)),
                            context: ErrorContext::new("batch_executor")
                                .with_operation("acquire")
                                .with_metadata("repo", &repo_name),
                        };
                        return (repo_name, Err(Box::new(err)));
                    }
                };

                let name = repo_name.clone();
                let outcome = AssertUnwindSafe(async move { operation(name).await })
                    .catch_unwind()
                    .await;

                let result = match outcome {
                    Ok(result) => result,
                    Err(payload) => Err(Box::new(RepomanError::Internal {
                        message: format!("Operation panicked: {}", panic_message(payload.as_ref())),
                        source: None,
                        context: ErrorContext::new("batch_executor")
                            .with_operation("execute")
                            .with_metadata("repo", &repo_name),
                    })),
                };

                (repo_name, result)
            };

            join_set.spawn(self.logger.scope(task));
        }

        let mut entries = Vec::with_capacity(total);
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((repo_name, result)) => {
                    self.logger.in_scope(|| {
                        debug!(
                            repo = %repo_name,
                            ok = result.is_ok(),
                            completed = entries.len() + 1,
                            total,
                            "Repository operation finished"
                        );
                    });
                    entries.push(BatchEntry { repo_name, result });
                }
                Err(join_error) => {
                    // Panics are caught inside the task, so this only fires on runtime shutdown
                    self.logger.in_scope(|| {
                        error!(error = %join_error, "Batch task did not complete");
                    });
                }
            }
        }

        entries
    }

    /// Issue-count policy: keep successes, log and drop failures
    pub async fn collect_successes<T, F, Fut>(&self, repo_names: Vec<String>, operation: F) -> Vec<T>
    where
        T: Send + 'static,
        F: Fn(String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = RepomanResult<T>> + Send + 'static,
    {
        if repo_names.is_empty() {
            return Vec::new();
        }

        let entries = self.execute(repo_names, operation).await;

        self.logger.in_scope(|| {
            entries
                .into_iter()
                .filter_map(|entry| match entry.result {
                    Ok(value) => Some(value),
                    Err(err) => {
                        error!(repo = %entry.repo_name, error = %err, "Error processing repository");
                        None
                    }
                })
                .collect()
        })
    }

    /// File-write policy: every name lands in exactly one of the two lists
    pub async fn partition<T, F, Fut>(&self, repo_names: Vec<String>, operation: F) -> BatchPartition
    where
        T: Send + 'static,
        F: Fn(String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = RepomanResult<T>> + Send + 'static,
    {
        let entries = self.execute(repo_names, operation).await;
        let mut partition = BatchPartition::default();

        self.logger.in_scope(|| {
            for entry in entries {
                match entry.result {
                    Ok(_) => partition.succeeded.push(entry.repo_name),
                    Err(err) => {
                        error!(repo = %entry.repo_name, error = %err, "Repository operation failed");
                        partition.failed.push(entry.repo_name);
                    }
                }
            }
        });

        partition
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
