//! Integration tests for repoman-core infrastructure

use repoman_core::{
    config_error, not_found_error, repository_error, validation_error, BatchExecutor,
    ErrorContext, IssueStats, Logger, RepomanError, RepomanResult,
};
use std::collections::BTreeSet;
use std::time::Duration;
use tokio::time::sleep;

fn repo_names(count: usize) -> Vec<String> {
    (1..=count).map(|i| format!("repo-{}", i)).collect()
}

/// Fails for the names in `failing`, otherwise returns fresh stats after a short delay
async fn fake_stats(name: String, failing: &'static [&'static str]) -> RepomanResult<IssueStats> {
    sleep(Duration::from_millis(5)).await;
    if failing.contains(&name.as_str()) {
        return Err(Box::new(RepomanError::Repository {
            message: format!("induced failure for {}", name),
            source: None,
            context: ErrorContext::new("test").with_repo("acme", &name),
        }));
    }

    let mut stats = IssueStats::new(&name);
    stats.record("open");
    Ok(stats)
}

#[tokio::test]
async fn test_error_handling() {
    let error = repository_error!("Test repository error", "test_component");

    match &error {
        RepomanError::Repository {
            message, context, ..
        } => {
            assert_eq!(message, "Test repository error");
            assert_eq!(context.component, "test_component");
            assert!(!context.error_id.is_empty());
        }
        _ => panic!("Expected Repository error"),
    }

    // Logging with no subscriber must not panic
    error.log(&Logger::silent());

    let config_err = config_error!("Invalid config", "test");
    assert!(!config_err.is_not_found());
    assert_eq!(config_err.suggestions().len(), 2);
}

#[tokio::test]
async fn test_error_macros() {
    let validation_err = validation_error!("Invalid field value", "org", "validator");
    match validation_err {
        RepomanError::Validation {
            message,
            field,
            context,
        } => {
            assert_eq!(message, "Invalid field value");
            assert_eq!(field, Some("org".to_string()));
            assert_eq!(context.component, "validator");
            assert!(!context.recovery_suggestions.is_empty());
        }
        _ => panic!("Expected Validation error"),
    }

    let not_found_err = not_found_error!("acme/missing", "github_api_client");
    assert!(not_found_err.is_not_found());
    match not_found_err {
        RepomanError::NotFound { resource, .. } => assert_eq!(resource, "acme/missing"),
        _ => panic!("Expected NotFound error"),
    }
}

#[tokio::test]
async fn test_five_repositories_two_failures() {
    const FAILING: &[&str] = &["repo-2", "repo-4"];
    let executor = BatchExecutor::new(2, Logger::silent());

    let stats = executor
        .collect_successes(repo_names(5), |name| fake_stats(name, FAILING))
        .await;
    assert_eq!(stats.len(), 3);
    let names: BTreeSet<_> = stats.iter().map(|s| s.repo_name.clone()).collect();
    assert_eq!(
        names,
        ["repo-1", "repo-3", "repo-5"]
            .iter()
            .map(|s| s.to_string())
            .collect::<BTreeSet<_>>()
    );

    let partition = executor
        .partition(repo_names(5), |name| fake_stats(name, FAILING))
        .await;
    assert_eq!(partition.succeeded.len(), 3);
    assert_eq!(partition.failed.len(), 2);

    let mut all: Vec<_> = partition
        .succeeded
        .iter()
        .chain(partition.failed.iter())
        .cloned()
        .collect();
    all.sort();
    assert_eq!(all, repo_names(5));

    let failed: BTreeSet<_> = partition.failed.iter().map(String::as_str).collect();
    assert_eq!(failed, FAILING.iter().copied().collect::<BTreeSet<_>>());
}

#[tokio::test]
async fn test_results_do_not_depend_on_concurrency() {
    const FAILING: &[&str] = &["repo-3", "repo-7"];
    let mut outcomes = Vec::new();

    for concurrency in [1, 2, 3, 16, 0] {
        let executor = BatchExecutor::new(concurrency, Logger::silent());
        let mut stats = executor
            .collect_successes(repo_names(9), |name| fake_stats(name, FAILING))
            .await;
        stats.sort_by(|a, b| a.repo_name.cmp(&b.repo_name));

        let mut partition = executor
            .partition(repo_names(9), |name| fake_stats(name, FAILING))
            .await;
        partition.succeeded.sort();
        partition.failed.sort();

        outcomes.push((stats, partition));
    }

    for outcome in &outcomes[1..] {
        assert_eq!(outcome, &outcomes[0]);
    }
    assert_eq!(outcomes[0].0.len(), 7);
}

#[test]
fn test_empty_batch_policies() {
    let executor = BatchExecutor::new(4, Logger::silent());

    let stats = tokio_test::block_on(
        executor.collect_successes(Vec::new(), |name| fake_stats(name, &[])),
    );
    assert!(stats.is_empty());

    let partition =
        tokio_test::block_on(executor.partition(Vec::new(), |name| fake_stats(name, &[])));
    assert!(partition.is_empty());
}
