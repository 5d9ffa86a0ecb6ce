//! Issue statistics for a single repository

use repoman_core::{IssueStats, RepomanResult};
use tracing::debug;

use crate::api::{GitHubApi, PageRequest};

/// Count every issue of `owner/repo`, pull requests excluded
///
/// The repository is looked up first; a missing repository is an error rather
/// than an empty result.
pub async fn fetch_issue_stats(
    api: &dyn GitHubApi,
    owner: &str,
    repo: &str,
    page_size: u32,
) -> RepomanResult<IssueStats> {
    api.get_repository(owner, repo).await?;

    let mut stats = IssueStats::new(repo);
    let mut pull_requests = 0usize;
    let mut request = PageRequest::first(page_size);

    loop {
        let page = api.list_issues(owner, repo, request).await?;

        for issue in &page.items {
            if issue.is_pull_request {
                pull_requests += 1;
                continue;
            }
            stats.record(&issue.state);
        }

        match page.next_page {
            Some(next) => request.page = next,
            None => break,
        }
    }

    debug!(
        owner,
        repo,
        total = stats.total_issues,
        open = stats.open_issues,
        closed = stats.closed_issues,
        skipped_pull_requests = pull_requests,
        "Collected issue statistics"
    );

    Ok(stats)
}
