//! Repository discovery
//!
//! Walks every page of an owner's repository listing and keeps the names that
//! start with the requested prefix. A failure on any page aborts the walk, so a
//! caller never sees a partial owner listing.

use repoman_core::{ErrorContext, Owner, RepomanError, RepomanResult, RepositoryRef};
use tracing::debug;

use crate::api::{GitHubApi, PageRequest};

/// List the owner's repositories whose names start with `prefix`
///
/// `None` and `Some("")` both match every repository. Matches keep the order
/// in which the upstream listing returned them.
pub async fn discover_repositories(
    api: &dyn GitHubApi,
    owner: &Owner,
    prefix: Option<&str>,
    page_size: u32,
) -> RepomanResult<Vec<RepositoryRef>> {
    let prefix = prefix.unwrap_or("");
    let mut matches = Vec::new();
    let mut request = PageRequest::first(page_size);

    loop {
        let page = api
            .list_repositories(owner, request)
            .await
            .map_err(|err| discovery_failure(owner, request.page, err))?;

        let before = matches.len();
        matches.extend(
            page.items
                .into_iter()
                .filter(|repo| repo.name.starts_with(prefix)),
        );
        debug!(
            owner = %owner.name,
            page = request.page,
            matched = matches.len() - before,
            "Scanned repository page"
        );

        match page.next_page {
            Some(next) => request.page = next,
            None => break,
        }
    }

    Ok(matches)
}

fn discovery_failure(owner: &Owner, page: u32, err: Box<RepomanError>) -> Box<RepomanError> {
    let mut context = ErrorContext::new("discovery")
        .with_operation("list_repositories")
        .with_metadata("owner", &owner.name)
        .with_metadata("owner_kind", owner.kind.label())
        .with_metadata("page", &page.to_string());
    for suggestion in err.suggestions() {
        context = context.with_suggestion(suggestion);
    }

    Box::new(RepomanError::Discovery {
        message: format!("Failed to list repositories for {} (page {})", owner, page),
        source: Some(err as Box<dyn std::error::Error + Send + Sync>),
        context,
    })
}
