//! Create-or-update of a single file through the contents API
//!
//! The write is two round trips: read the current file to learn its blob SHA,
//! then write with that SHA (update) or without one (create). Nothing guards
//! the gap between them; if the file changes in between, the upstream rejects
//! the stale SHA and the write fails.

use repoman_core::{FileUpsertOutcome, RepomanResult, UpsertAction};
use tracing::debug;

use crate::api::{FileWriteRequest, GitHubApi};

/// Write `content` to `path` in `owner/repo`
pub async fn upsert_file(
    api: &dyn GitHubApi,
    owner: &str,
    repo: &str,
    path: &str,
    content: &str,
    message: &str,
) -> RepomanResult<FileUpsertOutcome> {
    let existing_sha = match api.get_file(owner, repo, path).await {
        Ok(file) => Some(file.sha),
        Err(err) if err.is_not_found() => None,
        Err(err) => return Err(err),
    };

    let action = if existing_sha.is_some() {
        UpsertAction::Updated
    } else {
        UpsertAction::Created
    };
    debug!(owner, repo, path, ?action, "Writing file");

    let request = FileWriteRequest {
        message: message.to_string(),
        content: content.to_string(),
        sha: existing_sha,
    };
    let commit = api.put_file(owner, repo, path, &request).await?;

    Ok(FileUpsertOutcome {
        repo_name: repo.to_string(),
        path: path.to_string(),
        action,
        commit_sha: commit.commit_sha,
    })
}
