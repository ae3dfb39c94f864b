// Repository file classifier.
// Walks a repository's directory tree breadth-first and keeps files by extension.

use std::collections::VecDeque;

use tracing::{debug, info};

use crate::error::Result;
use crate::github::ContentEntry;
use crate::platform::Platform;

use super::language::has_extension;

/// Collect every non-directory entry in `owner/repo` whose path ends with
/// one of `extensions`, at any depth.
pub async fn collect_files<P: Platform>(
    platform: &mut P,
    owner: &str,
    repo: &str,
    extensions: &[&str],
) -> Result<Vec<ContentEntry>> {
    let mut matched = Vec::new();
    let mut queue: VecDeque<ContentEntry> = platform.contents(owner, repo, "").await?.into();
    let mut directories = 1usize;

    while let Some(entry) = queue.pop_front() {
        if entry.is_dir() {
            debug!(repo, path = %entry.path, "descending into directory");
            queue.extend(platform.contents(owner, repo, &entry.path).await?);
            directories += 1;
        } else if has_extension(&entry.path, extensions) {
            matched.push(entry);
        }
    }

    info!(
        repo,
        directories,
        matched = matched.len(),
        "classified repository files"
    );
    Ok(matched)
}
