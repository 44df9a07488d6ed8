//! Staging filename assignment for a batch of URLs

use crate::config::FilenameCollision;
use crate::error::FetchError;
use crate::types::ImageTask;
use crate::utils::hashed_filename;
use std::collections::{HashMap, HashSet};

/// Parse every URL and assign it a staging filename that is unique within the batch
///
/// The result is aligned with `urls`. URLs that cannot be parsed, or whose
/// filename is already claimed by an earlier URL in the batch, come back as
/// errors and are never fetched.
pub(crate) fn plan_tasks<S: AsRef<str>>(
    urls: &[S],
    policy: FilenameCollision,
) -> Vec<Result<ImageTask, FetchError>> {
    let parsed: Vec<Result<ImageTask, FetchError>> = urls
        .iter()
        .map(|url| ImageTask::from_url(url.as_ref()))
        .collect();

    let mut basename_counts: HashMap<String, usize> = HashMap::new();
    for task in parsed.iter().flatten() {
        *basename_counts.entry(task.filename.clone()).or_default() += 1;
    }

    let mut claimed: HashSet<String> = HashSet::new();
    parsed
        .into_iter()
        .zip(urls)
        .map(|(result, url)| -> Result<ImageTask, FetchError> {
            let url: &str = url.as_ref();
            let mut task = result?;

            let shared = basename_counts.get(&task.filename).copied().unwrap_or(0) > 1;
            if shared && policy == FilenameCollision::HashUrl {
                task.filename = hashed_filename(&task.filename, url);
            }

            // Identical URLs hash identically, so the claim check applies to both policies
            if !claimed.insert(task.filename.clone()) {
                return Err(FetchError::FilenameCollision {
                    url: url.to_string(),
                    filename: task.filename,
                });
            }

            Ok(task)
        })
        .collect()
}
