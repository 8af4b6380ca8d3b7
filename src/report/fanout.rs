//! Concurrent per-group report retrieval.
//!
//! Every group is fetched on its own task. All tasks share one deadline,
//! taken when [`run_all`] is entered; when it elapses the shared
//! cancellation token fires and any request still in flight reports
//! [`FetchError::Timeout`]. Results are collected only from the join set, so
//! the success and failure lists are finalised after every task has
//! terminated. Any failure fails the whole run.

use crate::report::window::TimeWindow;
use crate::vendor::{FetchError, GroupId, SummaryFetcher, SummaryRecord};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Every group failure from one run. Never empty.
#[derive(Debug, Error)]
#[error("{}", FailureList(.failures))]
pub struct AggregateError {
    pub failures: Vec<FetchError>,
}

struct FailureList<'a>(&'a [FetchError]);

impl fmt::Display for FailureList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} group fetch(es) failed", self.0.len())?;
        for failure in self.0 {
            write!(f, "\n  {}", failure)?;
        }
        Ok(())
    }
}

pub type RunResult = Result<Vec<SummaryRecord>, AggregateError>;

pub async fn run_all<F>(
    fetcher: Arc<F>,
    groups: &[GroupId],
    window: &TimeWindow,
    timeout: Duration,
) -> RunResult
where
    F: SummaryFetcher + ?Sized + 'static,
{
    run_all_with_cancel(fetcher, groups, window, timeout, &CancellationToken::new()).await
}

/// Like [`run_all`], but `parent` cancellation also cancels every fetch.
pub async fn run_all_with_cancel<F>(
    fetcher: Arc<F>,
    groups: &[GroupId],
    window: &TimeWindow,
    timeout: Duration,
    parent: &CancellationToken,
) -> RunResult
where
    F: SummaryFetcher + ?Sized + 'static,
{
    // A timeout too large for the clock means no shared deadline at all
    let deadline = Instant::now().checked_add(timeout);
    let token = parent.child_token();

    if groups.is_empty() {
        warn!("No groups configured, report will be empty");
        return Ok(Vec::new());
    }

    let mut join_set = JoinSet::new();
    for &group in groups {
        let fetcher = Arc::clone(&fetcher);
        let token = token.clone();
        let window = *window;
        join_set.spawn(async move {
            let result = fetcher.fetch_summary(&window, group, &token).await;
            (group, result)
        });
    }

    info!(groups = groups.len(), timeout = ?timeout, "Fetching group reports");
    if deadline.is_none() {
        warn!(timeout = ?timeout, "Fetch timeout exceeds the clock range, running without a deadline");
    }

    let mut pending: BTreeSet<GroupId> = groups.iter().copied().collect();
    let mut records = Vec::new();
    let mut failures = Vec::new();
    let mut deadline_passed = false;

    loop {
        let joined = match deadline {
            Some(deadline) if !deadline_passed => tokio::select! {
                joined = join_set.join_next() => joined,
                _ = tokio::time::sleep_until(deadline) => {
                    warn!(in_flight = pending.len(), "Fetch deadline exceeded, cancelling remaining requests");
                    deadline_passed = true;
                    token.cancel();
                    continue;
                }
            },
            _ => join_set.join_next().await,
        };

        let Some(joined) = joined else { break };

        match joined {
            Ok((group, Ok(group_records))) => {
                debug!(group_id = group, records = group_records.len(), "Group fetch succeeded");
                pending.remove(&group);
                records.extend(group_records);
            }
            Ok((group, Err(e))) => {
                error!(group_id = group, error = %e, "Group fetch failed");
                pending.remove(&group);
                failures.push(e);
            }
            Err(e) => {
                // Group is recovered from `pending` once the set is drained
                error!(error = %e, "Group fetch task panicked");
            }
        }
    }

    // Join set is empty: every task has terminated.
    failures.extend(pending.into_iter().map(|group| FetchError::Aborted { group }));

    if failures.is_empty() {
        info!(records = records.len(), "All group fetches succeeded");
        Ok(records)
    } else {
        Err(AggregateError { failures })
    }
}
