//! One run of the digest: fetch, classify, render, deliver.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::Task;
use crate::classify::{BucketPolicy, classify};
use crate::error::DueResult;
use crate::render::{Digest, RenderOptions, render_digest};

/// Where tasks come from.
#[async_trait]
pub trait TaskSource: Send + Sync {
    async fn fetch_tasks(&self) -> DueResult<Vec<Task>>;
}

/// Where a rendered digest goes.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Post the mention (if any) first, then the sections.
    ///
    /// A ping that went out is not withdrawn if the sections then fail.
    async fn deliver(&self, digest: &Digest) -> DueResult<()>;
}

/// What a completed run did, for logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub fetched: usize,
    pub upcoming: usize,
    pub near_term: usize,
    pub urgent: bool,
}

/// Fetch and classify without delivering.
pub async fn prepare(
    source: &dyn TaskSource,
    now: DateTime<Utc>,
    policy: &BucketPolicy,
    render: &RenderOptions,
) -> DueResult<(Digest, RunReport)> {
    let tasks = source.fetch_tasks().await?;
    let classification = classify(&tasks, now, policy)?;

    let report = RunReport {
        fetched: tasks.len(),
        upcoming: classification.upcoming.len(),
        near_term: classification.near_term.len(),
        urgent: classification.urgent,
    };
    tracing::debug!(
        fetched = report.fetched,
        excluded = classification.excluded,
        "tasks classified"
    );

    Ok((render_digest(&classification, render), report))
}

/// Run the whole digest once. Any error aborts the run before anything is sent.
pub async fn run_once(
    source: &dyn TaskSource,
    sink: &dyn NotificationSink,
    now: DateTime<Utc>,
    policy: &BucketPolicy,
    render: &RenderOptions,
) -> DueResult<RunReport> {
    let (digest, report) = prepare(source, now, policy, render).await?;
    sink.deliver(&digest).await?;

    tracing::info!(
        entries = digest.entry_count(),
        upcoming = report.upcoming,
        near_term = report.near_term,
        urgent = report.urgent,
        "digest delivered"
    );
    Ok(report)
}
