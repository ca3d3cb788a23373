// scanlink-core/src/application/sync.rs

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::time::Duration;

use chrono::Utc;
use futures::StreamExt;
use serde::Serialize;
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};

use crate::domain::assertion::AssertionMapping;
use crate::domain::configuration::IngestConfig;
use crate::domain::error::DomainError;
use crate::ports::repository::{AssertionRepository, RepositoryError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    Success,
    PartialFailure,
    Failure,
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Success => "success",
            Self::PartialFailure => "partial_failure",
            Self::Failure => "failure",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncErrorKind {
    UnresolvableScope,
    Transport,
    Auth,
    Timeout,
}

/// Why one check did not make it into the catalog.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncError {
    pub check: String,
    pub kind: SyncErrorKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
    #[serde(skip)]
    pub source: Option<RepositoryError>,
}

impl SyncError {
    pub fn from_domain(check: &str, err: &DomainError) -> Self {
        Self {
            check: check.to_string(),
            kind: SyncErrorKind::UnresolvableScope,
            message: err.to_string(),
            fingerprint: None,
            source: None,
        }
    }

    fn from_repository(mapping: &AssertionMapping, stage: &str, err: RepositoryError) -> Self {
        let kind = match &err {
            RepositoryError::Transport { .. } => SyncErrorKind::Transport,
            RepositoryError::Auth(_) => SyncErrorKind::Auth,
            RepositoryError::Timeout(_) => SyncErrorKind::Timeout,
        };
        Self {
            check: mapping.check_name.clone(),
            kind,
            message: format!("{}: {}", stage, err),
            fingerprint: Some(mapping.fingerprint.clone()),
            source: Some(err),
        }
    }

    fn deadline_exceeded(mapping: &AssertionMapping) -> Self {
        Self {
            check: mapping.check_name.clone(),
            kind: SyncErrorKind::Timeout,
            message: "sync deadline exceeded before this assertion was sent".to_string(),
            fingerprint: Some(mapping.fingerprint.clone()),
            source: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncResult {
    pub status: SyncStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scan_id: Option<String>,
    pub assertions_attempted: usize,
    pub assertions_sent: usize,
    pub errors: Vec<SyncError>,
}

impl SyncResult {
    pub fn is_success(&self) -> bool {
        self.status == SyncStatus::Success
    }

    pub fn with_scan_id(mut self, scan_id: impl Into<String>) -> Self {
        self.scan_id = Some(scan_id.into());
        self
    }
}

/// Single owner of the counts of one sync.
#[derive(Debug, Default)]
pub struct SyncAccumulator {
    attempted: usize,
    sent: usize,
    errors: Vec<SyncError>,
}

impl SyncAccumulator {
    pub fn record_sent(&mut self) {
        self.attempted += 1;
        self.sent += 1;
    }

    pub fn record_error(&mut self, error: SyncError) {
        warn!(check = %error.check, kind = ?error.kind, "{}", error.message);
        self.attempted += 1;
        self.errors.push(error);
    }

    pub fn finish(self) -> SyncResult {
        let status = if self.errors.is_empty() {
            SyncStatus::Success
        } else if self.sent > 0 {
            SyncStatus::PartialFailure
        } else {
            SyncStatus::Failure
        };
        SyncResult {
            status,
            scan_id: None,
            assertions_attempted: self.attempted,
            assertions_sent: self.sent,
            errors: self.errors,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SyncOptions {
    pub request_timeout: Option<Duration>,
    pub sync_timeout: Option<Duration>,
    pub concurrency: usize,
    pub retry_backoff: Duration,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            request_timeout: None,
            sync_timeout: None,
            concurrency: 1,
            retry_backoff: Duration::from_millis(250),
        }
    }
}

impl From<&IngestConfig> for SyncOptions {
    fn from(config: &IngestConfig) -> Self {
        Self {
            request_timeout: config.request_timeout(),
            sync_timeout: config.sync_timeout(),
            concurrency: config.concurrency.max(1),
            retry_backoff: config.retry_backoff(),
        }
    }
}

/// Reconciles mapped assertions against the catalog.
pub struct SyncEngine<'r> {
    repository: &'r dyn AssertionRepository,
    options: SyncOptions,
}

impl<'r> SyncEngine<'r> {
    pub fn new(repository: &'r dyn AssertionRepository, options: SyncOptions) -> Self {
        Self {
            repository,
            options,
        }
    }

    /// Upserts every definition and records its evaluation. Never aborts the batch.
    #[instrument(skip_all, fields(scan_id = %scan_id, mappings = mappings.len()))]
    pub async fn sync(&self, scan_id: &str, mappings: &[AssertionMapping]) -> SyncResult {
        let mut acc = SyncAccumulator::default();
        self.sync_into(scan_id, mappings, &mut acc).await;
        acc.finish().with_scan_id(scan_id)
    }

    pub async fn sync_into(
        &self,
        scan_id: &str,
        mappings: &[AssertionMapping],
        acc: &mut SyncAccumulator,
    ) {
        let deadline = self.options.sync_timeout.map(|t| Instant::now() + t);

        // Same fingerprint => same group => sequential upserts, never concurrent ones.
        let mut index: HashMap<&str, usize> = HashMap::new();
        let mut groups: Vec<Vec<(usize, &AssertionMapping)>> = Vec::new();
        for (pos, mapping) in mappings.iter().enumerate() {
            let slot = *index.entry(mapping.fingerprint.as_str()).or_insert_with(|| {
                groups.push(Vec::new());
                groups.len() - 1
            });
            groups[slot].push((pos, mapping));
        }

        debug!(
            groups = groups.len(),
            concurrency = self.options.concurrency,
            "Dispatching assertion groups"
        );

        let mut outcomes: Vec<(usize, Result<(), SyncError>)> =
            futures::stream::iter(groups.into_iter().map(|group| async move {
                let mut done = Vec::with_capacity(group.len());
                for (pos, mapping) in group {
                    done.push((pos, self.sync_one(scan_id, mapping, deadline).await));
                }
                done
            }))
            .buffer_unordered(self.options.concurrency.max(1))
            .flat_map(futures::stream::iter)
            .collect()
            .await;

        // Report in input order regardless of completion order.
        outcomes.sort_by_key(|(pos, _)| *pos);
        for (_, outcome) in outcomes {
            match outcome {
                Ok(()) => acc.record_sent(),
                Err(e) => acc.record_error(e),
            }
        }

        info!(sent = acc.sent, failed = acc.errors.len(), "Assertion sync finished");
    }

    async fn sync_one(
        &self,
        scan_id: &str,
        mapping: &AssertionMapping,
        deadline: Option<Instant>,
    ) -> Result<(), SyncError> {
        if deadline.is_some_and(|d| Instant::now() >= d) {
            return Err(SyncError::deadline_exceeded(mapping));
        }

        let definition = mapping.definition_record();
        let assertion_urn = self
            .call(deadline, || {
                self.repository.upsert_assertion_definition(&definition)
            })
            .await
            .map_err(|e| SyncError::from_repository(mapping, "upsert definition", e))?;

        let run = mapping.evaluation_run(assertion_urn, scan_id, Utc::now());
        self.call(deadline, || self.repository.record_evaluation(&run))
            .await
            .map_err(|e| SyncError::from_repository(mapping, "record evaluation", e))?;

        debug!(check = %mapping.check_name, assertion = %run.assertion_urn, "Assertion synced");
        Ok(())
    }

    /// One repository call, bounded in time and retried once on transient transport errors.
    async fn call<T, F, Fut>(&self, deadline: Option<Instant>, op: F) -> Result<T, RepositoryError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, RepositoryError>>,
    {
        match self.bounded(deadline, op()).await {
            Err(e) if e.is_retryable() => {
                warn!(error = %e, backoff = ?self.options.retry_backoff, "Retrying catalog call");
                tokio::time::sleep(self.options.retry_backoff).await;
                self.bounded(deadline, op()).await
            }
            other => other,
        }
    }

    async fn bounded<T>(
        &self,
        deadline: Option<Instant>,
        fut: impl Future<Output = Result<T, RepositoryError>>,
    ) -> Result<T, RepositoryError> {
        let remaining = deadline.map(|d| d.saturating_duration_since(Instant::now()));
        let limit = match (self.options.request_timeout, remaining) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        match limit {
            Some(limit) => tokio::time::timeout(limit, fut)
                .await
                .unwrap_or(Err(RepositoryError::Timeout(limit))),
            None => fut.await,
        }
    }
}
