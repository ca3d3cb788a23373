// scanlink-core/src/application/ingest.rs

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, instrument, warn};

use crate::application::sync::{SyncAccumulator, SyncEngine, SyncError, SyncOptions, SyncResult};
use crate::domain::assertion::{AssertionMapping, CheckMapper};
use crate::domain::configuration::IngestConfig;
use crate::domain::scan::ScanDocument;
use crate::error::ScanlinkError;
use crate::ports::repository::AssertionRepository;

/// Mapped checks of one document, with the checks that could not be mapped.
#[derive(Debug, Clone, PartialEq)]
pub struct MappedScan {
    pub mappings: Vec<AssertionMapping>,
    pub failures: Vec<SyncError>,
}

/// Maps every check of a document. Pure: no catalog access.
pub fn map_document(document: &ScanDocument, config: &IngestConfig) -> MappedScan {
    let mapper = CheckMapper::for_document(document, config);
    let mut mappings = Vec::with_capacity(document.checks.len());
    let mut failures = Vec::new();

    for (check, mapped) in mapper.map_all(&document.checks) {
        match mapped {
            Ok(mapping) => mappings.push(mapping),
            Err(e) => failures.push(SyncError::from_domain(&check.name, &e)),
        }
    }

    MappedScan { mappings, failures }
}

/// Entry point: scan document in, catalog assertions out.
///
/// `process` is the canonical form and always returns a result. `run` honours
/// `graceful_exceptions`: when disabled it turns a non-success result into an error.
pub struct ScanIngestor {
    config: IngestConfig,
    repository: Arc<dyn AssertionRepository>,
}

impl ScanIngestor {
    pub fn new(config: IngestConfig, repository: Arc<dyn AssertionRepository>) -> Self {
        Self { config, repository }
    }

    pub fn config(&self) -> &IngestConfig {
        &self.config
    }

    #[instrument(skip_all, fields(data_source = %document.data_source_name))]
    pub async fn process(&self, document: &ScanDocument) -> SyncResult {
        let scan_id = document
            .scan_id
            .clone()
            .unwrap_or_else(|| format!("scan_{}", Utc::now().timestamp()));

        info!(
            scan_id = %scan_id,
            checks = document.total_checks(),
            "Processing scan"
        );

        let MappedScan { mappings, failures } = map_document(document, &self.config);

        let mut acc = SyncAccumulator::default();
        for failure in failures {
            acc.record_error(failure);
        }

        SyncEngine::new(self.repository.as_ref(), SyncOptions::from(&self.config))
            .sync_into(&scan_id, &mappings, &mut acc)
            .await;

        let result = acc.finish().with_scan_id(scan_id);
        info!(
            status = %result.status,
            sent = result.assertions_sent,
            errors = result.errors.len(),
            "Scan processed"
        );
        result
    }

    /// Strict adapter: any non-success result becomes an error.
    ///
    /// Catalog failures surface as the original repository error; anything else
    /// as `SyncFailed`. The result is logged before it is turned into an error.
    pub async fn process_strict(
        &self,
        document: &ScanDocument,
    ) -> Result<SyncResult, ScanlinkError> {
        let result = self.process(document).await;
        if result.is_success() {
            return Ok(result);
        }

        if let Some(source) = result.errors.iter().find_map(|e| e.source.clone()) {
            warn!(status = %result.status, "Raising catalog error (graceful_exceptions disabled)");
            return Err(ScanlinkError::Repository(source));
        }

        Err(ScanlinkError::SyncFailed {
            status: result.status,
            attempted: result.assertions_attempted,
            failed: result.errors.len(),
            first_error: result.errors.first().map(|e| e.message.clone()),
        })
    }

    pub async fn run(&self, document: &ScanDocument) -> Result<SyncResult, ScanlinkError> {
        if self.config.graceful_exceptions {
            Ok(self.process(document).await)
        } else {
            self.process_strict(document).await
        }
    }

    /// Parses then runs. A malformed document aborts the whole run in both modes.
    pub async fn run_raw(&self, raw: &str) -> Result<SyncResult, ScanlinkError> {
        let document = ScanDocument::parse(raw)?;
        self.run(&document).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::application::sync::{SyncErrorKind, SyncStatus};
    use crate::domain::assertion::{OperatorKind, ResultType, Scope, WellKnownOperator};
    use crate::domain::error::DomainError;
    use crate::infrastructure::adapters::memory::InMemoryRepository;
    use crate::ports::repository::RepositoryError;

    const SAMPLE: &str = r#"{
        "dataSourceName": "postgres",
        "checks": [{
            "name": "users_id_not_null", "type": "missing_count", "outcome": "pass",
            "table": "users", "schema": "public", "column": "id",
            "metrics": [{ "id": "row_count", "value": 1000 }, { "id": "missing_count", "value": 0 }]
        }],
        "tables": [{ "tableName": "users", "schemaName": "public", "databaseName": "mydb" }]
    }"#;

    const MIXED: &str = r#"{
        "scanId": "nightly",
        "dataSourceName": "postgres",
        "tables": [{ "tableName": "users", "schemaName": "public", "databaseName": "mydb" }],
        "checks": [
            { "name": "ok", "type": "row_count", "outcome": "pass", "table": "users" },
            { "name": "orphan", "type": "missing_count", "outcome": "fail", "column": "id" },
            { "name": "broken", "type": "freshness", "outcome": "error", "table": "users" }
        ]
    }"#;

    fn ingestor(repo: Arc<InMemoryRepository>) -> ScanIngestor {
        ScanIngestor::new(IngestConfig::new("http://localhost:8080"), repo)
    }

    #[tokio::test]
    async fn test_sample_scan_end_to_end() {
        let repo = Arc::new(InMemoryRepository::default());
        let result = ingestor(repo.clone()).run_raw(SAMPLE).await.unwrap();

        assert_eq!(result.status, SyncStatus::Success);
        assert_eq!(result.assertions_sent, 1);
        assert!(result.scan_id.as_deref().is_some_and(|s| s.starts_with("scan_")));

        let definitions = repo.definitions();
        assert_eq!(definitions.len(), 1);
        let def = &definitions[0];
        assert_eq!(def.scope, Scope::Column);
        assert_eq!(def.operator, OperatorKind::WellKnown(WellKnownOperator::NotNull));
        assert_eq!(
            def.field_urns,
            vec!["urn:li:schemaField:(urn:li:dataset:(urn:li:dataPlatform:postgres,mydb.public.users,PROD),id)"]
        );

        let runs = repo.runs();
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].result.result_type, ResultType::Success);
    }

    #[tokio::test]
    async fn test_every_check_is_accounted_for() {
        let repo = Arc::new(InMemoryRepository::default());
        let doc = ScanDocument::parse(MIXED).unwrap();
        let result = ingestor(repo).process(&doc).await;

        assert_eq!(
            result.assertions_sent + result.errors.len(),
            doc.total_checks()
        );
        assert_eq!(result.status, SyncStatus::PartialFailure);
        assert_eq!(result.scan_id.as_deref(), Some("nightly"));
        assert_eq!(result.errors[0].check, "orphan");
        assert_eq!(result.errors[0].kind, SyncErrorKind::UnresolvableScope);
    }

    #[tokio::test]
    async fn test_rerun_is_idempotent() {
        let repo = Arc::new(InMemoryRepository::default());
        let ingestor = ingestor(repo.clone());
        let doc = ScanDocument::parse(MIXED).unwrap();

        ingestor.process(&doc).await;
        let after_first = repo.definition_count();
        ingestor.process(&doc).await;

        assert_eq!(repo.definition_count(), after_first);
        assert_eq!(repo.runs().len(), 4);
    }

    #[tokio::test]
    async fn test_malformed_input_aborts_in_graceful_mode() {
        let repo = Arc::new(InMemoryRepository::default());
        let res = ingestor(repo.clone())
            .run_raw(r#"{ "dataSourceName": "pg" }"#)
            .await;
        assert!(matches!(
            res,
            Err(ScanlinkError::Domain(DomainError::MalformedInput(_)))
        ));
        assert_eq!(repo.definition_count(), 0);
    }

    #[tokio::test]
    async fn test_graceful_mode_returns_failure_status() {
        let repo = Arc::new(InMemoryRepository::failing(RepositoryError::Auth("401".into())));
        let result = ingestor(repo).run_raw(SAMPLE).await.unwrap();
        assert_eq!(result.status, SyncStatus::Failure);
        assert_eq!(result.errors[0].kind, SyncErrorKind::Auth);
    }

    #[tokio::test]
    async fn test_strict_mode_raises_repository_error() {
        let repo = Arc::new(InMemoryRepository::failing(RepositoryError::Auth("401".into())));
        let mut config = IngestConfig::new("http://localhost:8080");
        config.graceful_exceptions = false;

        let res = ScanIngestor::new(config, repo).run_raw(SAMPLE).await;
        assert!(matches!(
            res,
            Err(ScanlinkError::Repository(RepositoryError::Auth(_)))
        ));
    }

    #[tokio::test]
    async fn test_strict_mode_raises_on_unresolvable_scope() {
        let repo = Arc::new(InMemoryRepository::default());
        let mut config = IngestConfig::new("http://localhost:8080");
        config.graceful_exceptions = false;

        let res = ScanIngestor::new(config, repo.clone()).run_raw(MIXED).await;
        match res {
            Err(ScanlinkError::SyncFailed { status, failed, .. }) => {
                assert_eq!(status, SyncStatus::PartialFailure);
                assert_eq!(failed, 1);
            }
            other => panic!("expected SyncFailed, got {:?}", other),
        }
        // recorded before raising
        assert_eq!(repo.definition_count(), 2);
    }

    #[test]
    fn test_map_document_splits_failures() {
        let doc = ScanDocument::parse(MIXED).unwrap();
        let mapped = map_document(&doc, &IngestConfig::new("http://localhost:8080"));
        assert_eq!(mapped.mappings.len(), 2);
        assert_eq!(mapped.failures.len(), 1);
    }
}
