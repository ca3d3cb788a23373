// scanlink-core/src/infrastructure/adapters/rest.rs

// Catalog adapter speaking the metadata-change-proposal REST protocol.
// Each aspect is one POST; definitions are two aspects on the same assertion entity.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use serde_json::{Map, Value, json};
use tracing::{debug, instrument};

use crate::domain::configuration::IngestConfig;
use crate::domain::urn;
use crate::infrastructure::error::InfrastructureError;
use crate::ports::repository::{
    AssertionDefinition, AssertionRepository, EvaluationRun, RepositoryError,
};

const RESTLI_PROTOCOL_VERSION: &str = "2.0.0";

pub struct RestAssertionRepository {
    client: reqwest::Client,
    endpoint: String,
    assertion_platform_urn: String,
    request_timeout: Option<Duration>,
}

impl RestAssertionRepository {
    pub fn new(config: &IngestConfig) -> Result<Self, InfrastructureError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static("x-restli-protocol-version"),
            HeaderValue::from_static(RESTLI_PROTOCOL_VERSION),
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(token) = &config.token {
            let value = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|_| {
                InfrastructureError::ConfigError("token is not a valid header value".into())
            })?;
            headers.insert(AUTHORIZATION, value);
        }

        for (name, value) in &config.extra_headers {
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                InfrastructureError::ConfigError(format!("invalid header name '{name}': {e}"))
            })?;
            let value = HeaderValue::from_str(value).map_err(|e| {
                InfrastructureError::ConfigError(format!("invalid value for header '{name}': {e}"))
            })?;
            headers.insert(name, value);
        }

        let mut builder = reqwest::Client::builder().default_headers(headers);
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            endpoint: format!(
                "{}/aspects?action=ingestProposal",
                config.server_url.trim_end_matches('/')
            ),
            assertion_platform_urn: urn::platform_urn(&config.assertion_platform),
            request_timeout: config.request_timeout(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn post(&self, body: &Value) -> Result<(), RepositoryError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let text = response.text().await.unwrap_or_default();
        Err(status_error(status, &text))
    }

    fn transport_error(&self, err: reqwest::Error) -> RepositoryError {
        if err.is_timeout() {
            return RepositoryError::Timeout(self.request_timeout.unwrap_or_default());
        }
        if err.is_connect() || err.is_request() {
            return RepositoryError::transient(err.to_string());
        }
        RepositoryError::permanent(err.to_string())
    }
}

fn status_error(status: StatusCode, body: &str) -> RepositoryError {
    let message = if body.is_empty() {
        format!("HTTP {status}")
    } else {
        format!("HTTP {status}: {}", body.chars().take(200).collect::<String>())
    };

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => RepositoryError::Auth(message),
        s if s == StatusCode::TOO_MANY_REQUESTS || s.is_server_error() => {
            RepositoryError::transient(message)
        }
        _ => RepositoryError::permanent(message),
    }
}

/// Wraps one aspect into an upsert proposal on an assertion entity.
fn proposal(entity_urn: &str, aspect_name: &str, aspect: &Value) -> Value {
    json!({
        "proposal": {
            "entityType": "assertion",
            "entityUrn": entity_urn,
            "changeType": "UPSERT",
            "aspectName": aspect_name,
            "aspect": {
                "value": aspect.to_string(),
                "contentType": "application/json",
            },
        }
    })
}

fn assertion_info(definition: &AssertionDefinition) -> Value {
    json!({
        "type": "DATASET",
        "datasetAssertion": {
            "dataset": definition.dataset_urn,
            "scope": definition.scope.catalog_scope(),
            "fields": definition.field_urns,
            "operator": definition.operator.as_str(),
            "aggregation": definition.aggregation.as_str(),
            "nativeType": definition.native_type,
            "nativeParameters": definition.parameters,
        },
        "customProperties": {
            "check_name": definition.check_name,
            "soda_check_type": definition.native_type,
        },
        "source": { "type": "EXTERNAL" },
    })
}

fn platform_instance(platform_urn: &str) -> Value {
    json!({ "platform": platform_urn })
}

fn run_event(run: &EvaluationRun) -> Value {
    let result = &run.result;

    let mut native = Map::new();
    for metric in &result.metrics {
        native.insert(metric.id.clone(), Value::String(metric.value.to_string()));
    }
    native.insert("outcome".into(), Value::String(result.outcome.to_string()));
    native.insert("warning".into(), Value::String(result.warning.to_string()));

    let mut body = Map::new();
    body.insert("type".into(), json!(result.result_type));
    if let Some(v) = result.row_count {
        body.insert("rowCount".into(), json!(v));
    }
    if let Some(v) = result.missing_count {
        body.insert("missingCount".into(), json!(v));
    }
    if let Some(v) = result.unexpected_count {
        body.insert("unexpectedCount".into(), json!(v));
    }
    if let Some(v) = result.actual_agg_value {
        body.insert("actualAggValue".into(), json!(v));
    }
    body.insert("nativeResults".into(), Value::Object(native));

    json!({
        "timestampMillis": run.timestamp.timestamp_millis(),
        "assertionUrn": run.assertion_urn,
        "asserteeUrn": run.assertee_urn,
        "runId": run.run_id,
        "status": "COMPLETE",
        "result": body,
        "batchSpec": {
            "nativeBatchId": run.scan_id,
            "query": run.definition,
            "customProperties": {
                "check_name": run.check_name,
                "check_type": run.check_type,
                "soda_scan_id": run.scan_id,
            },
        },
    })
}

#[async_trait]
impl AssertionRepository for RestAssertionRepository {
    #[instrument(skip_all, fields(fingerprint = %definition.fingerprint))]
    async fn upsert_assertion_definition(
        &self,
        definition: &AssertionDefinition,
    ) -> Result<String, RepositoryError> {
        let assertion_urn = urn::assertion_urn(&definition.fingerprint);

        self.post(&proposal(&assertion_urn, "assertionInfo", &assertion_info(definition)))
            .await?;
        self.post(&proposal(
            &assertion_urn,
            "dataPlatformInstance",
            &platform_instance(&self.assertion_platform_urn),
        ))
        .await?;

        debug!(urn = %assertion_urn, "Assertion definition upserted");
        Ok(assertion_urn)
    }

    #[instrument(skip_all, fields(run_id = %run.run_id))]
    async fn record_evaluation(&self, run: &EvaluationRun) -> Result<(), RepositoryError> {
        self.post(&proposal(&run.assertion_urn, "assertionRunEvent", &run_event(run)))
            .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::assertion::CheckMapper;
    use crate::domain::scan::ScanDocument;
    use chrono::{TimeZone, Utc};

    fn mapping() -> crate::domain::assertion::AssertionMapping {
        let doc = ScanDocument::parse(
            r#"{
            "scanId": "nightly",
            "dataSourceName": "postgres",
            "tables": [{ "tableName": "users", "schemaName": "public", "databaseName": "mydb" }],
            "checks": [{ "name": "users_id_not_null", "type": "missing_count", "outcome": "warn",
                         "definition": "checks for users:\n  - missing_count(id) = 0",
                         "table": "users", "schema": "public", "column": "id",
                         "metrics": [{ "id": "row_count", "value": 1000 }, { "id": "missing_count", "value": 3 }] }]
        }"#,
        )
        .unwrap();
        let config = IngestConfig::new("http://localhost:8080");
        CheckMapper::for_document(&doc, &config)
            .map(&doc.checks[0])
            .unwrap()
    }

    fn aspect_of(proposal: &Value) -> Value {
        let raw = proposal["proposal"]["aspect"]["value"].as_str().unwrap();
        serde_json::from_str(raw).unwrap()
    }

    #[test]
    fn test_assertion_info_proposal() {
        let m = mapping();
        let body = proposal(
            &m.assertion_urn(),
            "assertionInfo",
            &assertion_info(&m.definition_record()),
        );

        assert_eq!(body["proposal"]["entityType"], "assertion");
        assert_eq!(body["proposal"]["changeType"], "UPSERT");
        assert_eq!(body["proposal"]["aspect"]["contentType"], "application/json");

        let aspect = aspect_of(&body);
        let ds = &aspect["datasetAssertion"];
        assert_eq!(
            ds["dataset"],
            "urn:li:dataset:(urn:li:dataPlatform:postgres,mydb.public.users,PROD)"
        );
        assert_eq!(ds["scope"], "DATASET_COLUMN");
        assert_eq!(ds["operator"], "NOT_NULL");
        assert_eq!(ds["aggregation"], "IDENTITY");
        assert_eq!(ds["fields"].as_array().unwrap().len(), 1);
        assert_eq!(aspect["customProperties"]["soda_check_type"], "missing_count");
    }

    #[test]
    fn test_run_event_carries_metrics_and_batch_spec() {
        let m = mapping();
        let ts = Utc.with_ymd_and_hms(2026, 3, 1, 12, 30, 0).unwrap();
        let run = m.evaluation_run(m.assertion_urn(), "nightly", ts);
        let event = run_event(&run);

        assert_eq!(event["timestampMillis"], ts.timestamp_millis());
        assert_eq!(event["runId"], "2026-03-01T12:30:00Z");
        assert_eq!(event["result"]["type"], "SUCCESS");
        assert_eq!(event["result"]["rowCount"], 1000);
        assert_eq!(event["result"]["missingCount"], 3);
        assert!(event["result"].get("unexpectedCount").is_none());
        assert_eq!(event["result"]["nativeResults"]["warning"], "true");
        assert_eq!(event["batchSpec"]["nativeBatchId"], "nightly");
        assert_eq!(event["batchSpec"]["customProperties"]["soda_scan_id"], "nightly");
    }

    #[test]
    fn test_status_classification() {
        assert!(matches!(
            status_error(StatusCode::UNAUTHORIZED, ""),
            RepositoryError::Auth(_)
        ));
        assert!(matches!(
            status_error(StatusCode::FORBIDDEN, "nope"),
            RepositoryError::Auth(_)
        ));
        assert!(status_error(StatusCode::SERVICE_UNAVAILABLE, "").is_retryable());
        assert!(status_error(StatusCode::TOO_MANY_REQUESTS, "").is_retryable());
        assert!(!status_error(StatusCode::BAD_REQUEST, "bad aspect").is_retryable());
    }

    #[test]
    fn test_endpoint_and_invalid_headers() {
        let repo = RestAssertionRepository::new(&IngestConfig::new("http://gms:8080/")).unwrap();
        assert_eq!(repo.endpoint(), "http://gms:8080/aspects?action=ingestProposal");

        let mut config = IngestConfig::new("http://gms:8080");
        config
            .extra_headers
            .insert("bad header".into(), "value".into());
        assert!(matches!(
            RestAssertionRepository::new(&config),
            Err(InfrastructureError::ConfigError(_))
        ));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_transient() {
        let mut config = IngestConfig::new("http://127.0.0.1:1");
        config.timeout_sec = Some(2.0);
        let repo = RestAssertionRepository::new(&config).unwrap();

        let err = repo
            .upsert_assertion_definition(&mapping().definition_record())
            .await
            .unwrap_err();
        assert!(err.is_retryable(), "unexpected error: {err:?}");
    }
}
