// scanlink-core/src/domain/scan/document.rs

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::warn;

use crate::domain::error::DomainError;

/// Outcome of a check as reported by the scanning tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckOutcome {
    Pass,
    Fail,
    Warn,
    Error,
}

impl CheckOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pass => "pass",
            Self::Fail => "fail",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

impl FromStr for CheckOutcome {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pass" | "passed" | "success" => Ok(Self::Pass),
            "fail" | "failed" | "failure" => Ok(Self::Fail),
            "warn" | "warning" => Ok(Self::Warn),
            "error" | "errored" => Ok(Self::Error),
            other => Err(format!(
                "unknown outcome '{}' (expected pass, fail, warn or error)",
                other
            )),
        }
    }
}

impl fmt::Display for CheckOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScannedTable {
    pub table_name: String,
    pub schema_name: Option<String>,
    pub database_name: Option<String>,
}

impl ScannedTable {
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            schema_name: None,
            database_name: None,
        }
    }

    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema_name = Some(schema.into());
        self
    }

    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database_name = Some(database.into());
        self
    }

    /// `database.schema.table`, skipping absent segments.
    pub fn qualified_name(&self) -> String {
        [
            self.database_name.as_deref(),
            self.schema_name.as_deref(),
            Some(self.table_name.as_str()),
        ]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(".")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metric {
    pub id: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Check {
    pub name: String,
    #[serde(rename = "type")]
    pub check_type: String,
    pub definition: String,
    pub outcome: CheckOutcome,
    pub table: Option<String>,
    pub schema: Option<String>,
    pub column: Option<String>,
    pub metrics: Vec<Metric>,
}

impl Check {
    pub fn metric(&self, id: &str) -> Option<f64> {
        self.metrics.iter().find(|m| m.id == id).map(|m| m.value)
    }
}

/// Typed view of one scan result document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanDocument {
    pub scan_id: Option<String>,
    pub data_source_name: String,
    pub tables: Vec<ScannedTable>,
    pub checks: Vec<Check>,
}

// --- WIRE SHAPE ---
// Unknown fields are ignored so newer scanner versions keep parsing.

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawScan {
    scan_id: Option<String>,
    data_source_name: Option<String>,
    tables: Option<Vec<RawTable>>,
    checks: Option<Vec<RawCheck>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTable {
    table_name: String,
    schema_name: Option<String>,
    database_name: Option<String>,
}

#[derive(Deserialize)]
struct RawCheck {
    name: Option<String>,
    #[serde(rename = "type")]
    check_type: Option<String>,
    definition: Option<String>,
    outcome: Option<String>,
    table: Option<String>,
    schema: Option<String>,
    column: Option<String>,
    metrics: Option<Vec<RawMetric>>,
}

#[derive(Deserialize)]
struct RawMetric {
    #[serde(default)]
    id: serde_json::Value,
    #[serde(default)]
    value: serde_json::Value,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

impl ScanDocument {
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let scan: RawScan =
            serde_json::from_str(raw).map_err(|e| DomainError::malformed(e.to_string()))?;
        Self::from_raw(scan)
    }

    pub fn from_value(value: serde_json::Value) -> Result<Self, DomainError> {
        let scan: RawScan =
            serde_json::from_value(value).map_err(|e| DomainError::malformed(e.to_string()))?;
        Self::from_raw(scan)
    }

    pub fn total_checks(&self) -> usize {
        self.checks.len()
    }

    fn from_raw(scan: RawScan) -> Result<Self, DomainError> {
        let data_source_name = non_empty(scan.data_source_name)
            .ok_or_else(|| DomainError::malformed("missing or empty 'dataSourceName'"))?;

        let raw_checks = scan
            .checks
            .ok_or_else(|| DomainError::malformed("missing 'checks' array"))?;

        let tables = scan
            .tables
            .unwrap_or_default()
            .into_iter()
            .map(|t| ScannedTable {
                table_name: t.table_name,
                schema_name: non_empty(t.schema_name),
                database_name: non_empty(t.database_name),
            })
            .collect();

        let checks = raw_checks
            .into_iter()
            .enumerate()
            .map(|(idx, raw)| Self::convert_check(idx, raw))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            scan_id: non_empty(scan.scan_id),
            data_source_name,
            tables,
            checks,
        })
    }

    fn convert_check(idx: usize, raw: RawCheck) -> Result<Check, DomainError> {
        let name = non_empty(raw.name)
            .ok_or_else(|| DomainError::malformed(format!("check #{} has no 'name'", idx)))?;

        let outcome = raw
            .outcome
            .ok_or_else(|| DomainError::malformed(format!("check '{}' has no 'outcome'", name)))?
            .parse::<CheckOutcome>()
            .map_err(|reason| DomainError::malformed(format!("check '{}': {}", name, reason)))?;

        let metrics = raw
            .metrics
            .unwrap_or_default()
            .into_iter()
            .filter_map(|m| {
                let Some(id) = m.id.as_str().filter(|s| !s.trim().is_empty()) else {
                    warn!(check = %name, id = %m.id, "Dropping metric without a string id");
                    return None;
                };
                match m.value.as_f64() {
                    Some(value) => Some(Metric {
                        id: id.to_string(),
                        value,
                    }),
                    None => {
                        warn!(
                            check = %name,
                            metric = %id,
                            value = %m.value,
                            "Dropping non-numeric metric value"
                        );
                        None
                    }
                }
            })
            .collect();

        Ok(Check {
            name,
            check_type: non_empty(raw.check_type).unwrap_or_else(|| "unknown".to_string()),
            definition: raw.definition.unwrap_or_default(),
            outcome,
            table: non_empty(raw.table),
            schema: non_empty(raw.schema),
            column: non_empty(raw.column),
            metrics,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "scanId": "test_scan_123",
        "dataSourceName": "postgres",
        "scanner": { "version": "3.0.1" },
        "tables": [{ "tableName": "users", "schemaName": "public", "databaseName": "mydb" }],
        "checks": [
            {
                "name": "users_id_not_null",
                "type": "missing_count",
                "definition": "SELECT COUNT(*) FROM users WHERE id IS NULL",
                "outcome": "pass",
                "table": "users",
                "schema": "public",
                "column": "id",
                "metrics": [
                    { "id": "row_count", "value": 1000 },
                    { "id": "missing_count", "value": 0 }
                ]
            }
        ]
    }"#;

    #[test]
    fn test_parse_sample_document() {
        let doc = ScanDocument::parse(SAMPLE).unwrap();
        assert_eq!(doc.scan_id.as_deref(), Some("test_scan_123"));
        assert_eq!(doc.data_source_name, "postgres");
        assert_eq!(doc.tables[0].qualified_name(), "mydb.public.users");

        let check = &doc.checks[0];
        assert_eq!(check.outcome, CheckOutcome::Pass);
        assert_eq!(check.column.as_deref(), Some("id"));
        assert_eq!(check.metric("row_count"), Some(1000.0));
        assert_eq!(check.metric("missing_count"), Some(0.0));
    }

    #[test]
    fn test_missing_data_source_is_malformed() {
        let res = ScanDocument::parse(r#"{ "checks": [] }"#);
        assert!(matches!(res, Err(DomainError::MalformedInput(_))));

        let res = ScanDocument::parse(r#"{ "dataSourceName": "  ", "checks": [] }"#);
        assert!(matches!(res, Err(DomainError::MalformedInput(_))));
    }

    #[test]
    fn test_missing_or_wrong_checks_is_malformed() {
        let res = ScanDocument::parse(r#"{ "dataSourceName": "pg" }"#);
        assert!(matches!(res, Err(DomainError::MalformedInput(msg)) if msg.contains("checks")));

        let res = ScanDocument::parse(r#"{ "dataSourceName": "pg", "checks": {} }"#);
        assert!(matches!(res, Err(DomainError::MalformedInput(_))));
    }

    #[test]
    fn test_unknown_outcome_names_the_check() {
        let raw = r#"{ "dataSourceName": "pg", "checks": [
            { "name": "orders_fresh", "type": "freshness", "outcome": "maybe" }
        ] }"#;
        match ScanDocument::parse(raw) {
            Err(DomainError::MalformedInput(msg)) => assert!(msg.contains("orders_fresh")),
            other => panic!("expected MalformedInput, got {:?}", other),
        }
    }

    #[test]
    fn test_outcome_aliases() {
        assert_eq!("PASSED".parse::<CheckOutcome>(), Ok(CheckOutcome::Pass));
        assert_eq!("failure".parse::<CheckOutcome>(), Ok(CheckOutcome::Fail));
        assert_eq!("Warning".parse::<CheckOutcome>(), Ok(CheckOutcome::Warn));
        assert_eq!("error".parse::<CheckOutcome>(), Ok(CheckOutcome::Error));
        assert!("unknown".parse::<CheckOutcome>().is_err());
    }

    #[test]
    fn test_non_numeric_metrics_are_dropped() {
        let raw = r#"{ "dataSourceName": "pg", "checks": [
            { "name": "c1", "type": "row_count", "outcome": "pass", "table": "t",
              "metrics": [
                { "id": "row_count", "value": 12 },
                { "id": "histogram", "value": [1, 2, 3] },
                { "id": "label", "value": "n/a" },
                { "value": 3 }
              ] }
        ] }"#;
        let doc = ScanDocument::parse(raw).unwrap();
        assert_eq!(
            doc.checks[0].metrics,
            vec![Metric {
                id: "row_count".into(),
                value: 12.0
            }]
        );
    }

    #[test]
    fn test_metric_without_string_id_is_dropped_alone() {
        let raw = r#"{ "dataSourceName": "pg", "checks": [
            { "name": "c1", "type": "row_count", "outcome": "pass", "table": "t",
              "metrics": [
                { "id": 7, "value": 1 },
                { "id": null, "value": 2 },
                { "id": "  ", "value": 4 },
                { "id": "row_count", "value": 5 }
              ] }
        ] }"#;
        let doc = ScanDocument::parse(raw).unwrap();
        assert_eq!(doc.checks[0].metric("row_count"), Some(5.0));
        assert_eq!(doc.checks[0].metrics.len(), 1);
    }

    #[test]
    fn test_optional_fields_default() {
        let raw = r#"{ "dataSourceName": "pg", "checks": [
            { "name": "c1", "outcome": "fail", "schema": "" }
        ] }"#;
        let doc = ScanDocument::parse(raw).unwrap();
        assert!(doc.scan_id.is_none());
        assert!(doc.tables.is_empty());
        let check = &doc.checks[0];
        assert_eq!(check.check_type, "unknown");
        assert_eq!(check.definition, "");
        assert!(check.schema.is_none());
        assert!(check.metrics.is_empty());
    }

    #[test]
    fn test_qualified_name_skips_absent_segments() {
        assert_eq!(ScannedTable::new("users").qualified_name(), "users");
        assert_eq!(
            ScannedTable::new("users").with_schema("public").qualified_name(),
            "public.users"
        );
        assert_eq!(
            ScannedTable::new("users").with_database("db").qualified_name(),
            "db.users"
        );
    }
}
