// scanlink-core/src/domain/assertion/mapping.rs

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;

use crate::domain::scan::{Check, CheckOutcome, Metric};
use crate::domain::urn::{self, DatasetUrn, FieldUrn};
use crate::ports::repository::{AssertionDefinition, EvaluationRun};

/// Granularity an assertion applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    Dataset,
    Schema,
    Column,
}

impl Scope {
    /// Scope name in the catalog's dataset-assertion model.
    pub fn catalog_scope(&self) -> &'static str {
        match self {
            Self::Dataset => "DATASET_ROWS",
            Self::Schema => "DATASET_SCHEMA",
            Self::Column => "DATASET_COLUMN",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WellKnownOperator {
    NotNull,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatorKind {
    WellKnown(WellKnownOperator),
    /// Opaque operator: the raw definition travels as a parameter.
    Native,
}

impl OperatorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WellKnown(WellKnownOperator::NotNull) => "NOT_NULL",
            Self::Native => "_NATIVE_",
        }
    }

    pub fn is_well_known(&self) -> bool {
        matches!(self, Self::WellKnown(_))
    }
}

impl Serialize for OperatorKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Aggregation {
    Identity,
    UniqueCount,
    RowCount,
    Columns,
    Native,
}

impl Aggregation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Identity => "IDENTITY",
            Self::UniqueCount => "UNIQUE_COUNT",
            Self::RowCount => "ROW_COUNT",
            Self::Columns => "COLUMNS",
            Self::Native => "_NATIVE_",
        }
    }
}

impl Serialize for Aggregation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResultType {
    Success,
    Failure,
    /// The check could not execute. Not a quality failure.
    Error,
}

const AGGREGATE_METRICS: [&str; 5] = ["min", "max", "avg", "sum", "count"];

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationResult {
    pub result_type: ResultType,
    pub warning: bool,
    pub outcome: CheckOutcome,
    pub row_count: Option<i64>,
    pub missing_count: Option<i64>,
    pub unexpected_count: Option<i64>,
    pub actual_agg_value: Option<f64>,
    /// All metrics of the check, verbatim and in order.
    pub metrics: Vec<Metric>,
}

fn as_count(value: f64) -> Option<i64> {
    value.is_finite().then(|| value.trunc() as i64)
}

impl EvaluationResult {
    pub fn from_check(check: &Check) -> Self {
        let (result_type, warning) = match check.outcome {
            CheckOutcome::Pass => (ResultType::Success, false),
            CheckOutcome::Warn => (ResultType::Success, true),
            CheckOutcome::Fail => (ResultType::Failure, false),
            CheckOutcome::Error => (ResultType::Error, false),
        };

        Self {
            result_type,
            warning,
            outcome: check.outcome,
            row_count: check.metric("row_count").and_then(as_count),
            missing_count: check.metric("missing_count").and_then(as_count),
            unexpected_count: check.metric("unexpected_count").and_then(as_count),
            actual_agg_value: check
                .metrics
                .iter()
                .find(|m| AGGREGATE_METRICS.contains(&m.id.as_str()))
                .map(|m| m.value),
            metrics: check.metrics.clone(),
        }
    }

    pub fn is_passed(&self) -> bool {
        self.result_type == ResultType::Success
    }
}

/// One check, translated into the catalog's assertion vocabulary.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssertionMapping {
    pub check_name: String,
    pub check_type: String,
    pub definition: String,
    pub dataset_urn: DatasetUrn,
    pub field_urn: Option<FieldUrn>,
    pub scope: Scope,
    pub scope_urn: String,
    pub operator: OperatorKind,
    pub aggregation: Aggregation,
    pub parameters: BTreeMap<String, String>,
    pub evaluation: EvaluationResult,
    pub fingerprint: String,
}

impl AssertionMapping {
    pub fn assertion_urn(&self) -> String {
        urn::assertion_urn(&self.fingerprint)
    }

    pub fn definition_record(&self) -> AssertionDefinition {
        AssertionDefinition {
            fingerprint: self.fingerprint.clone(),
            scope_urn: self.scope_urn.clone(),
            dataset_urn: self.dataset_urn.to_string(),
            field_urns: self.field_urn.iter().map(ToString::to_string).collect(),
            scope: self.scope,
            operator: self.operator,
            aggregation: self.aggregation,
            native_type: self.check_type.clone(),
            parameters: self.parameters.clone(),
            check_name: self.check_name.clone(),
        }
    }

    pub fn evaluation_run(
        &self,
        assertion_urn: String,
        scan_id: &str,
        timestamp: DateTime<Utc>,
    ) -> EvaluationRun {
        EvaluationRun {
            assertion_urn,
            assertee_urn: self.dataset_urn.to_string(),
            run_id: timestamp.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
            scan_id: scan_id.to_string(),
            check_name: self.check_name.clone(),
            check_type: self.check_type.clone(),
            definition: self.definition.clone(),
            result: self.evaluation.clone(),
            timestamp,
        }
    }
}
