// scanlink-core/src/domain/assertion/mapper.rs

use std::collections::BTreeMap;
use tracing::{debug, warn};

use super::fingerprint::fingerprint;
use super::mapping::{
    Aggregation, AssertionMapping, EvaluationResult, OperatorKind, Scope, WellKnownOperator,
};
use crate::domain::configuration::IngestConfig;
use crate::domain::error::DomainError;
use crate::domain::scan::{Check, ScanDocument, ScannedTable};
use crate::domain::urn::{match_table, resolve_dataset};

/// Semantic family of a check, derived from its open-vocabulary type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckClass {
    NotNull,
    Uniqueness,
    RowCount,
    Schema,
    Other,
}

// Ordered: first match wins. Patterns are matched as lowercase substrings.
const CLASSIFICATION: &[(&[&str], CheckClass)] = &[
    (&["missing_count", "null"], CheckClass::NotNull),
    (&["duplicate_count", "unique"], CheckClass::Uniqueness),
    (&["row_count", "count"], CheckClass::RowCount),
    (&["schema"], CheckClass::Schema),
];

impl CheckClass {
    pub fn classify(check_type: &str) -> Self {
        let lowered = check_type.to_lowercase();
        CLASSIFICATION
            .iter()
            .find(|(patterns, _)| patterns.iter().any(|p| lowered.contains(p)))
            .map(|(_, class)| *class)
            .unwrap_or(CheckClass::Other)
    }

    fn operator(&self) -> OperatorKind {
        match self {
            Self::NotNull => OperatorKind::WellKnown(WellKnownOperator::NotNull),
            _ => OperatorKind::Native,
        }
    }

    fn aggregation(&self) -> Aggregation {
        match self {
            Self::NotNull => Aggregation::Identity,
            Self::Uniqueness => Aggregation::UniqueCount,
            Self::RowCount => Aggregation::RowCount,
            Self::Schema => Aggregation::Columns,
            Self::Other => Aggregation::Native,
        }
    }
}

/// Maps the checks of one scan to assertions. Pure: no I/O, no clock.
pub struct CheckMapper<'a> {
    data_source_name: &'a str,
    tables: &'a [ScannedTable],
    config: &'a IngestConfig,
}

impl<'a> CheckMapper<'a> {
    pub fn new(
        data_source_name: &'a str,
        tables: &'a [ScannedTable],
        config: &'a IngestConfig,
    ) -> Self {
        Self {
            data_source_name,
            tables,
            config,
        }
    }

    pub fn for_document(document: &'a ScanDocument, config: &'a IngestConfig) -> Self {
        Self::new(&document.data_source_name, &document.tables, config)
    }

    pub fn map(&self, check: &Check) -> Result<AssertionMapping, DomainError> {
        let matched = match_table(check, self.tables)?;
        let dataset_urn = resolve_dataset(self.data_source_name, &matched.table, self.config);

        // An unmatched table reference is only trusted at dataset level.
        let column = if matched.scanned {
            check.column.as_deref()
        } else {
            if let Some(column) = &check.column {
                warn!(
                    check = %check.name,
                    column = %column,
                    table = %matched.table.qualified_name(),
                    "Table not found in scan, ignoring column reference"
                );
            }
            None
        };

        let class = CheckClass::classify(&check.check_type);
        let scope = match (class, column) {
            (CheckClass::Uniqueness, None) => {
                return Err(DomainError::unresolvable(
                    &check.name,
                    "uniqueness checks require a column on a scanned table",
                ));
            }
            (CheckClass::Uniqueness, Some(_)) => Scope::Column,
            (CheckClass::RowCount, _) => Scope::Dataset,
            (CheckClass::Schema, _) => Scope::Schema,
            (CheckClass::NotNull | CheckClass::Other, Some(_)) => Scope::Column,
            (CheckClass::NotNull | CheckClass::Other, None) => Scope::Dataset,
        };

        let field_urn = match (scope, column) {
            (Scope::Column, Some(column)) => Some(dataset_urn.field(column)),
            _ => None,
        };
        let scope_urn = match &field_urn {
            Some(field) => field.to_string(),
            None => dataset_urn.to_string(),
        };

        let operator = class.operator();
        let fingerprint = fingerprint(&scope_urn, &check.name, operator);

        debug!(
            check = %check.name,
            class = ?class,
            scope = ?scope,
            operator = operator.as_str(),
            "Mapped check"
        );

        Ok(AssertionMapping {
            check_name: check.name.clone(),
            check_type: check.check_type.clone(),
            definition: check.definition.clone(),
            dataset_urn,
            field_urn,
            scope,
            scope_urn,
            operator,
            aggregation: class.aggregation(),
            parameters: BTreeMap::from([("definition".to_string(), check.definition.clone())]),
            evaluation: EvaluationResult::from_check(check),
            fingerprint,
        })
    }

    /// Maps every check, keeping failures in place so each check is accounted for.
    pub fn map_all<'c>(
        &self,
        checks: &'c [Check],
    ) -> Vec<(&'c Check, Result<AssertionMapping, DomainError>)> {
        checks.iter().map(|c| (c, self.map(c))).collect()
    }
}
