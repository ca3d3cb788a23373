// scanlink-core/src/domain/urn/mod.rs

// Catalog identifiers for platforms, datasets and columns.
// Everything here is pure: the same (table, config) always yields the same urn.

use serde::{Serialize, Serializer};
use std::fmt;

use crate::domain::configuration::IngestConfig;
use crate::domain::error::DomainError;
use crate::domain::scan::{Check, ScannedTable};

pub const URN_PREFIX: &str = "urn:li";

pub fn platform_urn(platform: &str) -> String {
    format!("{}:dataPlatform:{}", URN_PREFIX, platform)
}

pub fn assertion_urn(fingerprint: &str) -> String {
    format!("{}:assertion:{}", URN_PREFIX, fingerprint)
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DatasetUrn {
    pub platform: String,
    pub platform_instance: Option<String>,
    /// Fully-qualified `database.schema.table` name, never prefixed by the instance.
    pub name: String,
    pub env: String,
}

impl DatasetUrn {
    pub fn platform_urn(&self) -> String {
        platform_urn(&self.platform)
    }

    pub fn platform_instance_urn(&self) -> Option<String> {
        self.platform_instance.as_ref().map(|instance| {
            format!(
                "{}:dataPlatformInstance:({},{})",
                URN_PREFIX,
                self.platform_urn(),
                instance
            )
        })
    }

    pub fn field(&self, column: &str) -> FieldUrn {
        FieldUrn {
            dataset: self.clone(),
            column: column.to_string(),
        }
    }
}

impl fmt::Display for DatasetUrn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // The catalog keys instance-scoped datasets by prefixing the instance to the name.
        match &self.platform_instance {
            Some(instance) => write!(
                f,
                "{}:dataset:({},{}.{},{})",
                URN_PREFIX,
                self.platform_urn(),
                instance,
                self.name,
                self.env
            ),
            None => write!(
                f,
                "{}:dataset:({},{},{})",
                URN_PREFIX,
                self.platform_urn(),
                self.name,
                self.env
            ),
        }
    }
}

impl Serialize for DatasetUrn {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldUrn {
    pub dataset: DatasetUrn,
    pub column: String,
}

impl fmt::Display for FieldUrn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:schemaField:({},{})", URN_PREFIX, self.dataset, self.column)
    }
}

impl Serialize for FieldUrn {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Platform name: the configured alias, else the data-source name lowercased.
pub fn resolve_platform(data_source_name: &str, config: &IngestConfig) -> String {
    match &config.platform_alias {
        Some(alias) if !alias.trim().is_empty() => alias.clone(),
        _ => data_source_name.trim().to_lowercase(),
    }
}

pub fn resolve_dataset(
    data_source_name: &str,
    table: &ScannedTable,
    config: &IngestConfig,
) -> DatasetUrn {
    let mut name = table.qualified_name();
    // Platform and instance are catalog-defined identifiers and keep their case.
    if config.convert_urns_to_lowercase {
        name = name.to_lowercase();
    }

    DatasetUrn {
        platform: resolve_platform(data_source_name, config),
        platform_instance: config.platform_instance_map.get(data_source_name).cloned(),
        name,
        env: config.env.clone(),
    }
}

pub fn resolve_column(
    data_source_name: &str,
    table: &ScannedTable,
    column: &str,
    config: &IngestConfig,
) -> FieldUrn {
    resolve_dataset(data_source_name, table, config).field(column)
}

/// The table a check points at.
#[derive(Debug, Clone, PartialEq)]
pub struct TableMatch<'a> {
    pub table: std::borrow::Cow<'a, ScannedTable>,
    /// False when the reference matched no scanned table and was rebuilt from the check itself.
    pub scanned: bool,
}

/// Finds the scanned table a check refers to.
///
/// A check matches a table when the table names are equal and, if the check
/// names a schema, the schemas are equal too. Comparison is case-preserving.
pub fn match_table<'a>(
    check: &Check,
    tables: &'a [ScannedTable],
) -> Result<TableMatch<'a>, DomainError> {
    let Some(table_name) = check.table.as_deref() else {
        let reason = if check.column.is_some() {
            "check names a column but no table"
        } else {
            "check has no table reference"
        };
        return Err(DomainError::unresolvable(&check.name, reason));
    };

    let found = tables.iter().find(|t| {
        t.table_name == table_name
            && check
                .schema
                .as_deref()
                .is_none_or(|schema| t.schema_name.as_deref() == Some(schema))
    });

    Ok(match found {
        Some(table) => TableMatch {
            table: std::borrow::Cow::Borrowed(table),
            scanned: true,
        },
        None => TableMatch {
            table: std::borrow::Cow::Owned(ScannedTable {
                table_name: table_name.to_string(),
                schema_name: check.schema.clone(),
                database_name: None,
            }),
            scanned: false,
        },
    })
}
