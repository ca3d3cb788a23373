// scanlink-core/src/infrastructure/adapters/memory.rs

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use tracing::debug;

use crate::domain::urn;
use crate::ports::repository::{
    AssertionDefinition, AssertionRepository, EvaluationRun, RepositoryError,
};

#[derive(Debug, Default)]
struct Store {
    definitions: BTreeMap<String, AssertionDefinition>,
    runs: Vec<EvaluationRun>,
}

/// Catalog stand-in keyed by fingerprint. Backs `--dry-run` and tests.
#[derive(Debug, Default, Clone)]
pub struct InMemoryRepository {
    store: Arc<Mutex<Store>>,
    failure: Option<RepositoryError>,
}

impl InMemoryRepository {
    /// A repository that rejects every call with `error`.
    pub fn failing(error: RepositoryError) -> Self {
        Self {
            store: Arc::default(),
            failure: Some(error),
        }
    }

    // A poisoned lock only means a test panicked mid-call; the data is still usable.
    fn store(&self) -> MutexGuard<'_, Store> {
        self.store.lock().unwrap_or_else(|p| p.into_inner())
    }

    pub fn definition_count(&self) -> usize {
        self.store().definitions.len()
    }

    /// Stored definitions, ordered by fingerprint.
    pub fn definitions(&self) -> Vec<AssertionDefinition> {
        self.store().definitions.values().cloned().collect()
    }

    pub fn definition(&self, fingerprint: &str) -> Option<AssertionDefinition> {
        self.store().definitions.get(fingerprint).cloned()
    }

    pub fn runs(&self) -> Vec<EvaluationRun> {
        self.store().runs.clone()
    }
}

#[async_trait]
impl AssertionRepository for InMemoryRepository {
    async fn upsert_assertion_definition(
        &self,
        definition: &AssertionDefinition,
    ) -> Result<String, RepositoryError> {
        if let Some(err) = &self.failure {
            return Err(err.clone());
        }
        let replaced = self
            .store()
            .definitions
            .insert(definition.fingerprint.clone(), definition.clone())
            .is_some();
        debug!(fingerprint = %definition.fingerprint, replaced, "Stored assertion definition");
        Ok(urn::assertion_urn(&definition.fingerprint))
    }

    async fn record_evaluation(&self, run: &EvaluationRun) -> Result<(), RepositoryError> {
        if let Some(err) = &self.failure {
            return Err(err.clone());
        }
        self.store().runs.push(run.clone());
        Ok(())
    }
}
