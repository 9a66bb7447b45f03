//! In-memory template store with built-in templates.

use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
};

use railgen_core::{
    application::{ApplicationError, ports::TemplateStore},
    domain::{Component, TemplateSet},
    error::RailgenResult,
};
use tracing::debug;

use crate::builtin_templates;

/// Thread-safe in-memory template store, one set per component.
#[derive(Clone)]
pub struct InMemoryStore {
    inner: Arc<RwLock<HashMap<Component, TemplateSet>>>,
}

impl InMemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Create a store with built-in templates loaded.
    pub fn with_builtin() -> RailgenResult<Self> {
        let store = Self::new();
        store.load_builtin()?;
        Ok(store)
    }

    /// Load built-in templates.
    pub fn load_builtin(&self) -> RailgenResult<()> {
        for set in builtin_templates::all_template_sets() {
            self.insert(set)?;
        }
        Ok(())
    }

    /// Validate and store a set, replacing any set for the same component.
    pub fn insert(&self, set: TemplateSet) -> RailgenResult<()> {
        set.validate()?;
        let mut inner = self
            .inner
            .write()
            .map_err(|_| ApplicationError::StoreLockError)?;
        debug!(component = %set.component, files = set.files.len(), "Template set registered");
        inner.insert(set.component, set);
        Ok(())
    }

    /// Get the number of template sets.
    pub fn len(&self) -> usize {
        self.inner.read().map(|m| m.len()).unwrap_or(0)
    }

    /// Check if store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateStore for InMemoryStore {
    fn get(&self, component: Component) -> RailgenResult<TemplateSet> {
        let inner = self
            .inner
            .read()
            .map_err(|_| ApplicationError::StoreLockError)?;

        inner.get(&component).cloned().ok_or_else(|| {
            ApplicationError::TemplateNotFound {
                component: component.to_string(),
            }
            .into()
        })
    }

    fn list(&self) -> RailgenResult<Vec<Component>> {
        let inner = self
            .inner
            .read()
            .map_err(|_| ApplicationError::StoreLockError)?;

        // Stable order for callers that print the list.
        Ok(Component::ALL
            .into_iter()
            .filter(|c| inner.contains_key(c))
            .collect())
    }
}
