//! Build-scoped cache of composite types.
//!
//! The engine rejects two distinct types sharing a name, so every composite
//! type is built once per schema session and shared by reference afterwards.
//! Types that are still being built are tracked separately so that a
//! self-referencing model resolves to a by-name reference instead of
//! recursing forever.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use indexmap::IndexMap;

use super::composite::CompositeType;

#[derive(Debug, Default)]
struct CacheState {
    /// Types that have been fully built.
    generated: IndexMap<String, Arc<CompositeType>>,
    /// Types currently being built (for cycle detection).
    generating: HashSet<String>,
}

/// Name-keyed cache of built composite types for one schema build.
#[derive(Debug, Default)]
pub struct TypeCache {
    state: Mutex<CacheState>,
}

impl TypeCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the built type registered under `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<CompositeType>> {
        self.state().generated.get(name).cloned()
    }

    /// Checks if a type has been built or is being built.
    #[must_use]
    pub fn is_known(&self, name: &str) -> bool {
        let state = self.state();
        state.generated.contains_key(name) || state.generating.contains(name)
    }

    /// Marks a type as currently being built.
    pub fn start_generating(&self, name: &str) {
        self.state().generating.insert(name.to_string());
    }

    /// Stores a finished type and returns the cached instance.
    ///
    /// If a concurrent builder finished the same name first, its instance is
    /// kept and returned.
    pub fn finish_generating(&self, ty: CompositeType) -> Arc<CompositeType> {
        let mut state = self.state();
        state.generating.remove(&ty.name);
        Arc::clone(
            state
                .generated
                .entry(ty.name.clone())
                .or_insert_with(|| Arc::new(ty)),
        )
    }

    /// All built types in completion order.
    #[must_use]
    pub fn types(&self) -> Vec<Arc<CompositeType>> {
        self.state().generated.values().cloned().collect()
    }

    /// Returns the number of built types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state().generated.len()
    }

    /// Returns `true` if nothing has been built.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
