//! Processed-file registry
//!
//! Records every logical file identifier admitted for processing during the
//! lifetime of the process. Identifiers are never removed. An identifier whose
//! processing failed is additionally marked so that later arrivals under the
//! same name can be left on disk instead of being deleted.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Admission {
    Admitted,
    Failed,
}

/// Set of admitted identifiers with an atomic check-and-insert
#[derive(Debug, Default)]
pub struct ProcessedFileRegistry {
    entries: Mutex<HashMap<String, Admission>>,
}

impl ProcessedFileRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `identifier`; returns `true` only for its first admission
    pub fn admit(&self, identifier: &str) -> bool {
        let mut entries = self.lock();
        if entries.contains_key(identifier) {
            debug!("Identifier '{}' already admitted", identifier);
            return false;
        }
        entries.insert(identifier.to_string(), Admission::Admitted);
        true
    }

    /// Mark an admitted identifier whose processing failed
    pub fn mark_failed(&self, identifier: &str) {
        self.lock()
            .insert(identifier.to_string(), Admission::Failed);
    }

    /// Whether processing of `identifier` failed earlier
    pub fn is_failed(&self, identifier: &str) -> bool {
        self.lock().get(identifier) == Some(&Admission::Failed)
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.lock().contains_key(identifier)
    }

    // A panic while holding the lock cannot leave the map half-updated
    fn lock(&self) -> MutexGuard<'_, HashMap<String, Admission>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
