//! History Model
//!
//! Shared, swappable view of the catalog for presentation code. Reloads and
//! deletes can run on a background thread; the published [`CatalogState`] is
//! replaced in one step when they finish, so readers never observe a partial
//! reload.

use crate::catalog::{CatalogState, SessionCatalog};
use crate::error::StoreError;
use std::io;
use std::sync::{Arc, PoisonError, RwLock};
use std::thread::{self, JoinHandle};

/// Catalog plus the most recently loaded state
#[derive(Debug, Clone)]
pub struct HistoryModel {
    catalog: SessionCatalog,
    state: Arc<RwLock<CatalogState>>,
}

impl HistoryModel {
    /// Model over `catalog`, starting empty until the first reload
    pub fn new(catalog: SessionCatalog) -> Self {
        Self {
            catalog,
            state: Arc::new(RwLock::new(CatalogState::default())),
        }
    }

    /// Underlying catalog
    pub fn catalog(&self) -> &SessionCatalog {
        &self.catalog
    }

    /// Copy of the current state
    pub fn snapshot(&self) -> CatalogState {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Reload from disk and publish the result
    pub fn reload(&self) -> CatalogState {
        let state = self.catalog.load_all();
        self.publish(state.clone());
        state
    }

    /// Delete every session and publish the emptied state
    pub fn delete_all(&self) -> Result<CatalogState, StoreError> {
        let state = self.catalog.delete_all()?;
        self.publish(state.clone());
        Ok(state)
    }

    /// Run [`reload`](Self::reload) on a background thread
    pub fn reload_in_background(&self) -> io::Result<JoinHandle<CatalogState>> {
        let model = self.clone();
        thread::Builder::new()
            .name("sessionbench-history".into())
            .spawn(move || model.reload())
    }

    /// Run [`delete_all`](Self::delete_all) on a background thread
    pub fn delete_all_in_background(
        &self,
    ) -> io::Result<JoinHandle<Result<CatalogState, StoreError>>> {
        let model = self.clone();
        thread::Builder::new()
            .name("sessionbench-history".into())
            .spawn(move || model.delete_all())
    }

    fn publish(&self, state: CatalogState) {
        *self.state.write().unwrap_or_else(PoisonError::into_inner) = state;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::CaseResult;
    use crate::store::SessionStore;
    use tempfile::TempDir;

    fn seeded() -> (TempDir, HistoryModel) {
        let tmp = TempDir::new().unwrap();
        let store = SessionStore::open(tmp.path(), Some("S1")).unwrap();
        store
            .record(&CaseResult::from_durations("k", "n", "s", &[1.0, 2.0]).unwrap())
            .unwrap();
        let model = HistoryModel::new(SessionCatalog::new(tmp.path()));
        (tmp, model)
    }

    #[test]
    fn test_starts_empty() {
        let (_tmp, model) = seeded();
        assert!(model.snapshot().is_empty());
    }

    #[test]
    fn test_reload_publishes() {
        let (_tmp, model) = seeded();
        let loaded = model.reload();
        assert_eq!(loaded.rows.len(), 1);
        assert_eq!(model.snapshot(), loaded);
    }

    #[test]
    fn test_reload_is_idempotent() {
        let (_tmp, model) = seeded();
        let first = model.reload();
        let second = model.reload();
        assert_eq!(first, second);
    }

    #[test]
    fn test_background_reload() {
        let (_tmp, model) = seeded();
        let handle = model.reload_in_background().unwrap();
        let state = handle.join().unwrap();
        assert_eq!(state.latest_session_id.as_deref(), Some("S1"));
        assert_eq!(model.snapshot(), state);
    }

    #[test]
    fn test_background_delete() {
        let (_tmp, model) = seeded();
        model.reload();
        let state = model.delete_all_in_background().unwrap().join().unwrap().unwrap();
        assert!(state.is_empty());
        assert!(model.snapshot().is_empty());
    }
}
