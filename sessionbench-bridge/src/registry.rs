//! Session Registry
//!
//! Maps session names to live [`SessionStore`]s so that every context logging
//! into the same session shares one store, and with it one append lock.
//! Entries are weak: a store lives as long as some handle holds it.

use crate::error::BridgeError;
use sessionbench_store::{
    CaseResult, DEFAULT_STORAGE_ROOT, SessionStore, benchmarks_root, default_session_name,
    layout::sanitize_component,
};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock, PoisonError, Weak};

/// Environment variable naming the storage root for the global registry
pub const STORAGE_ROOT_ENV: &str = "SESSIONBENCH_ROOT";

static GLOBAL: OnceLock<SessionRegistry> = OnceLock::new();

/// Name-keyed registry of open sessions under one sessions root
#[derive(Debug)]
pub struct SessionRegistry {
    root: PathBuf,
    sessions: Mutex<HashMap<String, Weak<SessionStore>>>,
}

impl SessionRegistry {
    /// Registry over `root`, the directory holding one sub-directory per session
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Install the process-wide registry used by the C ABI and return it.
    ///
    /// Installing again with the same root returns the existing registry. A
    /// different root is rejected: sessions already handed out through the C
    /// ABI would otherwise split across two directories.
    pub fn install_global(root: impl Into<PathBuf>) -> Result<&'static SessionRegistry, BridgeError> {
        let root = root.into();
        let registry = GLOBAL.get_or_init(|| {
            tracing::debug!(root = %root.display(), "global session registry installed");
            SessionRegistry::new(root.clone())
        });
        if registry.root == root {
            Ok(registry)
        } else {
            Err(BridgeError::InvalidArgument {
                name: "root",
                reason: format!(
                    "global session registry already uses {}",
                    registry.root.display()
                ),
            })
        }
    }

    /// The process-wide registry.
    ///
    /// Without [`install_global`](Self::install_global), the registry is
    /// created on first use under `$SESSIONBENCH_ROOT` or the default storage
    /// root.
    pub fn global() -> &'static SessionRegistry {
        GLOBAL.get_or_init(|| {
            let storage_root = std::env::var_os(STORAGE_ROOT_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_STORAGE_ROOT));
            SessionRegistry::new(benchmarks_root(storage_root))
        })
    }

    /// Sessions root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Attach to the session called `name`, opening it if no one holds it.
    ///
    /// Without a name a new timestamp-named session is used.
    pub fn open(&self, name: Option<&str>) -> Result<BridgeHandle, BridgeError> {
        let id = match name {
            Some(name) => sanitize_component(name.trim()),
            None => default_session_name(),
        };

        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        sessions.retain(|_, store| store.strong_count() > 0);

        if let Some(store) = sessions.get(&id).and_then(Weak::upgrade) {
            tracing::debug!(session = %id, "attached to open session");
            return Ok(BridgeHandle { store });
        }

        let store = Arc::new(SessionStore::open(&self.root, Some(&id))?);
        sessions.insert(store.session_id().to_string(), Arc::downgrade(&store));
        tracing::info!(session = %store.session_id(), "session opened");
        Ok(BridgeHandle { store })
    }

    /// Ids of sessions some handle still holds
    pub fn live_sessions(&self) -> Vec<String> {
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        sessions.retain(|_, store| store.strong_count() > 0);
        let mut ids: Vec<String> = sessions.keys().cloned().collect();
        ids.sort();
        ids
    }
}

/// A context's attachment to a shared session
#[derive(Debug, Clone)]
pub struct BridgeHandle {
    store: Arc<SessionStore>,
}

impl BridgeHandle {
    /// Session identifier
    pub fn session_id(&self) -> &str {
        self.store.session_id()
    }

    /// The shared store
    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    /// Compute statistics for `samples` and persist them to the session.
    pub fn log_samples(
        &self,
        key: &str,
        display_name: &str,
        source_label: &str,
        samples: &[f64],
    ) -> Result<CaseResult, BridgeError> {
        if key.trim().is_empty() {
            return Err(BridgeError::InvalidArgument {
                name: "key",
                reason: "must not be empty".into(),
            });
        }
        if let Some(bad) = samples.iter().find(|d| !d.is_finite() || **d < 0.0) {
            return Err(BridgeError::InvalidArgument {
                name: "samples",
                reason: format!("durations must be finite and non-negative, got {bad}"),
            });
        }
        let result = CaseResult::from_durations(key, display_name, source_label, samples)?;
        self.store.record(&result)?;
        tracing::debug!(
            session = %self.session_id(),
            key,
            source = source_label,
            samples = samples.len(),
            "samples logged"
        );
        Ok(result)
    }

    /// Detach from the session
    pub fn close(self) {
        tracing::debug!(session = %self.session_id(), "handle closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sessionbench_store::SessionCatalog;
    use tempfile::TempDir;

    #[test]
    fn test_same_name_shares_store() {
        let tmp = TempDir::new().unwrap();
        let registry = SessionRegistry::new(tmp.path());

        let a = registry.open(Some("S1")).unwrap();
        let b = registry.open(Some("S1")).unwrap();
        assert!(Arc::ptr_eq(a.store(), b.store()));

        let c = registry.open(Some("S2")).unwrap();
        assert!(!Arc::ptr_eq(a.store(), c.store()));
    }

    #[test]
    fn test_names_match_after_sanitizing() {
        let tmp = TempDir::new().unwrap();
        let registry = SessionRegistry::new(tmp.path());

        let a = registry.open(Some("2025-10-08T12:34:56Z")).unwrap();
        let b = registry.open(Some("2025-10-08T12-34-56Z")).unwrap();
        assert!(Arc::ptr_eq(a.store(), b.store()));
    }

    #[test]
    fn test_close_prunes_entry() {
        let tmp = TempDir::new().unwrap();
        let registry = SessionRegistry::new(tmp.path());

        let a = registry.open(Some("S1")).unwrap();
        let b = a.clone();
        a.close();
        assert_eq!(registry.live_sessions(), vec!["S1".to_string()]);
        b.close();
        assert!(registry.live_sessions().is_empty());
    }

    #[test]
    fn test_log_samples_persists() {
        let tmp = TempDir::new().unwrap();
        let registry = SessionRegistry::new(tmp.path());
        let handle = registry.open(Some("S1")).unwrap();

        let result = handle
            .log_samples("array_append", "Vec push", "C-ABI", &[10.0, 20.0, 30.0])
            .unwrap();
        assert_eq!(result.stats.median, 20.0);
        assert!(handle.store().case_path("array_append", "C-ABI").exists());

        let state = SessionCatalog::new(tmp.path()).load_all();
        assert_eq!(state.rows.len(), 1);
        assert_eq!(state.rows[0].source_label, "C-ABI");
    }

    #[test]
    fn test_log_rejects_empty_input() {
        let tmp = TempDir::new().unwrap();
        let registry = SessionRegistry::new(tmp.path());
        let handle = registry.open(Some("S1")).unwrap();

        assert!(matches!(
            handle.log_samples("", "n", "s", &[1.0]),
            Err(BridgeError::InvalidArgument { name: "key", .. })
        ));
        assert!(matches!(
            handle.log_samples("k", "n", "s", &[]),
            Err(BridgeError::Store(_))
        ));
        assert!(!handle.store().summary_path().exists());
    }

    #[test]
    fn test_log_rejects_bad_durations() {
        let tmp = TempDir::new().unwrap();
        let registry = SessionRegistry::new(tmp.path());
        let handle = registry.open(Some("S1")).unwrap();

        for samples in [[1.0, f64::NAN], [f64::INFINITY, 2.0], [-1.0, 2.0]] {
            let err = handle.log_samples("k", "n", "C", &samples).unwrap_err();
            assert!(matches!(err, BridgeError::InvalidArgument { name: "samples", .. }));
            assert_eq!(err.code(), crate::BENCH_ERR_INVALID_ARGUMENT);
        }
        assert!(!handle.store().summary_path().exists());
        assert!(!handle.store().case_path("k", "C").exists());

        handle.log_samples("k", "n", "C", &[0.0, 2.0]).unwrap();
    }

    #[test]
    fn test_contexts_log_concurrently() {
        let tmp = TempDir::new().unwrap();
        let registry = Arc::new(SessionRegistry::new(tmp.path()));

        let handles: Vec<_> = ["Rust", "C-ABI"]
            .into_iter()
            .map(|source| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || {
                    let handle = registry.open(Some("shared")).unwrap();
                    for i in 0..20 {
                        handle
                            .log_samples(&format!("case_{i}"), "n", source, &[1.0, 2.0])
                            .unwrap();
                    }
                    handle.close();
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let state = SessionCatalog::new(tmp.path()).load_all();
        assert_eq!(state.session_ids, vec!["shared".to_string()]);
        assert_eq!(state.rows.len(), 40);
    }
}
