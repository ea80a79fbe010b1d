//! Case Registry
//!
//! Cases are plain descriptors registered at startup: a stable key, a display
//! name, optional per-case iteration overrides, and a boxed closure that
//! measures something through the [`Sampler`] it is handed. The registry keeps
//! registration order, which is also execution order.

use crate::sampler::Sampler;
use std::fmt;

/// Closure that performs a case's measurement
///
/// The closure may do untimed preparation (building lookup tables, etc.)
/// before handing its work unit to the sampler.
pub type CaseFn = Box<dyn Fn(&Sampler) -> Vec<f64> + Send + Sync>;

/// A registered benchmark case
pub struct CaseDef {
    key: String,
    display_name: String,
    warmup: Option<usize>,
    samples: Option<usize>,
    run: CaseFn,
}

impl CaseDef {
    /// Create a case with the given key, display name and measurement closure
    pub fn new<F>(key: impl Into<String>, display_name: impl Into<String>, run: F) -> Self
    where
        F: Fn(&Sampler) -> Vec<f64> + Send + Sync + 'static,
    {
        Self {
            key: key.into(),
            display_name: display_name.into(),
            warmup: None,
            samples: None,
            run: Box::new(run),
        }
    }

    /// Override the warmup count for this case only
    pub fn with_warmup(mut self, warmup: usize) -> Self {
        self.warmup = Some(warmup);
        self
    }

    /// Override the sample count for this case only
    pub fn with_samples(mut self, samples: usize) -> Self {
        self.samples = Some(samples);
        self
    }

    /// Stable identifier, used in file names and summary rows
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Human-readable name
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Resolve this case's sampler from the run-wide defaults.
    ///
    /// Per-case overrides win; anything not overridden falls back to `defaults`.
    pub fn resolve_sampler(&self, defaults: Sampler) -> Sampler {
        Sampler::new(
            self.warmup.unwrap_or(defaults.warmup()),
            self.samples.unwrap_or(defaults.samples()),
        )
    }

    /// Execute the case with the given sampler
    pub fn run(&self, sampler: &Sampler) -> Vec<f64> {
        (self.run)(sampler)
    }
}

impl fmt::Debug for CaseDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CaseDef")
            .field("key", &self.key)
            .field("display_name", &self.display_name)
            .field("warmup", &self.warmup)
            .field("samples", &self.samples)
            .finish_non_exhaustive()
    }
}

/// Ordered collection of cases
#[derive(Debug, Default)]
pub struct Registry {
    cases: Vec<CaseDef>,
}

impl Registry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a case. A case whose key is already present replaces the
    /// earlier registration in place.
    pub fn register(&mut self, case: CaseDef) -> &mut Self {
        if let Some(existing) = self.cases.iter_mut().find(|c| c.key == case.key) {
            tracing::warn!(key = %case.key, "case registered twice; keeping the latest definition");
            *existing = case;
        } else {
            self.cases.push(case);
        }
        self
    }

    /// Shorthand for `register(CaseDef::new(..))`
    pub fn case<F>(
        &mut self,
        key: impl Into<String>,
        display_name: impl Into<String>,
        run: F,
    ) -> &mut Self
    where
        F: Fn(&Sampler) -> Vec<f64> + Send + Sync + 'static,
    {
        self.register(CaseDef::new(key, display_name, run))
    }

    /// Look up a case by key
    pub fn get(&self, key: &str) -> Option<&CaseDef> {
        self.cases.iter().find(|c| c.key == key)
    }

    /// Iterate cases in registration order
    pub fn iter(&self) -> impl Iterator<Item = &CaseDef> {
        self.cases.iter()
    }

    /// Number of registered cases
    pub fn len(&self) -> usize {
        self.cases.len()
    }

    /// Whether no cases are registered
    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }
}

impl<'a> IntoIterator for &'a Registry {
    type Item = &'a CaseDef;
    type IntoIter = std::slice::Iter<'a, CaseDef>;

    fn into_iter(self) -> Self::IntoIter {
        self.cases.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(key: &str) -> CaseDef {
        CaseDef::new(key, format!("{key} case"), |s: &Sampler| s.run(|| ()))
    }

    #[test]
    fn test_registration_order_is_kept() {
        let mut registry = Registry::new();
        registry.register(noop("c")).register(noop("a")).register(noop("b"));

        let keys: Vec<_> = registry.iter().map(|c| c.key()).collect();
        assert_eq!(keys, ["c", "a", "b"]);
    }

    #[test]
    fn test_duplicate_key_replaces() {
        let mut registry = Registry::new();
        registry.register(noop("a"));
        registry.register(CaseDef::new("a", "replacement", |s: &Sampler| s.run(|| ())));

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("a").map(|c| c.display_name()), Some("replacement"));
    }

    #[test]
    fn test_resolve_sampler_overrides() {
        let defaults = Sampler::new(3, 10);

        let plain = noop("plain");
        assert_eq!(plain.resolve_sampler(defaults), Sampler::new(3, 10));

        let tuned = noop("tuned").with_samples(25);
        assert_eq!(tuned.resolve_sampler(defaults), Sampler::new(3, 25));

        let cold = noop("cold").with_warmup(0).with_samples(1);
        assert_eq!(cold.resolve_sampler(defaults), Sampler::new(0, 1));
    }

    #[test]
    fn test_run_uses_sampler() {
        let case = noop("x");
        let durations = case.run(&Sampler::new(0, 4));
        assert_eq!(durations.len(), 4);
    }
}
