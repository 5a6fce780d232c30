//! Process-wide cache mapping a logical action identity to its debouncer.
//!
//! Repeated requests for "the same kind of work" must share one coalescing
//! engine and one tuning history, so the registry hands out `Arc` clones of a
//! lazily constructed [`Debouncer`] per key. Entries live for the registry's
//! lifetime; there is no eviction.
//!
//! The registry is an explicit object, constructed once at process start and
//! threaded through to producers, rather than a global static: tests can run
//! several independent registries side by side.

use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;

use super::debouncer::Debouncer;
use crate::config::DebouncerConfig;

/// Thread-safe get-or-create cache of debouncers keyed by action identity.
pub struct DebouncerRegistry<T: Clone + Send + 'static> {
    debouncers: DashMap<String, Arc<Debouncer<T>>>,
}

impl<T: Clone + Send + 'static> DebouncerRegistry<T> {
    pub fn new() -> Self {
        Self {
            debouncers: DashMap::new(),
        }
    }

    /// Get the debouncer registered under `key`, constructing it on first
    /// use.
    ///
    /// The key must be stable across submissions that represent the same kind
    /// of work. Only the first caller's `config` and `action` take effect;
    /// later callers share the first caller's timer and tuning history.
    pub fn get_or_create(
        &self,
        key: &str,
        config: &DebouncerConfig,
        action: impl Fn(T) -> anyhow::Result<()> + Send + Sync + 'static,
    ) -> Arc<Debouncer<T>> {
        self.debouncers
            .entry(key.to_string())
            .or_insert_with(|| {
                debug!(key, "creating debouncer");
                Arc::new(Debouncer::new(action, config))
            })
            .clone()
    }

    /// Number of distinct action identities registered so far.
    pub fn len(&self) -> usize {
        self.debouncers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.debouncers.is_empty()
    }
}

impl<T: Clone + Send + 'static> Default for DebouncerRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn immediate_config() -> DebouncerConfig {
        DebouncerConfig {
            enabled: false,
            ..DebouncerConfig::default()
        }
    }

    #[test]
    fn same_key_returns_the_same_debouncer() {
        let registry: DebouncerRegistry<u32> = DebouncerRegistry::new();
        let config = immediate_config();

        let first = registry.get_or_create("emit-dto", &config, |_| Ok(()));
        let second = registry.get_or_create("emit-dto", &config, |_| Ok(()));

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn distinct_keys_get_distinct_debouncers() {
        let registry: DebouncerRegistry<u32> = DebouncerRegistry::new();
        let config = immediate_config();

        let first = registry.get_or_create("emit-dto", &config, |_| Ok(()));
        let second = registry.get_or_create("emit-diagnostics", &config, |_| Ok(()));

        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn registries_are_independent() {
        let config = immediate_config();
        let left: DebouncerRegistry<u32> = DebouncerRegistry::new();
        let right: DebouncerRegistry<u32> = DebouncerRegistry::new();

        let a = left.get_or_create("emit-dto", &config, |_| Ok(()));
        let b = right.get_or_create("emit-dto", &config, |_| Ok(()));

        assert!(!Arc::ptr_eq(&a, &b));
        assert!(!left.is_empty());
    }
}
