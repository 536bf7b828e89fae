//! Namespace registry vending views onto shared in-memory storage.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, info};

use crate::config::StoreConfig;
use crate::error::{StoreError, StoreResult};
use crate::memory::{MemoryStorage, MemoryStoreView};
use crate::traits::{ChunkStore, StoreFactory};

/// Characters that are forbidden anywhere in a namespace.
const FORBIDDEN_CHARS: &[char] = &[' ', '\t', '\n', '\r', '\\'];

/// Validate a namespace name, returning `Ok(())` if valid.
///
/// ```
/// use tessera_store::factory::validate_namespace;
///
/// assert!(validate_namespace("users/alice").is_ok());
/// assert!(validate_namespace("").is_err());
/// assert!(validate_namespace("../escape").is_err());
/// ```
pub fn validate_namespace(name: &str) -> StoreResult<()> {
    let reject = |reason: &str| {
        Err(StoreError::InvalidNamespace {
            name: name.to_string(),
            reason: reason.to_string(),
        })
    };

    if name.is_empty() {
        return reject("namespace must not be empty");
    }
    if let Some(ch) = name
        .chars()
        .find(|c| FORBIDDEN_CHARS.contains(c) || c.is_control())
    {
        return reject(&format!("contains forbidden character: {ch:?}"));
    }
    if name.contains("..") {
        return reject("must not contain '..'");
    }
    if name.starts_with('/') || name.ends_with('/') {
        return reject("must not start or end with '/'");
    }
    Ok(())
}

/// Registry of one [`MemoryStorage`] per namespace.
///
/// Each factory is an independent registry; two factories never share
/// storage. After [`shutter`](StoreFactory::shutter) the registry is gone and
/// every lookup fails with [`StoreError::FactoryShuttered`], while views
/// handed out earlier keep their storage alive.
#[derive(Debug)]
pub struct MemoryStoreFactory {
    config: StoreConfig,
    stores: Mutex<Option<HashMap<String, Arc<MemoryStorage>>>>,
}

impl MemoryStoreFactory {
    /// Create an empty factory with default configuration.
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    /// Create an empty factory.
    pub fn with_config(config: StoreConfig) -> Self {
        Self {
            config,
            stores: Mutex::new(Some(HashMap::new())),
        }
    }

    /// The factory's configuration.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Return a view onto `namespace`, creating its storage on first use.
    pub fn create_view(&self, namespace: &str) -> StoreResult<MemoryStoreView> {
        let mut guard = self.stores.lock().unwrap_or_else(PoisonError::into_inner);
        let stores = guard.as_mut().ok_or(StoreError::FactoryShuttered)?;

        if let Some(storage) = stores.get(namespace) {
            return Ok(storage.new_view());
        }

        if self.config.validate_namespaces {
            validate_namespace(namespace)?;
        }
        if let Some(limit) = self.config.max_namespaces {
            if stores.len() >= limit {
                return Err(StoreError::NamespaceLimit { limit });
            }
        }

        let storage = Arc::new(MemoryStorage::new());
        stores.insert(namespace.to_string(), Arc::clone(&storage));
        debug!(namespace, "created namespace storage");
        Ok(storage.new_view())
    }

    /// Registered namespaces, sorted. Empty once shuttered.
    pub fn namespaces(&self) -> Vec<String> {
        let guard = self.stores.lock().unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<String> = guard
            .as_ref()
            .map(|stores| stores.keys().cloned().collect())
            .unwrap_or_default();
        names.sort();
        names
    }

    /// Returns `true` after `shutter()`.
    pub fn is_shuttered(&self) -> bool {
        self.stores
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }
}

impl Default for MemoryStoreFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl StoreFactory for MemoryStoreFactory {
    fn create_store(&self, namespace: &str) -> StoreResult<Box<dyn ChunkStore>> {
        Ok(Box::new(self.create_view(namespace)?))
    }

    fn shutter(&self) {
        let dropped = self
            .stores
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .map_or(0, |stores| stores.len());
        info!(namespaces = dropped, "store factory shuttered");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_types::{Chunk, Hash};

    #[test]
    fn new_namespace_starts_empty() {
        let factory = MemoryStoreFactory::new();
        let view = factory.create_store("fresh").unwrap();
        assert!(view.root().unwrap().is_zero());
        assert_eq!(view.len().unwrap(), 0);
    }

    #[test]
    fn same_namespace_shares_storage() {
        let factory = MemoryStoreFactory::new();
        let v1 = factory.create_view("ns").unwrap();
        let v2 = factory.create_view("ns").unwrap();
        assert!(Arc::ptr_eq(v1.storage(), v2.storage()));
        assert_eq!(v1.root().unwrap(), v2.root().unwrap());
    }

    #[test]
    fn distinct_namespaces_are_isolated() {
        let factory = MemoryStoreFactory::new();
        let a = factory.create_store("a").unwrap();
        let b = factory.create_store("b").unwrap();
        let c = Chunk::from(&b"only in a"[..]);

        a.put(c.clone()).unwrap();
        assert!(a.commit(c.hash(), Hash::zero()).unwrap());

        assert!(!b.has(&c.hash()).unwrap());
        b.rebase().unwrap();
        assert!(b.root().unwrap().is_zero());
        assert_eq!(factory.namespaces(), vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn flushed_chunk_visible_to_later_view() {
        let factory = MemoryStoreFactory::new();
        let v1 = factory.create_store("ns").unwrap();
        let c = Chunk::from(&b"flushed"[..]);
        v1.put(c.clone()).unwrap();
        v1.flush().unwrap();

        let v2 = factory.create_store("ns").unwrap();
        assert!(v2.has(&c.hash()).unwrap());
        assert!(v2.root().unwrap().is_zero());
    }

    #[test]
    fn later_view_starts_at_committed_root() {
        let factory = MemoryStoreFactory::new();
        let v1 = factory.create_store("ns").unwrap();
        let r1 = Hash::of(b"r1");
        assert!(v1.commit(r1, Hash::zero()).unwrap());

        let v2 = factory.create_store("ns").unwrap();
        assert_eq!(v2.root().unwrap(), r1);
    }

    #[test]
    fn commit_conflict_across_factory_views() {
        let factory = MemoryStoreFactory::new();
        let v1 = factory.create_store("ns").unwrap();
        let v2 = factory.create_store("ns").unwrap();
        let r0 = Hash::zero();
        let r1 = Hash::of(b"r1");
        let r2 = Hash::of(b"r2");

        assert!(v1.commit(r1, r0).unwrap());
        assert!(!v2.commit(r2, r0).unwrap());
        v2.rebase().unwrap();
        assert_eq!(v2.root().unwrap(), r1);
    }

    #[test]
    fn create_after_shutter_fails() {
        let factory = MemoryStoreFactory::new();
        factory.create_store("ns").unwrap();
        factory.shutter();

        assert!(factory.is_shuttered());
        assert!(factory.namespaces().is_empty());
        let err = factory.create_store("ns").err().expect("should fail");
        assert!(matches!(err, StoreError::FactoryShuttered));
    }

    #[test]
    fn views_survive_shutter() {
        let factory = MemoryStoreFactory::new();
        let view = factory.create_store("ns").unwrap();
        factory.shutter();

        let c = Chunk::from(&b"after shutter"[..]);
        view.put(c.clone()).unwrap();
        assert!(view.commit(c.hash(), Hash::zero()).unwrap());
        assert_eq!(view.get(&c.hash()).unwrap(), c);
    }

    #[test]
    fn validation_is_opt_in() {
        let lax = MemoryStoreFactory::new();
        assert!(lax.create_store("").is_ok());

        let strict = MemoryStoreFactory::with_config(StoreConfig {
            validate_namespaces: true,
            ..StoreConfig::default()
        });
        assert!(strict.create_store("good/name").is_ok());
        for bad in ["", "has space", "a/../b", "/lead", "trail/", "tab\there"] {
            let err = strict.create_store(bad).err().expect("should reject");
            assert!(matches!(err, StoreError::InvalidNamespace { .. }), "{bad:?}");
        }
    }

    #[test]
    fn namespace_limit_applies_to_new_names_only() {
        let factory = MemoryStoreFactory::with_config(StoreConfig {
            max_namespaces: Some(1),
            ..StoreConfig::default()
        });
        factory.create_store("first").unwrap();
        factory.create_store("first").unwrap();
        let err = factory.create_store("second").err().expect("should hit limit");
        assert!(matches!(err, StoreError::NamespaceLimit { limit: 1 }));
    }

    #[test]
    fn factory_as_trait_object() {
        let factory: Box<dyn StoreFactory> = Box::new(MemoryStoreFactory::new());
        let view = factory.create_store("ns").unwrap();
        assert_eq!(view.version(), tessera_types::FORMAT_VERSION);
        factory.shutter();
        assert!(factory.create_store("ns").is_err());
    }
}
