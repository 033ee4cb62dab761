//! The source registry and its staleness snapshot.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use super::fs::{FileSystem, OsFileSystem};
use super::source::{SharedSource, SymbolSource};
use crate::base::{QualifiedName, SnapshotToken, SourceId};

/// Host hook that enumerates sources the host activated on its own, such as
/// the loaders of installed packages.
///
/// It is consulted only when the registry re-derives its snapshot, never on
/// a cached read.
pub trait SourceDiscovery: Send + Sync {
    fn discover(&self) -> Vec<SharedSource>;
}

/// Host hook reporting every symbol the running process has declared so far.
pub trait DeclaredSymbols: Send + Sync {
    fn current_declared_symbols(&self) -> Vec<QualifiedName>;
}

/// Registry-wide switches.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "manifest",
    derive(serde::Deserialize),
    serde(default, rename_all = "kebab-case")
)]
pub struct RegistryConfig {
    /// Merge the [`DeclaredSymbols`] snapshot after all sources.
    pub augment_with_declared: bool,
    /// Walk legacy prefix roots of non-authoritative sources.
    pub legacy_prefixes: bool,
    /// Extension of files that define symbols.
    pub symbol_extension: String,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            augment_with_declared: false,
            legacy_prefixes: false,
            symbol_extension: "php".to_owned(),
        }
    }
}

/// The registry's ordered source list, with the token that identifies it.
#[derive(Clone)]
pub struct SourceSnapshot {
    pub sources: Arc<[SharedSource]>,
    pub token: SnapshotToken,
}

impl fmt::Debug for SourceSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceSnapshot")
            .field("sources", &self.sources.len())
            .field("token", &self.token)
            .finish()
    }
}

/// Ordered set of sources that namespaces resolve against.
///
/// Registration order is merge order. The registry hands out a
/// [`SourceSnapshot`] whose token changes whenever the effective source list
/// changes; namespaces compare tokens to decide whether to re-merge.
///
/// Share it with `Arc`; all methods take `&self`.
pub struct SourceRegistry {
    inner: RwLock<RegistryInner>,
    fs: Arc<dyn FileSystem>,
}

struct RegistryInner {
    registered: Vec<(SourceId, SharedSource)>,
    next_id: u32,
    discovery: Option<Arc<dyn SourceDiscovery>>,
    declared: Option<Arc<dyn DeclaredSymbols>>,
    config: RegistryConfig,
    /// Last derived snapshot.
    cached: Option<SourceSnapshot>,
    /// Set when the cached snapshot must be re-derived before use.
    dirty: bool,
    last_token: SnapshotToken,
}

impl RegistryInner {
    fn new(config: RegistryConfig) -> Self {
        Self {
            registered: Vec::new(),
            next_id: 0,
            discovery: None,
            declared: None,
            config,
            cached: None,
            dirty: true,
            last_token: SnapshotToken::NONE,
        }
    }

    /// Issue a fresh token for the cached list so every tracked namespace
    /// re-merges.
    fn bump(&mut self) {
        self.last_token = self.last_token.next();
        if let Some(cached) = &mut self.cached {
            cached.token = self.last_token;
        }
    }
}

impl SourceRegistry {
    /// Create an empty registry over the real filesystem.
    pub fn new() -> Self {
        Self::with_file_system(Arc::new(OsFileSystem::new()))
    }

    /// Create an empty registry that walks prefix roots through `fs`.
    pub fn with_file_system(fs: Arc<dyn FileSystem>) -> Self {
        Self {
            inner: RwLock::new(RegistryInner::new(RegistryConfig::default())),
            fs,
        }
    }

    /// Create a shareable registry with the given configuration.
    pub fn init(config: RegistryConfig) -> Arc<Self> {
        let registry = Self::new();
        registry.set_config(config);
        Arc::new(registry)
    }

    /// Drop every source and hook and forget the cached snapshot.
    ///
    /// Configuration is kept. Tokens keep increasing across resets so a
    /// namespace prepared before the reset is always stale afterwards.
    pub fn reset(&self) {
        let mut inner = self.inner.write();
        inner.registered.clear();
        inner.next_id = 0;
        inner.discovery = None;
        inner.declared = None;
        inner.cached = None;
        inner.dirty = true;
        tracing::debug!("source registry reset");
    }

    /// Append a source. It is merged after every source registered before.
    pub fn register<S: SymbolSource + 'static>(&self, source: S) -> SourceId {
        self.register_shared(Arc::new(source))
    }

    /// Append an already shared source.
    pub fn register_shared(&self, source: SharedSource) -> SourceId {
        let mut inner = self.inner.write();
        let id = SourceId::new(inner.next_id);
        inner.next_id += 1;
        inner.registered.push((id, source));
        inner.dirty = true;
        tracing::trace!(%id, "registered source");
        id
    }

    /// Remove a previously registered source.
    pub fn unregister(&self, id: SourceId) -> Option<SharedSource> {
        let mut inner = self.inner.write();
        let index = inner.registered.iter().position(|(sid, _)| *sid == id)?;
        let (_, source) = inner.registered.remove(index);
        inner.dirty = true;
        Some(source)
    }

    /// Install the host's source-discovery hook.
    pub fn set_discovery(&self, discovery: Arc<dyn SourceDiscovery>) {
        let mut inner = self.inner.write();
        inner.discovery = Some(discovery);
        inner.dirty = true;
    }

    /// Install the host's declared-symbol provider.
    pub fn set_declared_symbols(&self, declared: Arc<dyn DeclaredSymbols>) {
        let mut inner = self.inner.write();
        inner.declared = Some(declared);
        if inner.config.augment_with_declared {
            inner.bump();
        }
    }

    /// Mark the snapshot for re-derivation on the next read.
    pub fn invalidate(&self) {
        self.inner.write().dirty = true;
    }

    /// The current source list and its token.
    ///
    /// Unless `force_refresh` is set or something was registered since the
    /// last call, the cached snapshot is returned as is and the discovery
    /// hook is not consulted. A re-derived list that is identical to the
    /// cached one keeps its token.
    pub fn current_sources(&self, force_refresh: bool) -> SourceSnapshot {
        if !force_refresh {
            let inner = self.inner.read();
            if let (false, Some(cached)) = (inner.dirty, &inner.cached) {
                return cached.clone();
            }
        }

        // The hook is host code; call it without holding the lock.
        let discovery = self.inner.read().discovery.clone();
        let discovered = discovery.map(|hook| hook.discover()).unwrap_or_default();

        let mut inner = self.inner.write();
        let sources: Arc<[SharedSource]> = inner
            .registered
            .iter()
            .map(|(_, source)| Arc::clone(source))
            .chain(discovered)
            .collect();

        let unchanged = inner
            .cached
            .as_ref()
            .filter(|cached| same_sources(&cached.sources, &sources))
            .map(|cached| cached.token);
        let token = match unchanged {
            Some(token) => token,
            None => {
                inner.last_token = inner.last_token.next();
                inner.last_token
            }
        };

        tracing::debug!(sources = sources.len(), ?token, "derived source snapshot");

        let snapshot = SourceSnapshot { sources, token };
        inner.cached = Some(snapshot.clone());
        inner.dirty = false;
        snapshot
    }

    /// Every explicit symbol name across the current sources, in merge order.
    pub fn all_explicit_symbols(&self) -> Vec<QualifiedName> {
        self.current_sources(false)
            .sources
            .iter()
            .flat_map(|source| source.explicit_map().keys().cloned())
            .collect()
    }

    /// Snapshot of the declared-symbol provider, if one is installed.
    pub fn declared_symbols(&self) -> Option<Vec<QualifiedName>> {
        let declared = self.inner.read().declared.clone();
        declared.map(|hook| hook.current_declared_symbols())
    }

    /// Filesystem used to walk prefix roots.
    pub fn file_system(&self) -> &dyn FileSystem {
        &*self.fs
    }

    // ------------------------------------------------------------------------
    // Configuration
    // ------------------------------------------------------------------------

    /// Copy of the current configuration.
    pub fn config(&self) -> RegistryConfig {
        self.inner.read().config.clone()
    }

    /// Replace the configuration. Tracked namespaces re-merge if it changed.
    pub fn set_config(&self, config: RegistryConfig) {
        let mut inner = self.inner.write();
        if inner.config != config {
            inner.config = config;
            inner.bump();
        }
    }

    /// Enable or disable merging of the declared-symbol snapshot.
    pub fn set_declared_symbol_augmentation(&self, enabled: bool) {
        self.update_config(|config| config.augment_with_declared = enabled);
    }

    /// Whether the declared-symbol snapshot is merged.
    pub fn is_augmenting_with_declared(&self) -> bool {
        self.inner.read().config.augment_with_declared
    }

    /// Enable or disable walking of legacy prefix roots.
    pub fn set_legacy_prefixes(&self, enabled: bool) {
        self.update_config(|config| config.legacy_prefixes = enabled);
    }

    /// Whether legacy prefix roots are walked.
    pub fn is_loading_legacy_prefixes(&self) -> bool {
        self.inner.read().config.legacy_prefixes
    }

    /// Change the extension of symbol files.
    pub fn set_symbol_extension(&self, extension: impl Into<String>) {
        let extension = extension.into();
        self.update_config(|config| config.symbol_extension = extension);
    }

    fn update_config(&self, update: impl FnOnce(&mut RegistryConfig)) {
        let mut config = self.config();
        update(&mut config);
        self.set_config(config);
    }
}

impl Default for SourceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SourceRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.read();
        f.debug_struct("SourceRegistry")
            .field("registered", &inner.registered.len())
            .field("config", &inner.config)
            .field("dirty", &inner.dirty)
            .field("token", &inner.last_token)
            .finish()
    }
}

/// Element-wise identity comparison of two source lists.
fn same_sources(a: &[SharedSource], b: &[SharedSource]) -> bool {
    a.len() == b.len()
        && a.iter().zip(b).all(|(x, y)| {
            std::ptr::eq(Arc::as_ptr(x) as *const (), Arc::as_ptr(y) as *const ())
        })
}
