//! `ResolvedNamespace`, the public face of namespace resolution.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxHashSet;
use smol_str::SmolStr;

use super::resolve::{NamespaceContents, SymbolHandle, resolve};
use crate::base::{NamespaceName, QualifiedName, SnapshotToken};
use crate::error::{ResolveError, Result};
use crate::project::{SharedSource, SourceRegistry};

/// A namespace, reflected by name.
///
/// Construction is free: nothing is read until the first query. Queries
/// merge the effective sources into per-namespace maps, which are reused
/// until the registry's snapshot token changes (or `reload` is called).
/// Class handles and child namespaces are materialized on first access and
/// cached.
///
/// ```no_run
/// use std::sync::Arc;
/// use nsreflect::hir::ResolvedNamespace;
/// use nsreflect::project::{SourceDescriptor, SourceRegistry};
///
/// let registry = Arc::new(SourceRegistry::new());
/// registry.register(SourceDescriptor::new().with_prefix("App", "/srv/app/src"));
///
/// let app = ResolvedNamespace::new("App", registry).unwrap();
/// for name in app.class_names() {
///     println!("{name}");
/// }
/// ```
pub struct ResolvedNamespace {
    name: NamespaceName,
    registry: Arc<SourceRegistry>,
    state: Mutex<NamespaceState>,
}

#[derive(Default)]
struct NamespaceState {
    contents: NamespaceContents,
    prepared: bool,
    prepared_snapshot: SnapshotToken,
    /// When set, the registry's sources are ignored and staleness is not
    /// tracked.
    custom_sources: Option<Arc<[SharedSource]>>,
    parent: Option<Arc<ResolvedNamespace>>,
}

impl ResolvedNamespace {
    /// Reflect the namespace called `name`.
    ///
    /// Fails with [`ResolveError::NameRequired`] if the name has no segments
    /// once separators and whitespace are stripped.
    pub fn new(name: impl Into<NamespaceName>, registry: Arc<SourceRegistry>) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(ResolveError::NameRequired);
        }
        Ok(Self::from_parts(name, registry, None))
    }

    fn from_parts(
        name: NamespaceName,
        registry: Arc<SourceRegistry>,
        custom_sources: Option<Arc<[SharedSource]>>,
    ) -> Self {
        Self {
            name,
            registry,
            state: Mutex::new(NamespaceState {
                custom_sources,
                ..NamespaceState::default()
            }),
        }
    }

    // ------------------------------------------------------------------------
    // Names
    // ------------------------------------------------------------------------

    pub fn name(&self) -> &NamespaceName {
        &self.name
    }

    pub fn short_name(&self) -> &str {
        self.name.short_name()
    }

    /// Name of the enclosing namespace; empty for a top-level namespace.
    pub fn parent_name(&self) -> NamespaceName {
        self.name.parent()
    }

    /// The enclosing namespace, or `None` for a top-level namespace.
    ///
    /// Built once and cached. It uses the same custom sources as this
    /// namespace had when the parent was first requested.
    pub fn parent(&self) -> Option<Arc<ResolvedNamespace>> {
        let parent_name = self.name.parent();
        if parent_name.is_empty() {
            return None;
        }

        let mut state = self.state.lock();
        let custom = state.custom_sources.clone();
        let parent = state.parent.get_or_insert_with(|| {
            Arc::new(Self::from_parts(parent_name, Arc::clone(&self.registry), custom))
        });
        Some(Arc::clone(parent))
    }

    /// The registry this namespace resolves against.
    pub fn registry(&self) -> &Arc<SourceRegistry> {
        &self.registry
    }

    // ------------------------------------------------------------------------
    // Sources
    // ------------------------------------------------------------------------

    /// Resolve against `sources` only, ignoring the registry's list.
    ///
    /// A namespace with custom sources is never considered stale; it merges
    /// once and keeps the result until [`reload`](Self::reload).
    pub fn set_sources(&self, sources: impl IntoIterator<Item = SharedSource>) {
        let mut state = self.state.lock();
        state.custom_sources = Some(sources.into_iter().collect());
        state.prepared = false;
    }

    /// Go back to the registry's sources and its staleness tracking.
    pub fn use_registry_sources(&self) {
        let mut state = self.state.lock();
        state.custom_sources = None;
        state.prepared = false;
    }

    pub fn has_custom_sources(&self) -> bool {
        self.state.lock().custom_sources.is_some()
    }

    /// Discard the merged maps and mark the registry snapshot for
    /// re-derivation. The next query merges again.
    pub fn reload(&self) {
        self.state.lock().prepared = false;
        self.registry.invalidate();
    }

    /// Merge the effective sources if the maps are missing or stale.
    fn prepare(&self, state: &mut NamespaceState) {
        let (sources, token) = match &state.custom_sources {
            Some(custom) => (Arc::clone(custom), None),
            None => {
                let snapshot = self.registry.current_sources(false);
                (snapshot.sources, Some(snapshot.token))
            }
        };

        if token.is_some_and(|token| token != state.prepared_snapshot) {
            state.prepared = false;
        }
        if state.prepared {
            return;
        }

        state.contents = resolve(&self.name, &sources, &self.registry);
        state.prepared_snapshot = token.unwrap_or(SnapshotToken::NONE);
        state.prepared = true;
    }

    // ------------------------------------------------------------------------
    // Classes
    // ------------------------------------------------------------------------

    /// Short names of the owned classes, in merge order.
    pub fn class_names(&self) -> Vec<SmolStr> {
        let mut state = self.state.lock();
        self.prepare(&mut state);
        state.contents.classes.keys().cloned().collect()
    }

    /// Fully-qualified names of the owned classes, in merge order.
    pub fn qualified_class_names(&self) -> Vec<QualifiedName> {
        let mut state = self.state.lock();
        self.prepare(&mut state);
        state
            .contents
            .classes
            .keys()
            .map(|short| self.name.with_segment(short.clone()))
            .collect()
    }

    /// Handles for every owned class, materializing them as needed.
    pub fn classes(&self) -> Vec<SymbolHandle> {
        let mut state = self.state.lock();
        self.prepare(&mut state);
        let name = &self.name;
        state
            .contents
            .classes
            .iter_mut()
            .map(|(short, entry)| {
                let location = entry.location.as_deref();
                let qualified = name.with_segment(short.clone());
                entry
                    .handle
                    .get_or_resolve(|| SymbolHandle::new(qualified, location))
            })
            .collect()
    }

    /// Whether a class with this short name is owned.
    pub fn has_class(&self, short: &str) -> bool {
        let mut state = self.state.lock();
        self.prepare(&mut state);
        state.contents.classes.contains_key(short)
    }

    /// Handle for an owned class.
    pub fn class(&self, short: &str) -> Result<SymbolHandle> {
        let mut state = self.state.lock();
        self.prepare(&mut state);
        let entry = state
            .contents
            .classes
            .get_mut(short)
            .ok_or_else(|| ResolveError::UnknownSymbol {
                namespace: self.name.clone(),
                name: short.to_owned(),
            })?;
        let location = entry.location.as_deref();
        Ok(entry
            .handle
            .get_or_resolve(|| SymbolHandle::new(self.name.with_segment(short), location)))
    }

    /// Owned classes that the host currently reports as declared.
    ///
    /// Empty when no declared-symbol provider is installed.
    pub fn declared_classes(&self) -> Vec<QualifiedName> {
        let Some(declared) = self.registry.declared_symbols() else {
            return Vec::new();
        };
        let declared: FxHashSet<QualifiedName> = declared.into_iter().collect();
        self.qualified_class_names()
            .into_iter()
            .filter(|name| declared.contains(name))
            .collect()
    }

    // ------------------------------------------------------------------------
    // Namespaces
    // ------------------------------------------------------------------------

    /// Short names of the child namespaces, in merge order.
    pub fn namespace_names(&self) -> Vec<SmolStr> {
        let mut state = self.state.lock();
        self.prepare(&mut state);
        state.contents.namespaces.keys().cloned().collect()
    }

    /// Fully-qualified names of the child namespaces, in merge order.
    pub fn qualified_namespace_names(&self) -> Vec<NamespaceName> {
        let mut state = self.state.lock();
        self.prepare(&mut state);
        state
            .contents
            .namespaces
            .keys()
            .map(|short| self.name.with_segment(short.clone()))
            .collect()
    }

    /// Every child namespace, materializing them as needed.
    pub fn namespaces(&self) -> Vec<Arc<ResolvedNamespace>> {
        let mut state = self.state.lock();
        self.prepare(&mut state);
        let custom = state.custom_sources.clone();
        state
            .contents
            .namespaces
            .iter_mut()
            .map(|(short, slot)| slot.get_or_resolve(|| self.make_child(short, &custom)))
            .collect()
    }

    /// Whether a child namespace with this short name exists.
    pub fn has_namespace(&self, short: &str) -> bool {
        let mut state = self.state.lock();
        self.prepare(&mut state);
        state.contents.namespaces.contains_key(short)
    }

    /// A child namespace.
    pub fn namespace(&self, short: &str) -> Result<Arc<ResolvedNamespace>> {
        let mut state = self.state.lock();
        self.prepare(&mut state);
        let custom = state.custom_sources.clone();
        let slot = state
            .contents
            .namespaces
            .get_mut(short)
            .ok_or_else(|| ResolveError::UnknownNamespace {
                namespace: self.name.clone(),
                name: short.to_owned(),
            })?;
        Ok(slot.get_or_resolve(|| self.make_child(short, &custom)))
    }

    fn make_child(
        &self,
        short: &str,
        custom: &Option<Arc<[SharedSource]>>,
    ) -> Arc<ResolvedNamespace> {
        Arc::new(Self::from_parts(
            self.name.with_segment(short),
            Arc::clone(&self.registry),
            custom.clone(),
        ))
    }
}

impl PartialEq for ResolvedNamespace {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for ResolvedNamespace {}

impl fmt::Display for ResolvedNamespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.name, f)
    }
}

impl fmt::Debug for ResolvedNamespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedNamespace")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::SourceDescriptor;

    fn registry_with(source: SourceDescriptor) -> Arc<SourceRegistry> {
        let registry = Arc::new(SourceRegistry::new());
        registry.register(source);
        registry
    }

    #[test]
    fn test_name_required() {
        let registry = Arc::new(SourceRegistry::new());

        assert_eq!(
            ResolvedNamespace::new("", Arc::clone(&registry)).unwrap_err(),
            ResolveError::NameRequired
        );
        assert_eq!(
            ResolvedNamespace::new(" \\ ", registry).unwrap_err(),
            ResolveError::NameRequired
        );
    }

    #[test]
    fn test_names_and_parent() {
        let registry = Arc::new(SourceRegistry::new());
        let ns =
            ResolvedNamespace::new("\\Custom\\FakeNamespace\\", Arc::clone(&registry)).unwrap();

        assert_eq!(ns.to_string(), "Custom.FakeNamespace");
        assert_eq!(ns.short_name(), "FakeNamespace");
        assert_eq!(ns.parent_name(), NamespaceName::new("Custom"));

        let parent = ns.parent().unwrap();
        assert_eq!(*parent, ResolvedNamespace::new("Custom", Arc::clone(&registry)).unwrap());
        assert!(Arc::ptr_eq(&parent, &ns.parent().unwrap()));
        assert!(parent.parent().is_none());
        assert!(parent.parent_name().is_empty());
    }

    #[test]
    fn test_class_and_namespace_lookup() {
        let registry = registry_with(
            SourceDescriptor::new()
                .with_symbol("Custom.FakeClass2", "/c/FakeClass2.php")
                .with_symbol("Custom.FakeNamespace.FakeClass1", "/c/ns/FakeClass1.php"),
        );
        let custom = ResolvedNamespace::new("Custom", registry).unwrap();

        assert_eq!(custom.class_names(), vec!["FakeClass2"]);
        assert_eq!(custom.namespace_names(), vec!["FakeNamespace"]);
        assert!(custom.has_class("FakeClass2"));
        assert!(!custom.has_class("FakeClass1"));
        assert!(custom.has_namespace("FakeNamespace"));

        let handle = custom.class("FakeClass2").unwrap();
        assert_eq!(handle.name(), &QualifiedName::new("Custom.FakeClass2"));
        assert_eq!(
            handle.location(),
            Some(std::path::Path::new("/c/FakeClass2.php"))
        );

        let child = custom.namespace("FakeNamespace").unwrap();
        assert_eq!(child.class_names(), vec!["FakeClass1"]);
        assert!(child.namespace_names().is_empty());
        assert!(Arc::ptr_eq(&child, &custom.namespace("FakeNamespace").unwrap()));
    }

    #[test]
    fn test_unknown_entries_are_errors() {
        let registry = registry_with(SourceDescriptor::new().with_symbol("App.Kernel", "/k.php"));
        let app = ResolvedNamespace::new("App", registry).unwrap();

        assert_eq!(
            app.class("Missing").unwrap_err(),
            ResolveError::UnknownSymbol {
                namespace: NamespaceName::new("App"),
                name: "Missing".into(),
            }
        );
        assert!(matches!(
            app.namespace("Missing"),
            Err(ResolveError::UnknownNamespace { .. })
        ));
        // Failed lookups do not fabricate entries.
        assert_eq!(app.class_names(), vec!["Kernel"]);
        assert!(app.namespace_names().is_empty());
    }

    #[test]
    fn test_children_inherit_custom_sources() {
        let registry = Arc::new(SourceRegistry::new());
        let ns = ResolvedNamespace::new("Custom", Arc::clone(&registry)).unwrap();
        ns.set_sources([SourceDescriptor::new()
            .with_symbol("Custom.Sub.Leaf", "/leaf.php")
            .into_shared()]);

        let sub = ns.namespace("Sub").unwrap();
        assert!(sub.has_custom_sources());
        assert_eq!(sub.class_names(), vec!["Leaf"]);
        assert!(ns.has_custom_sources());

        ns.use_registry_sources();
        assert!(!ns.has_custom_sources());
        assert!(ns.namespace_names().is_empty());
    }
}
