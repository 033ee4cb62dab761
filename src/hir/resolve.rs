//! Merge engine: what a namespace owns, given an ordered source list.
//!
//! Every source is reduced to a stream of candidate names: explicit map
//! keys, files and directories found under prefix roots, and (optionally)
//! the host's declared symbols. Each candidate is classified against the
//! target namespace:
//!
//! - exactly one segment below the target → an owned class,
//! - two or more segments below → the next segment is a child namespace,
//! - anything else → unrelated.
//!
//! Owned entries are inserted first-writer-wins: the first source to
//! mention a short name keeps it, later sources never overwrite.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use indexmap::IndexMap;
use indexmap::map::Entry;
use smol_str::SmolStr;

use super::namespace::ResolvedNamespace;
use crate::base::{NamespaceName, QualifiedName};
use crate::project::{
    Convention, Discovered, FileSystem, PathWalker, RegistryConfig, SharedSource, SourceRegistry,
    SymbolMap, SymbolSource,
};

// ============================================================================
// LAZY SLOTS
// ============================================================================

/// A map entry that is known to exist but may not be materialized yet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Slot<T> {
    /// Known by name only.
    Unresolved,
    /// Materialized and cached.
    Resolved(T),
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Slot::Unresolved
    }
}

impl<T> Slot<T> {
    /// Whether the value has been materialized.
    pub fn is_resolved(&self) -> bool {
        matches!(self, Slot::Resolved(_))
    }

    /// The materialized value, if any.
    pub fn get(&self) -> Option<&T> {
        match self {
            Slot::Resolved(value) => Some(value),
            Slot::Unresolved => None,
        }
    }

    /// Materialize with `init` if needed, then return a copy of the value.
    pub fn get_or_resolve(&mut self, init: impl FnOnce() -> T) -> T
    where
        T: Clone,
    {
        match self {
            Slot::Resolved(value) => value.clone(),
            Slot::Unresolved => {
                let value = init();
                *self = Slot::Resolved(value.clone());
                value
            }
        }
    }
}

// ============================================================================
// SYMBOL HANDLES
// ============================================================================

/// Handle to a symbol owned by a namespace.
///
/// Carries the fully-qualified name and the location recorded by the first
/// source that mentioned it. Symbols that only come from the declared-symbol
/// snapshot have no location.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SymbolHandle {
    name: QualifiedName,
    location: Option<Arc<Path>>,
}

impl SymbolHandle {
    pub fn new(name: QualifiedName, location: Option<&Path>) -> Self {
        Self {
            name,
            location: location.map(Arc::from),
        }
    }

    /// Fully-qualified name.
    pub fn name(&self) -> &QualifiedName {
        &self.name
    }

    /// Last segment of the name.
    pub fn short_name(&self) -> &str {
        self.name.short_name()
    }

    /// Where the symbol is defined, if known.
    pub fn location(&self) -> Option<&Path> {
        self.location.as_deref()
    }
}

/// An owned class: its recorded location and its lazily built handle.
#[derive(Clone, Debug)]
pub struct ClassEntry {
    pub location: Option<PathBuf>,
    pub handle: Slot<SymbolHandle>,
}

// ============================================================================
// CLASSIFICATION
// ============================================================================

/// How a candidate name relates to a target namespace.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Ownership<'a> {
    /// Owned class; the short name.
    Class(&'a SmolStr),
    /// Lies inside a child namespace; the child's short name.
    Namespace(&'a SmolStr),
    /// Not below the target.
    Unrelated,
}

/// Classify a fully-qualified symbol name against `target`.
pub fn classify_symbol<'a>(target: &NamespaceName, name: &'a QualifiedName) -> Ownership<'a> {
    match name.strip_prefix(target) {
        Some([short]) => Ownership::Class(short),
        Some([child, _, ..]) => Ownership::Namespace(child),
        _ => Ownership::Unrelated,
    }
}

/// Classify a namespace name against `target`.
///
/// Any namespace strictly below the target makes its next segment a child.
pub fn classify_namespace<'a>(target: &NamespaceName, name: &'a NamespaceName) -> Ownership<'a> {
    match name.strip_prefix(target) {
        Some([child, ..]) => Ownership::Namespace(child),
        _ => Ownership::Unrelated,
    }
}

// ============================================================================
// NAMESPACE CONTENTS
// ============================================================================

/// The merged maps of one namespace.
#[derive(Debug, Default)]
pub struct NamespaceContents {
    pub classes: IndexMap<SmolStr, ClassEntry>,
    pub namespaces: IndexMap<SmolStr, Slot<Arc<ResolvedNamespace>>>,
}

impl NamespaceContents {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an owned class unless the short name is already taken.
    ///
    /// Returns whether the entry was inserted.
    pub fn insert_class(&mut self, short: &SmolStr, location: Option<&Path>) -> bool {
        match self.classes.entry(short.clone()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(entry) => {
                entry.insert(ClassEntry {
                    location: location.map(Path::to_path_buf),
                    handle: Slot::Unresolved,
                });
                true
            }
        }
    }

    /// Record a child namespace unless already present.
    pub fn insert_namespace(&mut self, short: &SmolStr) -> bool {
        match self.namespaces.entry(short.clone()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(entry) => {
                entry.insert(Slot::Unresolved);
                true
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty() && self.namespaces.is_empty()
    }
}

// ============================================================================
// RESOLVER
// ============================================================================

/// Merges sources into the contents of one target namespace.
pub struct Resolver<'a> {
    target: &'a NamespaceName,
    walker: PathWalker<'a>,
    config: &'a RegistryConfig,
}

impl<'a> Resolver<'a> {
    pub fn new(
        target: &'a NamespaceName,
        fs: &'a dyn FileSystem,
        config: &'a RegistryConfig,
    ) -> Self {
        Self {
            target,
            walker: PathWalker::new(fs, &config.symbol_extension),
            config,
        }
    }

    /// Merge every source, in order.
    pub fn merge_sources(&self, sources: &[SharedSource], contents: &mut NamespaceContents) {
        for source in sources {
            self.merge_source(source.as_ref(), contents);
        }
    }

    /// Merge one source: its explicit map, then (unless authoritative) its
    /// prefix roots, then its legacy prefix roots when enabled.
    pub fn merge_source(&self, source: &dyn SymbolSource, contents: &mut NamespaceContents) {
        self.merge_explicit(source.explicit_map(), contents);

        if source.is_authoritative() {
            tracing::trace!(
                target_ns = %self.target,
                "authoritative source, skipping prefix roots"
            );
            return;
        }

        let found = self
            .walker
            .discover(self.target, source.prefix_roots(), Convention::Prefix);
        self.merge_discovered(found, contents);

        if self.config.legacy_prefixes {
            if let Some(legacy) = source.legacy_prefix_roots() {
                let found = self.walker.discover(self.target, legacy, Convention::Legacy);
                self.merge_discovered(found, contents);
            }
        }
    }

    /// Merge the keys of an explicit symbol map.
    pub fn merge_explicit(&self, map: &SymbolMap, contents: &mut NamespaceContents) {
        for (name, location) in map {
            self.merge_symbol(name, Some(location), contents);
        }
    }

    /// Merge what the path walker found on disk.
    pub fn merge_discovered(&self, found: Vec<Discovered>, contents: &mut NamespaceContents) {
        for item in &found {
            match item {
                Discovered::Symbol { name, location } => {
                    self.merge_symbol(name, Some(location), contents)
                }
                Discovered::Namespace(name) => {
                    if let Ownership::Namespace(child) = classify_namespace(self.target, name) {
                        contents.insert_namespace(child);
                    }
                }
            }
        }
    }

    /// Merge bare symbol names, such as the declared-symbol snapshot.
    pub fn merge_names(&self, names: &[QualifiedName], contents: &mut NamespaceContents) {
        for name in names {
            self.merge_symbol(name, None, contents);
        }
    }

    fn merge_symbol(
        &self,
        name: &QualifiedName,
        location: Option<&PathBuf>,
        contents: &mut NamespaceContents,
    ) {
        match classify_symbol(self.target, name) {
            Ownership::Class(short) => {
                contents.insert_class(short, location.map(PathBuf::as_path));
            }
            Ownership::Namespace(child) => {
                contents.insert_namespace(child);
            }
            Ownership::Unrelated => {}
        }
    }
}

/// Build the contents of `target` from `sources`, consulting `registry` for
/// configuration, the filesystem and the declared-symbol snapshot.
pub fn resolve(
    target: &NamespaceName,
    sources: &[SharedSource],
    registry: &SourceRegistry,
) -> NamespaceContents {
    let config = registry.config();
    let resolver = Resolver::new(target, registry.file_system(), &config);
    let mut contents = NamespaceContents::new();

    resolver.merge_sources(sources, &mut contents);

    if config.augment_with_declared {
        if let Some(declared) = registry.declared_symbols() {
            resolver.merge_names(&declared, &mut contents);
        }
    }

    tracing::debug!(
        namespace = %target,
        sources = sources.len(),
        classes = contents.classes.len(),
        namespaces = contents.namespaces.len(),
        "merged namespace"
    );

    contents
}
