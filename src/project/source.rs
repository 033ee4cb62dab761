//! Source descriptors: explicit symbol maps and prefix roots.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use indexmap::IndexMap;

use crate::base::{NamespaceName, QualifiedName};

/// Fully-qualified symbol name → location of its definition.
///
/// Insertion order is preserved; it is the order in which a source
/// contributes its symbols to a merge.
pub type SymbolMap = IndexMap<QualifiedName, PathBuf>;

/// A source shared between the registry and namespaces that use it.
pub type SharedSource = Arc<dyn SymbolSource>;

/// What the resolver consumes from each registered source.
///
/// A source is anything that can say where symbols live: a dumped class map,
/// a set of prefix roots, or both. [`SourceDescriptor`] is the in-memory
/// implementation; hosts may implement this for their own loader types.
pub trait SymbolSource: Send + Sync + fmt::Debug {
    /// Explicit fully-qualified name → location entries.
    fn explicit_map(&self) -> &SymbolMap;

    /// When true the explicit map is a closed world and no prefix roots of
    /// this source are walked.
    fn is_authoritative(&self) -> bool {
        false
    }

    /// Prefix → root directories, searched with the prefix convention.
    fn prefix_roots(&self) -> &PrefixRoots;

    /// Prefix → root directories, searched with the legacy convention.
    fn legacy_prefix_roots(&self) -> Option<&PrefixRoots> {
        None
    }
}

// ============================================================================
// PREFIX ROOTS
// ============================================================================

/// Mapping from a namespace prefix to the ordered directories beneath which
/// its symbols live.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PrefixRoots {
    roots: IndexMap<NamespaceName, Vec<PathBuf>>,
}

impl PrefixRoots {
    /// Create an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a root directory for `prefix`. Duplicate paths are ignored.
    pub fn insert(&mut self, prefix: impl Into<NamespaceName>, path: impl Into<PathBuf>) {
        let path = path.into();
        let paths = self.roots.entry(prefix.into()).or_default();
        if !paths.contains(&path) {
            paths.push(path);
        }
    }

    /// Remove every root declared for `prefix`.
    pub fn remove(&mut self, prefix: &NamespaceName) -> Option<Vec<PathBuf>> {
        self.roots.shift_remove(prefix)
    }

    /// Root directories declared for exactly `prefix`.
    pub fn get(&self, prefix: &NamespaceName) -> Option<&[PathBuf]> {
        self.roots.get(prefix).map(Vec::as_slice)
    }

    /// Iterate over `(prefix, roots)` in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&NamespaceName, &[PathBuf])> + '_ {
        self.roots.iter().map(|(prefix, paths)| (prefix, paths.as_slice()))
    }

    /// Iterate over declared prefixes.
    pub fn prefixes(&self) -> impl Iterator<Item = &NamespaceName> + '_ {
        self.roots.keys()
    }

    /// Number of declared prefixes.
    pub fn len(&self) -> usize {
        self.roots.len()
    }

    /// Whether no prefix is declared.
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }
}

// ============================================================================
// SOURCE DESCRIPTOR
// ============================================================================

/// An in-memory source, assembled with builder methods.
///
/// ```
/// use nsreflect::project::SourceDescriptor;
///
/// let source = SourceDescriptor::new()
///     .with_symbol("App\\Kernel", "/srv/app/src/Kernel.php")
///     .with_prefix("App", "/srv/app/src");
/// ```
#[derive(Clone, Debug, Default)]
pub struct SourceDescriptor {
    symbols: SymbolMap,
    authoritative: bool,
    prefixes: PrefixRoots,
    legacy_prefixes: PrefixRoots,
}

impl SourceDescriptor {
    /// Create an empty, non-authoritative source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a source from an explicit symbol map.
    pub fn from_symbols<I, N, P>(symbols: I) -> Self
    where
        I: IntoIterator<Item = (N, P)>,
        N: Into<QualifiedName>,
        P: Into<PathBuf>,
    {
        let mut source = Self::new();
        for (name, path) in symbols {
            source.add_symbol(name, path);
        }
        source
    }

    /// Add an explicit symbol. An existing entry for the same name is kept.
    pub fn add_symbol(&mut self, name: impl Into<QualifiedName>, location: impl Into<PathBuf>) {
        self.symbols.entry(name.into()).or_insert_with(|| location.into());
    }

    /// Builder form of [`add_symbol`](Self::add_symbol).
    pub fn with_symbol(
        mut self,
        name: impl Into<QualifiedName>,
        location: impl Into<PathBuf>,
    ) -> Self {
        self.add_symbol(name, location);
        self
    }

    /// Declare a root directory for a prefix.
    pub fn add_prefix(&mut self, prefix: impl Into<NamespaceName>, root: impl Into<PathBuf>) {
        self.prefixes.insert(prefix, root);
    }

    /// Builder form of [`add_prefix`](Self::add_prefix).
    pub fn with_prefix(
        mut self,
        prefix: impl Into<NamespaceName>,
        root: impl Into<PathBuf>,
    ) -> Self {
        self.add_prefix(prefix, root);
        self
    }

    /// Declare a root directory for a prefix under the legacy convention.
    pub fn add_legacy_prefix(
        &mut self,
        prefix: impl Into<NamespaceName>,
        root: impl Into<PathBuf>,
    ) {
        self.legacy_prefixes.insert(prefix, root);
    }

    /// Builder form of [`add_legacy_prefix`](Self::add_legacy_prefix).
    pub fn with_legacy_prefix(
        mut self,
        prefix: impl Into<NamespaceName>,
        root: impl Into<PathBuf>,
    ) -> Self {
        self.add_legacy_prefix(prefix, root);
        self
    }

    /// Mark the explicit map as a closed world.
    pub fn authoritative(mut self, authoritative: bool) -> Self {
        self.authoritative = authoritative;
        self
    }

    /// Look up the location of an explicit symbol.
    pub fn location(&self, name: &QualifiedName) -> Option<&Path> {
        self.symbols.get(name).map(PathBuf::as_path)
    }

    /// Wrap into a shareable source.
    pub fn into_shared(self) -> SharedSource {
        Arc::new(self)
    }
}

impl SymbolSource for SourceDescriptor {
    fn explicit_map(&self) -> &SymbolMap {
        &self.symbols
    }

    fn is_authoritative(&self) -> bool {
        self.authoritative
    }

    fn prefix_roots(&self) -> &PrefixRoots {
        &self.prefixes
    }

    fn legacy_prefix_roots(&self) -> Option<&PrefixRoots> {
        if self.legacy_prefixes.is_empty() {
            None
        } else {
            Some(&self.legacy_prefixes)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_roots_keep_order_and_dedupe() {
        let mut roots = PrefixRoots::new();

        roots.insert("App", "/a");
        roots.insert("Lib", "/lib");
        roots.insert("App", "/b");
        roots.insert("App", "/a");

        assert_eq!(roots.len(), 2);
        assert_eq!(
            roots.get(&NamespaceName::new("App")),
            Some(&[PathBuf::from("/a"), PathBuf::from("/b")][..])
        );
        let prefixes: Vec<String> = roots.prefixes().map(ToString::to_string).collect();
        assert_eq!(prefixes, vec!["App", "Lib"]);
    }

    #[test]
    fn test_descriptor_builder() {
        let source = SourceDescriptor::new()
            .with_symbol("\\App\\Kernel", "/src/Kernel.php")
            .with_symbol("App.Kernel", "/other/Kernel.php")
            .with_prefix("App\\", "/src")
            .authoritative(true);

        assert!(source.is_authoritative());
        assert_eq!(source.explicit_map().len(), 1);
        assert_eq!(
            source.location(&NamespaceName::new("App.Kernel")),
            Some(Path::new("/src/Kernel.php"))
        );
        assert_eq!(source.prefix_roots().len(), 1);
        assert!(source.legacy_prefix_roots().is_none());
    }

    #[test]
    fn test_descriptor_legacy_prefixes() {
        let source = SourceDescriptor::new().with_legacy_prefix("Twig", "/vendor/twig/lib");

        let legacy = source.legacy_prefix_roots().unwrap();
        assert_eq!(legacy.len(), 1);
        assert!(source.prefix_roots().is_empty());
    }
}
