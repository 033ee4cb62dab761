//! Error types for namespace resolution.

use crate::base::NamespaceName;

/// Errors surfaced to callers of [`ResolvedNamespace`](crate::hir::ResolvedNamespace).
///
/// Filesystem and source-enumeration failures never show up here; they are
/// contained by the path walker and treated as empty results.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    /// A namespace was constructed from a name with no segments.
    #[error("a namespace name is required")]
    NameRequired,

    /// `class(name)` asked for a short name the namespace does not own.
    #[error("namespace `{namespace}` has no class `{name}`")]
    UnknownSymbol {
        /// The namespace that was queried
        namespace: NamespaceName,
        /// The requested short name
        name: String,
    },

    /// `namespace(name)` asked for a child the namespace does not own.
    #[error("namespace `{namespace}` has no sub-namespace `{name}`")]
    UnknownNamespace {
        /// The namespace that was queried
        namespace: NamespaceName,
        /// The requested short name
        name: String,
    },
}

/// Result alias for resolution operations.
pub type Result<T, E = ResolveError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = ResolveError::UnknownSymbol {
            namespace: NamespaceName::new("App.Models"),
            name: "Missing".into(),
        };
        assert_eq!(err.to_string(), "namespace `App.Models` has no class `Missing`");
        assert_eq!(
            ResolveError::NameRequired.to_string(),
            "a namespace name is required"
        );
    }
}
