//! Namespace resolution.
//!
//! [`resolve`] merges a source list into the contents of one namespace;
//! [`ResolvedNamespace`] wraps it with lazy preparation, staleness checks
//! and cached children.

mod namespace;
mod resolve;

pub use namespace::ResolvedNamespace;
pub use resolve::{
    ClassEntry, NamespaceContents, Ownership, Resolver, Slot, SymbolHandle, classify_namespace,
    classify_symbol, resolve,
};
