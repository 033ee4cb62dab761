//! # nsreflect-base
//!
//! Reflection over namespaces whose contents are spread across several
//! symbol sources: explicit name-to-file maps, prefix-to-directory roots
//! and legacy roots that mirror the full namespace path.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! hir     → ResolvedNamespace, merge engine
//!   ↓
//! project → Sources, registry, directory walking
//!   ↓
//! base    → Primitives (NamespaceName, SourceId, SnapshotToken)
//! ```
//!
//! Names accept `.` and `\` as separators and always print with `.`.

/// Foundation types: names and identifiers
pub mod base;

/// Error types
pub mod error;

/// Namespace resolution and the reflection facade
pub mod hir;

/// Symbol sources and the registry that orders them
pub mod project;

pub use base::{NamespaceName, QualifiedName, SnapshotToken, SourceId};
pub use error::{ResolveError, Result};
pub use hir::{ResolvedNamespace, SymbolHandle};
pub use project::{RegistryConfig, SourceDescriptor, SourceRegistry, SymbolSource};
