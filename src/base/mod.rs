//! Foundation types for the resolver.
//!
//! This module provides fundamental types used throughout the crate:
//! - [`NamespaceName`] - Normalized segmented names
//! - [`SourceId`] - Registered source identifiers
//! - [`SnapshotToken`] - Identity of a registry's source list
//!
//! This module has NO dependencies on other nsreflect modules.

mod ids;
mod name;

pub use ids::{SnapshotToken, SourceId};
pub use name::{CANONICAL_SEPARATOR, NamespaceName, QualifiedName, SEPARATORS};
