//! Where symbols come from.
//!
//! This module provides the inputs of resolution:
//! - [`SymbolSource`], [`SourceDescriptor`] - Explicit maps and prefix roots
//! - [`SourceRegistry`] - The ordered source list and its snapshot token
//! - [`PathWalker`] - Directory descent below prefix roots
//! - [`FileSystem`] - Directory listing, swappable for tests

mod fs;
#[cfg(feature = "manifest")]
mod manifest;
mod path_walker;
mod registry;
mod source;

pub use fs::{FileSystem, OsFileSystem};
#[cfg(feature = "manifest")]
pub use manifest::ManifestError;
pub use path_walker::{Convention, Discovered, PathWalker, normalize_file_name};
pub use registry::{
    DeclaredSymbols, RegistryConfig, SourceDiscovery, SourceRegistry, SourceSnapshot,
};
pub use source::{PrefixRoots, SharedSource, SourceDescriptor, SymbolMap, SymbolSource};
