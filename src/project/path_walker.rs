//! Prefix-root resolution: directory descent and file-name normalization.
//!
//! A prefix root declares that symbols under `prefix` live beneath some
//! directories. To resolve a target namespace deeper than the prefix, the
//! walker descends one directory per missing segment, matching directory
//! names after the same normalization that turns file names into class
//! names. Whatever sits in the matched directories belongs to the target:
//! `*.php` files are classes, subdirectories are child namespaces.
//!
//! Two conventions are supported:
//!
//! - [`Convention::Prefix`]: the root directory *is* the prefix namespace,
//!   so only segments after the prefix are descended.
//! - [`Convention::Legacy`]: the root directory holds the full name, one
//!   directory per segment starting from the first one.

use std::path::{Path, PathBuf};

use smol_str::SmolStr;

use super::fs::FileSystem;
use super::source::PrefixRoots;
use crate::base::{NamespaceName, QualifiedName};

/// Whitespace that starts a new word for [`normalize_file_name`].
const WORD_DELIMITERS: [char; 6] = [' ', '\t', '\r', '\n', '\u{0C}', '\u{0B}'];

/// Directory layout convention for a set of prefix roots.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Convention {
    /// Root directory corresponds to the declared prefix.
    Prefix,
    /// Root directory corresponds to the empty namespace.
    Legacy,
}

/// Something found on disk while resolving a target namespace.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Discovered {
    /// A symbol file, with the fully-qualified name derived from its path.
    Symbol {
        name: QualifiedName,
        location: PathBuf,
    },
    /// A directory or declared prefix that lies below the target.
    Namespace(NamespaceName),
}

/// Convert a file or directory name into a symbol segment.
///
/// Everything from the first `.` on is dropped, `-` and `_` become word
/// breaks, each word gets an uppercase first letter and the spaces are
/// removed: `user-profile_card.php` → `UserProfileCard`.
pub fn normalize_file_name(raw: &str) -> String {
    let stem = raw.split('.').next().unwrap_or_default();
    let mut out = String::with_capacity(stem.len());
    let mut word_start = true;

    for c in stem.chars() {
        let c = if c == '-' || c == '_' { ' ' } else { c };
        if WORD_DELIMITERS.contains(&c) {
            if c != ' ' {
                out.push(c);
            }
            word_start = true;
        } else if word_start {
            out.push(c.to_ascii_uppercase());
            word_start = false;
        } else {
            out.push(c);
        }
    }

    out
}

/// Walks prefix roots to discover the symbols and namespaces of a target.
pub struct PathWalker<'a> {
    fs: &'a dyn FileSystem,
    extension: &'a str,
}

impl<'a> PathWalker<'a> {
    /// Create a walker over `fs` recognizing files with `extension`.
    pub fn new(fs: &'a dyn FileSystem, extension: &'a str) -> Self {
        Self { fs, extension }
    }

    /// Declared prefixes that are an ancestor of, or equal to, `target`.
    pub fn shared_prefixes<'r>(
        target: &NamespaceName,
        roots: &'r PrefixRoots,
    ) -> Vec<(&'r NamespaceName, &'r [PathBuf])> {
        roots
            .iter()
            .filter(|(prefix, _)| target.starts_with(prefix))
            .collect()
    }

    /// The strict ancestors among `shared`; only these need descent.
    pub fn ancestor_prefixes<'r>(
        target: &NamespaceName,
        shared: &[(&'r NamespaceName, &'r [PathBuf])],
    ) -> Vec<(&'r NamespaceName, &'r [PathBuf])> {
        shared
            .iter()
            .copied()
            .filter(|(prefix, _)| target.is_descendant_of(prefix))
            .collect()
    }

    /// Declared prefixes strictly below `target`.
    pub fn descendant_prefixes<'r>(
        target: &NamespaceName,
        roots: &'r PrefixRoots,
    ) -> Vec<&'r NamespaceName> {
        roots
            .prefixes()
            .filter(|prefix| prefix.is_descendant_of(target))
            .collect()
    }

    /// Directories below `root` reached by consuming `missing` in order,
    /// one segment per directory level.
    ///
    /// With no missing segments the root itself is the only match. Several
    /// directories can match one segment (`user-data` and `user_data` both
    /// normalize to `UserData`); all of them are followed.
    pub fn descend(&self, root: &Path, missing: &[SmolStr]) -> Vec<PathBuf> {
        let Some((next, rest)) = missing.split_first() else {
            return vec![root.to_path_buf()];
        };

        let mut matched = Vec::new();
        for dir in self.fs.list_subdirectories(root) {
            if normalize_file_name(&dir) == next.as_str() {
                tracing::trace!(root = %root.display(), %dir, segment = %next, "descending");
                matched.extend(self.descend(&root.join(&dir), rest));
            }
        }
        matched
    }

    /// Class short names for the symbol files directly in `path`, with the
    /// file each came from.
    pub fn list_child_symbols(&self, path: &Path) -> Vec<(SmolStr, PathBuf)> {
        self.fs
            .list_files(path, self.extension)
            .into_iter()
            .filter_map(|file| {
                let name = normalize_file_name(&file);
                (!name.is_empty()).then(|| (SmolStr::new(name), path.join(&file)))
            })
            .collect()
    }

    /// Namespace short names for the subdirectories directly in `path`.
    pub fn list_child_namespaces(&self, path: &Path) -> Vec<SmolStr> {
        self.fs
            .list_subdirectories(path)
            .into_iter()
            .map(|dir| normalize_file_name(&dir))
            .filter(|name| !name.is_empty())
            .map(SmolStr::new)
            .collect()
    }

    /// Everything `roots` says about `target` under `convention`.
    ///
    /// Results come in declaration order of the prefixes, then root order,
    /// then descent order. Declared prefixes strictly below the target are
    /// reported last, as namespaces.
    pub fn discover(
        &self,
        target: &NamespaceName,
        roots: &PrefixRoots,
        convention: Convention,
    ) -> Vec<Discovered> {
        let mut found = Vec::new();
        let shared = Self::shared_prefixes(target, roots);
        let ancestors = Self::ancestor_prefixes(target, &shared);

        for (prefix, paths) in &shared {
            let missing: &[SmolStr] = match convention {
                Convention::Legacy => target.segments(),
                Convention::Prefix if ancestors.iter().any(|(p, _)| p == prefix) => {
                    target.strip_prefix(prefix).unwrap_or_default()
                }
                Convention::Prefix => &[],
            };

            for root in *paths {
                for dir in self.descend(root, missing) {
                    self.discover_in(target, &dir, &mut found);
                }
            }
        }

        found.extend(
            Self::descendant_prefixes(target, roots)
                .into_iter()
                .cloned()
                .map(Discovered::Namespace),
        );

        found
    }

    fn discover_in(&self, target: &NamespaceName, dir: &Path, found: &mut Vec<Discovered>) {
        for (short, location) in self.list_child_symbols(dir) {
            found.push(Discovered::Symbol {
                name: target.with_segment(short),
                location,
            });
        }
        for short in self.list_child_namespaces(dir) {
            found.push(Discovered::Namespace(target.with_segment(short)));
        }
    }
}
