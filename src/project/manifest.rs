//! Building sources from composer-style JSON manifests.
//!
//! Only these sections are read:
//!
//! ```json
//! {
//!     "autoload": {
//!         "psr-4": { "App\\": "src/", "App\\Legacy\\": ["lib/", "old/"] },
//!         "psr-0": { "Vendor_": "legacy/" }
//!     },
//!     "symbols": { "App\\Kernel": "bootstrap/Kernel.php" },
//!     "config": { "classmap-authoritative": false },
//!     "extra": { "nsreflect": { "legacy-prefixes": true } }
//! }
//! ```
//!
//! Relative paths are resolved against the manifest's directory.
//!
//! Underscore-style `psr-0` prefixes lose their trailing `_`, so `Vendor_`
//! roots the `Vendor` namespace. Underscores inside a prefix are kept as
//! part of the segment: `Vendor_Pkg_` becomes the single segment
//! `Vendor_Pkg`, which no dotted name below `Vendor` matches.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Deserialize;

use super::registry::RegistryConfig;
use super::source::{SourceDescriptor, SymbolSource};

/// Errors produced while loading a manifest.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("cannot read manifest `{}`: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed manifest `{}`: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Manifest {
    autoload: Autoload,
    symbols: IndexMap<String, String>,
    config: ManifestConfig,
    extra: Extra,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Autoload {
    #[serde(rename = "psr-4")]
    psr4: IndexMap<String, OneOrMany>,
    #[serde(rename = "psr-0")]
    psr0: IndexMap<String, OneOrMany>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
struct ManifestConfig {
    classmap_authoritative: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Extra {
    nsreflect: Option<RegistryConfig>,
}

/// A path or a list of paths.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    fn into_vec(self) -> Vec<String> {
        match self {
            OneOrMany::One(path) => vec![path],
            OneOrMany::Many(paths) => paths,
        }
    }
}

fn read_manifest(path: &Path) -> Result<(Manifest, PathBuf), ManifestError> {
    let text = std::fs::read_to_string(path).map_err(|source| ManifestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let manifest = serde_json::from_str(&text).map_err(|source| ManifestError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
    Ok((manifest, base_dir))
}

/// `Vendor_` → `Vendor`.
fn legacy_prefix(raw: &str) -> &str {
    let trimmed = raw.trim_end_matches('_');
    if trimmed.is_empty() { raw } else { trimmed }
}

fn parse_manifest(text: &str) -> Result<Manifest, ManifestError> {
    serde_json::from_str(text).map_err(|source| ManifestError::Json {
        path: PathBuf::new(),
        source,
    })
}

impl SourceDescriptor {
    /// Load a source from the manifest at `path`.
    pub fn from_composer_json(path: impl AsRef<Path>) -> Result<Self, ManifestError> {
        let path = path.as_ref();
        let (manifest, base_dir) = read_manifest(path)?;
        let source = Self::from_manifest(manifest, &base_dir);
        tracing::debug!(
            manifest = %path.display(),
            symbols = source.explicit_map().len(),
            "loaded manifest source"
        );
        Ok(source)
    }

    /// Build a source from manifest text, resolving relative paths against
    /// `base_dir`.
    pub fn from_composer_str(
        text: &str,
        base_dir: impl AsRef<Path>,
    ) -> Result<Self, ManifestError> {
        let manifest = parse_manifest(text)?;
        Ok(Self::from_manifest(manifest, base_dir.as_ref()))
    }

    fn from_manifest(manifest: Manifest, base_dir: &Path) -> Self {
        let mut source =
            SourceDescriptor::new().authoritative(manifest.config.classmap_authoritative);

        for (name, file) in manifest.symbols {
            source.add_symbol(name, base_dir.join(file));
        }
        for (prefix, dirs) in manifest.autoload.psr4 {
            for dir in dirs.into_vec() {
                source.add_prefix(prefix.as_str(), base_dir.join(dir));
            }
        }
        for (prefix, dirs) in manifest.autoload.psr0 {
            for dir in dirs.into_vec() {
                source.add_legacy_prefix(legacy_prefix(&prefix), base_dir.join(dir));
            }
        }
        source
    }
}

impl RegistryConfig {
    /// Read the `extra.nsreflect` section of a manifest.
    ///
    /// A manifest without that section yields the default configuration.
    pub fn from_composer_json(path: impl AsRef<Path>) -> Result<Self, ManifestError> {
        let (manifest, _) = read_manifest(path.as_ref())?;
        Ok(manifest.extra.nsreflect.unwrap_or_default())
    }

    /// Text form of [`from_composer_json`](Self::from_composer_json).
    pub fn from_composer_str(text: &str) -> Result<Self, ManifestError> {
        Ok(parse_manifest(text)?.extra.nsreflect.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::{NamespaceName, QualifiedName};

    #[test]
    fn test_reads_autoload_sections() {
        let text = r#"{
            "autoload": {
                "psr-4": { "App\\": "src/", "App\\Legacy\\": ["lib/", "old/"] },
                "psr-0": { "Vendor_": "legacy/" }
            },
            "symbols": { "App\\Kernel": "bootstrap/Kernel.php" }
        }"#;

        let source = SourceDescriptor::from_composer_str(text, "/srv/app").unwrap();

        assert!(!source.is_authoritative());
        assert_eq!(
            source.location(&QualifiedName::new("App.Kernel")),
            Some(Path::new("/srv/app/bootstrap/Kernel.php"))
        );
        assert_eq!(
            source.prefix_roots().get(&NamespaceName::new("App")),
            Some(&[PathBuf::from("/srv/app/src/")][..])
        );
        assert_eq!(
            source
                .prefix_roots()
                .get(&NamespaceName::new("App.Legacy"))
                .map(<[PathBuf]>::len),
            Some(2)
        );
        assert_eq!(
            source
                .legacy_prefix_roots()
                .and_then(|roots| roots.get(&NamespaceName::new("Vendor"))),
            Some(&[PathBuf::from("/srv/app/legacy/")][..])
        );
    }

    #[test]
    fn test_underscore_legacy_prefix_roots_namespace() {
        let text = r#"{ "autoload": { "psr-0": { "Twig_": "lib/", "Acme\\": "src/" } } }"#;

        let source = SourceDescriptor::from_composer_str(text, "/p").unwrap();
        let legacy = source.legacy_prefix_roots().unwrap();

        let prefixes: Vec<String> = legacy.prefixes().map(ToString::to_string).collect();
        assert_eq!(prefixes, vec!["Twig", "Acme"]);
    }

    #[test]
    fn test_authoritative_flag() {
        let text = r#"{ "config": { "classmap-authoritative": true } }"#;

        let source = SourceDescriptor::from_composer_str(text, "/").unwrap();

        assert!(source.is_authoritative());
        assert!(source.explicit_map().is_empty());
    }

    #[test]
    fn test_registry_config_section() {
        let text = r#"{ "extra": { "nsreflect": { "legacy-prefixes": true } } }"#;

        let config = RegistryConfig::from_composer_str(text).unwrap();

        assert!(config.legacy_prefixes);
        assert!(!config.augment_with_declared);
        assert_eq!(config.symbol_extension, "php");
        assert_eq!(RegistryConfig::from_composer_str("{}").unwrap(), RegistryConfig::default());
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            SourceDescriptor::from_composer_str("{ not json", "/"),
            Err(ManifestError::Json { .. })
        ));
    }
}
