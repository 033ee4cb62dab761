//! Loading sources from composer-style manifests on disk.
#![cfg(feature = "manifest")]

use std::fs;
use std::sync::Arc;

use nsreflect::hir::ResolvedNamespace;
use nsreflect::project::{ManifestError, SourceDescriptor, SourceRegistry};
use nsreflect::RegistryConfig;

const MANIFEST: &str = r#"{
    "name": "acme/app",
    "autoload": {
        "psr-4": { "Acme\\App\\": "src/" },
        "psr-0": { "Acme_Old": "legacy/" }
    },
    "symbols": { "Acme\\App\\Kernel": "bootstrap/Kernel.php" },
    "extra": { "nsreflect": { "legacy-prefixes": true } }
}"#;

#[test]
fn test_manifest_drives_resolution() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("src/Http")).unwrap();
    fs::write(dir.path().join("src/Http/Router.php"), "").unwrap();
    fs::write(dir.path().join("src/Config.php"), "").unwrap();
    let manifest = dir.path().join("composer.json");
    fs::write(&manifest, MANIFEST).unwrap();

    let source = SourceDescriptor::from_composer_json(&manifest).unwrap();
    let registry = SourceRegistry::init(RegistryConfig::from_composer_json(&manifest).unwrap());
    registry.register(source);
    assert!(registry.is_loading_legacy_prefixes());

    let app = ResolvedNamespace::new("Acme\\App", Arc::clone(&registry)).unwrap();

    let names: Vec<_> = app.class_names().iter().map(|n| n.to_string()).collect();
    assert_eq!(names, vec!["Kernel", "Config"]);
    assert_eq!(
        app.class("Kernel").unwrap().location(),
        Some(dir.path().join("bootstrap/Kernel.php").as_path())
    );
    assert!(app.has_namespace("Http"));
    assert!(app.namespace("Http").unwrap().has_class("Router"));
}

#[test]
fn test_missing_manifest() {
    let dir = tempfile::tempdir().unwrap();

    let err = SourceDescriptor::from_composer_json(dir.path().join("composer.json")).unwrap_err();

    assert!(matches!(err, ManifestError::Io { .. }));
    assert!(err.to_string().starts_with("cannot read manifest"));
}
