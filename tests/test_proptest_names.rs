//! Property-based tests for name normalization.
//!
//! Separators and padding around a name must never change what it means:
//! the canonical form, the short name and the parent are all stable under
//! re-normalization and under either separator.
#![cfg(feature = "proptest")]

use nsreflect::NamespaceName;
use nsreflect::project::normalize_file_name;
use proptest::prelude::*;

// ============================================================================
// PROPTEST STRATEGIES
// ============================================================================

/// Strategy for a single namespace segment.
fn arb_segment() -> impl Strategy<Value = String> {
    "[A-Z][a-zA-Z0-9_]{0,12}"
}

/// Strategy for a non-empty segment list.
fn arb_segments() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(arb_segment(), 1..6)
}

/// Strategy for separator padding.
fn arb_padding() -> impl Strategy<Value = String> {
    "[\\\\.]{0,3}"
}

// ============================================================================
// PROPERTIES
// ============================================================================

proptest! {
    #[test]
    fn prop_normalization_is_idempotent(segments in arb_segments()) {
        let name = NamespaceName::new(&segments.join("\\"));
        let again = NamespaceName::new(&name.to_string());

        prop_assert_eq!(&again, &name);
        prop_assert_eq!(again.to_string(), segments.join("."));
    }

    #[test]
    fn prop_padding_is_ignored(
        segments in arb_segments(),
        lead in arb_padding(),
        trail in arb_padding(),
    ) {
        let plain = NamespaceName::new(&segments.join("."));
        let padded = NamespaceName::new(&format!("{lead}{}{trail}", segments.join("\\")));

        prop_assert_eq!(padded.short_name(), plain.short_name());
        prop_assert_eq!(padded.parent(), plain.parent());
        prop_assert_eq!(padded, plain);
    }

    #[test]
    fn prop_parent_and_short_name_rebuild_the_name(segments in arb_segments()) {
        let name = NamespaceName::new(&segments.join("."));
        let rebuilt = name.parent().child(name.short_name());

        prop_assert_eq!(rebuilt, name);
    }

    #[test]
    fn prop_file_name_normalization_is_idempotent(stem in "[a-z][a-z0-9_-]{0,16}") {
        let once = normalize_file_name(&format!("{stem}.php"));
        let twice = normalize_file_name(&once);

        prop_assert_eq!(twice, once.clone());
        prop_assert!(!once.contains(['-', '_', ' ']));
    }
}
