//! Qualified namespace names.

use std::fmt;
use std::sync::Arc;

use smol_str::SmolStr;

/// Characters accepted as segment separators on input.
pub const SEPARATORS: [char; 2] = ['.', '\\'];

/// Separator used when rendering the canonical form.
pub const CANONICAL_SEPARATOR: char = '.';

/// A normalized, segmented namespace or symbol name.
///
/// `NamespaceName` is built from raw text such as `"\\App\\Models\\"` or
/// `"App.Models"`. Surrounding whitespace and separators are stripped and
/// empty segments are dropped, so both inputs above produce the same name.
/// Equality, ordering and hashing are by segment list, which is the same as
/// comparing canonical forms.
///
/// The segment list is shared, so cloning a name is cheap.
#[derive(Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct NamespaceName {
    segments: Arc<[SmolStr]>,
}

/// A fully-qualified symbol name. Same representation as a namespace name.
pub type QualifiedName = NamespaceName;

impl NamespaceName {
    /// Normalize raw text into a name.
    pub fn new(raw: &str) -> Self {
        let segments: Vec<SmolStr> = raw
            .split(SEPARATORS)
            .map(str::trim)
            .filter(|segment| !segment.is_empty())
            .map(SmolStr::new)
            .collect();
        Self::from_segments(segments)
    }

    /// The empty name (zero segments).
    pub fn empty() -> Self {
        Self {
            segments: Arc::from(Vec::new()),
        }
    }

    /// Build a name from already-split segments.
    ///
    /// Empty segments are dropped.
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<SmolStr>,
    {
        let segments: Vec<SmolStr> = segments
            .into_iter()
            .map(Into::into)
            .filter(|segment: &SmolStr| !segment.is_empty())
            .collect();
        Self {
            segments: segments.into(),
        }
    }

    /// The ordered segment list.
    #[inline]
    pub fn segments(&self) -> &[SmolStr] {
        &self.segments
    }

    /// Number of segments.
    #[inline]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Whether the name has no segments.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// The last segment, or `""` for the empty name.
    pub fn short_name(&self) -> &str {
        self.segments.last().map(SmolStr::as_str).unwrap_or("")
    }

    /// All but the last segment. The parent of a one-segment name is empty.
    pub fn parent(&self) -> NamespaceName {
        match self.segments.split_last() {
            Some((_, init)) => Self::from_segments(init.iter().cloned()),
            None => Self::empty(),
        }
    }

    /// Append one segment (normalized through the same rules as `new`).
    pub fn child(&self, segment: &str) -> NamespaceName {
        let extra = NamespaceName::new(segment);
        self.join(&extra)
    }

    /// Append `segment` verbatim, without splitting or trimming it.
    ///
    /// Use this for short names that already are a single segment, such as
    /// normalized file names.
    pub fn with_segment(&self, segment: impl Into<SmolStr>) -> NamespaceName {
        let segment = segment.into();
        if segment.is_empty() {
            return self.clone();
        }
        let segments: Vec<SmolStr> = self
            .segments
            .iter()
            .cloned()
            .chain(std::iter::once(segment))
            .collect();
        Self {
            segments: segments.into(),
        }
    }

    /// Concatenate two names.
    pub fn join(&self, other: &NamespaceName) -> NamespaceName {
        Self::from_segments(self.segments.iter().chain(other.segments.iter()).cloned())
    }

    /// Whether `prefix` is an ancestor of, or equal to, this name.
    pub fn starts_with(&self, prefix: &NamespaceName) -> bool {
        self.segments.starts_with(&prefix.segments)
    }

    /// Whether `prefix` is a strict ancestor of this name.
    pub fn is_descendant_of(&self, prefix: &NamespaceName) -> bool {
        self.len() > prefix.len() && self.starts_with(prefix)
    }

    /// The segments following `prefix`, if `prefix` is an ancestor or equal.
    pub fn strip_prefix(&self, prefix: &NamespaceName) -> Option<&[SmolStr]> {
        self.segments.strip_prefix(&*prefix.segments)
    }

    /// Render the canonical form.
    pub fn as_canonical(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for NamespaceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, "{CANONICAL_SEPARATOR}")?;
            }
            f.write_str(segment)?;
        }
        Ok(())
    }
}

impl fmt::Debug for NamespaceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NamespaceName({self})")
    }
}

impl Default for NamespaceName {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<&str> for NamespaceName {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for NamespaceName {
    fn from(raw: String) -> Self {
        Self::new(&raw)
    }
}

impl From<&String> for NamespaceName {
    fn from(raw: &String) -> Self {
        Self::new(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_separators() {
        let a = NamespaceName::new("\\App\\Models\\");
        let b = NamespaceName::new("App.Models");
        let c = NamespaceName::new("  .App..Models.  ");

        assert_eq!(a, b);
        assert_eq!(b, c);
        assert_eq!(a.to_string(), "App.Models");
        let segments: Vec<&str> = a.segments().iter().map(SmolStr::as_str).collect();
        assert_eq!(segments, vec!["App", "Models"]);
    }

    #[test]
    fn test_short_name_and_parent() {
        let name = NamespaceName::new("App.Models.User");

        assert_eq!(name.short_name(), "User");
        assert_eq!(name.parent(), NamespaceName::new("App.Models"));
        assert_eq!(name.parent().parent(), NamespaceName::new("App"));
    }

    #[test]
    fn test_top_level_parent_is_empty() {
        let name = NamespaceName::new("App");

        assert!(name.parent().is_empty());
        assert_eq!(name.parent().to_string(), "");
        assert_eq!(NamespaceName::empty().short_name(), "");
    }

    #[test]
    fn test_prefix_matching_is_segment_based() {
        let name = NamespaceName::new("App.Models.User");

        assert!(name.starts_with(&NamespaceName::new("App")));
        assert!(name.starts_with(&NamespaceName::new("App.Models.User")));
        // "Ap" is a string prefix but not a segment prefix.
        assert!(!name.starts_with(&NamespaceName::new("Ap")));
        assert!(name.is_descendant_of(&NamespaceName::new("App.Models")));
        assert!(!name.is_descendant_of(&name));

        let rest = name.strip_prefix(&NamespaceName::new("App")).unwrap();
        let rest: Vec<&str> = rest.iter().map(SmolStr::as_str).collect();
        assert_eq!(rest, vec!["Models", "User"]);
    }

    #[test]
    fn test_child_and_join() {
        let app = NamespaceName::new("App");

        assert_eq!(app.child("Models"), NamespaceName::new("App.Models"));
        assert_eq!(
            app.join(&NamespaceName::new("Http\\Controllers")),
            NamespaceName::new("App.Http.Controllers")
        );
        assert_eq!(NamespaceName::empty().child("App"), app);
    }

    #[test]
    fn test_with_segment_keeps_separators() {
        let app = NamespaceName::new("App");

        let odd = app.with_segment("Foo\\Bar");
        assert_eq!(odd.len(), 2);
        assert_eq!(odd.short_name(), "Foo\\Bar");
        assert_eq!(odd.parent(), app);
        assert_eq!(app.with_segment(""), app);
        assert_eq!(app.with_segment("Models"), app.child("Models"));
    }
}
