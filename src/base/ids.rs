//! Identifiers for registered sources and registry snapshots.

use std::fmt;

/// Identifier assigned to a source when it is registered.
///
/// `SourceId` is a lightweight handle (just a u32). Ids are assigned
/// sequentially per registry and never reused until the registry is reset.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct SourceId(u32);

impl SourceId {
    /// Create a new SourceId from a raw index.
    #[inline]
    pub(crate) const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw index.
    #[inline]
    pub const fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SourceId({})", self.0)
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "source#{}", self.0)
    }
}

/// Opaque identity of a registry's source list at some point in time.
///
/// Two equal tokens from the same registry mean the source list did not
/// change in between. Tokens start at 1; `SnapshotToken::NONE` never
/// matches a live snapshot and marks a namespace that was never merged.
#[derive(Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct SnapshotToken(u64);

impl SnapshotToken {
    /// Token that matches no snapshot.
    pub const NONE: SnapshotToken = SnapshotToken(0);

    #[inline]
    pub(crate) const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// The token following this one.
    #[inline]
    pub(crate) const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Debug for SnapshotToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SnapshotToken({})", self.0)
    }
}
