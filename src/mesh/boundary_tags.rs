//! Boundary tags for mesh faces.
//!
//! A mesh keeps an ordered list of tags; the tag at position `i` owns the bit
//! `1 << i` in the per-face tag masks of the facial adjacency tables.

use std::fmt;

/// Tag identifying a (part of the) mesh boundary.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BoundaryTag {
    /// Every boundary face that is a "real" boundary.
    All,

    /// Every boundary face, including those that only exist because of
    /// partitioning or periodic gluing.
    ReallyAll,

    /// Matches no face at all.
    NoBoundary,

    /// User-defined tag, e.g. "inflow" or "wall".
    Named(String),
}

impl BoundaryTag {
    /// Convenience constructor for a named tag.
    pub fn named(name: impl Into<String>) -> Self {
        BoundaryTag::Named(name.into())
    }

    /// Tags registered on every mesh, in bit order.
    pub fn builtin() -> [BoundaryTag; 2] {
        [BoundaryTag::All, BoundaryTag::ReallyAll]
    }

    /// Check if this tag never selects any face.
    pub fn is_empty(&self) -> bool {
        matches!(self, BoundaryTag::NoBoundary)
    }
}

impl fmt::Display for BoundaryTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundaryTag::All => write!(f, "all"),
            BoundaryTag::ReallyAll => write!(f, "really_all"),
            BoundaryTag::NoBoundary => write!(f, "none"),
            BoundaryTag::Named(name) => write!(f, "{name}"),
        }
    }
}
