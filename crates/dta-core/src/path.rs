//! Path keys: immutable ordered link sequences with value equality.
//!
//! Paths key the two central tables of the assignment — flow by departure
//! step and travel time by departure step — so they need a stable hash,
//! cheap clones, and value semantics.  The link sequence lives behind an
//! `Arc<[LinkId]>`: cloning a `Path` to insert it into another table is a
//! refcount bump, and `Hash`/`Eq` delegate to the slice contents.

use std::fmt;
use std::sync::Arc;

use crate::LinkId;

/// An ordered sequence of link IDs forming a route from an origin centroid
/// to a destination centroid.
///
/// Invariant: never empty — every path traverses at least one link.  The
/// network builder and shortest-path reconstruction are the only producers
/// and both guarantee this.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct Path(Arc<[LinkId]>);

impl Path {
    /// Build a path from a link sequence.
    pub fn new(links: impl Into<Arc<[LinkId]>>) -> Self {
        let links = links.into();
        debug_assert!(!links.is_empty(), "a path must traverse at least one link");
        Path(links)
    }

    /// The links traversed, in order.
    #[inline]
    pub fn links(&self) -> &[LinkId] {
        &self.0
    }

    /// Number of links traversed.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// First link — where demand is injected at the origin.
    #[inline]
    pub fn first(&self) -> LinkId {
        self.0[0]
    }

    /// Last link — where trips terminate at the destination.
    #[inline]
    pub fn last(&self) -> LinkId {
        self.0[self.0.len() - 1]
    }

    /// Does this path traverse `link`?
    #[inline]
    pub fn contains(&self, link: LinkId) -> bool {
        self.0.contains(&link)
    }

    /// The link this path takes immediately after `link`, or `None` if
    /// `link` is the last link or not on the path.
    ///
    /// Paths are simple (no repeated links), so the first occurrence is the
    /// only one.
    pub fn next_after(&self, link: LinkId) -> Option<LinkId> {
        let pos = self.0.iter().position(|&l| l == link)?;
        self.0.get(pos + 1).copied()
    }
}

impl From<Vec<LinkId>> for Path {
    fn from(links: Vec<LinkId>) -> Self {
        Path::new(links)
    }
}

impl FromIterator<LinkId> for Path {
    fn from_iter<I: IntoIterator<Item = LinkId>>(iter: I) -> Self {
        Path::new(iter.into_iter().collect::<Vec<_>>())
    }
}

impl fmt::Display for Path {
    /// Renders as `[0→3→7]` using the raw link indices.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, link) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "→")?;
            }
            write!(f, "{}", link.0)?;
        }
        write!(f, "]")
    }
}
