//! Union-find over dense integer element IDs.
//!
//! The mapping layer uses [`DisjointSets`] to coalesce equivalence classes
//! of signals and resources (interchangeable functional units, aliased
//! wires). The implementation is union-by-rank with full path compression,
//! giving amortized near-constant time per operation.

use crate::error::XilError;

/// One node of the union-find forest.
#[derive(Debug, Clone)]
struct Node {
    /// Upper bound on the height of the subtree rooted here.
    rank: u32,
    /// Parent index; `None` for a root.
    parent: Option<u32>,
}

/// A disjoint-set (union-find) structure over element IDs `0..element_count`.
///
/// # Caller contract for `union`
///
/// [`union`](DisjointSets::union) accepts any element ID and links the
/// *nodes stored at those indices* without re-rooting them first. Passing a
/// non-root element that already has a parent corrupts the forest. Callers
/// must pass results of prior [`find_set`](DisjointSets::find_set) calls;
/// the structure deliberately does not guard against anything else beyond a
/// bounds check.
#[derive(Debug, Clone, Default)]
pub struct DisjointSets {
    nodes: Vec<Node>,
    set_count: usize,
}

impl DisjointSets {
    /// Creates `n` singleton sets with IDs `0..n`.
    pub fn new(n: usize) -> Self {
        let mut sets = Self {
            nodes: Vec::new(),
            set_count: 0,
        };
        sets.add_elements(n);
        sets
    }

    /// Appends `k` new singleton sets; the new IDs are contiguous starting
    /// from the previous element count.
    pub fn add_elements(&mut self, k: usize) {
        self.nodes.extend((0..k).map(|_| Node {
            rank: 0,
            parent: None,
        }));
        self.set_count += k;
    }

    /// Returns the total number of elements.
    pub fn element_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the current number of disjoint sets.
    pub fn set_count(&self) -> usize {
        self.set_count
    }

    /// Returns the root representative of the set containing `id`.
    ///
    /// Logically read-only, but performs full path compression: after the
    /// call, every node on the walked path points directly at the root.
    pub fn find_set(&mut self, id: usize) -> Result<usize, XilError> {
        if id >= self.nodes.len() {
            return Err(XilError::OutOfRange {
                what: "element",
                index: id,
                count: self.nodes.len(),
            });
        }
        // Walk up to the root, then point every visited node at it.
        let mut root = id;
        while let Some(parent) = self.nodes[root].parent {
            root = parent as usize;
        }
        let mut cursor = id;
        while let Some(parent) = self.nodes[cursor].parent {
            self.nodes[cursor].parent = Some(root as u32);
            cursor = parent as usize;
        }
        Ok(root)
    }

    /// Merges the sets rooted at `a` and `b` by rank.
    ///
    /// `union(x, x)` is a no-op. Per the caller contract above, `a` and `b`
    /// are linked directly: the higher-rank node becomes the parent, and on
    /// a rank tie `a` becomes the parent and its rank increments.
    pub fn union(&mut self, a: usize, b: usize) -> Result<(), XilError> {
        let count = self.nodes.len();
        if a >= count {
            return Err(XilError::OutOfRange {
                what: "element",
                index: a,
                count,
            });
        }
        if b >= count {
            return Err(XilError::OutOfRange {
                what: "element",
                index: b,
                count,
            });
        }
        if a == b {
            return Ok(());
        }
        if self.nodes[a].rank >= self.nodes[b].rank {
            if self.nodes[a].rank == self.nodes[b].rank {
                self.nodes[a].rank += 1;
            }
            self.nodes[b].parent = Some(a as u32);
        } else {
            self.nodes[a].parent = Some(b as u32);
        }
        self.set_count -= 1;
        Ok(())
    }

    /// The rank of the node at `id` (test and debugging aid).
    pub fn rank(&self, id: usize) -> Option<u32> {
        self.nodes.get(id).map(|n| n.rank)
    }

    /// The direct parent of the node at `id`, or `None` for a root.
    pub fn parent(&self, id: usize) -> Option<usize> {
        self.nodes.get(id).and_then(|n| n.parent).map(|p| p as usize)
    }
}
