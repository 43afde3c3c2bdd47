//! Merkle list nodes and their range summaries.
//!
//! A node is either a [`TreeNode::Leaf`] holding post entries or a
//! [`TreeNode::Internal`] node holding [`ChildLink`]s. Nodes are values: a
//! mutation always builds a new node, and a stored node is never touched
//! again.

use std::ops::{Bound, RangeBounds};

use serde::{Deserialize, Serialize};
use skein_types::Address;

use crate::error::{ListError, ListResult};

/// A post reference inside a leaf.
///
/// The key is copied from the post when it is inserted. Posts are immutable,
/// so the copy can never go stale, and routing never has to decode a post.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeafEntry {
    /// The post's `created_at`.
    pub key: u64,
    /// Address of the stored post.
    pub post: Address,
}

/// Summary of a child subtree held by its parent.
///
/// `min_key` and `max_key` are the smallest and largest keys stored anywhere
/// below `address`. They are recomputed every time the child is rewritten.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildLink {
    pub min_key: u64,
    pub max_key: u64,
    pub address: Address,
}

impl ChildLink {
    /// Whether `key` falls inside `[min_key, max_key]`.
    pub fn contains(&self, key: u64) -> bool {
        self.min_key <= key && key <= self.max_key
    }

    /// Whether any key in `[min_key, max_key]` falls inside `range`.
    pub fn overlaps<R: RangeBounds<u64>>(&self, range: &R) -> bool {
        let after_start = match range.start_bound() {
            Bound::Included(start) => self.max_key >= *start,
            Bound::Excluded(start) => self.max_key > *start,
            Bound::Unbounded => true,
        };
        let before_end = match range.end_bound() {
            Bound::Included(end) => self.min_key <= *end,
            Bound::Excluded(end) => self.min_key < *end,
            Bound::Unbounded => true,
        };
        after_start && before_end
    }
}

/// A merkle list node, the unit of persistence.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TreeNode {
    /// Depth 0: post entries sorted by key, equal keys in insertion order.
    Leaf { entries: Vec<LeafEntry> },
    /// Depth > 0: child links sorted by `min_key`, all one level down.
    Internal { depth: u32, children: Vec<ChildLink> },
}

impl TreeNode {
    /// A leaf holding `entries`.
    pub fn leaf(entries: Vec<LeafEntry>) -> Self {
        Self::Leaf { entries }
    }

    /// An internal node at `depth` holding `children`.
    pub fn internal(depth: u32, children: Vec<ChildLink>) -> Self {
        Self::Internal { depth, children }
    }

    /// An empty leaf; the published form of an empty list.
    pub fn empty() -> Self {
        Self::Leaf {
            entries: Vec::new(),
        }
    }

    pub fn depth(&self) -> u32 {
        match self {
            Self::Leaf { .. } => 0,
            Self::Internal { depth, .. } => *depth,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Self::Leaf { .. })
    }

    /// Number of items: entries for a leaf, children for an internal node.
    pub fn len(&self) -> usize {
        match self {
            Self::Leaf { entries } => entries.len(),
            Self::Internal { children, .. } => children.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Smallest and largest key below this node, or `None` when empty.
    pub fn key_range(&self) -> Option<(u64, u64)> {
        match self {
            Self::Leaf { entries } => {
                Some((entries.first()?.key, entries.last()?.key))
            }
            Self::Internal { children, .. } => {
                Some((children.first()?.min_key, children.last()?.max_key))
            }
        }
    }

    /// Build the parent's link to this node, stored at `address`.
    ///
    /// Valid because leaves are kept sorted and internal links are ordered,
    /// so the first and last items carry the extreme keys.
    pub fn summarize(&self, address: Address) -> ListResult<ChildLink> {
        let (min_key, max_key) = self.key_range().ok_or_else(|| {
            ListError::InvariantViolation(format!(
                "cannot summarize empty node at depth {}",
                self.depth()
            ))
        })?;
        Ok(ChildLink {
            min_key,
            max_key,
            address,
        })
    }

    /// Split an overflowing node in place.
    ///
    /// The first `capacity` items stay in `self`; the remainder is cut into
    /// new siblings at the same depth, each holding at most `capacity` items.
    /// Returns the siblings in key order, or nothing if `self` fits.
    pub fn split_overflow(&mut self, capacity: usize) -> Vec<TreeNode> {
        match self {
            Self::Leaf { entries } => split_items(entries, capacity)
                .into_iter()
                .map(TreeNode::leaf)
                .collect(),
            Self::Internal { depth, children } => {
                let depth = *depth;
                split_items(children, capacity)
                    .into_iter()
                    .map(|chunk| TreeNode::internal(depth, chunk))
                    .collect()
            }
        }
    }
}

fn split_items<T>(items: &mut Vec<T>, capacity: usize) -> Vec<Vec<T>> {
    if items.len() <= capacity {
        return Vec::new();
    }
    let mut chunks = Vec::new();
    let mut rest = items.split_off(capacity);
    while rest.len() > capacity {
        let tail = rest.split_off(capacity);
        chunks.push(rest);
        rest = tail;
    }
    chunks.push(rest);
    chunks
}
