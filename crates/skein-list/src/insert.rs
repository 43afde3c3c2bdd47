//! Ordered insertion with copy-on-write splitting.
//!
//! An insert descends from the in-memory root to the owning leaf, then
//! rebuilds every node on the way back up. Each rewritten child is stored
//! under its new address and its parent link is recomputed. Nodes that
//! exceed capacity split; the new siblings are linked right after the node
//! they came from, and a split root grows the tree by one level.

use skein_store::BlockStore;
use skein_types::{Address, Post};
use tracing::debug;

use crate::codec;
use crate::error::{ListError, ListResult};
use crate::list::MerkleList;
use crate::node::{LeafEntry, TreeNode};

/// A node after an insert, plus the siblings it split off (key order).
struct Rewritten {
    node: TreeNode,
    overflow: Vec<TreeNode>,
}

impl<S: BlockStore> MerkleList<S> {
    /// Insert a post in key order and return the post's address.
    ///
    /// Posts with equal keys keep their insertion order. The in-memory root
    /// is replaced only once the whole path has been rebuilt, so a failed
    /// insert leaves the list exactly as it was.
    pub fn insert(&mut self, post: &Post) -> ListResult<Address> {
        let address = codec::store_post(&self.store, post)?;
        let key = post.key();

        let root = match &self.root {
            None => TreeNode::leaf(vec![LeafEntry { key, post: address }]),
            Some(root) => {
                let rewritten = self.insert_into(root, key, address)?;
                self.grow(rewritten)?
            }
        };
        self.root = Some(root);
        Ok(address)
    }

    /// Insert posts in order, all or nothing.
    ///
    /// If any insert fails the root is restored to its state before the
    /// batch. Blocks already written stay in the store, unreferenced.
    pub fn insert_batch(&mut self, posts: &[Post]) -> ListResult<Vec<Address>> {
        let saved = self.root.clone();
        let mut addresses = Vec::with_capacity(posts.len());
        for post in posts {
            match self.insert(post) {
                Ok(address) => addresses.push(address),
                Err(e) => {
                    self.root = saved;
                    return Err(e);
                }
            }
        }
        Ok(addresses)
    }

    fn insert_into(&self, node: &TreeNode, key: u64, post: Address) -> ListResult<Rewritten> {
        let capacity = self.config.capacity;
        match node {
            TreeNode::Leaf { entries } => {
                let mut entries = entries.clone();
                // Most inserts are appends, so search from the tail.
                let at = entries
                    .iter()
                    .rposition(|entry| entry.key <= key)
                    .map_or(0, |i| i + 1);
                entries.insert(at, LeafEntry { key, post });

                let mut node = TreeNode::leaf(entries);
                let overflow = node.split_overflow(capacity);
                if !overflow.is_empty() {
                    debug!(key, siblings = overflow.len(), "split leaf");
                }
                Ok(Rewritten { node, overflow })
            }
            TreeNode::Internal { depth, children } => {
                if children.is_empty() {
                    return Err(ListError::InvariantViolation(format!(
                        "internal node at depth {depth} has no children"
                    )));
                }
                let slot = children
                    .iter()
                    .rposition(|link| link.min_key <= key)
                    .unwrap_or(0);

                let child = self.load_child(&children[slot], *depth)?;
                let Rewritten {
                    node: child,
                    overflow: child_overflow,
                } = self.insert_into(&child, key, post)?;

                let mut children = children.clone();
                children[slot] = self.store_and_summarize(&child)?;
                for (offset, sibling) in child_overflow.iter().enumerate() {
                    children.insert(slot + 1 + offset, self.store_and_summarize(sibling)?);
                }

                let mut node = TreeNode::internal(*depth, children);
                let overflow = node.split_overflow(capacity);
                if !overflow.is_empty() {
                    debug!(depth, siblings = overflow.len(), "split internal node");
                }
                Ok(Rewritten { node, overflow })
            }
        }
    }

    /// Turn a rewritten root into the new root, adding levels while it
    /// keeps splitting.
    fn grow(&self, rewritten: Rewritten) -> ListResult<TreeNode> {
        let Rewritten {
            mut node,
            mut overflow,
        } = rewritten;

        while !overflow.is_empty() {
            let depth = node.depth() + 1;
            let mut children = Vec::with_capacity(overflow.len() + 1);
            children.push(self.store_and_summarize(&node)?);
            for sibling in &overflow {
                children.push(self.store_and_summarize(sibling)?);
            }
            debug!(depth, children = children.len(), "grew new root");

            node = TreeNode::internal(depth, children);
            overflow = node.split_overflow(self.config.capacity);
        }

        if node.len() > self.config.capacity {
            return Err(ListError::CapacityInvariantViolation {
                depth: node.depth(),
                count: node.len(),
                capacity: self.config.capacity,
            });
        }
        Ok(node)
    }
}
