//! Ordered traversal, statistics, and structural verification.

use std::ops::RangeBounds;

use serde::{Deserialize, Serialize};
use skein_store::BlockStore;
use skein_types::Post;

use crate::error::{ListError, ListResult};
use crate::list::MerkleList;
use crate::node::TreeNode;

/// Shape of a merkle list.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeStats {
    /// Depth of the root (0 for a single leaf or an empty list).
    pub depth: u32,
    pub leaves: usize,
    pub internal_nodes: usize,
    pub posts: usize,
}

impl<S: BlockStore> MerkleList<S> {
    /// Visit every post in ascending key order.
    ///
    /// The visitor may stop the walk by returning an error, which is handed
    /// back unchanged. Running `for_each` again re-derives the same sequence
    /// from the same root.
    pub fn for_each<E, F>(&self, visit: F) -> Result<(), E>
    where
        F: FnMut(Post) -> Result<(), E>,
        E: From<ListError>,
    {
        self.for_each_in_range(.., visit)
    }

    /// Visit, in order, the posts whose key falls in `range`.
    ///
    /// Children whose summary lies outside the range are never fetched.
    pub fn for_each_in_range<R, E, F>(&self, range: R, mut visit: F) -> Result<(), E>
    where
        R: RangeBounds<u64>,
        F: FnMut(Post) -> Result<(), E>,
        E: From<ListError>,
    {
        match &self.root {
            Some(root) => self.walk(root, &range, &mut visit),
            None => Ok(()),
        }
    }

    fn walk<R, E, F>(&self, node: &TreeNode, range: &R, visit: &mut F) -> Result<(), E>
    where
        R: RangeBounds<u64>,
        F: FnMut(Post) -> Result<(), E>,
        E: From<ListError>,
    {
        match node {
            TreeNode::Leaf { entries } => {
                for entry in entries.iter().filter(|entry| range.contains(&entry.key)) {
                    visit(self.load_entry(entry)?)?;
                }
            }
            TreeNode::Internal { depth, children } => {
                for link in children.iter().filter(|link| link.overlaps(range)) {
                    let child = self.load_child(link, *depth)?;
                    self.walk(&child, range, visit)?;
                }
            }
        }
        Ok(())
    }

    /// Count nodes and posts without decoding any post.
    pub fn stats(&self) -> ListResult<TreeStats> {
        let mut stats = TreeStats::default();
        if let Some(root) = &self.root {
            stats.depth = root.depth();
            self.survey(root, false, &mut stats)?;
        }
        Ok(stats)
    }

    /// Walk the whole list and re-check its structural invariants.
    ///
    /// Checks node capacity, key order inside leaves, link order and
    /// non-overlap inside internal nodes, balanced depths, that every link
    /// equals the summary of the node it points to, and that every post
    /// decodes with the key its leaf recorded.
    pub fn verify(&self) -> ListResult<TreeStats> {
        let mut stats = TreeStats::default();
        if let Some(root) = &self.root {
            stats.depth = root.depth();
            self.survey(root, true, &mut stats)?;
        }
        Ok(stats)
    }

    fn survey(&self, node: &TreeNode, check: bool, stats: &mut TreeStats) -> ListResult<()> {
        if check {
            if node.len() > self.config.capacity {
                return Err(ListError::CapacityInvariantViolation {
                    depth: node.depth(),
                    count: node.len(),
                    capacity: self.config.capacity,
                });
            }
            if node.is_empty() {
                return Err(ListError::InvariantViolation(format!(
                    "empty node at depth {}",
                    node.depth()
                )));
            }
        }

        match node {
            TreeNode::Leaf { entries } => {
                stats.leaves += 1;
                stats.posts += entries.len();
                if check {
                    if let Some(pair) = entries.windows(2).find(|pair| pair[0].key > pair[1].key) {
                        return Err(ListError::InvariantViolation(format!(
                            "leaf keys out of order: {} before {}",
                            pair[0].key, pair[1].key
                        )));
                    }
                    for entry in entries {
                        self.load_entry(entry)?;
                    }
                }
            }
            TreeNode::Internal { depth, children } => {
                stats.internal_nodes += 1;
                if check {
                    if let Some(link) = children.iter().find(|link| link.min_key > link.max_key) {
                        return Err(ListError::InvariantViolation(format!(
                            "child {} has inverted range {}..={}",
                            link.address.short_hex(),
                            link.min_key,
                            link.max_key
                        )));
                    }
                    if let Some(pair) = children
                        .windows(2)
                        .find(|pair| pair[0].max_key > pair[1].min_key)
                    {
                        return Err(ListError::InvariantViolation(format!(
                            "child ranges overlap: ..={} then {}..",
                            pair[0].max_key, pair[1].min_key
                        )));
                    }
                }
                for link in children {
                    let child = self.load_child(link, *depth)?;
                    if check && child.summarize(link.address)? != *link {
                        return Err(ListError::InvariantViolation(format!(
                            "stale summary for child {}",
                            link.address.short_hex()
                        )));
                    }
                    self.survey(&child, check, stats)?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec;
    use crate::config::ListConfig;
    use crate::node::{ChildLink, LeafEntry};
    use skein_store::InMemoryBlockStore;

    fn filled(
        capacity: usize,
        keys: impl IntoIterator<Item = u64>,
    ) -> MerkleList<InMemoryBlockStore> {
        let mut list = MerkleList::new(
            InMemoryBlockStore::new(),
            ListConfig::with_capacity(capacity).unwrap(),
        )
        .unwrap();
        for key in keys {
            list.insert(&Post::new(key, "x")).unwrap();
        }
        list
    }

    fn keys_in<R: RangeBounds<u64>>(list: &MerkleList<InMemoryBlockStore>, range: R) -> Vec<u64> {
        let mut keys = Vec::new();
        list.for_each_in_range(range, |post| -> ListResult<()> {
            keys.push(post.created_at);
            Ok(())
        })
        .unwrap();
        keys
    }

    #[derive(Debug)]
    enum VisitError {
        Stop,
        List(ListError),
    }

    impl From<ListError> for VisitError {
        fn from(e: ListError) -> Self {
            Self::List(e)
        }
    }

    #[test]
    fn empty_list_visits_nothing() {
        let list = filled(4, []);
        assert!(keys_in(&list, ..).is_empty());
        assert_eq!(list.stats().unwrap(), TreeStats::default());
    }

    #[test]
    fn visits_in_key_order() {
        let list = filled(3, [9, 4, 7, 1, 8, 2, 6, 3, 5]);
        assert_eq!(keys_in(&list, ..), (1..=9).collect::<Vec<_>>());
    }

    #[test]
    fn range_scan_respects_bounds() {
        let list = filled(3, 1..=50);
        assert_eq!(keys_in(&list, 10..=14), vec![10, 11, 12, 13, 14]);
        assert_eq!(keys_in(&list, 48..), vec![48, 49, 50]);
        assert_eq!(keys_in(&list, ..3), vec![1, 2]);
        assert!(keys_in(&list, 60..).is_empty());
    }

    #[test]
    fn visitor_error_stops_the_walk() {
        let list = filled(3, 1..=20);
        let mut seen = 0;
        let result = list.for_each(|post| {
            seen += 1;
            if post.created_at == 5 {
                Err(VisitError::Stop)
            } else {
                Ok(())
            }
        });
        assert!(matches!(result, Err(VisitError::Stop)));
        assert_eq!(seen, 5);
    }

    #[test]
    fn store_errors_reach_the_visitor_type() {
        let mut list = filled(2, 1..=8);
        // Point the root at a child that does not exist.
        if let Some(TreeNode::Internal { children, .. }) = &mut list.root {
            children[0].address = skein_types::Address::from_bytes(b"gone");
        }
        let result = list.for_each(|_| Ok::<(), VisitError>(()));
        assert!(matches!(
            result,
            Err(VisitError::List(ListError::MissingBlock(_)))
        ));
    }

    #[test]
    fn stats_count_nodes_and_posts() {
        let list = filled(4, 1..=17);
        let stats = list.stats().unwrap();
        assert_eq!(stats.posts, 17);
        assert!(stats.depth >= 1);
        assert!(stats.leaves >= 5);
        assert_eq!(list.verify().unwrap(), stats);
    }

    #[test]
    fn verify_catches_capacity_overflow() {
        let list = filled(8, 1..=8);
        let address = list.publish_root().unwrap();
        let tighter =
            MerkleList::load(list.store(), ListConfig::with_capacity(4).unwrap(), &address)
                .unwrap();
        assert!(matches!(
            tighter.verify(),
            Err(ListError::CapacityInvariantViolation { count: 8, capacity: 4, .. })
        ));
    }

    #[test]
    fn verify_catches_stale_summary() {
        let mut list = filled(2, 1..=6);
        if let Some(TreeNode::Internal { children, .. }) = &mut list.root {
            children[0].max_key += 1;
        }
        assert!(matches!(list.verify(), Err(ListError::InvariantViolation(_))));
    }

    #[test]
    fn verify_catches_misordered_leaf() {
        let store = InMemoryBlockStore::new();
        let first = codec::store_post(&store, &Post::new(5, "x")).unwrap();
        let second = codec::store_post(&store, &Post::new(3, "x")).unwrap();
        let mut list = MerkleList::new(&store, ListConfig::default()).unwrap();
        list.root = Some(TreeNode::leaf(vec![
            LeafEntry { key: 5, post: first },
            LeafEntry { key: 3, post: second },
        ]));
        assert!(matches!(list.verify(), Err(ListError::InvariantViolation(_))));
    }

    #[test]
    fn verify_catches_wrong_post_key() {
        let store = InMemoryBlockStore::new();
        let post = codec::store_post(&store, &Post::new(5, "x")).unwrap();
        let mut list = MerkleList::new(&store, ListConfig::default()).unwrap();
        list.root = Some(TreeNode::leaf(vec![LeafEntry { key: 6, post }]));
        assert!(matches!(list.verify(), Err(ListError::CorruptRecord { .. })));
    }

    #[test]
    fn verify_catches_unbalanced_children() {
        let store = InMemoryBlockStore::new();
        let post = codec::store_post(&store, &Post::new(1, "x")).unwrap();
        let leaf = TreeNode::leaf(vec![LeafEntry { key: 1, post }]);
        let leaf_address = codec::store_node(&store, &leaf).unwrap();

        let mut list = MerkleList::new(&store, ListConfig::default()).unwrap();
        list.root = Some(TreeNode::internal(
            2,
            vec![ChildLink {
                min_key: 1,
                max_key: 1,
                address: leaf_address,
            }],
        ));
        assert!(matches!(list.verify(), Err(ListError::InvariantViolation(_))));
    }
}
