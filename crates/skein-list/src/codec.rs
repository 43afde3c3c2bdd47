//! Canonical encoding between posts/nodes and stored blocks.
//!
//! Posts are encoded as JSON. Object keys inside a post's payload come out
//! sorted, so the same logical post always produces the same bytes. Nodes are
//! encoded with bincode, which is deterministic for the fixed-shape node
//! types.

use skein_store::{BlockKind, BlockStore, StoredBlock};
use skein_types::{Address, Post};

use crate::error::{ListError, ListResult};
use crate::node::TreeNode;

/// Canonical block for a post.
pub fn encode_post(post: &Post) -> ListResult<StoredBlock> {
    let data = serde_json::to_vec(post).map_err(|e| ListError::Encode(e.to_string()))?;
    Ok(StoredBlock::new(BlockKind::Post, data))
}

/// Canonical block for a node.
pub fn encode_node(node: &TreeNode) -> ListResult<StoredBlock> {
    let data = bincode::serialize(node).map_err(|e| ListError::Encode(e.to_string()))?;
    Ok(StoredBlock::new(BlockKind::Node, data))
}

/// Encode and write a post, returning its address.
pub fn store_post<S: BlockStore>(store: &S, post: &Post) -> ListResult<Address> {
    Ok(store.write(&encode_post(post)?)?)
}

/// Encode and write a node, returning its address.
pub fn store_node<S: BlockStore>(store: &S, node: &TreeNode) -> ListResult<Address> {
    Ok(store.write(&encode_node(node)?)?)
}

/// Read and decode the post at `address`.
pub fn fetch_post<S: BlockStore>(store: &S, address: &Address) -> ListResult<Post> {
    let block = store
        .read(address)?
        .ok_or(ListError::MissingBlock(*address))?;
    if block.kind != BlockKind::Post {
        return Err(ListError::CorruptRecord {
            address: *address,
            reason: format!("expected post, got {}", block.kind),
        });
    }
    serde_json::from_slice(&block.data).map_err(|e| ListError::CorruptRecord {
        address: *address,
        reason: e.to_string(),
    })
}

/// Read and decode the node at `address`.
///
/// Besides decoding, rejects internal nodes that claim depth 0 or hold no
/// children; neither can be produced by an insert.
pub fn fetch_node<S: BlockStore>(store: &S, address: &Address) -> ListResult<TreeNode> {
    let block = store
        .read(address)?
        .ok_or(ListError::MissingBlock(*address))?;
    if block.kind != BlockKind::Node {
        return Err(ListError::CorruptNode {
            address: *address,
            reason: format!("expected node, got {}", block.kind),
        });
    }
    let node: TreeNode =
        bincode::deserialize(&block.data).map_err(|e| ListError::CorruptNode {
            address: *address,
            reason: e.to_string(),
        })?;

    if let TreeNode::Internal { depth, children } = &node {
        if *depth == 0 || children.is_empty() {
            return Err(ListError::CorruptNode {
                address: *address,
                reason: format!(
                    "internal node with depth {depth} and {} children",
                    children.len()
                ),
            });
        }
    }
    Ok(node)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{ChildLink, LeafEntry};
    use skein_store::InMemoryBlockStore;

    fn sample_leaf() -> TreeNode {
        TreeNode::leaf(vec![
            LeafEntry {
                key: 1,
                post: Address::from_bytes(b"one"),
            },
            LeafEntry {
                key: 2,
                post: Address::from_bytes(b"two"),
            },
        ])
    }

    #[test]
    fn post_roundtrip_through_store() {
        let store = InMemoryBlockStore::new();
        let post = Post::new(12, serde_json::json!({"text": "hello"})).with_author("alice");
        let address = store_post(&store, &post).unwrap();
        assert_eq!(fetch_post(&store, &address).unwrap(), post);
    }

    #[test]
    fn identical_posts_share_an_address() {
        let store = InMemoryBlockStore::new();
        let a = store_post(&store, &Post::new(5, "same")).unwrap();
        let b = store_post(&store, &Post::new(5, "same")).unwrap();
        assert_eq!(a, b);
        assert_eq!(store.len().unwrap(), 1);
    }

    #[test]
    fn payload_key_order_does_not_change_address() {
        let store = InMemoryBlockStore::new();
        let first: Post =
            serde_json::from_str(r#"{"created_at": 1, "data": {"a": 1, "b": 2}}"#).unwrap();
        let second: Post =
            serde_json::from_str(r#"{"data": {"b": 2, "a": 1}, "created_at": 1}"#).unwrap();
        assert_eq!(
            store_post(&store, &first).unwrap(),
            store_post(&store, &second).unwrap()
        );
    }

    #[test]
    fn node_roundtrip_and_dedup() {
        let store = InMemoryBlockStore::new();
        let node = sample_leaf();
        let a = store_node(&store, &node).unwrap();
        let b = store_node(&store, &node.clone()).unwrap();
        assert_eq!(a, b);
        assert_eq!(fetch_node(&store, &a).unwrap(), node);
    }

    #[test]
    fn changed_node_gets_new_address() {
        let store = InMemoryBlockStore::new();
        let before = store_node(&store, &sample_leaf()).unwrap();
        let mut changed = sample_leaf();
        if let TreeNode::Leaf { entries } = &mut changed {
            entries[1].key = 3;
        }
        assert_ne!(before, store_node(&store, &changed).unwrap());
    }

    #[test]
    fn missing_blocks_are_reported() {
        let store = InMemoryBlockStore::new();
        let address = Address::from_bytes(b"absent");
        assert!(matches!(
            fetch_post(&store, &address),
            Err(ListError::MissingBlock(a)) if a == address
        ));
        assert!(matches!(fetch_node(&store, &address), Err(ListError::MissingBlock(_))));
    }

    #[test]
    fn wrong_kind_is_corrupt() {
        let store = InMemoryBlockStore::new();
        let node_address = store_node(&store, &sample_leaf()).unwrap();
        let post_address = store_post(&store, &Post::new(1, "x")).unwrap();
        assert!(matches!(
            fetch_post(&store, &node_address),
            Err(ListError::CorruptRecord { .. })
        ));
        assert!(matches!(
            fetch_node(&store, &post_address),
            Err(ListError::CorruptNode { .. })
        ));
    }

    #[test]
    fn undecodable_bytes_are_corrupt() {
        let store = InMemoryBlockStore::new();
        let post_garbage = store
            .write(&StoredBlock::new(BlockKind::Post, b"not json".to_vec()))
            .unwrap();
        let node_garbage = store
            .write(&StoredBlock::new(BlockKind::Node, vec![9, 9, 9]))
            .unwrap();
        assert!(matches!(
            fetch_post(&store, &post_garbage),
            Err(ListError::CorruptRecord { .. })
        ));
        assert!(matches!(
            fetch_node(&store, &node_garbage),
            Err(ListError::CorruptNode { .. })
        ));
    }

    #[test]
    fn malformed_internal_node_is_corrupt() {
        let store = InMemoryBlockStore::new();
        let flat = store_node(
            &store,
            &TreeNode::internal(
                0,
                vec![ChildLink {
                    min_key: 1,
                    max_key: 1,
                    address: Address::from_bytes(b"c"),
                }],
            ),
        )
        .unwrap();
        let hollow = store_node(&store, &TreeNode::internal(1, Vec::new())).unwrap();
        assert!(matches!(fetch_node(&store, &flat), Err(ListError::CorruptNode { .. })));
        assert!(matches!(fetch_node(&store, &hollow), Err(ListError::CorruptNode { .. })));
    }
}
