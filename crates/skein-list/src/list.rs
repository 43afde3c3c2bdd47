use skein_store::BlockStore;
use skein_types::{Address, Post};
use tracing::info;

use crate::codec;
use crate::config::ListConfig;
use crate::error::{ListError, ListResult};
use crate::node::{ChildLink, LeafEntry, TreeNode};

/// A timeline held as a content-addressed merkle list.
///
/// The handle owns a block store reference and the materialized root node.
/// Every node below the root lives in the store and is immutable; the root
/// itself stays in memory until [`publish_root`](Self::publish_root) writes
/// it and hands back the address that identifies this version of the list.
///
/// Mutation goes through `&mut self`, so a handle has a single writer.
/// Readers that need isolation should [`load`](Self::load) their own handle
/// from a published address instead of sharing a mutable one.
pub struct MerkleList<S> {
    pub(crate) store: S,
    pub(crate) config: ListConfig,
    pub(crate) root: Option<TreeNode>,
}

impl<S: BlockStore> MerkleList<S> {
    /// An empty list writing into `store`.
    pub fn new(store: S, config: ListConfig) -> ListResult<Self> {
        config.validate()?;
        Ok(Self {
            store,
            config,
            root: None,
        })
    }

    /// Resume the list published at `address`.
    pub fn load(store: S, config: ListConfig, address: &Address) -> ListResult<Self> {
        config.validate()?;
        let node = codec::fetch_node(&store, address)?;
        info!(root = %address.short_hex(), depth = node.depth(), "loaded merkle list");
        let root = if node.is_empty() { None } else { Some(node) };
        Ok(Self {
            store,
            config,
            root,
        })
    }

    /// Resume from `address` if there is one, otherwise start empty.
    pub fn open(store: S, config: ListConfig, address: Option<&Address>) -> ListResult<Self> {
        match address {
            Some(address) => Self::load(store, config, address),
            None => Self::new(store, config),
        }
    }

    /// Persist the in-memory root and return its address.
    ///
    /// An empty list publishes an empty leaf, which loads back as empty.
    /// Publishing twice without a mutation in between returns the same
    /// address.
    pub fn publish_root(&self) -> ListResult<Address> {
        let empty = TreeNode::empty();
        let root = self.root.as_ref().unwrap_or(&empty);
        let address = codec::store_node(&self.store, root)?;
        info!(
            root = %address.short_hex(),
            depth = root.depth(),
            items = root.len(),
            "published merkle list root"
        );
        Ok(address)
    }

    /// The in-memory root, if any post has been inserted.
    pub fn root(&self) -> Option<&TreeNode> {
        self.root.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Depth of the root; `None` for an empty list.
    pub fn depth(&self) -> Option<u32> {
        self.root.as_ref().map(TreeNode::depth)
    }

    pub fn config(&self) -> &ListConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Write `node` and build the link its parent will hold.
    pub(crate) fn store_and_summarize(&self, node: &TreeNode) -> ListResult<ChildLink> {
        let address = codec::store_node(&self.store, node)?;
        node.summarize(address)
    }

    /// Fetch the post behind a leaf entry and check it carries the entry's key.
    pub(crate) fn load_entry(&self, entry: &LeafEntry) -> ListResult<Post> {
        let post = codec::fetch_post(&self.store, &entry.post)?;
        if post.created_at != entry.key {
            return Err(ListError::CorruptRecord {
                address: entry.post,
                reason: format!(
                    "leaf expects key {}, post has created_at {}",
                    entry.key, post.created_at
                ),
            });
        }
        Ok(post)
    }

    /// Fetch a child and check it sits exactly one level below `parent_depth`.
    pub(crate) fn load_child(&self, link: &ChildLink, parent_depth: u32) -> ListResult<TreeNode> {
        let child = codec::fetch_node(&self.store, &link.address)?;
        if child.depth() + 1 != parent_depth {
            return Err(ListError::InvariantViolation(format!(
                "child {} has depth {} under a parent at depth {parent_depth}",
                link.address.short_hex(),
                child.depth()
            )));
        }
        Ok(child)
    }
}

impl<S> std::fmt::Debug for MerkleList<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MerkleList")
            .field("capacity", &self.config.capacity)
            .field("depth", &self.root.as_ref().map(TreeNode::depth))
            .field("root_items", &self.root.as_ref().map(TreeNode::len))
            .finish()
    }
}
