//! Content-addressed merkle list for Skein timelines.
//!
//! A merkle list is a balanced, multiway ordered tree whose nodes are
//! immutable blocks in a [`BlockStore`](skein_store::BlockStore), each named
//! by the hash of its bytes. Leaves hold post references sorted by key;
//! internal nodes hold [`ChildLink`]s carrying the key range of each child so
//! searches can skip subtrees without fetching them.
//!
//! Every insert rewrites the path from the owning leaf to the root and
//! stores each rewritten node under a new address. Earlier versions stay
//! reachable from their published root addresses, so a published root is a
//! consistent snapshot that any number of readers can load.
//!
//! ```text
//!                 root (in memory)
//!          [1..=40]  [41..=80]  [81..=97]
//!             |          |          |
//!          leaves     leaves     leaves      (stored blocks)
//! ```
//!
//! # Modules
//!
//! - [`node`] -- [`TreeNode`], [`LeafEntry`], [`ChildLink`] and splitting
//! - [`codec`] -- canonical encoding to and from stored blocks
//! - [`config`] -- [`ListConfig`]
//! - [`error`] -- [`ListError`]
//!
//! Insert, lookup and traversal live on [`MerkleList`].

pub mod codec;
pub mod config;
pub mod error;
mod insert;
mod list;
pub mod node;
mod search;
mod walk;

pub use config::{ListConfig, DEFAULT_CAPACITY, MIN_CAPACITY};
pub use error::{ListError, ListResult};
pub use list::MerkleList;
pub use node::{ChildLink, LeafEntry, TreeNode};
pub use walk::TreeStats;
