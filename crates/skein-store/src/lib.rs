//! Content-addressed block storage for Skein.
//!
//! Every piece of persisted Skein data (posts and merkle list nodes) is an
//! immutable block identified by the domain-separated BLAKE3 hash of its
//! bytes. The store is a pure key-value map; it never interprets contents.
//!
//! # Storage Backends
//!
//! All backends implement the [`BlockStore`] trait:
//!
//! - [`InMemoryBlockStore`] -- `HashMap`-based store for tests and embedding
//! - [`FileBlockStore`] -- loose block files on the local filesystem
//!
//! # Design Rules
//!
//! 1. Blocks are immutable once written (content addressing guarantees this).
//! 2. Writes are idempotent; a repeated write is a no-op.
//! 3. Concurrent reads are always safe.
//! 4. Unreachable blocks are retained; there is no garbage collection.
//! 5. All I/O errors are propagated, never silently ignored.

pub mod block;
pub mod error;
pub mod fs;
pub mod memory;
pub mod traits;

pub use block::{BlockKind, StoredBlock};
pub use error::{StoreError, StoreResult};
pub use fs::FileBlockStore;
pub use memory::InMemoryBlockStore;
pub use traits::BlockStore;
