//! Error types for merkle list operations.

use skein_store::StoreError;
use skein_types::Address;
use thiserror::Error;

/// Errors that can occur while reading or mutating a merkle list.
#[derive(Debug, Error)]
pub enum ListError {
    /// The block store failed (I/O, hash mismatch). Never retried here.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// A referenced block is absent from the store.
    #[error("block not found: {0}")]
    MissingBlock(Address),

    /// A node block does not decode to a well-formed node.
    #[error("corrupt node {address}: {reason}")]
    CorruptNode { address: Address, reason: String },

    /// A post block does not decode to the expected post.
    #[error("corrupt record {address}: {reason}")]
    CorruptRecord { address: Address, reason: String },

    /// No post with this key exists. An expected outcome, not a fault.
    #[error("no post with key {key}")]
    NotFound { key: u64 },

    /// Lookup found several children whose ranges contain the key in a shape
    /// that a well-formed tree cannot produce.
    #[error("ambiguous range for key {key}: {matches} children claim it")]
    AmbiguousRange { key: u64, matches: usize },

    /// A node holds more items than the configured capacity.
    #[error("node at depth {depth} holds {count} items (capacity {capacity})")]
    CapacityInvariantViolation {
        depth: u32,
        count: usize,
        capacity: usize,
    },

    /// A structural invariant (ordering, balance, summaries) does not hold.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    /// The list configuration is unusable.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A post or node could not be encoded.
    #[error("encoding error: {0}")]
    Encode(String),
}

/// Convenience type alias for merkle list operations.
pub type ListResult<T> = std::result::Result<T, ListError>;
