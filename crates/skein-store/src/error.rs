use skein_types::Address;

/// Errors from block store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The requested block was not found.
    #[error("block not found: {0}")]
    NotFound(Address),

    /// Content hash mismatch on read (data corruption).
    #[error("hash mismatch for {address}: computed {computed}")]
    HashMismatch { address: Address, computed: Address },

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The block bytes on disk cannot be decoded into a block.
    #[error("corrupt block {address}: {reason}")]
    CorruptBlock { address: Address, reason: String },

    /// A lock guarding the backend was poisoned by a panicking writer.
    #[error("store lock poisoned")]
    Poisoned,
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
