use std::sync::Arc;

use skein_types::Address;

use crate::block::StoredBlock;
use crate::error::{StoreError, StoreResult};

/// Content-addressed block store.
///
/// All implementations must satisfy these invariants:
/// - Blocks are immutable once written. The same block always produces the
///   same address, so "overwriting" an address is impossible.
/// - Writes are idempotent: writing a block that already exists is a no-op.
/// - Concurrent reads are always safe (blocks are immutable).
/// - The store never interprets block contents.
/// - All I/O errors are propagated, never silently ignored.
pub trait BlockStore: Send + Sync {
    /// Read a block by address.
    ///
    /// Returns `Ok(None)` if the block does not exist.
    /// Returns `Err` on I/O failure or data corruption.
    fn read(&self, address: &Address) -> StoreResult<Option<StoredBlock>>;

    /// Write a block and return its content address.
    fn write(&self, block: &StoredBlock) -> StoreResult<Address>;

    /// Check whether a block exists in the store.
    fn exists(&self, address: &Address) -> StoreResult<bool>;

    /// Read a block that must exist, failing with [`StoreError::NotFound`].
    fn get(&self, address: &Address) -> StoreResult<StoredBlock> {
        self.read(address)?
            .ok_or(StoreError::NotFound(*address))
    }
}

impl<S: BlockStore + ?Sized> BlockStore for &S {
    fn read(&self, address: &Address) -> StoreResult<Option<StoredBlock>> {
        (**self).read(address)
    }

    fn write(&self, block: &StoredBlock) -> StoreResult<Address> {
        (**self).write(block)
    }

    fn exists(&self, address: &Address) -> StoreResult<bool> {
        (**self).exists(address)
    }
}

impl<S: BlockStore + ?Sized> BlockStore for Arc<S> {
    fn read(&self, address: &Address) -> StoreResult<Option<StoredBlock>> {
        (**self).read(address)
    }

    fn write(&self, block: &StoredBlock) -> StoreResult<Address> {
        (**self).write(block)
    }

    fn exists(&self, address: &Address) -> StoreResult<bool> {
        (**self).exists(address)
    }
}
