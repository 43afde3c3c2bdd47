use std::collections::HashMap;
use std::sync::RwLock;

use skein_types::Address;

use crate::block::StoredBlock;
use crate::error::{StoreError, StoreResult};
use crate::traits::BlockStore;

/// In-memory, HashMap-based block store.
///
/// Intended for tests and embedding. Blocks live behind a `RwLock` and are
/// cloned on read and write.
pub struct InMemoryBlockStore {
    blocks: RwLock<HashMap<Address, StoredBlock>>,
}

impl InMemoryBlockStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            blocks: RwLock::new(HashMap::new()),
        }
    }

    /// Number of blocks currently stored.
    pub fn len(&self) -> StoreResult<usize> {
        Ok(self.blocks.read().map_err(|_| StoreError::Poisoned)?.len())
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.len()? == 0)
    }
}

impl Default for InMemoryBlockStore {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockStore for InMemoryBlockStore {
    fn read(&self, address: &Address) -> StoreResult<Option<StoredBlock>> {
        let map = self.blocks.read().map_err(|_| StoreError::Poisoned)?;
        Ok(map.get(address).cloned())
    }

    fn write(&self, block: &StoredBlock) -> StoreResult<Address> {
        let address = block.compute_address();
        let mut map = self.blocks.write().map_err(|_| StoreError::Poisoned)?;
        map.entry(address).or_insert_with(|| block.clone());
        Ok(address)
    }

    fn exists(&self, address: &Address) -> StoreResult<bool> {
        let map = self.blocks.read().map_err(|_| StoreError::Poisoned)?;
        Ok(map.contains_key(address))
    }
}

impl std::fmt::Debug for InMemoryBlockStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.blocks.read().map(|map| map.len()).unwrap_or_default();
        f.debug_struct("InMemoryBlockStore")
            .field("block_count", &count)
            .finish()
    }
}
