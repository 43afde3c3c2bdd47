use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use skein_types::Address;
use tracing::debug;

use crate::block::{BlockKind, StoredBlock};
use crate::error::{StoreError, StoreResult};
use crate::traits::BlockStore;

/// Loose-block store on the local filesystem.
///
/// Each block lives in its own file, sharded by the first byte of its
/// address:
///
/// ```text
/// <root>/<first 2 hex chars>/<remaining 62 hex chars>
/// ```
///
/// A file holds one kind tag byte followed by the block data. Writes go to a
/// temporary file in the shard directory and are atomically renamed into
/// place, so readers never observe a partial block. Every read re-hashes the
/// data and rejects blocks whose address does not match.
#[derive(Debug, Clone)]
pub struct FileBlockStore {
    root: PathBuf,
}

impl FileBlockStore {
    /// Open (or create) a block store rooted at `root`.
    pub fn open(root: impl AsRef<Path>) -> StoreResult<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        debug!(root = %root.display(), "opened file block store");
        Ok(Self { root })
    }

    /// The directory this store writes into.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn block_path(&self, address: &Address) -> PathBuf {
        let hex = address.to_hex();
        self.root.join(&hex[..2]).join(&hex[2..])
    }
}

impl BlockStore for FileBlockStore {
    fn read(&self, address: &Address) -> StoreResult<Option<StoredBlock>> {
        let raw = match fs::read(self.block_path(address)) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let (tag, data) = raw.split_first().ok_or_else(|| StoreError::CorruptBlock {
            address: *address,
            reason: "empty block file".into(),
        })?;
        let kind = BlockKind::from_type_byte(*tag).ok_or_else(|| StoreError::CorruptBlock {
            address: *address,
            reason: format!("unknown kind tag {tag}"),
        })?;

        let block = StoredBlock::new(kind, data.to_vec());
        if !block.verify(address) {
            return Err(StoreError::HashMismatch {
                address: *address,
                computed: block.compute_address(),
            });
        }
        Ok(Some(block))
    }

    fn write(&self, block: &StoredBlock) -> StoreResult<Address> {
        let address = block.compute_address();
        let path = self.block_path(&address);
        if path.exists() {
            return Ok(address);
        }

        let shard = path.parent().unwrap_or(&self.root);
        fs::create_dir_all(shard)?;

        let mut tmp = tempfile::NamedTempFile::new_in(shard)?;
        tmp.write_all(&[block.kind.type_byte()])?;
        tmp.write_all(&block.data)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&path).map_err(|e| StoreError::Io(e.error))?;

        debug!(address = %address.short_hex(), kind = %block.kind, size = block.size, "wrote block");
        Ok(address)
    }

    fn exists(&self, address: &Address) -> StoreResult<bool> {
        Ok(self.block_path(address).is_file())
    }
}
