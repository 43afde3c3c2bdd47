use skein_types::{Address, ContentHasher};

/// The kind of block stored.
///
/// The kind selects the domain-separated hasher, so the same bytes stored as
/// a post and as a node land at different addresses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BlockKind {
    /// A canonically encoded timeline post.
    Post,
    /// A canonically encoded merkle list node.
    Node,
}

impl BlockKind {
    /// Tag byte used by on-disk backends.
    pub fn type_byte(&self) -> u8 {
        match self {
            Self::Post => 1,
            Self::Node => 2,
        }
    }

    /// Parse a tag byte written by [`BlockKind::type_byte`].
    pub fn from_type_byte(byte: u8) -> Option<Self> {
        match byte {
            1 => Some(Self::Post),
            2 => Some(Self::Node),
            _ => None,
        }
    }

    fn hasher(&self) -> &'static ContentHasher {
        match self {
            Self::Post => &ContentHasher::POST,
            Self::Node => &ContentHasher::NODE,
        }
    }
}

impl std::fmt::Display for BlockKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Post => write!(f, "post"),
            Self::Node => write!(f, "node"),
        }
    }
}

/// A stored block: kind tag + canonical bytes + cached size.
///
/// `StoredBlock` is the unit of storage. Stores never interpret `data`; they
/// are pure key-value maps keyed by content address.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredBlock {
    /// The type of this block.
    pub kind: BlockKind,
    /// The canonical bytes of the block.
    pub data: Vec<u8>,
    /// The size of `data` in bytes.
    pub size: u64,
}

impl StoredBlock {
    /// Create a new stored block from kind and data.
    pub fn new(kind: BlockKind, data: Vec<u8>) -> Self {
        let size = data.len() as u64;
        Self { kind, data, size }
    }

    /// Compute the content address for this block.
    pub fn compute_address(&self) -> Address {
        self.kind.hasher().hash(&self.data)
    }

    /// Whether this block's bytes hash to `address`.
    pub fn verify(&self, address: &Address) -> bool {
        self.kind.hasher().verify(&self.data, address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_byte_roundtrip() {
        for kind in [BlockKind::Post, BlockKind::Node] {
            assert_eq!(BlockKind::from_type_byte(kind.type_byte()), Some(kind));
        }
        assert_eq!(BlockKind::from_type_byte(0), None);
        assert_eq!(BlockKind::from_type_byte(9), None);
    }

    #[test]
    fn kind_separates_addresses() {
        let post = StoredBlock::new(BlockKind::Post, b"same".to_vec());
        let node = StoredBlock::new(BlockKind::Node, b"same".to_vec());
        assert_ne!(post.compute_address(), node.compute_address());
    }

    #[test]
    fn verify_checks_kind_and_bytes() {
        let block = StoredBlock::new(BlockKind::Post, b"post bytes".to_vec());
        let address = block.compute_address();
        assert!(block.verify(&address));

        let as_node = StoredBlock::new(BlockKind::Node, b"post bytes".to_vec());
        assert!(!as_node.verify(&address));
        let altered = StoredBlock::new(BlockKind::Post, b"post bytez".to_vec());
        assert!(!altered.verify(&address));
    }

    #[test]
    fn size_tracks_data() {
        let block = StoredBlock::new(BlockKind::Node, vec![0; 12]);
        assert_eq!(block.size, 12);
    }

    #[test]
    fn display() {
        assert_eq!(BlockKind::Post.to_string(), "post");
        assert_eq!(BlockKind::Node.to_string(), "node");
    }
}
