use crate::address::Address;

/// Domain-separated BLAKE3 content hasher.
///
/// Each hasher carries a domain tag (e.g. `"skein-post-v1"`) that is
/// prepended to every hash computation, so a post and a tree node with
/// identical bytes never share an address.
pub struct ContentHasher {
    domain: &'static str,
}

impl ContentHasher {
    /// Hasher for timeline posts.
    pub const POST: Self = Self {
        domain: "skein-post-v1",
    };
    /// Hasher for merkle list nodes.
    pub const NODE: Self = Self {
        domain: "skein-node-v1",
    };

    /// Hash raw bytes with domain separation.
    pub fn hash(&self, data: &[u8]) -> Address {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.domain.as_bytes());
        hasher.update(b":");
        hasher.update(data);
        Address::from_hash(*hasher.finalize().as_bytes())
    }

    /// Verify that data produces the expected address.
    pub fn verify(&self, data: &[u8], expected: &Address) -> bool {
        self.hash(data) == *expected
    }
}
