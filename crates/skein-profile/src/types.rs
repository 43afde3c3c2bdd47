//! The [`UserProfile`] record.

use serde::{Deserialize, Serialize};
use skein_types::Address;

/// A user and the published root of their timeline.
///
/// `posts_root` is `None` until the user's first post is published. Every
/// later publish replaces it with the address of the new root; the old root
/// stays readable in the block store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub pubkey: String,
    pub username: String,
    #[serde(default)]
    pub created_at: u64,
    #[serde(default)]
    pub posts_root: Option<Address>,
}

impl UserProfile {
    pub fn new(username: impl Into<String>, created_at: u64) -> Self {
        Self {
            pubkey: String::new(),
            username: username.into(),
            created_at,
            posts_root: None,
        }
    }

    pub fn with_pubkey(mut self, pubkey: impl Into<String>) -> Self {
        self.pubkey = pubkey.into();
        self
    }

    /// Whether the user has published any posts.
    pub fn has_posts(&self) -> bool {
        self.posts_root.is_some()
    }
}
