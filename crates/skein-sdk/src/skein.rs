use std::hash::{DefaultHasher, Hash, Hasher};
use std::ops::Bound;
use std::path::Path;
use std::sync::{Arc, Mutex};

use skein_list::{ListConfig, MerkleList, TreeStats};
use skein_profile::{FileProfileStore, InMemoryProfileStore, ProfileStore, UserProfile};
use skein_store::{BlockStore, FileBlockStore, InMemoryBlockStore};
use skein_types::{Address, Post};
use tracing::info;

use crate::error::{SdkError, SdkResult};

/// Block directory under a data directory.
pub const BLOCKS_DIR: &str = "blocks";
/// Profile directory under a data directory.
pub const USERS_DIR: &str = "users";

/// Number of writer locks; usernames are hashed onto them.
const WRITER_SHARDS: usize = 64;

/// A user's timeline, opened at its published root.
pub type Timeline = MerkleList<Arc<dyn BlockStore>>;

/// High-level Skein API.
///
/// Owns one block store shared by every timeline and one profile store that
/// holds each user's published root. Reads load a fresh [`Timeline`] from the
/// root recorded in the profile, so they never observe a half-finished
/// publish. Writes for the same user are serialized through a fixed table of
/// writer locks, so writes for different users mostly run in parallel and
/// lock memory does not grow with the number of usernames seen.
pub struct Skein {
    blocks: Arc<dyn BlockStore>,
    profiles: Arc<dyn ProfileStore>,
    config: ListConfig,
    writers: Box<[Mutex<()>]>,
}

impl Skein {
    pub fn new(
        blocks: Arc<dyn BlockStore>,
        profiles: Arc<dyn ProfileStore>,
        config: ListConfig,
    ) -> SdkResult<Self> {
        config.validate()?;
        Ok(Self {
            blocks,
            profiles,
            config,
            writers: (0..WRITER_SHARDS).map(|_| Mutex::new(())).collect(),
        })
    }

    /// An ephemeral instance with default configuration.
    pub fn in_memory() -> SdkResult<Self> {
        Self::in_memory_with(ListConfig::default())
    }

    pub fn in_memory_with(config: ListConfig) -> SdkResult<Self> {
        Self::new(
            Arc::new(InMemoryBlockStore::new()),
            Arc::new(InMemoryProfileStore::new()),
            config,
        )
    }

    /// Open (or create) a data directory with default configuration.
    pub fn open(dir: impl AsRef<Path>) -> SdkResult<Self> {
        Self::open_with(dir, ListConfig::default())
    }

    /// Open (or create) a data directory laid out as `blocks/` and `users/`.
    pub fn open_with(dir: impl AsRef<Path>, config: ListConfig) -> SdkResult<Self> {
        let dir = dir.as_ref();
        let blocks = FileBlockStore::open(dir.join(BLOCKS_DIR))?;
        let profiles = FileProfileStore::open(dir.join(USERS_DIR))?;
        info!(dir = %dir.display(), capacity = config.capacity, "opened skein data directory");
        Self::new(Arc::new(blocks), Arc::new(profiles), config)
    }

    pub fn config(&self) -> &ListConfig {
        &self.config
    }

    pub fn blocks(&self) -> &Arc<dyn BlockStore> {
        &self.blocks
    }

    // ---- Users ----

    /// Register a new user. Any `posts_root` on the incoming profile is
    /// dropped; a new user starts with an empty timeline.
    pub fn create_user(&self, mut profile: UserProfile) -> SdkResult<UserProfile> {
        profile.posts_root = None;
        self.profiles.create_profile(&profile)?;
        info!(username = %profile.username, "created user");
        Ok(profile)
    }

    pub fn user(&self, username: &str) -> SdkResult<UserProfile> {
        Ok(self.profiles.get_profile(username)?)
    }

    pub fn users(&self) -> SdkResult<Vec<UserProfile>> {
        Ok(self.profiles.list_profiles()?)
    }

    // ---- Posting ----

    /// Insert `posts` into the user's timeline, publish the new root, and
    /// record it in the user's profile.
    ///
    /// Either every post lands and the profile points at the new root, or
    /// the profile is left on its previous root. Unknown users are rejected
    /// before any lock is taken.
    pub fn post_feed_items(&self, username: &str, posts: &[Post]) -> SdkResult<Address> {
        self.profiles.get_profile(username)?;
        let _guard = self.writers[writer_shard(username)]
            .lock()
            .map_err(|_| SdkError::Poisoned(username.to_string()))?;

        // Re-read under the lock: another writer may have published meanwhile.
        let mut profile = self.profiles.get_profile(username)?;
        let mut timeline = self.open_timeline(&profile)?;
        timeline.insert_batch(posts)?;
        let root = timeline.publish_root()?;

        profile.posts_root = Some(root);
        self.profiles.write_profile(&profile)?;
        info!(username, posts = posts.len(), root = %root.short_hex(), "published timeline");
        Ok(root)
    }

    // ---- Reading ----

    /// The user's timeline at its currently published root.
    pub fn timeline(&self, username: &str) -> SdkResult<Timeline> {
        let profile = self.profiles.get_profile(username)?;
        self.open_timeline(&profile)
    }

    fn open_timeline(&self, profile: &UserProfile) -> SdkResult<Timeline> {
        Ok(MerkleList::open(
            Arc::clone(&self.blocks),
            self.config,
            profile.posts_root.as_ref(),
        )?)
    }

    /// Visit the user's posts in ascending `created_at` order.
    pub fn for_each_item<F>(&self, username: &str, visit: F) -> SdkResult<()>
    where
        F: FnMut(Post) -> SdkResult<()>,
    {
        self.timeline(username)?.for_each(visit)
    }

    /// Every post of the user, oldest first.
    pub fn feed(&self, username: &str) -> SdkResult<Vec<Post>> {
        self.feed_range(username, None, None)
    }

    /// Posts with `from <= created_at <= to`; a missing bound is open.
    pub fn feed_range(
        &self,
        username: &str,
        from: Option<u64>,
        to: Option<u64>,
    ) -> SdkResult<Vec<Post>> {
        if let (Some(from), Some(to)) = (from, to) {
            if from > to {
                return Err(SdkError::InvalidInput(format!(
                    "range start {from} is after end {to}"
                )));
            }
        }
        let range = (
            from.map_or(Bound::Unbounded, Bound::Included),
            to.map_or(Bound::Unbounded, Bound::Included),
        );

        let mut posts = Vec::new();
        self.timeline(username)?
            .for_each_in_range(range, |post| -> SdkResult<()> {
                posts.push(post);
                Ok(())
            })?;
        Ok(posts)
    }

    /// The user's post at `created_at == key`.
    pub fn post(&self, username: &str, key: u64) -> SdkResult<Post> {
        Ok(self.timeline(username)?.retrieve_post(key)?)
    }

    pub fn stats(&self, username: &str) -> SdkResult<TreeStats> {
        Ok(self.timeline(username)?.stats()?)
    }

    /// Re-check every structural invariant of the user's timeline.
    pub fn verify(&self, username: &str) -> SdkResult<TreeStats> {
        Ok(self.timeline(username)?.verify()?)
    }
}

fn writer_shard(username: &str) -> usize {
    let mut hasher = DefaultHasher::new();
    username.hash(&mut hasher);
    (hasher.finish() % WRITER_SHARDS as u64) as usize
}

impl std::fmt::Debug for Skein {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Skein")
            .field("capacity", &self.config.capacity)
            .finish_non_exhaustive()
    }
}
