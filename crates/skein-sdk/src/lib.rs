//! High-level SDK for Skein.
//!
//! [`Skein`] ties the pieces together: a [`BlockStore`](skein_store::BlockStore)
//! holding every post and tree node, a [`ProfileStore`](skein_profile::ProfileStore)
//! holding each user's published timeline root, and the [`ListConfig`] every
//! timeline is built with. This is the entry point for the server and CLI.

pub mod error;
pub mod skein;

pub use error::{SdkError, SdkResult};
pub use skein::{Skein, Timeline, BLOCKS_DIR, USERS_DIR};

// Re-export key types
pub use skein_list::{ListConfig, TreeStats};
pub use skein_profile::UserProfile;
pub use skein_types::{Address, Post};
