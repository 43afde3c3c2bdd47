//! User profiles for Skein.
//!
//! A profile names a user and records the published root address of their
//! timeline, the single mutable pointer into otherwise immutable block
//! storage. Publishing a timeline means writing a new root block and then
//! replacing `posts_root` in the user's profile.
//!
//! # Modules
//!
//! - [`types`] -- [`UserProfile`]
//! - [`traits`] -- the [`ProfileStore`] storage interface
//! - [`names`] -- username validation
//! - [`memory`] -- [`InMemoryProfileStore`]
//! - [`fs`] -- [`FileProfileStore`], one JSON file per user

pub mod error;
pub mod fs;
pub mod memory;
pub mod names;
pub mod traits;
pub mod types;

pub use error::{ProfileError, ProfileResult};
pub use fs::FileProfileStore;
pub use memory::InMemoryProfileStore;
pub use names::{validate_username, MAX_USERNAME_LEN};
pub use traits::ProfileStore;
pub use types::UserProfile;
