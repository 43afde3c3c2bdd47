//! The [`ProfileStore`] trait defining the profile storage interface.

use std::sync::Arc;

use crate::error::{ProfileError, ProfileResult};
use crate::names::validate_username;
use crate::types::UserProfile;

/// Storage backend for user profiles, keyed by username.
///
/// Implementations must be thread-safe (`Send + Sync`). A profile write
/// replaces the whole record; callers that read, modify and write back must
/// serialize those steps themselves.
pub trait ProfileStore: Send + Sync {
    /// Read a profile by username.
    ///
    /// Returns `Ok(None)` if no such user exists.
    fn read_profile(&self, username: &str) -> ProfileResult<Option<UserProfile>>;

    /// Write (create or replace) the profile under `profile.username`.
    fn write_profile(&self, profile: &UserProfile) -> ProfileResult<()>;

    /// All profiles, sorted by username.
    fn list_profiles(&self) -> ProfileResult<Vec<UserProfile>>;

    /// Store a new profile, failing if the username is taken.
    ///
    /// The default checks then writes; backends that can do both atomically
    /// override it.
    fn create_profile(&self, profile: &UserProfile) -> ProfileResult<()> {
        validate_username(&profile.username)?;
        if self.read_profile(&profile.username)?.is_some() {
            return Err(ProfileError::AlreadyExists {
                username: profile.username.clone(),
            });
        }
        self.write_profile(profile)
    }

    /// Read a profile that must exist, failing with [`ProfileError::NotFound`].
    fn get_profile(&self, username: &str) -> ProfileResult<UserProfile> {
        self.read_profile(username)?
            .ok_or_else(|| ProfileError::NotFound {
                username: username.to_string(),
            })
    }
}

impl<P: ProfileStore + ?Sized> ProfileStore for Arc<P> {
    fn read_profile(&self, username: &str) -> ProfileResult<Option<UserProfile>> {
        (**self).read_profile(username)
    }

    fn write_profile(&self, profile: &UserProfile) -> ProfileResult<()> {
        (**self).write_profile(profile)
    }

    fn list_profiles(&self) -> ProfileResult<Vec<UserProfile>> {
        (**self).list_profiles()
    }

    fn create_profile(&self, profile: &UserProfile) -> ProfileResult<()> {
        (**self).create_profile(profile)
    }
}
