//! In-memory profile store for tests and ephemeral use.

use std::collections::BTreeMap;
use std::sync::RwLock;

use crate::error::{ProfileError, ProfileResult};
use crate::names::validate_username;
use crate::traits::ProfileStore;
use crate::types::UserProfile;

/// An in-memory implementation of [`ProfileStore`].
///
/// Profiles live in a `BTreeMap` behind a `RwLock`, so listing comes out
/// sorted for free. Data is lost when the store is dropped.
#[derive(Debug, Default)]
pub struct InMemoryProfileStore {
    profiles: RwLock<BTreeMap<String, UserProfile>>,
}

impl InMemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProfileStore for InMemoryProfileStore {
    fn read_profile(&self, username: &str) -> ProfileResult<Option<UserProfile>> {
        let profiles = self.profiles.read().map_err(|_| ProfileError::Poisoned)?;
        Ok(profiles.get(username).cloned())
    }

    fn write_profile(&self, profile: &UserProfile) -> ProfileResult<()> {
        validate_username(&profile.username)?;
        let mut profiles = self.profiles.write().map_err(|_| ProfileError::Poisoned)?;
        profiles.insert(profile.username.clone(), profile.clone());
        Ok(())
    }

    fn list_profiles(&self) -> ProfileResult<Vec<UserProfile>> {
        let profiles = self.profiles.read().map_err(|_| ProfileError::Poisoned)?;
        Ok(profiles.values().cloned().collect())
    }

    fn create_profile(&self, profile: &UserProfile) -> ProfileResult<()> {
        validate_username(&profile.username)?;
        let mut profiles = self.profiles.write().map_err(|_| ProfileError::Poisoned)?;
        if profiles.contains_key(&profile.username) {
            return Err(ProfileError::AlreadyExists {
                username: profile.username.clone(),
            });
        }
        profiles.insert(profile.username.clone(), profile.clone());
        Ok(())
    }
}
