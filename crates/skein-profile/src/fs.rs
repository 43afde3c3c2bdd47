//! File-backed profile store: one JSON document per user.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{ProfileError, ProfileResult};
use crate::names::validate_username;
use crate::traits::ProfileStore;
use crate::types::UserProfile;

/// Profiles stored as `<root>/<username>.json`.
///
/// Every write lands in a temporary file that is renamed over the target,
/// so a crash never leaves a half-written profile. Usernames are validated
/// before they touch the filesystem.
#[derive(Debug, Clone)]
pub struct FileProfileStore {
    root: PathBuf,
}

impl FileProfileStore {
    /// Open (or create) a profile directory.
    pub fn open(root: impl AsRef<Path>) -> ProfileResult<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn profile_path(&self, username: &str) -> PathBuf {
        self.root.join(format!("{username}.json"))
    }

    fn staged(&self, profile: &UserProfile) -> ProfileResult<tempfile::NamedTempFile> {
        let json = serde_json::to_vec_pretty(profile)
            .map_err(|e| ProfileError::Serialization(e.to_string()))?;
        let mut tmp = tempfile::NamedTempFile::new_in(&self.root)?;
        tmp.write_all(&json)?;
        tmp.as_file().sync_all()?;
        Ok(tmp)
    }

    fn decode(raw: &[u8]) -> ProfileResult<UserProfile> {
        serde_json::from_slice(raw).map_err(|e| ProfileError::Serialization(e.to_string()))
    }
}

impl ProfileStore for FileProfileStore {
    fn read_profile(&self, username: &str) -> ProfileResult<Option<UserProfile>> {
        if validate_username(username).is_err() {
            return Ok(None);
        }
        match fs::read(self.profile_path(username)) {
            Ok(raw) => Ok(Some(Self::decode(&raw)?)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write_profile(&self, profile: &UserProfile) -> ProfileResult<()> {
        validate_username(&profile.username)?;
        let path = self.profile_path(&profile.username);
        self.staged(profile)?
            .persist(&path)
            .map_err(|e| ProfileError::Io(e.error))?;
        debug!(username = %profile.username, root = ?profile.posts_root, "wrote profile");
        Ok(())
    }

    fn list_profiles(&self) -> ProfileResult<Vec<UserProfile>> {
        let mut profiles = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            profiles.push(Self::decode(&fs::read(&path)?)?);
        }
        profiles.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(profiles)
    }

    fn create_profile(&self, profile: &UserProfile) -> ProfileResult<()> {
        validate_username(&profile.username)?;
        let path = self.profile_path(&profile.username);
        match self.staged(profile)?.persist_noclobber(&path) {
            Ok(_) => {
                debug!(username = %profile.username, "created profile");
                Ok(())
            }
            Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => {
                Err(ProfileError::AlreadyExists {
                    username: profile.username.clone(),
                })
            }
            Err(e) => Err(ProfileError::Io(e.error)),
        }
    }
}
