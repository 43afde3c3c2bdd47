//! Error types for profile operations.

use thiserror::Error;

/// Errors that can occur during profile operations.
#[derive(Debug, Error)]
pub enum ProfileError {
    /// No profile exists under this username.
    #[error("user not found: {username}")]
    NotFound { username: String },

    /// A profile with this username already exists.
    #[error("user already exists: {username}")]
    AlreadyExists { username: String },

    /// The username is not acceptable.
    #[error("invalid username {username:?}: {reason}")]
    InvalidUsername { username: String, reason: String },

    /// A profile record could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// A lock guarding the store was poisoned by a panicking writer.
    #[error("profile store lock poisoned")]
    Poisoned,

    /// I/O error in the file-backed store.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for profile operations.
pub type ProfileResult<T> = std::result::Result<T, ProfileError>;
