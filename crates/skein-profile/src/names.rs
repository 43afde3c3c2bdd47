//! Username validation.
//!
//! Valid usernames:
//! - Must be non-empty and at most [`MAX_USERNAME_LEN`] bytes
//! - Contain only ASCII letters, digits, `_`, `.` and `-`
//! - Must not start with `.` or `-`
//!
//! These rules keep a username usable as a single URL path segment and as a
//! file name.

use crate::error::{ProfileError, ProfileResult};

/// Longest accepted username, in bytes.
pub const MAX_USERNAME_LEN: usize = 64;

/// Validate a username, returning `Ok(())` if valid.
///
/// # Examples
///
/// ```
/// use skein_profile::names::validate_username;
///
/// assert!(validate_username("alice").is_ok());
/// assert!(validate_username("bob.smith-2").is_ok());
/// assert!(validate_username("").is_err());
/// assert!(validate_username("../etc").is_err());
/// ```
pub fn validate_username(username: &str) -> ProfileResult<()> {
    let invalid = |reason: String| ProfileError::InvalidUsername {
        username: username.to_string(),
        reason,
    };

    if username.is_empty() {
        return Err(invalid("username must not be empty".into()));
    }
    if username.len() > MAX_USERNAME_LEN {
        return Err(invalid(format!("longer than {MAX_USERNAME_LEN} bytes")));
    }
    if let Some(ch) = username
        .chars()
        .find(|ch| !(ch.is_ascii_alphanumeric() || matches!(ch, '_' | '.' | '-')))
    {
        return Err(invalid(format!("contains forbidden character: {ch:?}")));
    }
    if username.starts_with('.') || username.starts_with('-') {
        return Err(invalid("must not start with '.' or '-'".into()));
    }
    Ok(())
}
