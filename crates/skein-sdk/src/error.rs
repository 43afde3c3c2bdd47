use skein_list::ListError;
use skein_profile::ProfileError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SdkError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("writer lock poisoned for user {0}")]
    Poisoned(String),

    #[error("store error: {0}")]
    Store(#[from] skein_store::StoreError),

    #[error("list error: {0}")]
    List(#[from] ListError),

    #[error("profile error: {0}")]
    Profile(#[from] ProfileError),
}

impl SdkError {
    /// Whether the error names something that does not exist (a user or a
    /// post), as opposed to a failure.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::List(ListError::NotFound { .. }) | Self::Profile(ProfileError::NotFound { .. })
        )
    }
}

pub type SdkResult<T> = Result<T, SdkError>;
