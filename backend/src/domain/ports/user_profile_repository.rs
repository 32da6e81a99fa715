//! Port abstraction for user profile persistence.
use async_trait::async_trait;
use pagination::PageParams;

use crate::domain::{UserId, UserProfile};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user profile repository adapters.
    pub enum UserProfileRepositoryError for "user profile" repository {
        /// Another profile already uses the email address.
        DuplicateEmail { email: String } => "a profile already exists for {email}",
        /// A profile already exists for the identifier.
        DuplicateId { id: String } => "a profile already exists for user {id}",
        /// The profile disappeared before the write landed.
        Missing { id: String } => "user profile {id} no longer exists",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserProfileRepository: Send + Sync {
    /// Fetch a profile by identifier.
    async fn find_by_id(&self, id: &UserId)
    -> Result<Option<UserProfile>, UserProfileRepositoryError>;

    /// List profiles ordered by registration time.
    async fn list(&self, page: PageParams) -> Result<Vec<UserProfile>, UserProfileRepositoryError>;

    /// Insert a new profile, failing on a duplicate id or email.
    async fn insert(&self, profile: &UserProfile)
    -> Result<UserProfile, UserProfileRepositoryError>;

    /// Insert `profile` unless one already exists for its id; return the
    /// stored row either way.
    async fn ensure(&self, profile: &UserProfile)
    -> Result<UserProfile, UserProfileRepositoryError>;

    /// Overwrite the mutable fields of an existing profile.
    async fn update(&self, profile: &UserProfile)
    -> Result<UserProfile, UserProfileRepositoryError>;
}
