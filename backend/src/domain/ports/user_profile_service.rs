//! Driving port for user profile use-cases.

use async_trait::async_trait;
use pagination::PageParams;

use crate::domain::{
    CallerIdentity, Error, UserId, UserProfile, UserProfileDraft, UserProfilePatch,
};

/// Profile operations available to an authenticated caller.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserProfileService: Send + Sync {
    /// Return the caller's profile, creating it from the token identity on
    /// first use.
    async fn current(&self, caller: &CallerIdentity) -> Result<UserProfile, Error>;

    /// List registered profiles.
    async fn list(&self, caller: &CallerIdentity, page: PageParams)
    -> Result<Vec<UserProfile>, Error>;

    /// Fetch one profile.
    async fn get(&self, caller: &CallerIdentity, id: &UserId) -> Result<UserProfile, Error>;

    /// Register the caller's profile explicitly.
    async fn create(
        &self,
        caller: &CallerIdentity,
        draft: UserProfileDraft,
    ) -> Result<UserProfile, Error>;

    /// Update the caller's own profile.
    async fn update(
        &self,
        caller: &CallerIdentity,
        id: &UserId,
        patch: UserProfilePatch,
    ) -> Result<UserProfile, Error>;

    /// Deactivate the caller's own profile.
    async fn deactivate(&self, caller: &CallerIdentity, id: &UserId) -> Result<(), Error>;
}
