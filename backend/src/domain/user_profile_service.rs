//! User profile use-cases.

use async_trait::async_trait;
use pagination::PageParams;
use serde_json::json;

use crate::domain::ports::UserProfileService;
use crate::domain::survey_access::{SurveyRepositories, map_profile_error};
use crate::domain::{
    CallerIdentity, Error, UserId, UserProfile, UserProfileDraft, UserProfilePatch,
};

/// Profile service backed by the profile repository.
#[derive(Clone)]
pub struct SurveyUserProfileService {
    repos: SurveyRepositories,
}

impl SurveyUserProfileService {
    /// Create a service over the shared repository bundle.
    pub fn new(repos: SurveyRepositories) -> Self {
        Self { repos }
    }

    async fn existing(&self, id: &UserId) -> Result<UserProfile, Error> {
        self.repos
            .profiles
            .find_by_id(id)
            .await
            .map_err(map_profile_error)?
            .ok_or_else(|| Error::not_found(format!("user {id} not found")))
    }

    fn require_self(caller: &CallerIdentity, id: &UserId, action: &str) -> Result<(), Error> {
        if caller.id() == id {
            Ok(())
        } else {
            Err(Error::forbidden(format!("cannot {action} another user's profile")))
        }
    }

    fn require_filled(field: &'static str, value: &str) -> Result<(), Error> {
        if value.trim().is_empty() {
            return Err(Error::invalid_request(format!("{field} must not be blank"))
                .with_details(json!({ "field": field, "code": "blank" })));
        }
        Ok(())
    }
}

#[async_trait]
impl UserProfileService for SurveyUserProfileService {
    async fn current(&self, caller: &CallerIdentity) -> Result<UserProfile, Error> {
        let candidate = UserProfile::for_caller(caller, self.repos.clock.utc());
        self.repos
            .profiles
            .ensure(&candidate)
            .await
            .map_err(map_profile_error)
    }

    async fn list(
        &self,
        _caller: &CallerIdentity,
        page: PageParams,
    ) -> Result<Vec<UserProfile>, Error> {
        self.repos
            .profiles
            .list(page)
            .await
            .map_err(map_profile_error)
    }

    async fn get(&self, _caller: &CallerIdentity, id: &UserId) -> Result<UserProfile, Error> {
        self.existing(id).await
    }

    async fn create(
        &self,
        caller: &CallerIdentity,
        draft: UserProfileDraft,
    ) -> Result<UserProfile, Error> {
        Self::require_self(caller, &draft.id, "create")?;
        Self::require_filled("email", &draft.email)?;
        Self::require_filled("nombre_completo", &draft.nombre_completo)?;
        let profile = draft.into_profile(self.repos.clock.utc());
        self.repos
            .profiles
            .insert(&profile)
            .await
            .map_err(map_profile_error)
    }

    async fn update(
        &self,
        caller: &CallerIdentity,
        id: &UserId,
        patch: UserProfilePatch,
    ) -> Result<UserProfile, Error> {
        let current = self.existing(id).await?;
        Self::require_self(caller, id, "update")?;
        if let Some(name) = patch.nombre_completo.as_deref() {
            Self::require_filled("nombre_completo", name)?;
        }
        let updated = patch.apply(current, self.repos.clock.utc());
        self.repos
            .profiles
            .update(&updated)
            .await
            .map_err(map_profile_error)
    }

    async fn deactivate(&self, caller: &CallerIdentity, id: &UserId) -> Result<(), Error> {
        let current = self.existing(id).await?;
        Self::require_self(caller, id, "deactivate")?;
        let patch = UserProfilePatch {
            activo: Some(false),
            ..UserProfilePatch::default()
        };
        self.repos
            .profiles
            .update(&patch.apply(current, self.repos.clock.utc()))
            .await
            .map_err(map_profile_error)?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "user_profile_service_tests.rs"]
mod tests;
