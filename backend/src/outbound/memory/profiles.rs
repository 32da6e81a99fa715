use async_trait::async_trait;
use pagination::PageParams;

use super::InMemorySurveyStore;
use crate::domain::ports::{UserProfileRepository, UserProfileRepositoryError};
use crate::domain::{UserId, UserProfile};

#[async_trait]
impl UserProfileRepository for InMemorySurveyStore {
    async fn find_by_id(
        &self,
        id: &UserId,
    ) -> Result<Option<UserProfile>, UserProfileRepositoryError> {
        let state = self.lock().map_err(UserProfileRepositoryError::query)?;
        Ok(state.profiles.get(id).cloned())
    }

    async fn list(&self, page: PageParams) -> Result<Vec<UserProfile>, UserProfileRepositoryError> {
        let state = self.lock().map_err(UserProfileRepositoryError::query)?;
        let mut profiles: Vec<UserProfile> = state.profiles.values().cloned().collect();
        profiles.sort_by(|a, b| {
            a.fecha_registro
                .cmp(&b.fecha_registro)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(page.apply(profiles))
    }

    async fn insert(
        &self,
        profile: &UserProfile,
    ) -> Result<UserProfile, UserProfileRepositoryError> {
        let mut state = self.lock().map_err(UserProfileRepositoryError::query)?;
        if state.profiles.contains_key(&profile.id) {
            return Err(UserProfileRepositoryError::duplicate_id(profile.id.as_str()));
        }
        if state.profiles.values().any(|other| other.email == profile.email) {
            return Err(UserProfileRepositoryError::duplicate_email(
                profile.email.as_str(),
            ));
        }
        state.profiles.insert(profile.id.clone(), profile.clone());
        Ok(profile.clone())
    }

    async fn ensure(
        &self,
        profile: &UserProfile,
    ) -> Result<UserProfile, UserProfileRepositoryError> {
        let mut state = self.lock().map_err(UserProfileRepositoryError::query)?;
        if let Some(existing) = state.profiles.get(&profile.id) {
            return Ok(existing.clone());
        }
        if state.profiles.values().any(|other| other.email == profile.email) {
            return Err(UserProfileRepositoryError::duplicate_email(
                profile.email.as_str(),
            ));
        }
        state.profiles.insert(profile.id.clone(), profile.clone());
        Ok(profile.clone())
    }

    async fn update(
        &self,
        profile: &UserProfile,
    ) -> Result<UserProfile, UserProfileRepositoryError> {
        let mut state = self.lock().map_err(UserProfileRepositoryError::query)?;
        let Some(stored) = state.profiles.get_mut(&profile.id) else {
            return Err(UserProfileRepositoryError::missing(profile.id.as_str()));
        };
        *stored = UserProfile {
            email: stored.email.clone(),
            fecha_registro: stored.fecha_registro,
            ..profile.clone()
        };
        Ok(stored.clone())
    }
}
