//! PostgreSQL-backed `UserProfileRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use pagination::PageParams;

use crate::domain::ports::{UserProfileRepository, UserProfileRepositoryError};
use crate::domain::{UserId, UserProfile};

use super::diesel_error_mapping::{StoreFailure, classify, into_port_error, pool_message};
use super::models::{NewProfileRow, ProfileRow, ProfileUpdate};
use super::pool::{DbPool, PoolError};
use super::schema::perfiles_usuario;

const PRIMARY_KEY: &str = "perfiles_usuario_pkey";
const EMAIL_KEY: &str = "perfiles_usuario_email_key";

/// Diesel-backed implementation of the `UserProfileRepository` port.
#[derive(Clone)]
pub struct DieselUserProfileRepository {
    pool: DbPool,
}

impl DieselUserProfileRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserProfileRepositoryError {
    UserProfileRepositoryError::connection(pool_message(error))
}

fn map_diesel_error(error: diesel::result::Error) -> UserProfileRepositoryError {
    into_port_error(
        classify(error),
        UserProfileRepositoryError::query,
        UserProfileRepositoryError::connection,
    )
}

/// Translate the two uniqueness constraints of the profile table.
fn map_write_error(error: diesel::result::Error, profile: &UserProfile) -> UserProfileRepositoryError {
    match classify(error) {
        failure if failure.violates(EMAIL_KEY) => {
            UserProfileRepositoryError::duplicate_email(profile.email.as_str())
        }
        failure if failure.violates(PRIMARY_KEY) => {
            UserProfileRepositoryError::duplicate_id(profile.id.as_str())
        }
        StoreFailure::UniqueViolation { .. } => {
            UserProfileRepositoryError::duplicate_id(profile.id.as_str())
        }
        failure => into_port_error(
            failure,
            UserProfileRepositoryError::query,
            UserProfileRepositoryError::connection,
        ),
    }
}

fn to_domain(row: ProfileRow) -> Result<UserProfile, UserProfileRepositoryError> {
    row.into_domain().map_err(UserProfileRepositoryError::query)
}

#[async_trait]
impl UserProfileRepository for DieselUserProfileRepository {
    async fn find_by_id(
        &self,
        id: &UserId,
    ) -> Result<Option<UserProfile>, UserProfileRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        perfiles_usuario::table
            .find(id.as_str())
            .select(ProfileRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(to_domain)
            .transpose()
    }

    async fn list(&self, page: PageParams) -> Result<Vec<UserProfile>, UserProfileRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<ProfileRow> = perfiles_usuario::table
            .order((
                perfiles_usuario::fecha_registro.asc(),
                perfiles_usuario::id.asc(),
            ))
            .offset(page.offset_i64())
            .limit(page.limit_i64())
            .select(ProfileRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(to_domain).collect()
    }

    async fn insert(
        &self,
        profile: &UserProfile,
    ) -> Result<UserProfile, UserProfileRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = diesel::insert_into(perfiles_usuario::table)
            .values(NewProfileRow::from(profile))
            .returning(ProfileRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(|err| map_write_error(err, profile))?;
        to_domain(row)
    }

    async fn ensure(
        &self,
        profile: &UserProfile,
    ) -> Result<UserProfile, UserProfileRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(perfiles_usuario::table)
            .values(NewProfileRow::from(profile))
            .on_conflict(perfiles_usuario::id)
            .do_nothing()
            .execute(&mut conn)
            .await
            .map_err(|err| map_write_error(err, profile))?;
        let row = perfiles_usuario::table
            .find(profile.id.as_str())
            .select(ProfileRow::as_select())
            .first(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        to_domain(row)
    }

    async fn update(
        &self,
        profile: &UserProfile,
    ) -> Result<UserProfile, UserProfileRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = diesel::update(perfiles_usuario::table.find(profile.id.as_str()))
            .set(ProfileUpdate::from(profile))
            .returning(ProfileRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .ok_or_else(|| UserProfileRepositoryError::missing(profile.id.as_str()))?;
        to_domain(row)
    }
}
