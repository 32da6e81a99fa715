//! Port abstraction for theoretical station persistence.
use async_trait::async_trait;
use pagination::PageParams;
use rust_decimal::Decimal;

use crate::domain::UserId;
use crate::domain::survey::{NewStation, ProjectId, Station, StationId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by station repository adapters.
    pub enum StationRepositoryError for "station" repository {
        /// `(proyecto_id, km)` is already taken.
        DuplicateKm { km: Decimal } => "a station already exists at km {km}",
        /// The station disappeared before the write landed.
        Missing { id: i32 } => "station {id} no longer exists",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StationRepository: Send + Sync {
    /// Insert a station; a taken `(proyecto_id, km)` yields
    /// [`StationRepositoryError::DuplicateKm`].
    async fn insert(&self, station: &NewStation) -> Result<Station, StationRepositoryError>;

    /// Fetch a station by identifier.
    async fn find_by_id(&self, id: StationId) -> Result<Option<Station>, StationRepositoryError>;

    /// Fetch the station of `project` at exactly `km`.
    async fn find_by_km(
        &self,
        project: ProjectId,
        km: Decimal,
    ) -> Result<Option<Station>, StationRepositoryError>;

    /// List stations of projects owned by `owner`, optionally restricted to
    /// one project, ordered by km.
    async fn list_for_owner(
        &self,
        owner: &UserId,
        project: Option<ProjectId>,
        page: PageParams,
    ) -> Result<Vec<Station>, StationRepositoryError>;

    /// Overwrite an existing station.
    async fn update(&self, station: &Station) -> Result<Station, StationRepositoryError>;

    /// Delete a station. Returns whether a row was removed.
    async fn delete(&self, id: StationId) -> Result<bool, StationRepositoryError>;
}
