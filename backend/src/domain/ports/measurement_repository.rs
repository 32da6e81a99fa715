//! Port abstraction for field measurement persistence.
use async_trait::async_trait;
use pagination::PageParams;
use rust_decimal::Decimal;

use crate::domain::UserId;
use crate::domain::survey::{Measurement, MeasurementId, NewMeasurement, ProjectId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by measurement repository adapters.
    pub enum MeasurementRepositoryError for "measurement" repository {
        /// `(proyecto_id, estacion_km)` is already taken.
        DuplicateKm { km: Decimal } => "a measurement already exists at station km {km}",
        /// The measurement disappeared before the write landed.
        Missing { id: i32 } => "measurement {id} no longer exists",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MeasurementRepository: Send + Sync {
    /// Insert a measurement; a taken `(proyecto_id, estacion_km)` yields
    /// [`MeasurementRepositoryError::DuplicateKm`].
    async fn insert(
        &self,
        measurement: &NewMeasurement,
    ) -> Result<Measurement, MeasurementRepositoryError>;

    /// Fetch a measurement by identifier.
    async fn find_by_id(
        &self,
        id: MeasurementId,
    ) -> Result<Option<Measurement>, MeasurementRepositoryError>;

    /// List measurements of projects owned by `owner`, optionally restricted
    /// to one project, ordered by station km.
    async fn list_for_owner(
        &self,
        owner: &UserId,
        project: Option<ProjectId>,
        page: PageParams,
    ) -> Result<Vec<Measurement>, MeasurementRepositoryError>;

    /// Overwrite an existing measurement.
    async fn update(
        &self,
        measurement: &Measurement,
    ) -> Result<Measurement, MeasurementRepositoryError>;

    /// Delete a measurement and its readings. Returns whether a row was
    /// removed.
    async fn delete(&self, id: MeasurementId) -> Result<bool, MeasurementRepositoryError>;
}
