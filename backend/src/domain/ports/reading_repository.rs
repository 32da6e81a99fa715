//! Port abstraction for division reading persistence.
use async_trait::async_trait;
use pagination::PageParams;
use rust_decimal::Decimal;

use crate::domain::UserId;
use crate::domain::survey::{DivisionReading, MeasurementId, ReadingId, ReadingUpsert};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by reading repository adapters.
    pub enum ReadingRepositoryError for "reading" repository {
        /// `(medicion_id, division_transversal)` is already taken by another
        /// reading.
        DuplicateDivision { division: Decimal } => "a reading already exists at division {division}",
        /// The reading disappeared before the write landed.
        Missing { id: i32 } => "reading {id} no longer exists",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReadingRepository: Send + Sync {
    /// Insert the reading at `(medicion_id, division_transversal)` or, when
    /// one exists, overwrite its rod reading and quality in place. Atomic
    /// with respect to concurrent writers of the same key.
    async fn upsert(&self, reading: &ReadingUpsert)
    -> Result<DivisionReading, ReadingRepositoryError>;

    /// Fetch a reading by identifier.
    async fn find_by_id(
        &self,
        id: ReadingId,
    ) -> Result<Option<DivisionReading>, ReadingRepositoryError>;

    /// List readings of measurements in projects owned by `owner`,
    /// optionally restricted to one measurement, ordered by division.
    async fn list_for_owner(
        &self,
        owner: &UserId,
        measurement: Option<MeasurementId>,
        page: PageParams,
    ) -> Result<Vec<DivisionReading>, ReadingRepositoryError>;

    /// Overwrite an existing reading.
    async fn update(
        &self,
        reading: &DivisionReading,
    ) -> Result<DivisionReading, ReadingRepositoryError>;

    /// Delete a reading. Returns whether a row was removed.
    async fn delete(&self, id: ReadingId) -> Result<bool, ReadingRepositoryError>;
}
