//! Driving port for division reading use-cases.

use async_trait::async_trait;
use pagination::PageParams;

use crate::domain::survey::{MeasurementId, ReadingDraft, ReadingId, ReadingPatch, ReadingReport};
use crate::domain::{CallerIdentity, Error};

/// Reading operations scoped through the measurement's project. Every
/// reading is returned with its evaluated metrics.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReadingService: Send + Sync {
    /// List readings of the caller's measurements, ordered by division.
    async fn list(
        &self,
        caller: &CallerIdentity,
        measurement: Option<MeasurementId>,
        page: PageParams,
    ) -> Result<Vec<ReadingReport>, Error>;

    /// List the readings of one measurement, failing when it is not the
    /// caller's.
    async fn list_for_measurement(
        &self,
        caller: &CallerIdentity,
        measurement: MeasurementId,
        page: PageParams,
    ) -> Result<Vec<ReadingReport>, Error>;

    async fn get(&self, caller: &CallerIdentity, id: ReadingId) -> Result<ReadingReport, Error>;

    /// Create the reading at its transverse position or overwrite the one
    /// already there.
    async fn upsert(&self, caller: &CallerIdentity, draft: ReadingDraft)
    -> Result<ReadingReport, Error>;

    async fn update(
        &self,
        caller: &CallerIdentity,
        id: ReadingId,
        patch: ReadingPatch,
    ) -> Result<ReadingReport, Error>;

    async fn delete(&self, caller: &CallerIdentity, id: ReadingId) -> Result<(), Error>;
}
