//! Division reading use-cases.
//!
//! Readings are stored with their raw inputs only. Each response evaluates
//! the quality metrics against the parent measurement's instrument height,
//! the station at the measurement's km and the project's cross-section.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use async_trait::async_trait;
use pagination::PageParams;
use rust_decimal::Decimal;

use crate::domain::ports::ReadingService;
use crate::domain::survey::engine::evaluate;
use crate::domain::survey::{
    DivisionReading, Measurement, MeasurementId, Project, ReadingContext, ReadingDraft, ReadingId,
    ReadingPatch, ReadingReport, StationGeometry,
};
use crate::domain::survey_access::{SurveyRepositories, map_reading_error, map_station_error};
use crate::domain::{CallerIdentity, Error};

/// Reading service with upsert semantics on `(medicion_id, division)`.
#[derive(Clone)]
pub struct SurveyReadingService {
    repos: SurveyRepositories,
}

struct EvaluationInputs {
    altura_aparato: Option<Decimal>,
    station: Option<StationGeometry>,
    espesor: Decimal,
    tolerancia_sct: Decimal,
    axis: Vec<Decimal>,
}

impl EvaluationInputs {
    fn report(&self, reading: DivisionReading) -> ReadingReport {
        let ctx = ReadingContext {
            altura_aparato: self.altura_aparato,
            station: self.station,
            espesor: self.espesor,
            tolerancia_sct: self.tolerancia_sct,
            divisions: &self.axis,
        };
        let metrics = evaluate(&ctx, reading.division_transversal, reading.lectura_mira);
        ReadingReport { reading, metrics }
    }
}

impl SurveyReadingService {
    /// Create a service over the shared repository bundle.
    pub fn new(repos: SurveyRepositories) -> Self {
        Self { repos }
    }

    async fn inputs_for(
        &self,
        project: &Project,
        measurement: &Measurement,
    ) -> Result<EvaluationInputs, Error> {
        let station = self
            .repos
            .stations
            .find_by_km(project.id, measurement.estacion_km)
            .await
            .map_err(map_station_error)?;
        Ok(EvaluationInputs {
            altura_aparato: measurement.altura_aparato(),
            station: station.map(|found| found.geometry()),
            espesor: project.geometry.espesor(),
            tolerancia_sct: project.geometry.tolerancia_sct(),
            axis: project.geometry.divisions().axis(),
        })
    }

    async fn report_one(
        &self,
        project: &Project,
        measurement: &Measurement,
        reading: DivisionReading,
    ) -> Result<ReadingReport, Error> {
        Ok(self.inputs_for(project, measurement).await?.report(reading))
    }
}

#[async_trait]
impl ReadingService for SurveyReadingService {
    async fn list(
        &self,
        caller: &CallerIdentity,
        measurement: Option<MeasurementId>,
        page: PageParams,
    ) -> Result<Vec<ReadingReport>, Error> {
        let readings = self
            .repos
            .readings
            .list_for_owner(caller.id(), measurement, page)
            .await
            .map_err(map_reading_error)?;

        let mut inputs: HashMap<MeasurementId, EvaluationInputs> = HashMap::new();
        let mut reports = Vec::with_capacity(readings.len());
        for reading in readings {
            let evaluation = match inputs.entry(reading.medicion_id) {
                Entry::Occupied(slot) => slot.into_mut(),
                Entry::Vacant(slot) => {
                    let (parent, project) =
                        self.repos.owned_measurement(caller, *slot.key()).await?;
                    slot.insert(self.inputs_for(&project, &parent).await?)
                }
            };
            reports.push(evaluation.report(reading));
        }
        Ok(reports)
    }

    async fn list_for_measurement(
        &self,
        caller: &CallerIdentity,
        measurement: MeasurementId,
        page: PageParams,
    ) -> Result<Vec<ReadingReport>, Error> {
        let (parent, project) = self.repos.owned_measurement(caller, measurement).await?;
        let readings = self
            .repos
            .readings
            .list_for_owner(caller.id(), Some(measurement), page)
            .await
            .map_err(map_reading_error)?;
        let evaluation = self.inputs_for(&project, &parent).await?;
        Ok(readings
            .into_iter()
            .map(|reading| evaluation.report(reading))
            .collect())
    }

    async fn get(&self, caller: &CallerIdentity, id: ReadingId) -> Result<ReadingReport, Error> {
        let (reading, measurement, project) = self.repos.owned_reading(caller, id).await?;
        self.report_one(&project, &measurement, reading).await
    }

    async fn upsert(
        &self,
        caller: &CallerIdentity,
        draft: ReadingDraft,
    ) -> Result<ReadingReport, Error> {
        let medicion_id = draft.medicion_id;
        let upsert = draft.into_upsert(self.repos.clock.utc())?;
        let (measurement, project) = self.repos.owned_measurement(caller, medicion_id).await?;
        let stored = self
            .repos
            .readings
            .upsert(&upsert)
            .await
            .map_err(map_reading_error)?;
        self.report_one(&project, &measurement, stored).await
    }

    async fn update(
        &self,
        caller: &CallerIdentity,
        id: ReadingId,
        patch: ReadingPatch,
    ) -> Result<ReadingReport, Error> {
        let (current, measurement, project) = self.repos.owned_reading(caller, id).await?;
        let updated = patch.apply(current, self.repos.clock.utc())?;
        let stored = self
            .repos
            .readings
            .update(&updated)
            .await
            .map_err(map_reading_error)?;
        self.report_one(&project, &measurement, stored).await
    }

    async fn delete(&self, caller: &CallerIdentity, id: ReadingId) -> Result<(), Error> {
        self.repos.owned_reading(caller, id).await?;
        let removed = self
            .repos
            .readings
            .delete(id)
            .await
            .map_err(map_reading_error)?;
        if removed {
            Ok(())
        } else {
            Err(Error::not_found(format!("reading {id} not found")))
        }
    }
}

#[cfg(test)]
#[path = "reading_service_tests.rs"]
mod tests;
