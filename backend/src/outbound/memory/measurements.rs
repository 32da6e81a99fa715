use async_trait::async_trait;
use pagination::PageParams;

use super::{InMemorySurveyStore, next_id};
use crate::domain::UserId;
use crate::domain::ports::{MeasurementRepository, MeasurementRepositoryError};
use crate::domain::survey::{Measurement, MeasurementId, NewMeasurement, ProjectId};

#[async_trait]
impl MeasurementRepository for InMemorySurveyStore {
    async fn insert(
        &self,
        measurement: &NewMeasurement,
    ) -> Result<Measurement, MeasurementRepositoryError> {
        let mut state = self.lock().map_err(MeasurementRepositoryError::query)?;
        if !state.projects.contains_key(&measurement.proyecto_id) {
            return Err(MeasurementRepositoryError::query(format!(
                "project {} does not exist",
                measurement.proyecto_id
            )));
        }
        let taken = state.measurements.values().any(|other| {
            other.proyecto_id == measurement.proyecto_id
                && other.estacion_km == measurement.estacion_km
        });
        if taken {
            return Err(MeasurementRepositoryError::duplicate_km(
                measurement.estacion_km,
            ));
        }
        let id = MeasurementId::new(next_id(&mut state.sequences.measurement));
        let stored = Measurement {
            id,
            proyecto_id: measurement.proyecto_id,
            estacion_km: measurement.estacion_km,
            bn_altura: measurement.bn_altura,
            bn_lectura: measurement.bn_lectura,
            fecha_medicion: measurement.fecha_medicion,
            operador: measurement.operador.clone(),
            condiciones_clima: measurement.condiciones_clima.clone(),
            observaciones: measurement.observaciones.clone(),
        };
        state.measurements.insert(id, stored.clone());
        Ok(stored)
    }

    async fn find_by_id(
        &self,
        id: MeasurementId,
    ) -> Result<Option<Measurement>, MeasurementRepositoryError> {
        let state = self.lock().map_err(MeasurementRepositoryError::query)?;
        Ok(state.measurements.get(&id).cloned())
    }

    async fn list_for_owner(
        &self,
        owner: &UserId,
        project: Option<ProjectId>,
        page: PageParams,
    ) -> Result<Vec<Measurement>, MeasurementRepositoryError> {
        let state = self.lock().map_err(MeasurementRepositoryError::query)?;
        let mut measurements: Vec<Measurement> = state
            .measurements
            .values()
            .filter(|m| project.is_none_or(|wanted| m.proyecto_id == wanted))
            .filter(|m| state.owns_project(owner, m.proyecto_id))
            .cloned()
            .collect();
        measurements.sort_by(|a, b| {
            a.estacion_km
                .cmp(&b.estacion_km)
                .then_with(|| a.proyecto_id.cmp(&b.proyecto_id))
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(page.apply(measurements))
    }

    async fn update(
        &self,
        measurement: &Measurement,
    ) -> Result<Measurement, MeasurementRepositoryError> {
        let mut state = self.lock().map_err(MeasurementRepositoryError::query)?;
        let taken = state.measurements.values().any(|other| {
            other.id != measurement.id
                && other.proyecto_id == measurement.proyecto_id
                && other.estacion_km == measurement.estacion_km
        });
        if taken {
            return Err(MeasurementRepositoryError::duplicate_km(
                measurement.estacion_km,
            ));
        }
        let Some(stored) = state.measurements.get_mut(&measurement.id) else {
            return Err(MeasurementRepositoryError::missing(measurement.id.get()));
        };
        *stored = Measurement {
            proyecto_id: stored.proyecto_id,
            ..measurement.clone()
        };
        Ok(stored.clone())
    }

    async fn delete(&self, id: MeasurementId) -> Result<bool, MeasurementRepositoryError> {
        let mut state = self.lock().map_err(MeasurementRepositoryError::query)?;
        Ok(state.remove_measurement_cascade(id))
    }
}
