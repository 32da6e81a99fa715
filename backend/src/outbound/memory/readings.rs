use async_trait::async_trait;
use pagination::PageParams;

use super::{InMemorySurveyStore, next_id};
use crate::domain::UserId;
use crate::domain::ports::{ReadingRepository, ReadingRepositoryError};
use crate::domain::survey::{DivisionReading, MeasurementId, ReadingId, ReadingUpsert};

#[async_trait]
impl ReadingRepository for InMemorySurveyStore {
    async fn upsert(
        &self,
        reading: &ReadingUpsert,
    ) -> Result<DivisionReading, ReadingRepositoryError> {
        let mut state = self.lock().map_err(ReadingRepositoryError::query)?;
        if !state.measurements.contains_key(&reading.medicion_id) {
            return Err(ReadingRepositoryError::query(format!(
                "measurement {} does not exist",
                reading.medicion_id
            )));
        }
        let existing = state.readings.values_mut().find(|other| {
            other.medicion_id == reading.medicion_id
                && other.division_transversal == reading.division_transversal
        });
        if let Some(stored) = existing {
            stored.lectura_mira = reading.lectura_mira;
            stored.calidad = reading.calidad;
            stored.fecha_calculo = reading.fecha_calculo;
            return Ok(stored.clone());
        }
        let id = ReadingId::new(next_id(&mut state.sequences.reading));
        let stored = DivisionReading {
            id,
            medicion_id: reading.medicion_id,
            division_transversal: reading.division_transversal,
            lectura_mira: reading.lectura_mira,
            calidad: reading.calidad,
            fecha_calculo: reading.fecha_calculo,
        };
        state.readings.insert(id, stored.clone());
        Ok(stored)
    }

    async fn find_by_id(
        &self,
        id: ReadingId,
    ) -> Result<Option<DivisionReading>, ReadingRepositoryError> {
        let state = self.lock().map_err(ReadingRepositoryError::query)?;
        Ok(state.readings.get(&id).cloned())
    }

    async fn list_for_owner(
        &self,
        owner: &UserId,
        measurement: Option<MeasurementId>,
        page: PageParams,
    ) -> Result<Vec<DivisionReading>, ReadingRepositoryError> {
        let state = self.lock().map_err(ReadingRepositoryError::query)?;
        let mut readings: Vec<DivisionReading> = state
            .readings
            .values()
            .filter(|r| measurement.is_none_or(|wanted| r.medicion_id == wanted))
            .filter(|r| state.owns_measurement(owner, r.medicion_id))
            .cloned()
            .collect();
        readings.sort_by(|a, b| {
            a.division_transversal
                .cmp(&b.division_transversal)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(page.apply(readings))
    }

    async fn update(
        &self,
        reading: &DivisionReading,
    ) -> Result<DivisionReading, ReadingRepositoryError> {
        let mut state = self.lock().map_err(ReadingRepositoryError::query)?;
        let taken = state.readings.values().any(|other| {
            other.id != reading.id
                && other.medicion_id == reading.medicion_id
                && other.division_transversal == reading.division_transversal
        });
        if taken {
            return Err(ReadingRepositoryError::duplicate_division(
                reading.division_transversal,
            ));
        }
        let Some(stored) = state.readings.get_mut(&reading.id) else {
            return Err(ReadingRepositoryError::missing(reading.id.get()));
        };
        *stored = DivisionReading {
            medicion_id: stored.medicion_id,
            ..reading.clone()
        };
        Ok(stored.clone())
    }

    async fn delete(&self, id: ReadingId) -> Result<bool, ReadingRepositoryError> {
        let mut state = self.lock().map_err(ReadingRepositoryError::query)?;
        Ok(state.readings.remove(&id).is_some())
    }
}
