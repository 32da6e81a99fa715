use async_trait::async_trait;
use pagination::PageParams;
use rust_decimal::Decimal;

use super::{InMemorySurveyStore, next_id};
use crate::domain::UserId;
use crate::domain::ports::{StationRepository, StationRepositoryError};
use crate::domain::survey::{NewStation, ProjectId, Station, StationId};

#[async_trait]
impl StationRepository for InMemorySurveyStore {
    async fn insert(&self, station: &NewStation) -> Result<Station, StationRepositoryError> {
        let mut state = self.lock().map_err(StationRepositoryError::query)?;
        if !state.projects.contains_key(&station.proyecto_id) {
            return Err(StationRepositoryError::query(format!(
                "project {} does not exist",
                station.proyecto_id
            )));
        }
        let taken = state
            .stations
            .values()
            .any(|other| other.proyecto_id == station.proyecto_id && other.km == station.km);
        if taken {
            return Err(StationRepositoryError::duplicate_km(station.km));
        }
        let id = StationId::new(next_id(&mut state.sequences.station));
        let stored = Station {
            id,
            proyecto_id: station.proyecto_id,
            km: station.km,
            pendiente_derecha: station.pendiente_derecha,
            base_cl: station.base_cl,
            observaciones: station.observaciones.clone(),
            fecha_captura: station.fecha_captura,
        };
        state.stations.insert(id, stored.clone());
        Ok(stored)
    }

    async fn find_by_id(&self, id: StationId) -> Result<Option<Station>, StationRepositoryError> {
        let state = self.lock().map_err(StationRepositoryError::query)?;
        Ok(state.stations.get(&id).cloned())
    }

    async fn find_by_km(
        &self,
        project: ProjectId,
        km: Decimal,
    ) -> Result<Option<Station>, StationRepositoryError> {
        let state = self.lock().map_err(StationRepositoryError::query)?;
        Ok(state
            .stations
            .values()
            .find(|station| station.proyecto_id == project && station.km == km)
            .cloned())
    }

    async fn list_for_owner(
        &self,
        owner: &UserId,
        project: Option<ProjectId>,
        page: PageParams,
    ) -> Result<Vec<Station>, StationRepositoryError> {
        let state = self.lock().map_err(StationRepositoryError::query)?;
        let mut stations: Vec<Station> = state
            .stations
            .values()
            .filter(|station| project.is_none_or(|wanted| station.proyecto_id == wanted))
            .filter(|station| state.owns_project(owner, station.proyecto_id))
            .cloned()
            .collect();
        stations.sort_by(|a, b| {
            a.km.cmp(&b.km)
                .then_with(|| a.proyecto_id.cmp(&b.proyecto_id))
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(page.apply(stations))
    }

    async fn update(&self, station: &Station) -> Result<Station, StationRepositoryError> {
        let mut state = self.lock().map_err(StationRepositoryError::query)?;
        let taken = state.stations.values().any(|other| {
            other.id != station.id
                && other.proyecto_id == station.proyecto_id
                && other.km == station.km
        });
        if taken {
            return Err(StationRepositoryError::duplicate_km(station.km));
        }
        let Some(stored) = state.stations.get_mut(&station.id) else {
            return Err(StationRepositoryError::missing(station.id.get()));
        };
        *stored = Station {
            proyecto_id: stored.proyecto_id,
            ..station.clone()
        };
        Ok(stored.clone())
    }

    async fn delete(&self, id: StationId) -> Result<bool, StationRepositoryError> {
        let mut state = self.lock().map_err(StationRepositoryError::query)?;
        Ok(state.stations.remove(&id).is_some())
    }
}
