use async_trait::async_trait;
use pagination::PageParams;

use super::{InMemorySurveyStore, next_id};
use crate::domain::UserId;
use crate::domain::ports::{ProjectRepository, ProjectRepositoryError};
use crate::domain::survey::{NewProject, Project, ProjectId, Station, StationId, StationSeed};

#[async_trait]
impl ProjectRepository for InMemorySurveyStore {
    async fn insert(
        &self,
        project: &NewProject,
        stations: &[StationSeed],
    ) -> Result<Project, ProjectRepositoryError> {
        let mut state = self.lock().map_err(ProjectRepositoryError::query)?;
        if !state.profiles.contains_key(&project.owner) {
            return Err(ProjectRepositoryError::query(format!(
                "owner {} has no profile",
                project.owner
            )));
        }
        let id = ProjectId::new(next_id(&mut state.sequences.project));
        let stored = Project {
            id,
            owner: project.owner.clone(),
            nombre: project.nombre.clone(),
            tramo: project.tramo.clone(),
            cuerpo: project.cuerpo.clone(),
            geometry: project.geometry.clone(),
            estado: project.estado,
            fecha_creacion: project.fecha_creacion,
            fecha_modificacion: project.fecha_creacion,
        };
        state.projects.insert(id, stored.clone());
        for seed in stations {
            let station_id = StationId::new(next_id(&mut state.sequences.station));
            state.stations.insert(
                station_id,
                Station {
                    id: station_id,
                    proyecto_id: id,
                    km: seed.km,
                    pendiente_derecha: seed.pendiente_derecha,
                    base_cl: seed.base_cl,
                    observaciones: None,
                    fecha_captura: project.fecha_creacion,
                },
            );
        }
        Ok(stored)
    }

    async fn find_by_id(&self, id: ProjectId) -> Result<Option<Project>, ProjectRepositoryError> {
        let state = self.lock().map_err(ProjectRepositoryError::query)?;
        Ok(state.projects.get(&id).cloned())
    }

    async fn list_for_owner(
        &self,
        owner: &UserId,
        page: PageParams,
    ) -> Result<Vec<Project>, ProjectRepositoryError> {
        let state = self.lock().map_err(ProjectRepositoryError::query)?;
        let owned = state
            .projects
            .values()
            .filter(|project| project.is_owned_by(owner))
            .cloned()
            .collect();
        Ok(page.apply(owned))
    }

    async fn update(&self, project: &Project) -> Result<Project, ProjectRepositoryError> {
        let mut state = self.lock().map_err(ProjectRepositoryError::query)?;
        let Some(stored) = state.projects.get_mut(&project.id) else {
            return Err(ProjectRepositoryError::missing(project.id.get()));
        };
        *stored = Project {
            owner: stored.owner.clone(),
            fecha_creacion: stored.fecha_creacion,
            ..project.clone()
        };
        Ok(stored.clone())
    }

    async fn delete(&self, id: ProjectId) -> Result<bool, ProjectRepositoryError> {
        let mut state = self.lock().map_err(ProjectRepositoryError::query)?;
        if state.projects.remove(&id).is_none() {
            return Ok(false);
        }
        state.stations.retain(|_, station| station.proyecto_id != id);
        let measurements: Vec<_> = state
            .measurements
            .values()
            .filter(|measurement| measurement.proyecto_id == id)
            .map(|measurement| measurement.id)
            .collect();
        for measurement in measurements {
            state.remove_measurement_cascade(measurement);
        }
        Ok(true)
    }
}
