//! PostgreSQL-backed `ProjectRepository` implementation using Diesel ORM.
//!
//! A project and its generated stations are written in one transaction so a
//! failed station batch never leaves a half-populated project behind.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use pagination::PageParams;

use crate::domain::UserId;
use crate::domain::ports::{ProjectRepository, ProjectRepositoryError};
use crate::domain::survey::{NewProject, Project, ProjectId, StationSeed};

use super::diesel_error_mapping::{classify, into_port_error, pool_message};
use super::models::{NewStationRow, ProjectFields, ProjectRow};
use super::pool::{DbPool, PoolError};
use super::schema::{estaciones_teoricas, proyectos};

/// Stations per INSERT; keeps each statement well under the bind limit.
const STATION_BATCH: usize = 1_000;

/// Diesel-backed implementation of the `ProjectRepository` port.
#[derive(Clone)]
pub struct DieselProjectRepository {
    pool: DbPool,
}

impl DieselProjectRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ProjectRepositoryError {
    ProjectRepositoryError::connection(pool_message(error))
}

fn map_diesel_error(error: diesel::result::Error) -> ProjectRepositoryError {
    into_port_error(
        classify(error),
        ProjectRepositoryError::query,
        ProjectRepositoryError::connection,
    )
}

fn to_domain(row: ProjectRow) -> Result<Project, ProjectRepositoryError> {
    row.into_domain().map_err(ProjectRepositoryError::query)
}

#[async_trait]
impl ProjectRepository for DieselProjectRepository {
    async fn insert(
        &self,
        project: &NewProject,
        stations: &[StationSeed],
    ) -> Result<Project, ProjectRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let fields = ProjectFields::new(
            &project.nombre,
            project.tramo.as_deref(),
            project.cuerpo.as_deref(),
            &project.geometry,
            project.estado.as_str(),
            project.fecha_creacion,
        );
        let owner = project.owner.as_str();
        let created = project.fecha_creacion;

        let row = conn
            .transaction(|conn| {
                async move {
                    let row: ProjectRow = diesel::insert_into(proyectos::table)
                        .values((
                            fields,
                            proyectos::usuario_id.eq(owner),
                            proyectos::fecha_creacion.eq(created),
                        ))
                        .returning(ProjectRow::as_returning())
                        .get_result(conn)
                        .await?;

                    for batch in stations.chunks(STATION_BATCH) {
                        let rows: Vec<NewStationRow<'_>> = batch
                            .iter()
                            .map(|seed| NewStationRow {
                                proyecto_id: row.id,
                                km: seed.km,
                                pendiente_derecha: seed.pendiente_derecha,
                                base_cl: seed.base_cl,
                                observaciones: None,
                                fecha_captura: created,
                            })
                            .collect();
                        diesel::insert_into(estaciones_teoricas::table)
                            .values(&rows)
                            .execute(conn)
                            .await?;
                    }
                    Ok::<_, diesel::result::Error>(row)
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;
        to_domain(row)
    }

    async fn find_by_id(&self, id: ProjectId) -> Result<Option<Project>, ProjectRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        proyectos::table
            .find(id.get())
            .select(ProjectRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(to_domain)
            .transpose()
    }

    async fn list_for_owner(
        &self,
        owner: &UserId,
        page: PageParams,
    ) -> Result<Vec<Project>, ProjectRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<ProjectRow> = proyectos::table
            .filter(proyectos::usuario_id.eq(owner.as_str()))
            .order(proyectos::id.asc())
            .offset(page.offset_i64())
            .limit(page.limit_i64())
            .select(ProjectRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(to_domain).collect()
    }

    async fn update(&self, project: &Project) -> Result<Project, ProjectRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let fields = ProjectFields::new(
            &project.nombre,
            project.tramo.as_deref(),
            project.cuerpo.as_deref(),
            &project.geometry,
            project.estado.as_str(),
            project.fecha_modificacion,
        );
        let row = diesel::update(proyectos::table.find(project.id.get()))
            .set(fields)
            .returning(ProjectRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .ok_or_else(|| ProjectRepositoryError::missing(project.id.get()))?;
        to_domain(row)
    }

    async fn delete(&self, id: ProjectId) -> Result<bool, ProjectRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let removed = diesel::delete(proyectos::table.find(id.get()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(removed > 0)
    }
}
