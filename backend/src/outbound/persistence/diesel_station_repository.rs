//! PostgreSQL-backed `StationRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use pagination::PageParams;
use rust_decimal::Decimal;

use crate::domain::UserId;
use crate::domain::ports::{StationRepository, StationRepositoryError};
use crate::domain::survey::{NewStation, ProjectId, Station, StationId};

use super::diesel_error_mapping::{classify, into_port_error, pool_message};
use super::models::{NewStationRow, StationRow, StationUpdate};
use super::pool::{DbPool, PoolError};
use super::schema::{estaciones_teoricas, proyectos};

const PROJECT_KM_KEY: &str = "_proyecto_km_uc";

/// Diesel-backed implementation of the `StationRepository` port.
#[derive(Clone)]
pub struct DieselStationRepository {
    pool: DbPool,
}

impl DieselStationRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> StationRepositoryError {
    StationRepositoryError::connection(pool_message(error))
}

fn map_diesel_error(error: diesel::result::Error) -> StationRepositoryError {
    into_port_error(
        classify(error),
        StationRepositoryError::query,
        StationRepositoryError::connection,
    )
}

fn map_write_error(error: diesel::result::Error, km: Decimal) -> StationRepositoryError {
    match classify(error) {
        failure if failure.violates(PROJECT_KM_KEY) => StationRepositoryError::duplicate_km(km),
        failure => into_port_error(
            failure,
            StationRepositoryError::query,
            StationRepositoryError::connection,
        ),
    }
}

#[async_trait]
impl StationRepository for DieselStationRepository {
    async fn insert(&self, station: &NewStation) -> Result<Station, StationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(estaciones_teoricas::table)
            .values(NewStationRow {
                proyecto_id: station.proyecto_id.get(),
                km: station.km,
                pendiente_derecha: station.pendiente_derecha,
                base_cl: station.base_cl,
                observaciones: station.observaciones.as_deref(),
                fecha_captura: station.fecha_captura,
            })
            .returning(StationRow::as_returning())
            .get_result(&mut conn)
            .await
            .map(Station::from)
            .map_err(|err| map_write_error(err, station.km))
    }

    async fn find_by_id(&self, id: StationId) -> Result<Option<Station>, StationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = estaciones_teoricas::table
            .find(id.get())
            .select(StationRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(Station::from))
    }

    async fn find_by_km(
        &self,
        project: ProjectId,
        km: Decimal,
    ) -> Result<Option<Station>, StationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = estaciones_teoricas::table
            .filter(estaciones_teoricas::proyecto_id.eq(project.get()))
            .filter(estaciones_teoricas::km.eq(km))
            .select(StationRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(Station::from))
    }

    async fn list_for_owner(
        &self,
        owner: &UserId,
        project: Option<ProjectId>,
        page: PageParams,
    ) -> Result<Vec<Station>, StationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut query = estaciones_teoricas::table
            .inner_join(proyectos::table)
            .filter(proyectos::usuario_id.eq(owner.as_str()))
            .into_boxed();
        if let Some(project) = project {
            query = query.filter(estaciones_teoricas::proyecto_id.eq(project.get()));
        }
        let rows: Vec<StationRow> = query
            .order((
                estaciones_teoricas::km.asc(),
                estaciones_teoricas::proyecto_id.asc(),
                estaciones_teoricas::id.asc(),
            ))
            .offset(page.offset_i64())
            .limit(page.limit_i64())
            .select(StationRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(Station::from).collect())
    }

    async fn update(&self, station: &Station) -> Result<Station, StationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::update(estaciones_teoricas::table.find(station.id.get()))
            .set(StationUpdate {
                km: station.km,
                pendiente_derecha: station.pendiente_derecha,
                base_cl: station.base_cl,
                observaciones: station.observaciones.as_deref(),
            })
            .returning(StationRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(|err| map_write_error(err, station.km))?
            .map(Station::from)
            .ok_or_else(|| StationRepositoryError::missing(station.id.get()))
    }

    async fn delete(&self, id: StationId) -> Result<bool, StationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let removed = diesel::delete(estaciones_teoricas::table.find(id.get()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(removed > 0)
    }
}
