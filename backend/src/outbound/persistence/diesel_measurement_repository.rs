//! PostgreSQL-backed `MeasurementRepository` implementation using Diesel ORM.
//!
//! Readings cascade with their measurement through the foreign key, so
//! deletion is a single statement.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use pagination::PageParams;
use rust_decimal::Decimal;

use crate::domain::UserId;
use crate::domain::ports::{MeasurementRepository, MeasurementRepositoryError};
use crate::domain::survey::{Measurement, MeasurementId, NewMeasurement, ProjectId};

use super::diesel_error_mapping::{classify, into_port_error, pool_message};
use super::models::{MeasurementFields, MeasurementRow};
use super::pool::{DbPool, PoolError};
use super::schema::{mediciones_estacion, proyectos};

const PROJECT_STATION_KEY: &str = "_proyecto_estacion_uc";

/// Diesel-backed implementation of the `MeasurementRepository` port.
#[derive(Clone)]
pub struct DieselMeasurementRepository {
    pool: DbPool,
}

impl DieselMeasurementRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> MeasurementRepositoryError {
    MeasurementRepositoryError::connection(pool_message(error))
}

fn map_diesel_error(error: diesel::result::Error) -> MeasurementRepositoryError {
    into_port_error(
        classify(error),
        MeasurementRepositoryError::query,
        MeasurementRepositoryError::connection,
    )
}

fn map_write_error(error: diesel::result::Error, km: Decimal) -> MeasurementRepositoryError {
    match classify(error) {
        failure if failure.violates(PROJECT_STATION_KEY) => {
            MeasurementRepositoryError::duplicate_km(km)
        }
        failure => into_port_error(
            failure,
            MeasurementRepositoryError::query,
            MeasurementRepositoryError::connection,
        ),
    }
}

#[async_trait]
impl MeasurementRepository for DieselMeasurementRepository {
    async fn insert(
        &self,
        measurement: &NewMeasurement,
    ) -> Result<Measurement, MeasurementRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let fields = MeasurementFields {
            estacion_km: measurement.estacion_km,
            bn_altura: measurement.bn_altura,
            bn_lectura: measurement.bn_lectura,
            fecha_medicion: measurement.fecha_medicion,
            operador: measurement.operador.as_deref(),
            condiciones_clima: measurement.condiciones_clima.as_deref(),
            observaciones: measurement.observaciones.as_deref(),
        };
        diesel::insert_into(mediciones_estacion::table)
            .values((
                fields,
                mediciones_estacion::proyecto_id.eq(measurement.proyecto_id.get()),
            ))
            .returning(MeasurementRow::as_returning())
            .get_result(&mut conn)
            .await
            .map(Measurement::from)
            .map_err(|err| map_write_error(err, measurement.estacion_km))
    }

    async fn find_by_id(
        &self,
        id: MeasurementId,
    ) -> Result<Option<Measurement>, MeasurementRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = mediciones_estacion::table
            .find(id.get())
            .select(MeasurementRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(Measurement::from))
    }

    async fn list_for_owner(
        &self,
        owner: &UserId,
        project: Option<ProjectId>,
        page: PageParams,
    ) -> Result<Vec<Measurement>, MeasurementRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut query = mediciones_estacion::table
            .inner_join(proyectos::table)
            .filter(proyectos::usuario_id.eq(owner.as_str()))
            .into_boxed();
        if let Some(project) = project {
            query = query.filter(mediciones_estacion::proyecto_id.eq(project.get()));
        }
        let rows: Vec<MeasurementRow> = query
            .order((
                mediciones_estacion::estacion_km.asc(),
                mediciones_estacion::proyecto_id.asc(),
                mediciones_estacion::id.asc(),
            ))
            .offset(page.offset_i64())
            .limit(page.limit_i64())
            .select(MeasurementRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(Measurement::from).collect())
    }

    async fn update(
        &self,
        measurement: &Measurement,
    ) -> Result<Measurement, MeasurementRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::update(mediciones_estacion::table.find(measurement.id.get()))
            .set(MeasurementFields {
                estacion_km: measurement.estacion_km,
                bn_altura: measurement.bn_altura,
                bn_lectura: measurement.bn_lectura,
                fecha_medicion: measurement.fecha_medicion,
                operador: measurement.operador.as_deref(),
                condiciones_clima: measurement.condiciones_clima.as_deref(),
                observaciones: measurement.observaciones.as_deref(),
            })
            .returning(MeasurementRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(|err| map_write_error(err, measurement.estacion_km))?
            .map(Measurement::from)
            .ok_or_else(|| MeasurementRepositoryError::missing(measurement.id.get()))
    }

    async fn delete(&self, id: MeasurementId) -> Result<bool, MeasurementRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let removed = diesel::delete(mediciones_estacion::table.find(id.get()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(removed > 0)
    }
}
