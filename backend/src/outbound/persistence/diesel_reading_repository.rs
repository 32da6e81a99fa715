//! PostgreSQL-backed `ReadingRepository` implementation using Diesel ORM.
//!
//! Upserts rely on `ON CONFLICT (medicion_id, division_transversal)`. Two
//! writers racing on a fresh key can still trip the unique constraint
//! before either row is visible, so such a failure is retried once as a
//! plain update of the row that won.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::upsert::excluded;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use pagination::PageParams;
use rust_decimal::Decimal;
use tracing::debug;

use crate::domain::UserId;
use crate::domain::ports::{ReadingRepository, ReadingRepositoryError};
use crate::domain::survey::{DivisionReading, MeasurementId, ReadingId, ReadingUpsert};

use super::diesel_error_mapping::{StoreFailure, classify, into_port_error, pool_message};
use super::models::{ReadingFields, ReadingRow};
use super::pool::{DbPool, PoolError};
use super::schema::{lecturas_divisiones, mediciones_estacion, proyectos};

const MEASUREMENT_DIVISION_KEY: &str = "_medicion_division_uc";

/// Diesel-backed implementation of the `ReadingRepository` port.
#[derive(Clone)]
pub struct DieselReadingRepository {
    pool: DbPool,
}

impl DieselReadingRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ReadingRepositoryError {
    ReadingRepositoryError::connection(pool_message(error))
}

fn map_failure(failure: StoreFailure) -> ReadingRepositoryError {
    into_port_error(
        failure,
        ReadingRepositoryError::query,
        ReadingRepositoryError::connection,
    )
}

fn map_diesel_error(error: diesel::result::Error) -> ReadingRepositoryError {
    map_failure(classify(error))
}

fn to_domain(row: ReadingRow) -> Result<DivisionReading, ReadingRepositoryError> {
    row.into_domain().map_err(ReadingRepositoryError::query)
}

fn fields(reading: &ReadingUpsert) -> ReadingFields {
    ReadingFields {
        medicion_id: reading.medicion_id.get(),
        division_transversal: reading.division_transversal,
        lectura_mira: reading.lectura_mira,
        calidad: reading.calidad.as_str(),
        fecha_calculo: reading.fecha_calculo,
    }
}

async fn insert_or_overwrite(
    conn: &mut AsyncPgConnection,
    reading: &ReadingUpsert,
) -> Result<ReadingRow, diesel::result::Error> {
    use lecturas_divisiones::dsl::{calidad, division_transversal, fecha_calculo, lectura_mira};

    let row = fields(reading);
    conn.transaction(|conn| {
        async move {
            diesel::insert_into(lecturas_divisiones::table)
                .values(row)
                .on_conflict((lecturas_divisiones::medicion_id, division_transversal))
                .do_update()
                .set((
                    lectura_mira.eq(excluded(lectura_mira)),
                    calidad.eq(excluded(calidad)),
                    fecha_calculo.eq(excluded(fecha_calculo)),
                ))
                .returning(ReadingRow::as_returning())
                .get_result(conn)
                .await
        }
        .scope_boxed()
    })
    .await
}

async fn overwrite_existing(
    conn: &mut AsyncPgConnection,
    reading: &ReadingUpsert,
) -> Result<ReadingRow, diesel::result::Error> {
    diesel::update(
        lecturas_divisiones::table
            .filter(lecturas_divisiones::medicion_id.eq(reading.medicion_id.get()))
            .filter(lecturas_divisiones::division_transversal.eq(reading.division_transversal)),
    )
    .set((
        lecturas_divisiones::lectura_mira.eq(reading.lectura_mira),
        lecturas_divisiones::calidad.eq(reading.calidad.as_str()),
        lecturas_divisiones::fecha_calculo.eq(reading.fecha_calculo),
    ))
    .returning(ReadingRow::as_returning())
    .get_result(conn)
    .await
}

fn map_update_error(error: diesel::result::Error, division: Decimal) -> ReadingRepositoryError {
    match classify(error) {
        failure if failure.violates(MEASUREMENT_DIVISION_KEY) => {
            ReadingRepositoryError::duplicate_division(division)
        }
        failure => map_failure(failure),
    }
}

#[async_trait]
impl ReadingRepository for DieselReadingRepository {
    async fn upsert(
        &self,
        reading: &ReadingUpsert,
    ) -> Result<DivisionReading, ReadingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = match insert_or_overwrite(&mut conn, reading).await {
            Ok(row) => row,
            Err(error) => match classify(error) {
                failure if failure.violates(MEASUREMENT_DIVISION_KEY) => {
                    debug!(
                        medicion_id = reading.medicion_id.get(),
                        division = %reading.division_transversal,
                        "reading upsert raced another writer; retrying as update"
                    );
                    overwrite_existing(&mut conn, reading)
                        .await
                        .map_err(map_diesel_error)?
                }
                failure => return Err(map_failure(failure)),
            },
        };
        to_domain(row)
    }

    async fn find_by_id(
        &self,
        id: ReadingId,
    ) -> Result<Option<DivisionReading>, ReadingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        lecturas_divisiones::table
            .find(id.get())
            .select(ReadingRow::as_select())
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
        measurement: Option<MeasurementId>,
        page: PageParams,
    ) -> Result<Vec<DivisionReading>, ReadingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut query = lecturas_divisiones::table
            .inner_join(mediciones_estacion::table.inner_join(proyectos::table))
            .filter(proyectos::usuario_id.eq(owner.as_str()))
            .into_boxed();
        if let Some(measurement) = measurement {
            query = query.filter(lecturas_divisiones::medicion_id.eq(measurement.get()));
        }
        let rows: Vec<ReadingRow> = query
            .order((
                lecturas_divisiones::division_transversal.asc(),
                lecturas_divisiones::id.asc(),
            ))
            .offset(page.offset_i64())
            .limit(page.limit_i64())
            .select(ReadingRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(to_domain).collect()
    }

    async fn update(
        &self,
        reading: &DivisionReading,
    ) -> Result<DivisionReading, ReadingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = diesel::update(lecturas_divisiones::table.find(reading.id.get()))
            .set(ReadingFields {
                medicion_id: reading.medicion_id.get(),
                division_transversal: reading.division_transversal,
                lectura_mira: reading.lectura_mira,
                calidad: reading.calidad.as_str(),
                fecha_calculo: reading.fecha_calculo,
            })
            .returning(ReadingRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(|err| map_update_error(err, reading.division_transversal))?
            .ok_or_else(|| ReadingRepositoryError::missing(reading.id.get()))?;
        to_domain(row)
    }

    async fn delete(&self, id: ReadingId) -> Result<bool, ReadingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let removed = diesel::delete(lecturas_divisiones::table.find(id.get()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(removed > 0)
    }
}
