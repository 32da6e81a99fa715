//! Field measurement HTTP handlers.
//!
//! ```text
//! GET    /mediciones?proyecto_id=
//! POST   /mediciones
//! GET    /mediciones/{id}
//! PUT    /mediciones/{id}
//! PATCH  /mediciones/{id}
//! DELETE /mediciones/{id}
//! GET    /mediciones/{id}/lecturas
//! ```

use actix_web::{HttpResponse, delete, get, patch, post, put, web};
use chrono::NaiveDate;
use pagination::PageParams;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::Error;
use crate::domain::survey::{
    Measurement, MeasurementDraft, MeasurementId, MeasurementPatch, ProjectId,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::Authenticated;
use crate::inbound::http::dto::MessageResponse;
use crate::inbound::http::readings::ReadingResponse;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::PageQuery;

/// Query for `GET /mediciones`.
#[derive(Debug, Default, Clone, Copy, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MeasurementListQuery {
    /// Restrict to one project.
    pub proyecto_id: Option<i32>,
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

impl MeasurementListQuery {
    fn page(self) -> Result<PageParams, Error> {
        PageQuery {
            skip: self.skip,
            limit: self.limit,
        }
        .page()
    }
}

/// Request payload for recording a measurement.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct MeasurementCreateRequest {
    pub proyecto_id: i32,
    pub estacion_km: Decimal,
    /// Benchmark elevation.
    pub bn_altura: Option<Decimal>,
    /// Rod reading on the benchmark.
    pub bn_lectura: Option<Decimal>,
    /// Defaults to today.
    pub fecha_medicion: Option<NaiveDate>,
    pub operador: Option<String>,
    pub condiciones_clima: Option<String>,
    pub observaciones: Option<String>,
}

impl From<MeasurementCreateRequest> for MeasurementDraft {
    fn from(value: MeasurementCreateRequest) -> Self {
        Self {
            proyecto_id: ProjectId::new(value.proyecto_id),
            estacion_km: value.estacion_km,
            bn_altura: value.bn_altura,
            bn_lectura: value.bn_lectura,
            fecha_medicion: value.fecha_medicion,
            operador: value.operador,
            condiciones_clima: value.condiciones_clima,
            observaciones: value.observaciones,
        }
    }
}

/// Partial measurement update.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct MeasurementUpdateRequest {
    pub estacion_km: Option<Decimal>,
    pub bn_altura: Option<Decimal>,
    pub bn_lectura: Option<Decimal>,
    pub fecha_medicion: Option<NaiveDate>,
    pub operador: Option<String>,
    pub condiciones_clima: Option<String>,
    pub observaciones: Option<String>,
}

impl From<MeasurementUpdateRequest> for MeasurementPatch {
    fn from(value: MeasurementUpdateRequest) -> Self {
        Self {
            estacion_km: value.estacion_km,
            bn_altura: value.bn_altura,
            bn_lectura: value.bn_lectura,
            fecha_medicion: value.fecha_medicion,
            operador: value.operador,
            condiciones_clima: value.condiciones_clima,
            observaciones: value.observaciones,
        }
    }
}

/// Measurement as returned to clients.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MeasurementResponse {
    pub id: i32,
    pub proyecto_id: i32,
    pub estacion_km: Decimal,
    pub bn_altura: Option<Decimal>,
    pub bn_lectura: Option<Decimal>,
    /// `bn_altura + bn_lectura`, unset while either is missing.
    pub altura_aparato: Option<Decimal>,
    pub fecha_medicion: NaiveDate,
    pub operador: Option<String>,
    pub condiciones_clima: Option<String>,
    pub observaciones: Option<String>,
}

impl From<Measurement> for MeasurementResponse {
    fn from(value: Measurement) -> Self {
        Self {
            altura_aparato: value.altura_aparato(),
            id: value.id.get(),
            proyecto_id: value.proyecto_id.get(),
            estacion_km: value.estacion_km,
            bn_altura: value.bn_altura,
            bn_lectura: value.bn_lectura,
            fecha_medicion: value.fecha_medicion,
            operador: value.operador,
            condiciones_clima: value.condiciones_clima,
            observaciones: value.observaciones,
        }
    }
}

/// List measurements of the caller's projects ordered by station km.
#[utoipa::path(
    get,
    path = "/mediciones",
    params(MeasurementListQuery),
    responses(
        (status = 200, description = "Measurements", body = [MeasurementResponse]),
        (status = 400, description = "Invalid query", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["mediciones"],
    operation_id = "listMeasurements",
    security(("bearer" = []))
)]
#[get("/mediciones")]
pub async fn list_measurements(
    state: web::Data<HttpState>,
    user: Authenticated,
    query: web::Query<MeasurementListQuery>,
) -> ApiResult<web::Json<Vec<MeasurementResponse>>> {
    let query = query.into_inner();
    let page = query.page()?;
    let measurements = state
        .measurements
        .list(user.caller(), query.proyecto_id.map(ProjectId::new), page)
        .await?;
    Ok(web::Json(
        measurements
            .into_iter()
            .map(MeasurementResponse::from)
            .collect(),
    ))
}

#[utoipa::path(
    get,
    path = "/mediciones/{id}",
    params(("id" = i32, Path, description = "Measurement identifier")),
    responses(
        (status = 200, description = "Measurement", body = MeasurementResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["mediciones"],
    operation_id = "getMeasurement",
    security(("bearer" = []))
)]
#[get("/mediciones/{id}")]
pub async fn get_measurement(
    state: web::Data<HttpState>,
    user: Authenticated,
    path: web::Path<i32>,
) -> ApiResult<web::Json<MeasurementResponse>> {
    let measurement = state
        .measurements
        .get(user.caller(), MeasurementId::new(path.into_inner()))
        .await?;
    Ok(web::Json(measurement.into()))
}

/// Record a measurement; at most one per project and station km.
#[utoipa::path(
    post,
    path = "/mediciones",
    request_body = MeasurementCreateRequest,
    responses(
        (status = 200, description = "Created measurement", body = MeasurementResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Project not found", body = ErrorSchema),
        (status = 409, description = "Measurement already exists at this km", body = ErrorSchema)
    ),
    tags = ["mediciones"],
    operation_id = "createMeasurement",
    security(("bearer" = []))
)]
#[post("/mediciones")]
pub async fn create_measurement(
    state: web::Data<HttpState>,
    user: Authenticated,
    payload: web::Json<MeasurementCreateRequest>,
) -> ApiResult<web::Json<MeasurementResponse>> {
    let measurement = state
        .measurements
        .create(user.caller(), payload.into_inner().into())
        .await?;
    Ok(web::Json(measurement.into()))
}

async fn apply_update(
    state: &HttpState,
    user: &Authenticated,
    id: i32,
    payload: MeasurementUpdateRequest,
) -> ApiResult<web::Json<MeasurementResponse>> {
    let measurement = state
        .measurements
        .update(user.caller(), MeasurementId::new(id), payload.into())
        .await?;
    Ok(web::Json(measurement.into()))
}

#[utoipa::path(
    put,
    path = "/mediciones/{id}",
    params(("id" = i32, Path, description = "Measurement identifier")),
    request_body = MeasurementUpdateRequest,
    responses(
        (status = 200, description = "Updated measurement", body = MeasurementResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 409, description = "Measurement already exists at this km", body = ErrorSchema)
    ),
    tags = ["mediciones"],
    operation_id = "updateMeasurement",
    security(("bearer" = []))
)]
#[put("/mediciones/{id}")]
pub async fn update_measurement(
    state: web::Data<HttpState>,
    user: Authenticated,
    path: web::Path<i32>,
    payload: web::Json<MeasurementUpdateRequest>,
) -> ApiResult<web::Json<MeasurementResponse>> {
    apply_update(&state, &user, path.into_inner(), payload.into_inner()).await
}

#[utoipa::path(
    patch,
    path = "/mediciones/{id}",
    params(("id" = i32, Path, description = "Measurement identifier")),
    request_body = MeasurementUpdateRequest,
    responses(
        (status = 200, description = "Updated measurement", body = MeasurementResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 409, description = "Measurement already exists at this km", body = ErrorSchema)
    ),
    tags = ["mediciones"],
    operation_id = "patchMeasurement",
    security(("bearer" = []))
)]
#[patch("/mediciones/{id}")]
pub async fn patch_measurement(
    state: web::Data<HttpState>,
    user: Authenticated,
    path: web::Path<i32>,
    payload: web::Json<MeasurementUpdateRequest>,
) -> ApiResult<web::Json<MeasurementResponse>> {
    apply_update(&state, &user, path.into_inner(), payload.into_inner()).await
}

/// Delete a measurement together with its readings.
#[utoipa::path(
    delete,
    path = "/mediciones/{id}",
    params(("id" = i32, Path, description = "Measurement identifier")),
    responses(
        (status = 200, description = "Measurement deleted", body = MessageResponse),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["mediciones"],
    operation_id = "deleteMeasurement",
    security(("bearer" = []))
)]
#[delete("/mediciones/{id}")]
pub async fn delete_measurement(
    state: web::Data<HttpState>,
    user: Authenticated,
    path: web::Path<i32>,
) -> ApiResult<HttpResponse> {
    state
        .measurements
        .delete(user.caller(), MeasurementId::new(path.into_inner()))
        .await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new("Medición eliminada correctamente")))
}

/// Readings of a measurement ordered by transverse division, with metrics.
#[utoipa::path(
    get,
    path = "/mediciones/{id}/lecturas",
    params(("id" = i32, Path, description = "Measurement identifier"), PageQuery),
    responses(
        (status = 200, description = "Readings", body = [ReadingResponse]),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["mediciones"],
    operation_id = "listMeasurementReadings",
    security(("bearer" = []))
)]
#[get("/mediciones/{id}/lecturas")]
pub async fn list_measurement_readings(
    state: web::Data<HttpState>,
    user: Authenticated,
    path: web::Path<i32>,
    query: web::Query<PageQuery>,
) -> ApiResult<web::Json<Vec<ReadingResponse>>> {
    let page = query.into_inner().page()?;
    let readings = state
        .readings
        .list_for_measurement(user.caller(), MeasurementId::new(path.into_inner()), page)
        .await?;
    Ok(web::Json(
        readings.into_iter().map(ReadingResponse::from).collect(),
    ))
}

#[cfg(test)]
#[path = "measurements_tests.rs"]
mod tests;
