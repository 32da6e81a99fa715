//! Division reading HTTP handlers.
//!
//! ```text
//! GET    /lecturas?medicion_id=
//! POST   /lecturas
//! GET    /lecturas/{id}
//! PUT    /lecturas/{id}
//! PATCH  /lecturas/{id}
//! DELETE /lecturas/{id}
//! ```
//!
//! `POST` is an upsert keyed by measurement and transverse division. Every
//! response carries the metrics evaluated for the reading at request time.

use actix_web::{HttpResponse, delete, get, patch, post, put, web};
use chrono::{DateTime, Utc};
use pagination::PageParams;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::Error;
use crate::domain::survey::{MeasurementId, ReadingDraft, ReadingId, ReadingPatch, ReadingReport};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::Authenticated;
use crate::inbound::http::dto::MessageResponse;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::PageQuery;

/// Query for `GET /lecturas`.
#[derive(Debug, Default, Clone, Copy, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ReadingListQuery {
    /// Restrict to one measurement.
    pub medicion_id: Option<i32>,
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

impl ReadingListQuery {
    fn page(self) -> Result<PageParams, Error> {
        PageQuery {
            skip: self.skip,
            limit: self.limit,
        }
        .page()
    }
}

/// Request payload for `POST /lecturas`.
///
/// Metric fields (`elv_base_real`, `clasificacion`, ...) are computed by the
/// server and ignored when sent.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct ReadingCreateRequest {
    pub medicion_id: i32,
    #[schema(example = -3.0)]
    pub division_transversal: Decimal,
    pub lectura_mira: Decimal,
    /// One of EXCELENTE, BUENA, REGULAR, MALA, REVISAR; defaults to BUENA.
    pub calidad: Option<String>,
}

impl From<ReadingCreateRequest> for ReadingDraft {
    fn from(value: ReadingCreateRequest) -> Self {
        Self {
            medicion_id: MeasurementId::new(value.medicion_id),
            division_transversal: value.division_transversal,
            lectura_mira: value.lectura_mira,
            calidad: value.calidad,
        }
    }
}

/// Partial reading update.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct ReadingUpdateRequest {
    pub division_transversal: Option<Decimal>,
    pub lectura_mira: Option<Decimal>,
    pub calidad: Option<String>,
}

impl From<ReadingUpdateRequest> for ReadingPatch {
    fn from(value: ReadingUpdateRequest) -> Self {
        Self {
            division_transversal: value.division_transversal,
            lectura_mira: value.lectura_mira,
            calidad: value.calidad,
        }
    }
}

/// Reading with its evaluated metrics.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReadingResponse {
    pub id: i32,
    pub medicion_id: i32,
    pub division_transversal: Decimal,
    pub lectura_mira: Decimal,
    pub calidad: String,
    pub elv_base_real: Option<Decimal>,
    pub elv_base_proyecto: Option<Decimal>,
    pub elv_concreto_proyecto: Option<Decimal>,
    pub esp_concreto_proyecto: Option<Decimal>,
    pub volumen_por_metro: Option<Decimal>,
    /// CUMPLE, CORTE or TERRAPLEN.
    pub clasificacion: Option<String>,
    pub cumple_tolerancia: Option<bool>,
    pub fecha_calculo: DateTime<Utc>,
}

impl From<ReadingReport> for ReadingResponse {
    fn from(value: ReadingReport) -> Self {
        let ReadingReport { reading, metrics } = value;
        Self {
            id: reading.id.get(),
            medicion_id: reading.medicion_id.get(),
            division_transversal: reading.division_transversal,
            lectura_mira: reading.lectura_mira,
            calidad: reading.calidad.as_str().to_owned(),
            elv_base_real: metrics.elv_base_real,
            elv_base_proyecto: metrics.elv_base_proyecto,
            elv_concreto_proyecto: metrics.elv_concreto_proyecto,
            esp_concreto_proyecto: metrics.esp_concreto_proyecto,
            volumen_por_metro: metrics.volumen_por_metro,
            clasificacion: metrics
                .clasificacion
                .map(|class| class.as_str().to_owned()),
            cumple_tolerancia: metrics.cumple_tolerancia,
            fecha_calculo: reading.fecha_calculo,
        }
    }
}

/// List readings of the caller's measurements ordered by division.
#[utoipa::path(
    get,
    path = "/lecturas",
    params(ReadingListQuery),
    responses(
        (status = 200, description = "Readings", body = [ReadingResponse]),
        (status = 400, description = "Invalid query", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["lecturas"],
    operation_id = "listReadings",
    security(("bearer" = []))
)]
#[get("/lecturas")]
pub async fn list_readings(
    state: web::Data<HttpState>,
    user: Authenticated,
    query: web::Query<ReadingListQuery>,
) -> ApiResult<web::Json<Vec<ReadingResponse>>> {
    let query = query.into_inner();
    let page = query.page()?;
    let readings = state
        .readings
        .list(user.caller(), query.medicion_id.map(MeasurementId::new), page)
        .await?;
    Ok(web::Json(
        readings.into_iter().map(ReadingResponse::from).collect(),
    ))
}

#[utoipa::path(
    get,
    path = "/lecturas/{id}",
    params(("id" = i32, Path, description = "Reading identifier")),
    responses(
        (status = 200, description = "Reading", body = ReadingResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["lecturas"],
    operation_id = "getReading",
    security(("bearer" = []))
)]
#[get("/lecturas/{id}")]
pub async fn get_reading(
    state: web::Data<HttpState>,
    user: Authenticated,
    path: web::Path<i32>,
) -> ApiResult<web::Json<ReadingResponse>> {
    let report = state
        .readings
        .get(user.caller(), ReadingId::new(path.into_inner()))
        .await?;
    Ok(web::Json(report.into()))
}

/// Store a reading, overwriting any reading already at the same division.
#[utoipa::path(
    post,
    path = "/lecturas",
    request_body = ReadingCreateRequest,
    responses(
        (status = 200, description = "Stored reading", body = ReadingResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Measurement not found", body = ErrorSchema)
    ),
    tags = ["lecturas"],
    operation_id = "upsertReading",
    security(("bearer" = []))
)]
#[post("/lecturas")]
pub async fn upsert_reading(
    state: web::Data<HttpState>,
    user: Authenticated,
    payload: web::Json<ReadingCreateRequest>,
) -> ApiResult<web::Json<ReadingResponse>> {
    let report = state
        .readings
        .upsert(user.caller(), payload.into_inner().into())
        .await?;
    Ok(web::Json(report.into()))
}

async fn apply_update(
    state: &HttpState,
    user: &Authenticated,
    id: i32,
    payload: ReadingUpdateRequest,
) -> ApiResult<web::Json<ReadingResponse>> {
    let report = state
        .readings
        .update(user.caller(), ReadingId::new(id), payload.into())
        .await?;
    Ok(web::Json(report.into()))
}

#[utoipa::path(
    put,
    path = "/lecturas/{id}",
    params(("id" = i32, Path, description = "Reading identifier")),
    request_body = ReadingUpdateRequest,
    responses(
        (status = 200, description = "Updated reading", body = ReadingResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 409, description = "Division already read", body = ErrorSchema)
    ),
    tags = ["lecturas"],
    operation_id = "updateReading",
    security(("bearer" = []))
)]
#[put("/lecturas/{id}")]
pub async fn update_reading(
    state: web::Data<HttpState>,
    user: Authenticated,
    path: web::Path<i32>,
    payload: web::Json<ReadingUpdateRequest>,
) -> ApiResult<web::Json<ReadingResponse>> {
    apply_update(&state, &user, path.into_inner(), payload.into_inner()).await
}

#[utoipa::path(
    patch,
    path = "/lecturas/{id}",
    params(("id" = i32, Path, description = "Reading identifier")),
    request_body = ReadingUpdateRequest,
    responses(
        (status = 200, description = "Updated reading", body = ReadingResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 409, description = "Division already read", body = ErrorSchema)
    ),
    tags = ["lecturas"],
    operation_id = "patchReading",
    security(("bearer" = []))
)]
#[patch("/lecturas/{id}")]
pub async fn patch_reading(
    state: web::Data<HttpState>,
    user: Authenticated,
    path: web::Path<i32>,
    payload: web::Json<ReadingUpdateRequest>,
) -> ApiResult<web::Json<ReadingResponse>> {
    apply_update(&state, &user, path.into_inner(), payload.into_inner()).await
}

#[utoipa::path(
    delete,
    path = "/lecturas/{id}",
    params(("id" = i32, Path, description = "Reading identifier")),
    responses(
        (status = 200, description = "Reading deleted", body = MessageResponse),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["lecturas"],
    operation_id = "deleteReading",
    security(("bearer" = []))
)]
#[delete("/lecturas/{id}")]
pub async fn delete_reading(
    state: web::Data<HttpState>,
    user: Authenticated,
    path: web::Path<i32>,
) -> ApiResult<HttpResponse> {
    state
        .readings
        .delete(user.caller(), ReadingId::new(path.into_inner()))
        .await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new("Lectura eliminada correctamente")))
}

#[cfg(test)]
#[path = "readings_tests.rs"]
mod tests;
