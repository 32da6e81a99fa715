//! Theoretical station HTTP handlers.
//!
//! ```text
//! GET    /estaciones?proyecto_id=
//! POST   /estaciones
//! GET    /estaciones/{id}
//! PUT    /estaciones/{id}
//! PATCH  /estaciones/{id}
//! DELETE /estaciones/{id}
//! ```

use actix_web::{HttpResponse, delete, get, patch, post, put, web};
use chrono::{DateTime, Utc};
use pagination::PageParams;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::Error;
use crate::domain::survey::{ProjectId, Station, StationDraft, StationId, StationPatch};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::Authenticated;
use crate::inbound::http::dto::MessageResponse;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::PageQuery;

/// Query for `GET /estaciones`.
#[derive(Debug, Default, Clone, Copy, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct StationListQuery {
    /// Restrict to one project.
    pub proyecto_id: Option<i32>,
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

impl StationListQuery {
    fn page(self) -> Result<PageParams, Error> {
        PageQuery {
            skip: self.skip,
            limit: self.limit,
        }
        .page()
    }
}

/// Request payload for creating a station. The left slope is derived and
/// ignored when sent.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct StationCreateRequest {
    pub proyecto_id: i32,
    pub km: Decimal,
    pub pendiente_derecha: Decimal,
    pub base_cl: Decimal,
    pub observaciones: Option<String>,
}

impl From<StationCreateRequest> for StationDraft {
    fn from(value: StationCreateRequest) -> Self {
        Self {
            proyecto_id: ProjectId::new(value.proyecto_id),
            km: value.km,
            pendiente_derecha: value.pendiente_derecha,
            base_cl: value.base_cl,
            observaciones: value.observaciones,
        }
    }
}

/// Partial station update.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct StationUpdateRequest {
    pub km: Option<Decimal>,
    pub pendiente_derecha: Option<Decimal>,
    pub base_cl: Option<Decimal>,
    pub observaciones: Option<String>,
}

impl From<StationUpdateRequest> for StationPatch {
    fn from(value: StationUpdateRequest) -> Self {
        Self {
            km: value.km,
            pendiente_derecha: value.pendiente_derecha,
            base_cl: value.base_cl,
            observaciones: value.observaciones,
        }
    }
}

/// Station as returned to clients.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StationResponse {
    pub id: i32,
    pub proyecto_id: i32,
    pub km: Decimal,
    pub pendiente_derecha: Decimal,
    /// Always the negated right slope.
    pub pendiente_izquierda: Decimal,
    pub base_cl: Decimal,
    pub observaciones: Option<String>,
    pub fecha_captura: DateTime<Utc>,
}

impl From<Station> for StationResponse {
    fn from(value: Station) -> Self {
        Self {
            id: value.id.get(),
            proyecto_id: value.proyecto_id.get(),
            km: value.km,
            pendiente_derecha: value.pendiente_derecha,
            pendiente_izquierda: value.pendiente_izquierda(),
            base_cl: value.base_cl,
            observaciones: value.observaciones,
            fecha_captura: value.fecha_captura,
        }
    }
}

/// List stations of the caller's projects ordered by km.
#[utoipa::path(
    get,
    path = "/estaciones",
    params(StationListQuery),
    responses(
        (status = 200, description = "Stations", body = [StationResponse]),
        (status = 400, description = "Invalid query", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["estaciones"],
    operation_id = "listStations",
    security(("bearer" = []))
)]
#[get("/estaciones")]
pub async fn list_stations(
    state: web::Data<HttpState>,
    user: Authenticated,
    query: web::Query<StationListQuery>,
) -> ApiResult<web::Json<Vec<StationResponse>>> {
    let query = query.into_inner();
    let page = query.page()?;
    let stations = state
        .stations
        .list(user.caller(), query.proyecto_id.map(ProjectId::new), page)
        .await?;
    Ok(web::Json(
        stations.into_iter().map(StationResponse::from).collect(),
    ))
}

#[utoipa::path(
    get,
    path = "/estaciones/{id}",
    params(("id" = i32, Path, description = "Station identifier")),
    responses(
        (status = 200, description = "Station", body = StationResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["estaciones"],
    operation_id = "getStation",
    security(("bearer" = []))
)]
#[get("/estaciones/{id}")]
pub async fn get_station(
    state: web::Data<HttpState>,
    user: Authenticated,
    path: web::Path<i32>,
) -> ApiResult<web::Json<StationResponse>> {
    let station = state
        .stations
        .get(user.caller(), StationId::new(path.into_inner()))
        .await?;
    Ok(web::Json(station.into()))
}

/// Create a station inside the project's km range.
#[utoipa::path(
    post,
    path = "/estaciones",
    request_body = StationCreateRequest,
    responses(
        (status = 200, description = "Created station", body = StationResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Project not found", body = ErrorSchema),
        (status = 409, description = "Station already exists at this km", body = ErrorSchema)
    ),
    tags = ["estaciones"],
    operation_id = "createStation",
    security(("bearer" = []))
)]
#[post("/estaciones")]
pub async fn create_station(
    state: web::Data<HttpState>,
    user: Authenticated,
    payload: web::Json<StationCreateRequest>,
) -> ApiResult<web::Json<StationResponse>> {
    let station = state
        .stations
        .create(user.caller(), payload.into_inner().into())
        .await?;
    Ok(web::Json(station.into()))
}

async fn apply_update(
    state: &HttpState,
    user: &Authenticated,
    id: i32,
    payload: StationUpdateRequest,
) -> ApiResult<web::Json<StationResponse>> {
    let station = state
        .stations
        .update(user.caller(), StationId::new(id), payload.into())
        .await?;
    Ok(web::Json(station.into()))
}

#[utoipa::path(
    put,
    path = "/estaciones/{id}",
    params(("id" = i32, Path, description = "Station identifier")),
    request_body = StationUpdateRequest,
    responses(
        (status = 200, description = "Updated station", body = StationResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 409, description = "Station already exists at this km", body = ErrorSchema)
    ),
    tags = ["estaciones"],
    operation_id = "updateStation",
    security(("bearer" = []))
)]
#[put("/estaciones/{id}")]
pub async fn update_station(
    state: web::Data<HttpState>,
    user: Authenticated,
    path: web::Path<i32>,
    payload: web::Json<StationUpdateRequest>,
) -> ApiResult<web::Json<StationResponse>> {
    apply_update(&state, &user, path.into_inner(), payload.into_inner()).await
}

#[utoipa::path(
    patch,
    path = "/estaciones/{id}",
    params(("id" = i32, Path, description = "Station identifier")),
    request_body = StationUpdateRequest,
    responses(
        (status = 200, description = "Updated station", body = StationResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 409, description = "Station already exists at this km", body = ErrorSchema)
    ),
    tags = ["estaciones"],
    operation_id = "patchStation",
    security(("bearer" = []))
)]
#[patch("/estaciones/{id}")]
pub async fn patch_station(
    state: web::Data<HttpState>,
    user: Authenticated,
    path: web::Path<i32>,
    payload: web::Json<StationUpdateRequest>,
) -> ApiResult<web::Json<StationResponse>> {
    apply_update(&state, &user, path.into_inner(), payload.into_inner()).await
}

#[utoipa::path(
    delete,
    path = "/estaciones/{id}",
    params(("id" = i32, Path, description = "Station identifier")),
    responses(
        (status = 200, description = "Station deleted", body = MessageResponse),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["estaciones"],
    operation_id = "deleteStation",
    security(("bearer" = []))
)]
#[delete("/estaciones/{id}")]
pub async fn delete_station(
    state: web::Data<HttpState>,
    user: Authenticated,
    path: web::Path<i32>,
) -> ApiResult<HttpResponse> {
    state
        .stations
        .delete(user.caller(), StationId::new(path.into_inner()))
        .await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new("Estación eliminada correctamente")))
}

#[cfg(test)]
#[path = "stations_tests.rs"]
mod tests;
