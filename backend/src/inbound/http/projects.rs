//! Project HTTP handlers.
//!
//! ```text
//! GET    /proyectos
//! POST   /proyectos
//! POST   /proyectos/completo
//! GET    /proyectos/{id}
//! PUT    /proyectos/{id}
//! PATCH  /proyectos/{id}
//! DELETE /proyectos/{id}
//! GET    /proyectos/{id}/estaciones
//! GET    /proyectos/{id}/mediciones
//! ```

use actix_web::{HttpResponse, delete, get, patch, post, put, web};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::survey::{GeometryInput, Project, ProjectDraft, ProjectId, ProjectPatch};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::Authenticated;
use crate::inbound::http::dto::MessageResponse;
use crate::inbound::http::measurements::MeasurementResponse;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::stations::StationResponse;
use crate::inbound::http::validation::PageQuery;

/// Request payload for creating a project.
///
/// Omitted geometry fields take their defaults. Derived fields such as
/// `longitud_proyecto` are ignored when sent.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct ProjectCreateRequest {
    #[schema(example = "Libramiento Norte")]
    pub nombre: String,
    pub tramo: Option<String>,
    /// Road body; defaults to `A`.
    pub cuerpo: Option<String>,
    pub km_inicial: Decimal,
    pub km_final: Decimal,
    /// Station spacing; defaults to 5.
    pub intervalo: Option<Decimal>,
    /// Design concrete thickness; defaults to 0.25.
    pub espesor: Option<Decimal>,
    /// Elevation tolerance; defaults to 0.005.
    pub tolerancia_sct: Option<Decimal>,
    pub divisiones_izquierdas: Option<Vec<Decimal>>,
    pub divisiones_derechas: Option<Vec<Decimal>>,
}

impl From<ProjectCreateRequest> for ProjectDraft {
    fn from(value: ProjectCreateRequest) -> Self {
        Self {
            nombre: value.nombre,
            tramo: value.tramo,
            cuerpo: value.cuerpo,
            geometry: GeometryInput {
                km_inicial: value.km_inicial,
                km_final: value.km_final,
                intervalo: value.intervalo,
                espesor: value.espesor,
                tolerancia_sct: value.tolerancia_sct,
                divisiones_izquierdas: value.divisiones_izquierdas,
                divisiones_derechas: value.divisiones_derechas,
            },
        }
    }
}

/// Request payload for `POST /proyectos/completo`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct ProjectCompleteRequest {
    pub nombre: String,
    pub tramo: Option<String>,
    pub cuerpo: Option<String>,
    pub km_inicial: Decimal,
    pub km_final: Decimal,
    pub intervalo: Option<Decimal>,
    pub espesor: Option<Decimal>,
    pub tolerancia_sct: Option<Decimal>,
    pub divisiones_izquierdas: Option<Vec<Decimal>>,
    pub divisiones_derechas: Option<Vec<Decimal>>,
    /// Generate a theoretical station every `intervalo`; defaults to true.
    pub generar_estaciones: Option<bool>,
}

impl ProjectCompleteRequest {
    fn into_parts(self) -> (ProjectDraft, bool) {
        let generate = self.generar_estaciones.unwrap_or(true);
        let draft = ProjectCreateRequest {
            nombre: self.nombre,
            tramo: self.tramo,
            cuerpo: self.cuerpo,
            km_inicial: self.km_inicial,
            km_final: self.km_final,
            intervalo: self.intervalo,
            espesor: self.espesor,
            tolerancia_sct: self.tolerancia_sct,
            divisiones_izquierdas: self.divisiones_izquierdas,
            divisiones_derechas: self.divisiones_derechas,
        };
        (draft.into(), generate)
    }
}

/// Partial project update; omitted fields are left unchanged.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct ProjectUpdateRequest {
    pub nombre: Option<String>,
    pub tramo: Option<String>,
    pub cuerpo: Option<String>,
    pub km_inicial: Option<Decimal>,
    pub km_final: Option<Decimal>,
    pub intervalo: Option<Decimal>,
    pub espesor: Option<Decimal>,
    pub tolerancia_sct: Option<Decimal>,
    pub divisiones_izquierdas: Option<Vec<Decimal>>,
    pub divisiones_derechas: Option<Vec<Decimal>>,
    #[schema(example = "EN_PROGRESO")]
    pub estado: Option<String>,
}

impl From<ProjectUpdateRequest> for ProjectPatch {
    fn from(value: ProjectUpdateRequest) -> Self {
        Self {
            nombre: value.nombre,
            tramo: value.tramo,
            cuerpo: value.cuerpo,
            km_inicial: value.km_inicial,
            km_final: value.km_final,
            intervalo: value.intervalo,
            espesor: value.espesor,
            tolerancia_sct: value.tolerancia_sct,
            divisiones_izquierdas: value.divisiones_izquierdas,
            divisiones_derechas: value.divisiones_derechas,
            estado: value.estado,
        }
    }
}

/// Project as returned to clients, including derived length and station
/// count.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProjectResponse {
    pub id: i32,
    pub usuario_id: String,
    pub nombre: String,
    pub tramo: Option<String>,
    pub cuerpo: Option<String>,
    pub km_inicial: Decimal,
    pub km_final: Decimal,
    pub intervalo: Decimal,
    pub espesor: Decimal,
    pub tolerancia_sct: Decimal,
    pub divisiones_izquierdas: Vec<Decimal>,
    pub divisiones_derechas: Vec<Decimal>,
    pub longitud_proyecto: Decimal,
    pub total_estaciones: u64,
    #[schema(example = "CONFIGURACION")]
    pub estado: String,
    pub fecha_creacion: DateTime<Utc>,
    pub fecha_modificacion: DateTime<Utc>,
}

impl From<Project> for ProjectResponse {
    fn from(value: Project) -> Self {
        let geometry = &value.geometry;
        Self {
            id: value.id.get(),
            usuario_id: value.owner.to_string(),
            km_inicial: geometry.km_inicial(),
            km_final: geometry.km_final(),
            intervalo: geometry.intervalo(),
            espesor: geometry.espesor(),
            tolerancia_sct: geometry.tolerancia_sct(),
            divisiones_izquierdas: geometry.divisions().left().to_vec(),
            divisiones_derechas: geometry.divisions().right().to_vec(),
            longitud_proyecto: geometry.longitud(),
            total_estaciones: geometry.total_estaciones(),
            estado: value.estado.as_str().to_owned(),
            nombre: value.nombre,
            tramo: value.tramo,
            cuerpo: value.cuerpo,
            fecha_creacion: value.fecha_creacion,
            fecha_modificacion: value.fecha_modificacion,
        }
    }
}

/// List the caller's projects.
#[utoipa::path(
    get,
    path = "/proyectos",
    params(PageQuery),
    responses(
        (status = 200, description = "Projects owned by the caller", body = [ProjectResponse]),
        (status = 400, description = "Invalid paging", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 503, description = "Store unavailable", body = ErrorSchema)
    ),
    tags = ["proyectos"],
    operation_id = "listProjects",
    security(("bearer" = []))
)]
#[get("/proyectos")]
pub async fn list_projects(
    state: web::Data<HttpState>,
    user: Authenticated,
    query: web::Query<PageQuery>,
) -> ApiResult<web::Json<Vec<ProjectResponse>>> {
    let page = query.into_inner().page()?;
    let projects = state.projects.list(user.caller(), page).await?;
    Ok(web::Json(
        projects.into_iter().map(ProjectResponse::from).collect(),
    ))
}

/// Fetch one of the caller's projects.
#[utoipa::path(
    get,
    path = "/proyectos/{id}",
    params(("id" = i32, Path, description = "Project identifier")),
    responses(
        (status = 200, description = "Project", body = ProjectResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["proyectos"],
    operation_id = "getProject",
    security(("bearer" = []))
)]
#[get("/proyectos/{id}")]
pub async fn get_project(
    state: web::Data<HttpState>,
    user: Authenticated,
    path: web::Path<i32>,
) -> ApiResult<web::Json<ProjectResponse>> {
    let id = ProjectId::new(path.into_inner());
    let project = state.projects.get(user.caller(), id).await?;
    Ok(web::Json(project.into()))
}

/// Create a project without generating stations.
#[utoipa::path(
    post,
    path = "/proyectos",
    request_body = ProjectCreateRequest,
    responses(
        (status = 200, description = "Created project", body = ProjectResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["proyectos"],
    operation_id = "createProject",
    security(("bearer" = []))
)]
#[post("/proyectos")]
pub async fn create_project(
    state: web::Data<HttpState>,
    user: Authenticated,
    payload: web::Json<ProjectCreateRequest>,
) -> ApiResult<web::Json<ProjectResponse>> {
    let project = state
        .projects
        .create(user.caller(), payload.into_inner().into(), false)
        .await?;
    Ok(web::Json(project.into()))
}

/// Create a project and, unless disabled, its theoretical stations.
///
/// Stations are stamped every `intervalo` from `km_inicial` with placeholder
/// slope and centreline base, in the same transaction as the project.
#[utoipa::path(
    post,
    path = "/proyectos/completo",
    request_body = ProjectCompleteRequest,
    responses(
        (status = 200, description = "Created project", body = ProjectResponse),
        (status = 400, description = "Invalid request or too many stations", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["proyectos"],
    operation_id = "createCompleteProject",
    security(("bearer" = []))
)]
#[post("/proyectos/completo")]
pub async fn create_complete_project(
    state: web::Data<HttpState>,
    user: Authenticated,
    payload: web::Json<ProjectCompleteRequest>,
) -> ApiResult<web::Json<ProjectResponse>> {
    let (draft, generate) = payload.into_inner().into_parts();
    let project = state
        .projects
        .create(user.caller(), draft, generate)
        .await?;
    Ok(web::Json(project.into()))
}

async fn apply_update(
    state: &HttpState,
    user: &Authenticated,
    id: i32,
    payload: ProjectUpdateRequest,
) -> ApiResult<web::Json<ProjectResponse>> {
    let project = state
        .projects
        .update(user.caller(), ProjectId::new(id), payload.into())
        .await?;
    Ok(web::Json(project.into()))
}

/// Update a project. The merged range and interval are re-validated.
#[utoipa::path(
    put,
    path = "/proyectos/{id}",
    params(("id" = i32, Path, description = "Project identifier")),
    request_body = ProjectUpdateRequest,
    responses(
        (status = 200, description = "Updated project", body = ProjectResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["proyectos"],
    operation_id = "updateProject",
    security(("bearer" = []))
)]
#[put("/proyectos/{id}")]
pub async fn update_project(
    state: web::Data<HttpState>,
    user: Authenticated,
    path: web::Path<i32>,
    payload: web::Json<ProjectUpdateRequest>,
) -> ApiResult<web::Json<ProjectResponse>> {
    apply_update(&state, &user, path.into_inner(), payload.into_inner()).await
}

/// Partially update a project; same semantics as `PUT`.
#[utoipa::path(
    patch,
    path = "/proyectos/{id}",
    params(("id" = i32, Path, description = "Project identifier")),
    request_body = ProjectUpdateRequest,
    responses(
        (status = 200, description = "Updated project", body = ProjectResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["proyectos"],
    operation_id = "patchProject",
    security(("bearer" = []))
)]
#[patch("/proyectos/{id}")]
pub async fn patch_project(
    state: web::Data<HttpState>,
    user: Authenticated,
    path: web::Path<i32>,
    payload: web::Json<ProjectUpdateRequest>,
) -> ApiResult<web::Json<ProjectResponse>> {
    apply_update(&state, &user, path.into_inner(), payload.into_inner()).await
}

/// Delete a project with its stations, measurements and readings.
#[utoipa::path(
    delete,
    path = "/proyectos/{id}",
    params(("id" = i32, Path, description = "Project identifier")),
    responses(
        (status = 200, description = "Project deleted", body = MessageResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["proyectos"],
    operation_id = "deleteProject",
    security(("bearer" = []))
)]
#[delete("/proyectos/{id}")]
pub async fn delete_project(
    state: web::Data<HttpState>,
    user: Authenticated,
    path: web::Path<i32>,
) -> ApiResult<HttpResponse> {
    state
        .projects
        .delete(user.caller(), ProjectId::new(path.into_inner()))
        .await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new("Proyecto eliminado correctamente")))
}

/// Stations of a project ordered by km.
#[utoipa::path(
    get,
    path = "/proyectos/{id}/estaciones",
    params(("id" = i32, Path, description = "Project identifier"), PageQuery),
    responses(
        (status = 200, description = "Stations", body = [StationResponse]),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["proyectos"],
    operation_id = "listProjectStations",
    security(("bearer" = []))
)]
#[get("/proyectos/{id}/estaciones")]
pub async fn list_project_stations(
    state: web::Data<HttpState>,
    user: Authenticated,
    path: web::Path<i32>,
    query: web::Query<PageQuery>,
) -> ApiResult<web::Json<Vec<StationResponse>>> {
    let page = query.into_inner().page()?;
    let stations = state
        .stations
        .list_for_project(user.caller(), ProjectId::new(path.into_inner()), page)
        .await?;
    Ok(web::Json(
        stations.into_iter().map(StationResponse::from).collect(),
    ))
}

/// Measurements of a project ordered by station km.
#[utoipa::path(
    get,
    path = "/proyectos/{id}/mediciones",
    params(("id" = i32, Path, description = "Project identifier"), PageQuery),
    responses(
        (status = 200, description = "Measurements", body = [MeasurementResponse]),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["proyectos"],
    operation_id = "listProjectMeasurements",
    security(("bearer" = []))
)]
#[get("/proyectos/{id}/mediciones")]
pub async fn list_project_measurements(
    state: web::Data<HttpState>,
    user: Authenticated,
    path: web::Path<i32>,
    query: web::Query<PageQuery>,
) -> ApiResult<web::Json<Vec<MeasurementResponse>>> {
    let page = query.into_inner().page()?;
    let measurements = state
        .measurements
        .list_for_project(user.caller(), ProjectId::new(path.into_inner()), page)
        .await?;
    Ok(web::Json(
        measurements
            .into_iter()
            .map(MeasurementResponse::from)
            .collect(),
    ))
}

#[cfg(test)]
#[path = "projects_tests.rs"]
mod tests;
