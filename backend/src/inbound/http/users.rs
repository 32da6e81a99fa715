//! User profile HTTP handlers.
//!
//! ```text
//! GET    /usuarios/me
//! GET    /usuarios
//! POST   /usuarios
//! GET    /usuarios/{id}
//! PUT    /usuarios/{id}
//! PATCH  /usuarios/{id}
//! DELETE /usuarios/{id}
//! ```
//!
//! `/usuarios/me` must be registered before `/usuarios/{id}` so the literal
//! segment wins.

use actix_web::{HttpResponse, delete, get, patch, post, put, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::{Error, UserId, UserProfile, UserProfileDraft, UserProfilePatch};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::Authenticated;
use crate::inbound::http::dto::MessageResponse;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::PageQuery;

/// Request payload for registering the caller's profile.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct UserProfileCreateRequest {
    /// Must equal the subject of the bearer token.
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub id: String,
    #[schema(example = "ana@constructora.mx")]
    pub email: String,
    pub nombre_completo: String,
    pub empresa: Option<String>,
    pub organizacion: Option<String>,
}

/// Partial profile update.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct UserProfileUpdateRequest {
    pub nombre_completo: Option<String>,
    pub empresa: Option<String>,
    pub organizacion: Option<String>,
    pub activo: Option<bool>,
}

impl From<UserProfileUpdateRequest> for UserProfilePatch {
    fn from(value: UserProfileUpdateRequest) -> Self {
        Self {
            nombre_completo: value.nombre_completo,
            empresa: value.empresa,
            organizacion: value.organizacion,
            activo: value.activo,
        }
    }
}

/// Profile as returned to clients.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserProfileResponse {
    pub id: String,
    pub email: String,
    pub nombre_completo: String,
    pub empresa: Option<String>,
    pub organizacion: Option<String>,
    pub activo: bool,
    pub fecha_registro: DateTime<Utc>,
    pub fecha_actualizacion: DateTime<Utc>,
}

impl From<UserProfile> for UserProfileResponse {
    fn from(value: UserProfile) -> Self {
        Self {
            id: value.id.to_string(),
            email: value.email,
            nombre_completo: value.nombre_completo,
            empresa: value.empresa,
            organizacion: value.organizacion,
            activo: value.activo,
            fecha_registro: value.fecha_registro,
            fecha_actualizacion: value.fecha_actualizacion,
        }
    }
}

fn parse_user_id(raw: String) -> Result<UserId, Error> {
    UserId::new(raw.as_str()).map_err(|err| {
        Error::invalid_request(err.to_string()).with_details(json!({
            "field": "id",
            "value": raw,
            "code": "invalid_user_id",
        }))
    })
}

fn parse_create_request(payload: UserProfileCreateRequest) -> Result<UserProfileDraft, Error> {
    Ok(UserProfileDraft {
        id: parse_user_id(payload.id)?,
        email: payload.email,
        nombre_completo: payload.nombre_completo,
        empresa: payload.empresa,
        organizacion: payload.organizacion,
    })
}

/// Fetch the caller's profile, creating it from the token on first use.
#[utoipa::path(
    get,
    path = "/usuarios/me",
    responses(
        (status = 200, description = "Caller profile", body = UserProfileResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 503, description = "Store unavailable", body = ErrorSchema)
    ),
    tags = ["usuarios"],
    operation_id = "currentUser",
    security(("bearer" = []))
)]
#[get("/usuarios/me")]
pub async fn current_user(
    state: web::Data<HttpState>,
    user: Authenticated,
) -> ApiResult<web::Json<UserProfileResponse>> {
    let profile = state.profiles.current(user.caller()).await?;
    Ok(web::Json(profile.into()))
}

/// List registered profiles.
#[utoipa::path(
    get,
    path = "/usuarios",
    params(PageQuery),
    responses(
        (status = 200, description = "Profiles", body = [UserProfileResponse]),
        (status = 400, description = "Invalid paging", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["usuarios"],
    operation_id = "listUsers",
    security(("bearer" = []))
)]
#[get("/usuarios")]
pub async fn list_users(
    state: web::Data<HttpState>,
    user: Authenticated,
    query: web::Query<PageQuery>,
) -> ApiResult<web::Json<Vec<UserProfileResponse>>> {
    let page = query.into_inner().page()?;
    let profiles = state.profiles.list(user.caller(), page).await?;
    Ok(web::Json(
        profiles.into_iter().map(UserProfileResponse::from).collect(),
    ))
}

#[utoipa::path(
    get,
    path = "/usuarios/{id}",
    params(("id" = String, Path, description = "Identity provider subject")),
    responses(
        (status = 200, description = "Profile", body = UserProfileResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["usuarios"],
    operation_id = "getUser",
    security(("bearer" = []))
)]
#[get("/usuarios/{id}")]
pub async fn get_user(
    state: web::Data<HttpState>,
    user: Authenticated,
    path: web::Path<String>,
) -> ApiResult<web::Json<UserProfileResponse>> {
    let id = parse_user_id(path.into_inner())?;
    let profile = state.profiles.get(user.caller(), &id).await?;
    Ok(web::Json(profile.into()))
}

/// Register the caller's profile explicitly.
#[utoipa::path(
    post,
    path = "/usuarios",
    request_body = UserProfileCreateRequest,
    responses(
        (status = 200, description = "Created profile", body = UserProfileResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Profile belongs to another user", body = ErrorSchema),
        (status = 409, description = "Profile or email already registered", body = ErrorSchema)
    ),
    tags = ["usuarios"],
    operation_id = "createUser",
    security(("bearer" = []))
)]
#[post("/usuarios")]
pub async fn create_user(
    state: web::Data<HttpState>,
    user: Authenticated,
    payload: web::Json<UserProfileCreateRequest>,
) -> ApiResult<web::Json<UserProfileResponse>> {
    let draft = parse_create_request(payload.into_inner())?;
    let profile = state.profiles.create(user.caller(), draft).await?;
    Ok(web::Json(profile.into()))
}

async fn apply_update(
    state: &HttpState,
    user: &Authenticated,
    id: String,
    payload: UserProfileUpdateRequest,
) -> ApiResult<web::Json<UserProfileResponse>> {
    let id = parse_user_id(id)?;
    let profile = state
        .profiles
        .update(user.caller(), &id, payload.into())
        .await?;
    Ok(web::Json(profile.into()))
}

/// Update the caller's own profile.
#[utoipa::path(
    put,
    path = "/usuarios/{id}",
    params(("id" = String, Path, description = "Identity provider subject")),
    request_body = UserProfileUpdateRequest,
    responses(
        (status = 200, description = "Updated profile", body = UserProfileResponse),
        (status = 403, description = "Profile belongs to another user", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["usuarios"],
    operation_id = "updateUser",
    security(("bearer" = []))
)]
#[put("/usuarios/{id}")]
pub async fn update_user(
    state: web::Data<HttpState>,
    user: Authenticated,
    path: web::Path<String>,
    payload: web::Json<UserProfileUpdateRequest>,
) -> ApiResult<web::Json<UserProfileResponse>> {
    apply_update(&state, &user, path.into_inner(), payload.into_inner()).await
}

#[utoipa::path(
    patch,
    path = "/usuarios/{id}",
    params(("id" = String, Path, description = "Identity provider subject")),
    request_body = UserProfileUpdateRequest,
    responses(
        (status = 200, description = "Updated profile", body = UserProfileResponse),
        (status = 403, description = "Profile belongs to another user", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["usuarios"],
    operation_id = "patchUser",
    security(("bearer" = []))
)]
#[patch("/usuarios/{id}")]
pub async fn patch_user(
    state: web::Data<HttpState>,
    user: Authenticated,
    path: web::Path<String>,
    payload: web::Json<UserProfileUpdateRequest>,
) -> ApiResult<web::Json<UserProfileResponse>> {
    apply_update(&state, &user, path.into_inner(), payload.into_inner()).await
}

/// Deactivate the caller's own profile. The row is kept.
#[utoipa::path(
    delete,
    path = "/usuarios/{id}",
    params(("id" = String, Path, description = "Identity provider subject")),
    responses(
        (status = 200, description = "Profile deactivated", body = MessageResponse),
        (status = 403, description = "Profile belongs to another user", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["usuarios"],
    operation_id = "deactivateUser",
    security(("bearer" = []))
)]
#[delete("/usuarios/{id}")]
pub async fn deactivate_user(
    state: web::Data<HttpState>,
    user: Authenticated,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_user_id(path.into_inner())?;
    state.profiles.deactivate(user.caller(), &id).await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new("Usuario desactivado correctamente")))
}
