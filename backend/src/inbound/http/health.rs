//! Service endpoints: banner, status reports and orchestration probes.
//!
//! ```text
//! GET /
//! GET /health
//! GET /health/ready
//! GET /health/live
//! GET /info
//! GET /status
//! GET /auth/test
//! ```
//!
//! None of these require a bearer token.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

use actix_web::{HttpResponse, get, http::header, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::inbound::http::state::HttpState;

const DESCRIPTION: &str = "API REST para sistema de topografía de construcción vial";
const RESOURCES: [&str; 5] = ["usuarios", "proyectos", "estaciones", "mediciones", "lecturas"];

/// Readiness and liveness flags shared with the server lifecycle.
pub struct HealthState {
    ready: AtomicBool,
    live: AtomicBool,
}

impl Default for HealthState {
    fn default() -> Self {
        Self {
            ready: AtomicBool::new(false),
            live: AtomicBool::new(true),
        }
    }
}

impl HealthState {
    /// Not ready, but live.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_ready(&self) {
        self.ready.store(true, Ordering::Release);
    }

    /// Fail liveness probes from now on, e.g. while draining.
    pub fn mark_unhealthy(&self) {
        self.live.store(false, Ordering::Release);
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    pub fn is_alive(&self) -> bool {
        self.live.load(Ordering::Acquire)
    }

    fn probe_response(probe_ok: bool) -> HttpResponse {
        let mut response = if probe_ok {
            HttpResponse::Ok()
        } else {
            HttpResponse::ServiceUnavailable()
        };

        response
            .insert_header((header::CACHE_CONTROL, "no-store"))
            .finish()
    }
}

/// Readiness probe: 200 once the server has finished wiring, 503 before.
#[utoipa::path(
    get,
    path = "/health/ready",
    tags = ["health"],
    security([]),
    responses(
        (status = 200, description = "Server is ready to handle traffic"),
        (status = 503, description = "Server is not ready")
    )
)]
#[get("/health/ready")]
pub async fn ready(state: web::Data<HealthState>) -> HttpResponse {
    HealthState::probe_response(state.is_ready())
}

/// Liveness probe: 200 while alive, 503 once marked unhealthy.
#[utoipa::path(
    get,
    path = "/health/live",
    tags = ["health"],
    security([]),
    responses(
        (status = 200, description = "Server is alive"),
        (status = 503, description = "Server is shutting down")
    )
)]
#[get("/health/live")]
pub async fn live(state: web::Data<HealthState>) -> HttpResponse {
    HealthState::probe_response(state.is_alive())
}

/// Body of `GET /`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BannerResponse {
    #[schema(example = "API Topografía funcionando correctamente")]
    pub message: String,
    pub version: String,
    #[schema(example = "ok")]
    pub status: String,
}

#[utoipa::path(
    get,
    path = "/",
    tags = ["health"],
    security([]),
    responses((status = 200, description = "Service banner", body = BannerResponse))
)]
#[get("/")]
pub async fn banner(state: web::Data<HttpState>) -> web::Json<BannerResponse> {
    web::Json(BannerResponse {
        message: format!("{} funcionando correctamente", state.info.app_name),
        version: state.info.version.to_owned(),
        status: "ok".to_owned(),
    })
}

/// Body of `GET /health`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    #[schema(example = "healthy")]
    pub status: String,
    /// Backing store: `postgres` or `in-memory`.
    pub database: String,
    pub timestamp: DateTime<Utc>,
}

#[utoipa::path(
    get,
    path = "/health",
    tags = ["health"],
    security([]),
    responses((status = 200, description = "Health summary", body = HealthResponse))
)]
#[get("/health")]
pub async fn health(state: web::Data<HttpState>) -> web::Json<HealthResponse> {
    web::Json(HealthResponse {
        status: "healthy".to_owned(),
        database: state.info.store.as_str().to_owned(),
        timestamp: Utc::now(),
    })
}

/// Body of `GET /info`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct InfoResponse {
    pub name: String,
    pub version: String,
    pub description: String,
    /// Resource name to mount path.
    pub endpoints: BTreeMap<String, String>,
    pub docs: Option<String>,
}

#[utoipa::path(
    get,
    path = "/info",
    tags = ["health"],
    security([]),
    responses((status = 200, description = "Service description", body = InfoResponse))
)]
#[get("/info")]
pub async fn info(state: web::Data<HttpState>) -> web::Json<InfoResponse> {
    let endpoints = RESOURCES
        .iter()
        .map(|name| ((*name).to_owned(), format!("/{name}")))
        .collect();
    web::Json(InfoResponse {
        name: state.info.app_name.clone(),
        version: state.info.version.to_owned(),
        description: DESCRIPTION.to_owned(),
        endpoints,
        docs: state.info.debug.then(|| "/docs".to_owned()),
    })
}

/// Body of `GET /status`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StatusResponse {
    #[schema(example = "online")]
    pub api: String,
    pub version: String,
    pub timestamp: DateTime<Utc>,
    #[schema(example = "bearer_jwt")]
    pub authentication: String,
    pub database: String,
    pub features: Vec<String>,
}

#[utoipa::path(
    get,
    path = "/status",
    tags = ["health"],
    security([]),
    responses((status = 200, description = "Detailed status", body = StatusResponse))
)]
#[get("/status")]
pub async fn status(state: web::Data<HttpState>) -> web::Json<StatusResponse> {
    let features = [
        "CRUD for every survey entity",
        "Bearer JWT authentication",
        "Per-owner project scoping",
        "Derived survey metrics",
        "Request validation",
    ];
    web::Json(StatusResponse {
        api: "online".to_owned(),
        version: state.info.version.to_owned(),
        timestamp: Utc::now(),
        authentication: "bearer_jwt".to_owned(),
        database: state.info.store.as_str().to_owned(),
        features: features.iter().map(|f| (*f).to_owned()).collect(),
    })
}

/// Body of `GET /auth/test`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuthHintResponse {
    pub message: String,
    pub auth_required_endpoints: Vec<String>,
    pub auth_method: String,
    pub header_format: String,
}

/// Describe how to authenticate against the protected resources.
#[utoipa::path(
    get,
    path = "/auth/test",
    tags = ["health"],
    security([]),
    responses((status = 200, description = "Authentication hint", body = AuthHintResponse))
)]
#[get("/auth/test")]
pub async fn auth_hint() -> web::Json<AuthHintResponse> {
    web::Json(AuthHintResponse {
        message: "Este endpoint es público - no requiere autenticación".to_owned(),
        auth_required_endpoints: RESOURCES.iter().map(|name| format!("/{name}/*")).collect(),
        auth_method: "Bearer token (JWT)".to_owned(),
        header_format: "Authorization: Bearer <token>".to_owned(),
    })
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::App;
    use actix_web::test as actix_test;
    use rstest::rstest;

    use super::*;
    use crate::test_support::http::test_state;

    #[rstest]
    #[case(false, StatusCode::SERVICE_UNAVAILABLE)]
    #[case(true, StatusCode::OK)]
    #[actix_web::test]
    async fn readiness_follows_the_flag(#[case] mark: bool, #[case] expected: StatusCode) {
        let health_state = web::Data::new(HealthState::new());
        if mark {
            health_state.mark_ready();
        }
        let app =
            actix_test::init_service(App::new().app_data(health_state).service(ready)).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri("/health/ready").to_request(),
        )
        .await;

        assert_eq!(res.status(), expected);
        assert_eq!(
            res.headers()
                .get(header::CACHE_CONTROL)
                .and_then(|v| v.to_str().ok()),
            Some("no-store")
        );
    }

    #[actix_web::test]
    async fn liveness_fails_once_unhealthy() {
        let health_state = web::Data::new(HealthState::new());
        health_state.mark_unhealthy();
        let app =
            actix_test::init_service(App::new().app_data(health_state).service(live)).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri("/health/live").to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[actix_web::test]
    async fn banner_and_status_describe_the_service() {
        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(test_state()))
                .service(banner)
                .service(status)
                .service(info),
        )
        .await;

        let banner_body: BannerResponse = actix_test::call_and_read_body_json(
            &app,
            actix_test::TestRequest::get().uri("/").to_request(),
        )
        .await;
        let status_body: StatusResponse = actix_test::call_and_read_body_json(
            &app,
            actix_test::TestRequest::get().uri("/status").to_request(),
        )
        .await;
        let info_body: InfoResponse = actix_test::call_and_read_body_json(
            &app,
            actix_test::TestRequest::get().uri("/info").to_request(),
        )
        .await;

        assert_eq!(
            banner_body.message,
            "API Topografía funcionando correctamente"
        );
        assert_eq!(banner_body.status, "ok");
        assert_eq!(status_body.database, "in-memory");
        assert_eq!(
            info_body.endpoints.get("lecturas").map(String::as_str),
            Some("/lecturas")
        );
        assert_eq!(info_body.docs, None);
    }
}
