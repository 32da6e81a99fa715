//! OpenAPI documentation configuration.
//!
//! This module defines the [`ApiDoc`] struct which generates the OpenAPI
//! specification for the REST API. It registers:
//!
//! - **Paths**: every HTTP endpoint from the inbound layer
//! - **Schemas**: request and response DTOs plus the error envelope wrappers
//!   ([`ErrorSchema`], [`ErrorCodeSchema`]) that keep domain types free of
//!   utoipa
//! - **Security**: bearer JWT issued by the identity provider
//!
//! The generated specification backs Swagger UI (debug mode) and is exported
//! via `cargo run --bin openapi-dump` for external tooling.

use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the bearer security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .description(Some(
                        "HS256 access token issued by the identity provider.",
                    ))
                    .build(),
            ),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "API Topografía",
        description = "Road-construction survey projects, stations, field measurements and readings."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::users::current_user,
        crate::inbound::http::users::list_users,
        crate::inbound::http::users::get_user,
        crate::inbound::http::users::create_user,
        crate::inbound::http::users::update_user,
        crate::inbound::http::users::patch_user,
        crate::inbound::http::users::deactivate_user,
        crate::inbound::http::projects::list_projects,
        crate::inbound::http::projects::get_project,
        crate::inbound::http::projects::create_project,
        crate::inbound::http::projects::create_complete_project,
        crate::inbound::http::projects::update_project,
        crate::inbound::http::projects::patch_project,
        crate::inbound::http::projects::delete_project,
        crate::inbound::http::projects::list_project_stations,
        crate::inbound::http::projects::list_project_measurements,
        crate::inbound::http::stations::list_stations,
        crate::inbound::http::stations::get_station,
        crate::inbound::http::stations::create_station,
        crate::inbound::http::stations::update_station,
        crate::inbound::http::stations::patch_station,
        crate::inbound::http::stations::delete_station,
        crate::inbound::http::measurements::list_measurements,
        crate::inbound::http::measurements::get_measurement,
        crate::inbound::http::measurements::create_measurement,
        crate::inbound::http::measurements::update_measurement,
        crate::inbound::http::measurements::patch_measurement,
        crate::inbound::http::measurements::delete_measurement,
        crate::inbound::http::measurements::list_measurement_readings,
        crate::inbound::http::readings::list_readings,
        crate::inbound::http::readings::get_reading,
        crate::inbound::http::readings::upsert_reading,
        crate::inbound::http::readings::update_reading,
        crate::inbound::http::readings::patch_reading,
        crate::inbound::http::readings::delete_reading,
        crate::inbound::http::health::banner,
        crate::inbound::http::health::health,
        crate::inbound::http::health::info,
        crate::inbound::http::health::status,
        crate::inbound::http::health::auth_hint,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(ErrorSchema, ErrorCodeSchema)),
    tags(
        (name = "usuarios", description = "User profiles mirrored from the identity provider"),
        (name = "proyectos", description = "Survey projects and their geometry"),
        (name = "estaciones", description = "Theoretical stations along a project"),
        (name = "mediciones", description = "Field measurements taken at a station"),
        (name = "lecturas", description = "Division readings and their quality metrics"),
        (name = "health", description = "Service banner, status and probes")
    )
)]
pub struct ApiDoc;
