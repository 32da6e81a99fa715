//! HTTP inbound adapter exposing the survey REST endpoints.

use actix_web::web;

pub mod auth;
pub mod dto;
pub mod error;
pub mod health;
pub mod measurements;
pub mod projects;
pub mod readings;
pub mod schemas;
pub mod state;
pub mod stations;
#[cfg(test)]
pub mod test_utils;
pub mod users;
pub mod validation;

pub use error::ApiResult;

/// Register every authenticated resource handler.
///
/// Literal segments (`/usuarios/me`, `/proyectos/completo`) are registered
/// ahead of their `{id}` siblings.
pub fn configure_resources(cfg: &mut web::ServiceConfig) {
    cfg.service(users::current_user)
        .service(users::list_users)
        .service(users::create_user)
        .service(users::get_user)
        .service(users::update_user)
        .service(users::patch_user)
        .service(users::deactivate_user)
        .service(projects::list_projects)
        .service(projects::create_project)
        .service(projects::create_complete_project)
        .service(projects::get_project)
        .service(projects::update_project)
        .service(projects::patch_project)
        .service(projects::delete_project)
        .service(projects::list_project_stations)
        .service(projects::list_project_measurements)
        .service(stations::list_stations)
        .service(stations::create_station)
        .service(stations::get_station)
        .service(stations::update_station)
        .service(stations::patch_station)
        .service(stations::delete_station)
        .service(measurements::list_measurements)
        .service(measurements::create_measurement)
        .service(measurements::get_measurement)
        .service(measurements::update_measurement)
        .service(measurements::patch_measurement)
        .service(measurements::delete_measurement)
        .service(measurements::list_measurement_readings)
        .service(readings::list_readings)
        .service(readings::upsert_reading)
        .service(readings::get_reading)
        .service(readings::update_reading)
        .service(readings::patch_reading)
        .service(readings::delete_reading);
}

/// Register the unauthenticated service endpoints.
///
/// The probes additionally need `web::Data<HealthState>`.
pub fn configure_service_endpoints(cfg: &mut web::ServiceConfig) {
    cfg.service(health::banner)
        .service(health::health)
        .service(health::ready)
        .service(health::live)
        .service(health::info)
        .service(health::status)
        .service(health::auth_hint);
}
