//! Test helpers for inbound HTTP components.
//!
//! Each helper drives the public routes so handler tests build their
//! fixtures the way a client would.

use actix_web::dev::{Service, ServiceResponse};
use actix_web::test as actix_test;
use serde_json::json;

use crate::inbound::http::measurements::MeasurementResponse;
use crate::inbound::http::projects::ProjectResponse;
use crate::test_support::http::bearer;

/// Create a km 0 to 10 project with a station every 5 km for `sub`.
pub async fn create_project<S>(app: &S, sub: &str) -> ProjectResponse
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    actix_test::call_and_read_body_json(
        app,
        actix_test::TestRequest::post()
            .uri("/proyectos/completo")
            .insert_header(bearer(sub))
            .set_json(json!({
                "nombre": "Libramiento Norte",
                "km_inicial": 0,
                "km_final": 10,
            }))
            .to_request(),
    )
    .await
}

/// Record a measurement at `km` with benchmark 1887.125 read at 1.375.
pub async fn create_measurement<S>(
    app: &S,
    sub: &str,
    project: &ProjectResponse,
    km: &str,
) -> MeasurementResponse
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let km: serde_json::Value =
        serde_json::from_str(km).unwrap_or_else(|err| panic!("km literal {km:?}: {err}"));
    actix_test::call_and_read_body_json(
        app,
        actix_test::TestRequest::post()
            .uri("/mediciones")
            .insert_header(bearer(sub))
            .set_json(json!({
                "proyecto_id": project.id,
                "estacion_km": km,
                "bn_altura": 1887.125,
                "bn_lectura": 1.375,
                "operador": "Brigada 2",
            }))
            .to_request(),
    )
    .await
}
