//! Tests for station HTTP handlers.

use actix_web::http::StatusCode;
use actix_web::test as actix_test;
use serde_json::{Value, json};

use super::*;
use crate::inbound::http::test_utils::create_project;
use crate::test_support::http::{bearer, survey_app, test_state};
use crate::test_support::survey::dec;

#[actix_web::test]
async fn filter_by_project_orders_by_km() {
    let app = actix_test::init_service(survey_app(test_state())).await;
    let project = create_project(&app, "ana").await;
    create_project(&app, "ana").await;

    let stations: Vec<StationResponse> = actix_test::call_and_read_body_json(
        &app,
        actix_test::TestRequest::get()
            .uri(&format!("/estaciones?proyecto_id={}", project.id))
            .insert_header(bearer("ana"))
            .to_request(),
    )
    .await;

    let kms: Vec<Decimal> = stations.iter().map(|s| s.km).collect();
    assert_eq!(kms, vec![dec("0"), dec("5"), dec("10")]);
    assert!(stations.iter().all(|s| s.proyecto_id == project.id));
}

#[actix_web::test]
async fn duplicate_km_is_a_conflict_naming_the_km() {
    let app = actix_test::init_service(survey_app(test_state())).await;
    let project = create_project(&app, "ana").await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/estaciones")
            .insert_header(bearer("ana"))
            .set_json(json!({
                "proyecto_id": project.id,
                "km": 5,
                "pendiente_derecha": 0.02,
                "base_cl": 1886.14,
            }))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["code"], "conflict");
    assert!(body["message"].as_str().is_some_and(|m| m.contains('5')));
}

#[actix_web::test]
async fn update_recomputes_the_left_slope() {
    let app = actix_test::init_service(survey_app(test_state())).await;
    let project = create_project(&app, "ana").await;
    let stations: Vec<StationResponse> = actix_test::call_and_read_body_json(
        &app,
        actix_test::TestRequest::get()
            .uri(&format!("/proyectos/{}/estaciones", project.id))
            .insert_header(bearer("ana"))
            .to_request(),
    )
    .await;
    let first = stations.first().expect("generated station");

    let updated: StationResponse = actix_test::call_and_read_body_json(
        &app,
        actix_test::TestRequest::put()
            .uri(&format!("/estaciones/{}", first.id))
            .insert_header(bearer("ana"))
            .set_json(json!({ "pendiente_derecha": -0.035, "pendiente_izquierda": 9 }))
            .to_request(),
    )
    .await;

    assert_eq!(updated.pendiente_derecha, dec("-0.035"));
    assert_eq!(updated.pendiente_izquierda, dec("0.035"));
}

#[actix_web::test]
async fn delete_acknowledges_and_hides_from_others() {
    let app = actix_test::init_service(survey_app(test_state())).await;
    let project = create_project(&app, "ana").await;
    let stations: Vec<StationResponse> = actix_test::call_and_read_body_json(
        &app,
        actix_test::TestRequest::get()
            .uri(&format!("/proyectos/{}/estaciones", project.id))
            .insert_header(bearer("ana"))
            .to_request(),
    )
    .await;
    let uri = format!("/estaciones/{}", stations[0].id);

    let foreign = actix_test::call_service(
        &app,
        actix_test::TestRequest::delete()
            .uri(&uri)
            .insert_header(bearer("beto"))
            .to_request(),
    )
    .await;
    let deleted: MessageResponse = actix_test::call_and_read_body_json(
        &app,
        actix_test::TestRequest::delete()
            .uri(&uri)
            .insert_header(bearer("ana"))
            .to_request(),
    )
    .await;

    assert_eq!(foreign.status(), StatusCode::NOT_FOUND);
    assert_eq!(deleted.message, "Estación eliminada correctamente");
}
