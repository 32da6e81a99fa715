//! Tests for division reading HTTP handlers.

use actix_web::http::StatusCode;
use actix_web::test as actix_test;
use serde_json::{Value, json};

use super::*;
use crate::inbound::http::test_utils::{create_measurement, create_project};
use crate::test_support::http::{bearer, survey_app, test_state};
use crate::test_support::survey::dec;

fn reading(medicion_id: i32, division: Value, lectura: Value) -> Value {
    json!({
        "medicion_id": medicion_id,
        "division_transversal": division,
        "lectura_mira": lectura,
    })
}

#[actix_web::test]
async fn upsert_returns_metrics_and_ignores_client_metrics() {
    let app = actix_test::init_service(survey_app(test_state())).await;
    let project = create_project(&app, "ana").await;
    let measurement = create_measurement(&app, "ana", &project, "5").await;
    let mut body = reading(measurement.id, json!(0), json!(2.355));
    body["clasificacion"] = json!("CORTE");
    body["elv_base_real"] = json!(1);

    let stored: ReadingResponse = actix_test::call_and_read_body_json(
        &app,
        actix_test::TestRequest::post()
            .uri("/lecturas")
            .insert_header(bearer("ana"))
            .set_json(body)
            .to_request(),
    )
    .await;

    assert_eq!(stored.calidad, "BUENA");
    assert_eq!(stored.elv_base_real, Some(dec("1886.145")));
    assert_eq!(stored.elv_base_proyecto, Some(dec("1886.14")));
    assert_eq!(stored.elv_concreto_proyecto, Some(dec("1886.39")));
    assert_eq!(stored.esp_concreto_proyecto, Some(dec("0.245")));
    assert_eq!(stored.volumen_por_metro, Some(dec("0.3185")));
    assert_eq!(stored.clasificacion.as_deref(), Some("CUMPLE"));
    assert_eq!(stored.cumple_tolerancia, Some(true));
}

#[actix_web::test]
async fn decimals_cross_the_wire_as_exact_numbers() {
    let app = actix_test::init_service(survey_app(test_state())).await;
    let project = create_project(&app, "ana").await;
    let measurement = create_measurement(&app, "ana", &project, "5").await;

    let body: Value = actix_test::call_and_read_body_json(
        &app,
        actix_test::TestRequest::post()
            .uri("/lecturas")
            .insert_header(bearer("ana"))
            .set_json(reading(measurement.id, json!(0), json!(2.355)))
            .to_request(),
    )
    .await;

    for field in ["lectura_mira", "division_transversal", "elv_base_real"] {
        assert!(body[field].is_number(), "{field} should be a JSON number");
    }
    assert_eq!(body["lectura_mira"].to_string(), "2.355000");
    assert_eq!(dec(&body["elv_base_real"].to_string()), dec("1886.145"));
}

#[actix_web::test]
async fn second_post_at_the_same_division_overwrites() {
    let app = actix_test::init_service(survey_app(test_state())).await;
    let project = create_project(&app, "ana").await;
    let measurement = create_measurement(&app, "ana", &project, "5").await;

    let first: ReadingResponse = actix_test::call_and_read_body_json(
        &app,
        actix_test::TestRequest::post()
            .uri("/lecturas")
            .insert_header(bearer("ana"))
            .set_json(reading(measurement.id, json!(-3), json!(1.2)))
            .to_request(),
    )
    .await;
    let second: ReadingResponse = actix_test::call_and_read_body_json(
        &app,
        actix_test::TestRequest::post()
            .uri("/lecturas")
            .insert_header(bearer("ana"))
            .set_json(reading(measurement.id, json!(-3.0), json!(1.35)))
            .to_request(),
    )
    .await;
    let listed: Vec<ReadingResponse> = actix_test::call_and_read_body_json(
        &app,
        actix_test::TestRequest::get()
            .uri(&format!("/lecturas?medicion_id={}", measurement.id))
            .insert_header(bearer("ana"))
            .to_request(),
    )
    .await;

    assert_eq!(second.id, first.id);
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].lectura_mira, dec("1.35"));
}

#[actix_web::test]
async fn unknown_quality_is_rejected_with_the_field() {
    let app = actix_test::init_service(survey_app(test_state())).await;
    let project = create_project(&app, "ana").await;
    let measurement = create_measurement(&app, "ana", &project, "5").await;
    let mut body = reading(measurement.id, json!(0), json!(1.2));
    body["calidad"] = json!("PERFECTA");

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/lecturas")
            .insert_header(bearer("ana"))
            .set_json(body)
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["details"]["field"], "calidad");
}

#[actix_web::test]
async fn moving_onto_an_occupied_division_conflicts() {
    let app = actix_test::init_service(survey_app(test_state())).await;
    let project = create_project(&app, "ana").await;
    let measurement = create_measurement(&app, "ana", &project, "5").await;
    let mut ids = Vec::new();
    for division in [-3, 3] {
        let stored: ReadingResponse = actix_test::call_and_read_body_json(
            &app,
            actix_test::TestRequest::post()
                .uri("/lecturas")
                .insert_header(bearer("ana"))
                .set_json(reading(measurement.id, json!(division), json!(1.2)))
                .to_request(),
        )
        .await;
        ids.push(stored.id);
    }

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::put()
            .uri(&format!("/lecturas/{}", ids[1]))
            .insert_header(bearer("ana"))
            .set_json(json!({ "division_transversal": -3 }))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::CONFLICT);
}

#[actix_web::test]
async fn readings_under_foreign_measurements_are_not_found() {
    let app = actix_test::init_service(survey_app(test_state())).await;
    let project = create_project(&app, "ana").await;
    let measurement = create_measurement(&app, "ana", &project, "5").await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/lecturas")
            .insert_header(bearer("beto"))
            .set_json(reading(measurement.id, json!(0), json!(1.2)))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn malformed_body_is_a_bad_request() {
    let app = actix_test::init_service(survey_app(test_state())).await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/lecturas")
            .insert_header(bearer("ana"))
            .set_json(json!({ "medicion_id": "uno" }))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["details"]["code"], "malformed_body");
}
