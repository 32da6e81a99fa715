//! Tests for measurement HTTP handlers.

use actix_web::http::StatusCode;
use actix_web::test as actix_test;
use rstest::rstest;
use serde_json::{Value, json};

use super::*;
use crate::inbound::http::test_utils::{create_measurement, create_project};
use crate::test_support::http::{bearer, survey_app, test_state};
use crate::test_support::survey::dec;

#[actix_web::test]
async fn created_measurement_reports_instrument_height() {
    let app = actix_test::init_service(survey_app(test_state())).await;
    let project = create_project(&app, "ana").await;

    let measurement = create_measurement(&app, "ana", &project, "5").await;

    assert_eq!(measurement.altura_aparato, Some(dec("1888.5")));
    assert_eq!(measurement.operador.as_deref(), Some("Brigada 2"));
    assert_eq!(measurement.proyecto_id, project.id);
}

#[actix_web::test]
async fn partial_benchmark_leaves_instrument_height_unset() {
    let app = actix_test::init_service(survey_app(test_state())).await;
    let project = create_project(&app, "ana").await;

    let measurement: MeasurementResponse = actix_test::call_and_read_body_json(
        &app,
        actix_test::TestRequest::post()
            .uri("/mediciones")
            .insert_header(bearer("ana"))
            .set_json(json!({
                "proyecto_id": project.id,
                "estacion_km": 5,
                "bn_altura": 1887.125,
                "fecha_medicion": "2024-03-01",
            }))
            .to_request(),
    )
    .await;

    assert_eq!(measurement.altura_aparato, None);
    assert_eq!(measurement.fecha_medicion.to_string(), "2024-03-01");
}

#[rstest]
#[case(json!({ "estacion_km": 5 }), StatusCode::CONFLICT)]
#[case(json!({ "estacion_km": 11 }), StatusCode::BAD_REQUEST)]
#[case(json!({ "bn_lectura": -1 }), StatusCode::BAD_REQUEST)]
#[actix_web::test]
async fn updates_are_validated(#[case] patch: Value, #[case] expected: StatusCode) {
    let app = actix_test::init_service(survey_app(test_state())).await;
    let project = create_project(&app, "ana").await;
    create_measurement(&app, "ana", &project, "5").await;
    let second = create_measurement(&app, "ana", &project, "10").await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::patch()
            .uri(&format!("/mediciones/{}", second.id))
            .insert_header(bearer("ana"))
            .set_json(patch)
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), expected);
}

#[actix_web::test]
async fn readings_of_a_measurement_are_listed_with_metrics() {
    let app = actix_test::init_service(survey_app(test_state())).await;
    let project = create_project(&app, "ana").await;
    let measurement = create_measurement(&app, "ana", &project, "5").await;
    for (division, lectura) in [(3, 2.355), (0, 2.355)] {
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/lecturas")
                .insert_header(bearer("ana"))
                .set_json(json!({
                    "medicion_id": measurement.id,
                    "division_transversal": division,
                    "lectura_mira": lectura,
                }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
    }

    let readings: Vec<ReadingResponse> = actix_test::call_and_read_body_json(
        &app,
        actix_test::TestRequest::get()
            .uri(&format!("/mediciones/{}/lecturas", measurement.id))
            .insert_header(bearer("ana"))
            .to_request(),
    )
    .await;

    let divisions: Vec<Decimal> = readings.iter().map(|r| r.division_transversal).collect();
    assert_eq!(divisions, vec![dec("0"), dec("3")]);
    assert_eq!(readings[0].clasificacion.as_deref(), Some("CUMPLE"));
    assert_eq!(readings[1].clasificacion.as_deref(), Some("TERRAPLEN"));
}

#[actix_web::test]
async fn delete_cascades_to_readings() {
    let app = actix_test::init_service(survey_app(test_state())).await;
    let project = create_project(&app, "ana").await;
    let measurement = create_measurement(&app, "ana", &project, "5").await;
    let reading: ReadingResponse = actix_test::call_and_read_body_json(
        &app,
        actix_test::TestRequest::post()
            .uri("/lecturas")
            .insert_header(bearer("ana"))
            .set_json(json!({
                "medicion_id": measurement.id,
                "division_transversal": 0,
                "lectura_mira": 1.2,
            }))
            .to_request(),
    )
    .await;

    let deleted: MessageResponse = actix_test::call_and_read_body_json(
        &app,
        actix_test::TestRequest::delete()
            .uri(&format!("/mediciones/{}", measurement.id))
            .insert_header(bearer("ana"))
            .to_request(),
    )
    .await;
    let orphan = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri(&format!("/lecturas/{}", reading.id))
            .insert_header(bearer("ana"))
            .to_request(),
    )
    .await;

    assert_eq!(deleted.message, "Medición eliminada correctamente");
    assert_eq!(orphan.status(), StatusCode::NOT_FOUND);
}
