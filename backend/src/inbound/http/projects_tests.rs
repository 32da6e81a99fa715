//! Tests for project HTTP handlers.

use actix_web::http::StatusCode;
use actix_web::test as actix_test;
use rstest::rstest;
use serde_json::{Value, json};

use super::*;
use crate::test_support::http::{bearer, survey_app, test_state};
use crate::test_support::survey::dec;

fn libramiento() -> Value {
    json!({
        "nombre": "Libramiento Norte",
        "tramo": "Tramo 1",
        "km_inicial": 0,
        "km_final": 10,
    })
}

#[actix_web::test]
async fn create_reports_derived_length_and_station_count() {
    let app = actix_test::init_service(survey_app(test_state())).await;

    let created: ProjectResponse = actix_test::call_and_read_body_json(
        &app,
        actix_test::TestRequest::post()
            .uri("/proyectos")
            .insert_header(bearer("ana"))
            .set_json(libramiento())
            .to_request(),
    )
    .await;

    assert_eq!(created.usuario_id, "ana");
    assert_eq!(created.cuerpo.as_deref(), Some("A"));
    assert_eq!(created.estado, "CONFIGURACION");
    assert_eq!(created.longitud_proyecto, dec("10"));
    assert_eq!(created.total_estaciones, 3);
    assert_eq!(created.intervalo, dec("5"));
    assert_eq!(created.divisiones_derechas.first(), Some(&dec("1.3")));
}

#[rstest]
#[case(None, 3)]
#[case(Some(true), 3)]
#[case(Some(false), 0)]
#[actix_web::test]
async fn complete_creation_generates_stations_unless_disabled(
    #[case] generar: Option<bool>,
    #[case] expected: usize,
) {
    let app = actix_test::init_service(survey_app(test_state())).await;
    let mut body = libramiento();
    if let Some(flag) = generar {
        body["generar_estaciones"] = json!(flag);
    }

    let created: ProjectResponse = actix_test::call_and_read_body_json(
        &app,
        actix_test::TestRequest::post()
            .uri("/proyectos/completo")
            .insert_header(bearer("ana"))
            .set_json(body)
            .to_request(),
    )
    .await;
    let stations: Vec<StationResponse> = actix_test::call_and_read_body_json(
        &app,
        actix_test::TestRequest::get()
            .uri(&format!("/proyectos/{}/estaciones", created.id))
            .insert_header(bearer("ana"))
            .to_request(),
    )
    .await;

    assert_eq!(stations.len(), expected);
    if let Some(first) = stations.first() {
        assert_eq!(first.km, dec("0"));
        assert_eq!(first.pendiente_izquierda, -first.pendiente_derecha);
    }
}

#[actix_web::test]
async fn requests_without_a_token_are_unauthorised() {
    let app = actix_test::init_service(survey_app(test_state())).await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::get().uri("/proyectos").to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["code"], "unauthorized");
}

#[actix_web::test]
async fn inverted_range_is_a_bad_request() {
    let app = actix_test::init_service(survey_app(test_state())).await;
    let mut body = libramiento();
    body["km_inicial"] = json!(12);

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/proyectos")
            .insert_header(bearer("ana"))
            .set_json(body)
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["code"], "invalid_request");
}

#[actix_web::test]
async fn other_users_see_not_found() {
    let app = actix_test::init_service(survey_app(test_state())).await;
    let created: ProjectResponse = actix_test::call_and_read_body_json(
        &app,
        actix_test::TestRequest::post()
            .uri("/proyectos")
            .insert_header(bearer("ana"))
            .set_json(libramiento())
            .to_request(),
    )
    .await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri(&format!("/proyectos/{}", created.id))
            .insert_header(bearer("beto"))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn patch_changes_state_and_delete_acknowledges() {
    let app = actix_test::init_service(survey_app(test_state())).await;
    let created: ProjectResponse = actix_test::call_and_read_body_json(
        &app,
        actix_test::TestRequest::post()
            .uri("/proyectos")
            .insert_header(bearer("ana"))
            .set_json(libramiento())
            .to_request(),
    )
    .await;
    let uri = format!("/proyectos/{}", created.id);

    let patched: ProjectResponse = actix_test::call_and_read_body_json(
        &app,
        actix_test::TestRequest::patch()
            .uri(&uri)
            .insert_header(bearer("ana"))
            .set_json(json!({ "estado": "EN_PROGRESO" }))
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
    let gone = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri(&uri)
            .insert_header(bearer("ana"))
            .to_request(),
    )
    .await;

    assert_eq!(patched.estado, "EN_PROGRESO");
    assert_eq!(patched.nombre, "Libramiento Norte");
    assert_eq!(deleted.message, "Proyecto eliminado correctamente");
    assert_eq!(gone.status(), StatusCode::NOT_FOUND);
}

#[rstest]
#[case("/proyectos/abc")]
#[case("/proyectos?limit=0")]
#[case("/proyectos?skip=-1")]
#[actix_web::test]
async fn malformed_paths_and_pages_are_bad_requests(#[case] uri: &str) {
    let app = actix_test::init_service(survey_app(test_state())).await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri(uri)
            .insert_header(bearer("ana"))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}
