//! Tests for the reading service.
//!
//! The fixture project spans km 0 to 10 with generated stations every 5 km,
//! each carrying the placeholder slope 0.02 and centreline base 1886.14.

use std::sync::Arc;

use rstest::{fixture, rstest};

use super::*;
use crate::domain::ports::{
    MeasurementService, MockReadingRepository, ProjectService, ReadingRepositoryError,
};
use crate::domain::survey::engine::Classification;
use crate::domain::survey::{MeasurementDraft, QualityTag};
use crate::domain::{ErrorCode, SurveyMeasurementService, SurveyProjectService};
use crate::test_support::survey::{caller, dec, in_memory_repositories, project_draft};

struct Harness {
    repos: SurveyRepositories,
    service: SurveyReadingService,
    measurement: Measurement,
}

async fn measurement_at(repos: &SurveyRepositories, project: &Project, km: &str) -> Measurement {
    SurveyMeasurementService::new(repos.clone())
        .create(
            &caller("ana"),
            MeasurementDraft {
                proyecto_id: project.id,
                estacion_km: dec(km),
                bn_altura: Some(dec("1887.125")),
                bn_lectura: Some(dec("1.375")),
                fecha_medicion: None,
                operador: None,
                condiciones_clima: None,
                observaciones: None,
            },
        )
        .await
        .expect("measurement")
}

#[fixture]
async fn harness() -> Harness {
    let repos = in_memory_repositories();
    let project = SurveyProjectService::new(repos.clone())
        .create(&caller("ana"), project_draft("Libramiento", "0", "10"), true)
        .await
        .expect("project");
    let measurement = measurement_at(&repos, &project, "5").await;
    Harness {
        service: SurveyReadingService::new(repos.clone()),
        repos,
        measurement,
    }
}

fn draft(measurement: &Measurement, division: &str, lectura: &str) -> ReadingDraft {
    ReadingDraft {
        medicion_id: measurement.id,
        division_transversal: dec(division),
        lectura_mira: dec(lectura),
        calidad: None,
    }
}

#[rstest]
#[tokio::test]
async fn creating_twice_at_one_division_keeps_the_last_reading(#[future] harness: Harness) {
    let Harness {
        service,
        measurement,
        ..
    } = harness.await;
    let ana = caller("ana");

    let first = service
        .upsert(&ana, draft(&measurement, "3.0", "1.200"))
        .await
        .expect("first");
    let second = service
        .upsert(&ana, draft(&measurement, "3.0", "1.350"))
        .await
        .expect("second");
    let listed = service
        .list_for_measurement(&ana, measurement.id, PageParams::default())
        .await
        .expect("list");

    assert_eq!(second.reading.id, first.reading.id);
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].reading.lectura_mira, dec("1.350"));
}

#[rstest]
#[tokio::test]
async fn concurrent_upserts_on_one_division_converge(#[future] harness: Harness) {
    let Harness {
        service,
        measurement,
        ..
    } = harness.await;
    let ana = caller("ana");

    let (left, right) = tokio::join!(
        service.upsert(&ana, draft(&measurement, "-1.5", "1.100")),
        service.upsert(&ana, draft(&measurement, "-1.5", "1.900")),
    );
    let left = left.expect("left upsert");
    let right = right.expect("right upsert");
    let listed = service
        .list_for_measurement(&ana, measurement.id, PageParams::default())
        .await
        .expect("list");

    assert_eq!(left.reading.id, right.reading.id);
    assert_eq!(listed.len(), 1);
    let stored = listed[0].reading.lectura_mira;
    assert!(
        stored == dec("1.100") || stored == dec("1.900"),
        "unexpected lectura_mira {stored}"
    );
}

#[rstest]
#[tokio::test]
async fn invalid_drafts_fail_before_the_measurement_lookup(#[future] harness: Harness) {
    let Harness { service, .. } = harness.await;
    let bad = ReadingDraft {
        medicion_id: MeasurementId::new(9_999),
        division_transversal: dec("0"),
        lectura_mira: dec("-1"),
        calidad: None,
    };

    let err = service
        .upsert(&caller("ana"), bad)
        .await
        .expect_err("negative rod reading");

    assert_eq!(err.code(), ErrorCode::InvalidRequest);
}

#[rstest]
#[tokio::test]
async fn upsert_overwrites_quality(#[future] harness: Harness) {
    let Harness {
        service,
        measurement,
        ..
    } = harness.await;
    let ana = caller("ana");
    let first = service
        .upsert(&ana, draft(&measurement, "0", "1.2"))
        .await
        .expect("first");

    let mut flagged = draft(&measurement, "0", "1.2");
    flagged.calidad = Some("REVISAR".to_owned());
    let second = service.upsert(&ana, flagged).await.expect("second");

    assert_eq!(first.reading.calidad, QualityTag::Buena);
    assert_eq!(second.reading.calidad, QualityTag::Revisar);
}

#[rstest]
#[tokio::test]
async fn metrics_at_the_centreline(#[future] harness: Harness) {
    let Harness {
        service,
        measurement,
        ..
    } = harness.await;

    let report = service
        .upsert(&caller("ana"), draft(&measurement, "0", "2.355"))
        .await
        .expect("reading");
    let metrics = report.metrics;

    assert_eq!(metrics.elv_base_real, Some(dec("1886.145")));
    assert_eq!(metrics.elv_base_proyecto, Some(dec("1886.14")));
    assert_eq!(metrics.elv_concreto_proyecto, Some(dec("1886.39")));
    assert_eq!(metrics.esp_concreto_proyecto, Some(dec("0.245")));
    assert_eq!(metrics.volumen_por_metro, Some(dec("0.3185")));
    assert_eq!(metrics.clasificacion, Some(Classification::Cumple));
    assert_eq!(metrics.cumple_tolerancia, Some(true));
}

#[rstest]
#[tokio::test]
async fn metrics_off_the_centreline_use_the_side_slope(#[future] harness: Harness) {
    let Harness {
        service,
        measurement,
        ..
    } = harness.await;

    let report = service
        .upsert(&caller("ana"), draft(&measurement, "3", "2.355"))
        .await
        .expect("reading");

    assert_eq!(report.metrics.elv_base_proyecto, Some(dec("1886.2")));
    assert_eq!(report.metrics.clasificacion, Some(Classification::Terraplen));
    assert_eq!(report.metrics.cumple_tolerancia, Some(false));
}

#[rstest]
#[tokio::test]
async fn design_fields_are_unset_without_a_station(#[future] harness: Harness) {
    let Harness {
        repos,
        service,
        measurement,
    } = harness.await;
    let project = repos
        .owned_project(&caller("ana"), measurement.proyecto_id)
        .await
        .expect("project");
    let between = measurement_at(&repos, &project, "2.5").await;

    let report = service
        .upsert(&caller("ana"), draft(&between, "0", "2.355"))
        .await
        .expect("reading");

    assert_eq!(report.metrics.elv_base_real, Some(dec("1886.145")));
    assert_eq!(report.metrics.elv_base_proyecto, None);
    assert_eq!(report.metrics.clasificacion, None);
    assert_eq!(report.metrics.cumple_tolerancia, None);
}

#[rstest]
#[tokio::test]
async fn real_elevation_needs_an_instrument_height(#[future] harness: Harness) {
    let Harness {
        repos,
        service,
        measurement,
    } = harness.await;
    let ana = caller("ana");
    let no_backsight = SurveyMeasurementService::new(repos)
        .create(
            &ana,
            MeasurementDraft {
                proyecto_id: measurement.proyecto_id,
                estacion_km: dec("10"),
                bn_altura: Some(dec("1887.125")),
                bn_lectura: None,
                fecha_medicion: None,
                operador: None,
                condiciones_clima: None,
                observaciones: None,
            },
        )
        .await
        .expect("measurement");

    let report = service
        .upsert(&ana, draft(&no_backsight, "0", "1.2"))
        .await
        .expect("reading");

    assert_eq!(report.metrics.elv_base_real, None);
    assert_eq!(report.metrics.elv_base_proyecto, Some(dec("1886.14")));
    assert_eq!(report.metrics.cumple_tolerancia, None);
    assert_eq!(report.metrics.clasificacion, None);
}

#[rstest]
#[tokio::test]
async fn moving_onto_an_occupied_division_conflicts(#[future] harness: Harness) {
    let Harness {
        service,
        measurement,
        ..
    } = harness.await;
    let ana = caller("ana");
    service
        .upsert(&ana, draft(&measurement, "-3", "1.2"))
        .await
        .expect("first");
    let second = service
        .upsert(&ana, draft(&measurement, "3", "1.2"))
        .await
        .expect("second");

    let err = service
        .update(
            &ana,
            second.reading.id,
            ReadingPatch {
                division_transversal: Some(dec("-3")),
                ..ReadingPatch::default()
            },
        )
        .await
        .expect_err("occupied");

    assert_eq!(err.code(), ErrorCode::Conflict);
}

#[rstest]
#[tokio::test]
async fn readings_are_hidden_from_other_users(#[future] harness: Harness) {
    let Harness {
        service,
        measurement,
        ..
    } = harness.await;
    let report = service
        .upsert(&caller("ana"), draft(&measurement, "0", "1.2"))
        .await
        .expect("reading");
    let beto = caller("beto");

    let get = service
        .get(&beto, report.reading.id)
        .await
        .expect_err("hidden");
    let upsert = service
        .upsert(&beto, draft(&measurement, "0", "1.0"))
        .await
        .expect_err("hidden measurement");
    let listed = service
        .list(&beto, None, PageParams::default())
        .await
        .expect("empty list");

    assert_eq!(get.code(), ErrorCode::NotFound);
    assert_eq!(upsert.code(), ErrorCode::NotFound);
    assert!(listed.is_empty());
}

#[rstest]
#[tokio::test]
async fn list_orders_by_division(#[future] harness: Harness) {
    let Harness {
        service,
        measurement,
        ..
    } = harness.await;
    let ana = caller("ana");
    for division in ["3", "-12.21", "0"] {
        service
            .upsert(&ana, draft(&measurement, division, "1.2"))
            .await
            .expect("reading");
    }

    let divisions: Vec<_> = service
        .list(&ana, Some(measurement.id), PageParams::default())
        .await
        .expect("list")
        .into_iter()
        .map(|report| report.reading.division_transversal)
        .collect();

    assert_eq!(divisions, vec![dec("-12.21"), dec("0"), dec("3")]);
}

#[rstest]
#[tokio::test]
async fn unknown_quality_is_rejected_before_the_store(#[future] harness: Harness) {
    let Harness {
        mut repos,
        measurement,
        ..
    } = harness.await;
    let mut readings = MockReadingRepository::new();
    readings.expect_upsert().never();
    repos.readings = Arc::new(readings);
    let mut bad = draft(&measurement, "0", "1.2");
    bad.calidad = Some("PERFECTA".to_owned());

    let err = SurveyReadingService::new(repos)
        .upsert(&caller("ana"), bad)
        .await
        .expect_err("unknown quality");

    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert_eq!(
        err.details().and_then(|d| d.get("field")),
        Some(&serde_json::json!("calidad"))
    );
}

#[rstest]
#[tokio::test]
async fn store_failures_during_upsert_are_internal(#[future] harness: Harness) {
    let Harness {
        mut repos,
        measurement,
        ..
    } = harness.await;
    let mut readings = MockReadingRepository::new();
    readings
        .expect_upsert()
        .times(1)
        .return_once(|_| Err(ReadingRepositoryError::query("deadlock detected")));
    repos.readings = Arc::new(readings);

    let err = SurveyReadingService::new(repos)
        .upsert(&caller("ana"), draft(&measurement, "0", "1.2"))
        .await
        .expect_err("internal");

    assert_eq!(err.code(), ErrorCode::InternalError);
}
