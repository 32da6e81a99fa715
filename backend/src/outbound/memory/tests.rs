//! Behavioural coverage for the in-memory survey store.

use std::sync::Arc;

use chrono::{NaiveDate, TimeDelta};
use pagination::PageParams;
use rstest::{fixture, rstest};

use super::InMemorySurveyStore;
use crate::domain::UserProfile;
use crate::domain::ports::{
    MeasurementRepository, MeasurementRepositoryError, ProjectRepository, ProjectRepositoryError,
    ReadingRepository, ReadingRepositoryError, StationRepository, StationRepositoryError,
    UserProfileRepository, UserProfileRepositoryError,
};
use crate::domain::survey::{
    DivisionReading, GeometryInput, Measurement, NewMeasurement, NewProject, NewStation, Project,
    ProjectGeometry, ProjectId, ProjectState, QualityTag, ReadingUpsert, StationSeed,
};
use crate::test_support::clock::fixture_instant;
use crate::test_support::survey::{caller, dec};

#[fixture]
fn store() -> Arc<InMemorySurveyStore> {
    Arc::new(InMemorySurveyStore::new())
}

fn geometry() -> ProjectGeometry {
    ProjectGeometry::try_from(GeometryInput {
        km_inicial: dec("0"),
        km_final: dec("100"),
        ..GeometryInput::default()
    })
    .expect("valid geometry")
}

async fn seed_project(store: &InMemorySurveyStore, owner: &str, seeds: &[StationSeed]) -> Project {
    let caller = caller(owner);
    store
        .ensure(&UserProfile::for_caller(&caller, fixture_instant()))
        .await
        .expect("profile");
    let project = NewProject {
        owner: caller.id().clone(),
        nombre: format!("Tramo de {owner}"),
        tramo: None,
        cuerpo: None,
        geometry: geometry(),
        estado: ProjectState::default(),
        fecha_creacion: fixture_instant(),
    };
    ProjectRepository::insert(store, &project, seeds)
        .await
        .expect("project insert")
}

fn seed(km: &str) -> StationSeed {
    StationSeed {
        km: dec(km),
        pendiente_derecha: StationSeed::placeholder_slope(),
        base_cl: StationSeed::placeholder_base_cl(),
    }
}

fn new_station(project: &Project, km: &str) -> NewStation {
    NewStation {
        proyecto_id: project.id,
        km: dec(km),
        pendiente_derecha: dec("0.02"),
        base_cl: dec("1886.14"),
        observaciones: None,
        fecha_captura: fixture_instant(),
    }
}

fn new_measurement(project: &Project, km: &str) -> NewMeasurement {
    NewMeasurement {
        proyecto_id: project.id,
        estacion_km: dec(km),
        bn_altura: Some(dec("1887.5")),
        bn_lectura: Some(dec("1.2")),
        fecha_medicion: NaiveDate::from_ymd_opt(2024, 3, 15).expect("date"),
        operador: None,
        condiciones_clima: None,
        observaciones: None,
    }
}

fn upsert(medicion: &Measurement, division: &str, lectura: &str) -> ReadingUpsert {
    ReadingUpsert {
        medicion_id: medicion.id,
        division_transversal: dec(division),
        lectura_mira: dec(lectura),
        calidad: QualityTag::Buena,
        fecha_calculo: fixture_instant(),
    }
}

#[rstest]
#[tokio::test]
async fn project_insert_persists_seeded_stations(store: Arc<InMemorySurveyStore>) {
    let seeds = [seed("0"), seed("5")];
    let project = seed_project(&store, "ana", &seeds).await;

    let stations = StationRepository::list_for_owner(
        &*store,
        &project.owner,
        Some(project.id),
        PageParams::default(),
    )
    .await
    .expect("list");

    assert_eq!(stations.len(), 2);
    assert!(stations.iter().all(|s| s.proyecto_id == project.id));
}

#[rstest]
#[tokio::test]
async fn project_insert_requires_owner_profile(store: Arc<InMemorySurveyStore>) {
    let project = NewProject {
        owner: caller("ghost").id().clone(),
        nombre: "Sin perfil".to_owned(),
        tramo: None,
        cuerpo: None,
        geometry: geometry(),
        estado: ProjectState::default(),
        fecha_creacion: fixture_instant(),
    };

    let result = ProjectRepository::insert(&*store, &project, &[]).await;

    assert!(result.is_err());
}

#[rstest]
#[tokio::test]
async fn duplicate_station_km_is_rejected(store: Arc<InMemorySurveyStore>) {
    let project = seed_project(&store, "ana", &[]).await;
    StationRepository::insert(&*store, &new_station(&project, "2.5"))
        .await
        .expect("first insert");

    let err = StationRepository::insert(&*store, &new_station(&project, "2.500"))
        .await
        .expect_err("duplicate km");

    assert_eq!(err, StationRepositoryError::duplicate_km(dec("2.5")));
}

#[rstest]
#[tokio::test]
async fn same_km_in_different_projects_is_allowed(store: Arc<InMemorySurveyStore>) {
    let first = seed_project(&store, "ana", &[]).await;
    let second = seed_project(&store, "ana", &[]).await;

    StationRepository::insert(&*store, &new_station(&first, "2.5"))
        .await
        .expect("first project");
    StationRepository::insert(&*store, &new_station(&second, "2.5"))
        .await
        .expect("second project");
}

#[rstest]
#[tokio::test]
async fn station_update_cannot_take_a_sibling_km(store: Arc<InMemorySurveyStore>) {
    let project = seed_project(&store, "ana", &[]).await;
    StationRepository::insert(&*store, &new_station(&project, "1"))
        .await
        .expect("first");
    let mut second = StationRepository::insert(&*store, &new_station(&project, "2"))
        .await
        .expect("second");

    second.km = dec("1");
    let err = StationRepository::update(&*store, &second)
        .await
        .expect_err("km taken");

    assert!(matches!(err, StationRepositoryError::DuplicateKm { .. }));
}

#[rstest]
#[tokio::test]
async fn listings_are_restricted_to_the_owner(store: Arc<InMemorySurveyStore>) {
    let mine = seed_project(&store, "ana", &[]).await;
    let theirs = seed_project(&store, "beto", &[]).await;
    StationRepository::insert(&*store, &new_station(&mine, "1"))
        .await
        .expect("mine");
    StationRepository::insert(&*store, &new_station(&theirs, "1"))
        .await
        .expect("theirs");

    let visible = StationRepository::list_for_owner(
        &*store,
        caller("ana").id(),
        None,
        PageParams::default(),
    )
    .await
    .expect("list");
    let filtered = StationRepository::list_for_owner(
        &*store,
        caller("ana").id(),
        Some(theirs.id),
        PageParams::default(),
    )
    .await
    .expect("list");

    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].proyecto_id, mine.id);
    assert!(filtered.is_empty());
}

#[rstest]
#[tokio::test]
async fn stations_list_in_km_order(store: Arc<InMemorySurveyStore>) {
    let project = seed_project(&store, "ana", &[]).await;
    for km in ["10", "2.5", "7"] {
        StationRepository::insert(&*store, &new_station(&project, km))
            .await
            .expect("insert");
    }

    let kms: Vec<_> = StationRepository::list_for_owner(
        &*store,
        caller("ana").id(),
        Some(project.id),
        PageParams::default(),
    )
    .await
    .expect("list")
    .into_iter()
    .map(|s| s.km)
    .collect();

    assert_eq!(kms, vec![dec("2.5"), dec("7"), dec("10")]);
}

#[rstest]
#[tokio::test]
async fn duplicate_measurement_km_is_rejected(store: Arc<InMemorySurveyStore>) {
    let project = seed_project(&store, "ana", &[]).await;
    MeasurementRepository::insert(&*store, &new_measurement(&project, "3"))
        .await
        .expect("first");

    let err = MeasurementRepository::insert(&*store, &new_measurement(&project, "3"))
        .await
        .expect_err("duplicate");

    assert_eq!(err, MeasurementRepositoryError::duplicate_km(dec("3")));
}

#[rstest]
#[tokio::test]
async fn upsert_overwrites_in_place(store: Arc<InMemorySurveyStore>) {
    let project = seed_project(&store, "ana", &[]).await;
    let measurement = MeasurementRepository::insert(&*store, &new_measurement(&project, "3"))
        .await
        .expect("measurement");

    let first = store
        .upsert(&upsert(&measurement, "-3", "1.5"))
        .await
        .expect("insert");
    let mut again = upsert(&measurement, "-3", "1.7");
    again.calidad = QualityTag::Revisar;
    again.fecha_calculo = fixture_instant() + TimeDelta::minutes(5);
    let second = store.upsert(&again).await.expect("overwrite");

    assert_eq!(second.id, first.id);
    assert_eq!(second.lectura_mira, dec("1.7"));
    assert_eq!(second.calidad, QualityTag::Revisar);
    let listed = ReadingRepository::list_for_owner(
        &*store,
        caller("ana").id(),
        Some(measurement.id),
        PageParams::default(),
    )
    .await
    .expect("list");
    assert_eq!(listed, vec![second]);
}

#[rstest]
#[tokio::test]
async fn reading_update_cannot_take_a_sibling_division(store: Arc<InMemorySurveyStore>) {
    let project = seed_project(&store, "ana", &[]).await;
    let measurement = MeasurementRepository::insert(&*store, &new_measurement(&project, "3"))
        .await
        .expect("measurement");
    store
        .upsert(&upsert(&measurement, "-3", "1.5"))
        .await
        .expect("first");
    let second = store
        .upsert(&upsert(&measurement, "3", "1.5"))
        .await
        .expect("second");

    let moved = DivisionReading {
        division_transversal: dec("-3"),
        ..second
    };
    let err = ReadingRepository::update(&*store, &moved)
        .await
        .expect_err("division taken");

    assert_eq!(err, ReadingRepositoryError::duplicate_division(dec("-3")));
}

#[rstest]
#[tokio::test]
async fn deleting_a_project_cascades(store: Arc<InMemorySurveyStore>) {
    let project = seed_project(&store, "ana", &[seed("0")]).await;
    let measurement = MeasurementRepository::insert(&*store, &new_measurement(&project, "0"))
        .await
        .expect("measurement");
    let reading = store
        .upsert(&upsert(&measurement, "0", "1.1"))
        .await
        .expect("reading");

    assert!(ProjectRepository::delete(&*store, project.id).await.expect("delete"));

    assert!(
        MeasurementRepository::find_by_id(&*store, measurement.id)
            .await
            .expect("lookup")
            .is_none()
    );
    assert!(
        ReadingRepository::find_by_id(&*store, reading.id)
            .await
            .expect("lookup")
            .is_none()
    );
    assert!(
        StationRepository::list_for_owner(
            &*store,
            caller("ana").id(),
            None,
            PageParams::default()
        )
        .await
        .expect("list")
        .is_empty()
    );
    assert!(!ProjectRepository::delete(&*store, project.id).await.expect("second delete"));
}

#[rstest]
#[tokio::test]
async fn ensure_returns_existing_profile(store: Arc<InMemorySurveyStore>) {
    let ana = caller("ana");
    let original = UserProfile::for_caller(&ana, fixture_instant());
    UserProfileRepository::insert(&*store, &original).await.expect("insert");

    let later = UserProfile::for_caller(&ana, fixture_instant() + TimeDelta::days(1));
    let ensured = store.ensure(&later).await.expect("ensure");

    assert_eq!(ensured, original);
}

#[rstest]
#[tokio::test]
async fn profile_insert_rejects_duplicates(store: Arc<InMemorySurveyStore>) {
    let ana = caller("ana");
    let profile = UserProfile::for_caller(&ana, fixture_instant());
    UserProfileRepository::insert(&*store, &profile).await.expect("insert");

    let same_id = UserProfileRepository::insert(&*store, &profile).await.expect_err("duplicate id");
    let mut other = UserProfile::for_caller(&caller("beto"), fixture_instant());
    other.email = profile.email.clone();
    let same_email = UserProfileRepository::insert(&*store, &other).await.expect_err("duplicate email");

    assert_eq!(same_id, UserProfileRepositoryError::duplicate_id("ana"));
    assert_eq!(
        same_email,
        UserProfileRepositoryError::duplicate_email("ana@obra.mx")
    );
}

#[rstest]
#[tokio::test]
async fn poisoned_lock_surfaces_as_query_error(store: Arc<InMemorySurveyStore>) {
    let poisoner = Arc::clone(&store);
    let _ = std::thread::spawn(move || {
        let _guard = poisoner.state.lock().expect("lock");
        panic!("poison the store");
    })
    .join();

    let err = ProjectRepository::find_by_id(&*store, ProjectId::new(1))
        .await
        .expect_err("poisoned");

    assert!(matches!(err, ProjectRepositoryError::Query { .. }));
}
