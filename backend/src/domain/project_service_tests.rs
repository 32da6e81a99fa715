//! Tests for the project service.

use std::sync::Arc;

use rstest::{fixture, rstest};

use super::*;
use crate::domain::ErrorCode;
use crate::domain::ports::{MockProjectRepository, ProjectRepositoryError, StationService};
use crate::domain::survey::ProjectState;
use crate::domain::{SurveyRepositories, SurveyStationService};
use crate::test_support::survey::{caller, dec, in_memory_repositories, project_draft};

#[fixture]
fn repos() -> SurveyRepositories {
    in_memory_repositories()
}

#[rstest]
#[tokio::test]
async fn create_starts_in_configuration(repos: SurveyRepositories) {
    let service = SurveyProjectService::new(repos);

    let project = service
        .create(&caller("ana"), project_draft("Libramiento", "0", "10"), false)
        .await
        .expect("created");

    assert_eq!(project.estado, ProjectState::Configuracion);
    assert_eq!(project.cuerpo.as_deref(), Some("A"));
    assert_eq!(&project.owner, caller("ana").id());
}

#[rstest]
#[tokio::test]
async fn create_with_generation_stamps_every_interval(repos: SurveyRepositories) {
    let ana = caller("ana");
    let service = SurveyProjectService::new(repos.clone());
    let stations = SurveyStationService::new(repos);

    let project = service
        .create(&ana, project_draft("Libramiento", "0", "10"), true)
        .await
        .expect("created");
    let kms: Vec<String> = stations
        .list_for_project(&ana, project.id, PageParams::default())
        .await
        .expect("stations")
        .iter()
        .map(|s| s.km.to_string())
        .collect();

    assert_eq!(kms, ["0.000", "5.000", "10.000"]);
}

#[rstest]
#[tokio::test]
async fn create_rejects_inverted_ranges(repos: SurveyRepositories) {
    let service = SurveyProjectService::new(repos);

    let err = service
        .create(&caller("ana"), project_draft("Al revés", "10", "0"), false)
        .await
        .expect_err("invalid range");

    assert_eq!(err.code(), ErrorCode::InvalidRequest);
}

#[rstest]
#[tokio::test]
async fn create_refuses_oversized_generation(repos: SurveyRepositories) {
    let service = SurveyProjectService::new(repos);
    let mut draft = project_draft("Autopista", "0", "1000");
    draft.geometry.intervalo = Some(dec("0.01"));

    let err = service
        .create(&caller("ana"), draft, true)
        .await
        .expect_err("too many stations");

    assert_eq!(err.code(), ErrorCode::InvalidRequest);
}

#[rstest]
#[tokio::test]
async fn projects_of_other_users_are_invisible(repos: SurveyRepositories) {
    let service = SurveyProjectService::new(repos);
    let project = service
        .create(&caller("ana"), project_draft("Libramiento", "0", "10"), false)
        .await
        .expect("created");
    let beto = caller("beto");

    let get = service.get(&beto, project.id).await.expect_err("hidden");
    let delete = service.delete(&beto, project.id).await.expect_err("hidden");
    let listed = service
        .list(&beto, PageParams::default())
        .await
        .expect("list");

    assert_eq!(get.code(), ErrorCode::NotFound);
    assert_eq!(delete.code(), ErrorCode::NotFound);
    assert!(listed.is_empty());
}

#[rstest]
#[tokio::test]
async fn update_revalidates_the_merged_range(repos: SurveyRepositories) {
    let ana = caller("ana");
    let service = SurveyProjectService::new(repos);
    let project = service
        .create(&ana, project_draft("Libramiento", "0", "10"), false)
        .await
        .expect("created");

    let err = service
        .update(
            &ana,
            project.id,
            ProjectPatch {
                km_inicial: Some(dec("20")),
                ..ProjectPatch::default()
            },
        )
        .await
        .expect_err("inverted after merge");

    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    let stored = service.get(&ana, project.id).await.expect("unchanged");
    assert_eq!(stored.geometry.km_inicial(), dec("0"));
}

#[rstest]
#[tokio::test]
async fn update_changes_state(repos: SurveyRepositories) {
    let ana = caller("ana");
    let service = SurveyProjectService::new(repos);
    let project = service
        .create(&ana, project_draft("Libramiento", "0", "10"), false)
        .await
        .expect("created");

    let updated = service
        .update(
            &ana,
            project.id,
            ProjectPatch {
                estado: Some("EN_PROGRESO".to_owned()),
                ..ProjectPatch::default()
            },
        )
        .await
        .expect("updated");

    assert_eq!(updated.estado, ProjectState::EnProgreso);
    assert_eq!(updated.nombre, "Libramiento");
}

#[rstest]
#[tokio::test]
async fn delete_removes_the_project(repos: SurveyRepositories) {
    let ana = caller("ana");
    let service = SurveyProjectService::new(repos);
    let project = service
        .create(&ana, project_draft("Libramiento", "0", "10"), true)
        .await
        .expect("created");

    service.delete(&ana, project.id).await.expect("deleted");

    let err = service.get(&ana, project.id).await.expect_err("gone");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn connection_failures_map_to_service_unavailable(mut repos: SurveyRepositories) {
    let mut projects = MockProjectRepository::new();
    projects
        .expect_list_for_owner()
        .times(1)
        .return_once(|_, _| Err(ProjectRepositoryError::connection("pool exhausted")));
    repos.projects = Arc::new(projects);

    let err = SurveyProjectService::new(repos)
        .list(&caller("ana"), PageParams::default())
        .await
        .expect_err("unavailable");

    assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
}

#[rstest]
#[tokio::test]
async fn validation_happens_before_the_store(mut repos: SurveyRepositories) {
    let mut projects = MockProjectRepository::new();
    projects.expect_insert().never();
    repos.projects = Arc::new(projects);

    let err = SurveyProjectService::new(repos)
        .create(&caller("ana"), project_draft("  ", "0", "10"), false)
        .await
        .expect_err("blank name");

    assert_eq!(err.code(), ErrorCode::InvalidRequest);
}
