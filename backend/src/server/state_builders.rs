//! Builders for the shared HTTP state.

use std::sync::Arc;

use actix_web::web;
use mockable::{Clock, DefaultClock};
use tracing::info;

use survey_backend::domain::SurveyRepositories;
use survey_backend::inbound::http::state::{HttpState, HttpStatePorts, ServiceInfo, StoreMode};
use survey_backend::outbound::identity::JwtIdentityVerifier;
use survey_backend::outbound::memory::InMemorySurveyStore;
use survey_backend::outbound::persistence::{self, DbPool};

use super::ServerConfig;

/// Select Diesel repositories when a pool is present, otherwise the
/// process-local store.
fn build_repositories(
    pool: Option<&DbPool>,
    clock: Arc<dyn Clock>,
) -> (SurveyRepositories, StoreMode) {
    match pool {
        Some(pool) => (
            persistence::repositories(pool.clone(), clock),
            StoreMode::Postgres,
        ),
        None => (
            Arc::new(InMemorySurveyStore::new()).repositories(clock),
            StoreMode::InMemory,
        ),
    }
}

/// Build the shared HTTP state from configuration.
pub(super) fn build_http_state(config: &ServerConfig) -> web::Data<HttpState> {
    let (repositories, store) = build_repositories(config.db_pool.as_ref(), Arc::new(DefaultClock));
    info!(store = store.as_str(), "survey repositories ready");
    let identity = Arc::new(JwtIdentityVerifier::new(
        &config.jwt_secret,
        &config.jwt_audience,
    ));
    web::Data::new(HttpState::new(
        HttpStatePorts::from_repositories(repositories, identity),
        ServiceInfo::new(config.app_name.clone(), store).with_debug(config.debug),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use survey_backend::domain::SurveyProjectService;
    use survey_backend::domain::ports::ProjectService;
    use pagination::PageParams;
    use survey_backend::test_support::clock::fixture_clock;
    use survey_backend::test_support::survey::{caller, project_draft};

    #[rstest]
    #[tokio::test]
    async fn pool_absent_selects_the_in_memory_store() {
        let (repositories, store) = build_repositories(None, fixture_clock());
        let projects = SurveyProjectService::new(repositories);
        let ana = caller("ana");

        projects
            .create(&ana, project_draft("Libramiento", "0", "1"), true)
            .await
            .expect("in-memory create");
        let listed = projects
            .list(&ana, PageParams::default())
            .await
            .expect("in-memory list");

        assert_eq!(store, StoreMode::InMemory);
        assert_eq!(listed.len(), 1);
    }

    #[rstest]
    fn state_reports_configuration() {
        let config = ServerConfig::new(
            "127.0.0.1:0".parse().expect("literal address"),
            "Levantamientos",
            "s3cret",
            "authenticated",
        )
        .with_debug(true);

        let state = build_http_state(&config);

        assert_eq!(state.info.app_name, "Levantamientos");
        assert_eq!(state.info.store, StoreMode::InMemory);
        assert!(state.info.debug);
    }
}
