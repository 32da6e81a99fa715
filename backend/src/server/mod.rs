//! Server construction and middleware wiring.

mod config;
mod state_builders;

pub use config::ServerConfig;

use state_builders::build_http_state;

use std::time::Duration;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::middleware::{NormalizePath, TrailingSlash};
use actix_web::{App, HttpServer, web};

use survey_backend::doc::ApiDoc;
use survey_backend::inbound::http::health::HealthState;
use survey_backend::inbound::http::state::HttpState;
use survey_backend::inbound::http::validation::extractor_config;
use survey_backend::inbound::http::{configure_resources, configure_service_endpoints};
use survey_backend::{Timeout, Trace};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    request_timeout: Duration,
    debug: bool,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl actix_web::body::MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        request_timeout,
        debug,
    } = deps;

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .configure(extractor_config)
        .wrap(Timeout::new(request_timeout))
        .wrap(NormalizePath::new(TrailingSlash::Trim))
        .wrap(Trace)
        .configure(configure_service_endpoints)
        .configure(configure_resources);

    if debug {
        app.service(
            SwaggerUi::new("/docs/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
        )
    } else {
        app
    }
}

/// Construct an Actix HTTP server using the provided health state and configuration.
///
/// # Parameters
/// - `health_state`: shared readiness state updated once the server is initialised.
/// - `config`: pre-built [`ServerConfig`] with binding, identity and optional pool.
///
/// # Returns
/// A spawned [`Server`] that must be awaited to drive the listener.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket or starting the server fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let server_health_state = health_state.clone();
    let http_state = build_http_state(&config);
    let ServerConfig {
        bind_addr,
        request_timeout,
        debug,
        ..
    } = config;

    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
            request_timeout,
            debug,
        })
    })
    .bind(bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use rstest::rstest;
    use survey_backend::domain::TRACE_ID_HEADER;
    use survey_backend::test_support::http::{bearer, test_state};

    use super::*;

    fn deps(debug: bool) -> AppDependencies {
        let health_state = web::Data::new(HealthState::new());
        health_state.mark_ready();
        AppDependencies {
            health_state,
            http_state: web::Data::new(test_state()),
            request_timeout: Duration::from_secs(5),
            debug,
        }
    }

    #[rstest]
    #[case("/proyectos/")]
    #[case("/proyectos")]
    #[actix_web::test]
    async fn trailing_slashes_are_normalised(#[case] uri: &str) {
        let app = actix_test::init_service(build_app(deps(false))).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri(uri)
                .insert_header(bearer("ana"))
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::OK);
        assert!(res.headers().contains_key(TRACE_ID_HEADER));
    }

    #[rstest]
    #[case("/proyectos/999", StatusCode::NOT_FOUND)]
    #[case("/proyectos/999/estaciones", StatusCode::NOT_FOUND)]
    #[case("/health", StatusCode::OK)]
    #[actix_web::test]
    async fn fast_requests_pass_through_the_full_middleware_stack(
        #[case] uri: &str,
        #[case] expected: StatusCode,
    ) {
        let app = actix_test::init_service(build_app(deps(false))).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri(uri)
                .insert_header(bearer("ana"))
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), expected);
        assert!(res.headers().contains_key(TRACE_ID_HEADER));
    }

    #[rstest]
    #[case(true, StatusCode::OK)]
    #[case(false, StatusCode::NOT_FOUND)]
    #[actix_web::test]
    async fn openapi_document_follows_debug_mode(
        #[case] debug: bool,
        #[case] expected: StatusCode,
    ) {
        let app = actix_test::init_service(build_app(deps(debug))).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api-docs/openapi.json")
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), expected);
    }
}
