//! Test utilities for the backend crate.
//!
//! This module provides shared helpers for both unit tests (in `src/`) and
//! integration tests (in `tests/`). It is only compiled when running tests or
//! when the `test-support` feature is enabled.

pub mod clock {
    //! Deterministic clock for services that stamp timestamps.

    use std::sync::Arc;

    use chrono::{DateTime, Local, TimeZone, Utc};
    use mockable::Clock;

    /// Clock frozen at a fixed UTC instant.
    #[derive(Debug, Clone, Copy)]
    pub struct FixtureClock {
        pub utc_now: DateTime<Utc>,
    }

    impl Clock for FixtureClock {
        fn local(&self) -> DateTime<Local> {
            self.utc_now.with_timezone(&Local)
        }

        fn utc(&self) -> DateTime<Utc> {
            self.utc_now
        }
    }

    /// Instant every fixture clock starts at: 2024-03-15T09:30:00Z.
    pub fn fixture_instant() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 9, 30, 0)
            .single()
            .unwrap_or_default()
    }

    /// Shared clock frozen at [`fixture_instant`].
    pub fn fixture_clock() -> Arc<dyn Clock> {
        Arc::new(FixtureClock {
            utc_now: fixture_instant(),
        })
    }
}

pub mod survey {
    //! Builders for callers, drafts and an in-memory repository bundle.

    use std::sync::Arc;

    use rust_decimal::Decimal;

    use crate::domain::survey::{GeometryInput, ProjectDraft};
    use crate::domain::{CallerIdentity, SurveyRepositories, UserId};
    use crate::outbound::memory::InMemorySurveyStore;

    use super::clock::fixture_clock;

    /// Caller whose email is derived from `id`.
    ///
    /// # Panics
    /// Panics when `id` is not a valid [`UserId`].
    pub fn caller(id: &str) -> CallerIdentity {
        let user = UserId::new(id).unwrap_or_else(|err| panic!("fixture user id {id:?}: {err}"));
        CallerIdentity::new(user, format!("{id}@obra.mx"))
    }

    /// Decimal literal helper for fixtures.
    ///
    /// # Panics
    /// Panics when `raw` is not a decimal literal.
    pub fn dec(raw: &str) -> Decimal {
        raw.parse()
            .unwrap_or_else(|err| panic!("fixture decimal {raw:?}: {err}"))
    }

    /// Project draft spanning `km_inicial..=km_final` with default geometry.
    pub fn project_draft(nombre: &str, km_inicial: &str, km_final: &str) -> ProjectDraft {
        ProjectDraft {
            nombre: nombre.to_owned(),
            tramo: None,
            cuerpo: None,
            geometry: GeometryInput {
                km_inicial: dec(km_inicial),
                km_final: dec(km_final),
                ..GeometryInput::default()
            },
        }
    }

    /// Fresh in-memory store wired as every repository, on the fixture clock.
    pub fn in_memory_repositories() -> SurveyRepositories {
        Arc::new(InMemorySurveyStore::new()).repositories(fixture_clock())
    }
}

pub mod tokens {
    //! HS256 token minting for authentication tests.

    use jsonwebtoken::{EncodingKey, Header, encode};
    use serde::Serialize;

    /// Secret shared by test verifiers and minted tokens.
    pub const TEST_SECRET: &str = "survey-test-secret";

    /// Audience accepted by test verifiers.
    pub const TEST_AUDIENCE: &str = "authenticated";

    #[derive(Serialize)]
    struct Claims<'a> {
        sub: &'a str,
        email: &'a str,
        aud: &'a str,
        exp: i64,
    }

    /// Mint a token for `sub` signed with `secret`, expiring at `exp`.
    ///
    /// # Panics
    /// Panics when encoding fails.
    pub fn mint_token(secret: &str, sub: &str, email: &str, exp: i64) -> String {
        let claims = Claims {
            sub,
            email,
            aud: TEST_AUDIENCE,
            exp,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap_or_else(|err| panic!("mint test token: {err}"))
    }

    /// Token for `sub` valid for an hour from now under [`TEST_SECRET`].
    pub fn valid_token(sub: &str) -> String {
        let exp = chrono::Utc::now().timestamp() + 3600;
        mint_token(TEST_SECRET, sub, &format!("{sub}@obra.mx"), exp)
    }
}

pub mod http {
    //! HTTP state and application builders for handler tests.

    use std::sync::Arc;

    use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
    use actix_web::http::header::{AUTHORIZATION, HeaderName};
    use actix_web::{App, Error, web};

    use crate::domain::SurveyRepositories;
    use crate::inbound::http::health::HealthState;
    use crate::inbound::http::state::{HttpState, HttpStatePorts, ServiceInfo, StoreMode};
    use crate::inbound::http::validation::extractor_config;
    use crate::inbound::http::{configure_resources, configure_service_endpoints};
    use crate::outbound::identity::JwtIdentityVerifier;

    use super::survey::in_memory_repositories;
    use super::tokens::{TEST_AUDIENCE, TEST_SECRET, valid_token};

    /// Application name reported by test states.
    pub const TEST_APP_NAME: &str = "API Topografía";

    /// State over `repositories`, verifying tokens with `secret`/`audience`.
    pub fn state_over(repositories: SurveyRepositories, secret: &str, audience: &str) -> HttpState {
        let identity = Arc::new(JwtIdentityVerifier::new(secret, audience));
        HttpState::new(
            HttpStatePorts::from_repositories(repositories, identity),
            ServiceInfo::new(TEST_APP_NAME, StoreMode::InMemory),
        )
    }

    /// State over a fresh in-memory store.
    pub fn state_with_identity(secret: &str, audience: &str) -> HttpState {
        state_over(in_memory_repositories(), secret, audience)
    }

    /// State over a fresh in-memory store accepting [`valid_token`]s.
    pub fn test_state() -> HttpState {
        state_with_identity(TEST_SECRET, TEST_AUDIENCE)
    }

    /// `Authorization` header carrying a valid token for `sub`.
    pub fn bearer(sub: &str) -> (HeaderName, String) {
        (AUTHORIZATION, format!("Bearer {}", valid_token(sub)))
    }

    /// Every route of the service, as `main` mounts it, over `state`.
    pub fn survey_app(
        state: HttpState,
    ) -> App<
        impl ServiceFactory<
            ServiceRequest,
            Config = (),
            Response = ServiceResponse,
            Error = Error,
            InitError = (),
        >,
    > {
        let health = web::Data::new(HealthState::new());
        health.mark_ready();
        App::new()
            .app_data(web::Data::new(state))
            .app_data(health)
            .configure(extractor_config)
            .configure(configure_service_endpoints)
            .configure(configure_resources)
    }
}

pub mod openapi {
    //! OpenAPI schema traversal helpers.
    //!
    //! Provides utilities for extracting and inspecting utoipa `Schema` types,
    //! particularly for resolving `RefOr<Schema>` wrappers to concrete `Object`
    //! schemas with diagnostic error messages on type mismatches.

    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::{Object, Schema};

    /// Extract an `Object` schema, panicking with a diagnostic if not an Object.
    pub fn unwrap_object_schema<'a>(schema: &'a RefOr<Schema>, name: &str) -> &'a Object {
        match schema {
            RefOr::T(Schema::Object(obj)) => obj,
            RefOr::Ref(reference) => {
                panic!(
                    "schema '{name}' is a $ref to '{}'; resolve the reference first",
                    reference.ref_location
                );
            }
            RefOr::T(Schema::Array(_)) => {
                panic!("schema '{name}' is an Array, not an Object");
            }
            _ => panic!("schema '{name}' has unexpected type"),
        }
    }

    /// Get a property from an Object schema by name.
    ///
    /// Panics if the property does not exist.
    pub fn get_property<'a>(obj: &'a Object, field: &str) -> &'a RefOr<Schema> {
        match obj.properties.get(field) {
            Some(property) => property,
            None => panic!("property '{field}' not found"),
        }
    }
}
