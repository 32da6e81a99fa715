//! Bearer authentication for HTTP handlers.
//!
//! [`Authenticated`] is an extractor: any handler that takes it rejects the
//! request with `401` before the handler body runs. Verification itself is
//! delegated to the [`IdentityVerifier`](crate::domain::ports::IdentityVerifier)
//! port held in [`HttpState`].

use actix_web::http::header::{AUTHORIZATION, HeaderMap};
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::{Ready, ready};
use tracing::debug;

use crate::domain::ports::IdentityError;
use crate::domain::{CallerIdentity, Error};
use crate::inbound::http::state::HttpState;

/// The verified caller of the current request.
#[derive(Debug, Clone)]
pub struct Authenticated(CallerIdentity);

impl Authenticated {
    pub fn caller(&self) -> &CallerIdentity {
        &self.0
    }

    pub fn into_inner(self) -> CallerIdentity {
        self.0
    }
}

/// Pull the credential out of `Authorization: Bearer <token>`.
pub(crate) fn bearer_token(headers: &HeaderMap) -> Result<&str, IdentityError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or_else(IdentityError::missing_credential)?
        .to_str()
        .map_err(|_| IdentityError::invalid_credential("authorization header is not ASCII"))?;
    let token = value
        .strip_prefix("Bearer ")
        .or_else(|| value.strip_prefix("bearer "))
        .ok_or_else(|| IdentityError::invalid_credential("expected a bearer credential"))?
        .trim();
    if token.is_empty() {
        return Err(IdentityError::missing_credential());
    }
    Ok(token)
}

fn map_identity_error(error: IdentityError) -> Error {
    debug!(%error, "request rejected by identity check");
    match error {
        IdentityError::MissingCredential => Error::unauthorized("missing bearer credential"),
        IdentityError::InvalidCredential { reason } => {
            Error::unauthorized(format!("invalid bearer credential: {reason}"))
        }
    }
}

fn authenticate(req: &HttpRequest) -> Result<Authenticated, Error> {
    let state = req
        .app_data::<web::Data<HttpState>>()
        .ok_or_else(|| Error::internal("HTTP state is not registered"))?;
    let token = bearer_token(req.headers()).map_err(map_identity_error)?;
    state
        .identity
        .verify(token)
        .map(Authenticated)
        .map_err(map_identity_error)
}

impl FromRequest for Authenticated {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::http::header::HeaderValue;
    use actix_web::test as actix_test;
    use actix_web::{App, HttpResponse};
    use rstest::rstest;

    use super::*;
    use crate::domain::ErrorCode;
    use crate::test_support::http::state_with_identity;
    use crate::test_support::tokens::{TEST_AUDIENCE, TEST_SECRET, valid_token};

    fn headers(value: &str) -> HeaderMap {
        let mut map = HeaderMap::new();
        map.insert(
            AUTHORIZATION,
            HeaderValue::from_str(value).expect("header value"),
        );
        map
    }

    #[rstest]
    #[case("Bearer abc.def.ghi", "abc.def.ghi")]
    #[case("bearer abc.def.ghi", "abc.def.ghi")]
    #[case("Bearer   padded  ", "padded")]
    fn bearer_tokens_are_extracted(#[case] header: &str, #[case] expected: &str) {
        assert_eq!(bearer_token(&headers(header)), Ok(expected));
    }

    #[rstest]
    fn missing_header_is_a_missing_credential() {
        assert_eq!(
            bearer_token(&HeaderMap::new()),
            Err(IdentityError::MissingCredential)
        );
    }

    #[rstest]
    #[case("Basic dXNlcjpwYXNz")]
    #[case("Token abc")]
    fn other_schemes_are_invalid(#[case] header: &str) {
        assert!(matches!(
            bearer_token(&headers(header)),
            Err(IdentityError::InvalidCredential { .. })
        ));
    }

    #[rstest]
    fn identity_errors_become_unauthorised() {
        let err = map_identity_error(IdentityError::invalid_credential("token expired"));

        assert_eq!(err.code(), ErrorCode::Unauthorized);
        assert!(err.message().contains("token expired"));
    }

    async fn whoami(user: Authenticated) -> HttpResponse {
        HttpResponse::Ok().body(user.caller().id().as_str().to_owned())
    }

    #[actix_web::test]
    async fn extractor_admits_valid_tokens_and_rejects_the_rest() {
        let state = state_with_identity(TEST_SECRET, TEST_AUDIENCE);
        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .route("/whoami", web::get().to(whoami)),
        )
        .await;

        let ok = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/whoami")
                .insert_header((AUTHORIZATION, format!("Bearer {}", valid_token("ana"))))
                .to_request(),
        )
        .await;
        assert_eq!(ok.status(), StatusCode::OK);
        assert_eq!(actix_test::read_body(ok).await, "ana");

        let anonymous = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri("/whoami").to_request(),
        )
        .await;
        assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);

        let forged = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/whoami")
                .insert_header((AUTHORIZATION, "Bearer not.a.jwt"))
                .to_request(),
        )
        .await;
        assert_eq!(forged.status(), StatusCode::UNAUTHORIZED);
    }
}
