//! Shared validation helpers for inbound HTTP adapters.
//!
//! Anything rejected here never reaches a service. Extractor failures (bad
//! JSON, non-numeric path segments, malformed query strings) are rewritten
//! into the domain error shape so every 400 looks the same to clients.

use actix_web::error::{JsonPayloadError, PathError, QueryPayloadError};
use actix_web::{HttpRequest, web};
use pagination::{PageParams, PaginationError};
use serde::Deserialize;
use serde_json::json;
use utoipa::IntoParams;

use crate::domain::Error;

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    InvalidPage,
    MalformedBody,
    MalformedQuery,
    MalformedPath,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            Self::InvalidPage => "invalid_page",
            Self::MalformedBody => "malformed_body",
            Self::MalformedQuery => "malformed_query",
            Self::MalformedPath => "malformed_path",
        }
    }
}

fn invalid(code: ErrorCode, field: Option<&str>, message: impl Into<String>) -> Error {
    let details = match field {
        Some(field) => json!({ "field": field, "code": code.as_str() }),
        None => json!({ "code": code.as_str() }),
    };
    Error::invalid_request(message).with_details(details)
}

/// `skip`/`limit` query parameters shared by every list endpoint.
#[derive(Debug, Default, Clone, Copy, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    /// Rows to skip (default 0).
    pub skip: Option<i64>,
    /// Rows to return (default 100, at most 1000).
    pub limit: Option<i64>,
}

impl PageQuery {
    pub(crate) fn page(self) -> Result<PageParams, Error> {
        PageParams::from_raw(self.skip, self.limit).map_err(pagination_error)
    }
}

pub(crate) fn pagination_error(error: PaginationError) -> Error {
    invalid(ErrorCode::InvalidPage, Some(error.field()), error.to_string())
}

fn json_error(error: JsonPayloadError, _: &HttpRequest) -> actix_web::Error {
    let message = match &error {
        JsonPayloadError::Deserialize(inner) => format!("invalid JSON body: {inner}"),
        JsonPayloadError::ContentType => "expected an application/json body".to_owned(),
        other => format!("unreadable JSON body: {other}"),
    };
    invalid(ErrorCode::MalformedBody, None, message).into()
}

fn query_error(error: QueryPayloadError, _: &HttpRequest) -> actix_web::Error {
    invalid(
        ErrorCode::MalformedQuery,
        None,
        format!("invalid query string: {error}"),
    )
    .into()
}

fn path_error(error: PathError, _: &HttpRequest) -> actix_web::Error {
    invalid(
        ErrorCode::MalformedPath,
        None,
        format!("invalid path parameter: {error}"),
    )
    .into()
}

/// Extractor configuration routing every payload failure through
/// [`Error`].
pub fn extractor_config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error))
        .app_data(web::QueryConfig::default().error_handler(query_error))
        .app_data(web::PathConfig::default().error_handler(path_error));
}
