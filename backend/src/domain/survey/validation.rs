//! Validation failures for survey entities.

use rust_decimal::Decimal;
use serde_json::json;

use crate::domain::Error;

/// A survey input rejected before it reaches the store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SurveyValidationError {
    #[error("{field} must not be blank")]
    Blank { field: &'static str },
    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },
    #[error("{field} does not fit NUMERIC({precision}, {scale})")]
    OutOfPrecision {
        field: &'static str,
        precision: u32,
        scale: u32,
    },
    #[error("km_final ({km_final}) must be greater than km_inicial ({km_inicial})")]
    InvalidRange { km_inicial: Decimal, km_final: Decimal },
    #[error("intervalo must be greater than 0")]
    NonPositiveInterval,
    #[error("{field} must not be negative")]
    Negative { field: &'static str },
    #[error("{field} must be one of {allowed}")]
    UnknownVariant {
        field: &'static str,
        value: String,
        allowed: &'static str,
    },
    #[error("{field}[{index}] lies on the wrong side of the centreline")]
    DivisionWrongSide { field: &'static str, index: usize },
    #[error("{field}[{index}] repeats an earlier offset")]
    DuplicateDivision { field: &'static str, index: usize },
    #[error("{field} {value} lies outside the project range {km_inicial} to {km_final}")]
    OutsideProjectRange {
        field: &'static str,
        value: Decimal,
        km_inicial: Decimal,
        km_final: Decimal,
    },
    #[error("generating {count} stations exceeds the limit of {max}")]
    TooManyStations { count: u64, max: u64 },
}

impl SurveyValidationError {
    /// Input field the failure refers to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::Blank { field }
            | Self::TooLong { field, .. }
            | Self::OutOfPrecision { field, .. }
            | Self::Negative { field }
            | Self::UnknownVariant { field, .. }
            | Self::DivisionWrongSide { field, .. }
            | Self::DuplicateDivision { field, .. }
            | Self::OutsideProjectRange { field, .. } => field,
            Self::InvalidRange { .. } => "km_final",
            Self::NonPositiveInterval | Self::TooManyStations { .. } => "intervalo",
        }
    }

    /// Stable machine-readable reason.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Blank { .. } => "blank",
            Self::TooLong { .. } => "too_long",
            Self::OutOfPrecision { .. } => "out_of_precision",
            Self::InvalidRange { .. } => "invalid_range",
            Self::NonPositiveInterval => "non_positive",
            Self::Negative { .. } => "negative",
            Self::UnknownVariant { .. } => "unknown_variant",
            Self::DivisionWrongSide { .. } => "wrong_side",
            Self::DuplicateDivision { .. } => "duplicate_division",
            Self::OutsideProjectRange { .. } => "outside_project_range",
            Self::TooManyStations { .. } => "too_many_stations",
        }
    }
}

impl From<SurveyValidationError> for Error {
    fn from(value: SurveyValidationError) -> Self {
        let mut details = json!({ "field": value.field(), "code": value.code() });
        if let SurveyValidationError::UnknownVariant { value: raw, .. } = &value {
            details["value"] = json!(raw);
        }
        Error::invalid_request(value.to_string()).with_details(details)
    }
}

pub(crate) fn require_text(
    field: &'static str,
    value: &str,
    max: usize,
) -> Result<String, SurveyValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(SurveyValidationError::Blank { field });
    }
    optional_text(field, Some(trimmed), max).map(|text| text.unwrap_or_default())
}

pub(crate) fn optional_text(
    field: &'static str,
    value: Option<&str>,
    max: usize,
) -> Result<Option<String>, SurveyValidationError> {
    let Some(text) = value else {
        return Ok(None);
    };
    if text.chars().count() > max {
        return Err(SurveyValidationError::TooLong { field, max });
    }
    Ok(Some(text.to_owned()))
}

pub(crate) fn non_negative(
    field: &'static str,
    value: Decimal,
) -> Result<Decimal, SurveyValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(SurveyValidationError::Negative { field });
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    #[rstest]
    fn converts_into_invalid_request_with_details() {
        let err: Error = SurveyValidationError::NonPositiveInterval.into();
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        assert_eq!(
            err.details(),
            Some(&json!({ "field": "intervalo", "code": "non_positive" }))
        );
    }

    #[rstest]
    fn unknown_variants_echo_the_value() {
        let err: Error = SurveyValidationError::UnknownVariant {
            field: "calidad",
            value: "PERFECTA".into(),
            allowed: "EXCELENTE, BUENA, REGULAR, MALA, REVISAR",
        }
        .into();
        let details = err.details().expect("details");
        assert_eq!(details["value"], json!("PERFECTA"));
        assert_eq!(details["field"], json!("calidad"));
    }

    #[rstest]
    #[case("   ", Err(SurveyValidationError::Blank { field: "nombre" }))]
    #[case(" Tramo norte ", Ok("Tramo norte".to_owned()))]
    fn require_text_trims_and_rejects_blank(
        #[case] raw: &str,
        #[case] expected: Result<String, SurveyValidationError>,
    ) {
        assert_eq!(require_text("nombre", raw, 255), expected);
    }

    #[rstest]
    fn optional_text_enforces_length() {
        let long = "x".repeat(101);
        assert_eq!(
            optional_text("operador", Some(&long), 100),
            Err(SurveyValidationError::TooLong {
                field: "operador",
                max: 100
            })
        );
    }
}
