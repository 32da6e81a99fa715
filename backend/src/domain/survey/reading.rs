//! Division readings: one rod reading at a transverse offset of a
//! measurement.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use super::engine::ReadingMetrics;
use super::ids::{MeasurementId, ReadingId};
use super::numeric::{DIVISION, ROD_READING};
use super::validation::{SurveyValidationError, non_negative};

/// Surveyor's confidence in a reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum QualityTag {
    Excelente,
    #[default]
    Buena,
    Regular,
    Mala,
    Revisar,
}

impl QualityTag {
    const ALLOWED: &'static str = "EXCELENTE, BUENA, REGULAR, MALA, REVISAR";

    /// Wire representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Excelente => "EXCELENTE",
            Self::Buena => "BUENA",
            Self::Regular => "REGULAR",
            Self::Mala => "MALA",
            Self::Revisar => "REVISAR",
        }
    }
}

impl fmt::Display for QualityTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QualityTag {
    type Err = SurveyValidationError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "EXCELENTE" => Ok(Self::Excelente),
            "BUENA" => Ok(Self::Buena),
            "REGULAR" => Ok(Self::Regular),
            "MALA" => Ok(Self::Mala),
            "REVISAR" => Ok(Self::Revisar),
            other => Err(SurveyValidationError::UnknownVariant {
                field: "calidad",
                value: other.to_owned(),
                allowed: Self::ALLOWED,
            }),
        }
    }
}

/// A stored reading. Derived metrics live in [`ReadingReport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DivisionReading {
    pub id: ReadingId,
    pub medicion_id: MeasurementId,
    pub division_transversal: Decimal,
    pub lectura_mira: Decimal,
    pub calidad: QualityTag,
    pub fecha_calculo: DateTime<Utc>,
}

/// A reading together with the metrics evaluated for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadingReport {
    pub reading: DivisionReading,
    pub metrics: ReadingMetrics,
}

fn fit_division(value: Decimal) -> Result<Decimal, SurveyValidationError> {
    DIVISION.fit("division_transversal", value)
}

fn fit_rod_reading(value: Decimal) -> Result<Decimal, SurveyValidationError> {
    non_negative("lectura_mira", ROD_READING.fit("lectura_mira", value)?)
}

/// Caller-supplied reading fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadingDraft {
    pub medicion_id: MeasurementId,
    pub division_transversal: Decimal,
    pub lectura_mira: Decimal,
    /// Raw quality tag; defaults to `BUENA`.
    pub calidad: Option<String>,
}

impl ReadingDraft {
    /// Validate into an upsert keyed by `(medicion_id, division_transversal)`.
    pub fn into_upsert(self, now: DateTime<Utc>) -> Result<ReadingUpsert, SurveyValidationError> {
        Ok(ReadingUpsert {
            medicion_id: self.medicion_id,
            division_transversal: fit_division(self.division_transversal)?,
            lectura_mira: fit_rod_reading(self.lectura_mira)?,
            calidad: self
                .calidad
                .map(|raw| raw.parse())
                .transpose()?
                .unwrap_or_default(),
            fecha_calculo: now,
        })
    }
}

/// Validated insert-or-update of the reading at one transverse position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadingUpsert {
    pub medicion_id: MeasurementId,
    pub division_transversal: Decimal,
    pub lectura_mira: Decimal,
    pub calidad: QualityTag,
    pub fecha_calculo: DateTime<Utc>,
}

/// Partial update of a reading.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadingPatch {
    pub division_transversal: Option<Decimal>,
    pub lectura_mira: Option<Decimal>,
    pub calidad: Option<String>,
}

impl ReadingPatch {
    /// Merge onto `reading`, stamping the recalculation time.
    pub fn apply(
        self,
        reading: DivisionReading,
        now: DateTime<Utc>,
    ) -> Result<DivisionReading, SurveyValidationError> {
        Ok(DivisionReading {
            division_transversal: self
                .division_transversal
                .map(fit_division)
                .transpose()?
                .unwrap_or(reading.division_transversal),
            lectura_mira: self
                .lectura_mira
                .map(fit_rod_reading)
                .transpose()?
                .unwrap_or(reading.lectura_mira),
            calidad: self
                .calidad
                .map(|raw| raw.parse())
                .transpose()?
                .unwrap_or(reading.calidad),
            fecha_calculo: now,
            ..reading
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::{fixture, rstest};

    fn dec(raw: &str) -> Decimal {
        raw.parse().expect("decimal literal")
    }

    #[fixture]
    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 8, 0, 0)
            .single()
            .expect("valid timestamp")
    }

    fn draft(lectura: &str, calidad: Option<&str>) -> ReadingDraft {
        ReadingDraft {
            medicion_id: MeasurementId::new(5),
            division_transversal: dec("3.0"),
            lectura_mira: dec(lectura),
            calidad: calidad.map(str::to_owned),
        }
    }

    #[rstest]
    fn draft_defaults_quality_and_rescales(now: DateTime<Utc>) {
        let upsert = draft("1.2", None).into_upsert(now).expect("valid draft");
        assert_eq!(upsert.calidad, QualityTag::Buena);
        assert_eq!(upsert.division_transversal.to_string(), "3.000");
        assert_eq!(upsert.lectura_mira.to_string(), "1.200000");
    }

    #[rstest]
    #[case("-0.001", "lectura_mira")]
    #[case("100", "lectura_mira")]
    fn invalid_rod_readings_are_rejected(
        now: DateTime<Utc>,
        #[case] lectura: &str,
        #[case] field: &str,
    ) {
        let err = draft(lectura, None).into_upsert(now).expect_err("invalid");
        assert_eq!(err.field(), field);
    }

    #[rstest]
    fn unknown_quality_is_rejected(now: DateTime<Utc>) {
        let err = draft("1.2", Some("PERFECTA"))
            .into_upsert(now)
            .expect_err("unknown quality");
        assert_eq!(err.code(), "unknown_variant");
        assert_eq!(err.field(), "calidad");
    }

    #[rstest]
    fn patch_keeps_untouched_fields(now: DateTime<Utc>) {
        let reading = DivisionReading {
            id: ReadingId::new(1),
            medicion_id: MeasurementId::new(5),
            division_transversal: dec("3.000"),
            lectura_mira: dec("1.200000"),
            calidad: QualityTag::Regular,
            fecha_calculo: now,
        };
        let later = now + chrono::Duration::minutes(5);

        let updated = ReadingPatch {
            lectura_mira: Some(dec("1.35")),
            ..ReadingPatch::default()
        }
        .apply(reading, later)
        .expect("valid patch");

        assert_eq!(updated.lectura_mira, dec("1.35"));
        assert_eq!(updated.calidad, QualityTag::Regular);
        assert_eq!(updated.division_transversal, dec("3"));
        assert_eq!(updated.fecha_calculo, later);
    }
}
