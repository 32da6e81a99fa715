//! Field measurements: the benchmark set-up at a station kilometre.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::engine::instrument_height;
use super::ids::{MeasurementId, ProjectId};
use super::numeric::{ELEVATION, ROD_READING};
use super::project::ProjectGeometry;
use super::validation::{SurveyValidationError, non_negative, optional_text};

const OPERADOR_MAX: usize = 100;
const CLIMA_MAX: usize = 100;

/// A stored measurement.
///
/// Instrument height is derived on read from the benchmark inputs and is
/// unknown while either input is missing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Measurement {
    pub id: MeasurementId,
    pub proyecto_id: ProjectId,
    pub estacion_km: Decimal,
    pub bn_altura: Option<Decimal>,
    pub bn_lectura: Option<Decimal>,
    pub fecha_medicion: NaiveDate,
    pub operador: Option<String>,
    pub condiciones_clima: Option<String>,
    pub observaciones: Option<String>,
}

impl Measurement {
    /// `bn_altura + bn_lectura` when both are set.
    pub fn altura_aparato(&self) -> Option<Decimal> {
        Some(instrument_height(self.bn_altura?, self.bn_lectura?))
    }
}

fn fit_benchmark(
    bn_altura: Option<Decimal>,
    bn_lectura: Option<Decimal>,
) -> Result<(Option<Decimal>, Option<Decimal>), SurveyValidationError> {
    let altura = bn_altura
        .map(|value| ELEVATION.fit("bn_altura", value))
        .transpose()?;
    let lectura = bn_lectura
        .map(|value| {
            ROD_READING
                .fit("bn_lectura", value)
                .and_then(|fitted| non_negative("bn_lectura", fitted))
        })
        .transpose()?;
    Ok((altura, lectura))
}

/// Caller-supplied measurement fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeasurementDraft {
    pub proyecto_id: ProjectId,
    pub estacion_km: Decimal,
    pub bn_altura: Option<Decimal>,
    pub bn_lectura: Option<Decimal>,
    /// Defaults to the current date.
    pub fecha_medicion: Option<NaiveDate>,
    pub operador: Option<String>,
    pub condiciones_clima: Option<String>,
    pub observaciones: Option<String>,
}

impl MeasurementDraft {
    /// Validate against the owning project's range.
    pub fn into_new_measurement(
        self,
        project: &ProjectGeometry,
        today: NaiveDate,
    ) -> Result<NewMeasurement, SurveyValidationError> {
        let (bn_altura, bn_lectura) = fit_benchmark(self.bn_altura, self.bn_lectura)?;
        Ok(NewMeasurement {
            proyecto_id: self.proyecto_id,
            estacion_km: project.locate("estacion_km", self.estacion_km)?,
            bn_altura,
            bn_lectura,
            fecha_medicion: self.fecha_medicion.unwrap_or(today),
            operador: optional_text("operador", self.operador.as_deref(), OPERADOR_MAX)?,
            condiciones_clima: optional_text(
                "condiciones_clima",
                self.condiciones_clima.as_deref(),
                CLIMA_MAX,
            )?,
            observaciones: self.observaciones,
        })
    }
}

/// Validated measurement ready for insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMeasurement {
    pub proyecto_id: ProjectId,
    pub estacion_km: Decimal,
    pub bn_altura: Option<Decimal>,
    pub bn_lectura: Option<Decimal>,
    pub fecha_medicion: NaiveDate,
    pub operador: Option<String>,
    pub condiciones_clima: Option<String>,
    pub observaciones: Option<String>,
}

/// Partial update of a measurement.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MeasurementPatch {
    pub estacion_km: Option<Decimal>,
    pub bn_altura: Option<Decimal>,
    pub bn_lectura: Option<Decimal>,
    pub fecha_medicion: Option<NaiveDate>,
    pub operador: Option<String>,
    pub condiciones_clima: Option<String>,
    pub observaciones: Option<String>,
}

impl MeasurementPatch {
    /// Merge onto `measurement`, re-checking the km against the project range.
    pub fn apply(
        self,
        measurement: Measurement,
        project: &ProjectGeometry,
    ) -> Result<Measurement, SurveyValidationError> {
        let estacion_km = match self.estacion_km {
            Some(km) => project.locate("estacion_km", km)?,
            None => measurement.estacion_km,
        };
        let (bn_altura, bn_lectura) = fit_benchmark(self.bn_altura, self.bn_lectura)?;
        let operador = match self.operador {
            Some(text) => optional_text("operador", Some(text.as_str()), OPERADOR_MAX)?,
            None => measurement.operador,
        };
        let condiciones_clima = match self.condiciones_clima {
            Some(text) => optional_text("condiciones_clima", Some(text.as_str()), CLIMA_MAX)?,
            None => measurement.condiciones_clima,
        };
        Ok(Measurement {
            estacion_km,
            bn_altura: bn_altura.or(measurement.bn_altura),
            bn_lectura: bn_lectura.or(measurement.bn_lectura),
            fecha_medicion: self.fecha_medicion.unwrap_or(measurement.fecha_medicion),
            operador,
            condiciones_clima,
            observaciones: self.observaciones.or(measurement.observaciones),
            ..measurement
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::survey::GeometryInput;
    use rstest::{fixture, rstest};

    fn dec(raw: &str) -> Decimal {
        raw.parse().expect("decimal literal")
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[fixture]
    fn geometry() -> ProjectGeometry {
        ProjectGeometry::try_from(GeometryInput {
            km_inicial: dec("0"),
            km_final: dec("10"),
            ..GeometryInput::default()
        })
        .expect("geometry")
    }

    #[fixture]
    fn measurement() -> Measurement {
        Measurement {
            id: MeasurementId::new(5),
            proyecto_id: ProjectId::new(1),
            estacion_km: dec("5.000"),
            bn_altura: Some(dec("1885.123456")),
            bn_lectura: Some(dec("1.654321")),
            fecha_medicion: date(2025, 3, 1),
            operador: Some("Luis".into()),
            condiciones_clima: None,
            observaciones: None,
        }
    }

    #[rstest]
    fn instrument_height_is_the_exact_sum(measurement: Measurement) {
        assert_eq!(measurement.altura_aparato(), Some(dec("1886.777777")));
    }

    #[rstest]
    fn instrument_height_unknown_without_both_inputs(measurement: Measurement) {
        let partial = Measurement {
            bn_lectura: None,
            ..measurement
        };
        assert_eq!(partial.altura_aparato(), None);
    }

    #[rstest]
    fn draft_defaults_the_date_and_checks_range(geometry: ProjectGeometry) {
        let today = date(2025, 6, 2);
        let draft = MeasurementDraft {
            proyecto_id: ProjectId::new(1),
            estacion_km: dec("5"),
            bn_altura: Some(dec("1885.5")),
            bn_lectura: Some(dec("1.5")),
            fecha_medicion: None,
            operador: None,
            condiciones_clima: Some("Soleado".into()),
            observaciones: None,
        };

        let new = draft
            .clone()
            .into_new_measurement(&geometry, today)
            .expect("valid draft");
        assert_eq!(new.fecha_medicion, today);
        assert_eq!(new.estacion_km.to_string(), "5.000");
        assert_eq!(new.bn_altura.map(|v| v.to_string()).as_deref(), Some("1885.500000"));

        let err = MeasurementDraft {
            estacion_km: dec("11"),
            ..draft
        }
        .into_new_measurement(&geometry, today)
        .expect_err("outside range");
        assert_eq!(err.field(), "estacion_km");
    }

    #[rstest]
    fn negative_benchmark_reading_is_rejected(geometry: ProjectGeometry) {
        let err = MeasurementDraft {
            proyecto_id: ProjectId::new(1),
            estacion_km: dec("5"),
            bn_altura: None,
            bn_lectura: Some(dec("-0.1")),
            fecha_medicion: None,
            operador: None,
            condiciones_clima: None,
            observaciones: None,
        }
        .into_new_measurement(&geometry, date(2025, 1, 1))
        .expect_err("negative reading");
        assert_eq!(err, SurveyValidationError::Negative { field: "bn_lectura" });
    }

    #[rstest]
    fn patch_recomputes_instrument_height(measurement: Measurement, geometry: ProjectGeometry) {
        let updated = MeasurementPatch {
            bn_lectura: Some(dec("2")),
            ..MeasurementPatch::default()
        }
        .apply(measurement, &geometry)
        .expect("valid patch");

        assert_eq!(updated.altura_aparato(), Some(dec("1887.123456")));
        assert_eq!(updated.operador.as_deref(), Some("Luis"));
    }

    #[rstest]
    fn patch_rejects_overlong_operator(measurement: Measurement, geometry: ProjectGeometry) {
        let err = MeasurementPatch {
            operador: Some("o".repeat(101)),
            ..MeasurementPatch::default()
        }
        .apply(measurement, &geometry)
        .expect_err("too long");
        assert_eq!(err.field(), "operador");
    }
}
