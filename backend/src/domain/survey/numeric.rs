//! Fixed-point column shapes for survey quantities.
//!
//! Every decimal crossing into the store is checked against the
//! `NUMERIC(precision, scale)` shape of its column and rescaled to that scale,
//! so in-memory and relational adapters return the same representation.

use rust_decimal::Decimal;

use super::validation::SurveyValidationError;

/// Shape of a `NUMERIC(precision, scale)` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumericShape {
    precision: u32,
    scale: u32,
}

impl NumericShape {
    const fn new(precision: u32, scale: u32) -> Self {
        Self { precision, scale }
    }

    /// Total significant digits.
    pub const fn precision(self) -> u32 {
        self.precision
    }

    /// Digits after the decimal point.
    pub const fn scale(self) -> u32 {
        self.scale
    }

    /// Whether `value` fits the column without rounding.
    pub fn admits(self, value: Decimal) -> bool {
        let normalized = value.normalize();
        if normalized.scale() > self.scale {
            return false;
        }
        let integer_digits = self.precision.saturating_sub(self.scale);
        let bound = Decimal::from(10_i64.pow(integer_digits));
        normalized.abs().trunc() < bound
    }

    /// Check `value` and rescale it to the column scale.
    ///
    /// # Examples
    /// ```
    /// use rust_decimal::Decimal;
    /// use survey_backend::domain::survey::numeric::KM;
    ///
    /// let km = KM.fit("km", Decimal::new(25, 1)).expect("fits");
    /// assert_eq!(km.to_string(), "2.500");
    /// assert!(KM.fit("km", Decimal::new(25_001, 4)).is_err());
    /// ```
    pub fn fit(self, field: &'static str, value: Decimal) -> Result<Decimal, SurveyValidationError> {
        if !self.admits(value) {
            return Err(SurveyValidationError::OutOfPrecision {
                field,
                precision: self.precision,
                scale: self.scale,
            });
        }
        let mut fitted = value.normalize();
        fitted.rescale(self.scale);
        Ok(fitted)
    }
}

/// Kilometre positions.
pub const KM: NumericShape = NumericShape::new(10, 3);
/// Station interval.
pub const INTERVAL: NumericShape = NumericShape::new(6, 3);
/// Design slab thickness.
pub const THICKNESS: NumericShape = NumericShape::new(6, 3);
/// Elevation tolerance.
pub const TOLERANCE: NumericShape = NumericShape::new(8, 6);
/// Cross slopes.
pub const SLOPE: NumericShape = NumericShape::new(8, 6);
/// Elevations such as `base_cl` and `bn_altura`.
pub const ELEVATION: NumericShape = NumericShape::new(10, 6);
/// Rod readings (`bn_lectura`, `lectura_mira`).
pub const ROD_READING: NumericShape = NumericShape::new(8, 6);
/// Transverse division offsets.
pub const DIVISION: NumericShape = NumericShape::new(8, 3);
/// Scale of every derived elevation, thickness and volume.
pub const DERIVED_SCALE: u32 = 6;

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::str::FromStr;

    fn dec(raw: &str) -> Decimal {
        Decimal::from_str(raw).expect("decimal literal")
    }

    #[rstest]
    #[case(KM, "9999999.999", true)]
    #[case(KM, "10000000.000", false)]
    #[case(KM, "1.2345", false)]
    #[case(KM, "1.2340", true)]
    #[case(SLOPE, "-0.020000", true)]
    #[case(SLOPE, "99.999999", true)]
    #[case(SLOPE, "100", false)]
    #[case(DIVISION, "-12.21", true)]
    fn admits_follows_precision_and_scale(
        #[case] shape: NumericShape,
        #[case] raw: &str,
        #[case] expected: bool,
    ) {
        assert_eq!(shape.admits(dec(raw)), expected);
    }

    #[rstest]
    fn fit_rescales_to_column_scale() {
        let fitted = ELEVATION.fit("base_cl", dec("1886.14")).expect("fits");
        assert_eq!(fitted.to_string(), "1886.140000");
    }

    #[rstest]
    fn fit_reports_field_and_shape() {
        let err = INTERVAL.fit("intervalo", dec("1000")).expect_err("too wide");
        assert_eq!(
            err,
            SurveyValidationError::OutOfPrecision {
                field: "intervalo",
                precision: 6,
                scale: 3,
            }
        );
    }
}
