//! Geometry and quality engine.
//!
//! Pure fixed-point functions that turn a rod reading into engineering
//! metrics. Nothing here touches the store; callers gather the measurement,
//! station and project context and hand it to [`evaluate`].
//!
//! Derived elevations are rounded half away from zero to six decimal places,
//! the scale of the elevation columns they would occupy.

use std::fmt;

use rust_decimal::{Decimal, RoundingStrategy};

use super::numeric::DERIVED_SCALE;

/// Comparison of the real base elevation against the design base.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Classification {
    /// Within tolerance.
    Cumple,
    /// Real base sits above design; material must be cut.
    Corte,
    /// Real base sits below design; fill is required.
    Terraplen,
}

impl Classification {
    /// Wire representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cumple => "CUMPLE",
            Self::Corte => "CORTE",
            Self::Terraplen => "TERRAPLEN",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cross-section geometry of a theoretical station.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StationGeometry {
    /// Slope applied to offsets right of the centreline.
    pub pendiente_derecha: Decimal,
    /// Centreline base elevation.
    pub base_cl: Decimal,
}

impl StationGeometry {
    /// Slope applied to offsets left of the centreline.
    pub fn pendiente_izquierda(&self) -> Decimal {
        left_slope(self.pendiente_derecha)
    }

    /// Slope governing the given transverse offset.
    pub fn slope_at(&self, division: Decimal) -> Decimal {
        if division < Decimal::ZERO {
            self.pendiente_izquierda()
        } else {
            self.pendiente_derecha
        }
    }
}

/// Everything needed to evaluate readings of one measurement.
#[derive(Debug, Clone, Copy)]
pub struct ReadingContext<'a> {
    /// Instrument height of the parent measurement, when known.
    pub altura_aparato: Option<Decimal>,
    /// Station at the measurement's km, when one exists.
    pub station: Option<StationGeometry>,
    /// Design slab thickness of the project.
    pub espesor: Decimal,
    /// Elevation tolerance of the project.
    pub tolerancia_sct: Decimal,
    /// Sorted union of the project's transverse divisions.
    pub divisions: &'a [Decimal],
}

/// Derived attributes of a division reading. Each is unset until its inputs
/// are known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReadingMetrics {
    pub elv_base_real: Option<Decimal>,
    pub elv_base_proyecto: Option<Decimal>,
    pub elv_concreto_proyecto: Option<Decimal>,
    pub esp_concreto_proyecto: Option<Decimal>,
    pub volumen_por_metro: Option<Decimal>,
    pub clasificacion: Option<Classification>,
    pub cumple_tolerancia: Option<bool>,
}

fn round(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DERIVED_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Left-side slope: the negated right-side slope.
///
/// # Examples
/// ```
/// use rust_decimal::Decimal;
/// use survey_backend::domain::survey::engine::left_slope;
///
/// assert_eq!(left_slope(Decimal::new(2, 2)), Decimal::new(-2, 2));
/// ```
pub fn left_slope(pendiente_derecha: Decimal) -> Decimal {
    -pendiente_derecha
}

/// Instrument height above datum: benchmark elevation plus its rod reading.
pub fn instrument_height(bn_altura: Decimal, bn_lectura: Decimal) -> Decimal {
    bn_altura + bn_lectura
}

/// Real base elevation under the rod.
pub fn real_base_elevation(altura_aparato: Option<Decimal>, lectura_mira: Decimal) -> Option<Decimal> {
    altura_aparato.map(|height| height - lectura_mira)
}

/// Design base elevation at a transverse offset of a station.
pub fn design_base_elevation(station: &StationGeometry, division: Decimal) -> Decimal {
    round(station.base_cl + division * station.slope_at(division))
}

/// Whether the real base lies within `tolerance` of the design base.
///
/// # Examples
/// ```
/// use rust_decimal::Decimal;
/// use survey_backend::domain::survey::engine::within_tolerance;
///
/// let tol = Decimal::new(5, 3);
/// let design = Decimal::new(100_000, 3);
/// assert_eq!(within_tolerance(Some(Decimal::new(100_004, 3)), Some(design), tol), Some(true));
/// assert_eq!(within_tolerance(Some(Decimal::new(100_006, 3)), Some(design), tol), Some(false));
/// assert_eq!(within_tolerance(None, Some(design), tol), None);
/// ```
pub fn within_tolerance(
    real: Option<Decimal>,
    design: Option<Decimal>,
    tolerance: Decimal,
) -> Option<bool> {
    Some((real? - design?).abs() <= tolerance)
}

/// Classify the real base against the design base.
pub fn classify(
    real: Option<Decimal>,
    design: Option<Decimal>,
    tolerance: Decimal,
) -> Option<Classification> {
    let delta = real? - design?;
    Some(if delta > tolerance {
        Classification::Corte
    } else if delta < -tolerance {
        Classification::Terraplen
    } else {
        Classification::Cumple
    })
}

/// Sorted, de-duplicated union of left and right division offsets.
pub fn division_axis(left: &[Decimal], right: &[Decimal]) -> Vec<Decimal> {
    let mut axis: Vec<Decimal> = left.iter().chain(right).copied().collect();
    axis.sort_unstable();
    axis.dedup();
    axis
}

/// Width of the strip a division represents on the sorted `axis`.
///
/// Half the span between the neighbouring offsets, or half the gap to the
/// single neighbour at either edge. Offsets absent from the axis, and axes
/// with a single offset, have no width.
pub fn tributary_width(axis: &[Decimal], division: Decimal) -> Option<Decimal> {
    let position = axis.iter().position(|offset| *offset == division)?;
    let previous = position.checked_sub(1).and_then(|index| axis.get(index));
    let next = axis.get(position + 1);
    let span = match (previous, next) {
        (Some(before), Some(after)) => *after - *before,
        (None, Some(after)) => *after - division,
        (Some(before), None) => division - *before,
        (None, None) => return None,
    };
    Some(span / Decimal::TWO)
}

/// Evaluate every derived attribute of a reading.
///
/// # Examples
/// ```
/// use rust_decimal::Decimal;
/// use survey_backend::domain::survey::engine::{evaluate, Classification, ReadingContext, StationGeometry};
///
/// let axis = [Decimal::ZERO, Decimal::new(3, 0)];
/// let ctx = ReadingContext {
///     altura_aparato: Some(Decimal::new(101_500, 3)),
///     station: Some(StationGeometry { pendiente_derecha: Decimal::ZERO, base_cl: Decimal::new(100, 0) }),
///     espesor: Decimal::new(25, 2),
///     tolerancia_sct: Decimal::new(5, 3),
///     divisions: &axis,
/// };
/// let metrics = evaluate(&ctx, Decimal::ZERO, Decimal::new(1_500, 3));
/// assert_eq!(metrics.clasificacion, Some(Classification::Cumple));
/// assert_eq!(metrics.esp_concreto_proyecto, Some(Decimal::new(25, 2)));
/// ```
pub fn evaluate(ctx: &ReadingContext<'_>, division: Decimal, lectura_mira: Decimal) -> ReadingMetrics {
    let elv_base_real = real_base_elevation(ctx.altura_aparato, lectura_mira);
    let elv_base_proyecto = ctx
        .station
        .map(|station| design_base_elevation(&station, division));
    let elv_concreto_proyecto = elv_base_proyecto.map(|design| design + ctx.espesor);
    let esp_concreto_proyecto = elv_concreto_proyecto
        .zip(elv_base_real)
        .map(|(slab, real)| slab - real);
    let volumen_por_metro = esp_concreto_proyecto
        .zip(tributary_width(ctx.divisions, division))
        .map(|(thickness, width)| round(thickness * width));

    ReadingMetrics {
        elv_base_real,
        elv_base_proyecto,
        elv_concreto_proyecto,
        esp_concreto_proyecto,
        volumen_por_metro,
        clasificacion: classify(elv_base_real, elv_base_proyecto, ctx.tolerancia_sct),
        cumple_tolerancia: within_tolerance(elv_base_real, elv_base_proyecto, ctx.tolerancia_sct),
    }
}
