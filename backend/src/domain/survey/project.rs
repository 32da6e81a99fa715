//! Projects: the kilometre range, cross-section template and lifecycle of a
//! surveyed road section.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use super::engine::division_axis;
use super::ids::ProjectId;
use super::numeric::{DIVISION, ELEVATION, INTERVAL, KM, SLOPE, THICKNESS, TOLERANCE};
use super::validation::{SurveyValidationError, non_negative, optional_text, require_text};
use crate::domain::UserId;

/// Largest number of stations generated for a single project.
pub const MAX_GENERATED_STATIONS: u64 = 10_000;

const NOMBRE_MAX: usize = 255;
const TRAMO_MAX: usize = 100;
const CUERPO_MAX: usize = 50;
const DEFAULT_CUERPO: &str = "A";

/// Lifecycle state of a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ProjectState {
    /// Freshly created; stations are being calibrated.
    #[default]
    Configuracion,
    EnProgreso,
    Completado,
    Pausado,
    Cancelado,
}

impl ProjectState {
    const ALLOWED: &'static str = "CONFIGURACION, EN_PROGRESO, COMPLETADO, PAUSADO, CANCELADO";

    /// Wire representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Configuracion => "CONFIGURACION",
            Self::EnProgreso => "EN_PROGRESO",
            Self::Completado => "COMPLETADO",
            Self::Pausado => "PAUSADO",
            Self::Cancelado => "CANCELADO",
        }
    }
}

impl fmt::Display for ProjectState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProjectState {
    type Err = SurveyValidationError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "CONFIGURACION" => Ok(Self::Configuracion),
            "EN_PROGRESO" => Ok(Self::EnProgreso),
            "COMPLETADO" => Ok(Self::Completado),
            "PAUSADO" => Ok(Self::Pausado),
            "CANCELADO" => Ok(Self::Cancelado),
            other => Err(SurveyValidationError::UnknownVariant {
                field: "estado",
                value: other.to_owned(),
                allowed: Self::ALLOWED,
            }),
        }
    }
}

/// Transverse offsets at which readings are taken, split by side.
///
/// ## Invariants
/// - Left offsets are `<= 0`, right offsets are `>= 0`.
/// - No offset repeats within a side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransverseDivisions {
    left: Vec<Decimal>,
    right: Vec<Decimal>,
}

impl TransverseDivisions {
    /// Validate and normalise both sides.
    pub fn new(left: Vec<Decimal>, right: Vec<Decimal>) -> Result<Self, SurveyValidationError> {
        Ok(Self {
            left: checked_side("divisiones_izquierdas", left, |d| d <= Decimal::ZERO)?,
            right: checked_side("divisiones_derechas", right, |d| d >= Decimal::ZERO)?,
        })
    }

    /// Offsets left of the centreline, in configured order.
    pub fn left(&self) -> &[Decimal] {
        &self.left
    }

    /// Offsets right of the centreline, in configured order.
    pub fn right(&self) -> &[Decimal] {
        &self.right
    }

    /// Sorted union of both sides.
    pub fn axis(&self) -> Vec<Decimal> {
        division_axis(&self.left, &self.right)
    }
}

impl Default for TransverseDivisions {
    fn default() -> Self {
        let left = [-12_210, -10_700, -9_000, -6_000, -3_000, -1_300, 0]
            .into_iter()
            .map(|milli| Decimal::new(milli, 3))
            .collect();
        let right = [1_300, 3_000, 6_000, 9_000, 10_700, 12_210]
            .into_iter()
            .map(|milli| Decimal::new(milli, 3))
            .collect();
        Self { left, right }
    }
}

fn checked_side(
    field: &'static str,
    offsets: Vec<Decimal>,
    on_side: impl Fn(Decimal) -> bool,
) -> Result<Vec<Decimal>, SurveyValidationError> {
    let mut accepted: Vec<Decimal> = Vec::with_capacity(offsets.len());
    for (index, raw) in offsets.into_iter().enumerate() {
        let offset = DIVISION.fit(field, raw)?;
        if !on_side(offset) {
            return Err(SurveyValidationError::DivisionWrongSide { field, index });
        }
        if accepted.contains(&offset) {
            return Err(SurveyValidationError::DuplicateDivision { field, index });
        }
        accepted.push(offset);
    }
    Ok(accepted)
}

/// Raw geometry as supplied by a caller; `None` selects the default.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeometryInput {
    pub km_inicial: Decimal,
    pub km_final: Decimal,
    pub intervalo: Option<Decimal>,
    pub espesor: Option<Decimal>,
    pub tolerancia_sct: Option<Decimal>,
    pub divisiones_izquierdas: Option<Vec<Decimal>>,
    pub divisiones_derechas: Option<Vec<Decimal>>,
}

/// Validated project geometry.
///
/// ## Invariants
/// - `km_final > km_inicial` and `intervalo > 0`.
/// - `espesor` and `tolerancia_sct` are non-negative.
/// - Every value is rescaled to its column scale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectGeometry {
    km_inicial: Decimal,
    km_final: Decimal,
    intervalo: Decimal,
    espesor: Decimal,
    tolerancia_sct: Decimal,
    divisions: TransverseDivisions,
}

impl TryFrom<GeometryInput> for ProjectGeometry {
    type Error = SurveyValidationError;

    fn try_from(input: GeometryInput) -> Result<Self, Self::Error> {
        let km_inicial = KM.fit("km_inicial", input.km_inicial)?;
        let km_final = KM.fit("km_final", input.km_final)?;
        if km_final <= km_inicial {
            return Err(SurveyValidationError::InvalidRange {
                km_inicial,
                km_final,
            });
        }
        let intervalo = INTERVAL.fit(
            "intervalo",
            input.intervalo.unwrap_or_else(|| Decimal::new(5, 0)),
        )?;
        if intervalo <= Decimal::ZERO {
            return Err(SurveyValidationError::NonPositiveInterval);
        }
        let espesor = non_negative(
            "espesor",
            THICKNESS.fit("espesor", input.espesor.unwrap_or_else(|| Decimal::new(25, 2)))?,
        )?;
        let tolerancia_sct = non_negative(
            "tolerancia_sct",
            TOLERANCE.fit(
                "tolerancia_sct",
                input.tolerancia_sct.unwrap_or_else(|| Decimal::new(5, 3)),
            )?,
        )?;
        let TransverseDivisions { left, right } = TransverseDivisions::default();
        let divisions = TransverseDivisions::new(
            input.divisiones_izquierdas.unwrap_or(left),
            input.divisiones_derechas.unwrap_or(right),
        )?;
        Ok(Self {
            km_inicial,
            km_final,
            intervalo,
            espesor,
            tolerancia_sct,
            divisions,
        })
    }
}

impl ProjectGeometry {
    pub fn km_inicial(&self) -> Decimal {
        self.km_inicial
    }

    pub fn km_final(&self) -> Decimal {
        self.km_final
    }

    pub fn intervalo(&self) -> Decimal {
        self.intervalo
    }

    pub fn espesor(&self) -> Decimal {
        self.espesor
    }

    pub fn tolerancia_sct(&self) -> Decimal {
        self.tolerancia_sct
    }

    pub fn divisions(&self) -> &TransverseDivisions {
        &self.divisions
    }

    /// Length of the surveyed range.
    pub fn longitud(&self) -> Decimal {
        self.km_final - self.km_inicial
    }

    /// Number of station positions on the range:
    /// `floor(longitud / intervalo) + 1`.
    pub fn total_estaciones(&self) -> u64 {
        self.longitud()
            .checked_div(self.intervalo)
            .and_then(|steps| steps.floor().to_u64())
            .map_or(0, |steps| steps.saturating_add(1))
    }

    /// Whether `km` lies within the closed project range.
    pub fn contains(&self, km: Decimal) -> bool {
        (self.km_inicial..=self.km_final).contains(&km)
    }

    /// Fit `km` to the kilometre column and require it within the range.
    pub fn locate(&self, field: &'static str, km: Decimal) -> Result<Decimal, SurveyValidationError> {
        let fitted = KM.fit(field, km)?;
        if !self.contains(fitted) {
            return Err(SurveyValidationError::OutsideProjectRange {
                field,
                value: fitted,
                km_inicial: self.km_inicial,
                km_final: self.km_final,
            });
        }
        Ok(fitted)
    }

    /// Station seeds at every interval step from `km_inicial` up to the last
    /// position not exceeding `km_final`.
    ///
    /// # Examples
    /// ```
    /// use rust_decimal::Decimal;
    /// use survey_backend::domain::survey::{GeometryInput, ProjectGeometry};
    ///
    /// let geometry = ProjectGeometry::try_from(GeometryInput {
    ///     km_inicial: Decimal::ZERO,
    ///     km_final: Decimal::new(10, 0),
    ///     ..GeometryInput::default()
    /// })
    /// .expect("valid geometry");
    /// let kms: Vec<String> = geometry
    ///     .station_plan()
    ///     .expect("plan")
    ///     .iter()
    ///     .map(|seed| seed.km.to_string())
    ///     .collect();
    /// assert_eq!(kms, ["0.000", "5.000", "10.000"]);
    /// ```
    pub fn station_plan(&self) -> Result<Vec<StationSeed>, SurveyValidationError> {
        let count = self.total_estaciones();
        if count > MAX_GENERATED_STATIONS {
            return Err(SurveyValidationError::TooManyStations {
                count,
                max: MAX_GENERATED_STATIONS,
            });
        }
        let pendiente_derecha = StationSeed::placeholder_slope();
        let base_cl = StationSeed::placeholder_base_cl();
        Ok((0..count)
            .map(|step| {
                // Arithmetic on zero operands drops the scale.
                let mut km = self.km_inicial + self.intervalo * Decimal::from(step);
                km.rescale(KM.scale());
                StationSeed {
                    km,
                    pendiente_derecha,
                    base_cl,
                }
            })
            .collect())
    }
}

/// Position and placeholder geometry of a generated station.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StationSeed {
    pub km: Decimal,
    pub pendiente_derecha: Decimal,
    pub base_cl: Decimal,
}

impl StationSeed {
    /// Slope stamped on generated stations pending calibration.
    pub fn placeholder_slope() -> Decimal {
        let mut slope = Decimal::new(2, 2);
        slope.rescale(SLOPE.scale());
        slope
    }

    /// Centreline elevation stamped on generated stations pending calibration.
    pub fn placeholder_base_cl() -> Decimal {
        let mut base = Decimal::new(1_886_140, 3);
        base.rescale(ELEVATION.scale());
        base
    }
}

/// A stored project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    pub id: ProjectId,
    pub owner: UserId,
    pub nombre: String,
    pub tramo: Option<String>,
    pub cuerpo: Option<String>,
    pub geometry: ProjectGeometry,
    pub estado: ProjectState,
    pub fecha_creacion: DateTime<Utc>,
    pub fecha_modificacion: DateTime<Utc>,
}

impl Project {
    /// Whether `caller` owns the project.
    pub fn is_owned_by(&self, caller: &UserId) -> bool {
        &self.owner == caller
    }
}

/// Caller-supplied fields for a new project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectDraft {
    pub nombre: String,
    pub tramo: Option<String>,
    pub cuerpo: Option<String>,
    pub geometry: GeometryInput,
}

impl ProjectDraft {
    /// Validate the draft into an insertable project owned by `owner`.
    pub fn into_new_project(
        self,
        owner: UserId,
        now: DateTime<Utc>,
    ) -> Result<NewProject, SurveyValidationError> {
        let cuerpo = self.cuerpo.unwrap_or_else(|| DEFAULT_CUERPO.to_owned());
        Ok(NewProject {
            owner,
            nombre: require_text("nombre", &self.nombre, NOMBRE_MAX)?,
            tramo: optional_text("tramo", self.tramo.as_deref(), TRAMO_MAX)?,
            cuerpo: optional_text("cuerpo", Some(cuerpo.as_str()), CUERPO_MAX)?,
            geometry: ProjectGeometry::try_from(self.geometry)?,
            estado: ProjectState::default(),
            fecha_creacion: now,
        })
    }
}

/// Validated project ready for insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProject {
    pub owner: UserId,
    pub nombre: String,
    pub tramo: Option<String>,
    pub cuerpo: Option<String>,
    pub geometry: ProjectGeometry,
    pub estado: ProjectState,
    pub fecha_creacion: DateTime<Utc>,
}

/// Partial update of a project; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectPatch {
    pub nombre: Option<String>,
    pub tramo: Option<String>,
    pub cuerpo: Option<String>,
    pub km_inicial: Option<Decimal>,
    pub km_final: Option<Decimal>,
    pub intervalo: Option<Decimal>,
    pub espesor: Option<Decimal>,
    pub tolerancia_sct: Option<Decimal>,
    pub divisiones_izquierdas: Option<Vec<Decimal>>,
    pub divisiones_derechas: Option<Vec<Decimal>>,
    pub estado: Option<String>,
}

impl ProjectPatch {
    /// Merge onto `project` and re-validate the result as a whole.
    pub fn apply(self, project: Project, now: DateTime<Utc>) -> Result<Project, SurveyValidationError> {
        let current = &project.geometry;
        let geometry = ProjectGeometry::try_from(GeometryInput {
            km_inicial: self.km_inicial.unwrap_or(current.km_inicial),
            km_final: self.km_final.unwrap_or(current.km_final),
            intervalo: Some(self.intervalo.unwrap_or(current.intervalo)),
            espesor: Some(self.espesor.unwrap_or(current.espesor)),
            tolerancia_sct: Some(self.tolerancia_sct.unwrap_or(current.tolerancia_sct)),
            divisiones_izquierdas: Some(
                self.divisiones_izquierdas
                    .unwrap_or_else(|| current.divisions.left.clone()),
            ),
            divisiones_derechas: Some(
                self.divisiones_derechas
                    .unwrap_or_else(|| current.divisions.right.clone()),
            ),
        })?;
        let nombre = match self.nombre {
            Some(nombre) => require_text("nombre", &nombre, NOMBRE_MAX)?,
            None => project.nombre,
        };
        let tramo = match self.tramo {
            Some(tramo) => optional_text("tramo", Some(tramo.as_str()), TRAMO_MAX)?,
            None => project.tramo,
        };
        let cuerpo = match self.cuerpo {
            Some(cuerpo) => optional_text("cuerpo", Some(cuerpo.as_str()), CUERPO_MAX)?,
            None => project.cuerpo,
        };
        let estado = match self.estado {
            Some(raw) => raw.parse()?,
            None => project.estado,
        };
        Ok(Project {
            nombre,
            tramo,
            cuerpo,
            geometry,
            estado,
            fecha_modificacion: now,
            ..project
        })
    }
}
