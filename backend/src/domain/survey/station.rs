//! Theoretical stations: design cross-section at a kilometre of a project.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use super::engine::{StationGeometry, left_slope};
use super::ids::{ProjectId, StationId};
use super::numeric::{ELEVATION, SLOPE};
use super::project::ProjectGeometry;
use super::validation::SurveyValidationError;

/// A stored station.
///
/// The left-side slope is never stored; [`Station::pendiente_izquierda`]
/// derives it from the right-side slope on every read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Station {
    pub id: StationId,
    pub proyecto_id: ProjectId,
    pub km: Decimal,
    pub pendiente_derecha: Decimal,
    pub base_cl: Decimal,
    pub observaciones: Option<String>,
    pub fecha_captura: DateTime<Utc>,
}

impl Station {
    /// Negated right-side slope.
    pub fn pendiente_izquierda(&self) -> Decimal {
        left_slope(self.pendiente_derecha)
    }

    /// Cross-section used by the quality engine.
    pub fn geometry(&self) -> StationGeometry {
        StationGeometry {
            pendiente_derecha: self.pendiente_derecha,
            base_cl: self.base_cl,
        }
    }
}

/// Caller-supplied station fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StationDraft {
    pub proyecto_id: ProjectId,
    pub km: Decimal,
    pub pendiente_derecha: Decimal,
    pub base_cl: Decimal,
    pub observaciones: Option<String>,
}

impl StationDraft {
    /// Validate against the owning project's range.
    pub fn into_new_station(
        self,
        project: &ProjectGeometry,
        now: DateTime<Utc>,
    ) -> Result<NewStation, SurveyValidationError> {
        Ok(NewStation {
            proyecto_id: self.proyecto_id,
            km: project.locate("km", self.km)?,
            pendiente_derecha: SLOPE.fit("pendiente_derecha", self.pendiente_derecha)?,
            base_cl: ELEVATION.fit("base_cl", self.base_cl)?,
            observaciones: self.observaciones,
            fecha_captura: now,
        })
    }
}

/// Validated station ready for insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStation {
    pub proyecto_id: ProjectId,
    pub km: Decimal,
    pub pendiente_derecha: Decimal,
    pub base_cl: Decimal,
    pub observaciones: Option<String>,
    pub fecha_captura: DateTime<Utc>,
}

/// Partial update of a station.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StationPatch {
    pub km: Option<Decimal>,
    pub pendiente_derecha: Option<Decimal>,
    pub base_cl: Option<Decimal>,
    pub observaciones: Option<String>,
}

impl StationPatch {
    /// Merge onto `station`, re-checking the km against the project range.
    pub fn apply(
        self,
        station: Station,
        project: &ProjectGeometry,
    ) -> Result<Station, SurveyValidationError> {
        Ok(Station {
            km: self
                .km
                .map(|km| project.locate("km", km))
                .transpose()?
                .unwrap_or(station.km),
            pendiente_derecha: self
                .pendiente_derecha
                .map(|slope| SLOPE.fit("pendiente_derecha", slope))
                .transpose()?
                .unwrap_or(station.pendiente_derecha),
            base_cl: self
                .base_cl
                .map(|base| ELEVATION.fit("base_cl", base))
                .transpose()?
                .unwrap_or(station.base_cl),
            observaciones: self.observaciones.or(station.observaciones),
            ..station
        })
    }
}
