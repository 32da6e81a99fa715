//! Survey entities and the quality engine.
//!
//! Projects own stations and measurements; measurements own division
//! readings. Values derived from stored inputs (left slope, instrument
//! height, reading metrics) are computed on read and never persisted.

pub mod engine;
mod ids;
mod measurement;
pub mod numeric;
mod project;
mod reading;
mod station;
mod validation;

pub use engine::{Classification, ReadingContext, ReadingMetrics, StationGeometry};
pub use ids::{MeasurementId, ProjectId, ReadingId, StationId};
pub use measurement::{Measurement, MeasurementDraft, MeasurementPatch, NewMeasurement};
pub use project::{
    GeometryInput, MAX_GENERATED_STATIONS, NewProject, Project, ProjectDraft, ProjectGeometry,
    ProjectPatch, ProjectState, StationSeed, TransverseDivisions,
};
pub use reading::{
    DivisionReading, QualityTag, ReadingDraft, ReadingPatch, ReadingReport, ReadingUpsert,
};
pub use station::{NewStation, Station, StationDraft, StationPatch};
pub use validation::SurveyValidationError;
