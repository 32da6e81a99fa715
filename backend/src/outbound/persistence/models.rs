//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. Rows read back from the store are turned
//! into domain values with `into_domain`, which re-runs the domain checks so
//! a hand-edited row cannot smuggle an invalid value past the services.

use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use rust_decimal::Decimal;

use super::schema::{
    estaciones_teoricas, lecturas_divisiones, mediciones_estacion, perfiles_usuario, proyectos,
};
use crate::domain::survey::{
    DivisionReading, GeometryInput, Measurement, MeasurementId, Project, ProjectGeometry,
    ProjectId, ReadingId, Station, StationId,
};
use crate::domain::{UserId, UserProfile};

// ---------------------------------------------------------------------------
// Profiles
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = perfiles_usuario)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ProfileRow {
    pub id: String,
    pub email: String,
    pub nombre_completo: String,
    pub empresa: Option<String>,
    pub organizacion: Option<String>,
    pub activo: bool,
    pub fecha_registro: DateTime<Utc>,
    pub fecha_actualizacion: DateTime<Utc>,
}

impl ProfileRow {
    pub(crate) fn into_domain(self) -> Result<UserProfile, String> {
        Ok(UserProfile {
            id: UserId::new(self.id).map_err(|err| err.to_string())?,
            email: self.email,
            nombre_completo: self.nombre_completo,
            empresa: self.empresa,
            organizacion: self.organizacion,
            activo: self.activo,
            fecha_registro: self.fecha_registro,
            fecha_actualizacion: self.fecha_actualizacion,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = perfiles_usuario)]
pub(crate) struct NewProfileRow<'a> {
    pub id: &'a str,
    pub email: &'a str,
    pub nombre_completo: &'a str,
    pub empresa: Option<&'a str>,
    pub organizacion: Option<&'a str>,
    pub activo: bool,
    pub fecha_registro: DateTime<Utc>,
    pub fecha_actualizacion: DateTime<Utc>,
}

impl<'a> From<&'a UserProfile> for NewProfileRow<'a> {
    fn from(profile: &'a UserProfile) -> Self {
        Self {
            id: profile.id.as_str(),
            email: &profile.email,
            nombre_completo: &profile.nombre_completo,
            empresa: profile.empresa.as_deref(),
            organizacion: profile.organizacion.as_deref(),
            activo: profile.activo,
            fecha_registro: profile.fecha_registro,
            fecha_actualizacion: profile.fecha_actualizacion,
        }
    }
}

/// Email and registration time are immutable after creation.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = perfiles_usuario)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct ProfileUpdate<'a> {
    pub nombre_completo: &'a str,
    pub empresa: Option<&'a str>,
    pub organizacion: Option<&'a str>,
    pub activo: bool,
    pub fecha_actualizacion: DateTime<Utc>,
}

impl<'a> From<&'a UserProfile> for ProfileUpdate<'a> {
    fn from(profile: &'a UserProfile) -> Self {
        Self {
            nombre_completo: &profile.nombre_completo,
            empresa: profile.empresa.as_deref(),
            organizacion: profile.organizacion.as_deref(),
            activo: profile.activo,
            fecha_actualizacion: profile.fecha_actualizacion,
        }
    }
}

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = proyectos)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ProjectRow {
    pub id: i32,
    pub usuario_id: String,
    pub nombre: String,
    pub tramo: Option<String>,
    pub cuerpo: Option<String>,
    pub km_inicial: Decimal,
    pub km_final: Decimal,
    pub intervalo: Decimal,
    pub espesor: Decimal,
    pub tolerancia_sct: Decimal,
    pub divisiones_izquierdas: Vec<Decimal>,
    pub divisiones_derechas: Vec<Decimal>,
    pub estado: String,
    pub fecha_creacion: DateTime<Utc>,
    pub fecha_modificacion: DateTime<Utc>,
}

impl ProjectRow {
    pub(crate) fn into_domain(self) -> Result<Project, String> {
        let geometry = ProjectGeometry::try_from(GeometryInput {
            km_inicial: self.km_inicial,
            km_final: self.km_final,
            intervalo: Some(self.intervalo),
            espesor: Some(self.espesor),
            tolerancia_sct: Some(self.tolerancia_sct),
            divisiones_izquierdas: Some(self.divisiones_izquierdas),
            divisiones_derechas: Some(self.divisiones_derechas),
        })
        .map_err(|err| format!("stored project {} is invalid: {err}", self.id))?;
        Ok(Project {
            id: ProjectId::new(self.id),
            owner: UserId::new(self.usuario_id).map_err(|err| err.to_string())?,
            nombre: self.nombre,
            tramo: self.tramo,
            cuerpo: self.cuerpo,
            geometry,
            estado: self.estado.parse().map_err(|err| format!("{err}"))?,
            fecha_creacion: self.fecha_creacion,
            fecha_modificacion: self.fecha_modificacion,
        })
    }
}

/// Project columns written on both insert and update.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = proyectos)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct ProjectFields<'a> {
    pub nombre: &'a str,
    pub tramo: Option<&'a str>,
    pub cuerpo: Option<&'a str>,
    pub km_inicial: Decimal,
    pub km_final: Decimal,
    pub intervalo: Decimal,
    pub espesor: Decimal,
    pub tolerancia_sct: Decimal,
    pub divisiones_izquierdas: &'a [Decimal],
    pub divisiones_derechas: &'a [Decimal],
    pub estado: &'static str,
    pub fecha_modificacion: DateTime<Utc>,
}

impl<'a> ProjectFields<'a> {
    pub(crate) fn new(
        nombre: &'a str,
        tramo: Option<&'a str>,
        cuerpo: Option<&'a str>,
        geometry: &'a ProjectGeometry,
        estado: &'static str,
        fecha_modificacion: DateTime<Utc>,
    ) -> Self {
        Self {
            nombre,
            tramo,
            cuerpo,
            km_inicial: geometry.km_inicial(),
            km_final: geometry.km_final(),
            intervalo: geometry.intervalo(),
            espesor: geometry.espesor(),
            tolerancia_sct: geometry.tolerancia_sct(),
            divisiones_izquierdas: geometry.divisions().left(),
            divisiones_derechas: geometry.divisions().right(),
            estado,
            fecha_modificacion,
        }
    }
}

// ---------------------------------------------------------------------------
// Stations
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = estaciones_teoricas)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct StationRow {
    pub id: i32,
    pub proyecto_id: i32,
    pub km: Decimal,
    pub pendiente_derecha: Decimal,
    pub base_cl: Decimal,
    pub observaciones: Option<String>,
    pub fecha_captura: DateTime<Utc>,
}

impl From<StationRow> for Station {
    fn from(row: StationRow) -> Self {
        Self {
            id: StationId::new(row.id),
            proyecto_id: ProjectId::new(row.proyecto_id),
            km: row.km,
            pendiente_derecha: row.pendiente_derecha,
            base_cl: row.base_cl,
            observaciones: row.observaciones,
            fecha_captura: row.fecha_captura,
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = estaciones_teoricas)]
pub(crate) struct NewStationRow<'a> {
    pub proyecto_id: i32,
    pub km: Decimal,
    pub pendiente_derecha: Decimal,
    pub base_cl: Decimal,
    pub observaciones: Option<&'a str>,
    pub fecha_captura: DateTime<Utc>,
}

/// The owning project never changes.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = estaciones_teoricas)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct StationUpdate<'a> {
    pub km: Decimal,
    pub pendiente_derecha: Decimal,
    pub base_cl: Decimal,
    pub observaciones: Option<&'a str>,
}

// ---------------------------------------------------------------------------
// Measurements
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = mediciones_estacion)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct MeasurementRow {
    pub id: i32,
    pub proyecto_id: i32,
    pub estacion_km: Decimal,
    pub bn_altura: Option<Decimal>,
    pub bn_lectura: Option<Decimal>,
    pub fecha_medicion: NaiveDate,
    pub operador: Option<String>,
    pub condiciones_clima: Option<String>,
    pub observaciones: Option<String>,
}

impl From<MeasurementRow> for Measurement {
    fn from(row: MeasurementRow) -> Self {
        Self {
            id: MeasurementId::new(row.id),
            proyecto_id: ProjectId::new(row.proyecto_id),
            estacion_km: row.estacion_km,
            bn_altura: row.bn_altura,
            bn_lectura: row.bn_lectura,
            fecha_medicion: row.fecha_medicion,
            operador: row.operador,
            condiciones_clima: row.condiciones_clima,
            observaciones: row.observaciones,
        }
    }
}

/// Measurement columns written on both insert and update.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = mediciones_estacion)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct MeasurementFields<'a> {
    pub estacion_km: Decimal,
    pub bn_altura: Option<Decimal>,
    pub bn_lectura: Option<Decimal>,
    pub fecha_medicion: NaiveDate,
    pub operador: Option<&'a str>,
    pub condiciones_clima: Option<&'a str>,
    pub observaciones: Option<&'a str>,
}

// ---------------------------------------------------------------------------
// Readings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = lecturas_divisiones)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ReadingRow {
    pub id: i32,
    pub medicion_id: i32,
    pub division_transversal: Decimal,
    pub lectura_mira: Decimal,
    pub calidad: String,
    pub fecha_calculo: DateTime<Utc>,
}

impl ReadingRow {
    pub(crate) fn into_domain(self) -> Result<DivisionReading, String> {
        Ok(DivisionReading {
            id: ReadingId::new(self.id),
            medicion_id: MeasurementId::new(self.medicion_id),
            division_transversal: self.division_transversal,
            lectura_mira: self.lectura_mira,
            calidad: self.calidad.parse().map_err(|err| format!("{err}"))?,
            fecha_calculo: self.fecha_calculo,
        })
    }
}

/// Reading columns written on insert, upsert and update.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = lecturas_divisiones)]
pub(crate) struct ReadingFields {
    pub medicion_id: i32,
    pub division_transversal: Decimal,
    pub lectura_mira: Decimal,
    pub calidad: &'static str,
    pub fecha_calculo: DateTime<Utc>,
}
