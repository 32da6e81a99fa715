//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the database migrations exactly. They are used
//! by Diesel for compile-time query validation and type-safe SQL generation.
//!
//! # Maintenance
//!
//! When migrations change the schema, this file should be regenerated or
//! manually updated to reflect those changes. The `diesel print-schema`
//! command can generate these definitions from a live database.

diesel::table! {
    /// User profiles mirrored from the identity provider.
    perfiles_usuario (id) {
        /// Identity-provider subject.
        id -> Varchar,
        /// Unique email address.
        email -> Varchar,
        nombre_completo -> Varchar,
        empresa -> Nullable<Varchar>,
        organizacion -> Nullable<Varchar>,
        /// Cleared on soft delete.
        activo -> Bool,
        fecha_registro -> Timestamptz,
        fecha_actualizacion -> Timestamptz,
    }
}

diesel::table! {
    /// Surveyed road segments.
    proyectos (id) {
        id -> Int4,
        /// Owning profile.
        usuario_id -> Varchar,
        nombre -> Varchar,
        tramo -> Nullable<Varchar>,
        cuerpo -> Nullable<Varchar>,
        km_inicial -> Numeric,
        km_final -> Numeric,
        intervalo -> Numeric,
        espesor -> Numeric,
        tolerancia_sct -> Numeric,
        divisiones_izquierdas -> Array<Numeric>,
        divisiones_derechas -> Array<Numeric>,
        /// Lifecycle state (`CONFIGURACION`, `EN_PROGRESO`, ...).
        estado -> Varchar,
        fecha_creacion -> Timestamptz,
        fecha_modificacion -> Timestamptz,
    }
}

diesel::table! {
    /// Design stations; unique per `(proyecto_id, km)`.
    estaciones_teoricas (id) {
        id -> Int4,
        proyecto_id -> Int4,
        km -> Numeric,
        pendiente_derecha -> Numeric,
        base_cl -> Numeric,
        observaciones -> Nullable<Text>,
        fecha_captura -> Timestamptz,
    }
}

diesel::table! {
    /// Benchmark set-ups; unique per `(proyecto_id, estacion_km)`.
    mediciones_estacion (id) {
        id -> Int4,
        proyecto_id -> Int4,
        estacion_km -> Numeric,
        bn_altura -> Nullable<Numeric>,
        bn_lectura -> Nullable<Numeric>,
        fecha_medicion -> Date,
        operador -> Nullable<Varchar>,
        condiciones_clima -> Nullable<Varchar>,
        observaciones -> Nullable<Text>,
    }
}

diesel::table! {
    /// Rod readings; unique per `(medicion_id, division_transversal)`.
    lecturas_divisiones (id) {
        id -> Int4,
        medicion_id -> Int4,
        division_transversal -> Numeric,
        lectura_mira -> Numeric,
        calidad -> Varchar,
        fecha_calculo -> Timestamptz,
    }
}

diesel::joinable!(proyectos -> perfiles_usuario (usuario_id));
diesel::joinable!(estaciones_teoricas -> proyectos (proyecto_id));
diesel::joinable!(mediciones_estacion -> proyectos (proyecto_id));
diesel::joinable!(lecturas_divisiones -> mediciones_estacion (medicion_id));

diesel::allow_tables_to_appear_in_same_query!(
    perfiles_usuario,
    proyectos,
    estaciones_teoricas,
    mediciones_estacion,
    lecturas_divisiones,
);
