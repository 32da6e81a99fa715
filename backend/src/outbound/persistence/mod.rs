//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Concrete implementations of the survey repository ports backed by
//! PostgreSQL through `diesel-async` and `bb8` pooling.
//!
//! - **Thin adapters**: repositories only translate between Diesel rows and
//!   domain types. Validation and ownership live in the domain services.
//! - **Internal models**: row structs (`models.rs`) and table definitions
//!   (`schema.rs`) never leave this module.
//! - **Constraint-aware errors**: unique violations are matched by
//!   constraint name and reported as the port's duplicate variants.
//!
//! ```ignore
//! use survey_backend::outbound::persistence::{DbPool, PoolConfig, repositories};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/levantamientos")).await?;
//! let repos = repositories(pool, Arc::new(DefaultClock));
//! ```

mod diesel_error_mapping;
mod diesel_measurement_repository;
mod diesel_project_repository;
mod diesel_reading_repository;
mod diesel_station_repository;
mod diesel_user_profile_repository;
mod migrations;
mod models;
mod pool;
mod schema;

use std::sync::Arc;

use mockable::Clock;

use crate::domain::SurveyRepositories;

pub use diesel_measurement_repository::DieselMeasurementRepository;
pub use diesel_project_repository::DieselProjectRepository;
pub use diesel_reading_repository::DieselReadingRepository;
pub use diesel_station_repository::DieselStationRepository;
pub use diesel_user_profile_repository::DieselUserProfileRepository;
pub use migrations::{MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};

/// Wire every Diesel repository onto one shared pool.
pub fn repositories(pool: DbPool, clock: Arc<dyn Clock>) -> SurveyRepositories {
    SurveyRepositories {
        profiles: Arc::new(DieselUserProfileRepository::new(pool.clone())),
        projects: Arc::new(DieselProjectRepository::new(pool.clone())),
        stations: Arc::new(DieselStationRepository::new(pool.clone())),
        measurements: Arc::new(DieselMeasurementRepository::new(pool.clone())),
        readings: Arc::new(DieselReadingRepository::new(pool)),
        clock,
    }
}
