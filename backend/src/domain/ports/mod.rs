//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (repositories, identity verification) expose typed errors
//! built with `define_port_error!`; driving ports return the domain
//! [`Error`](crate::domain::Error) so inbound adapters can map it directly.

mod macros;
pub(crate) use macros::define_port_error;

mod identity_verifier;
mod measurement_repository;
mod measurement_service;
mod project_repository;
mod project_service;
mod reading_repository;
mod reading_service;
mod station_repository;
mod station_service;
mod user_profile_repository;
mod user_profile_service;

#[cfg(test)]
pub use identity_verifier::MockIdentityVerifier;
pub use identity_verifier::{IdentityError, IdentityVerifier};
#[cfg(test)]
pub use measurement_repository::MockMeasurementRepository;
pub use measurement_repository::{MeasurementRepository, MeasurementRepositoryError};
#[cfg(test)]
pub use measurement_service::MockMeasurementService;
pub use measurement_service::MeasurementService;
#[cfg(test)]
pub use project_repository::MockProjectRepository;
pub use project_repository::{ProjectRepository, ProjectRepositoryError};
#[cfg(test)]
pub use project_service::MockProjectService;
pub use project_service::ProjectService;
#[cfg(test)]
pub use reading_repository::MockReadingRepository;
pub use reading_repository::{ReadingRepository, ReadingRepositoryError};
#[cfg(test)]
pub use reading_service::MockReadingService;
pub use reading_service::ReadingService;
#[cfg(test)]
pub use station_repository::MockStationRepository;
pub use station_repository::{StationRepository, StationRepositoryError};
#[cfg(test)]
pub use station_service::MockStationService;
pub use station_service::StationService;
#[cfg(test)]
pub use user_profile_repository::MockUserProfileRepository;
pub use user_profile_repository::{UserProfileRepository, UserProfileRepositoryError};
#[cfg(test)]
pub use user_profile_service::MockUserProfileService;
pub use user_profile_service::UserProfileService;

#[cfg(test)]
mod tests;
