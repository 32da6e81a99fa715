//! Domain primitives, survey entities and use-case services.
//!
//! Purpose: define the transport-agnostic core of the survey backend. Inbound
//! adapters call the driving ports in [`ports`]; outbound adapters implement
//! the driven repository and identity ports.
//!
//! Public surface:
//! - Error and ErrorCode: the error payload shared by every adapter.
//! - TraceId: request correlation identifier.
//! - UserId, CallerIdentity, UserProfile: identity and profile types.
//! - survey: projects, stations, measurements, readings and the quality
//!   engine.
//! - Survey*Service: implementations of the driving ports.

pub mod error;
mod identity;
mod measurement_service;
pub mod ports;
mod project_service;
mod reading_service;
mod station_service;
pub mod survey;
mod survey_access;
mod trace_id;
mod user_profile;
mod user_profile_service;

pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::identity::{CallerIdentity, UserId, UserIdValidationError};
pub use self::measurement_service::SurveyMeasurementService;
pub use self::project_service::SurveyProjectService;
pub use self::reading_service::SurveyReadingService;
pub use self::station_service::SurveyStationService;
pub use self::survey_access::SurveyRepositories;
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user_profile::{UserProfile, UserProfileDraft, UserProfilePatch};
pub use self::user_profile_service::SurveyUserProfileService;
