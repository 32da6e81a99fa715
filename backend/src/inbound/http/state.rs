//! Shared HTTP adapter state.
//!
//! Handlers receive this through `web::Data` so they only depend on the
//! driving ports and stay testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    IdentityVerifier, MeasurementService, ProjectService, ReadingService, StationService,
    UserProfileService,
};
use crate::domain::{
    SurveyMeasurementService, SurveyProjectService, SurveyReadingService, SurveyRepositories,
    SurveyStationService, SurveyUserProfileService,
};

/// Which store backs the repositories; reported by `/status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreMode {
    Postgres,
    InMemory,
}

impl StoreMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Postgres => "postgres",
            Self::InMemory => "in-memory",
        }
    }
}

/// Static facts about the running service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceInfo {
    pub app_name: String,
    pub version: &'static str,
    pub store: StoreMode,
    pub debug: bool,
}

impl ServiceInfo {
    pub fn new(app_name: impl Into<String>, store: StoreMode) -> Self {
        Self {
            app_name: app_name.into(),
            version: env!("CARGO_PKG_VERSION"),
            store,
            debug: false,
        }
    }

    #[must_use]
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}

/// Parameter object bundling the driving ports.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub profiles: Arc<dyn UserProfileService>,
    pub projects: Arc<dyn ProjectService>,
    pub stations: Arc<dyn StationService>,
    pub measurements: Arc<dyn MeasurementService>,
    pub readings: Arc<dyn ReadingService>,
    pub identity: Arc<dyn IdentityVerifier>,
}

impl HttpStatePorts {
    /// Wire the survey services over one repository bundle.
    pub fn from_repositories(
        repositories: SurveyRepositories,
        identity: Arc<dyn IdentityVerifier>,
    ) -> Self {
        Self {
            profiles: Arc::new(SurveyUserProfileService::new(repositories.clone())),
            projects: Arc::new(SurveyProjectService::new(repositories.clone())),
            stations: Arc::new(SurveyStationService::new(repositories.clone())),
            measurements: Arc::new(SurveyMeasurementService::new(repositories.clone())),
            readings: Arc::new(SurveyReadingService::new(repositories)),
            identity,
        }
    }
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub profiles: Arc<dyn UserProfileService>,
    pub projects: Arc<dyn ProjectService>,
    pub stations: Arc<dyn StationService>,
    pub measurements: Arc<dyn MeasurementService>,
    pub readings: Arc<dyn ReadingService>,
    pub identity: Arc<dyn IdentityVerifier>,
    pub info: ServiceInfo,
}

impl HttpState {
    pub fn new(ports: HttpStatePorts, info: ServiceInfo) -> Self {
        let HttpStatePorts {
            profiles,
            projects,
            stations,
            measurements,
            readings,
            identity,
        } = ports;
        Self {
            profiles,
            projects,
            stations,
            measurements,
            readings,
            identity,
            info,
        }
    }
}
