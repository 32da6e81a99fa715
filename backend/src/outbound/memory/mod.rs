//! In-memory survey store.
//!
//! Backs every repository port with a single mutex-guarded state so the
//! server can run without a database and service tests can exercise the
//! consistency rules end to end. Uniqueness, cascade and foreign-key rules
//! mirror the relational schema.

mod measurements;
mod profiles;
mod projects;
mod readings;
mod stations;

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use mockable::Clock;

use crate::domain::SurveyRepositories;
use crate::domain::survey::{
    DivisionReading, Measurement, MeasurementId, Project, ProjectId, ReadingId, Station, StationId,
};
use crate::domain::{UserId, UserProfile};

#[derive(Default)]
struct StoreState {
    profiles: BTreeMap<UserId, UserProfile>,
    projects: BTreeMap<ProjectId, Project>,
    stations: BTreeMap<StationId, Station>,
    measurements: BTreeMap<MeasurementId, Measurement>,
    readings: BTreeMap<ReadingId, DivisionReading>,
    sequences: Sequences,
}

#[derive(Default)]
struct Sequences {
    project: i32,
    station: i32,
    measurement: i32,
    reading: i32,
}

fn next_id(counter: &mut i32) -> i32 {
    *counter += 1;
    *counter
}

impl StoreState {
    fn owns_project(&self, owner: &UserId, project: ProjectId) -> bool {
        self.projects
            .get(&project)
            .is_some_and(|found| found.is_owned_by(owner))
    }

    fn owns_measurement(&self, owner: &UserId, measurement: MeasurementId) -> bool {
        self.measurements
            .get(&measurement)
            .is_some_and(|found| self.owns_project(owner, found.proyecto_id))
    }

    fn remove_measurement_cascade(&mut self, id: MeasurementId) -> bool {
        self.readings.retain(|_, reading| reading.medicion_id != id);
        self.measurements.remove(&id).is_some()
    }
}

/// Thread-safe store implementing every survey repository port.
#[derive(Default)]
pub struct InMemorySurveyStore {
    state: Mutex<StoreState>,
}

impl InMemorySurveyStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, StoreState>, String> {
        self.state
            .lock()
            .map_err(|_| "in-memory store lock poisoned".to_owned())
    }

    /// Bundle the store as every repository the services need.
    pub fn repositories(self: Arc<Self>, clock: Arc<dyn Clock>) -> SurveyRepositories {
        SurveyRepositories {
            profiles: self.clone(),
            projects: self.clone(),
            stations: self.clone(),
            measurements: self.clone(),
            readings: self,
            clock,
        }
    }
}

#[cfg(test)]
mod tests;
