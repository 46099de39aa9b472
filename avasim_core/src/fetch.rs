//! Safe-default layer over the backend collaborator.
//!
//! Backend failures are logged and turned into "no data": `None` for single
//! records, an empty list for ids, an `{"error": ...}` object for simulate.
//! Callers cannot tell "no data" from "fetch failed" and do not need to.

use crate::transform::Path;

use avasim_env::{
    Backend, EnvError, SceneConfig, SimulateRequest, SimulationRecord, SimulationSummary,
};
use serde_json::{json, Value};
use tracing::{debug, warn};

/// Wraps a [`Backend`] so no fetch can fail the caller.
pub struct Collaborator<B: Backend> {
    backend: B,
}

fn log_failure(what: &str, err: &EnvError) {
    if err.is_unavailable() {
        warn!("Backend unavailable while fetching {}: {}", what, err);
    } else {
        warn!("Backend sent unusable {}: {}", what, err);
    }
}

impl<B: Backend> Collaborator<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Scene configuration, or None while it cannot be obtained.
    pub async fn scene_config(&self) -> Option<SceneConfig> {
        match self.backend.scene_config().await {
            Ok(config) => Some(config),
            Err(e) => {
                log_failure("scene config", &e);
                None
            }
        }
    }

    /// Recorded simulation ids; empty on failure.
    pub async fn simulation_ids(&self) -> Vec<SimulationSummary> {
        match self.backend.simulation_ids().await {
            Ok(ids) => {
                debug!("Fetched {} simulation ids", ids.len());
                ids
            }
            Err(e) => {
                log_failure("simulation ids", &e);
                Vec::new()
            }
        }
    }

    /// One recorded simulation.
    pub async fn simulation(&self, id: i64) -> Option<SimulationRecord> {
        match self.backend.simulation(id).await {
            Ok(record) => Some(record),
            Err(e) => {
                log_failure(&format!("simulation {}", id), &e);
                None
            }
        }
    }

    /// Flight path of a recorded simulation; empty when it cannot be fetched.
    pub async fn flight_path(&self, id: i64) -> Path {
        self.simulation(id)
            .await
            .map(|record| Path::from(record.drone_path.as_slice()))
            .unwrap_or_default()
    }

    /// Liveness probe.
    pub async fn ping(&self) -> Option<Value> {
        match self.backend.ping().await {
            Ok(answer) => Some(answer),
            Err(e) => {
                log_failure("liveness probe", &e);
                None
            }
        }
    }

    /// Requests a new simulation run.
    pub async fn simulate(&self, request: &SimulateRequest) -> Value {
        match self.backend.simulate(request).await {
            Ok(answer) => answer,
            Err(e) => {
                log_failure("simulate answer", &e);
                json!({ "error": e.to_string() })
            }
        }
    }
}
