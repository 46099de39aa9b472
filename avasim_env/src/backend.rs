//! Backend collaborator abstraction.

use async_trait::async_trait;
use crate::error::EnvError;
use crate::records::{SceneConfig, SimulateRequest, SimulationRecord, SimulationSummary};

/// Abstraction over the HTTP backend that serves scene configuration and
/// recorded simulations.
///
/// # Implementations
///
/// - **Production**: `HttpBackend` - blocking `ureq` calls on tokio's
///   blocking pool
/// - **Tests**: in-memory fakes returning canned records or errors
///
/// Implementations report failures faithfully; turning them into safe
/// defaults is the caller's job (see `avasim_core::fetch`).
#[async_trait]
pub trait Backend: Send + Sync + 'static {
    /// `GET /api/config`
    async fn scene_config(&self) -> Result<SceneConfig, EnvError>;

    /// `GET /api/simulation-ids`
    async fn simulation_ids(&self) -> Result<Vec<SimulationSummary>, EnvError>;

    /// `GET /api/simulations/{id}`
    async fn simulation(&self, id: i64) -> Result<SimulationRecord, EnvError>;

    /// `GET /api/test` - liveness probe with an arbitrary JSON answer.
    async fn ping(&self) -> Result<serde_json::Value, EnvError>;

    /// `POST /api/simulate`
    async fn simulate(&self, request: &SimulateRequest) -> Result<serde_json::Value, EnvError>;
}
