//! Production implementation of Backend over HTTP.

use crate::backend::Backend;
use crate::error::EnvError;
use crate::records::{SceneConfig, SimulateRequest, SimulationRecord, SimulationSummary};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Where the development backend listens by default.
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:5000";

/// HTTP backend client.
///
/// Requests are blocking `ureq` calls moved onto tokio's blocking pool, so a
/// pending fetch suspends only the task that awaits it. The frame loop
/// spawns its probes rather than awaiting them inline.
#[derive(Clone)]
pub struct HttpBackend {
    /// Base URL without trailing slash
    base_url: String,

    /// Shared connection pool
    agent: ureq::Agent,
}

impl HttpBackend {
    /// Creates a client with a 5 second request timeout.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_timeout(base_url, Duration::from_secs(5))
    }

    /// Creates a client with a custom request timeout.
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();

        Self { base_url, agent }
    }

    /// Returns the configured base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json<T>(&self, path: &str) -> Result<T, EnvError>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let url = self.url(path);
        let agent = self.agent.clone();

        tokio::task::spawn_blocking(move || {
            let response = agent.get(&url).call().map_err(|e| map_ureq_error(e, &url))?;
            response.into_json::<T>().map_err(EnvError::decode)
        })
        .await
        .map_err(|e| EnvError::transport(format!("request task failed: {}", e)))?
    }

    async fn post_json(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> Result<serde_json::Value, EnvError> {
        let url = self.url(path);
        let agent = self.agent.clone();

        tokio::task::spawn_blocking(move || {
            let response = agent
                .post(&url)
                .send_json(body)
                .map_err(|e| map_ureq_error(e, &url))?;
            response.into_json::<serde_json::Value>().map_err(EnvError::decode)
        })
        .await
        .map_err(|e| EnvError::transport(format!("request task failed: {}", e)))?
    }
}

fn map_ureq_error(err: ureq::Error, url: &str) -> EnvError {
    match err {
        ureq::Error::Status(status, _) => EnvError::Http {
            status,
            url: url.to_string(),
        },
        ureq::Error::Transport(transport) => EnvError::transport(transport.to_string()),
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn scene_config(&self) -> Result<SceneConfig, EnvError> {
        self.get_json("/api/config").await
    }

    async fn simulation_ids(&self) -> Result<Vec<SimulationSummary>, EnvError> {
        self.get_json("/api/simulation-ids").await
    }

    async fn simulation(&self, id: i64) -> Result<SimulationRecord, EnvError> {
        self.get_json(&format!("/api/simulations/{}", id)).await
    }

    async fn ping(&self) -> Result<serde_json::Value, EnvError> {
        self.get_json("/api/test").await
    }

    async fn simulate(&self, request: &SimulateRequest) -> Result<serde_json::Value, EnvError> {
        let body = serde_json::to_value(request).map_err(EnvError::decode)?;
        self.post_json("/api/simulate", body).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::json;

    async fn spawn_fake_backend() -> String {
        let app = Router::new()
            .route(
                "/api/config",
                get(|| async {
                    Json(json!({
                        "camera": { "position": [0, 100, 300], "lookAt": [0, 50, 100] },
                        "slope": { "width": 100, "height": 200, "angle": -55, "color": 9127187 },
                        "light": { "position": [50, 50, 50], "color": 16777215, "intensity": 1 },
                        "ground": { "size": 500, "color": 8421504 },
                        "drone": { "startPosition": [0, 100, 0] },
                        "beacon": { "depth": 1 }
                    }))
                }),
            )
            .route(
                "/api/simulation-ids",
                get(|| async { Json(json!([{ "id": 1, "description": "first" }])) }),
            )
            .route(
                "/api/simulations/:id",
                get(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
            )
            .route(
                "/api/test",
                get(|| async { Json(json!({ "message": "Hello, World!" })) }),
            )
            .route(
                "/api/simulate",
                post(|Json(body): Json<serde_json::Value>| async move {
                    (StatusCode::CREATED, Json(body))
                }),
            );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        format!("http://{}", addr)
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_fetches_scene_config() {
        let backend = HttpBackend::new(spawn_fake_backend().await);

        let config = backend.scene_config().await.unwrap();
        assert_eq!(config.drone.start_position, [0.0, 100.0, 0.0]);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_lists_simulations() {
        let backend = HttpBackend::new(spawn_fake_backend().await);

        let ids = backend.simulation_ids().await.unwrap();
        assert_eq!(ids.len(), 1);
        assert_eq!(ids[0].description, "first");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_server_error_maps_to_http_error() {
        let backend = HttpBackend::new(spawn_fake_backend().await);

        let err = backend.simulation(7).await.unwrap_err();
        assert!(matches!(err, EnvError::Http { status: 500, .. }));
        assert!(err.is_unavailable());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_simulate_posts_body() {
        let backend = HttpBackend::new(spawn_fake_backend().await);
        let request = SimulateRequest {
            start_position: "0,0,5".to_string(),
            antenna_center: "0,0,0".to_string(),
        };

        let echoed = backend.simulate(&request).await.unwrap();
        assert_eq!(echoed["start_position"], "0,0,5");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_unreachable_backend_is_transport_error() {
        // Bind then drop to get a port nobody listens on
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let backend = HttpBackend::with_timeout(format!("http://{}/", addr), Duration::from_secs(1));
        assert_eq!(backend.base_url(), format!("http://{}", addr));

        let err = backend.ping().await.unwrap_err();
        assert!(matches!(err, EnvError::Transport(_)));
    }
}
