//! AvaSim Environment Abstraction Layer
//!
//! This crate isolates everything the drone motion engine consumes from the
//! outside world, so the engine itself stays pure and testable:
//! - **Time**: `now()`/`sleep()` via [`AvasimContext`] (tokio or virtual clock)
//! - **Scene graph**: the renderer's object set via [`SceneGraph`]
//! - **Keyboard**: press/release events via [`Keyboard`]
//! - **Backend**: scene configuration and recorded flights via [`Backend`]
//!
//! # Example
//!
//! ```ignore
//! use avasim_env::{AvasimContext, TokioContext};
//!
//! async fn frame_loop<Ctx: AvasimContext>(ctx: &Ctx) {
//!     loop {
//!         let now = ctx.now();
//!         step(now);
//!         ctx.sleep(Duration::from_millis(16)).await;
//!     }
//! }
//! ```

mod backend;
mod context;
mod error;
mod http_impl;
mod input;
mod records;
mod scene;
mod tokio_impl;
mod types;

pub use backend::Backend;
pub use context::AvasimContext;
pub use error::EnvError;
pub use http_impl::{HttpBackend, DEFAULT_BACKEND_URL};
pub use input::{KeyAction, KeyEvent, Keyboard};
pub use records::{
    AntennaParams, BeaconConfig, CameraConfig, DroneConfig, GroundConfig, LightConfig, Pose,
    SceneConfig, SimulateRequest, SimulationOutcome, SimulationRecord, SimulationSummary,
    SlopeConfig, WaypointRecord,
};
pub use scene::{InMemoryScene, SceneGraph, SceneObject, Shape};
pub use tokio_impl::TokioContext;
pub use types::ObjectId;
