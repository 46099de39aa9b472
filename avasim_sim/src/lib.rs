//! AvaSim headless harness
//!
//! Runs the drone motion engine without a renderer: a frame scheduler
//! drives a [`avasim_core::MotionSession`] against an in-memory scene,
//! scripted key input stands in for a keyboard, and the clock is either
//! real (tokio) or virtual.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────┐
//! │                    SessionRunner                      │
//! │  Script ──► Keyboard ──┐                              │
//! │                        ▼                              │
//! │  Context.now() ──► MotionSession.frame() ──► Export   │
//! │        ▲               │                    Rerun     │
//! │        └── sleep ◄─────┘                              │
//! └───────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use avasim_sim::{SessionRunner, SimContext, scenarios::ScenarioId};
//!
//! let runner: SessionRunner<SimContext, HttpBackend> =
//!     SessionRunner::new(SimContext::shared(), config, scene_config).with_duration(10.0);
//! let result = runner.run(ScenarioId::Replay).await?;
//! ```

mod context;
mod exporter;
mod runner;
pub mod scenarios;
mod visualizer;

pub use context::SimContext;
pub use exporter::{FlightExport, FlightFrame};
pub use runner::{RunResult, SessionRunner};
pub use visualizer::RerunLogger;
