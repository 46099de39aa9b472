//! AvaSim Core - drone motion and flight playback engine.
//!
//! Flies a single drone through an avalanche-rescue scene from two control
//! sources: live keyboard input and recorded flight paths.
//!
//! # Architecture
//!
//! ```text
//!  Keyboard ──► InputSampler ──► KeyState ──► KinematicIntegrator ─┐
//!                                                                   ├─► Transform ──► SceneGraph
//!  Backend ──► Collaborator ──► Path ──────► PathAnimator ─────────┘
//!                                     (MotionController picks one writer per tick)
//! ```
//!
//! - [`input`]: key bindings, key state and the keyboard subscription
//! - [`kinematics`]: per-tick manual flight
//! - [`path_animator`]: chained, time-clamped waypoint replay
//! - [`motion`]: the controller state machine
//! - [`dipole`]: beacon field-line shapes
//! - [`scene_attachment`]: objects owned in the renderer's scene
//! - [`fetch`]: backend calls with safe defaults
//! - [`session`]: all of the above for one drone in one scene

pub mod config;
pub mod dipole;
pub mod error;
pub mod fetch;
pub mod input;
pub mod kinematics;
pub mod motion;
pub mod path_animator;
pub mod scene_attachment;
pub mod session;
pub mod transform;

pub use config::{FieldConfig, MotionConfig, SessionConfig};
pub use dipole::{field_lines_2d, field_lines_3d, Dipole2dConfig, Dipole3dConfig, FieldLine};
pub use error::SessionError;
pub use fetch::Collaborator;
pub use input::{ControlKey, InputSampler, KeyState, SampleReport};
pub use kinematics::KinematicIntegrator;
pub use motion::{MotionController, MotionMode, PlayOutcome, ReclaimPolicy};
pub use path_animator::{AnimatorStatus, PathAnimator, DEFAULT_SEGMENT_DURATION};
pub use scene_attachment::{AttachedObjects, SceneAttachment};
pub use session::{FrameReport, MotionSession};
pub use transform::{Path, Transform, Waypoint};
