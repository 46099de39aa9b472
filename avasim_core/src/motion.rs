//! Motion Controller - single-writer arbitration over the drone Transform.
//!
//! # State machine
//!
//! ```text
//!            attach_drone                play(non-empty)
//!   ┌──────┐ ───────────► ┌───────────────┐ ──────────► ┌────────────┐
//!   │ Idle │              │ ManualControl │             │ PathReplay │
//!   └──────┘ ◄─────────── └───────────────┘ ◄────────── └────────────┘
//!              detach                 replay finished / key reclaim
//! ```
//!
//! Exactly one sub-controller writes the Transform per tick: the kinematic
//! integrator in `ManualControl`, the path animator in `PathReplay`. Key
//! events keep updating the key state during replay; whether a motion key
//! press ends the replay early is decided by [`ReclaimPolicy`].

use crate::config::MotionConfig;
use crate::input::{InputSampler, KeyState, SampleReport};
use crate::kinematics::KinematicIntegrator;
use crate::path_animator::{AnimatorStatus, PathAnimator};
use crate::transform::{Path, Transform};

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Observable controller state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MotionMode {
    Idle,
    ManualControl,
    PathReplay,
}

impl std::fmt::Display for MotionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            MotionMode::Idle => "idle",
            MotionMode::ManualControl => "manual_control",
            MotionMode::PathReplay => "path_replay",
        };
        write!(f, "{}", name)
    }
}

/// What a manual key press does while a replay is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReclaimPolicy {
    /// Keys are recorded but ignored for motion until the replay ends
    #[default]
    FinishReplay,

    /// A motion key press cancels the replay and hands control back
    ReclaimOnKeyPress,
}

/// Outcome of a play request. None of these are errors to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayOutcome {
    /// Replay began with this many segments
    Started { segments: usize },

    /// A running replay was replaced; the new one starts from the current Transform
    Preempted { segments: usize },

    /// Path had no waypoints; nothing changed
    EmptyPath,

    /// Called before the drone exists; nothing changed
    NoDrone,
}

impl PlayOutcome {
    pub fn is_started(&self) -> bool {
        matches!(self, PlayOutcome::Started { .. } | PlayOutcome::Preempted { .. })
    }
}

/// Active sub-controller. Tagged so only one can ever be selected.
#[derive(Debug)]
enum Mode {
    Idle,
    ManualControl,
    PathReplay(PathAnimator),
}

/// The drone's motion controller.
pub struct MotionController {
    /// None until a drone is attached
    drone: Option<Transform>,

    /// Held keys, written only by the input sampler
    keys: KeyState,

    integrator: KinematicIntegrator,

    segment_duration: Duration,

    policy: ReclaimPolicy,

    mode: Mode,

    /// Manual or replay ticks applied (for diagnostics)
    tick_count: u64,
}

impl MotionController {
    /// Creates an idle controller with no drone.
    pub fn new(config: &MotionConfig) -> Self {
        Self {
            drone: None,
            keys: KeyState::default(),
            integrator: KinematicIntegrator::new(config.speed, config.rotation_speed),
            segment_duration: config.segment_duration(),
            policy: config.reclaim_policy,
            mode: Mode::Idle,
            tick_count: 0,
        }
    }

    /// Attaches the drone at `start` and enters manual control.
    ///
    /// Key state is reset: a session always starts with every key released.
    pub fn attach_drone(&mut self, start: Transform) {
        self.drone = Some(start);
        self.keys.clear();
        self.mode = Mode::ManualControl;
        info!(
            "Drone attached at ({:.1}, {:.1}, {:.1}), manual control",
            start.position.x, start.position.y, start.position.z
        );
    }

    /// Drops the drone and returns to idle.
    pub fn detach_drone(&mut self) -> Option<Transform> {
        self.mode = Mode::Idle;
        self.keys.clear();
        let last = self.drone.take();
        if last.is_some() {
            debug!("Drone detached");
        }
        last
    }

    /// Drains buffered keyboard events into the key state.
    ///
    /// Under `ReclaimOnKeyPress`, a motion key press cancels a running
    /// replay; the integrator takes over on the next tick.
    pub fn sample_input(&mut self, sampler: &mut InputSampler) -> SampleReport {
        let report = sampler.drain_into(&mut self.keys);

        if report.motion_presses > 0
            && self.policy == ReclaimPolicy::ReclaimOnKeyPress
            && matches!(self.mode, Mode::PathReplay(_))
        {
            info!("Manual input reclaimed control, replay cancelled");
            self.mode = Mode::ManualControl;
        }

        report
    }

    /// Starts replaying `path` from the drone's current Transform.
    ///
    /// A replay already in flight is discarded (last writer wins).
    pub fn play(&mut self, path: Path, now: Duration) -> PlayOutcome {
        let Some(current) = self.drone else {
            warn!("play() called before the drone exists, ignoring");
            return PlayOutcome::NoDrone;
        };

        let segments = path.len();
        let Some(animator) = PathAnimator::start(path, current, now, self.segment_duration)
        else {
            warn!("play() called with an empty path, ignoring");
            return PlayOutcome::EmptyPath;
        };

        let preempted = matches!(self.mode, Mode::PathReplay(_));
        self.mode = Mode::PathReplay(animator);

        if preempted {
            info!("Replay preempted by a new path ({} segments)", segments);
            PlayOutcome::Preempted { segments }
        } else {
            info!("Replay started ({} segments)", segments);
            PlayOutcome::Started { segments }
        }
    }

    /// Cancels a running replay. Returns true if one was running.
    pub fn stop_replay(&mut self) -> bool {
        if matches!(self.mode, Mode::PathReplay(_)) {
            self.mode = Mode::ManualControl;
            info!("Replay stopped");
            true
        } else {
            false
        }
    }

    /// Advances the active sub-controller by one tick.
    pub fn tick(&mut self, now: Duration) -> MotionMode {
        let Some(transform) = self.drone.as_mut() else {
            return MotionMode::Idle;
        };

        match &mut self.mode {
            Mode::Idle => {}
            Mode::ManualControl => {
                self.integrator.step(&self.keys, transform);
                self.tick_count += 1;
            }
            Mode::PathReplay(animator) => {
                self.tick_count += 1;
                if animator.advance(now, transform) == AnimatorStatus::Finished {
                    info!(
                        "Replay finished at ({:.1}, {:.1}, {:.1}), manual control",
                        transform.position.x, transform.position.y, transform.position.z
                    );
                    self.mode = Mode::ManualControl;
                }
            }
        }

        self.mode()
    }

    /// Current state.
    pub fn mode(&self) -> MotionMode {
        match self.mode {
            Mode::Idle => MotionMode::Idle,
            Mode::ManualControl => MotionMode::ManualControl,
            Mode::PathReplay(_) => MotionMode::PathReplay,
        }
    }

    /// Read-only view of the drone Transform.
    pub fn transform(&self) -> Option<&Transform> {
        self.drone.as_ref()
    }

    /// Read-only view of the held keys.
    pub fn keys(&self) -> &KeyState {
        &self.keys
    }

    /// Running replay, if any.
    pub fn replay(&self) -> Option<&PathAnimator> {
        match &self.mode {
            Mode::PathReplay(animator) => Some(animator),
            _ => None,
        }
    }

    pub fn policy(&self) -> ReclaimPolicy {
        self.policy
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }
}
