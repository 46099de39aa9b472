//! Motion Session - one drone flying in one scene.
//!
//! A session ties together the three resources it owns for its lifetime:
//! the scene objects ([`SceneAttachment`]), the keyboard subscription
//! ([`InputSampler`]) and the drone state ([`MotionController`]). All three
//! are released by [`MotionSession::teardown`] or on drop, whichever comes
//! first.
//!
//! The session does not own a clock. Whoever schedules frames passes `now`
//! in, which keeps the session usable under both a real and a virtual clock.

use crate::config::SessionConfig;
use crate::error::SessionError;
use crate::input::{InputSampler, SampleReport};
use crate::motion::{MotionController, MotionMode, PlayOutcome};
use crate::scene_attachment::SceneAttachment;
use crate::transform::{Path, Transform};

use avasim_env::{Keyboard, SceneConfig, SceneGraph, SimulationRecord};
use nalgebra::Vector3;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, info, warn};

/// What one frame did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameReport {
    /// Frame sequence number, starting at 1
    pub frame: u64,

    /// Controller state after the tick
    pub mode: MotionMode,

    /// Drone transform after the tick (None once torn down)
    pub transform: Option<Transform>,

    /// Input drained at the start of the frame
    pub input: SampleReport,
}

impl FrameReport {
    /// Number of diagnostic key presses the caller should answer.
    pub fn diagnostic_presses(&self) -> usize {
        self.input.diagnostic_presses
    }
}

pub struct MotionSession<S: SceneGraph> {
    config: SessionConfig,

    controller: MotionController,

    /// None once torn down
    sampler: Option<InputSampler>,

    attachment: SceneAttachment<S>,

    frames: u64,
}

impl<S: SceneGraph> MotionSession<S> {
    /// Attaches the owned objects to `scene`, subscribes to `keyboard` and
    /// places the drone at the configured start position.
    ///
    /// On error nothing is left attached or subscribed.
    pub fn new(
        config: SessionConfig,
        scene_config: &SceneConfig,
        scene: Arc<Mutex<S>>,
        keyboard: &Keyboard,
    ) -> Result<Self, SessionError> {
        let attachment = SceneAttachment::attach(scene, scene_config, &config.field)?;
        let sampler = InputSampler::subscribe(keyboard);

        let [x, y, z] = scene_config.drone.start_position;
        let mut controller = MotionController::new(&config.motion);
        controller.attach_drone(Transform::at(Vector3::new(x, y, z)));

        info!(
            "Motion session started (beacon depth {:.1}, {} Hz)",
            scene_config.beacon.depth, config.refresh_hz
        );

        Ok(Self {
            config,
            controller,
            sampler: Some(sampler),
            attachment,
            frames: 0,
        })
    }

    /// Runs one frame: drain input, tick the active sub-controller, then
    /// move the drone object in the scene.
    ///
    /// Never fails. A scene sync error is logged and the frame continues.
    pub fn frame(&mut self, now: Duration) -> FrameReport {
        self.frames += 1;

        let input = match self.sampler.as_mut() {
            Some(sampler) => self.controller.sample_input(sampler),
            None => SampleReport::default(),
        };

        let mode = self.controller.tick(now);

        if let Some(transform) = self.controller.transform() {
            if let Err(e) = self.attachment.sync_drone(transform) {
                warn!("Frame {}: drone not synced to scene: {}", self.frames, e);
            }
        }

        FrameReport {
            frame: self.frames,
            mode,
            transform: self.controller.transform().copied(),
            input,
        }
    }

    /// Replays `path` from the drone's current transform.
    pub fn play(&mut self, path: Path, now: Duration) -> PlayOutcome {
        self.controller.play(path, now)
    }

    /// Replays the recorded flight of a simulation.
    pub fn play_record(&mut self, record: &SimulationRecord, now: Duration) -> PlayOutcome {
        debug!(
            "Replaying simulation {} ({} waypoints)",
            record.id,
            record.drone_path.len()
        );
        self.play(Path::from(record.drone_path.as_slice()), now)
    }

    /// Cancels a running replay.
    pub fn stop_replay(&mut self) -> bool {
        self.controller.stop_replay()
    }

    /// Releases the keyboard subscription and the scene objects.
    ///
    /// Idempotent. The session stays readable (mode becomes Idle).
    pub fn teardown(&mut self) {
        if !self.attachment.is_attached() && self.sampler.is_none() {
            return;
        }

        self.sampler = None;
        self.controller.detach_drone();
        let removed = self.attachment.detach();
        info!(
            "Motion session torn down after {} frames ({} scene objects removed)",
            self.frames, removed
        );
    }

    pub fn mode(&self) -> MotionMode {
        self.controller.mode()
    }

    pub fn transform(&self) -> Option<&Transform> {
        self.controller.transform()
    }

    pub fn controller(&self) -> &MotionController {
        &self.controller
    }

    pub fn attachment(&self) -> &SceneAttachment<S> {
        &self.attachment
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    pub fn is_active(&self) -> bool {
        self.attachment.is_attached()
    }
}

impl<S: SceneGraph> Drop for MotionSession<S> {
    fn drop(&mut self) {
        self.teardown();
    }
}
