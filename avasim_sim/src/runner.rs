//! Session runner - the frame scheduler for headless runs.
//!
//! Each run builds a fresh scene and keyboard, starts a motion session,
//! then loops: fire due script steps, run one session frame, hand
//! diagnostic presses to a background probe, sleep one frame interval. The
//! context decides what sleeping means (real time or a virtual clock).
//! Probe answers are collected between frames so a slow backend never
//! holds up ticking.

use crate::exporter::{FlightExport, FlightFrame};
use crate::scenarios::{ScenarioId, ScriptAction};
use crate::visualizer::RerunLogger;

use avasim_core::scene_attachment::{BEACON_COLOR, BEACON_SIZE, DRONE_COLOR, DRONE_SIZE, FIELD_COLOR};
use avasim_core::{
    dipole, Collaborator, MotionMode, MotionSession, Path, PlayOutcome, SessionConfig,
    SessionError, Transform,
};
use avasim_env::{AvasimContext, Backend, InMemoryScene, Keyboard, SceneConfig, SceneGraph};
use nalgebra::Vector3;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Beacon orientation (radians) the 2-D field profile is drawn for.
const PROFILE_ORIENTATION: f64 = 0.0;

/// Results from one run.
#[derive(Debug, Clone)]
pub struct RunResult {
    /// Scenario that was run
    pub scenario: ScenarioId,

    /// Frames executed
    pub frames: u64,

    /// Run time at the last frame, in seconds
    pub final_time_secs: f64,

    /// Drone transform after the last frame
    pub final_transform: Option<Transform>,

    /// Controller state after the last frame
    pub final_mode: MotionMode,

    /// Play requests that started or preempted a replay
    pub replays_started: usize,

    /// Play requests that were ignored (empty path, no drone)
    pub replays_ignored: usize,

    /// Diagnostic presses observed
    pub diagnostic_presses: usize,

    /// Diagnostic probes the backend answered
    pub pings_answered: usize,

    /// Whether teardown left the scene exactly as it was before the run
    pub scene_restored: bool,

    /// Recorded frames, when export was requested
    pub export: Option<FlightExport>,
}

/// Drives a motion session frame by frame.
pub struct SessionRunner<C: AvasimContext, B: Backend> {
    ctx: Arc<C>,

    config: SessionConfig,

    scene_config: SceneConfig,

    /// Answers diagnostic presses (None = offline)
    collaborator: Option<Arc<Collaborator<B>>>,

    /// Replaces every scripted replay path (e.g. a fetched recording)
    replay_override: Option<Path>,

    /// Run length in seconds
    duration_secs: f64,

    export: bool,

    logger: RerunLogger,
}

impl<C: AvasimContext, B: Backend> SessionRunner<C, B> {
    /// Creates a runner for the given scene.
    pub fn new(ctx: Arc<C>, config: SessionConfig, scene_config: SceneConfig) -> Self {
        Self {
            ctx,
            config,
            scene_config,
            collaborator: None,
            replay_override: None,
            duration_secs: 10.0,
            export: false,
            logger: RerunLogger::disabled(),
        }
    }

    /// Sets the run length.
    pub fn with_duration(mut self, secs: f64) -> Self {
        self.duration_secs = secs;
        self
    }

    /// Answers diagnostic presses through this backend.
    pub fn with_collaborator(mut self, collaborator: Collaborator<B>) -> Self {
        self.collaborator = Some(Arc::new(collaborator));
        self
    }

    /// Replays `path` wherever the script asks for a replay.
    pub fn with_replay(mut self, path: Path) -> Self {
        self.replay_override = Some(path);
        self
    }

    /// Records every frame into the result.
    pub fn with_export(mut self, export: bool) -> Self {
        self.export = export;
        self
    }

    pub fn with_logger(mut self, logger: RerunLogger) -> Self {
        self.logger = logger;
        self
    }

    /// Number of frames a run executes.
    pub fn total_frames(&self) -> u64 {
        (self.duration_secs.max(0.0) * self.config.refresh_hz.max(1) as f64).round() as u64
    }

    /// Runs a scenario from a fresh scene and returns the result.
    pub async fn run(&self, scenario: ScenarioId) -> Result<RunResult, SessionError> {
        info!(
            "Starting scenario: {} ({:.1}s at {} Hz)",
            scenario.name(),
            self.duration_secs,
            self.config.refresh_hz
        );

        let scene = Arc::new(Mutex::new(InMemoryScene::new()));
        let keyboard = Keyboard::default();
        let before = scene
            .lock()
            .map(|graph| graph.object_ids())
            .unwrap_or_default();

        let mut session =
            MotionSession::new(self.config.clone(), &self.scene_config, scene.clone(), &keyboard)?;

        let field_lines =
            dipole::field_lines_3d(&self.config.field.spatial, self.scene_config.beacon.depth);
        let profile = dipole::field_lines_2d(&self.config.field.planar, PROFILE_ORIENTATION);
        let mut export = self.export.then(|| {
            FlightExport::new(
                scenario.name(),
                self.config.refresh_hz,
                dipole::point_count(&field_lines),
            )
            .with_profile(&profile)
        });
        self.log_static_scene(&field_lines, &profile);

        let script = scenario.script();
        let interval = self.config.frame_interval();
        let total_frames = self.total_frames();
        let start = self.ctx.now();

        let mut result = RunResult {
            scenario,
            frames: 0,
            final_time_secs: 0.0,
            final_transform: None,
            final_mode: session.mode(),
            replays_started: 0,
            replays_ignored: 0,
            diagnostic_presses: 0,
            pings_answered: 0,
            scene_restored: false,
            export: None,
        };
        let (probe_tx, mut probe_rx) = mpsc::unbounded_channel::<bool>();
        let mut next_step = 0;
        let mut last_mode = session.mode();
        let mut trail: Vec<Vector3<f64>> = Vec::new();

        for _ in 0..total_frames {
            let now = self.ctx.now();
            let elapsed = now.saturating_sub(start);
            let mut events = Vec::new();

            while let Ok(answered) = probe_rx.try_recv() {
                if answered {
                    result.pings_answered += 1;
                    events.push("probe answered".to_string());
                }
            }

            while let Some(step) = script.steps().get(next_step).filter(|s| s.at <= elapsed) {
                events.push(self.apply_step(&mut session, &keyboard, &step.action, now, &mut result));
                next_step += 1;
            }

            let report = session.frame(now);

            for _ in 0..report.diagnostic_presses() {
                result.diagnostic_presses += 1;
                self.spawn_probe(&probe_tx);
                events.push("diagnostic probe".to_string());
            }

            if report.mode != last_mode {
                debug!("Frame {}: {} -> {}", report.frame, last_mode, report.mode);
                events.push(format!("mode {}", report.mode));
                last_mode = report.mode;
            }

            let time_sec = elapsed.as_secs_f64();
            if let Some(transform) = report.transform {
                self.log_frame(time_sec, &transform, &mut trail, &events);
            }
            if let Some(export) = export.as_mut() {
                if let Some(frame) = FlightFrame::from_report(&report, time_sec, events) {
                    export.add_frame(frame);
                }
            }

            result.frames = report.frame;
            result.final_time_secs = time_sec;
            result.final_transform = report.transform;
            result.final_mode = report.mode;

            if report.frame % self.config.refresh_hz.max(1) as u64 == 0 {
                if let Some(t) = report.transform {
                    debug!(
                        "  t={:.1}s | {} | ({:.1}, {:.1}, {:.1}) yaw={:.2}",
                        time_sec,
                        report.mode,
                        t.position.x,
                        t.position.y,
                        t.position.z,
                        t.yaw()
                    );
                }
            }

            self.ctx.sleep(interval).await;
        }

        session.teardown();

        // Probes still in flight count once they land
        drop(probe_tx);
        while let Some(answered) = probe_rx.recv().await {
            if answered {
                result.pings_answered += 1;
            }
        }

        result.scene_restored = scene
            .lock()
            .map(|graph| graph.object_ids() == before)
            .unwrap_or(false);
        if !result.scene_restored {
            warn!("Scene was not restored after teardown");
        }
        result.export = export;

        info!(
            "Scenario {} finished: {} frames, mode {}, {} replays",
            scenario.name(),
            result.frames,
            result.final_mode,
            result.replays_started
        );
        Ok(result)
    }

    /// Fires one script step. Returns a short event label.
    fn apply_step(
        &self,
        session: &mut MotionSession<InMemoryScene>,
        keyboard: &Keyboard,
        action: &ScriptAction,
        now: Duration,
        result: &mut RunResult,
    ) -> String {
        match action {
            ScriptAction::Press(key) => {
                keyboard.press(key);
                format!("press {}", key)
            }
            ScriptAction::Release(key) => {
                keyboard.release(key);
                format!("release {}", key)
            }
            ScriptAction::Play(path) => {
                let path = self.replay_override.clone().unwrap_or_else(|| path.clone());
                let waypoints: Vec<Vector3<f64>> = path
                    .waypoints()
                    .iter()
                    .map(|wp| wp.transform.position)
                    .collect();

                let outcome = session.play(path, now);
                match outcome {
                    PlayOutcome::Started { segments } | PlayOutcome::Preempted { segments } => {
                        result.replays_started += 1;
                        self.logger.log_waypoints(&waypoints);
                        self.logger.log_event("events", &format!("replay of {} segments", segments));
                    }
                    PlayOutcome::EmptyPath | PlayOutcome::NoDrone => {
                        result.replays_ignored += 1;
                    }
                }
                format!("play {:?}", outcome)
            }
            ScriptAction::StopReplay => {
                session.stop_replay();
                "stop replay".to_string()
            }
        }
    }

    /// Sends the backend liveness probe on its own task. The outcome
    /// (true if the backend answered) arrives on `answers`.
    fn spawn_probe(&self, answers: &mpsc::UnboundedSender<bool>) {
        let Some(collaborator) = self.collaborator.clone() else {
            info!("Diagnostic key pressed (offline, no probe sent)");
            return;
        };

        let answers = answers.clone();
        tokio::spawn(async move {
            let answered = match collaborator.ping().await {
                Some(answer) => {
                    info!("Backend answered diagnostic probe: {}", answer);
                    true
                }
                None => false,
            };
            // Receiver is gone only if the run was dropped mid-flight
            let _ = answers.send(answered);
        });
    }

    fn log_static_scene(&self, field_lines: &[dipole::FieldLine], profile: &[dipole::FieldLine]) {
        if !self.logger.is_enabled() {
            return;
        }
        let depth = self.scene_config.beacon.depth;
        self.logger.set_time(0.0);
        self.logger
            .log_box("world/beacon", Vector3::new(0.0, -depth, 0.0), BEACON_SIZE, BEACON_COLOR);
        self.logger.log_field_lines(field_lines, FIELD_COLOR);
        self.logger.log_profile(profile, FIELD_COLOR);
    }

    fn log_frame(
        &self,
        time_sec: f64,
        transform: &Transform,
        trail: &mut Vec<Vector3<f64>>,
        events: &[String],
    ) {
        if !self.logger.is_enabled() {
            return;
        }
        self.logger.set_time(time_sec);
        self.logger
            .log_box("world/drone", transform.position, DRONE_SIZE, DRONE_COLOR);
        trail.push(transform.position);
        self.logger.log_trail(trail);
        for event in events {
            self.logger.log_event("events", event);
        }
    }
}
