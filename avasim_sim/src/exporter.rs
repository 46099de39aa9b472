//! JSON exporter for recorded runs.
//!
//! Exports the drone's per-frame transform so a run can be plotted or
//! replayed elsewhere.

use avasim_core::dipole::FieldLine;
use avasim_core::{FrameReport, MotionMode};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;

/// A single exported frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightFrame {
    /// Frame sequence number
    pub frame: u64,

    /// Run time in seconds
    pub time_sec: f64,

    pub mode: MotionMode,

    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub pitch: f64,
    pub yaw: f64,
    pub roll: f64,

    /// Script steps and notable transitions on this frame
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<String>,
}

impl FlightFrame {
    /// Builds a frame from a session report. None once the drone is gone.
    pub fn from_report(report: &FrameReport, time_sec: f64, events: Vec<String>) -> Option<Self> {
        let transform = report.transform?;
        Some(Self {
            frame: report.frame,
            time_sec,
            mode: report.mode,
            x: transform.position.x,
            y: transform.position.y,
            z: transform.position.z,
            pitch: transform.rotation.x,
            yaw: transform.rotation.y,
            roll: transform.rotation.z,
            events,
        })
    }
}

/// Complete run export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlightExport {
    /// Scenario name
    pub scenario: String,

    /// Frame rate the run was scheduled at
    pub refresh_hz: u32,

    /// Duration in seconds
    pub duration_sec: f64,

    /// Number of field-line points attached to the scene
    pub field_points: usize,

    /// 2-D field profile, one `[x, y]` polyline per field line
    #[serde(default)]
    pub field_profile: Vec<Vec<[f64; 2]>>,

    /// Exported frames
    pub frames: Vec<FlightFrame>,
}

impl FlightExport {
    /// Creates a new export container.
    pub fn new(scenario: &str, refresh_hz: u32, field_points: usize) -> Self {
        Self {
            scenario: scenario.to_string(),
            refresh_hz,
            duration_sec: 0.0,
            field_points,
            field_profile: Vec::new(),
            frames: Vec::new(),
        }
    }

    /// Attaches the planar field profile (z is dropped).
    pub fn with_profile(mut self, lines: &[FieldLine]) -> Self {
        self.field_profile = lines
            .iter()
            .map(|line| line.iter().map(|p| [p.x, p.y]).collect())
            .collect();
        self
    }

    /// Adds a frame.
    pub fn add_frame(&mut self, frame: FlightFrame) {
        self.duration_sec = frame.time_sec;
        self.frames.push(frame);
    }

    /// Last exported frame.
    pub fn last_frame(&self) -> Option<&FlightFrame> {
        self.frames.last()
    }

    /// Writes to a JSON file.
    pub fn write_to_file(&self, path: &str) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }
}
