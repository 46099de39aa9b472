//! Rerun visualization for headless runs.
//!
//! Visualization is optional and only available with the `visualization`
//! feature.
//!
//! # What Gets Logged
//!
//! - The drone as a blue box, updated every frame
//! - The flown trail as a line strip
//! - The beacon as a red box and its field lines in green (once)
//! - The 2-D field profile under `profile/` (once)
//! - Script events as text

#[cfg(feature = "visualization")]
use rerun::{Boxes3D, Color, LineStrips3D, Points3D, Position3D, Radius, RecordingStream};
use nalgebra::{Point3, Vector3};

#[cfg(feature = "visualization")]
fn rgb(color: u32) -> Color {
    Color::from_rgb((color >> 16) as u8, (color >> 8) as u8, color as u8)
}

/// Rerun logger for flight visualization.
pub struct RerunLogger {
    #[cfg(feature = "visualization")]
    rec: Option<RecordingStream>,

    /// Whether visualization is enabled
    enabled: bool,
}

impl RerunLogger {
    /// Creates a new logger with visualization disabled.
    pub fn disabled() -> Self {
        Self {
            #[cfg(feature = "visualization")]
            rec: None,
            enabled: false,
        }
    }

    /// Creates a new logger with visualization enabled.
    #[cfg(feature = "visualization")]
    pub fn new(name: &str) -> Self {
        match rerun::RecordingStreamBuilder::new(name).spawn() {
            Ok(rec) => {
                tracing::info!("Rerun visualization enabled - open Rerun Viewer to see the flight");
                Self {
                    rec: Some(rec),
                    enabled: true,
                }
            }
            Err(e) => {
                tracing::warn!("Failed to initialize Rerun: {:?}", e);
                Self::disabled()
            }
        }
    }

    /// Creates a logger - returns disabled if visualization feature not enabled.
    #[cfg(not(feature = "visualization"))]
    pub fn new(_name: &str) -> Self {
        tracing::info!("Rerun visualization not available (compile with --features visualization)");
        Self::disabled()
    }

    /// Returns whether visualization is enabled.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Sets the run time for subsequent logs.
    #[cfg(feature = "visualization")]
    pub fn set_time(&self, seconds: f64) {
        if let Some(ref rec) = self.rec {
            rec.set_time_seconds("sim_time", seconds);
        }
    }

    #[cfg(not(feature = "visualization"))]
    pub fn set_time(&self, _seconds: f64) {}

    /// Logs a box-shaped object (drone or beacon).
    #[cfg(feature = "visualization")]
    pub fn log_box(&self, path: &str, center: Vector3<f64>, size: f64, color: u32) {
        if let Some(ref rec) = self.rec {
            let half = (size / 2.0) as f32;
            let _ = rec.log(
                path,
                &Boxes3D::from_centers_and_half_sizes(
                    [(center.x as f32, center.y as f32, center.z as f32)],
                    [(half, half, half)],
                )
                .with_colors([rgb(color)]),
            );
        }
    }

    #[cfg(not(feature = "visualization"))]
    pub fn log_box(&self, _path: &str, _center: Vector3<f64>, _size: f64, _color: u32) {}

    /// Logs the trail flown so far.
    #[cfg(feature = "visualization")]
    pub fn log_trail(&self, trail: &[Vector3<f64>]) {
        if let Some(ref rec) = self.rec {
            let strip: Vec<[f32; 3]> = trail
                .iter()
                .map(|p| [p.x as f32, p.y as f32, p.z as f32])
                .collect();
            let _ = rec.log(
                "world/drone/trail",
                &LineStrips3D::new([strip]).with_colors([Color::from_rgb(100, 100, 255)]),
            );
        }
    }

    #[cfg(not(feature = "visualization"))]
    pub fn log_trail(&self, _trail: &[Vector3<f64>]) {}

    /// Logs the beacon's field lines.
    #[cfg(feature = "visualization")]
    pub fn log_field_lines(&self, lines: &[Vec<Point3<f64>>], color: u32) {
        if let Some(ref rec) = self.rec {
            let strips: Vec<Vec<[f32; 3]>> = lines
                .iter()
                .map(|line| {
                    line.iter()
                        .map(|p| [p.x as f32, p.y as f32, p.z as f32])
                        .collect()
                })
                .collect();
            let _ = rec.log(
                "world/beacon/field",
                &LineStrips3D::new(strips).with_colors([rgb(color)]),
            );
        }
    }

    #[cfg(not(feature = "visualization"))]
    pub fn log_field_lines(&self, _lines: &[Vec<Point3<f64>>], _color: u32) {}

    /// Logs the 2-D field profile on its own plane, away from the 3-D scene.
    #[cfg(feature = "visualization")]
    pub fn log_profile(&self, lines: &[Vec<Point3<f64>>], color: u32) {
        if let Some(ref rec) = self.rec {
            let strips: Vec<Vec<[f32; 2]>> = lines
                .iter()
                .map(|line| line.iter().map(|p| [p.x as f32, p.y as f32]).collect())
                .collect();
            let _ = rec.log(
                "profile/field",
                &rerun::LineStrips2D::new(strips).with_colors([rgb(color)]),
            );
        }
    }

    #[cfg(not(feature = "visualization"))]
    pub fn log_profile(&self, _lines: &[Vec<Point3<f64>>], _color: u32) {}

    /// Logs replay waypoints as points.
    #[cfg(feature = "visualization")]
    pub fn log_waypoints(&self, waypoints: &[Vector3<f64>]) {
        if let Some(ref rec) = self.rec {
            let points: Vec<Position3D> = waypoints
                .iter()
                .map(|p| Position3D::new(p.x as f32, p.y as f32, p.z as f32))
                .collect();
            let _ = rec.log(
                "world/replay/waypoints",
                &Points3D::new(points)
                    .with_colors([Color::from_rgb(255, 165, 0)])
                    .with_radii([Radius::new_scene_units(1.5)]),
            );
        }
    }

    #[cfg(not(feature = "visualization"))]
    pub fn log_waypoints(&self, _waypoints: &[Vector3<f64>]) {}

    /// Logs a text annotation (e.g., replay started).
    #[cfg(feature = "visualization")]
    pub fn log_event(&self, path: &str, message: &str) {
        if let Some(ref rec) = self.rec {
            let _ = rec.log(path, &rerun::TextLog::new(message));
        }
    }

    #[cfg(not(feature = "visualization"))]
    pub fn log_event(&self, _path: &str, _message: &str) {}
}
