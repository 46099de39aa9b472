//! Dipole Field Sampler - field-line shapes around a buried beacon.
//!
//! These are visual approximations, not a magnetostatics solver. Two
//! variants exist:
//!
//! - **3-D**: `num_lines` meridian arcs of radius `r` arranged around the
//!   vertical axis through the beacon, each sampled over `t ∈ [0, π)`:
//!   `(r·sin t·cos α, r·cos t − d, r·sin t·sin α)` with `α = 2π·i/num_lines`.
//! - **2-D**: a side-view profile per line, `y = scale · cos θ / r³` with
//!   `r = √(x² + h²)` and `θ = atan2(h, x) + α + φ`.

use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use std::f64::consts::{PI, TAU};

/// One sampled field line.
pub type FieldLine = Vec<Point3<f64>>;

/// Parameters of the 3-D variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Dipole3dConfig {
    pub num_lines: usize,
    pub radius: f64,

    /// Increment of the arc parameter t (radians)
    pub step: f64,
}

impl Default for Dipole3dConfig {
    fn default() -> Self {
        Self {
            num_lines: 20,
            radius: 40.0,
            step: 0.1,
        }
    }
}

impl Dipole3dConfig {
    /// Samples per line: `ceil(π / step)`.
    pub fn points_per_line(&self) -> usize {
        if self.step <= 0.0 {
            return 0;
        }
        (PI / self.step).ceil() as usize
    }
}

/// Parameters of the 2-D variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Dipole2dConfig {
    pub num_lines: usize,
    pub x_min: f64,
    pub x_max: f64,
    pub x_step: f64,

    /// Vertical offset of the beacon below the sampling line
    pub offset: f64,

    /// Multiplier from field magnitude to plotted y
    pub scale: f64,
}

impl Default for Dipole2dConfig {
    fn default() -> Self {
        Self {
            num_lines: 25,
            x_min: -150.0,
            x_max: 150.0,
            x_step: 5.0,
            offset: 10.0,
            scale: 10.0,
        }
    }
}

impl Dipole2dConfig {
    /// Samples per line, both ends of the x range included.
    pub fn points_per_line(&self) -> usize {
        if self.x_step <= 0.0 || self.x_max < self.x_min {
            return 0;
        }
        // Small epsilon so an exact multiple keeps its end point
        ((self.x_max - self.x_min) / self.x_step + 1e-9).floor() as usize + 1
    }
}

/// Angle offset of line `i` out of `num_lines`.
fn line_angle(i: usize, num_lines: usize) -> f64 {
    TAU * i as f64 / num_lines as f64
}

/// 3-D field lines around a beacon buried `depth` below the origin.
pub fn field_lines_3d(config: &Dipole3dConfig, depth: f64) -> Vec<FieldLine> {
    let samples = config.points_per_line();

    (0..config.num_lines)
        .map(|i| {
            let (sin_a, cos_a) = line_angle(i, config.num_lines).sin_cos();
            (0..samples)
                .map(|k| {
                    let t = k as f64 * config.step;
                    let (sin_t, cos_t) = t.sin_cos();
                    Point3::new(
                        config.radius * sin_t * cos_a,
                        config.radius * cos_t - depth,
                        config.radius * sin_t * sin_a,
                    )
                })
                .collect()
        })
        .collect()
}

/// Field magnitude at horizontal position `x` for a line offset by `angle`.
pub fn planar_magnitude(x: f64, offset: f64, angle: f64) -> f64 {
    let r = x.hypot(offset);
    let theta = offset.atan2(x) + angle;
    theta.cos() / r.powi(3)
}

/// 2-D field profile lines for a beacon rotated by `orientation` (radians).
pub fn field_lines_2d(config: &Dipole2dConfig, orientation: f64) -> Vec<FieldLine> {
    let samples = config.points_per_line();

    (0..config.num_lines)
        .map(|i| {
            let angle = line_angle(i, config.num_lines) + orientation;
            (0..samples)
                .map(|k| {
                    let x = config.x_min + k as f64 * config.x_step;
                    let y = planar_magnitude(x, config.offset, angle) * config.scale;
                    Point3::new(x, y, 0.0)
                })
                .collect()
        })
        .collect()
}

/// Total number of points across a set of lines.
pub fn point_count(lines: &[FieldLine]) -> usize {
    lines.iter().map(Vec::len).sum()
}
