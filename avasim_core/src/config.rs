//! Engine tuning.
//!
//! Everything here has a default matching the reference scene; a JSON file
//! may override any subset of fields.

use crate::dipole::{Dipole2dConfig, Dipole3dConfig};
use crate::kinematics::{DEFAULT_ROTATION_SPEED, DEFAULT_SPEED};
use crate::motion::ReclaimPolicy;
use crate::path_animator::DEFAULT_SEGMENT_DURATION;

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the motion controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    /// Manual translation per tick (scene units)
    pub speed: f64,

    /// Manual yaw per tick (radians)
    pub rotation_speed: f64,

    /// Time spent on each replay segment (milliseconds)
    pub segment_duration_ms: u64,

    /// What manual keys do during replay
    pub reclaim_policy: ReclaimPolicy,
}

impl MotionConfig {
    pub fn segment_duration(&self) -> Duration {
        Duration::from_millis(self.segment_duration_ms)
    }
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            speed: DEFAULT_SPEED,
            rotation_speed: DEFAULT_ROTATION_SPEED,
            segment_duration_ms: DEFAULT_SEGMENT_DURATION.as_millis() as u64,
            reclaim_policy: ReclaimPolicy::default(),
        }
    }
}

/// Field-line sampling parameters for both visual variants.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    pub spatial: Dipole3dConfig,
    pub planar: Dipole2dConfig,
}

/// Configuration for a motion session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub motion: MotionConfig,

    pub field: FieldConfig,

    /// Frame rate the scheduler ticks at (Hz)
    pub refresh_hz: u32,
}

impl SessionConfig {
    /// Time between frames at the configured refresh rate.
    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.refresh_hz.max(1) as f64)
    }

    /// Parses a (possibly partial) JSON override.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            motion: MotionConfig::default(),
            field: FieldConfig::default(),
            refresh_hz: 60,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_motion_config_default() {
        let config = MotionConfig::default();
        assert_eq!(config.speed, 1.0);
        assert_eq!(config.rotation_speed, 0.02);
        assert_eq!(config.segment_duration(), Duration::from_secs(2));
        assert_eq!(config.reclaim_policy, ReclaimPolicy::FinishReplay);
    }

    #[test]
    fn test_partial_override() {
        let config = SessionConfig::from_json(
            r#"{ "motion": { "speed": 2.5, "reclaim_policy": "reclaim_on_key_press" }, "refresh_hz": 120 }"#,
        )
        .unwrap();

        assert_eq!(config.motion.speed, 2.5);
        assert_eq!(config.motion.rotation_speed, 0.02);
        assert_eq!(config.motion.reclaim_policy, ReclaimPolicy::ReclaimOnKeyPress);
        assert_eq!(config.refresh_hz, 120);
        assert_eq!(config.field.spatial.num_lines, 20);
    }

    #[test]
    fn test_frame_interval() {
        let config = SessionConfig {
            refresh_hz: 50,
            ..Default::default()
        };
        assert_eq!(config.frame_interval(), Duration::from_millis(20));
    }
}
