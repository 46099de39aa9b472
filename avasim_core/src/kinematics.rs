//! Kinematic Integrator - per-tick manual flight from held keys.
//!
//! Deltas are per tick, not per second, so the effective speed follows the
//! host's refresh rate. A 120 Hz display flies twice as fast as a 60 Hz one.

use crate::input::KeyState;
use crate::transform::Transform;

/// Default translation per tick, in scene units.
pub const DEFAULT_SPEED: f64 = 1.0;

/// Default yaw change per tick, in radians.
pub const DEFAULT_ROTATION_SPEED: f64 = 0.02;

/// Applies held-key deltas to a transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KinematicIntegrator {
    /// Translation per tick
    pub speed: f64,

    /// Yaw per tick (radians)
    pub rotation_speed: f64,
}

impl Default for KinematicIntegrator {
    fn default() -> Self {
        Self {
            speed: DEFAULT_SPEED,
            rotation_speed: DEFAULT_ROTATION_SPEED,
        }
    }
}

impl KinematicIntegrator {
    pub fn new(speed: f64, rotation_speed: f64) -> Self {
        Self {
            speed,
            rotation_speed,
        }
    }

    /// Advances `transform` by one tick.
    ///
    /// Order: vertical, yaw, forward/back, strafe. Forward and strafe use the
    /// yaw after this tick's rotation has been applied.
    pub fn step(&self, keys: &KeyState, transform: &mut Transform) {
        let speed = self.speed;
        let position = &mut transform.position;
        let rotation = &mut transform.rotation;

        if keys.up {
            position.y += speed;
        }
        if keys.down {
            position.y -= speed;
        }

        if keys.yaw_left {
            rotation.y += self.rotation_speed;
        }
        if keys.yaw_right {
            rotation.y -= self.rotation_speed;
        }

        let (sin_yaw, cos_yaw) = rotation.y.sin_cos();

        // Heading at yaw 0 is -z
        if keys.forward {
            position.x -= speed * sin_yaw;
            position.z -= speed * cos_yaw;
        }
        if keys.back {
            position.x += speed * sin_yaw;
            position.z += speed * cos_yaw;
        }

        if keys.strafe_left {
            position.x -= speed * cos_yaw;
            position.z += speed * sin_yaw;
        }
        if keys.strafe_right {
            position.x += speed * cos_yaw;
            position.z -= speed * sin_yaw;
        }
    }
}
