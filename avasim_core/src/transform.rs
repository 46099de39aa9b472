//! Drone pose types: Transform, Waypoint and Path.

use avasim_env::{Pose, WaypointRecord};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// Position and Euler rotation of the drone.
///
/// `rotation` is stored as (pitch, yaw, roll) in radians, matching the
/// renderer's x/y/z Euler order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vector3<f64>,
    pub rotation: Vector3<f64>,
}

impl Transform {
    /// Creates a transform at a position with zero rotation.
    pub fn at(position: Vector3<f64>) -> Self {
        Self {
            position,
            rotation: Vector3::zeros(),
        }
    }

    pub fn new(position: Vector3<f64>, rotation: Vector3<f64>) -> Self {
        Self { position, rotation }
    }

    pub fn pitch(&self) -> f64 {
        self.rotation.x
    }

    pub fn yaw(&self) -> f64 {
        self.rotation.y
    }

    pub fn roll(&self) -> f64 {
        self.rotation.z
    }

    /// Component-wise linear interpolation between two transforms.
    ///
    /// `t` is not clamped here; callers pass a fraction already in [0, 1].
    /// At exactly `t == 1.0` the result is `target` bit-for-bit.
    pub fn lerp(start: &Transform, target: &Transform, t: f64) -> Transform {
        if t >= 1.0 {
            return *target;
        }
        Transform {
            position: start.position.lerp(&target.position, t),
            rotation: start.rotation.lerp(&target.rotation, t),
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::at(Vector3::zeros())
    }
}

impl From<Pose> for Transform {
    fn from(pose: Pose) -> Self {
        Self {
            position: Vector3::new(pose.x, pose.y, pose.z),
            rotation: Vector3::new(pose.pitch, pose.yaw, pose.roll),
        }
    }
}

impl From<Transform> for Pose {
    fn from(transform: Transform) -> Self {
        Pose {
            x: transform.position.x,
            y: transform.position.y,
            z: transform.position.z,
            pitch: transform.rotation.x,
            yaw: transform.rotation.y,
            roll: transform.rotation.z,
        }
    }
}

/// One replay stop: a recorded transform plus its capture time.
///
/// The timestamp orders waypoints; replay pacing does not use it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub transform: Transform,
    pub timestamp: f64,
}

impl Waypoint {
    pub fn new(transform: Transform, timestamp: f64) -> Self {
        Self {
            transform,
            timestamp,
        }
    }
}

impl From<&WaypointRecord> for Waypoint {
    fn from(record: &WaypointRecord) -> Self {
        Self {
            transform: record.position.into(),
            timestamp: record.timestamp,
        }
    }
}

/// Ordered waypoint sequence; insertion order is traversal order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Path {
    waypoints: Vec<Waypoint>,
}

impl Path {
    pub fn new(waypoints: Vec<Waypoint>) -> Self {
        Self { waypoints }
    }

    /// Builds a path from bare transforms, numbering timestamps 0, 1, 2, ...
    pub fn from_transforms(transforms: impl IntoIterator<Item = Transform>) -> Self {
        Self {
            waypoints: transforms
                .into_iter()
                .enumerate()
                .map(|(i, transform)| Waypoint::new(transform, i as f64))
                .collect(),
        }
    }

    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    pub fn get(&self, index: usize) -> Option<&Waypoint> {
        self.waypoints.get(index)
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    pub fn last(&self) -> Option<&Waypoint> {
        self.waypoints.last()
    }
}

impl From<&[WaypointRecord]> for Path {
    fn from(records: &[WaypointRecord]) -> Self {
        Self {
            waypoints: records.iter().map(Waypoint::from).collect(),
        }
    }
}
