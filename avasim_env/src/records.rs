//! Wire records exchanged with the AvaSim backend.
//!
//! Field names follow the backend's JSON exactly; a few camelCase keys are
//! renamed onto snake_case Rust fields.

use serde::{Deserialize, Serialize};

/// A 6-DoF pose as the backend serializes it: position plus Euler rotation.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Pose {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub pitch: f64,
    pub yaw: f64,
    pub roll: f64,
}

impl Pose {
    /// Creates a pose at a position with zero rotation.
    pub fn at(x: f64, y: f64, z: f64) -> Self {
        Self {
            x,
            y,
            z,
            ..Default::default()
        }
    }
}

/// One recorded stop of a flight.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WaypointRecord {
    /// Recorded pose (the backend calls it `position` even though it
    /// carries rotation too)
    pub position: Pose,

    /// Capture time in seconds; ordering reference only
    pub timestamp: f64,
}

/// Camera pose for the initial view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraConfig {
    pub position: [f64; 3],
    #[serde(rename = "lookAt")]
    pub look_at: [f64; 3],
}

/// Slope geometry. `angle` is in degrees, `color` a 0xRRGGBB value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlopeConfig {
    pub width: f64,
    pub height: f64,
    pub angle: f64,
    pub color: u32,
}

/// Directional light.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightConfig {
    pub position: [f64; 3],
    pub color: u32,
    pub intensity: f64,
}

/// Flat ground plane.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroundConfig {
    pub size: f64,
    pub color: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DroneConfig {
    #[serde(rename = "startPosition")]
    pub start_position: [f64; 3],
}

/// Buried beacon; `depth` is measured downward from y = 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeaconConfig {
    pub depth: f64,
}

/// Declarative scene description served by `GET /api/config`.
///
/// Every section is required: the fetch either yields a complete value or
/// the caller stays pending.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneConfig {
    pub camera: CameraConfig,
    pub slope: SlopeConfig,
    pub light: LightConfig,
    pub ground: GroundConfig,
    pub drone: DroneConfig,
    pub beacon: BeaconConfig,
}

/// Entry of `GET /api/simulation-ids`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationSummary {
    pub id: i64,
    pub description: String,
}

/// Transmitting antenna parameters of a recorded simulation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AntennaParams {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub power: f64,
    pub frequency: f64,
    pub gain: f64,
    pub azimuth: f64,
    pub beamwidth: f64,
    pub polarization: String,
    pub pattern: String,
    pub position: Pose,
}

/// Final summary the backend attaches to some simulations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationOutcome {
    pub final_position: [f64; 3],
    pub steps: u64,
}

/// Full simulation served by `GET /api/simulations/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationRecord {
    pub id: i64,
    pub description: String,
    pub slope: SlopeConfig,
    #[serde(default)]
    pub antenna: AntennaParams,
    pub drone_path: Vec<WaypointRecord>,
    #[serde(default)]
    pub drone_measurements: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<SimulationOutcome>,
}

/// Body of `POST /api/simulate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulateRequest {
    pub start_position: String,
    pub antenna_center: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scene_config_from_backend_json() {
        let json = r#"{
            "camera": { "position": [0, 100, 300], "lookAt": [0, 50, 100] },
            "slope": { "width": 100, "height": 200, "angle": -55, "color": 9127187 },
            "light": { "position": [50, 50, 50], "color": 16777215, "intensity": 1 },
            "ground": { "size": 500, "color": 8421504 },
            "drone": { "startPosition": [0, 100, 0] },
            "beacon": { "depth": 1 }
        }"#;

        let config: SceneConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.camera.look_at, [0.0, 50.0, 100.0]);
        assert_eq!(config.slope.color, 0x8B4513);
        assert_eq!(config.drone.start_position, [0.0, 100.0, 0.0]);
        assert_eq!(config.beacon.depth, 1.0);
    }

    #[test]
    fn test_scene_config_requires_every_section() {
        let json = r#"{ "camera": { "position": [0, 0, 0], "lookAt": [0, 0, 0] } }"#;
        assert!(serde_json::from_str::<SceneConfig>(json).is_err());
    }

    #[test]
    fn test_simulation_record_parses_path() {
        let json = r#"{
            "id": 3,
            "description": "35 degree slope",
            "slope": { "width": 100, "height": 200, "angle": 35, "color": 0 },
            "antenna": {
                "name": "Transmitter", "type": "Omni", "power": 10, "frequency": 2.4,
                "gain": 5, "azimuth": 0, "beamwidth": 360,
                "polarization": "Vertical", "pattern": "Pattern",
                "position": { "x": 0, "y": 0, "z": 0, "pitch": 0, "yaw": 0, "roll": 0 }
            },
            "drone_path": [
                { "position": { "x": 0, "y": 0, "z": 5, "pitch": 0, "yaw": 0, "roll": 0 }, "timestamp": 0 },
                { "position": { "x": 0, "y": 0, "z": 10, "pitch": 0, "yaw": 0.5, "roll": 0 }, "timestamp": 0.05 }
            ],
            "drone_measurements": [0.1, 0.2]
        }"#;

        let record: SimulationRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.drone_path.len(), 2);
        assert_eq!(record.drone_path[1].position.yaw, 0.5);
        assert_eq!(record.antenna.kind, "Omni");
        assert!(record.result.is_none());
    }
}
