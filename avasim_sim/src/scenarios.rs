//! Built-in scripted flights for headless runs.
//!
//! A scenario is a timed script of key presses, releases and replay
//! requests. The runner fires each step once virtual time reaches it.

use avasim_core::{Path, Transform};
use avasim_env::{
    BeaconConfig, CameraConfig, DroneConfig, GroundConfig, LightConfig, SceneConfig, SlopeConfig,
};
use nalgebra::Vector3;
use std::time::Duration;

/// Scenario identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenarioId {
    /// No input: the drone holds its start position
    Hover,

    /// Climb for one second
    Climb,

    /// Forward, quarter turn left, forward
    Square,

    /// Replay the approach path (or a fetched recording)
    Replay,

    /// Replay with a manual key press in the middle
    Reclaim,

    /// A second replay preempts the first
    Preempt,

    /// Diagnostic key press triggering a backend liveness probe
    Diagnostic,
}

impl ScenarioId {
    /// Returns a list of all scenarios.
    pub fn all() -> Vec<ScenarioId> {
        vec![
            ScenarioId::Hover,
            ScenarioId::Climb,
            ScenarioId::Square,
            ScenarioId::Replay,
            ScenarioId::Reclaim,
            ScenarioId::Preempt,
            ScenarioId::Diagnostic,
        ]
    }

    /// Returns the scenario name.
    pub fn name(&self) -> &'static str {
        match self {
            ScenarioId::Hover => "hover",
            ScenarioId::Climb => "climb",
            ScenarioId::Square => "square",
            ScenarioId::Replay => "replay",
            ScenarioId::Reclaim => "reclaim",
            ScenarioId::Preempt => "preempt",
            ScenarioId::Diagnostic => "diagnostic",
        }
    }

    /// Returns a description of the scenario.
    pub fn description(&self) -> &'static str {
        match self {
            ScenarioId::Hover => "No input; the drone stays at its start position",
            ScenarioId::Climb => "Hold ArrowUp for one second",
            ScenarioId::Square => "Fly forward, turn left a quarter, fly forward again",
            ScenarioId::Replay => "Replay a descent toward the beacon",
            ScenarioId::Reclaim => "Press ArrowUp halfway through a replay",
            ScenarioId::Preempt => "Start a second replay before the first one ends",
            ScenarioId::Diagnostic => "Press the diagnostic key to probe the backend",
        }
    }

    /// Timed steps of this scenario.
    pub fn script(&self) -> Script {
        use ScriptAction::*;

        let steps = match self {
            ScenarioId::Hover => vec![],
            ScenarioId::Climb => vec![
                step(0, Press("ArrowUp")),
                step(1000, Release("ArrowUp")),
            ],
            ScenarioId::Square => vec![
                step(0, Press("w")),
                step(1000, Release("w")),
                // 0.02 rad per tick at 60 Hz: ~1.3 s for a quarter turn
                step(1000, Press("ArrowLeft")),
                step(2300, Release("ArrowLeft")),
                step(2300, Press("w")),
                step(3300, Release("w")),
            ],
            ScenarioId::Replay => vec![step(500, Play(approach_path()))],
            ScenarioId::Reclaim => vec![
                step(500, Play(approach_path())),
                step(1500, Press("ArrowUp")),
                step(2000, Release("ArrowUp")),
            ],
            ScenarioId::Preempt => vec![
                step(500, Play(approach_path())),
                step(1500, Play(retreat_path())),
            ],
            ScenarioId::Diagnostic => vec![
                step(200, Press("t")),
                step(300, Release("t")),
            ],
        };

        Script::new(steps)
    }
}

impl std::fmt::Display for ScenarioId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for ScenarioId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ScenarioId::all()
            .into_iter()
            .find(|id| id.name() == s.to_lowercase())
            .ok_or_else(|| format!("Unknown scenario: {}", s))
    }
}

/// One scripted input.
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptAction {
    Press(&'static str),
    Release(&'static str),

    /// Replay a path; the runner may substitute a fetched recording
    Play(Path),

    StopReplay,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScriptStep {
    /// Offset from the start of the run
    pub at: Duration,
    pub action: ScriptAction,
}

fn step(millis: u64, action: ScriptAction) -> ScriptStep {
    ScriptStep {
        at: Duration::from_millis(millis),
        action,
    }
}

/// Steps sorted by time; equal times keep their listed order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Script {
    steps: Vec<ScriptStep>,
}

impl Script {
    pub fn new(mut steps: Vec<ScriptStep>) -> Self {
        steps.sort_by_key(|s| s.at);
        Self { steps }
    }

    pub fn steps(&self) -> &[ScriptStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Time of the last step.
    pub fn end(&self) -> Duration {
        self.steps.last().map(|s| s.at).unwrap_or_default()
    }
}

/// Descent from the default start position toward the beacon.
pub fn approach_path() -> Path {
    Path::from_transforms([
        Transform::at(Vector3::new(0.0, 80.0, -20.0)),
        Transform::new(Vector3::new(20.0, 60.0, -20.0), Vector3::new(0.0, 0.5, 0.0)),
        Transform::new(Vector3::new(20.0, 40.0, 0.0), Vector3::new(0.0, 1.0, 0.0)),
        Transform::new(Vector3::new(0.0, 20.0, 0.0), Vector3::new(0.0, 1.5, 0.0)),
    ])
}

/// Short climb away from the slope.
pub fn retreat_path() -> Path {
    Path::from_transforms([Transform::at(Vector3::new(-30.0, 90.0, 10.0))])
}

/// Scene used when running without a backend. Mirrors the backend's
/// reference configuration.
pub fn reference_scene_config() -> SceneConfig {
    SceneConfig {
        camera: CameraConfig {
            position: [0.0, 100.0, 300.0],
            look_at: [0.0, 50.0, 100.0],
        },
        slope: SlopeConfig {
            width: 100.0,
            height: 200.0,
            angle: -55.0,
            color: 0x8B4513,
        },
        light: LightConfig {
            position: [50.0, 50.0, 50.0],
            color: 0xffffff,
            intensity: 1.0,
        },
        ground: GroundConfig {
            size: 500.0,
            color: 0x808080,
        },
        drone: DroneConfig {
            start_position: [0.0, 100.0, 0.0],
        },
        beacon: BeaconConfig { depth: 1.0 },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip() {
        for id in ScenarioId::all() {
            assert_eq!(id.name().parse::<ScenarioId>().unwrap(), id);
            assert!(!id.description().is_empty());
        }
        assert_eq!("REPLAY".parse::<ScenarioId>().unwrap(), ScenarioId::Replay);
        assert!("split_brain".parse::<ScenarioId>().is_err());
    }

    #[test]
    fn test_scripts_are_time_ordered() {
        for id in ScenarioId::all() {
            let script = id.script();
            assert!(script.steps().windows(2).all(|w| w[0].at <= w[1].at));
        }
        assert!(ScenarioId::Hover.script().is_empty());
        assert_eq!(ScenarioId::Square.script().end(), Duration::from_millis(3300));
    }

    #[test]
    fn test_equal_times_keep_listed_order() {
        let script = ScenarioId::Square.script();
        let at_one_second: Vec<_> = script
            .steps()
            .iter()
            .filter(|s| s.at == Duration::from_millis(1000))
            .map(|s| s.action.clone())
            .collect();

        assert_eq!(
            at_one_second,
            vec![ScriptAction::Release("w"), ScriptAction::Press("ArrowLeft")]
        );
    }

    #[test]
    fn test_replay_scenarios_carry_paths() {
        let script = ScenarioId::Preempt.script();
        let plays = script
            .steps()
            .iter()
            .filter(|s| matches!(s.action, ScriptAction::Play(_)))
            .count();
        assert_eq!(plays, 2);
        assert_eq!(approach_path().len(), 4);
    }
}
