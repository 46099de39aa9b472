//! Headless Replay - fly and replay a drone without a renderer
//! ============================================================
//!
//! Demonstrates:
//! - Attaching drone, beacon and field lines to an in-memory scene
//! - Manual flight from scripted key presses
//! - Replaying a recorded path, then handing control back
//! - Teardown restoring the scene
//!
//! Run:
//! ```bash
//! cargo run -p avasim_core --example headless_replay
//! ```

use avasim_core::{MotionMode, MotionSession, Path, SessionConfig, Transform};
use avasim_env::{
    BeaconConfig, CameraConfig, DroneConfig, GroundConfig, InMemoryScene, Keyboard, LightConfig,
    SceneConfig, SceneGraph, SlopeConfig,
};
use nalgebra::Vector3;
use std::sync::{Arc, Mutex};
use std::time::Duration;

const FRAME_RATE: u64 = 60;

fn scene_config() -> SceneConfig {
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

fn main() {
    let scene = Arc::new(Mutex::new(InMemoryScene::new()));
    let keyboard = Keyboard::default();

    let mut session = match MotionSession::new(
        SessionConfig::default(),
        &scene_config(),
        scene.clone(),
        &keyboard,
    ) {
        Ok(session) => session,
        Err(e) => {
            eprintln!("Failed to start session: {}", e);
            std::process::exit(1);
        }
    };

    println!("Scene objects after attach: {}", scene.lock().unwrap().len());

    let frame = Duration::from_millis(1000 / FRAME_RATE);
    let mut now = Duration::ZERO;

    // One second of forward flight
    keyboard.press("w");
    for _ in 0..FRAME_RATE {
        now += frame;
        session.frame(now);
    }
    keyboard.release("w");

    let after_manual = *session.transform().unwrap();
    println!(
        "After manual flight: ({:.1}, {:.1}, {:.1})",
        after_manual.position.x, after_manual.position.y, after_manual.position.z
    );

    // Descend toward the beacon in three segments
    let path = Path::from_transforms([
        Transform::at(Vector3::new(0.0, 60.0, -30.0)),
        Transform::new(Vector3::new(15.0, 30.0, -10.0), Vector3::new(0.0, 0.8, 0.0)),
        Transform::at(Vector3::new(0.0, 10.0, 0.0)),
    ]);
    println!("Replay: {:?}", session.play(path, now));

    while session.mode() == MotionMode::PathReplay {
        now += frame;
        let report = session.frame(now);
        if report.frame % FRAME_RATE == 0 {
            if let Some(t) = report.transform {
                println!(
                    "  t={:.1}s ({:.1}, {:.1}, {:.1})",
                    now.as_secs_f64(),
                    t.position.x,
                    t.position.y,
                    t.position.z
                );
            }
        }
    }

    let rest = *session.transform().unwrap();
    println!(
        "Replay finished at ({:.1}, {:.1}, {:.1}), mode {}",
        rest.position.x,
        rest.position.y,
        rest.position.z,
        session.mode()
    );

    session.teardown();
    println!("Scene objects after teardown: {}", scene.lock().unwrap().len());
}
