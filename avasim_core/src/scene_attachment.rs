//! Scene Attachment - the objects the engine owns inside the renderer's scene.
//!
//! The scene graph is shared with the renderer (`Arc<Mutex<S>>`). An
//! attachment adds the drone, the beacon and the field-line group when it
//! is created and removes exactly those objects when it is detached or
//! dropped. A failed construction leaves the scene as it found it.

use crate::config::FieldConfig;
use crate::dipole::field_lines_3d;
use crate::error::SessionError;
use crate::transform::Transform;

use avasim_env::{ObjectId, SceneConfig, SceneGraph, SceneObject};
use nalgebra::Vector3;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, warn};

pub const DRONE_SIZE: f64 = 5.0;
pub const DRONE_COLOR: u32 = 0x0000ff;
pub const BEACON_SIZE: f64 = 1.0;
pub const BEACON_COLOR: u32 = 0xff0000;
pub const FIELD_COLOR: u32 = 0x00ff00;

/// Handles of the objects one attachment added.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttachedObjects {
    pub drone: ObjectId,
    pub beacon: ObjectId,
    pub field_lines: ObjectId,
}

impl AttachedObjects {
    fn all(&self) -> [ObjectId; 3] {
        [self.drone, self.beacon, self.field_lines]
    }
}

/// Owned visual objects in an externally owned scene graph.
pub struct SceneAttachment<S: SceneGraph> {
    scene: Arc<Mutex<S>>,

    /// None once detached
    objects: Option<AttachedObjects>,
}

/// Locks the scene even if another holder panicked; teardown must still run.
fn lock<S>(scene: &Mutex<S>) -> MutexGuard<'_, S> {
    scene.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<S: SceneGraph> SceneAttachment<S> {
    /// Builds the drone, beacon and field lines and adds them to `scene`.
    pub fn attach(
        scene: Arc<Mutex<S>>,
        config: &SceneConfig,
        field: &FieldConfig,
    ) -> Result<Self, SessionError> {
        let [x, y, z] = config.drone.start_position;
        let depth = config.beacon.depth;

        let to_add = [
            SceneObject::cube("drone", DRONE_SIZE, DRONE_COLOR, Vector3::new(x, y, z)),
            SceneObject::cube(
                "beacon",
                BEACON_SIZE,
                BEACON_COLOR,
                Vector3::new(0.0, -depth, 0.0),
            ),
            SceneObject::lines(
                "field_lines",
                field_lines_3d(&field.spatial, depth),
                FIELD_COLOR,
            ),
        ];

        let mut added = Vec::with_capacity(to_add.len());
        {
            let mut graph = lock(&scene);
            for object in to_add {
                let name = object.name.clone();
                match graph.add(object) {
                    Ok(id) => added.push(id),
                    Err(e) => {
                        warn!("Failed to add '{}' to scene, rolling back {} objects", name, added.len());
                        for id in added {
                            graph.remove(id);
                        }
                        return Err(SessionError::Attach {
                            object: name,
                            source: e,
                        });
                    }
                }
            }
        }

        let objects = AttachedObjects {
            drone: added[0],
            beacon: added[1],
            field_lines: added[2],
        };
        debug!(
            "Scene attached: drone={} beacon={} field_lines={}",
            objects.drone, objects.beacon, objects.field_lines
        );

        Ok(Self {
            scene,
            objects: Some(objects),
        })
    }

    /// Moves the drone object to `transform`.
    pub fn sync_drone(&self, transform: &Transform) -> Result<(), SessionError> {
        let Some(objects) = self.objects else {
            return Err(SessionError::Detached);
        };
        lock(&self.scene).set_pose(objects.drone, transform.position, transform.rotation)?;
        Ok(())
    }

    /// Removes every owned object. Returns how many were still present.
    ///
    /// Idempotent; a second call removes nothing.
    pub fn detach(&mut self) -> usize {
        let Some(objects) = self.objects.take() else {
            return 0;
        };

        let mut graph = lock(&self.scene);
        let removed = objects
            .all()
            .into_iter()
            .filter(|id| graph.remove(*id))
            .count();
        debug!("Scene detached, {} objects removed", removed);
        removed
    }

    pub fn objects(&self) -> Option<&AttachedObjects> {
        self.objects.as_ref()
    }

    pub fn is_attached(&self) -> bool {
        self.objects.is_some()
    }

    /// Shared handle to the scene graph.
    pub fn scene(&self) -> &Arc<Mutex<S>> {
        &self.scene
    }
}

impl<S: SceneGraph> Drop for SceneAttachment<S> {
    fn drop(&mut self) {
        self.detach();
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use avasim_env::{
        BeaconConfig, CameraConfig, DroneConfig, GroundConfig, InMemoryScene, LightConfig, Shape,
        SlopeConfig,
    };

    pub(crate) fn scene_config() -> SceneConfig {
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

    fn shared(scene: InMemoryScene) -> Arc<Mutex<InMemoryScene>> {
        Arc::new(Mutex::new(scene))
    }

    fn cube(name: &str) -> SceneObject {
        SceneObject::cube(name, 1.0, 0, Vector3::zeros())
    }

    #[test]
    fn test_attach_adds_three_objects() {
        let scene = shared(InMemoryScene::new());
        let attachment =
            SceneAttachment::attach(scene.clone(), &scene_config(), &FieldConfig::default())
                .unwrap();

        let graph = scene.lock().unwrap();
        assert_eq!(graph.len(), 3);

        let objects = attachment.objects().unwrap();
        let drone = graph.object(objects.drone).unwrap();
        assert_eq!(drone.color, DRONE_COLOR);
        assert_eq!(drone.position, Vector3::new(0.0, 100.0, 0.0));
        assert_eq!(drone.shape, Shape::Box { size: [5.0, 5.0, 5.0] });

        let beacon = graph.object(objects.beacon).unwrap();
        assert_eq!(beacon.color, BEACON_COLOR);
        assert_eq!(beacon.position, Vector3::new(0.0, -1.0, 0.0));

        let field = graph.object(objects.field_lines).unwrap();
        assert_eq!(field.color, FIELD_COLOR);
        match &field.shape {
            Shape::Lines { lines } => {
                assert_eq!(lines.len(), 20);
                assert_eq!(lines.iter().map(Vec::len).sum::<usize>(), 640);
            }
            other => panic!("expected line group, got {:?}", other),
        }
    }

    #[test]
    fn test_teardown_restores_scene() {
        let mut base = InMemoryScene::new();
        base.add(cube("slope")).unwrap();
        base.add(cube("ground")).unwrap();
        let scene = shared(base);
        let before = scene.lock().unwrap().object_ids();

        let mut attachment =
            SceneAttachment::attach(scene.clone(), &scene_config(), &FieldConfig::default())
                .unwrap();
        assert_eq!(scene.lock().unwrap().len(), 5);

        assert_eq!(attachment.detach(), 3);
        assert_eq!(attachment.detach(), 0);
        assert!(!attachment.is_attached());
        assert_eq!(scene.lock().unwrap().object_ids(), before);
    }

    #[test]
    fn test_drop_detaches() {
        let scene = shared(InMemoryScene::new());
        {
            let _attachment =
                SceneAttachment::attach(scene.clone(), &scene_config(), &FieldConfig::default())
                    .unwrap();
            assert_eq!(scene.lock().unwrap().len(), 3);
        }
        assert!(scene.lock().unwrap().is_empty());
    }

    #[test]
    fn test_partial_failure_rolls_back() {
        // Room for the existing object plus the drone; the beacon is rejected
        let mut base = InMemoryScene::with_capacity_limit(2);
        base.add(cube("slope")).unwrap();
        let scene = shared(base);
        let before = scene.lock().unwrap().object_ids();

        let result =
            SceneAttachment::attach(scene.clone(), &scene_config(), &FieldConfig::default());

        match result {
            Err(SessionError::Attach { object, .. }) => assert_eq!(object, "beacon"),
            Err(other) => panic!("unexpected error: {}", other),
            Ok(_) => panic!("attach should fail when the scene is full"),
        }
        assert_eq!(scene.lock().unwrap().object_ids(), before);
    }

    #[test]
    fn test_sync_drone_moves_only_the_drone() {
        let scene = shared(InMemoryScene::new());
        let attachment =
            SceneAttachment::attach(scene.clone(), &scene_config(), &FieldConfig::default())
                .unwrap();
        let objects = *attachment.objects().unwrap();

        let transform = Transform::new(Vector3::new(3.0, 4.0, 5.0), Vector3::new(0.0, 0.25, 0.0));
        attachment.sync_drone(&transform).unwrap();

        let graph = scene.lock().unwrap();
        assert_eq!(graph.object(objects.drone).unwrap().position, transform.position);
        assert_eq!(graph.object(objects.drone).unwrap().rotation.y, 0.25);
        assert_eq!(
            graph.object(objects.beacon).unwrap().position,
            Vector3::new(0.0, -1.0, 0.0)
        );
    }

    #[test]
    fn test_sync_after_detach_fails() {
        let scene = shared(InMemoryScene::new());
        let mut attachment =
            SceneAttachment::attach(scene, &scene_config(), &FieldConfig::default()).unwrap();
        attachment.detach();

        assert!(matches!(
            attachment.sync_drone(&Transform::default()),
            Err(SessionError::Detached)
        ));
    }

    #[test]
    fn test_sync_reports_object_removed_externally() {
        let scene = shared(InMemoryScene::new());
        let attachment =
            SceneAttachment::attach(scene.clone(), &scene_config(), &FieldConfig::default())
                .unwrap();
        let drone = attachment.objects().unwrap().drone;
        scene.lock().unwrap().remove(drone);

        let err = attachment.sync_drone(&Transform::default()).unwrap_err();
        assert!(matches!(
            err,
            SessionError::Env(avasim_env::EnvError::ObjectNotFound(_))
        ));
    }
}
