//! Scene graph abstraction.
//!
//! The renderer owns the scene; the motion engine only adds the objects it
//! owns, moves them, and removes them again.

use crate::error::EnvError;
use crate::types::ObjectId;
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Geometry of a scene object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    /// Axis-aligned box with full edge lengths
    Box { size: [f64; 3] },

    /// Group of polylines in object space
    Lines { lines: Vec<Vec<Point3<f64>>> },
}

/// A visual object handed to the scene graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneObject {
    /// Human-readable label (for logs and exports)
    pub name: String,

    pub shape: Shape,

    /// 0xRRGGBB
    pub color: u32,

    pub position: Vector3<f64>,

    /// Euler rotation (pitch, yaw, roll) in radians
    pub rotation: Vector3<f64>,
}

impl SceneObject {
    /// Creates a box at a position with zero rotation.
    pub fn cube(name: &str, size: f64, color: u32, position: Vector3<f64>) -> Self {
        Self {
            name: name.to_string(),
            shape: Shape::Box {
                size: [size, size, size],
            },
            color,
            position,
            rotation: Vector3::zeros(),
        }
    }

    /// Creates a line group anchored at the origin.
    pub fn lines(name: &str, lines: Vec<Vec<Point3<f64>>>, color: u32) -> Self {
        Self {
            name: name.to_string(),
            shape: Shape::Lines { lines },
            color,
            position: Vector3::zeros(),
            rotation: Vector3::zeros(),
        }
    }
}

/// The externally owned scene graph.
///
/// # Implementations
///
/// - **Headless**: `InMemoryScene`
/// - **Renderers**: adapters over a real engine's scene
pub trait SceneGraph: Send {
    /// Adds an object and returns its handle.
    fn add(&mut self, object: SceneObject) -> Result<ObjectId, EnvError>;

    /// Removes an object. Returns false if it was not present.
    fn remove(&mut self, id: ObjectId) -> bool;

    /// Moves an existing object.
    fn set_pose(
        &mut self,
        id: ObjectId,
        position: Vector3<f64>,
        rotation: Vector3<f64>,
    ) -> Result<(), EnvError>;

    /// Looks up an object.
    fn object(&self, id: ObjectId) -> Option<&SceneObject>;

    /// Returns the handles of all objects, in a stable order.
    fn object_ids(&self) -> Vec<ObjectId>;

    fn contains(&self, id: ObjectId) -> bool {
        self.object(id).is_some()
    }

    fn len(&self) -> usize {
        self.object_ids().len()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Scene graph kept in memory, used for headless runs and tests.
#[derive(Debug, Default)]
pub struct InMemoryScene {
    objects: BTreeMap<ObjectId, SceneObject>,

    /// Sequence for deterministic ids
    next_seq: u64,

    /// Maximum number of objects accepted (None = unlimited)
    capacity: Option<usize>,
}

impl InMemoryScene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a scene that rejects additions past `capacity` objects.
    ///
    /// Lets tests exercise partially failed construction.
    pub fn with_capacity_limit(capacity: usize) -> Self {
        Self {
            capacity: Some(capacity),
            ..Self::default()
        }
    }

    /// Iterates over all objects.
    pub fn objects(&self) -> impl Iterator<Item = (&ObjectId, &SceneObject)> {
        self.objects.iter()
    }

    /// Finds the first object with the given name.
    pub fn find_by_name(&self, name: &str) -> Option<(ObjectId, &SceneObject)> {
        self.objects
            .iter()
            .find(|(_, object)| object.name == name)
            .map(|(id, object)| (*id, object))
    }
}

impl SceneGraph for InMemoryScene {
    fn add(&mut self, object: SceneObject) -> Result<ObjectId, EnvError> {
        if let Some(capacity) = self.capacity {
            if self.objects.len() >= capacity {
                return Err(EnvError::scene(format!(
                    "scene is full ({} objects), cannot add '{}'",
                    capacity, object.name
                )));
            }
        }

        let id = ObjectId::from_seq(self.next_seq);
        self.next_seq += 1;
        self.objects.insert(id, object);
        Ok(id)
    }

    fn remove(&mut self, id: ObjectId) -> bool {
        self.objects.remove(&id).is_some()
    }

    fn set_pose(
        &mut self,
        id: ObjectId,
        position: Vector3<f64>,
        rotation: Vector3<f64>,
    ) -> Result<(), EnvError> {
        let object = self
            .objects
            .get_mut(&id)
            .ok_or(EnvError::ObjectNotFound(id))?;
        object.position = position;
        object.rotation = rotation;
        Ok(())
    }

    fn object(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects.get(&id)
    }

    fn object_ids(&self) -> Vec<ObjectId> {
        self.objects.keys().copied().collect()
    }

    fn len(&self) -> usize {
        self.objects.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_remove() {
        let mut scene = InMemoryScene::new();
        let id = scene
            .add(SceneObject::cube("drone", 5.0, 0x0000ff, Vector3::zeros()))
            .unwrap();

        assert!(scene.contains(id));
        assert_eq!(scene.len(), 1);

        assert!(scene.remove(id));
        assert!(!scene.remove(id));
        assert!(scene.is_empty());
    }

    #[test]
    fn test_ids_are_sequential_and_never_reused() {
        let cube = || SceneObject::cube("drone", 5.0, 0x0000ff, Vector3::zeros());
        let mut first = InMemoryScene::new();
        let mut second = InMemoryScene::new();

        let a = first.add(cube()).unwrap();
        assert_eq!(a, ObjectId::from_seq(0));
        assert_eq!(second.add(cube()).unwrap(), a);

        first.remove(a);
        let b = first.add(cube()).unwrap();
        assert_eq!(b, ObjectId::from_seq(1));
        assert!(!first.contains(a));
    }

    #[test]
    fn test_set_pose() {
        let mut scene = InMemoryScene::new();
        let id = scene
            .add(SceneObject::cube("drone", 5.0, 0x0000ff, Vector3::zeros()))
            .unwrap();

        scene
            .set_pose(id, Vector3::new(1.0, 2.0, 3.0), Vector3::new(0.0, 0.5, 0.0))
            .unwrap();

        let object = scene.object(id).unwrap();
        assert_eq!(object.position, Vector3::new(1.0, 2.0, 3.0));
        assert_eq!(object.rotation.y, 0.5);
    }

    #[test]
    fn test_set_pose_on_missing_object() {
        let mut scene = InMemoryScene::new();
        let err = scene
            .set_pose(ObjectId::new(), Vector3::zeros(), Vector3::zeros())
            .unwrap_err();
        assert!(matches!(err, EnvError::ObjectNotFound(_)));
    }

    #[test]
    fn test_capacity_limit() {
        let mut scene = InMemoryScene::with_capacity_limit(1);
        scene
            .add(SceneObject::cube("a", 1.0, 0, Vector3::zeros()))
            .unwrap();

        let err = scene
            .add(SceneObject::cube("b", 1.0, 0, Vector3::zeros()))
            .unwrap_err();
        assert!(matches!(err, EnvError::Scene(_)));
        assert_eq!(scene.len(), 1);
    }

    #[test]
    fn test_find_by_name() {
        let mut scene = InMemoryScene::new();
        let id = scene
            .add(SceneObject::cube("beacon", 1.0, 0xff0000, Vector3::new(0.0, -1.0, 0.0)))
            .unwrap();

        let (found, object) = scene.find_by_name("beacon").unwrap();
        assert_eq!(found, id);
        assert_eq!(object.color, 0xff0000);
        assert!(scene.find_by_name("drone").is_none());
    }
}
