/// Scene container for meshes and lights
use std::collections::BTreeMap;
use std::fmt;

use crate::light::Light;
use crate::mesh::Mesh;

/// Handle to an object added to a [`World`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(u64);

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The renderable kinds a world holds.
#[derive(Debug, Clone)]
pub enum SceneObject {
    Mesh(Mesh),
    Light(Light),
}

impl SceneObject {
    pub fn mesh(&self) -> &Mesh {
        match self {
            SceneObject::Mesh(mesh) => mesh,
            SceneObject::Light(light) => &light.mesh,
        }
    }

    pub fn mesh_mut(&mut self) -> &mut Mesh {
        match self {
            SceneObject::Mesh(mesh) => mesh,
            SceneObject::Light(light) => &mut light.mesh,
        }
    }

    /// Meshes always render; lights only when they carry geometry.
    pub fn is_renderable(&self) -> bool {
        match self {
            SceneObject::Mesh(_) => true,
            SceneObject::Light(light) => light.is_visible(),
        }
    }
}

impl From<Mesh> for SceneObject {
    fn from(mesh: Mesh) -> Self {
        SceneObject::Mesh(mesh)
    }
}

impl From<Light> for SceneObject {
    fn from(light: Light) -> Self {
        SceneObject::Light(light)
    }
}

/// The set of active meshes and lights.
///
/// Objects are addressed by the [`ObjectId`] returned from [`World::add`].
/// Removing an object hands it back to the caller, so geometry can be kept
/// and re-added later. BTreeMap keeps iteration order deterministic.
#[derive(Debug, Clone, Default)]
pub struct World {
    objects: BTreeMap<ObjectId, SceneObject>,
    next_id: u64,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, object: impl Into<SceneObject>) -> ObjectId {
        let id = ObjectId(self.next_id);
        self.next_id += 1;
        let object = object.into();
        tracing::debug!(%id, light = matches!(object, SceneObject::Light(_)), "world add");
        self.objects.insert(id, object);
        id
    }

    /// Exclude an object from rendering and return it.
    pub fn remove(&mut self, id: ObjectId) -> Option<SceneObject> {
        let removed = self.objects.remove(&id);
        if removed.is_some() {
            tracing::debug!(%id, "world remove");
        }
        removed
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.objects.contains_key(&id)
    }

    pub fn get(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects.get(&id)
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut SceneObject> {
        self.objects.get_mut(&id)
    }

    /// Mesh of any object, including a light's geometry.
    pub fn mesh(&self, id: ObjectId) -> Option<&Mesh> {
        self.get(id).map(SceneObject::mesh)
    }

    pub fn mesh_mut(&mut self, id: ObjectId) -> Option<&mut Mesh> {
        self.get_mut(id).map(SceneObject::mesh_mut)
    }

    pub fn light(&self, id: ObjectId) -> Option<&Light> {
        match self.get(id) {
            Some(SceneObject::Light(light)) => Some(light),
            _ => None,
        }
    }

    pub fn light_mut(&mut self, id: ObjectId) -> Option<&mut Light> {
        match self.get_mut(id) {
            Some(SceneObject::Light(light)) => Some(light),
            _ => None,
        }
    }

    pub fn objects(&self) -> impl Iterator<Item = (ObjectId, &SceneObject)> {
        self.objects.iter().map(|(id, object)| (*id, object))
    }

    /// Objects drawn by the camera: every mesh and every visible light.
    pub fn renderables(&self) -> impl Iterator<Item = (ObjectId, &SceneObject)> {
        self.objects().filter(|(_, object)| object.is_renderable())
    }

    pub fn renderables_mut(&mut self) -> impl Iterator<Item = (ObjectId, &mut SceneObject)> {
        self.objects
            .iter_mut()
            .filter(|(_, object)| object.is_renderable())
            .map(|(id, object)| (*id, object))
    }

    pub fn lights(&self) -> impl Iterator<Item = &Light> {
        self.objects.values().filter_map(|object| match object {
            SceneObject::Light(light) => Some(light),
            SceneObject::Mesh(_) => None,
        })
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Drop every object, e.g. at a round boundary. Ids are never reused.
    pub fn clear(&mut self) {
        self.objects.clear();
    }
}
