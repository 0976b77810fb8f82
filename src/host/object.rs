//! Host objects, interaction modes and the operation context.

use std::ops::{Deref, DerefMut};
use std::path::PathBuf;

use nalgebra::{Point3, UnitQuaternion, Vector3};

use super::polymesh::{PolyMesh, MARKER_LAYER};
use crate::convert::{BoundaryList, MaterialLibrary};
use crate::error::{BridgeError, Result};
use crate::registry::CurvatureRegistry;

/// Interaction mode of a host object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ObjectMode {
    /// Object mode. Attribute layers are only readable here.
    #[default]
    Object,
    /// Mesh edit mode.
    Edit,
    /// Sculpting.
    Sculpt,
    /// Vertex painting.
    VertexPaint,
}

impl ObjectMode {
    /// Display name.
    pub fn name(self) -> &'static str {
        match self {
            ObjectMode::Object => "OBJECT",
            ObjectMode::Edit => "EDIT",
            ObjectMode::Sculpt => "SCULPT",
            ObjectMode::VertexPaint => "VERTEX_PAINT",
        }
    }
}

/// Object-to-world transform: scale, then rotation, then translation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// World-space offset.
    pub location: Vector3<f64>,
    /// Rotation.
    pub rotation: UnitQuaternion<f64>,
    /// Per-axis scale.
    pub scale: Vector3<f64>,
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform {
    /// The identity transform.
    pub fn identity() -> Self {
        Self {
            location: Vector3::zeros(),
            rotation: UnitQuaternion::identity(),
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }

    /// A pure translation.
    pub fn from_location(location: Vector3<f64>) -> Self {
        Self {
            location,
            ..Self::identity()
        }
    }

    /// Whether this is the identity transform.
    pub fn is_identity(&self) -> bool {
        *self == Self::identity()
    }

    /// Map a local point to world space.
    ///
    /// With `apply_rotation_scale` false only the location offset is added.
    pub fn to_world(&self, local: &Point3<f64>, apply_rotation_scale: bool) -> Point3<f64> {
        let p = if apply_rotation_scale {
            self.rotation * local.coords.component_mul(&self.scale)
        } else {
            local.coords
        };
        Point3::from(p + self.location)
    }
}

/// Data attached to a host object.
#[derive(Debug, Clone)]
pub enum ObjectData {
    /// A polygon mesh.
    Mesh(PolyMesh),
    /// An empty.
    Empty,
    /// A curve. Geometry is not modelled.
    Curve,
}

impl ObjectData {
    /// Kind name used in messages.
    pub fn kind(&self) -> &'static str {
        match self {
            ObjectData::Mesh(_) => "MESH",
            ObjectData::Empty => "EMPTY",
            ObjectData::Curve => "CURVE",
        }
    }
}

/// A named object in the host scene.
#[derive(Debug, Clone)]
pub struct HostObject {
    /// Object name.
    pub name: String,
    /// Attached data.
    pub data: ObjectData,
    /// Current interaction mode.
    pub mode: ObjectMode,
    /// Object-to-world transform.
    pub transform: Transform,
    /// Selection flag.
    pub selected: bool,
    /// Boundary definitions for this object.
    pub boundaries: BoundaryList,
    /// Curvature records computed for this object.
    pub curvatures: CurvatureRegistry,
}

impl HostObject {
    /// Create a selected object with identity transform in object mode.
    pub fn new(name: impl Into<String>, data: ObjectData) -> Self {
        Self {
            name: name.into(),
            data,
            mode: ObjectMode::Object,
            transform: Transform::identity(),
            selected: true,
            boundaries: BoundaryList::default(),
            curvatures: CurvatureRegistry::default(),
        }
    }

    /// Create a mesh object named after its mesh.
    pub fn from_mesh(mesh: PolyMesh) -> Self {
        let name = mesh.name.clone();
        Self::new(name, ObjectData::Mesh(mesh))
    }

    /// Whether the object carries a mesh.
    pub fn is_mesh(&self) -> bool {
        matches!(self.data, ObjectData::Mesh(_))
    }

    /// The mesh, if any.
    pub fn mesh(&self) -> Option<&PolyMesh> {
        match &self.data {
            ObjectData::Mesh(mesh) => Some(mesh),
            _ => None,
        }
    }

    /// The mesh, mutably, if any.
    pub fn mesh_mut(&mut self) -> Option<&mut PolyMesh> {
        match &mut self.data {
            ObjectData::Mesh(mesh) => Some(mesh),
            _ => None,
        }
    }

    /// The mesh, or [`BridgeError::NonMeshSelection`].
    pub fn require_mesh(&self) -> Result<&PolyMesh> {
        let name = &self.name;
        self.mesh()
            .ok_or_else(|| BridgeError::NonMeshSelection { name: name.clone() })
    }

    /// The mesh mutably, or [`BridgeError::NonMeshSelection`].
    pub fn require_mesh_mut(&mut self) -> Result<&mut PolyMesh> {
        let name = self.name.clone();
        self.mesh_mut()
            .ok_or(BridgeError::NonMeshSelection { name })
    }

    /// The per-face marker layer, creating it with zeros if missing.
    ///
    /// Layers are only accessible in [`ObjectMode::Object`].
    pub fn marker_layer(&mut self) -> Result<&mut [i32]> {
        self.ensure_mode(ObjectMode::Object, "marker layer access")?;
        Ok(self.require_mesh_mut()?.face_int_layer_or_new(MARKER_LAYER))
    }

    /// Fail with [`BridgeError::WrongMode`] unless the object is in `mode`.
    pub fn ensure_mode(&self, mode: ObjectMode, operation: &'static str) -> Result<()> {
        if self.mode != mode {
            return Err(BridgeError::WrongMode {
                object: self.name.clone(),
                mode: self.mode.name(),
                operation,
            });
        }
        Ok(())
    }

    /// Switch to object mode for the lifetime of the returned guard.
    pub fn object_mode(&mut self) -> ModeGuard<'_> {
        ModeGuard::enter(self, ObjectMode::Object)
    }
}

/// Scoped mode switch.
///
/// The previous mode is restored when the guard is dropped, including on early
/// returns through `?`.
#[derive(Debug)]
pub struct ModeGuard<'a> {
    object: &'a mut HostObject,
    previous: ObjectMode,
}

impl<'a> ModeGuard<'a> {
    /// Put `object` into `mode` until the guard is dropped.
    pub fn enter(object: &'a mut HostObject, mode: ObjectMode) -> Self {
        let previous = object.mode;
        if previous != mode {
            log::debug!("{}: {} -> {}", object.name, previous.name(), mode.name());
        }
        object.mode = mode;
        Self { object, previous }
    }

    /// Mode that will be restored.
    pub fn previous(&self) -> ObjectMode {
        self.previous
    }
}

impl Deref for ModeGuard<'_> {
    type Target = HostObject;

    fn deref(&self) -> &HostObject {
        self.object
    }
}

impl DerefMut for ModeGuard<'_> {
    fn deref_mut(&mut self) -> &mut HostObject {
        self.object
    }
}

impl Drop for ModeGuard<'_> {
    fn drop(&mut self) {
        self.object.mode = self.previous;
    }
}

/// Everything an operation may touch: the scene objects, the active object,
/// the boundary material library and the scene file path.
#[derive(Debug, Clone, Default)]
pub struct Context {
    /// Scene objects.
    pub objects: Vec<HostObject>,
    /// Index of the active object.
    pub active: Option<usize>,
    /// Boundary materials shared by all objects.
    pub materials: MaterialLibrary,
    /// Path of the saved scene, if any.
    pub file_path: Option<PathBuf>,
}

impl Context {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context whose only object is active.
    pub fn with_object(object: HostObject) -> Self {
        Self {
            objects: vec![object],
            active: Some(0),
            ..Default::default()
        }
    }

    /// Add an object and make it active. Returns its index.
    pub fn add_object(&mut self, object: HostObject) -> usize {
        self.objects.push(object);
        let index = self.objects.len() - 1;
        self.active = Some(index);
        index
    }

    /// The active object, if any.
    pub fn active_object(&self) -> Option<&HostObject> {
        self.active.and_then(|i| self.objects.get(i))
    }

    /// The active object, mutably.
    pub fn active_object_mut(&mut self) -> Option<&mut HostObject> {
        let index = self.active?;
        self.objects.get_mut(index)
    }

    /// The active object, which must be a selected mesh.
    pub fn selected_mesh(&self) -> Result<&HostObject> {
        let object = self.active_object().ok_or(BridgeError::NoActiveSelection)?;
        object.require_mesh()?;
        if !object.selected {
            return Err(BridgeError::NoActiveSelection);
        }
        Ok(object)
    }

    /// The active object mutably, which must be a selected mesh.
    pub fn selected_mesh_mut(&mut self) -> Result<&mut HostObject> {
        let object = self
            .active_object_mut()
            .ok_or(BridgeError::NoActiveSelection)?;
        object.require_mesh()?;
        if !object.selected {
            return Err(BridgeError::NoActiveSelection);
        }
        Ok(object)
    }

    /// Scene name used as a file prefix: the file stem of the scene path, or
    /// `"untitled"`.
    pub fn scene_name(&self) -> String {
        self.file_path
            .as_ref()
            .and_then(|p| p.file_stem())
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "untitled".to_string())
    }
}
