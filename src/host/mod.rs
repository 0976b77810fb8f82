//! Host application model.
//!
//! A minimal stand-in for the scene of a mesh-editing application: polygon
//! meshes with named attribute layers ([`PolyMesh`]), objects that carry them
//! ([`HostObject`]), a scoped mode switch ([`ModeGuard`]) and the [`Context`]
//! that every user-facing operation receives.

mod object;
mod polymesh;

pub use object::{Context, HostObject, ModeGuard, ObjectData, ObjectMode, Transform};
pub use polymesh::{HostVertex, PolyMesh, MARKER_LAYER};
