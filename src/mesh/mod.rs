//! Core surface mesh types.
//!
//! This module provides the oriented triangle mesh that the host adapter
//! produces and the curvature stages consume.
//!
//! # Overview
//!
//! The primary type is [`SurfaceMesh`]: a dense list of marked, selectable
//! vertices and a map from winding-independent [`FaceKey`]s to per-face data
//! (orientation, marker, selection). Storing faces under an unordered key
//! means that the same triangle can never appear twice with different
//! windings; the winding lives in the face's [`Orientation`] instead.
//!
//! # Index Types
//!
//! - [`VertexId`] - Identifies a vertex
//! - [`FaceId`] - Identifies a face by its position in key order
//!
//! # Construction
//!
//! ```
//! use surfbridge::mesh::{canonicalize, SurfaceFace, SurfaceMesh, SurfaceVertex, VertexId};
//! use nalgebra::Point3;
//!
//! let mut mesh = SurfaceMesh::new();
//! let a = mesh.add_vertex(SurfaceVertex::new(Point3::new(0.0, 0.0, 0.0), true));
//! let b = mesh.add_vertex(SurfaceVertex::new(Point3::new(1.0, 0.0, 0.0), true));
//! let c = mesh.add_vertex(SurfaceVertex::new(Point3::new(0.0, 1.0, 0.0), true));
//!
//! let (key, orientation) = canonicalize([a, b, c]).unwrap();
//! mesh.insert_face(key, SurfaceFace::new(orientation, 0)).unwrap();
//! assert_eq!(mesh.num_faces(), 1);
//! ```

mod index;
mod key;
mod orientation;
mod surface;

pub use index::{FaceId, VertexId};
pub use key::{canonicalize, has_directed_edge, FaceKey, Orientation};
pub use orientation::{check_orientation, init_orientation, OrientationReport};
pub use surface::{SurfaceFace, SurfaceMesh, SurfaceVertex};
