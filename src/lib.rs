//! # Surfbridge
//!
//! Conversion between a host application's polygon meshes and an oriented,
//! marked triangle surface mesh, plus curvature post-processing on the host
//! side.
//!
//! ## Features
//!
//! - **Conversion**: host [`PolyMesh`](host::PolyMesh) objects to and from
//!   [`SurfaceMesh`](mesh::SurfaceMesh), with world-space positions, vertex
//!   selection and per-face boundary markers
//! - **Orientation**: every triangle is stored under a sorted key with a
//!   winding sign, and undefined signs are resolved across the mesh
//! - **Boundaries**: user boundary ids map to solver markers and face materials
//! - **Curvature**: MDSB and quadric-fit estimators, stored as per-vertex
//!   layers and tracked in a per-object registry
//! - **Colour mapping**: Laplacian smoothing, percentile truncation and
//!   vertex colouring of a curvature field
//! - **File formats**: PLY and OFF
//!
//! ## Quick Start
//!
//! ```no_run
//! use surfbridge::prelude::*;
//!
//! let mesh = surfbridge::io::load("cell.ply").unwrap();
//! let mut ctx = Context::with_object(HostObject::from_mesh(mesh));
//!
//! // Import, improve, write back
//! let surface = ops::import_selected(&mut ctx, &ImportOptions::default()).unwrap();
//! ops::apply_surface_mesh(&mut ctx, &surface, &ExportOptions::default()).unwrap();
//!
//! // Curvature and colours
//! println!("{}", ops::execute(&mut ctx, Command::ComputeCurvatures));
//! println!("{}", ops::execute(&mut ctx, Command::CurvatureToColormap));
//! ```
//!
//! ## Orientation
//!
//! ```
//! use surfbridge::prelude::*;
//!
//! let tri = [VertexId::new(4), VertexId::new(2), VertexId::new(9)];
//! let (key, orientation) = canonicalize(tri).unwrap();
//! assert_eq!(key.vertices(), [VertexId::new(2), VertexId::new(4), VertexId::new(9)]);
//! assert_eq!(orientation, Orientation::Positive);
//!
//! // The emitted winding is a rotation of the input.
//! let emitted = [VertexId::new(9), VertexId::new(4), VertexId::new(2)];
//! assert_eq!(key.oriented(orientation), Some(emitted));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod algo;
pub mod colormap;
pub mod convert;
pub mod error;
pub mod host;
pub mod io;
pub mod mesh;
pub mod ops;
pub mod registry;

/// Prelude module for convenient imports.
///
/// This module re-exports the most commonly used types and functions:
///
/// ```
/// use surfbridge::prelude::*;
/// ```
pub mod prelude {
    pub use crate::algo::curvature::{
        CurvatureAlgorithm, CurvatureEstimator, CurvatureFields, CurvatureType,
    };
    pub use crate::colormap::{ColormapStage, PlotRequest, VertexColorStage};
    pub use crate::convert::{
        export_mesh, import_mesh, repaint_boundaries, Boundary, BoundaryList, BoundaryMap,
        ExportOptions, ImportOptions,
    };
    pub use crate::error::{BridgeError, Result};
    pub use crate::host::{Context, HostObject, ObjectData, ObjectMode, PolyMesh, Transform};
    pub use crate::mesh::{
        canonicalize, check_orientation, init_orientation, FaceKey, Orientation, SurfaceFace,
        SurfaceMesh, SurfaceVertex, VertexId,
    };
    pub use crate::ops::{self, Command, Report, ReportLevel};
    pub use crate::registry::{ColormapSettings, CurvatureRecord, CurvatureRegistry};
}

// Re-export nalgebra types for convenience
pub use nalgebra;
