//! Error types for surfbridge.
//!
//! Every fallible operation in the crate returns [`Result`]. The user-facing
//! commands in [`crate::ops`] turn these errors into status messages.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using [`BridgeError`].
pub type Result<T> = std::result::Result<T, BridgeError>;

/// Errors that can occur while converting or post-processing meshes.
#[derive(Error, Debug)]
pub enum BridgeError {
    /// There is no active object, or the active object is not selected.
    #[error("no object selected; select a mesh to use this feature")]
    NoActiveSelection,

    /// The active object is not a mesh.
    #[error("active object '{name}' is not a mesh")]
    NonMeshSelection {
        /// Name of the offending object.
        name: String,
    },

    /// Vertex selection was required but no vertex is selected.
    #[error("no vertices are selected")]
    NoVertexSelection,

    /// A polygon with other than three corners was encountered.
    #[error("face {face} has {sides} vertices; only triangulated meshes are supported")]
    NonTriangularFace {
        /// Index of the polygon in the host mesh.
        face: usize,
        /// Number of corners of the polygon.
        sides: usize,
    },

    /// A triangle repeats one of its vertices.
    #[error("face {face} is degenerate (has duplicate vertices)")]
    DegenerateFace {
        /// Index of the face.
        face: usize,
    },

    /// Two triangles share the same vertex set.
    #[error("face {face} repeats the vertices of face {previous}")]
    DuplicateFace {
        /// Index of the repeated face.
        face: usize,
        /// Index of the face seen first.
        previous: usize,
    },

    /// A face references a vertex that does not exist.
    #[error("face {face} references invalid vertex index {vertex}")]
    InvalidVertexIndex {
        /// Index of the face.
        face: usize,
        /// The invalid vertex index.
        vertex: usize,
    },

    /// A face still has an undetermined orientation at export time.
    #[error("face {face} has undefined orientation")]
    UndefinedOrientation {
        /// Index of the face in key order.
        face: usize,
    },

    /// A raw boundary value has no entry in the boundary table.
    #[error("face {face} carries boundary id {value} which has no marker mapping")]
    UnmappedBoundary {
        /// Index of the face.
        face: usize,
        /// The unmapped raw value.
        value: i32,
    },

    /// The curvature record already exists.
    #[error("curvature record {algorithm}/{kind} already exists")]
    DuplicateCurvatureRecord {
        /// Algorithm tag.
        algorithm: &'static str,
        /// Curvature type tag.
        kind: &'static str,
    },

    /// A per-vertex curvature layer is missing or has the wrong length.
    #[error("curvature layer '{name}' is missing or malformed")]
    MissingCurvatureLayer {
        /// Layer name.
        name: String,
    },

    /// The registry has no active curvature record.
    #[error("no curvature is selected")]
    NoActiveCurvature,

    /// The requested colour map is not registered.
    #[error("unknown colormap '{name}'")]
    UnknownColormap {
        /// The requested name.
        name: String,
    },

    /// The object is in a mode that does not allow the requested access.
    #[error("'{operation}' requires object mode, but '{object}' is in {mode} mode")]
    WrongMode {
        /// Object name.
        object: String,
        /// Current mode.
        mode: &'static str,
        /// What was attempted.
        operation: &'static str,
    },

    /// A per-vertex field does not match the vertex count.
    #[error("field has {actual} values but the mesh has {expected} vertices")]
    FieldLengthMismatch {
        /// Number of vertices.
        expected: usize,
        /// Number of values supplied.
        actual: usize,
    },

    /// Invalid parameter value.
    #[error("invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// The invalid value (as string).
        value: String,
        /// Reason the value is invalid.
        reason: &'static str,
    },

    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed JSON configuration.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Error loading mesh from file.
    #[error("failed to load mesh from {path}: {message}")]
    LoadError {
        /// The file path.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// Error saving mesh to file.
    #[error("failed to save mesh to {path}: {message}")]
    SaveError {
        /// The file path.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// Unsupported file format.
    #[error("unsupported file format: {extension}")]
    UnsupportedFormat {
        /// The file extension.
        extension: String,
    },
}

impl BridgeError {
    /// Create an invalid parameter error.
    pub fn invalid_param<T: std::fmt::Display>(
        name: &'static str,
        value: T,
        reason: &'static str,
    ) -> Self {
        BridgeError::InvalidParameter {
            name,
            value: value.to_string(),
            reason,
        }
    }

    /// Whether this error is the soft duplicate-record condition that callers
    /// are expected to swallow.
    pub fn is_duplicate_record(&self) -> bool {
        matches!(self, BridgeError::DuplicateCurvatureRecord { .. })
    }
}
