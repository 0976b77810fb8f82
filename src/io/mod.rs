//! Mesh file I/O.
//!
//! Meshes are read into and written from the host [`PolyMesh`] so that
//! polygons, selection and layers survive the trip.
//!
//! # Supported Formats
//!
//! | Format | Extension | Load | Save | Notes |
//! |--------|-----------|------|------|-------|
//! | PLY | `.ply` | ✓ | ✓ | Markers, selection, float and colour layers |
//! | OFF | `.off` | ✓ | ✓ | Geometry only |
//!
//! # Usage
//!
//! ```no_run
//! use surfbridge::io::{load, save};
//!
//! let mesh = load("cell.off").unwrap();
//! save(&mesh, "cell.ply").unwrap();
//! ```

pub mod off;
pub mod ply;

use std::path::Path;

use crate::error::{BridgeError, Result};
use crate::host::PolyMesh;

/// Supported mesh file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// PLY (Stanford polygon) format.
    Ply,
    /// OFF (Object File Format).
    Off,
}

impl Format {
    /// Detect format from file extension.
    pub fn from_extension(ext: &str) -> Option<Format> {
        match ext.to_lowercase().as_str() {
            "ply" => Some(Format::Ply),
            "off" => Some(Format::Off),
            _ => None,
        }
    }

    /// Detect format from file path.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Format> {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(Format::from_extension)
    }

    fn require(path: &Path) -> Result<Format> {
        Format::from_path(path).ok_or_else(|| BridgeError::UnsupportedFormat {
            extension: path
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or("(none)")
                .to_string(),
        })
    }
}

/// Load a mesh from a file with automatic format detection.
pub fn load<P: AsRef<Path>>(path: P) -> Result<PolyMesh> {
    let path = path.as_ref();
    match Format::require(path)? {
        Format::Ply => ply::load(path),
        Format::Off => off::load(path),
    }
}

/// Save a mesh to a file with automatic format detection.
pub fn save<P: AsRef<Path>>(mesh: &PolyMesh, path: P) -> Result<()> {
    let path = path.as_ref();
    match Format::require(path)? {
        Format::Ply => ply::save(mesh, path),
        Format::Off => off::save(mesh, path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_detection() {
        assert_eq!(Format::from_path("a/b/mesh.PLY"), Some(Format::Ply));
        assert_eq!(Format::from_path("mesh.off"), Some(Format::Off));
        assert_eq!(Format::from_path("mesh.stl"), None);
    }

    #[test]
    fn test_unsupported_extension() {
        let mesh = PolyMesh::new("m");
        assert!(matches!(
            save(&mesh, "mesh.obj"),
            Err(BridgeError::UnsupportedFormat { extension }) if extension == "obj"
        ));
        assert!(matches!(
            load("mesh"),
            Err(BridgeError::UnsupportedFormat { extension }) if extension == "(none)"
        ));
    }
}
