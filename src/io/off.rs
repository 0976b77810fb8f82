//! OFF (Object File Format) support.
//!
//! Plain `OFF` files only: a header line, the vertex, face and edge counts,
//! then one line per vertex and one line per polygon. Trailing values on a
//! polygon line (such as per-face colours) are ignored.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use nalgebra::Point3;

use super::ply::mesh_name;
use crate::error::{BridgeError, Result};
use crate::host::PolyMesh;

/// Load a mesh from an OFF file.
pub fn load<P: AsRef<Path>>(path: P) -> Result<PolyMesh> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let reader = BufReader::new(file);

    let load_error = |message: String| BridgeError::LoadError {
        path: path.to_path_buf(),
        message,
    };

    // Tokens of all non-empty lines with comments stripped, one list per line.
    let mut lines = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let content = line.split('#').next().unwrap_or("").trim();
        if !content.is_empty() {
            lines.push(content.split_whitespace().map(str::to_string).collect::<Vec<_>>());
        }
    }
    let total_lines = lines.len();
    let mut lines = lines.into_iter();

    let mut header = lines.next().ok_or_else(|| load_error("file is empty".to_string()))?;
    if header.first().map(String::as_str) != Some("OFF") {
        return Err(load_error("missing OFF header".to_string()));
    }
    header.remove(0);
    let counts = if header.is_empty() {
        lines.next().ok_or_else(|| load_error("missing element counts".to_string()))?
    } else {
        header
    };

    let parse_count = |token: Option<&String>| -> Result<usize> {
        token
            .and_then(|t| t.parse().ok())
            .ok_or_else(|| load_error("invalid element counts".to_string()))
    };
    let num_vertices = parse_count(counts.first())?;
    let num_faces = parse_count(counts.get(1))?;

    // Counts come from the file, so never reserve more than it holds.
    let mut positions = Vec::with_capacity(num_vertices.min(total_lines));
    for i in 0..num_vertices {
        let tokens = lines
            .next()
            .ok_or_else(|| load_error(format!("expected {} vertices, found {}", num_vertices, i)))?;
        let coords: Vec<f64> = tokens
            .iter()
            .take(3)
            .map(|t| t.parse::<f64>())
            .collect::<std::result::Result<_, _>>()
            .map_err(|e| load_error(format!("vertex {}: {}", i, e)))?;
        let [x, y, z] = coords[..] else {
            return Err(load_error(format!("vertex {} has fewer than 3 coordinates", i)));
        };
        positions.push(Point3::new(x, y, z));
    }

    let mut polygons = Vec::with_capacity(num_faces.min(total_lines));
    for i in 0..num_faces {
        let tokens = lines
            .next()
            .ok_or_else(|| load_error(format!("expected {} faces, found {}", num_faces, i)))?;
        let n: usize = tokens[0]
            .parse()
            .map_err(|e| load_error(format!("face {}: {}", i, e)))?;
        if tokens.len() <= n {
            let found = tokens.len() - 1;
            return Err(load_error(format!("face {} lists {} of {} vertices", i, found, n)));
        }
        let polygon: Vec<usize> = tokens[1..=n]
            .iter()
            .map(|t| t.parse::<usize>())
            .collect::<std::result::Result<_, _>>()
            .map_err(|e| load_error(format!("face {}: {}", i, e)))?;
        polygons.push(polygon);
    }

    if polygons.is_empty() {
        return Err(load_error("OFF file contains no faces".to_string()));
    }

    PolyMesh::from_pydata(mesh_name(path), &positions, polygons)
}

/// Save a mesh to an OFF file. Only positions and polygons are written.
pub fn save<P: AsRef<Path>>(mesh: &PolyMesh, path: P) -> Result<()> {
    let file = File::create(path.as_ref())?;
    let mut writer = BufWriter::new(file);

    writeln!(writer, "OFF")?;
    writeln!(writer, "{} {} {}", mesh.num_vertices(), mesh.num_faces(), mesh.edges().len())?;
    for v in mesh.vertices() {
        writeln!(writer, "{} {} {}", v.co.x, v.co.y, v.co.z)?;
    }
    for polygon in mesh.polygons() {
        write!(writer, "{}", polygon.len())?;
        for v in polygon {
            write!(writer, " {}", v)?;
        }
        writeln!(writer)?;
    }

    writer.flush()?;
    Ok(())
}
