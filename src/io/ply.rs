//! PLY (Stanford polygon) format support.
//!
//! Polygons are kept as they are; nothing is triangulated on load. Besides
//! positions and faces the following properties are understood:
//!
//! | Element | Property | Maps to |
//! |---------|----------|---------|
//! | vertex | `selected` | vertex selection flag |
//! | vertex | `red`, `green`, `blue` | colour layer `"Col"` |
//! | vertex | any other scalar | float layer of that name |
//! | face | `marker` | the `"marker"` face layer |

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use nalgebra::Point3;
use ply_rs::parser::Parser;
use ply_rs::ply::{DefaultElement, Property};

use crate::error::{BridgeError, Result};
use crate::host::{PolyMesh, MARKER_LAYER};

/// Name of the colour layer read from `red`/`green`/`blue`.
pub const COLOR_LAYER: &str = "Col";

const RESERVED_VERTEX_PROPERTIES: [&str; 7] = ["x", "y", "z", "selected", "red", "green", "blue"];

/// Options for [`save_with`].
#[derive(Debug, Clone, Default)]
pub struct PlyOptions {
    /// Colour layer written as `red`/`green`/`blue`. No colours when `None`.
    pub color_layer: Option<String>,
}

impl PlyOptions {
    /// Write the named colour layer.
    pub fn with_color_layer(mut self, layer: impl Into<String>) -> Self {
        self.color_layer = Some(layer.into());
        self
    }
}

/// Load a mesh from a PLY file.
///
/// # Example
///
/// ```no_run
/// use surfbridge::io::ply;
///
/// let mesh = ply::load("cell.ply").unwrap();
/// println!("{} polygons", mesh.num_faces());
/// ```
pub fn load<P: AsRef<Path>>(path: P) -> Result<PolyMesh> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);

    let load_error = |message: &str| BridgeError::LoadError {
        path: path.to_path_buf(),
        message: message.to_string(),
    };

    let parser = Parser::<DefaultElement>::new();
    let ply = parser.read_ply(&mut reader).map_err(|e| BridgeError::LoadError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    // Extract vertices
    let vertex_element = ply
        .payload
        .get("vertex")
        .ok_or_else(|| load_error("PLY file has no vertex element"))?;

    let mut positions: Vec<Point3<f64>> = Vec::with_capacity(vertex_element.len());
    for vertex in vertex_element {
        let coordinate = |name: &str| {
            get_float_property(vertex, name)
                .ok_or_else(|| load_error(&format!("vertex missing {} coordinate", name)))
        };
        let (x, y, z) = (coordinate("x")?, coordinate("y")?, coordinate("z")?);
        positions.push(Point3::new(x, y, z));
    }

    // Extract faces
    let face_element = ply
        .payload
        .get("face")
        .ok_or_else(|| load_error("PLY file has no face element"))?;

    let mut polygons: Vec<Vec<usize>> = Vec::with_capacity(face_element.len());
    let mut markers: Vec<i32> = Vec::with_capacity(face_element.len());
    for face in face_element {
        let indices = get_list_property(face, "vertex_indices")
            .or_else(|| get_list_property(face, "vertex_index"))
            .ok_or_else(|| load_error("face missing vertex_indices property"))?;
        polygons.push(indices);
        markers.push(get_int_property(face, "marker").unwrap_or(0));
    }

    if polygons.is_empty() {
        return Err(load_error("PLY file contains no faces"));
    }

    let name = mesh_name(path);
    let mut mesh = PolyMesh::from_pydata(name, &positions, polygons)?;

    let has_property = |element: &str, property: &str| {
        ply.header
            .elements
            .get(element)
            .is_some_and(|def| def.properties.contains_key(property))
    };

    if has_property("face", "marker") {
        mesh.face_int_layer_or_new(MARKER_LAYER).copy_from_slice(&markers);
    }

    if has_property("vertex", "selected") {
        for (hv, element) in mesh.vertices_mut().iter_mut().zip(vertex_element) {
            hv.select = get_int_property(element, "selected").unwrap_or(1) != 0;
        }
    }

    if ["red", "green", "blue"].iter().all(|p| has_property("vertex", p)) {
        let colors = vertex_element
            .iter()
            .map(|element| {
                let channel = |name| get_color_channel(element, name).unwrap_or(0.0);
                [channel("red"), channel("green"), channel("blue")]
            })
            .collect();
        mesh.set_vertex_colors(COLOR_LAYER, colors)?;
    }

    let layer_names: Vec<String> = ply
        .header
        .elements
        .get("vertex")
        .map(|def| {
            def.properties
                .keys()
                .filter(|k| !RESERVED_VERTEX_PROPERTIES.contains(&k.as_str()))
                .cloned()
                .collect()
        })
        .unwrap_or_default();
    for layer in layer_names {
        let values: Option<Vec<f64>> = vertex_element
            .iter()
            .map(|element| get_float_property(element, &layer))
            .collect();
        match values {
            Some(values) => mesh.set_vertex_float_layer(&layer, values)?,
            None => log::debug!("skipping non-scalar vertex property '{}'", layer),
        }
    }

    log::debug!(
        "loaded {}: {} vertices, {} faces",
        path.display(),
        mesh.num_vertices(),
        mesh.num_faces()
    );
    Ok(mesh)
}

pub(crate) fn mesh_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "mesh".to_string())
}

fn get_float_property(element: &DefaultElement, name: &str) -> Option<f64> {
    match element.get(name)? {
        Property::Float(v) => Some(*v as f64),
        Property::Double(v) => Some(*v),
        Property::Int(v) => Some(*v as f64),
        Property::UInt(v) => Some(*v as f64),
        Property::Short(v) => Some(*v as f64),
        Property::UShort(v) => Some(*v as f64),
        Property::Char(v) => Some(*v as f64),
        Property::UChar(v) => Some(*v as f64),
        _ => None,
    }
}

fn get_int_property(element: &DefaultElement, name: &str) -> Option<i32> {
    match element.get(name)? {
        Property::Int(v) => Some(*v),
        Property::UInt(v) => i32::try_from(*v).ok(),
        Property::Short(v) => Some(i32::from(*v)),
        Property::UShort(v) => Some(i32::from(*v)),
        Property::Char(v) => Some(i32::from(*v)),
        Property::UChar(v) => Some(i32::from(*v)),
        _ => None,
    }
}

/// Colour channel in `[0, 1]`. Integer channels are taken as 8-bit.
fn get_color_channel(element: &DefaultElement, name: &str) -> Option<f32> {
    match element.get(name)? {
        Property::Float(v) => Some(*v),
        Property::Double(v) => Some(*v as f32),
        Property::UChar(v) => Some(f32::from(*v) / 255.0),
        _ => get_int_property(element, name).map(|v| v.clamp(0, 255) as f32 / 255.0),
    }
}

fn get_list_property(element: &DefaultElement, name: &str) -> Option<Vec<usize>> {
    match element.get(name)? {
        Property::ListInt(v) => Some(v.iter().map(|&x| x as usize).collect()),
        Property::ListUInt(v) => Some(v.iter().map(|&x| x as usize).collect()),
        Property::ListShort(v) => Some(v.iter().map(|&x| x as usize).collect()),
        Property::ListUShort(v) => Some(v.iter().map(|&x| x as usize).collect()),
        Property::ListChar(v) => Some(v.iter().map(|&x| x as usize).collect()),
        Property::ListUChar(v) => Some(v.iter().map(|&x| x as usize).collect()),
        _ => None,
    }
}

/// Save a mesh to an ASCII PLY file without colours.
pub fn save<P: AsRef<Path>>(mesh: &PolyMesh, path: P) -> Result<()> {
    save_with(mesh, path, &PlyOptions::default())
}

/// Save a mesh to an ASCII PLY file.
///
/// Writes the selection flags, every float layer and the face markers (when
/// the layer exists). Colours are written when `options` names a colour layer.
///
/// # Example
///
/// ```no_run
/// use surfbridge::host::PolyMesh;
/// use surfbridge::io::ply::{save_with, PlyOptions};
///
/// let mesh = PolyMesh::new("empty");
/// save_with(&mesh, "output.ply", &PlyOptions::default().with_color_layer("MDSBK1")).unwrap();
/// ```
pub fn save_with<P: AsRef<Path>>(mesh: &PolyMesh, path: P, options: &PlyOptions) -> Result<()> {
    let path = path.as_ref();

    let colors = match &options.color_layer {
        Some(name) => Some(mesh.vertex_colors(name).ok_or_else(|| BridgeError::SaveError {
            path: path.to_path_buf(),
            message: format!("mesh has no colour layer '{}'", name),
        })?),
        None => None,
    };
    let layers: Vec<(&str, &[f64])> = mesh
        .vertex_float_layer_names()
        .filter_map(|name| Some((name, mesh.vertex_float_layer(name)?)))
        .collect();
    let markers = mesh.face_int_layer(MARKER_LAYER);

    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    // Write header
    writeln!(writer, "ply")?;
    writeln!(writer, "format ascii 1.0")?;
    writeln!(writer, "comment Generated by surfbridge")?;
    writeln!(writer, "element vertex {}", mesh.num_vertices())?;
    writeln!(writer, "property double x")?;
    writeln!(writer, "property double y")?;
    writeln!(writer, "property double z")?;
    writeln!(writer, "property uchar selected")?;
    for (name, _) in &layers {
        writeln!(writer, "property double {}", name)?;
    }
    if colors.is_some() {
        writeln!(writer, "property uchar red")?;
        writeln!(writer, "property uchar green")?;
        writeln!(writer, "property uchar blue")?;
    }
    writeln!(writer, "element face {}", mesh.num_faces())?;
    writeln!(writer, "property list uchar int vertex_indices")?;
    if markers.is_some() {
        writeln!(writer, "property int marker")?;
    }
    writeln!(writer, "end_header")?;

    // Write vertices
    for (i, v) in mesh.vertices().iter().enumerate() {
        write!(writer, "{} {} {} {}", v.co.x, v.co.y, v.co.z, u8::from(v.select))?;
        for (_, values) in &layers {
            write!(writer, " {}", values[i])?;
        }
        if let Some(colors) = colors {
            let [r, g, b] = colors[i].map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8);
            write!(writer, " {} {} {}", r, g, b)?;
        }
        writeln!(writer)?;
    }

    // Write faces
    for (fi, polygon) in mesh.polygons().iter().enumerate() {
        write!(writer, "{}", polygon.len())?;
        for v in polygon {
            write!(writer, " {}", v)?;
        }
        if let Some(markers) = markers {
            write!(writer, " {}", markers[fi])?;
        }
        writeln!(writer)?;
    }

    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("surfbridge_ply_{}_{}", std::process::id(), name))
    }

    fn quad_and_triangle() -> PolyMesh {
        let positions = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.5, 2.0, 0.0),
        ];
        PolyMesh::from_pydata("shape", &positions, vec![vec![0, 1, 2, 3], vec![3, 2, 4]]).unwrap()
    }

    #[test]
    fn test_save_load_keeps_polygons() {
        let path = temp_path("polygons.ply");
        let mesh = quad_and_triangle();
        save(&mesh, &path).unwrap();

        let loaded = load(&path).unwrap();
        assert!(loaded.name.ends_with("_polygons"));
        assert_eq!(loaded.polygons(), mesh.polygons());
        assert_eq!(loaded.num_vertices(), 5);
        assert!(loaded.face_int_layer(MARKER_LAYER).is_none());
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_save_load_attributes() {
        let path = temp_path("attributes.ply");
        let mut mesh = quad_and_triangle();
        mesh.face_int_layer_or_new(MARKER_LAYER).copy_from_slice(&[4, -1]);
        mesh.vertices_mut()[1].select = false;
        mesh.set_vertex_float_layer("MDSBKH", vec![0.5, -1.0, 2.0, 0.0, 3.25]).unwrap();
        mesh.set_vertex_colors("MDSBKH", vec![[1.0, 0.0, 0.0]; 5]).unwrap();

        save_with(&mesh, &path, &PlyOptions::default().with_color_layer("MDSBKH")).unwrap();
        let loaded = load(&path).unwrap();

        assert_eq!(loaded.face_int_layer(MARKER_LAYER), Some(&[4, -1][..]));
        assert_eq!(loaded.selected_vertex_indices(), vec![0, 2, 3, 4]);
        assert_eq!(loaded.vertex_float_layer("MDSBKH"), Some(&[0.5, -1.0, 2.0, 0.0, 3.25][..]));
        assert_eq!(loaded.vertex_colors(COLOR_LAYER).map(|c| c[0]), Some([1.0, 0.0, 0.0]));
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_save_missing_color_layer() {
        let path = temp_path("missing.ply");
        let options = PlyOptions::default().with_color_layer("nope");
        let result = save_with(&quad_and_triangle(), &path, &options);
        assert!(matches!(result, Err(BridgeError::SaveError { .. })));
        assert!(!path.exists());
    }

    #[test]
    fn test_load_rejects_missing_faces() {
        let path = temp_path("nofaces.ply");
        std::fs::write(
            &path,
            "ply\nformat ascii 1.0\nelement vertex 1\n\
             property float x\nproperty float y\nproperty float z\nend_header\n0 0 0\n",
        )
        .unwrap();
        assert!(matches!(load(&path), Err(BridgeError::LoadError { .. })));
        std::fs::remove_file(&path).ok();
    }
}
